//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{Cache, Database, WebhookVerifier};
use crate::services::{
    AuthService, BookingService, Collaborators, HotelService, RoomService, ServiceContainer,
    Services, UserService,
};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub user_service: Arc<dyn UserService>,
    pub hotel_service: Arc<dyn HotelService>,
    pub room_service: Arc<dyn RoomService>,
    pub booking_service: Arc<dyn BookingService>,
    /// Identity webhook verifier; webhooks are rejected when absent
    pub webhooks: Option<Arc<WebhookVerifier>>,
    /// Redis cache used for rate limiting; limits are skipped when absent
    pub cache: Option<Cache>,
    /// Database handle for health reporting
    pub database: Option<&'static Database>,
}

impl AppState {
    /// Create application state for the server: services over the global
    /// database, Redis rate limiting and the configured webhook secret.
    pub fn from_config(
        database: &'static Database,
        cache: Cache,
        config: &Config,
        deps: Collaborators,
    ) -> Self {
        let container = Services::from_connection(database.get_connection(), config, deps);

        Self {
            cache: Some(cache),
            database: Some(database),
            ..Self::from_services(&container, config)
        }
    }

    /// Services plus the webhook verifier built from the Clerk settings.
    pub fn from_services(container: &dyn ServiceContainer, config: &Config) -> Self {
        let webhooks = config
            .clerk
            .webhook_secret
            .as_deref()
            .and_then(|secret| match WebhookVerifier::new(secret) {
                Ok(verifier) => Some(Arc::new(verifier)),
                Err(e) => {
                    tracing::error!(error = %e, "CLERK_WEBHOOK_SECRET is invalid, webhooks disabled");
                    None
                }
            });

        Self {
            webhooks,
            ..Self::new(container)
        }
    }

    /// Create state from any service container, without infrastructure.
    pub fn new(container: &dyn ServiceContainer) -> Self {
        Self {
            auth_service: container.auth(),
            user_service: container.users(),
            hotel_service: container.hotels(),
            room_service: container.rooms(),
            booking_service: container.bookings(),
            webhooks: None,
            cache: None,
            database: None,
        }
    }
}
