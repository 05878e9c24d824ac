//! Service Container - Centralized service access.
//!
//! Handlers depend on the service traits only; `Services` wires the
//! concrete managers over one Unit of Work and the external collaborators.

use std::future::Future;
use std::sync::Arc;

use super::{
    AuthService, Authenticator, BookingManager, BookingService, HotelManager, HotelService,
    RoomManager, RoomService, UserManager, UserService,
};
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::{IdentityProvider, ImageStore, Persistence, RoomLocks, UnitOfWork};
use crate::jobs::NotificationQueue;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
///
/// Provides centralized access to all application services.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    /// Get authentication service
    fn auth(&self) -> Arc<dyn AuthService>;

    /// Get user service
    fn users(&self) -> Arc<dyn UserService>;

    fn hotels(&self) -> Arc<dyn HotelService>;

    fn rooms(&self) -> Arc<dyn RoomService>;

    fn bookings(&self) -> Arc<dyn BookingService>;
}

/// External systems the services talk to besides the database
#[derive(Clone)]
pub struct Collaborators {
    pub identity: Arc<dyn IdentityProvider>,
    pub images: Arc<dyn ImageStore>,
    pub locks: Arc<dyn RoomLocks>,
    pub outbox: Arc<dyn NotificationQueue>,
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    user_service: Arc<dyn UserService>,
    hotel_service: Arc<dyn HotelService>,
    room_service: Arc<dyn RoomService>,
    booking_service: Arc<dyn BookingService>,
}

impl Services {
    /// Wire every service over one Unit of Work
    pub fn new<U: UnitOfWork + 'static>(uow: Arc<U>, config: &Config, deps: Collaborators) -> Self {
        Self {
            auth_service: Arc::new(Authenticator::new(uow.clone(), deps.identity, &config.clerk)),
            user_service: Arc::new(UserManager::new(uow.clone())),
            hotel_service: Arc::new(HotelManager::new(uow.clone())),
            room_service: Arc::new(RoomManager::new(uow.clone(), deps.images)),
            booking_service: Arc::new(BookingManager::new(uow, deps.locks, deps.outbox, config)),
        }
    }

    /// Create service container from database connection and config
    pub fn from_connection(
        db: sea_orm::DatabaseConnection,
        config: &Config,
        deps: Collaborators,
    ) -> Self {
        Self::new(Arc::new(Persistence::new(db)), config, deps)
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    fn hotels(&self) -> Arc<dyn HotelService> {
        self.hotel_service.clone()
    }

    fn rooms(&self) -> Arc<dyn RoomService> {
        self.room_service.clone()
    }

    fn bookings(&self) -> Arc<dyn BookingService> {
        self.booking_service.clone()
    }
}

/// Parallel execution utilities for running independent operations concurrently.
pub mod parallel {
    use super::*;

    /// Execute a collection of homogeneous async operations in parallel.
    ///
    /// Every operation runs to completion; the first error in input order
    /// is returned. Results keep the input order.
    pub async fn join_all<F, T>(futures: Vec<F>) -> AppResult<Vec<T>>
    where
        F: Future<Output = AppResult<T>>,
    {
        let results = futures::future::join_all(futures).await;
        results.into_iter().collect()
    }
}
