//! User service - profile, recent searches and identity mirroring.
//!
//! DDD: Orchestrates domain operations via Unit of Work.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::user::push_recent_city;
use crate::domain::{IdentityEvent, User, UserProfile};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserService: Send + Sync {
    /// Get the mirrored user by provider id
    async fn get_user(&self, id: &str) -> AppResult<User>;

    /// Role and recent searches of the signed-in user
    async fn profile(&self, id: &str) -> AppResult<UserProfile>;

    /// Remember a searched city, keeping the most recent distinct entries
    async fn store_recent_search(&self, id: &str, city: &str) -> AppResult<UserProfile>;

    /// Apply a verified identity lifecycle event to the mirror
    async fn apply_identity_event(&self, event: IdentityEvent) -> AppResult<()>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> UserManager<U> {
    /// Create new user service instance with Unit of Work
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn get_user(&self, id: &str) -> AppResult<User> {
        self.uow.users().find_by_id(id).await?.ok_or_not_found("User")
    }

    async fn profile(&self, id: &str) -> AppResult<UserProfile> {
        self.get_user(id).await.map(UserProfile::from)
    }

    async fn store_recent_search(&self, id: &str, city: &str) -> AppResult<UserProfile> {
        if city.trim().is_empty() {
            return Err(AppError::validation("City is required"));
        }

        let user = self.get_user(id).await?;
        let cities = push_recent_city(&user.recent_searched_cities, city);
        let updated = self.uow.users().set_recent_cities(id, cities).await?;

        tracing::debug!(user_id = %id, city = %city.trim(), "Recent search stored");
        Ok(updated.into())
    }

    async fn apply_identity_event(&self, event: IdentityEvent) -> AppResult<()> {
        match event {
            IdentityEvent::Upserted(profile) => {
                let user = self.uow.users().upsert(profile).await?;
                tracing::info!(user_id = %user.id, "User mirror upserted");
            }
            IdentityEvent::Deleted(id) => {
                let removed = self.uow.users().delete(&id).await?;
                tracing::info!(user_id = %id, removed, "User mirror deleted");
            }
            IdentityEvent::Ignored(kind) => {
                tracing::debug!(event = %kind, "Ignoring identity event");
            }
        }
        Ok(())
    }
}
