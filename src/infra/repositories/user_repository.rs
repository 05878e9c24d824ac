//! User repository: the local mirror of identity provider accounts.

use async_trait::async_trait;
use sea_orm::{
    sea_query::OnConflict, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, Set,
};

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::domain::{IdentityProfile, User, UserRole};
use crate::errors::{storage_error, AppResult, OptionExt};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by identity provider id
    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>>;

    /// Find every user whose id is in `ids`
    async fn find_many(&self, ids: Vec<String>) -> AppResult<Vec<User>>;

    /// Insert or refresh the mirror from a provider profile.
    ///
    /// Role and recent searches of an existing record are preserved.
    async fn upsert(&self, profile: IdentityProfile) -> AppResult<User>;

    /// Delete the mirror; returns whether a record existed
    async fn delete(&self, id: &str) -> AppResult<bool>;

    /// Change the user's role
    async fn set_role(&self, id: &str, role: UserRole) -> AppResult<User>;

    /// Replace the recent searched cities list
    async fn set_recent_cities(&self, id: &str, cities: Vec<String>) -> AppResult<User>;
}

/// Concrete implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(&self, id: &str) -> AppResult<user::Model> {
        UserEntity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(storage_error)?
            .ok_or_not_found("User")
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(storage_error)?;

        Ok(result.map(User::from))
    }

    async fn find_many(&self, ids: Vec<String>) -> AppResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = UserEntity::find()
            .filter(user::Column::Id.is_in(ids))
            .all(&self.db)
            .await
            .map_err(storage_error)?;

        Ok(models.into_iter().map(User::from).collect())
    }

    async fn upsert(&self, profile: IdentityProfile) -> AppResult<User> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(profile.id),
            email: Set(profile.email),
            username: Set(profile.username),
            image: Set(profile.image),
            role: Set(UserRole::Guest.as_str().to_string()),
            recent_searched_cities: Set(Vec::new()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = UserEntity::insert(active_model)
            .on_conflict(
                OnConflict::column(user::Column::Id)
                    .update_columns([
                        user::Column::Email,
                        user::Column::Username,
                        user::Column::Image,
                        user::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_with_returning(&self.db)
            .await
            .map_err(storage_error)?;

        Ok(User::from(model))
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = UserEntity::delete_by_id(id.to_string())
            .exec(&self.db)
            .await
            .map_err(storage_error)?;

        Ok(result.rows_affected > 0)
    }

    async fn set_role(&self, id: &str, role: UserRole) -> AppResult<User> {
        let mut active: ActiveModel = self.find_model(id).await?.into();
        active.role = Set(role.as_str().to_string());
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await.map_err(storage_error)?;
        Ok(User::from(model))
    }

    async fn set_recent_cities(&self, id: &str, cities: Vec<String>) -> AppResult<User> {
        let mut active: ActiveModel = self.find_model(id).await?.into();
        active.recent_searched_cities = Set(cities);
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await.map_err(storage_error)?;
        Ok(User::from(model))
    }
}
