//! Authentication service - Session token verification and user reconciliation.
//!
//! Session tokens are issued by Clerk and verified offline against the
//! instance's RS256 public key. The `sub` claim is the provider user id.
//! A verified user without a local mirror (webhook not yet delivered) is
//! fetched from the identity provider and upserted before the request
//! proceeds.

use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::ClerkConfig;
use crate::domain::User;
use crate::errors::{AppError, AppResult};
use crate::infra::{IdentityProvider, UnitOfWork};

/// Session token claims we rely on
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
    /// Authorized party (frontend origin)
    #[serde(default)]
    pub azp: Option<String>,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Verify a session token and extract its claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;

    /// Resolve the signed-in user, reconciling a missing mirror record
    async fn authenticate(&self, token: &str) -> AppResult<User>;
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    identity: Arc<dyn IdentityProvider>,
    key: Option<DecodingKey>,
    validation: Validation,
}

impl<U: UnitOfWork> Authenticator<U> {
    /// Build from the Clerk settings. An unusable public key leaves every
    /// token rejected instead of failing startup.
    pub fn new(uow: Arc<U>, identity: Arc<dyn IdentityProvider>, config: &ClerkConfig) -> Self {
        let key = config.jwt_public_key.as_deref().and_then(|pem| {
            DecodingKey::from_rsa_pem(pem.as_bytes())
                .map_err(|e| tracing::error!(error = %e, "CLERK_JWT_KEY is not a valid RSA public key"))
                .ok()
        });

        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_aud = false;
        validation.leeway = 5;

        Self {
            uow,
            identity,
            key,
            validation,
        }
    }

    async fn reconcile(&self, user_id: &str) -> AppResult<User> {
        let profile = self.identity.fetch_user(user_id).await?;
        let user = self.uow.users().upsert(profile).await?;
        tracing::info!(user_id = %user.id, "User mirror reconciled from identity provider");
        Ok(user)
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let key = self.key.as_ref().ok_or(AppError::Unauthorized)?;
        let data = decode::<Claims>(token, key, &self.validation)?;
        Ok(data.claims)
    }

    async fn authenticate(&self, token: &str) -> AppResult<User> {
        let claims = self.verify_token(token)?;

        if let Some(user) = self.uow.users().find_by_id(&claims.sub).await? {
            return Ok(user);
        }

        self.reconcile(&claims.sub).await.map_err(|e| {
            tracing::warn!(user_id = %claims.sub, error = %e, "User reconciliation failed");
            AppError::Unauthorized
        })
    }
}
