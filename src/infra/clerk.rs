//! Clerk Backend API client.
//!
//! Used to reconcile a signed-in user whose mirror record does not exist
//! yet (webhook not delivered, or delivered before the database was up).

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::config::ClerkConfig;
use crate::domain::{IdentityEvent, IdentityProfile};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Source of authoritative user profiles.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Fetch the provider's profile for `user_id`.
    async fn fetch_user(&self, user_id: &str) -> AppResult<IdentityProfile>;
}

#[derive(Debug, Deserialize)]
pub struct ClerkEmailAddress {
    pub email_address: String,
}

/// User object as returned by the Backend API and embedded in webhooks
#[derive(Debug, Deserialize)]
pub struct ClerkUser {
    pub id: String,
    #[serde(default)]
    pub email_addresses: Vec<ClerkEmailAddress>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub image_url: Option<String>,
}

impl From<ClerkUser> for IdentityProfile {
    fn from(user: ClerkUser) -> Self {
        let email = user
            .email_addresses
            .into_iter()
            .next()
            .map(|e| e.email_address)
            .unwrap_or_default();

        IdentityProfile::new(
            user.id,
            email,
            user.first_name.as_deref(),
            user.last_name.as_deref(),
            user.image_url.as_deref(),
        )
    }
}

#[derive(Debug, Deserialize)]
struct DeletedUser {
    id: String,
}

/// Webhook envelope: `{"type": "...", "data": {...}}`
#[derive(Debug, Deserialize)]
struct WebhookEnvelope {
    #[serde(rename = "type")]
    kind: String,
    data: serde_json::Value,
}

/// Decode a verified webhook body into an identity event.
pub fn parse_webhook_event(body: &[u8]) -> AppResult<IdentityEvent> {
    let envelope: WebhookEnvelope = serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("malformed webhook payload: {}", e)))?;

    let event = match envelope.kind.as_str() {
        "user.created" | "user.updated" => {
            let user: ClerkUser = serde_json::from_value(envelope.data)
                .map_err(|e| AppError::BadRequest(format!("malformed user data: {}", e)))?;
            IdentityEvent::Upserted(user.into())
        }
        "user.deleted" => {
            let user: DeletedUser = serde_json::from_value(envelope.data)
                .map_err(|e| AppError::BadRequest(format!("malformed user data: {}", e)))?;
            IdentityEvent::Deleted(user.id)
        }
        other => IdentityEvent::Ignored(other.to_string()),
    };

    Ok(event)
}

/// HTTP client for `GET /users/{id}`
pub struct ClerkClient {
    http: Client,
    api_url: String,
    secret_key: Option<String>,
}

impl ClerkClient {
    pub fn new(config: &ClerkConfig) -> Self {
        Self {
            http: Client::new(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            secret_key: config.secret_key.clone(),
        }
    }
}

#[async_trait]
impl IdentityProvider for ClerkClient {
    async fn fetch_user(&self, user_id: &str) -> AppResult<IdentityProfile> {
        let secret = self
            .secret_key
            .as_deref()
            .ok_or_else(|| AppError::external("CLERK_SECRET_KEY is not configured"))?;

        let response = self
            .http
            .get(format!("{}/users/{}", self.api_url, user_id))
            .bearer_auth(secret)
            .send()
            .await
            .map_err(|e| AppError::external(format!("clerk request failed: {}", e)))?;

        match response.status() {
            StatusCode::NOT_FOUND => return Err(AppError::not_found("User")),
            status if !status.is_success() => {
                return Err(AppError::external(format!("clerk returned {}", status)))
            }
            _ => {}
        }

        let user: ClerkUser = response
            .json()
            .await
            .map_err(|e| AppError::external(format!("invalid clerk response: {}", e)))?;

        tracing::debug!(user_id = %user.id, "Fetched user from identity provider");
        Ok(user.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_takes_first_email_and_joins_names() {
        let user: ClerkUser = serde_json::from_value(serde_json::json!({
            "id": "user_123",
            "email_addresses": [
                {"email_address": "primary@example.com"},
                {"email_address": "other@example.com"}
            ],
            "first_name": "Asha",
            "last_name": "Rao",
            "image_url": "https://img.clerk.com/a.png"
        }))
        .unwrap();

        let profile = IdentityProfile::from(user);
        assert_eq!(profile.id, "user_123");
        assert_eq!(profile.email, "primary@example.com");
        assert_eq!(profile.username, "Asha Rao");
        assert_eq!(profile.image, "https://img.clerk.com/a.png");
    }

    #[test]
    fn webhook_events_map_to_identity_events() {
        let created = br#"{"type":"user.created","data":{"id":"user_1","email_addresses":[{"email_address":"a@b.c"}],"first_name":"A","last_name":null,"image_url":"x"}}"#;
        match parse_webhook_event(created).unwrap() {
            IdentityEvent::Upserted(p) => {
                assert_eq!(p.id, "user_1");
                assert_eq!(p.username, "A");
            }
            other => panic!("unexpected event {:?}", other),
        }

        let deleted = br#"{"type":"user.deleted","data":{"id":"user_1","deleted":true}}"#;
        assert_eq!(
            parse_webhook_event(deleted).unwrap(),
            IdentityEvent::Deleted("user_1".to_string())
        );

        let session = br#"{"type":"session.created","data":{}}"#;
        assert_eq!(
            parse_webhook_event(session).unwrap(),
            IdentityEvent::Ignored("session.created".to_string())
        );

        assert!(matches!(
            parse_webhook_event(b"not json"),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn missing_names_fall_back_to_default() {
        let user: ClerkUser = serde_json::from_value(serde_json::json!({
            "id": "user_456",
            "first_name": null,
            "last_name": null
        }))
        .unwrap();

        let profile = IdentityProfile::from(user);
        assert_eq!(profile.username, "User");
        assert_eq!(profile.email, "");
        assert_eq!(profile.image, "");
    }
}
