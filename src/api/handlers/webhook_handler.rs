//! Identity provider webhook.

use axum::{body::Bytes, extract::State, http::HeaderMap, routing::post, Router};

use crate::api::AppState;
use crate::errors::{AppError, AppResult};
use crate::infra::webhook::{HEADER_ID, HEADER_SIGNATURE, HEADER_TIMESTAMP};
use crate::infra::{parse_webhook_event, WebhookHeaders};
use crate::types::{ApiResponse, Empty};

pub fn webhook_routes() -> Router<AppState> {
    Router::new().route("/clerk", post(clerk_webhook))
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> AppResult<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::InvalidSignature)
}

/// Clerk user lifecycle events, signed with Svix
#[utoipa::path(
    post,
    path = "/api/clerk",
    tag = "Webhooks",
    request_body(content = String, content_type = "application/json"),
    responses(
        (status = 200, description = "Event applied"),
        (status = 400, description = "Signature verification failed")
    )
)]
pub async fn clerk_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<ApiResponse<Empty>> {
    let verifier = state.webhooks.as_ref().ok_or_else(|| {
        tracing::error!("Webhook received but CLERK_WEBHOOK_SECRET is not configured");
        AppError::InvalidSignature
    })?;

    let signed = WebhookHeaders {
        id: header(&headers, HEADER_ID)?,
        timestamp: header(&headers, HEADER_TIMESTAMP)?,
        signature: header(&headers, HEADER_SIGNATURE)?,
    };
    verifier.verify(signed, &body)?;

    let event = parse_webhook_event(&body)?;
    tracing::info!(message_id = %signed.id, "Identity webhook verified");

    state.user_service.apply_identity_event(event).await?;

    Ok(ApiResponse::message("Webhook Received"))
}
