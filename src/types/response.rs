//! Response envelope shared by every JSON endpoint.

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// `{success: true, message?, ...payload}`
///
/// The payload is flattened into the envelope, so it must serialize as a
/// map or struct.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub data: T,
}

/// Payload for message-only responses
#[derive(Debug, Default, Serialize)]
pub struct Empty {}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data,
        }
    }
}

impl ApiResponse<Empty> {
    pub fn message(message: impl Into<String>) -> Self {
        Self::with_message(Empty::default(), message)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Rooms {
        rooms: Vec<u8>,
    }

    #[test]
    fn payload_is_flattened_into_envelope() {
        let body = serde_json::to_value(ApiResponse::success(Rooms { rooms: vec![1] })).unwrap();
        assert_eq!(body, serde_json::json!({"success": true, "rooms": [1]}));
    }

    #[test]
    fn message_only_response() {
        let body = serde_json::to_value(ApiResponse::message("Hotel Registered Successfully")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"success": true, "message": "Hotel Registered Successfully"})
        );
    }
}
