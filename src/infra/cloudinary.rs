//! Cloudinary image storage.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{multipart, Client};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::config::CloudinaryConfig;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Image received from a client, ready to be stored
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Durable object storage for room images.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store the image and return its public URL.
    async fn upload(&self, image: ImageUpload) -> AppResult<String>;
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorMessage,
}

#[derive(Debug, Deserialize)]
struct ErrorMessage {
    message: String,
}

/// Signed uploads to the Cloudinary upload API
pub struct CloudinaryStore {
    http: Client,
    config: CloudinaryConfig,
}

impl CloudinaryStore {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    fn upload_url(&self) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/image/upload",
            self.config.cloud_name
        )
    }
}

/// Hex SHA-256 of the sorted parameters followed by the API secret.
pub fn sign_params(params: &[(&str, String)], api_secret: &str) -> String {
    let mut sorted: Vec<_> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let digest = Sha256::digest(format!("{}{}", to_sign, api_secret).as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

#[async_trait]
impl ImageStore for CloudinaryStore {
    async fn upload(&self, image: ImageUpload) -> AppResult<String> {
        if !self.config.is_configured() {
            return Err(AppError::external("Cloudinary is not configured"));
        }

        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign_params(&[("timestamp", timestamp.clone())], &self.config.api_secret);

        let mut part = multipart::Part::bytes(image.bytes).file_name(image.file_name.clone());
        if let Some(mime) = image.content_type.as_deref() {
            part = part
                .mime_str(mime)
                .map_err(|e| AppError::validation(format!("invalid image type: {}", e)))?;
        }

        let form = multipart::Form::new()
            .part("file", part)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let response = self
            .http
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::external(format!("image upload failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let reason = response
                .json::<ErrorBody>()
                .await
                .map(|b| b.error.message)
                .unwrap_or_else(|_| status.to_string());
            return Err(AppError::external(format!("image upload rejected: {}", reason)));
        }

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| AppError::external(format!("invalid upload response: {}", e)))?;

        tracing::info!(file = %image.file_name, url = %uploaded.secure_url, "Image uploaded");
        Ok(uploaded.secure_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_is_hex_sha256_of_sorted_params() {
        let sig = sign_params(&[("timestamp", "1315060510".to_string())], "abcd");
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit()));

        let expected: String = Sha256::digest(b"timestamp=1315060510abcd")
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect();
        assert_eq!(sig, expected);
    }

    #[test]
    fn params_are_sorted_before_signing() {
        let a = sign_params(
            &[("timestamp", "1".to_string()), ("folder", "rooms".to_string())],
            "s",
        );
        let b = sign_params(
            &[("folder", "rooms".to_string()), ("timestamp", "1".to_string())],
            "s",
        );
        assert_eq!(a, b);
    }
}
