//! Svix webhook signature verification for Clerk identity events.
//!
//! Signed content is `"{svix-id}.{svix-timestamp}.{raw body}"`, the MAC is
//! HMAC-SHA256 keyed with the base64 part of the `whsec_` secret, and the
//! `svix-signature` header carries one or more space-separated `v1,<base64>`
//! entries.

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::config::{WEBHOOK_SECRET_PREFIX, WEBHOOK_TOLERANCE_SECONDS};
use crate::errors::{AppError, AppResult};

type HmacSha256 = Hmac<Sha256>;

pub const HEADER_ID: &str = "svix-id";
pub const HEADER_TIMESTAMP: &str = "svix-timestamp";
pub const HEADER_SIGNATURE: &str = "svix-signature";

/// Headers required to authenticate a delivery
#[derive(Debug, Clone, Copy)]
pub struct WebhookHeaders<'a> {
    pub id: &'a str,
    pub timestamp: &'a str,
    pub signature: &'a str,
}

/// Verifier bound to one signing secret.
#[derive(Clone)]
pub struct WebhookVerifier {
    key: Vec<u8>,
    tolerance_seconds: i64,
}

impl WebhookVerifier {
    /// Build from a `whsec_<base64>` secret (the prefix is optional).
    pub fn new(secret: &str) -> AppResult<Self> {
        let encoded = secret
            .trim()
            .strip_prefix(WEBHOOK_SECRET_PREFIX)
            .unwrap_or(secret.trim());
        let key = STANDARD
            .decode(encoded)
            .map_err(|_| AppError::internal("webhook secret is not valid base64"))?;

        Ok(Self {
            key,
            tolerance_seconds: WEBHOOK_TOLERANCE_SECONDS,
        })
    }

    /// Verify a delivery against the current clock.
    pub fn verify(&self, headers: WebhookHeaders<'_>, body: &[u8]) -> AppResult<()> {
        self.verify_at(headers, body, Utc::now().timestamp())
    }

    /// Verify a delivery as if the clock read `now` (unix seconds).
    pub fn verify_at(&self, headers: WebhookHeaders<'_>, body: &[u8], now: i64) -> AppResult<()> {
        let timestamp: i64 = headers
            .timestamp
            .trim()
            .parse()
            .map_err(|_| AppError::InvalidSignature)?;

        if now.abs_diff(timestamp) > self.tolerance_seconds.unsigned_abs() {
            tracing::warn!(svix_id = %headers.id, timestamp, "Webhook timestamp outside tolerance");
            return Err(AppError::InvalidSignature);
        }

        let matched = headers
            .signature
            .split_whitespace()
            .filter_map(|entry| entry.split_once(','))
            .filter(|(version, _)| *version == "v1")
            .filter_map(|(_, sig)| STANDARD.decode(sig).ok())
            .any(|candidate| self.matches(headers.id, timestamp, body, &candidate));

        if matched {
            Ok(())
        } else {
            tracing::warn!(svix_id = %headers.id, "Webhook signature mismatch");
            Err(AppError::InvalidSignature)
        }
    }

    /// Produce the `v1,<base64>` header value for a payload.
    pub fn sign(&self, id: &str, timestamp: i64, body: &[u8]) -> AppResult<String> {
        Ok(format!("v1,{}", STANDARD.encode(self.sign_bytes(id, timestamp, body)?)))
    }

    fn mac(&self, id: &str, timestamp: i64, body: &[u8]) -> AppResult<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|_| AppError::internal("invalid webhook key length"))?;
        mac.update(format!("{}.{}.", id, timestamp).as_bytes());
        mac.update(body);
        Ok(mac)
    }

    fn sign_bytes(&self, id: &str, timestamp: i64, body: &[u8]) -> AppResult<Vec<u8>> {
        Ok(self.mac(id, timestamp, body)?.finalize().into_bytes().to_vec())
    }

    /// Constant-time comparison through `Mac::verify_slice`.
    fn matches(&self, id: &str, timestamp: i64, body: &[u8], candidate: &[u8]) -> bool {
        self.mac(id, timestamp, body)
            .map(|mac| mac.verify_slice(candidate).is_ok())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_MfKQ9r8GKYqrTwjUPD8ILPZIo2LaLaSw";
    const BODY: &[u8] = br#"{"type":"user.created","data":{"id":"user_1"}}"#;

    fn headers<'a>(id: &'a str, ts: &'a str, sig: &'a str) -> WebhookHeaders<'a> {
        WebhookHeaders {
            id,
            timestamp: ts,
            signature: sig,
        }
    }

    #[test]
    fn accepts_valid_signature() {
        let verifier = WebhookVerifier::new(SECRET).unwrap();
        let now = 1_700_000_000;
        let sig = verifier.sign("msg_1", now, BODY).unwrap();

        let ts = now.to_string();
        assert!(verifier.verify_at(headers("msg_1", &ts, &sig), BODY, now).is_ok());
    }

    #[test]
    fn accepts_any_matching_entry() {
        let verifier = WebhookVerifier::new(SECRET).unwrap();
        let now = 1_700_000_000;
        let good = verifier.sign("msg_1", now, BODY).unwrap();
        let header = format!("v1,AAAA v2,zzz {}", good);

        let ts = now.to_string();
        assert!(verifier.verify_at(headers("msg_1", &ts, &header), BODY, now).is_ok());
    }

    #[test]
    fn rejects_tampered_body() {
        let verifier = WebhookVerifier::new(SECRET).unwrap();
        let now = 1_700_000_000;
        let sig = verifier.sign("msg_1", now, BODY).unwrap();

        let ts = now.to_string();
        let result = verifier.verify_at(headers("msg_1", &ts, &sig), b"{}", now);
        assert!(matches!(result, Err(AppError::InvalidSignature)));
    }

    #[test]
    fn rejects_stale_timestamp() {
        let verifier = WebhookVerifier::new(SECRET).unwrap();
        let sent = 1_700_000_000;
        let sig = verifier.sign("msg_1", sent, BODY).unwrap();

        let ts = sent.to_string();
        let result = verifier.verify_at(headers("msg_1", &ts, &sig), BODY, sent + 301);
        assert!(matches!(result, Err(AppError::InvalidSignature)));
    }

    #[test]
    fn rejects_malformed_headers() {
        let verifier = WebhookVerifier::new(SECRET).unwrap();
        let result = verifier.verify_at(headers("msg_1", "yesterday", "v1,abc"), BODY, 0);
        assert!(matches!(result, Err(AppError::InvalidSignature)));

        let result = verifier.verify_at(headers("msg_1", "0", "garbage"), BODY, 0);
        assert!(matches!(result, Err(AppError::InvalidSignature)));
    }

    #[test]
    fn rejects_extreme_timestamps() {
        let verifier = WebhookVerifier::new(SECRET).unwrap();
        let now = 1_700_000_000;

        for ts in [i64::MIN.to_string(), i64::MAX.to_string()] {
            let result = verifier.verify_at(headers("msg_1", &ts, "v1,AAAA"), BODY, now);
            assert!(matches!(result, Err(AppError::InvalidSignature)));
        }
    }

    #[test]
    fn secret_must_be_base64() {
        assert!(WebhookVerifier::new("whsec_not base64!").is_err());
    }
}
