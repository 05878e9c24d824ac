//! Application settings loaded from environment variables.

use std::env;
use std::time::Duration;

use super::constants::{
    DEFAULT_CLERK_API_URL, DEFAULT_CORS_ORIGINS, DEFAULT_CURRENCY, DEFAULT_DATABASE_URL,
    DEFAULT_DB_CONNECT_TIMEOUT_SECS, DEFAULT_DB_MAX_CONNECTIONS,
    DEFAULT_DB_OPERATION_TIMEOUT_SECS, DEFAULT_REDIS_URL, DEFAULT_SENDER_EMAIL,
    DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, DEFAULT_SMTP_PORT,
};

/// Clerk identity provider settings
#[derive(Clone, Default)]
pub struct ClerkConfig {
    /// Backend API base URL
    pub api_url: String,
    /// Backend API secret key (`sk_...`)
    pub secret_key: Option<String>,
    /// Svix webhook signing secret (`whsec_...`)
    pub webhook_secret: Option<String>,
    /// PEM public key used to verify session tokens offline
    pub jwt_public_key: Option<String>,
}

/// Cloudinary object storage settings
#[derive(Clone, Default)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl CloudinaryConfig {
    pub fn is_configured(&self) -> bool {
        !self.cloud_name.is_empty() && !self.api_key.is_empty() && !self.api_secret.is_empty()
    }
}

/// SMTP relay settings for the email worker
#[derive(Clone)]
pub struct SmtpConfig {
    pub host: Option<String>,
    pub port: u16,
    pub user: Option<String>,
    pub pass: Option<String>,
    pub sender: String,
}

impl SmtpConfig {
    pub fn is_configured(&self) -> bool {
        self.host.is_some()
    }
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: DEFAULT_SMTP_PORT,
            user: None,
            pass: None,
            sender: DEFAULT_SENDER_EMAIL.to_string(),
        }
    }
}

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub currency: String,
    pub db_connect_timeout: Duration,
    pub db_operation_timeout: Duration,
    pub db_max_connections: u32,
    pub clerk: ClerkConfig,
    pub cloudinary: CloudinaryConfig,
    pub smtp: SmtpConfig,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("redis_url", &"[REDACTED]")
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("cors_origins", &self.cors_origins)
            .field("currency", &self.currency)
            .field("db_connect_timeout", &self.db_connect_timeout)
            .field("db_operation_timeout", &self.db_operation_timeout)
            .field("clerk_secret_key", &"[REDACTED]")
            .field("clerk_webhook_secret", &"[REDACTED]")
            .field("cloudinary_cloud_name", &self.cloudinary.cloud_name)
            .field("cloudinary_api_secret", &"[REDACTED]")
            .field("smtp_host", &self.smtp.host)
            .field("smtp_pass", &"[REDACTED]")
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            redis_url: DEFAULT_REDIS_URL.to_string(),
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            cors_origins: split_list(DEFAULT_CORS_ORIGINS),
            currency: DEFAULT_CURRENCY.to_string(),
            db_connect_timeout: Duration::from_secs(DEFAULT_DB_CONNECT_TIMEOUT_SECS),
            db_operation_timeout: Duration::from_secs(DEFAULT_DB_OPERATION_TIMEOUT_SECS),
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            clerk: ClerkConfig {
                api_url: DEFAULT_CLERK_API_URL.to_string(),
                ..ClerkConfig::default()
            },
            cloudinary: CloudinaryConfig::default(),
            smtp: SmtpConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Missing Clerk keys only produce warnings: protected routes and the
    /// webhook endpoint reject every request until they are provided.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let clerk = ClerkConfig {
            api_url: env::var("CLERK_API_URL").unwrap_or(defaults.clerk.api_url),
            secret_key: non_empty("CLERK_SECRET_KEY"),
            webhook_secret: non_empty("CLERK_WEBHOOK_SECRET"),
            // PEM keys are often stored with escaped newlines in .env files
            jwt_public_key: non_empty("CLERK_JWT_KEY").map(|k| k.replace("\\n", "\n")),
        };

        if clerk.jwt_public_key.is_none() {
            tracing::warn!("CLERK_JWT_KEY not set, session tokens cannot be verified");
        }
        if clerk.webhook_secret.is_none() {
            tracing::warn!("CLERK_WEBHOOK_SECRET not set, identity webhooks will be rejected");
        }

        let config = Self {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            redis_url: env::var("REDIS_URL").unwrap_or(defaults.redis_url),
            server_host: env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: parsed("SERVER_PORT").unwrap_or(defaults.server_port),
            cors_origins: env::var("CORS_ORIGINS")
                .map(|v| split_list(&v))
                .unwrap_or(defaults.cors_origins),
            currency: env::var("CURRENCY").unwrap_or(defaults.currency),
            db_connect_timeout: parsed("DB_CONNECT_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.db_connect_timeout),
            db_operation_timeout: parsed("DB_OPERATION_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.db_operation_timeout),
            db_max_connections: parsed("DB_MAX_CONNECTIONS").unwrap_or(defaults.db_max_connections),
            clerk,
            cloudinary: CloudinaryConfig {
                cloud_name: env::var("CLOUDINARY_CLOUD_NAME").unwrap_or_default(),
                api_key: env::var("CLOUDINARY_API_KEY").unwrap_or_default(),
                api_secret: env::var("CLOUDINARY_API_SECRET").unwrap_or_default(),
            },
            smtp: SmtpConfig {
                host: non_empty("SMTP_HOST"),
                port: parsed("SMTP_PORT").unwrap_or(DEFAULT_SMTP_PORT),
                user: non_empty("SMTP_USER"),
                pass: non_empty("SMTP_PASS"),
                sender: env::var("SENDER_EMAIL").unwrap_or(defaults.smtp.sender),
            },
        };

        if !config.cloudinary.is_configured() {
            tracing::warn!("Cloudinary not configured, room creation will fail");
        }

        config
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timeouts_match_storage_client_bounds() {
        let config = Config::default();
        assert_eq!(config.db_connect_timeout, Duration::from_secs(5));
        assert_eq!(config.db_operation_timeout, Duration::from_secs(45));
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let mut config = Config::default();
        config.clerk.secret_key = Some("sk_live_secret".to_string());
        config.smtp.pass = Some("hunter2".to_string());

        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("sk_live_secret"));
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn cors_origins_are_split_and_trimmed() {
        assert_eq!(
            split_list(" http://a.test , ,http://b.test"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }
}
