//! Configuration for the Auth API service.

use gatehouse_core::AuthConfig;
use std::time::Duration;

/// Outbound mail settings; absent means delivery is disabled and
/// messages are logged instead
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub api_url: String,
    pub api_key: String,
    pub sender_email: String,
    pub sender_name: Option<String>,
}

/// Auth API configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub http_port: u16,

    /// Database URL
    pub database_url: String,

    /// Auth core configuration
    pub auth: AuthConfig,

    /// Mail delivery settings, if configured
    pub mail: Option<MailConfig>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Database
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        // Server port
        let http_port = std::env::var("HTTP_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("HTTP_PORT"))?;

        // Session signing secret (minimum 32 bytes)
        let jwt_secret =
            std::env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;

        // Public base URL embedded in verification/reset links
        let base_url =
            std::env::var("BASE_URL").unwrap_or_else(|_| format!("http://localhost:{http_port}"));

        let mut auth = AuthConfig::new(jwt_secret, base_url)
            .map_err(|e| ConfigError::AuthConfig(e.to_string()))?;

        // Optional session lifetime override (default 1 hour)
        if let Ok(secs) = std::env::var("SESSION_TTL_SECS") {
            let secs: u64 = secs
                .parse()
                .map_err(|_| ConfigError::Invalid("SESSION_TTL_SECS"))?;
            auth = auth.with_session_ttl(Duration::from_secs(secs));
        }

        // Mail delivery is optional; without it messages are logged
        let mail = match std::env::var("MAIL_API_KEY") {
            Ok(api_key) if !api_key.trim().is_empty() => Some(MailConfig {
                api_url: std::env::var("MAIL_API_URL")
                    .unwrap_or_else(|_| "https://api.brevo.com/v3/smtp/email".to_string()),
                api_key,
                sender_email: std::env::var("MAIL_SENDER_EMAIL")
                    .map_err(|_| ConfigError::Missing("MAIL_SENDER_EMAIL"))?,
                sender_name: std::env::var("MAIL_SENDER_NAME").ok(),
            }),
            _ => None,
        };

        Ok(Self {
            http_port,
            database_url,
            auth,
            mail,
        })
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Auth config error: {0}")]
    AuthConfig(String),
}
