use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
///
/// Integration secrets are optional at startup: each handler that depends on
/// one fails closed with a configuration error when it is missing.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub redis_url: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub razorpay_key_id: Option<String>,
    pub razorpay_key_secret: Option<String>,
    pub identifier_salt: String,
    /// Proxies in front of the server that append to `x-forwarded-for`.
    pub trusted_proxy_hops: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            redis_url: optional_env("REDIS_URL"),
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            razorpay_key_id: optional_env("RAZORPAY_KEY_ID"),
            razorpay_key_secret: optional_env("RAZORPAY_KEY_SECRET"),
            identifier_salt: std::env::var("IDENTIFIER_SALT").unwrap_or_default(),
            trusted_proxy_hops: std::env::var("TRUSTED_PROXY_HOPS")
                .unwrap_or_else(|_| "0".to_string())
                .parse::<usize>()
                .context("TRUSTED_PROXY_HOPS must be a non-negative integer")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Both halves of the Razorpay credential pair, if configured.
    pub fn razorpay_credentials(&self) -> Option<(&str, &str)> {
        match (&self.razorpay_key_id, &self.razorpay_key_secret) {
            (Some(id), Some(secret)) => Some((id.as_str(), secret.as_str())),
            _ => None,
        }
    }
}

/// Reads an env var, treating unset and blank values the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
