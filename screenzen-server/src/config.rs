//! screenzen-server/src/config.rs
//!
//! Environment-driven configuration, validated once at startup.

use screenzen_core::Error;

const REQUIRED_ENV_VARS: [&str; 5] = [
    "DATABASE_URL",
    "GEMINI_API_KEY",
    "ML_BACKEND_URL",
    "AUTH_API_URL",
    "AUTH_SECRET_KEY",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub ml_backend_url: String,
    pub auth_api_url: String,
    pub auth_secret_key: String,
}

impl Config {
    /// Load configuration from the environment (a `.env` file is honored).
    /// Fails with the full list of missing variables rather than the first.
    pub fn from_env() -> Result<Self, Error> {
        dotenv::dotenv().ok();

        let missing: Vec<&str> = REQUIRED_ENV_VARS
            .iter()
            .filter(|name| std::env::var(name).is_err())
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(Error::Internal(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").unwrap_or_default(),
            gemini_api_key: std::env::var("GEMINI_API_KEY").unwrap_or_default(),
            gemini_model: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-2.5-flash-lite".to_string()),
            ml_backend_url: std::env::var("ML_BACKEND_URL").unwrap_or_default(),
            auth_api_url: std::env::var("AUTH_API_URL").unwrap_or_default(),
            auth_secret_key: std::env::var("AUTH_SECRET_KEY").unwrap_or_default(),
        })
    }
}
