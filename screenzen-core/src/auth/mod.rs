// screenzen-core/src/auth/mod.rs
//
// Bearer-token verification against the hosted auth provider. Every request
// re-verifies; nothing is cached.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::debug;

use crate::Error;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Verify a bearer credential and return the subject claim, which is the
    /// canonical user identifier for all downstream operations.
    async fn verify(&self, token: &str) -> Result<String, Error>;
}

/// Verifies session tokens by calling the auth provider's verification
/// endpoint with the service secret key.
pub struct SessionTokenVerifier {
    client: Client,
    base_url: String,
    secret_key: String,
}

impl SessionTokenVerifier {
    pub fn new(client: Client, base_url: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            secret_key: secret_key.into(),
        }
    }
}

#[async_trait]
impl TokenVerifier for SessionTokenVerifier {
    async fn verify(&self, token: &str) -> Result<String, Error> {
        let response = self
            .client
            .post(format!("{}/tokens/verify", self.base_url))
            .header("Authorization", format!("Bearer {}", self.secret_key))
            .json(&json!({ "token": token }))
            .send()
            .await
            .map_err(|e| Error::Unauthenticated(format!("token verification failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            // The upstream reason is kept for diagnostics only.
            return Err(Error::Unauthenticated(format!(
                "token verification failed: {} {}",
                status, body
            )));
        }

        let claims = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| Error::Unauthenticated(format!("malformed verification response: {}", e)))?;

        let sub = claims["sub"]
            .as_str()
            .ok_or_else(|| Error::Unauthenticated("no sub claim in verified token".to_string()))?;

        debug!("token verified for subject {}", sub);
        Ok(sub.to_string())
    }
}
