// screenzen-core/src/clients/prediction.rs

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use crate::models::{PredictionResult, UsageRecord};
use crate::Error;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PredictionClient: Send + Sync {
    /// Forward the usage record unmodified to the prediction service.
    async fn predict(&self, record: &UsageRecord) -> Result<PredictionResult, Error>;
}

/// Prediction client for the external ML service's `/predict` endpoint.
pub struct HttpPredictionClient {
    client: Client,
    base_url: String,
}

impl HttpPredictionClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl PredictionClient for HttpPredictionClient {
    async fn predict(&self, record: &UsageRecord) -> Result<PredictionResult, Error> {
        debug!("sending to prediction service: {:?}", record);

        let response = self
            .client
            .post(format!("{}/predict", self.base_url))
            .json(record)
            .send()
            .await
            .map_err(|e| Error::Prediction(format!("prediction call failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            // Attach the upstream error body when there is one.
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Prediction(format!(
                "prediction service returned {}: {}",
                status, body
            )));
        }

        let result = response
            .json::<PredictionResult>()
            .await
            .map_err(|e| Error::Prediction(format!("malformed prediction response: {}", e)))?;

        info!(
            "prediction: {} (confidence {:.2})",
            result.prediction.stress_level, result.prediction.confidence
        );
        Ok(result)
    }
}
