// src/services/analysis_service.rs
//
// The analysis pipeline: extract (image path only) -> predict -> persist.
// Linear, no retries; the first failing step aborts the whole request.

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::clients::{ExtractionClient, PredictionClient};
use crate::models::{AnalysisLog, NewAnalysisLog, PredictionResult, UsageRecord};
use crate::repositories::AnalysisLogRepository;
use crate::Error;

/// What a completed pipeline run hands back to the HTTP layer.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub result: PredictionResult,
    pub log: AnalysisLog,
}

pub struct AnalysisService {
    extraction: Arc<dyn ExtractionClient>,
    prediction: Arc<dyn PredictionClient>,
    logs: Arc<dyn AnalysisLogRepository>,
}

impl AnalysisService {
    pub fn new(
        extraction: Arc<dyn ExtractionClient>,
        prediction: Arc<dyn PredictionClient>,
        logs: Arc<dyn AnalysisLogRepository>,
    ) -> Self {
        Self {
            extraction,
            prediction,
            logs,
        }
    }

    /// Image path: extract the usage record from the screenshot, then run the
    /// rest of the pipeline.
    pub async fn analyze_image(
        &self,
        user_id: &str,
        image_base64: &str,
        mime_type: &str,
    ) -> Result<AnalysisOutcome, Error> {
        info!("processing image upload for user {}", user_id);

        let usage = self.extraction.extract(image_base64, mime_type).await?;
        self.predict_and_record(user_id, usage).await
    }

    /// Manual path: validate the six fields up front, then run the pipeline.
    /// Validation failures happen before any external call is made.
    pub async fn analyze_manual(&self, user_id: &str, body: &Value) -> Result<AnalysisOutcome, Error> {
        info!("processing manual input for user {}", user_id);

        let usage = UsageRecord::from_manual(body)?;
        self.predict_and_record(user_id, usage).await
    }

    async fn predict_and_record(
        &self,
        user_id: &str,
        usage: UsageRecord,
    ) -> Result<AnalysisOutcome, Error> {
        let result = self.prediction.predict(&usage).await?;

        let new_log = build_new_log(user_id, &usage, &result)?;
        let log = self.logs.insert(&new_log).await?;
        info!("analysis complete for user {}, log {}", user_id, log.log_id);

        Ok(AnalysisOutcome { result, log })
    }
}

/// Build the row for a fresh analysis: completion flags all false, sized to
/// the recommended task list, and zero points earned.
fn build_new_log(
    user_id: &str,
    usage: &UsageRecord,
    result: &PredictionResult,
) -> Result<NewAnalysisLog, Error> {
    let tasks_completed_status = vec![false; result.recommendations.tasks.len()];

    Ok(NewAnalysisLog {
        user_id: user_id.to_string(),
        api_response_timestamp: result.timestamp,
        usage: usage.clone(),
        predicted_stress_level: result.prediction.stress_level.clone(),
        prediction_confidence: result.prediction.confidence,
        prediction_probabilities: result.prediction.probabilities.clone(),
        recommendation_message: result.recommendations.message.clone(),
        recommendation_stress_level: result.recommendations.stress_level.clone(),
        recommendation_insights: serde_json::to_value(&result.recommendations.insights)?,
        recommendation_tasks: serde_json::to_value(&result.recommendations.tasks)?,
        recommendation_gamification: result.recommendations.gamification.clone(),
        tasks_completed_status,
        points_earned_for_analysis: 0,
    })
}
