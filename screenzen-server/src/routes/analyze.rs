//! screenzen-server/src/routes/analyze.rs

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use screenzen_core::services::AnalysisOutcome;
use screenzen_core::Error;

use crate::context::ServerContext;
use crate::error::ApiError;
use crate::routes::{ApiJson, AuthUser};

#[derive(Debug, Deserialize)]
pub struct ImageAnalyzeRequest {
    pub image: Option<String>,
    #[serde(rename = "mimeType")]
    pub mime_type: Option<String>,
}

/// POST /api/analyze/image
pub async fn analyze_image(
    State(ctx): State<Arc<ServerContext>>,
    AuthUser(user_id): AuthUser,
    ApiJson(body): ApiJson<ImageAnalyzeRequest>,
) -> Result<Json<Value>, ApiError> {
    let image = body
        .image
        .filter(|image| !image.is_empty())
        .ok_or_else(|| ApiError::from(Error::Validation("no image provided".to_string())))?;
    let mime_type = body.mime_type.unwrap_or_else(|| "image/png".to_string());

    let outcome = ctx
        .analysis_service
        .analyze_image(&user_id, &image, &mime_type)
        .await?;

    Ok(Json(analysis_response(&outcome)?))
}

/// POST /api/analyze/manual
pub async fn analyze_manual(
    State(ctx): State<Arc<ServerContext>>,
    AuthUser(user_id): AuthUser,
    ApiJson(body): ApiJson<Value>,
) -> Result<Json<Value>, ApiError> {
    let outcome = ctx.analysis_service.analyze_manual(&user_id, &body).await?;
    Ok(Json(analysis_response(&outcome)?))
}

/// The success payload: the prediction response with the new log's id
/// attached so the client can track task completion against it.
fn analysis_response(outcome: &AnalysisOutcome) -> Result<Value, ApiError> {
    let mut data = serde_json::to_value(&outcome.result).map_err(Error::from)?;
    data["log_id"] = json!(outcome.log.log_id);
    Ok(json!({ "success": true, "data": data }))
}
