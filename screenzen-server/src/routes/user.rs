//! screenzen-server/src/routes/user.rs

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::context::ServerContext;
use crate::error::ApiError;
use crate::routes::{ApiJson, AuthUser};

/// GET /api/user/analyses
pub async fn list_analyses(
    State(ctx): State<Arc<ServerContext>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Value>, ApiError> {
    let logs = ctx.points_service.list_analyses(&user_id).await?;
    Ok(Json(json!({ "success": true, "data": logs })))
}

/// GET /api/user/points
pub async fn get_points(
    State(ctx): State<Arc<ServerContext>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Value>, ApiError> {
    let points = ctx.points_service.total_points(&user_id).await?;
    Ok(Json(json!({ "success": true, "points": points })))
}

#[derive(Debug, Deserialize)]
pub struct TaskCompleteRequest {
    pub log_id: Uuid,
    pub task_index: i64,
    pub completed: bool,
    pub points: i64,
}

/// POST /api/user/task-complete
pub async fn task_complete(
    State(ctx): State<Arc<ServerContext>>,
    AuthUser(user_id): AuthUser,
    ApiJson(body): ApiJson<TaskCompleteRequest>,
) -> Result<Json<Value>, ApiError> {
    let outcome = ctx
        .points_service
        .toggle_task(
            &user_id,
            body.log_id,
            body.task_index,
            body.completed,
            body.points,
        )
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": outcome.log,
        "newTotalPoints": outcome.new_total_points,
    })))
}

/// GET /api/user/leaderboard
pub async fn leaderboard(
    State(ctx): State<Arc<ServerContext>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Value>, ApiError> {
    let board = ctx.points_service.leaderboard(&user_id).await?;
    Ok(Json(json!({ "success": true, "data": board })))
}
