//! screenzen-server/src/routes/mod.rs
//!
//! Router assembly and the per-request bearer-token check.

pub mod analyze;
pub mod user;

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, FromRequest, FromRequestParts, Request};
use axum::http::header;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use screenzen_core::Error;

use crate::context::ServerContext;
use crate::error::ApiError;

/// Request bodies are capped high enough to admit base64-encoded screenshots.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(ctx: Arc<ServerContext>) -> Router {
    Router::new()
        .route("/api/analyze/image", post(analyze::analyze_image))
        .route("/api/analyze/manual", post(analyze::analyze_manual))
        .route("/api/user/analyses", get(user::list_analyses))
        .route("/api/user/points", get(user::get_points))
        .route("/api/user/task-complete", post(user::task_complete))
        .route("/api/user/leaderboard", get(user::leaderboard))
        .with_state(ctx)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}

/// The verified caller. Extraction re-verifies the bearer token on every
/// request; the subject claim is the only identity downstream code sees.
pub struct AuthUser(pub String);

impl FromRequestParts<Arc<ServerContext>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &Arc<ServerContext>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| {
                ApiError::from(Error::Unauthenticated(
                    "no token provided or malformed header".to_string(),
                ))
            })?;

        let user_id = ctx.verifier.verify(token).await?;
        Ok(AuthUser(user_id))
    }
}

/// JSON body extractor whose rejections speak the same envelope as every
/// other error. The stock extractor answers malformed bodies with plain
/// text; clients of this API only ever see `{success, error, message}`.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rej| {
            ApiError::new(StatusCode::BAD_REQUEST, "Invalid request", rej.body_text())
        })?;
        Ok(ApiJson(value))
    }
}
