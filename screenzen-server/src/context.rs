//! screenzen-server/src/context.rs
//!
//! The global server context: service-client handles constructed once at
//! start and shared by reference into every request handler.

use std::sync::Arc;

use screenzen_core::auth::{SessionTokenVerifier, TokenVerifier};
use screenzen_core::clients::{GeminiExtractionClient, HttpPredictionClient};
use screenzen_core::db::Database;
use screenzen_core::repositories::postgres::analysis_log::{
    AnalysisLogRepository, PostgresAnalysisLogRepository,
};
use screenzen_core::repositories::postgres::user_points::{
    PostgresUserPointsRepository, UserPointsRepository,
};
use screenzen_core::services::{AnalysisService, PointsService};
use screenzen_core::Error;

use crate::config::Config;

pub struct ServerContext {
    pub db: Database,
    pub verifier: Arc<dyn TokenVerifier>,
    pub analysis_service: Arc<AnalysisService>,
    pub points_service: Arc<PointsService>,
}

impl ServerContext {
    pub async fn new(config: &Config) -> Result<Self, Error> {
        let db = Database::new(&config.database_url).await?;
        db.migrate().await?;

        let http = reqwest::Client::new();

        let verifier: Arc<dyn TokenVerifier> = Arc::new(SessionTokenVerifier::new(
            http.clone(),
            config.auth_api_url.clone(),
            config.auth_secret_key.clone(),
        ));

        let extraction = Arc::new(GeminiExtractionClient::new(
            http.clone(),
            config.gemini_api_key.clone(),
            config.gemini_model.clone(),
        ));
        let prediction = Arc::new(HttpPredictionClient::new(
            http,
            config.ml_backend_url.clone(),
        ));

        let log_repo: Arc<dyn AnalysisLogRepository> =
            Arc::new(PostgresAnalysisLogRepository::new(db.pool().clone()));
        let points_repo: Arc<dyn UserPointsRepository> =
            Arc::new(PostgresUserPointsRepository::new(db.pool().clone()));

        let analysis_service = Arc::new(AnalysisService::new(
            extraction,
            prediction,
            log_repo.clone(),
        ));
        let points_service = Arc::new(PointsService::new(log_repo, points_repo));

        Ok(Self {
            db,
            verifier,
            analysis_service,
            points_service,
        })
    }
}
