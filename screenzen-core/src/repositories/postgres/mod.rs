// src/repositories/postgres/mod.rs

pub mod analysis_log;
pub mod user_points;

pub use analysis_log::{AnalysisLogRepository, PostgresAnalysisLogRepository};
pub use user_points::{PostgresUserPointsRepository, UserPointsRepository};
