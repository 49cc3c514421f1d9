// src/repositories/mod.rs

pub mod postgres;

pub use postgres::{
    AnalysisLogRepository, PostgresAnalysisLogRepository, PostgresUserPointsRepository,
    UserPointsRepository,
};
