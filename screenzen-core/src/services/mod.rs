// src/services/mod.rs

pub mod analysis_service;
pub mod points_service;

pub use analysis_service::{AnalysisOutcome, AnalysisService};
pub use points_service::{PointsService, TaskToggleOutcome};
