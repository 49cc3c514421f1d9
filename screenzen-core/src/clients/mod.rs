// screenzen-core/src/clients/mod.rs

pub mod extraction;
pub mod prediction;

pub use extraction::{ExtractionClient, GeminiExtractionClient};
pub use prediction::{HttpPredictionClient, PredictionClient};
