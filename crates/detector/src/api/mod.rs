//! Remote prediction service client

mod client;
mod types;

pub use client::{HttpPredictClient, PredictError, PredictService};
pub use types::{HealthData, HealthResponse, PredictData, PredictRequest, PredictResponse};
