//! Prediction service HTTP client
//!
//! Uses synchronous HTTP (ureq) to be executor-agnostic.

use log::debug;
use url::Url;

use super::types::{HealthResponse, PredictRequest, PredictResponse};
use crate::models::Prediction;

/// Errors from the prediction service contract
///
/// Display strings are user-facing; the controller surfaces them verbatim.
#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    /// Transport-level failure: nothing answered at all
    #[error("Server is not responding.")]
    Unreachable,

    /// The server answered but the health contract was not satisfied
    #[error("Server is running but not healthy.")]
    Unhealthy,

    /// Predict endpoint returned a non-success HTTP status
    #[error("Prediction request failed with status {0}.")]
    Http(u16),

    /// Application-level failure flag with the server-reported error text
    #[error("{0}")]
    Service(String),

    /// Response body did not match the wire contract
    #[error("Malformed response from server.")]
    Malformed,

    /// The configured api base is not a valid URL
    #[error("Invalid API base URL: {0}")]
    BadUrl(String),
}

/// Seam for the remote prediction service
///
/// The monitor and the controller both consume this; tests substitute a
/// scripted implementation.
pub trait PredictService: Send + Sync {
    /// Probe the health endpoint; `Ok(())` means healthy
    fn health(&self, api_base: &str) -> Result<(), PredictError>;

    /// Classify a batch of email texts
    fn predict(
        &self,
        api_base: &str,
        email_texts: &[String],
    ) -> Result<Vec<Prediction>, PredictError>;
}

/// ureq-backed client for the prediction service
pub struct HttpPredictClient;

impl HttpPredictClient {
    const HEALTH_PATH: &'static str = "/api/v1/health";
    const PREDICT_PATH: &'static str = "/api/v1/predict";

    pub fn new() -> Self {
        Self
    }

    fn endpoint(api_base: &str, path: &str) -> Result<String, PredictError> {
        // Validate before building the request; a garbage base would
        // otherwise surface as a confusing transport error.
        Url::parse(api_base).map_err(|_| PredictError::BadUrl(api_base.to_string()))?;
        Ok(format!("{}{}", api_base.trim_end_matches('/'), path))
    }
}

impl Default for HttpPredictClient {
    fn default() -> Self {
        Self::new()
    }
}

impl PredictService for HttpPredictClient {
    fn health(&self, api_base: &str) -> Result<(), PredictError> {
        let url = Self::endpoint(api_base, Self::HEALTH_PATH)?;

        match ureq::get(&url).call() {
            Ok(mut response) => {
                let health: HealthResponse = response
                    .body_mut()
                    .read_json()
                    .map_err(|_| PredictError::Unhealthy)?;
                if health.is_ok() {
                    Ok(())
                } else {
                    Err(PredictError::Unhealthy)
                }
            }
            // The server answered with an error status: it is running,
            // just not healthy
            Err(ureq::Error::StatusCode(code)) => {
                debug!("Health probe returned status {}", code);
                Err(PredictError::Unhealthy)
            }
            Err(e) => {
                debug!("Health probe transport failure: {}", e);
                Err(PredictError::Unreachable)
            }
        }
    }

    fn predict(
        &self,
        api_base: &str,
        email_texts: &[String],
    ) -> Result<Vec<Prediction>, PredictError> {
        let url = Self::endpoint(api_base, Self::PREDICT_PATH)?;
        let request = PredictRequest {
            email_texts: email_texts.to_vec(),
        };

        match ureq::post(&url).send_json(&request) {
            Ok(mut response) => {
                let body: PredictResponse = response
                    .body_mut()
                    .read_json()
                    .map_err(|_| PredictError::Malformed)?;
                if !body.success {
                    let message = body
                        .error
                        .unwrap_or_else(|| "Prediction service reported failure.".to_string());
                    return Err(PredictError::Service(message));
                }
                let data = body.data.ok_or(PredictError::Malformed)?;
                Ok(data.predictions)
            }
            Err(ureq::Error::StatusCode(code)) => Err(PredictError::Http(code)),
            Err(e) => {
                debug!("Predict transport failure: {}", e);
                Err(PredictError::Unreachable)
            }
        }
    }
}
