//! Wire types for the prediction service API

use serde::{Deserialize, Serialize};

use crate::models::Prediction;

/// Response from `GET /api/v1/health`
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<HealthData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthData {
    pub status: String,
}

impl HealthResponse {
    /// Healthy iff the call succeeded and the payload reports an explicit
    /// "OK" status
    pub fn is_ok(&self) -> bool {
        self.success && self.data.as_ref().is_some_and(|d| d.status == "OK")
    }
}

/// Request body for `POST /api/v1/predict`
#[derive(Debug, Clone, Serialize)]
pub struct PredictRequest {
    pub email_texts: Vec<String>,
}

/// Response from `POST /api/v1/predict`
#[derive(Debug, Clone, Deserialize)]
pub struct PredictResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<PredictData>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictData {
    pub predictions: Vec<Prediction>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Label;

    #[test]
    fn test_health_ok() {
        let json = r#"{"success": true, "data": {"status": "OK"}}"#;
        let health: HealthResponse = serde_json::from_str(json).unwrap();
        assert!(health.is_ok());
    }

    #[test]
    fn test_health_degraded_status_is_not_ok() {
        let json = r#"{"success": true, "data": {"status": "DEGRADED"}}"#;
        let health: HealthResponse = serde_json::from_str(json).unwrap();
        assert!(!health.is_ok());
    }

    #[test]
    fn test_health_missing_data_is_not_ok() {
        let json = r#"{"success": true}"#;
        let health: HealthResponse = serde_json::from_str(json).unwrap();
        assert!(!health.is_ok());
    }

    #[test]
    fn test_predict_response_with_error() {
        let json = r#"{"success": false, "error": "model unavailable"}"#;
        let response: PredictResponse = serde_json::from_str(json).unwrap();
        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("model unavailable"));
        assert!(response.data.is_none());
    }

    #[test]
    fn test_predict_response_with_predictions() {
        let json = r#"{
            "success": true,
            "data": {
                "predictions": [{
                    "label": "ham",
                    "decision_score": 2.1,
                    "model_inference_ms": 1.4,
                    "model_version": "svm-2024-06",
                    "text_length": 42,
                    "flag_low_confidence": true
                }]
            }
        }"#;
        let response: PredictResponse = serde_json::from_str(json).unwrap();
        let predictions = response.data.unwrap().predictions;
        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[0].label, Label::Ham);
        assert!(predictions[0].flag_low_confidence);
    }
}
