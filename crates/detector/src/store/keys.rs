//! Well-known shared store keys

/// Prediction service base URL; writable by any context
pub const API_BASE: &str = "apiBase";

/// Last extraction result; written only by the controller
pub const EXTRACTION: &str = "extraction";

/// Last prediction batch; written only by the controller
pub const PREDICTION: &str = "prediction";
