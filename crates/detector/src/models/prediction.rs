//! Prediction models returned by the remote service

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification label for one email text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Spam,
    Ham,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Spam => "spam",
            Label::Ham => "ham",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classification result
///
/// `predictions[i]` always describes input text `i`; matching is purely
/// positional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: Label,
    pub decision_score: f64,
    pub model_inference_ms: f64,
    pub model_version: String,
    pub text_length: u64,
    pub flag_low_confidence: bool,
}
