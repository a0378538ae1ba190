//! Domain models shared across all execution contexts

mod email;
mod indicator;
mod prediction;

pub use email::{EmailItem, Extraction, InboxExtraction, combined_text};
pub use indicator::Indicator;
pub use prediction::{Label, Prediction};
