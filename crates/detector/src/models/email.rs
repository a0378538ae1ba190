//! Extracted email content models

use serde::{Deserialize, Serialize};

/// A single opened email scraped from the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailItem {
    /// Subject line, trimmed, never empty
    pub subject: String,
    /// Full body text, trimmed, never empty
    pub body: String,
}

impl EmailItem {
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
        }
    }

    /// The combined text sent to the prediction service
    pub fn combined(&self) -> String {
        combined_text(&self.subject, &self.body)
    }
}

/// Join a subject and its body or snippet into one prediction input
pub fn combined_text(subject: &str, rest: &str) -> String {
    format!("{}\n{}", subject, rest)
}

/// An ordered sequence of `subject\nsnippet` strings scraped from the
/// inbox listing
///
/// Order is DOM row order. Entries have positional identity only; there
/// are no row IDs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboxExtraction(pub Vec<String>);

impl InboxExtraction {
    pub fn new(entries: Vec<String>) -> Self {
        Self(entries)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn entries(&self) -> &[String] {
        &self.0
    }
}

/// The extraction currently held by the controller
///
/// Either one open email or an inbox listing; the next extraction or a
/// reset overwrites it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Extraction {
    Single(EmailItem),
    Inbox(InboxExtraction),
}

impl Extraction {
    /// Prediction inputs in positional order
    pub fn texts(&self) -> Vec<String> {
        match self {
            Extraction::Single(item) => vec![item.combined()],
            Extraction::Inbox(inbox) => inbox.0.clone(),
        }
    }

    /// Number of items the extraction carries
    pub fn len(&self) -> usize {
        match self {
            Extraction::Single(_) => 1,
            Extraction::Inbox(inbox) => inbox.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
