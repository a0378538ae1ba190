//! JSON-backed page surface
//!
//! Used for testing and by the panel harness as a stand-in for a live
//! page. A fixture file looks like:
//!
//! ```json
//! {
//!   "open": { "subject": "Invoice", "body": "Please pay..." },
//!   "rows": [
//!     { "subject": "Win big", "snippet": "- You have been selected" },
//!     { "subject": "Standup notes" }
//!   ]
//! }
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::surface::PageSurface;

/// One listing row; either sub-element may be missing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixtureRow {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct FixtureOpenItem {
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    body: Option<String>,
}

/// In-memory page surface loaded from JSON
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixturePage {
    #[serde(default)]
    open: Option<FixtureOpenItem>,
    #[serde(default)]
    rows: Vec<FixtureRow>,
}

impl FixturePage {
    /// An empty page: no open item, no rows
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load a fixture from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        config::load_json_file(path.as_ref())
    }

    /// Build a page with one open email
    pub fn with_open(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            open: Some(FixtureOpenItem {
                subject: Some(subject.into()),
                body: Some(body.into()),
            }),
            rows: Vec::new(),
        }
    }

    /// Build a page with listing rows
    pub fn with_rows(rows: Vec<FixtureRow>) -> Self {
        Self { open: None, rows }
    }
}

impl PageSurface for FixturePage {
    fn open_subject(&self) -> Option<String> {
        self.open.as_ref().and_then(|o| o.subject.clone())
    }

    fn open_body(&self) -> Option<String> {
        self.open.as_ref().and_then(|o| o.body.clone())
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn row_subject(&self, index: usize) -> Option<String> {
        self.rows.get(index).and_then(|r| r.subject.clone())
    }

    fn row_snippet(&self, index: usize) -> Option<String> {
        self.rows.get(index).and_then(|r| r.snippet.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fixture_json() {
        let json = r#"{
            "open": { "subject": "Hi", "body": "There" },
            "rows": [
                { "subject": "A", "snippet": "a" },
                { "subject": "B" }
            ]
        }"#;
        let page: FixturePage = serde_json::from_str(json).unwrap();
        assert_eq!(page.open_subject().as_deref(), Some("Hi"));
        assert_eq!(page.row_count(), 2);
        assert_eq!(page.row_subject(1).as_deref(), Some("B"));
        assert!(page.row_snippet(1).is_none());
    }

    #[test]
    fn test_empty_page() {
        let page = FixturePage::empty();
        assert!(page.open_subject().is_none());
        assert!(page.open_body().is_none());
        assert_eq!(page.row_count(), 0);
    }

    #[test]
    fn test_out_of_range_row_is_none() {
        let page = FixturePage::with_rows(vec![FixtureRow {
            subject: Some("A".to_string()),
            snippet: Some("a".to_string()),
        }]);
        assert!(page.row_subject(5).is_none());
    }
}
