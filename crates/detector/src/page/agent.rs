//! Extraction agent
//!
//! Answers page requests with an immediate acknowledgment and publishes
//! the extracted payload as a separate broadcast. Holds no persisted
//! state of its own: pure request, scrape, publish.

use log::{debug, info};
use std::sync::Arc;

use super::annotate::AnnotationEngine;
use super::surface::PageSurface;
use crate::bus::{Broadcast, MessageBus, PageAck, PageRequest};
use crate::models::{EmailItem, InboxExtraction, combined_text};

/// Scrape the single open email; None if either container is missing or
/// empty after trimming
pub fn scrape_open_email(page: &dyn PageSurface) -> Option<EmailItem> {
    let subject = page.open_subject()?.trim().to_string();
    let body = page.open_body()?.trim().to_string();
    if subject.is_empty() || body.is_empty() {
        return None;
    }
    Some(EmailItem::new(subject, body))
}

/// Scrape the inbox listing in row order
///
/// Rows missing either sub-element, or with empty text after cleanup, are
/// skipped silently; a malformed row must not abort the batch.
pub fn scrape_inbox(page: &dyn PageSurface) -> InboxExtraction {
    let mut entries = Vec::new();
    for index in 0..page.row_count() {
        let Some(subject) = page.row_subject(index) else {
            continue;
        };
        let Some(snippet) = page.row_snippet(index) else {
            continue;
        };

        let subject = subject.trim();
        // Listing snippets carry a leading "-" separator; drop it
        let snippet = snippet.replacen('-', "", 1);
        let snippet = snippet.trim();
        if subject.is_empty() || snippet.is_empty() {
            continue;
        }

        entries.push(combined_text(subject, snippet));
    }
    InboxExtraction::new(entries)
}

/// The page-scoped agent
///
/// One instance lives in the page context; it owns the annotation engine
/// so badges and extraction share a lifetime with the page.
pub struct PageAgent {
    bus: Arc<MessageBus>,
    annotations: AnnotationEngine,
}

impl PageAgent {
    pub fn new(bus: Arc<MessageBus>) -> Self {
        Self {
            bus,
            annotations: AnnotationEngine::new(),
        }
    }

    pub fn annotations(&self) -> &AnnotationEngine {
        &self.annotations
    }

    pub fn annotations_mut(&mut self) -> &mut AnnotationEngine {
        &mut self.annotations
    }

    /// Handle one inbound request against the current page
    ///
    /// Extraction requests are acked with found/count; when something was
    /// found the payload goes out as a broadcast on the bus.
    pub fn handle(&mut self, page: &dyn PageSurface, request: &PageRequest) -> PageAck {
        match request {
            PageRequest::ExtractSingle => self.extract_single(page),
            PageRequest::ExtractList => self.extract_list(page),
            PageRequest::ApplyPredictions(predictions) => {
                self.annotations.apply(page, predictions);
                PageAck::ok(predictions.len())
            }
            PageRequest::ClearUi => {
                self.annotations.clear_ui();
                PageAck::ok(0)
            }
        }
    }

    fn extract_single(&self, page: &dyn PageSurface) -> PageAck {
        debug!("Extract request received");
        let Some(email) = scrape_open_email(page) else {
            debug!("No open email found on page");
            return PageAck::not_found();
        };

        info!("Extracted open email: {}", email.subject);
        self.bus.publish(Broadcast::SingleExtracted(email));
        PageAck::ok(1)
    }

    fn extract_list(&self, page: &dyn PageSurface) -> PageAck {
        let inbox = scrape_inbox(page);
        if inbox.is_empty() {
            debug!("No inbox rows found on page");
            return PageAck::not_found();
        }

        let count = inbox.len();
        info!("Extracted {} inbox row(s)", count);
        self.bus.publish(Broadcast::ListExtracted(inbox));
        PageAck::ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::fixture::{FixturePage, FixtureRow};

    fn row(subject: &str, snippet: &str) -> FixtureRow {
        FixtureRow {
            subject: Some(subject.to_string()),
            snippet: Some(snippet.to_string()),
        }
    }

    #[test]
    fn test_scrape_open_email_trims() {
        let page = FixturePage::with_open("  Invoice  ", "  Please pay \n");
        let email = scrape_open_email(&page).unwrap();
        assert_eq!(email.subject, "Invoice");
        assert_eq!(email.body, "Please pay");
    }

    #[test]
    fn test_scrape_open_email_missing_body() {
        let page = FixturePage::empty();
        assert!(scrape_open_email(&page).is_none());
    }

    #[test]
    fn test_scrape_open_email_whitespace_subject() {
        let page = FixturePage::with_open("   ", "Body text");
        assert!(scrape_open_email(&page).is_none());
    }

    #[test]
    fn test_scrape_inbox_strips_snippet_separator() {
        let page = FixturePage::with_rows(vec![row("Win big", "- You have been selected")]);
        let inbox = scrape_inbox(&page);
        assert_eq!(inbox.entries(), ["Win big\nYou have been selected"]);
    }

    #[test]
    fn test_scrape_inbox_skips_malformed_rows_without_shifting_order() {
        // Row 2 has no snippet element; rows 1 and 3 keep their relative order
        let page = FixturePage::with_rows(vec![
            row("First", "one"),
            FixtureRow {
                subject: Some("Second".to_string()),
                snippet: None,
            },
            row("Third", "three"),
        ]);
        let inbox = scrape_inbox(&page);
        assert_eq!(inbox.len(), 2);
        assert_eq!(inbox.entries(), ["First\none", "Third\nthree"]);
    }

    #[test]
    fn test_scrape_inbox_skips_empty_text_rows() {
        let page = FixturePage::with_rows(vec![row("  ", "snippet"), row("Subject", " - ")]);
        assert!(scrape_inbox(&page).is_empty());
    }

    #[test]
    fn test_extract_single_acks_and_broadcasts() {
        let bus = Arc::new(MessageBus::new());
        let rx = bus.subscribe();
        let mut agent = PageAgent::new(bus);
        let page = FixturePage::with_open("Hello", "World");

        let ack = agent.handle(&page, &PageRequest::ExtractSingle);
        assert!(ack.success);
        assert_eq!(ack.count, 1);
        assert_eq!(
            rx.try_recv().unwrap(),
            Broadcast::SingleExtracted(EmailItem::new("Hello", "World"))
        );
    }

    #[test]
    fn test_extract_single_failure_sends_no_broadcast() {
        let bus = Arc::new(MessageBus::new());
        let rx = bus.subscribe();
        let mut agent = PageAgent::new(bus);

        let ack = agent.handle(&FixturePage::empty(), &PageRequest::ExtractSingle);
        assert!(!ack.success);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_extract_list_acks_count() {
        let bus = Arc::new(MessageBus::new());
        let rx = bus.subscribe();
        let mut agent = PageAgent::new(bus);
        let page = FixturePage::with_rows(vec![row("A", "a"), row("B", "b")]);

        let ack = agent.handle(&page, &PageRequest::ExtractList);
        assert!(ack.success);
        assert_eq!(ack.count, 2);
        match rx.try_recv().unwrap() {
            Broadcast::ListExtracted(inbox) => assert_eq!(inbox.len(), 2),
            other => panic!("unexpected broadcast: {:?}", other),
        }
    }

    #[test]
    fn test_extract_list_empty_page_fails() {
        let bus = Arc::new(MessageBus::new());
        let rx = bus.subscribe();
        let mut agent = PageAgent::new(bus);

        let ack = agent.handle(&FixturePage::empty(), &PageRequest::ExtractList);
        assert!(!ack.success);
        assert_eq!(ack.count, 0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_apply_and_clear_requests() {
        use crate::models::{Label, Prediction};

        let bus = Arc::new(MessageBus::new());
        let mut agent = PageAgent::new(bus);
        let page = FixturePage::with_rows(vec![row("A", "a")]);

        let prediction = Prediction {
            label: Label::Spam,
            decision_score: -0.4,
            model_inference_ms: 2.0,
            model_version: "svm-2024-06".to_string(),
            text_length: 3,
            flag_low_confidence: true,
        };
        let ack = agent.handle(&page, &PageRequest::ApplyPredictions(vec![prediction]));
        assert!(ack.success);
        assert_eq!(agent.annotations().badges().len(), 1);

        let ack = agent.handle(&page, &PageRequest::ClearUi);
        assert!(ack.success);
        assert!(agent.annotations().badges().is_empty());
    }
}
