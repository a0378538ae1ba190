//! Badge and popup annotation
//!
//! The engine owns every badge and the single detail popup as explicit
//! state, so rendering is idempotent: `apply` always clears first, and the
//! popup is clear-before-create.

use log::debug;

use super::surface::PageSurface;
use crate::models::{Label, Prediction};

/// Badge color for spam
pub const SPAM_COLOR: &str = "#d93025";
/// Badge color for ham
pub const HAM_COLOR: &str = "#1e8e3e";

fn label_color(label: Label) -> &'static str {
    match label {
        Label::Spam => SPAM_COLOR,
        Label::Ham => HAM_COLOR,
    }
}

/// One rendered badge, attached to a row by ordinal position
#[derive(Debug, Clone, PartialEq)]
pub struct Badge {
    pub row_index: usize,
    pub prediction: Prediction,
}

impl Badge {
    pub fn text(&self) -> &'static str {
        self.prediction.label.as_str()
    }

    pub fn color(&self) -> &'static str {
        label_color(self.prediction.label)
    }
}

/// The singleton detail popup
#[derive(Debug, Clone, PartialEq)]
pub struct DetailPopup {
    pub row_index: usize,
    pub prediction: Prediction,
}

impl DetailPopup {
    /// Full prediction record, one field per line
    pub fn render(&self) -> String {
        let p = &self.prediction;
        format!(
            "label: {}\nscore: {}\ninference ms: {}\nmodel: {}\ntext length: {}\nlow confidence: {}",
            p.label, p.decision_score, p.model_inference_ms, p.model_version, p.text_length,
            p.flag_low_confidence
        )
    }
}

/// Applies and removes visual annotations on the page
pub struct AnnotationEngine {
    badges: Vec<Badge>,
    popup: Option<DetailPopup>,
}

impl AnnotationEngine {
    pub fn new() -> Self {
        Self {
            badges: Vec::new(),
            popup: None,
        }
    }

    pub fn badges(&self) -> &[Badge] {
        &self.badges
    }

    pub fn popup(&self) -> Option<&DetailPopup> {
        self.popup.as_ref()
    }

    /// Remove every badge and the popup if present; safe with nothing
    /// present
    pub fn clear(&mut self) {
        self.badges.clear();
        self.popup = None;
    }

    /// Badge each currently-present row that has a prediction at its
    /// ordinal position
    ///
    /// Clears first, so repeated calls never duplicate badges. Rows beyond
    /// the prediction sequence are left unbadged; that is not an error.
    pub fn apply(&mut self, page: &dyn PageSurface, predictions: &[Prediction]) {
        self.clear();

        let rows = page.row_count();
        for (row_index, prediction) in predictions.iter().enumerate().take(rows) {
            self.badges.push(Badge {
                row_index,
                prediction: prediction.clone(),
            });
        }
        debug!(
            "Applied {} badge(s) across {} row(s)",
            self.badges.len(),
            rows
        );
    }

    /// Open the detail popup for the badge at `row_index`
    ///
    /// Any existing popup is removed first; there is never more than one.
    /// Returns false if no badge sits at that row.
    pub fn open_popup(&mut self, row_index: usize) -> bool {
        self.popup = None;
        let Some(badge) = self.badges.iter().find(|b| b.row_index == row_index) else {
            return false;
        };
        self.popup = Some(DetailPopup {
            row_index,
            prediction: badge.prediction.clone(),
        });
        true
    }

    /// Dismiss the popup without touching badges
    pub fn dismiss_popup(&mut self) {
        self.popup = None;
    }

    /// External clear command: badges and popup both go
    ///
    /// Distinct entry point from `apply` with an empty batch; this is what
    /// the reset flow sends.
    pub fn clear_ui(&mut self) {
        debug!("Clearing page annotations");
        self.clear();
    }
}

impl Default for AnnotationEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::fixture::{FixturePage, FixtureRow};

    fn prediction(label: Label, score: f64) -> Prediction {
        Prediction {
            label,
            decision_score: score,
            model_inference_ms: 3.0,
            model_version: "svm-2024-06".to_string(),
            text_length: 64,
            flag_low_confidence: false,
        }
    }

    fn page_with_rows(count: usize) -> FixturePage {
        FixturePage::with_rows(
            (0..count)
                .map(|i| FixtureRow {
                    subject: Some(format!("Subject {}", i)),
                    snippet: Some(format!("Snippet {}", i)),
                })
                .collect(),
        )
    }

    #[test]
    fn test_apply_badges_rows_positionally() {
        let page = page_with_rows(3);
        let mut engine = AnnotationEngine::new();
        engine.apply(
            &page,
            &[prediction(Label::Spam, -1.0), prediction(Label::Ham, 2.0)],
        );

        let badges = engine.badges();
        assert_eq!(badges.len(), 2);
        assert_eq!(badges[0].row_index, 0);
        assert_eq!(badges[0].text(), "spam");
        assert_eq!(badges[0].color(), SPAM_COLOR);
        assert_eq!(badges[1].row_index, 1);
        assert_eq!(badges[1].text(), "ham");
    }

    #[test]
    fn test_apply_is_idempotent() {
        let page = page_with_rows(2);
        let predictions = [prediction(Label::Spam, -1.0), prediction(Label::Ham, 2.0)];
        let mut engine = AnnotationEngine::new();

        engine.apply(&page, &predictions);
        let first = engine.badges().to_vec();
        engine.apply(&page, &predictions);

        assert_eq!(engine.badges(), first.as_slice());
        assert_eq!(engine.badges().len(), 2);
    }

    #[test]
    fn test_reapply_removes_stale_badges() {
        let page = page_with_rows(3);
        let mut engine = AnnotationEngine::new();

        engine.apply(
            &page,
            &[
                prediction(Label::Spam, -1.0),
                prediction(Label::Ham, 2.0),
                prediction(Label::Ham, 1.0),
            ],
        );
        assert_eq!(engine.badges().len(), 3);

        engine.apply(&page, &[prediction(Label::Ham, 0.5)]);
        assert_eq!(engine.badges().len(), 1);
        assert_eq!(engine.badges()[0].row_index, 0);
    }

    #[test]
    fn test_rows_beyond_predictions_left_unbadged() {
        let page = page_with_rows(5);
        let mut engine = AnnotationEngine::new();
        engine.apply(&page, &[prediction(Label::Spam, -2.0)]);
        assert_eq!(engine.badges().len(), 1);
    }

    #[test]
    fn test_predictions_beyond_rows_ignored() {
        let page = page_with_rows(1);
        let mut engine = AnnotationEngine::new();
        engine.apply(
            &page,
            &[prediction(Label::Spam, -2.0), prediction(Label::Ham, 1.0)],
        );
        assert_eq!(engine.badges().len(), 1);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut engine = AnnotationEngine::new();
        engine.clear();
        engine.clear();
        assert!(engine.badges().is_empty());
        assert!(engine.popup().is_none());
    }

    #[test]
    fn test_popup_is_singleton() {
        let page = page_with_rows(2);
        let mut engine = AnnotationEngine::new();
        engine.apply(
            &page,
            &[prediction(Label::Spam, -1.0), prediction(Label::Ham, 2.0)],
        );

        assert!(engine.open_popup(0));
        assert_eq!(engine.popup().unwrap().row_index, 0);

        assert!(engine.open_popup(1));
        assert_eq!(engine.popup().unwrap().row_index, 1);
    }

    #[test]
    fn test_popup_on_unbadged_row_fails() {
        let page = page_with_rows(2);
        let mut engine = AnnotationEngine::new();
        engine.apply(&page, &[prediction(Label::Spam, -1.0)]);

        assert!(!engine.open_popup(1));
        assert!(engine.popup().is_none());
    }

    #[test]
    fn test_dismiss_keeps_badges() {
        let page = page_with_rows(1);
        let mut engine = AnnotationEngine::new();
        engine.apply(&page, &[prediction(Label::Ham, 1.0)]);
        engine.open_popup(0);
        engine.dismiss_popup();

        assert!(engine.popup().is_none());
        assert_eq!(engine.badges().len(), 1);
    }

    #[test]
    fn test_popup_render_contains_full_record() {
        let popup = DetailPopup {
            row_index: 0,
            prediction: prediction(Label::Spam, -1.5),
        };
        let rendered = popup.render();
        assert!(rendered.contains("label: spam"));
        assert!(rendered.contains("score: -1.5"));
        assert!(rendered.contains("model: svm-2024-06"));
        assert!(rendered.contains("low confidence: false"));
    }
}
