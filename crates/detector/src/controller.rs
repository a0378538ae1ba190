//! Controller: orchestrates extract, predict, annotate, reset
//!
//! One instance per open panel session. Every state mutation is mirrored
//! into the shared store so a recreated controller can rehydrate; the
//! extraction result itself arrives on the broadcast channel, never on a
//! request's own ack.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::mpsc::Receiver;

use crate::api::PredictService;
use crate::bus::{Broadcast, MessageBus, PageAck, PageRequest};
use crate::models::{Extraction, Prediction};
use crate::store::{StateStore, get_typed, keys, set_typed};
use crate::tabs::{TabProvider, is_target_page};

/// Guidance when the active tab is not the target page
const MSG_OPEN_TAB: &str = "Open a Gmail tab first.";
/// Terminal error after the injection retry also fails
const MSG_NO_PAGE_ACCESS: &str = "Could not access the page.";
/// Single-item extraction found nothing
const MSG_NO_EMAIL: &str = "No email found on the page.";
/// List extraction found nothing
const MSG_NO_ROWS: &str = "No inbox rows found on the page.";

/// A page request could not be delivered
#[derive(Debug, thiserror::Error)]
#[error("Could not access the page.")]
pub struct AgentUnreachable;

/// Delivery seam towards the page agent
///
/// `deliver` fails when no agent is present in the page; `inject` installs
/// one. The controller retries a failed delivery exactly once after
/// injecting.
pub trait AgentPort: Send + Sync {
    fn deliver(&self, request: PageRequest) -> Result<PageAck, AgentUnreachable>;
    fn inject(&self) -> Result<(), AgentUnreachable>;
}

/// The ephemeral controller
pub struct Controller {
    store: Arc<dyn StateStore>,
    service: Arc<dyn PredictService>,
    tabs: Arc<dyn TabProvider>,
    agent: Arc<dyn AgentPort>,
    events: Receiver<Broadcast>,

    extraction: Option<Extraction>,
    prediction: Option<Vec<Prediction>>,
    error: Option<String>,
    api_base: String,
    loading: bool,
    /// Bumped on every new extraction adoption and reset; predict results
    /// from an older generation are discarded
    generation: u64,
}

impl Controller {
    /// Create a controller, subscribing to broadcasts and rehydrating any
    /// state the store already holds
    pub fn new(
        store: Arc<dyn StateStore>,
        service: Arc<dyn PredictService>,
        tabs: Arc<dyn TabProvider>,
        agent: Arc<dyn AgentPort>,
        bus: &MessageBus,
    ) -> Result<Self> {
        let events = bus.subscribe();

        let api_base = get_typed::<String>(store.as_ref(), keys::API_BASE)
            .context("Failed to rehydrate apiBase")?
            .unwrap_or_else(|| config::DEFAULT_API_BASE.to_string());
        let extraction = get_typed::<Extraction>(store.as_ref(), keys::EXTRACTION)
            .context("Failed to rehydrate extraction")?;
        let prediction = get_typed::<Vec<Prediction>>(store.as_ref(), keys::PREDICTION)
            .context("Failed to rehydrate prediction")?;

        debug!(
            "Controller rehydrated: extraction={}, prediction={}",
            extraction.is_some(),
            prediction.is_some()
        );

        Ok(Self {
            store,
            service,
            tabs,
            agent,
            events,
            extraction,
            prediction,
            error: None,
            api_base,
            loading: false,
            generation: 0,
        })
    }

    pub fn extraction(&self) -> Option<&Extraction> {
        self.extraction.as_ref()
    }

    pub fn prediction(&self) -> Option<&[Prediction]> {
        self.prediction.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Drain pending broadcasts and adopt them
    ///
    /// The host's event loop calls this. A broadcast arriving late, even
    /// after the user navigated away, is adopted the same way: state is
    /// updated, nothing assumes the originating tab still exists.
    pub fn pump_events(&mut self) -> Result<()> {
        while let Ok(broadcast) = self.events.try_recv() {
            self.adopt_broadcast(broadcast)?;
        }
        Ok(())
    }

    fn adopt_broadcast(&mut self, broadcast: Broadcast) -> Result<()> {
        let extraction = match broadcast {
            Broadcast::SingleExtracted(item) => {
                info!("Adopted extracted email: {}", item.subject);
                Extraction::Single(item)
            }
            Broadcast::ListExtracted(inbox) => {
                info!("Adopted inbox extraction of {} row(s)", inbox.len());
                Extraction::Inbox(inbox)
            }
        };

        // A new extraction invalidates the previous prediction batch
        self.extraction = Some(extraction);
        self.prediction = None;
        self.generation += 1;

        let mut entries = HashMap::new();
        entries.insert(
            keys::EXTRACTION.to_string(),
            serde_json::to_value(&self.extraction)?,
        );
        entries.insert(keys::PREDICTION.to_string(), Value::Null);
        self.store
            .set(entries)
            .context("Failed to persist extraction")
    }

    /// Request extraction of the single open email
    pub fn extract_open(&mut self) -> Result<()> {
        self.send_extract(PageRequest::ExtractSingle, MSG_NO_EMAIL)
    }

    /// Request extraction of the inbox listing
    pub fn extract_inbox(&mut self) -> Result<()> {
        self.send_extract(PageRequest::ExtractList, MSG_NO_ROWS)
    }

    fn send_extract(&mut self, request: PageRequest, not_found: &str) -> Result<()> {
        self.error = None;

        if !self.on_target_page() {
            // Terminal guidance; no request is sent
            self.error = Some(MSG_OPEN_TAB.to_string());
            return Ok(());
        }

        let ack = match self.agent.deliver(request.clone()) {
            Ok(ack) => ack,
            Err(_) => {
                // Agent not present yet: inject once and retry exactly once
                info!("Page agent missing; injecting and retrying");
                if self.agent.inject().is_err() {
                    self.error = Some(MSG_NO_PAGE_ACCESS.to_string());
                    return Ok(());
                }
                match self.agent.deliver(request) {
                    Ok(ack) => ack,
                    Err(_) => {
                        self.error = Some(MSG_NO_PAGE_ACCESS.to_string());
                        return Ok(());
                    }
                }
            }
        };

        if !ack.success {
            self.error = Some(not_found.to_string());
        } else {
            debug!("Extraction acked, {} item(s); awaiting broadcast", ack.count);
        }
        Ok(())
    }

    /// Run the two-step predict protocol against the remote service
    ///
    /// No-op without an extraction or while a predict is in flight. On
    /// success the batch is persisted and, if the active tab is still the
    /// target page, applied to the DOM.
    pub fn predict(&mut self) -> Result<()> {
        if self.loading {
            debug!("Predict already in flight; ignoring");
            return Ok(());
        }
        let Some(extraction) = self.extraction.clone() else {
            debug!("Predict with no extraction; nothing to do");
            return Ok(());
        };
        let texts = extraction.texts();
        if texts.is_empty() {
            return Ok(());
        }

        self.loading = true;
        self.error = None;
        let generation = self.generation;

        let outcome = self
            .service
            .health(&self.api_base)
            .and_then(|_| self.service.predict(&self.api_base, &texts));

        self.loading = false;

        let batch = match outcome {
            Ok(batch) => batch,
            Err(e) => {
                warn!("Predict failed: {}", e);
                self.error = Some(e.to_string());
                return Ok(());
            }
        };

        if generation != self.generation {
            // A newer extraction or a reset superseded this call
            debug!("Discarding stale prediction batch");
            return Ok(());
        }

        info!("Received {} prediction(s)", batch.len());
        self.prediction = Some(batch.clone());
        set_typed(self.store.as_ref(), keys::PREDICTION, &batch)
            .context("Failed to persist prediction")?;

        if self.on_target_page() {
            if let Err(e) = self.agent.deliver(PageRequest::ApplyPredictions(batch)) {
                // Annotation is best-effort; the batch itself is safe
                warn!("Could not apply predictions to page: {}", e);
            }
        }
        Ok(())
    }

    /// Clear extraction, prediction, and error state, locally and in the
    /// store; tells the page to drop its annotations if it is active
    pub fn reset(&mut self) -> Result<()> {
        self.extraction = None;
        self.prediction = None;
        self.error = None;
        self.generation += 1;

        let mut entries = HashMap::new();
        entries.insert(keys::EXTRACTION.to_string(), Value::Null);
        entries.insert(keys::PREDICTION.to_string(), Value::Null);
        self.store
            .set(entries)
            .context("Failed to clear persisted state")?;

        if self.on_target_page() {
            if let Err(e) = self.agent.deliver(PageRequest::ClearUi) {
                warn!("Could not clear page annotations: {}", e);
            }
        }
        Ok(())
    }

    /// Update the api base on every edit, no debounce
    ///
    /// The store write is what triggers the monitor's immediate re-probe.
    pub fn set_api_base(&mut self, value: &str) -> Result<()> {
        self.api_base = value.to_string();
        set_typed(self.store.as_ref(), keys::API_BASE, &self.api_base)
            .context("Failed to persist apiBase")
    }

    fn on_target_page(&self) -> bool {
        self.tabs
            .active_tab_url()
            .is_some_and(|url| is_target_page(&url))
    }
}
