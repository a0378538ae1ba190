//! Background status monitor
//!
//! A small state machine driven by two independent event sources: the
//! periodic health probe and active-tab changes. It derives the tri-state
//! indicator and pushes it to an [`IconSink`] on every update. Probe
//! failures are absorbed; nothing here surfaces errors to the user.

use chrono::{DateTime, Utc};
use log::{debug, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::RecvTimeoutError;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::api::PredictService;
use crate::models::Indicator;
use crate::store::{StateStore, get_typed, keys};
use crate::tabs::{TabProvider, is_target_page};

/// Fixed health poll interval
pub const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Upper bound on one wait slice, so a stop request is honored promptly
const STOP_CHECK_SLICE: Duration = Duration::from_millis(200);

/// Receives the derived indicator whenever the monitor updates
pub trait IconSink: Send {
    fn set_indicator(&self, indicator: Indicator);
}

/// The monitor's owned state: both inputs start false (indicator red)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorState {
    pub backend_healthy: bool,
    pub on_target_page: bool,
}

impl MonitorState {
    /// Pure, total derivation of the indicator
    ///
    /// | healthy | on page | indicator |
    /// |---------|---------|-----------|
    /// | false   | *       | red       |
    /// | true    | false   | yellow    |
    /// | true    | true    | green     |
    pub fn indicator(&self) -> Indicator {
        match (self.backend_healthy, self.on_target_page) {
            (true, true) => Indicator::Green,
            (true, false) => Indicator::Yellow,
            (false, _) => Indicator::Red,
        }
    }
}

/// Status monitor state machine
pub struct StatusMonitor {
    state: MonitorState,
    icon: Box<dyn IconSink>,
    last_probe_at: Option<DateTime<Utc>>,
}

impl StatusMonitor {
    pub fn new(icon: Box<dyn IconSink>) -> Self {
        let monitor = Self {
            state: MonitorState::default(),
            icon,
            last_probe_at: None,
        };
        monitor.icon.set_indicator(monitor.state.indicator());
        monitor
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn indicator(&self) -> Indicator {
        self.state.indicator()
    }

    pub fn last_probe_at(&self) -> Option<DateTime<Utc>> {
        self.last_probe_at
    }

    /// Record a health probe outcome and refresh the icon
    pub fn on_probe_result(&mut self, healthy: bool) {
        self.state.backend_healthy = healthy;
        self.last_probe_at = Some(Utc::now());
        self.update_icon();
    }

    /// Record the active tab's URL and refresh the icon
    ///
    /// A tab without a URL leaves the current page state untouched.
    pub fn on_tab_url(&mut self, url: Option<&str>) {
        let Some(url) = url else { return };
        self.state.on_target_page = is_target_page(url);
        self.update_icon();
    }

    fn update_icon(&self) {
        self.icon.set_indicator(self.state.indicator());
    }
}

fn current_api_base(store: &dyn StateStore) -> String {
    get_typed::<String>(store, keys::API_BASE)
        .ok()
        .flatten()
        .unwrap_or_else(|| config::DEFAULT_API_BASE.to_string())
}

/// Run the monitor loop until the stop flag is set
///
/// Probes once at startup, then on the fixed interval, and immediately
/// whenever the shared `apiBase` key changes. The active tab is re-read on
/// every iteration. Intended to run on its own thread; the caller sets
/// `stop` and joins on teardown.
pub fn run_monitor(
    monitor: Arc<Mutex<StatusMonitor>>,
    service: Arc<dyn PredictService>,
    store: Arc<dyn StateStore>,
    tabs: Arc<dyn TabProvider>,
    stop: Arc<AtomicBool>,
    interval: Duration,
) {
    let changes = store.watch();
    info!("Status monitor started");

    while !stop.load(Ordering::Relaxed) {
        let api_base = current_api_base(store.as_ref());
        let healthy = service.health(&api_base).is_ok();
        debug!("Health probe against {}: healthy={}", api_base, healthy);

        {
            let mut monitor = monitor.lock().unwrap();
            monitor.on_probe_result(healthy);
            monitor.on_tab_url(tabs.active_tab_url().as_deref());
        }

        // Wait out the interval, waking early for an apiBase change or a
        // stop request. Changes to other keys do not trigger a re-probe.
        let deadline = Instant::now() + interval;
        'wait: loop {
            if stop.load(Ordering::Relaxed) {
                info!("Status monitor stopped");
                return;
            }
            let now = Instant::now();
            if now >= deadline {
                break 'wait;
            }
            let slice = (deadline - now).min(STOP_CHECK_SLICE);
            match changes.recv_timeout(slice) {
                Ok(change) if change.key == keys::API_BASE => {
                    debug!("apiBase changed, re-probing immediately");
                    break 'wait;
                }
                Ok(_) | Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    // Store gone; keep polling on the timer alone
                    std::thread::sleep(slice);
                }
            }
        }
    }

    info!("Status monitor stopped");
}
