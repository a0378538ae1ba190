//! Panel - interactive control panel for the spam classification assistant
//!
//! Plays the ephemeral controller-UI role: wires the shared store, the
//! message bus, the background monitor, and the controller together, and
//! drives them from a small stdin command loop. The "page" is a JSON
//! fixture loaded with the `page` command.

use anyhow::Result;
use log::{error, info, warn};
use std::io::{BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use detector::controller::{AgentPort, AgentUnreachable, Controller};
use detector::monitor::{HEALTH_POLL_INTERVAL, IconSink, StatusMonitor, run_monitor};
use detector::page::{FixturePage, PageAgent};
use detector::store::{SqliteStateStore, StateStore, get_typed, keys, set_typed};
use detector::tabs::TabProvider;
use detector::{
    Extraction, HttpPredictClient, Indicator, MessageBus, PageAck, PageRequest, TARGET_HOST,
};

/// Tab state shared between the REPL and the monitor thread
///
/// Loading a fixture page is the panel's equivalent of focusing the
/// webmail tab.
struct PanelTabs {
    url: Mutex<Option<String>>,
}

impl PanelTabs {
    fn new() -> Self {
        Self {
            url: Mutex::new(None),
        }
    }

    fn focus_target(&self) {
        *self.url.lock().unwrap() = Some(format!("https://{}/mail/u/0/#inbox", TARGET_HOST));
    }

    fn focus_elsewhere(&self) {
        *self.url.lock().unwrap() = Some("about:blank".to_string());
    }
}

impl TabProvider for PanelTabs {
    fn active_tab_url(&self) -> Option<String> {
        self.url.lock().unwrap().clone()
    }
}

/// Agent port over the in-process page context
///
/// The agent starts out missing on a freshly loaded page, so the
/// controller's inject-and-retry path runs exactly as it would against a
/// real page.
struct PanelAgent {
    bus: Arc<MessageBus>,
    page: Mutex<Option<FixturePage>>,
    agent: Mutex<Option<PageAgent>>,
}

impl PanelAgent {
    fn new(bus: Arc<MessageBus>) -> Self {
        Self {
            bus,
            page: Mutex::new(None),
            agent: Mutex::new(None),
        }
    }

    fn load_page(&self, page: FixturePage) {
        *self.page.lock().unwrap() = Some(page);
        // A fresh page has no agent in it yet
        *self.agent.lock().unwrap() = None;
    }

    fn with_agent<R>(&self, f: impl FnOnce(&mut PageAgent) -> R) -> Option<R> {
        self.agent.lock().unwrap().as_mut().map(f)
    }
}

impl AgentPort for PanelAgent {
    fn deliver(&self, request: PageRequest) -> Result<PageAck, AgentUnreachable> {
        let page = self.page.lock().unwrap();
        let Some(page) = page.as_ref() else {
            return Err(AgentUnreachable);
        };
        let mut agent = self.agent.lock().unwrap();
        let Some(agent) = agent.as_mut() else {
            return Err(AgentUnreachable);
        };
        Ok(agent.handle(page, &request))
    }

    fn inject(&self) -> Result<(), AgentUnreachable> {
        if self.page.lock().unwrap().is_none() {
            return Err(AgentUnreachable);
        }
        info!("Injecting page agent");
        *self.agent.lock().unwrap() = Some(PageAgent::new(self.bus.clone()));
        Ok(())
    }
}

/// Icon sink that reports indicator changes on the log
struct LogIcon {
    current: Mutex<Option<Indicator>>,
}

impl IconSink for LogIcon {
    fn set_indicator(&self, indicator: Indicator) {
        let mut current = self.current.lock().unwrap();
        if *current != Some(indicator) {
            info!("Indicator: {}", indicator);
            *current = Some(indicator);
        }
    }
}

fn print_state(controller: &Controller) {
    match controller.extraction() {
        None => println!("No email extracted"),
        Some(Extraction::Single(item)) => {
            println!("Subject: {}", item.subject);
            println!("Body: {}", item.body);
        }
        Some(Extraction::Inbox(inbox)) => {
            println!("Extracted {} inbox row(s)", inbox.len());
        }
    }
    if let Some(batch) = controller.prediction() {
        for (index, prediction) in batch.iter().enumerate() {
            println!(
                "  [{}] {} (score {:.3}{})",
                index,
                prediction.label,
                prediction.decision_score,
                if prediction.flag_low_confidence {
                    ", low confidence"
                } else {
                    ""
                }
            );
        }
    }
    if let Some(message) = controller.error() {
        println!("Error: {}", message);
    }
}

fn print_help() {
    println!("Commands:");
    println!("  page <fixture.json>  load a page fixture and focus the webmail tab");
    println!("  close                focus a non-webmail tab");
    println!("  extract              extract the open email");
    println!("  inbox                extract the inbox listing");
    println!("  predict              classify the current extraction");
    println!("  reset                clear all state and page annotations");
    println!("  api <url>            change the prediction service base URL");
    println!("  status               show indicator and config");
    println!("  badges               list page badges");
    println!("  popup <row>          open the detail popup for a badged row");
    println!("  dismiss              dismiss the detail popup");
    println!("  quit                 exit");
}

fn run() -> Result<()> {
    let store: Arc<dyn StateStore> = Arc::new(SqliteStateStore::new(config::state_db_path()?)?);

    // Seed apiBase from settings on first run
    if get_typed::<String>(store.as_ref(), keys::API_BASE)?.is_none() {
        let settings = config::Settings::load_or_default();
        set_typed(store.as_ref(), keys::API_BASE, &settings.api_base)?;
    }

    let bus = Arc::new(MessageBus::new());
    let service = Arc::new(HttpPredictClient::new());
    let tabs = Arc::new(PanelTabs::new());
    let agent = Arc::new(PanelAgent::new(bus.clone()));

    let monitor = Arc::new(Mutex::new(StatusMonitor::new(Box::new(LogIcon {
        current: Mutex::new(None),
    }))));
    let stop = Arc::new(AtomicBool::new(false));
    let monitor_thread = {
        let monitor = monitor.clone();
        let service = service.clone();
        let store = store.clone();
        let tabs = tabs.clone();
        let stop = stop.clone();
        std::thread::spawn(move || {
            run_monitor(monitor, service, store, tabs, stop, HEALTH_POLL_INTERVAL)
        })
    };

    let mut controller = Controller::new(
        store.clone(),
        service.clone(),
        tabs.clone(),
        agent.clone(),
        &bus,
    )?;

    println!("mailsift panel - type 'help' for commands");
    print_state(&controller);

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let mut parts = line.trim().splitn(2, ' ');
        let command = parts.next().unwrap_or("");
        let argument = parts.next().map(str::trim);

        match (command, argument) {
            ("", _) => continue,
            ("help", _) => print_help(),
            ("page", Some(path)) => match FixturePage::load(path) {
                Ok(page) => {
                    agent.load_page(page);
                    tabs.focus_target();
                    println!("Page loaded; webmail tab focused");
                }
                Err(e) => error!("Failed to load fixture: {:#}", e),
            },
            ("close", _) => {
                tabs.focus_elsewhere();
                println!("Webmail tab no longer active");
            }
            ("extract", _) => controller.extract_open()?,
            ("inbox", _) => controller.extract_inbox()?,
            ("predict", _) => controller.predict()?,
            ("reset", _) => controller.reset()?,
            ("api", Some(url)) => controller.set_api_base(url)?,
            ("status", _) => {
                let monitor = monitor.lock().unwrap();
                println!("Indicator: {}", monitor.indicator());
                println!("API base: {}", controller.api_base());
                match monitor.last_probe_at() {
                    Some(at) => println!("Last probe: {}", at.format("%H:%M:%S")),
                    None => println!("Last probe: never"),
                }
            }
            ("badges", _) => {
                let listed = agent.with_agent(|a| {
                    for badge in a.annotations().badges() {
                        println!(
                            "  row {}: {} ({})",
                            badge.row_index,
                            badge.text(),
                            badge.color()
                        );
                    }
                    a.annotations().badges().len()
                });
                match listed {
                    Some(0) => println!("No badges"),
                    Some(_) => {}
                    None => println!("No page loaded"),
                }
            }
            ("popup", Some(row)) => match row.parse::<usize>() {
                Ok(row) => {
                    let opened = agent.with_agent(|a| {
                        if a.annotations_mut().open_popup(row) {
                            println!("{}", a.annotations().popup().unwrap().render());
                            true
                        } else {
                            false
                        }
                    });
                    if opened != Some(true) {
                        println!("No badge at row {}", row);
                    }
                }
                Err(_) => warn!("popup takes a row number"),
            },
            ("dismiss", _) => {
                let _ = agent.with_agent(|a| a.annotations_mut().dismiss_popup());
            }
            ("quit", _) | ("exit", _) => break,
            _ => {
                println!("Unknown command; type 'help'");
                continue;
            }
        }

        // Adopt any broadcasts the command produced, then show the result
        controller.pump_events()?;
        if !matches!(command, "status" | "badges" | "popup" | "dismiss" | "help") {
            print_state(&controller);
        }
    }

    stop.store(true, Ordering::Relaxed);
    if monitor_thread.join().is_err() {
        warn!("Monitor thread panicked during shutdown");
    }
    Ok(())
}

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    // Bootstrap config directory
    if let Err(e) = config::init() {
        error!("Failed to initialize config directory: {}", e);
    }

    if let Err(e) = run() {
        error!("Panel exited with error: {:#}", e);
        std::process::exit(1);
    }
}
