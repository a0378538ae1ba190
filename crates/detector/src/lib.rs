//! Detector crate - Core logic for the spam classification assistant
//!
//! This crate provides the coordination protocol between the three
//! execution contexts:
//! - Shared durable key-value store (get/set/watch, memory and sqlite)
//! - Typed message bus (page requests, acks, broadcasts)
//! - Remote prediction service client
//! - Background status monitor with tri-state indicator
//! - Page-context extraction agent and annotation engine
//! - Controller orchestrating extract, predict, annotate, reset
//!
//! This crate has zero UI dependencies and is executor-agnostic: all HTTP
//! is synchronous and cross-context channels are std mpsc.

pub mod api;
pub mod bus;
pub mod controller;
pub mod models;
pub mod monitor;
pub mod page;
pub mod store;
pub mod tabs;

pub use api::{HttpPredictClient, PredictError, PredictService};
pub use bus::{Broadcast, MessageBus, PageAck, PageRequest};
pub use controller::{AgentPort, AgentUnreachable, Controller};
pub use models::{EmailItem, Extraction, InboxExtraction, Indicator, Label, Prediction};
pub use monitor::{HEALTH_POLL_INTERVAL, IconSink, MonitorState, StatusMonitor, run_monitor};
pub use page::{AnnotationEngine, FixturePage, FixtureRow, PageAgent, PageSurface};
pub use store::{
    InMemoryStateStore, SqliteStateStore, StateStore, StoreChange, get_typed, keys, set_typed,
};
pub use tabs::{TARGET_HOST, TabProvider, is_target_page};
