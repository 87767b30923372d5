//! Application state management for the exporter.
//!
//! This module defines the shared application state that is passed
//! to HTTP handlers.

use herakles_lvm_exporter::LvmCollector;
use prometheus::Registry;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;

/// Type alias for shared application state.
pub type SharedState = Arc<AppState>;

/// Global application state shared across requests.
pub struct AppState {
    pub registry: Registry,
    /// Handle on the registered collector, for scrape reports.
    pub collector: LvmCollector,
    pub config: Arc<Config>,
    /// Number of /metrics requests served.
    pub scrapes_total: AtomicU64,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}
