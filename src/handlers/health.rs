//! Health check endpoint handler.
//!
//! This module provides the `/health` endpoint handler that reports whether
//! the last scrape could load its resource configuration.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use herakles_lvm_exporter::ScrapeReport;
use std::fmt::Write as FmtWrite;
use std::sync::atomic::Ordering;
use tracing::{debug, instrument};

use crate::state::SharedState;

// Time conversion constants
const SECONDS_PER_HOUR: f64 = 3600.0;
const MINUTES_PER_HOUR: f64 = 60.0;
const HOURS_PER_DAY: f64 = 24.0;

/// Footer text for human-readable HTTP endpoints.
pub const FOOTER_TEXT: &str = "Project: https://github.com/cansp-dev/herakles-lvm-exporter | More info: https://www.herakles.now | Support: exporter@herakles.now";

/// Handler for the /health endpoint.
#[instrument(skip(state))]
pub async fn health_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing /health request");

    let last = state.collector.last_scrape();

    let (status, message) = match &last {
        None => (StatusCode::SERVICE_UNAVAILABLE, "No scrape yet"),
        Some(r) if !r.resources_loaded => (StatusCode::SERVICE_UNAVAILABLE, "Last scrape aborted"),
        Some(r) if r.devices_failed > 0 => (StatusCode::OK, "OK - some devices failed"),
        Some(_) => (StatusCode::OK, "OK"),
    };

    let uptime_hours = state.start_time.elapsed().as_secs_f64() / SECONDS_PER_HOUR;
    let uptime_str = if uptime_hours < 1.0 {
        format!("{:.1} minutes", uptime_hours * MINUTES_PER_HOUR)
    } else if uptime_hours < HOURS_PER_DAY {
        format!("{:.1} hours", uptime_hours)
    } else {
        format!("{:.1} days", uptime_hours / HOURS_PER_DAY)
    };

    let table = render_scrape_report(
        last.as_ref(),
        state.scrapes_total.load(Ordering::Relaxed),
        &state.collector.resources_path().display().to_string(),
    );

    debug!("Health check: {} - {}", status, message);
    (
        status,
        [("Content-Type", "text/plain; charset=utf-8")],
        format!("{message}\n\nUptime: {uptime_str}\n\n{table}\n{FOOTER_TEXT}"),
    )
}

/// Renders the last scrape as a plain-text table.
fn render_scrape_report(report: Option<&ScrapeReport>, scrapes: u64, resources: &str) -> String {
    let mut out = String::new();
    writeln!(out, "LAST SCRAPE").ok();
    writeln!(out, "===========").ok();
    writeln!(out).ok();
    writeln!(out, "{:25} | {}", "Resource file", resources).ok();
    writeln!(out, "{:25} | {}", "Scrapes served", scrapes).ok();

    match report {
        None => {
            writeln!(out, "{:25} | {}", "Status", "pending").ok();
        }
        Some(r) => {
            let loaded = if r.resources_loaded { "yes" } else { "no" };
            writeln!(out, "{:25} | {}", "Resources loaded", loaded).ok();
            writeln!(out, "{:25} | {}", "Devices sampled", r.devices_sampled).ok();
            writeln!(out, "{:25} | {}", "Devices failed", r.devices_failed).ok();
            writeln!(out, "{:25} | {}", "Series emitted", r.series).ok();
            writeln!(out, "{:25} | {:.3}s", "Duration", r.duration_seconds).ok();
            if let Some(e) = &r.error {
                writeln!(out, "{:25} | {}", "Error", e).ok();
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_pending() {
        let out = render_scrape_report(None, 0, "/etc/herakles/lvm-resources.yaml");
        assert!(out.contains("pending"));
        assert!(out.contains("/etc/herakles/lvm-resources.yaml"));
    }

    #[test]
    fn test_render_aborted_scrape() {
        let report = ScrapeReport {
            error: Some("cannot read resource file".into()),
            ..ScrapeReport::default()
        };
        let out = render_scrape_report(Some(&report), 3, "r.yaml");
        assert!(out.contains("Resources loaded          | no"));
        assert!(out.contains("cannot read resource file"));
    }
}
