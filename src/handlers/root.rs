//! Root endpoint handler for the landing page.
//!
//! This module provides the `/` endpoint handler that displays
//! a landing page with the available endpoints and exported series.

use axum::{
    extract::State,
    response::{Html, IntoResponse},
};
use herakles_lvm_exporter::{series_name, MetricName, ResourceClass};
use std::fmt::Write as FmtWrite;
use tracing::{debug, instrument};

use crate::handlers::health::FOOTER_TEXT;
use crate::state::SharedState;

/// Handler for the root `/` endpoint.
#[instrument(skip(state))]
pub async fn root_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing / request");

    let version = env!("CARGO_PKG_VERSION");
    let built = env!("VERGEN_BUILD_TIMESTAMP");

    let uptime_secs = state.start_time.elapsed().as_secs();
    let hours = uptime_secs / 3600;
    let minutes = (uptime_secs % 3600) / 60;
    let seconds = uptime_secs % 60;
    let uptime_str = format!("{}h {}m {}s", hours, minutes, seconds);

    let mut series = String::new();
    for class in ResourceClass::ALL {
        for metric in MetricName::ALL {
            writeln!(
                series,
                "        <li><code>{}{{device=\"...\"}}</code> ({})</li>",
                series_name(class, metric),
                metric.unit()
            )
            .ok();
        }
    }

    let health_item = if state.config.enable_health.unwrap_or(true) {
        r#"<li><a href="/health">/health</a> - result of the last scrape (text)</li>"#
    } else {
        ""
    };

    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Herakles LVM Exporter</title>
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 0; padding: 20px; background: #f5f5f5; }}
        .container {{ max-width: 900px; margin: 0 auto; background: white; padding: 40px; border-radius: 8px; }}
        h1 {{ color: #333; border-bottom: 3px solid #007bff; padding-bottom: 15px; }}
        code {{ background: #e9ecef; padding: 2px 6px; border-radius: 3px; }}
        .footer {{ margin-top: 40px; color: #666; font-size: 0.9em; text-align: center; }}
    </style>
</head>
<body>
<div class="container">
    <h1>Herakles LVM Exporter</h1>
    <p>Version {version} (built {built}) - up {uptime}</p>

    <h2>Endpoints</h2>
    <ul>
        <li><a href="/metrics">/metrics</a> - Prometheus metrics, sampled on every request</li>
        {health_item}
    </ul>

    <h2>Series</h2>
    <p>Resource file: <code>{resources}</code></p>
    <ul>
{series}    </ul>

    <div class="footer">
        <p>{footer}</p>
    </div>
</div>
</body>
</html>"#,
        version = version,
        built = built,
        uptime = uptime_str,
        health_item = health_item,
        resources = state.collector.resources_path().display(),
        series = series,
        footer = FOOTER_TEXT
    );

    Html(html)
}
