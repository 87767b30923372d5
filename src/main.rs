//! herakles-lvm-exporter - version 0.1.0
//!
//! LVM volume and disk performance exporter with tracing logging.
//! This is the main entry point that initializes the server and handles subcommands.

mod cli;
mod commands;
mod config;
mod handlers;
mod state;

use axum::{routing::get, Router};
use clap::Parser;
use herakles_lvm_exporter::{LvmCollector, MetricDriver};
use prometheus::Registry;
use std::net::SocketAddr;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::Instant;
use tokio::{net::TcpListener, signal};
use tracing::{debug, info};

use cli::{Args, Commands};
use commands::{command_check, command_config, command_test};
use config::{
    resolve_config, show_config, validate_effective_config, Config, DEFAULT_BIND_ADDR, DEFAULT_PORT,
};
use handlers::{health_handler, metrics_handler, root_handler};
use state::AppState;

/// Initializes tracing logging subsystem with the effective log level.
fn setup_logging(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = config.log_level()?;

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level.as_filter())
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    info!("Logging initialized with level: {:?}", log_level);
    Ok(())
}

/// Helper function to load and validate configuration.
/// Exits the process with error code 1 if validation fails.
fn load_validated_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let config = resolve_config(args)?;
    if let Err(e) = validate_effective_config(&config) {
        eprintln!("❌ Configuration invalid: {}", e);
        std::process::exit(1);
    }
    Ok(config)
}

/// Main application entry point.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Early config resolution for show/check modes
    if args.show_config || args.check_config {
        let config = resolve_config(&args)?;

        if args.check_config {
            if let Err(e) = validate_effective_config(&config) {
                eprintln!("❌ Configuration invalid: {}", e);
                std::process::exit(1);
            }
            println!("✅ Configuration is valid");
            return Ok(());
        }

        return show_config(&config, args.config_format);
    }

    // Handle subcommands
    if let Some(command) = &args.command {
        if let Commands::Config {
            output,
            format,
            commented,
            resources_example,
        } = command
        {
            return command_config(output.clone(), format.clone(), *commented, *resources_example);
        }

        let config = load_validated_config(&args)?;
        setup_logging(&config)?;

        let result = match command {
            Commands::Check => command_check(&config),
            Commands::Test {
                iterations,
                verbose,
            } => command_test(*iterations, *verbose, &config),
            Commands::Config { .. } => unreachable!("Config handled above"),
        };
        if let Err(e) = result {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
        return Ok(());
    }

    let config = load_validated_config(&args)?;
    setup_logging(&config)?;

    info!("Starting herakles-lvm-exporter");

    let bind_ip_str = config.bind.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
    let port = config.port.unwrap_or(DEFAULT_PORT);
    let resources_file = config.resources_file();

    // Initialize Prometheus metrics registry
    let registry = Registry::new();
    let driver = MetricDriver::new(config.driver_config.clone());
    let collector = LvmCollector::new(&resources_file, driver)?;
    registry.register(Box::new(collector.clone()))?;
    debug!("LVM collector registered");

    info!("Sampling devices listed in {}", resources_file.display());

    let state = Arc::new(AppState {
        registry,
        collector,
        config: Arc::new(config.clone()),
        scrapes_total: AtomicU64::new(0),
        start_time: Instant::now(),
    });

    // Setup graceful shutdown signal handlers
    let shutdown_signal = async {
        let ctrl_c = async {
            signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("Failed to install signal handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received SIGINT (Ctrl+C), shutting down gracefully...");
            }
            _ = terminate => {
                info!("Received SIGTERM, shutting down gracefully...");
            }
        }
    };

    // Configure HTTP server routes
    let addr: SocketAddr = format!("{}:{}", bind_ip_str, port).parse()?;

    let mut app = Router::new()
        .route("/", get(root_handler))
        .route("/metrics", get(metrics_handler));

    if config.enable_health.unwrap_or(true) {
        app = app.route("/health", get(health_handler));
    }

    let app = app.with_state(state);

    let listener = TcpListener::bind(addr).await?;
    info!(
        "herakles-lvm-exporter listening on http://{}:{}",
        bind_ip_str,
        listener.local_addr().map(|a| a.port()).unwrap_or(port)
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("herakles-lvm-exporter stopped gracefully");
    Ok(())
}
