//! Configuration management for herakles-lvm-exporter.
//!
//! This module handles loading, merging, and validating configuration from files
//! and CLI arguments. It supports YAML, JSON, and TOML formats.

use crate::cli::{Args, ConfigFormat, LogLevel};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use tracing::info;

// Default configuration constants
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_RESOURCES_FILE: &str = "/etc/herakles/lvm-resources.yaml";

/// Exporter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server configuration
    pub port: Option<u16>,
    pub bind: Option<String>,

    // Sampling
    #[serde(alias = "resources-file")]
    pub resources_file: Option<PathBuf>,
    #[serde(alias = "driver-config")]
    pub driver_config: Option<PathBuf>,

    // Feature flags
    #[serde(alias = "enable-health")]
    pub enable_health: Option<bool>,

    // Logging
    #[serde(alias = "log-level")]
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: Some(DEFAULT_BIND_ADDR.to_string()),
            port: Some(DEFAULT_PORT),
            resources_file: Some(PathBuf::from(DEFAULT_RESOURCES_FILE)),
            driver_config: None,
            enable_health: Some(true),
            log_level: Some("info".into()),
        }
    }
}

impl Config {
    pub fn resources_file(&self) -> PathBuf {
        self.resources_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_RESOURCES_FILE))
    }

    /// Effective log level, `info` when unset.
    pub fn log_level(&self) -> Result<LogLevel, String> {
        match self.log_level.as_deref() {
            None => Ok(LogLevel::Info),
            Some(level) => LogLevel::from_str(level, true).map_err(|_| {
                format!(
                    "Invalid log_level '{}', expected one of off, error, warn, info, debug, trace",
                    level
                )
            }),
        }
    }
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(bind) = cfg.bind.as_deref() {
        if bind.parse::<IpAddr>().is_err() {
            return Err(format!("Invalid bind address '{}', expected an IP address", bind).into());
        }
    }

    cfg.log_level()?;

    if cfg
        .resources_file
        .as_ref()
        .is_some_and(|p| p.as_os_str().is_empty())
    {
        return Err("resources_file must not be empty".into());
    }

    if let Some(path) = cfg.driver_config.as_deref() {
        if !path.exists() {
            return Err(format!("Driver config file not found: {}", path.display()).into());
        }
    }

    Ok(())
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref())?
    };

    if let Some(bind_ip) = args.bind {
        config.bind = Some(bind_ip.to_string());
    }

    // Only override port if the user supplied it on the CLI.
    if let Some(cli_port) = args.listen_port() {
        config.port = Some(cli_port);
    }

    if let Some(level) = &args.log_level {
        config.log_level = level.to_possible_value().map(|v| v.get_name().to_string());
    }

    if let Some(resources) = &args.resources {
        config.resources_file = Some(resources.clone());
    }
    if let Some(driver_config) = &args.driver_config {
        config.driver_config = Some(driver_config.clone());
    }

    if args.disable_health {
        config.enable_health = Some(false);
    }

    Ok(config)
}

/// Configuration loading with multiple format support
pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let path = if let Some(p) = path {
        PathBuf::from(p)
    } else {
        // Try default locations
        let defaults = [
            "/etc/herakles/lvm-exporter.yaml",
            "/etc/herakles/lvm-exporter.yml",
            "/etc/herakles/lvm-exporter.json",
            "./herakles-lvm-exporter.yaml",
            "./herakles-lvm-exporter.yml",
            "./herakles-lvm-exporter.json",
        ];

        match defaults.iter().find(|p| Path::new(p).exists()) {
            Some(p) => PathBuf::from(p),
            None => return Ok(Config::default()),
        }
    };

    let content = fs::read_to_string(&path)
        .map_err(|e| format!("Cannot read config file {}: {}", path.display(), e))?;

    let config: Config = match path.extension().and_then(|s| s.to_str()) {
        Some("json") => serde_json::from_str(&content)?,
        Some("toml") => toml::from_str(&content)?,
        // Default to YAML
        _ => serde_yaml::from_str(&content)?,
    };
    info!("Loaded configuration from: {}", path.display());
    Ok(config)
}

/// Renders configuration in the requested format
pub fn render_config(
    config: &Config,
    format: &ConfigFormat,
) -> Result<String, Box<dyn std::error::Error>> {
    Ok(match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    })
}

/// Shows configuration in requested format
pub fn show_config(config: &Config, format: ConfigFormat) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", render_config(config, &format)?);
    Ok(())
}
