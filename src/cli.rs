//! CLI arguments and subcommands for herakles-lvm-exporter.
//!
//! This module defines the command-line interface structure using the clap library,
//! including all flags, options, and subcommands.

use clap::{Parser, Subcommand, ValueEnum};
use tracing::level_filters::LevelFilter;
use std::net::IpAddr;
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Maximum level passed to the tracing subscriber.
    pub fn as_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Configuration format options for output
#[derive(Debug, Clone, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "herakles-lvm-exporter",
    about = "Prometheus exporter for LVM volume and disk I/O performance",
    long_about = "Prometheus exporter for LVM volume and disk I/O performance.\n\n\
                  Samples sysstat's sar block device report on every scrape and exposes \
                  IOPS, read/write throughput, response time, service time and utilization \
                  for the volumes and disks listed in the resource file.",
    author = "Michael Moll <exporter@herakles.now> - Herakles",
    version = "0.1.0",
    propagate_version = true,
    after_help = "Project: https://github.com/cansp-dev/herakles-lvm-exporter | More info: https://www.herakles.now | Support: exporter@herakles.now"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// HTTP listen port (0-65535)
    #[arg(value_name = "PORT", conflicts_with = "port")]
    pub port_arg: Option<u16>,

    /// HTTP listen port
    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// Bind to specific interface/IP
    #[arg(long)]
    pub bind: Option<IpAddr>,

    /// Log level (overrides log_level from the config file, default info)
    #[arg(long, value_enum, global = true)]
    pub log_level: Option<LogLevel>,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Resource file listing the volumes and disks to sample
    #[arg(short = 'r', long, global = true)]
    pub resources: Option<PathBuf>,

    /// Driver config file (reporting tool, arguments, timeout)
    #[arg(long, global = true)]
    pub driver_config: Option<PathBuf>,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,

    /// Disable /health endpoint
    #[arg(long)]
    pub disable_health: bool,
}

impl Args {
    /// Port given either positionally or with --port.
    pub fn listen_port(&self) -> Option<u16> {
        self.port_arg.or(self.port)
    }
}

/// Subcommands for additional functionality
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate the reporting tool, resource file and configured devices
    Check,

    /// Generate configuration files
    Config {
        /// Output file path ("-" for stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: ConfigFormat,

        /// Include comments and examples
        #[arg(long)]
        commented: bool,

        /// Write an example resource file instead of the exporter config
        #[arg(long)]
        resources_example: bool,
    },

    /// Sample all configured devices and print the canonical records
    Test {
        /// Number of test iterations
        #[arg(short = 'n', long, default_value_t = 1)]
        iterations: usize,

        /// Show every record instead of a per-device summary
        #[arg(long)]
        verbose: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_port() {
        let args = Args::try_parse_from(["herakles-lvm-exporter", "9100"]).unwrap();
        assert_eq!(args.listen_port(), Some(9100));
    }

    #[test]
    fn test_port_out_of_range_is_rejected() {
        assert!(Args::try_parse_from(["herakles-lvm-exporter", "65536"]).is_err());
        assert!(Args::try_parse_from(["herakles-lvm-exporter", "-1"]).is_err());
        assert!(Args::try_parse_from(["herakles-lvm-exporter", "http"]).is_err());
    }

    #[test]
    fn test_port_flag() {
        let args = Args::try_parse_from(["herakles-lvm-exporter", "--port", "0"]).unwrap();
        assert_eq!(args.listen_port(), Some(0));
    }

    #[test]
    fn test_shared_options_before_subcommand() {
        let args = Args::try_parse_from([
            "herakles-lvm-exporter",
            "--resources",
            "/tmp/r.yaml",
            "--driver-config",
            "/tmp/d.yaml",
            "check",
        ])
        .unwrap();
        assert!(matches!(args.command, Some(Commands::Check)));
        assert_eq!(args.resources, Some(PathBuf::from("/tmp/r.yaml")));
        assert_eq!(args.driver_config, Some(PathBuf::from("/tmp/d.yaml")));
        assert_eq!(args.listen_port(), None);
    }

    #[test]
    fn test_shared_options_after_subcommand() {
        let args = Args::try_parse_from([
            "herakles-lvm-exporter",
            "test",
            "-n",
            "2",
            "-c",
            "/tmp/c.yaml",
            "--resources",
            "/tmp/r.yaml",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert!(matches!(
            args.command,
            Some(Commands::Test { iterations: 2, .. })
        ));
        assert_eq!(args.config, Some(PathBuf::from("/tmp/c.yaml")));
        assert_eq!(args.resources, Some(PathBuf::from("/tmp/r.yaml")));
        assert!(matches!(args.log_level, Some(LogLevel::Debug)));
    }

    #[test]
    fn test_log_level_off_disables_output() {
        assert_eq!(LogLevel::Off.as_filter(), LevelFilter::OFF);
        assert_eq!(LogLevel::Error.as_filter(), LevelFilter::ERROR);
    }

    #[test]
    fn test_log_level_unset_by_default() {
        let args = Args::try_parse_from(["herakles-lvm-exporter"]).unwrap();
        assert!(args.log_level.is_none());
    }

    #[test]
    fn test_subcommand() {
        let args = Args::try_parse_from(["herakles-lvm-exporter", "test", "-n", "3"]).unwrap();
        assert!(matches!(
            args.command,
            Some(Commands::Test { iterations: 3, .. })
        ));
    }
}
