//! CLI command implementations for herakles-lvm-exporter.
//!
//! This module provides implementations for all CLI subcommands:
//! - `check`: Tool, resource file and device validation
//! - `config`: Configuration file generation
//! - `test`: One-shot sampling of the configured devices

pub mod check;
pub mod config;
pub mod test;

// Re-export command functions
pub use check::command_check;
pub use config::command_config;
pub use test::command_test;
