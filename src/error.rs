//! Error types for the sampling pipeline.
//!
//! Executor, parse and not-found failures are reported per device and never
//! abort a scrape. Resource configuration failures abort the whole scrape.

use std::path::PathBuf;

/// Failure to run the external reporting command.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' exited with {status}: {stderr}")]
    Status {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("'{program}' produced non UTF-8 output")]
    Utf8 { program: String },

    #[error("'{program}' did not finish within {secs}s")]
    Timeout { program: String, secs: u64 },

    #[error("command not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Canned(String),
}

/// Failure of a single `collect_metrics` call.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error("unexpected report output: {0}")]
    Parse(String),

    #[error("device not found in report: {0}")]
    DeviceNotFound(String),

    #[error("driver configuration {path}: {message}")]
    Config { path: PathBuf, message: String },
}

/// Failure to load the resource configuration.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("cannot read resource file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed resource file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}
