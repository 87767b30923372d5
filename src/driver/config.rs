//! Driver configuration: which reporting tool to run and how.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::DriverError;

/// Settings for invoking the activity reporting tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Reporting tool path or alias (default: sar)
    #[serde(default = "default_tool")]
    pub tool: String,

    /// Arguments selecting the block device report (default: -dp 1 1)
    #[serde(default = "default_tool_args", alias = "tool-args")]
    pub tool_args: Vec<String>,

    /// Locale assignment passed through `env`; empty runs the tool directly
    #[serde(default = "default_locale_env", alias = "locale-env")]
    pub locale_env: String,

    /// Run through the privileged executor (default: false)
    #[serde(default)]
    pub privileged: bool,

    /// Kill the tool after this many seconds, 0 waits forever (default: 30)
    #[serde(default = "default_timeout_secs", alias = "timeout-secs")]
    pub timeout_secs: u64,
}

fn default_tool() -> String {
    "sar".to_string()
}
fn default_tool_args() -> Vec<String> {
    vec!["-dp".into(), "1".into(), "1".into()]
}
fn default_locale_env() -> String {
    "LC_ALL=C".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            tool: default_tool(),
            tool_args: default_tool_args(),
            locale_env: default_locale_env(),
            privileged: false,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl DriverConfig {
    /// Loads the driver configuration. A missing `path` yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, DriverError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = fs::read_to_string(path).map_err(|e| DriverError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| DriverError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    /// Program and arguments for one report invocation.
    pub fn invocation(&self) -> (&str, Vec<&str>) {
        let tool_args = self.tool_args.iter().map(String::as_str);
        if self.locale_env.is_empty() {
            (self.tool.as_str(), tool_args.collect())
        } else {
            let args = [self.locale_env.as_str(), self.tool.as_str()]
                .into_iter()
                .chain(tool_args)
                .collect();
            ("env", args)
        }
    }
}
