//! Config command implementation.
//!
//! Generates exporter configuration and example resource files.

use herakles_lvm_exporter::ResourceConfig;
use std::fs;
use std::path::PathBuf;

use crate::cli::ConfigFormat;
use crate::config::{render_config, Config};

/// Generates configuration files.
pub fn command_config(
    output: Option<PathBuf>,
    format: ConfigFormat,
    commented: bool,
    resources_example: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (content, default_name) = if resources_example {
        let mut content = serde_yaml::to_string(&ResourceConfig::example())?;
        if commented {
            content = format!("{RESOURCE_COMMENTS}\n{content}");
        }
        (content, "lvm-resources.yaml")
    } else {
        let mut content = render_config(&Config::default(), &format)?;
        if commented && matches!(format, ConfigFormat::Yaml) {
            content = format!("{CONFIG_COMMENTS}\n{content}");
        }
        (content, "herakles-lvm-exporter.yaml")
    };

    let output = output.unwrap_or_else(|| PathBuf::from(default_name));

    if output.to_string_lossy() == "-" {
        print!("{}", content);
    } else {
        fs::write(&output, content)?;
        println!("✅ Configuration written to: {}", output.display());
    }

    Ok(())
}

const CONFIG_COMMENTS: &str = r#"# Herakles LVM Exporter Configuration
# ====================================
#
# Server Configuration
# --------------------
# bind: "0.0.0.0"              # Bind IP (0.0.0.0 = all interfaces)
# port: 8080                   # HTTP port (also the first positional CLI argument)
#
# Sampling
# --------
# resources_file: /etc/herakles/lvm-resources.yaml   # Volumes and disks to sample
# driver_config: null          # Driver settings file (tool, tool_args, locale_env,
#                              # privileged, timeout_secs); null = built-in defaults
#
# Feature Flags
# -------------
# enable_health: true          # Enable /health endpoint
#
# Logging
# -------
# log_level: "info"            # off, error, warn, info, debug, trace
"#;

const RESOURCE_COMMENTS: &str = r#"# Herakles LVM Exporter Resources
# ===============================
#
# Each entry names a resource class and the devices sampled under it.
# Device names must match the DEV column of `sar -dp`.
#
#   volume -> lvm_volume_* series
#   disk   -> lvm_disk_* series
"#;
