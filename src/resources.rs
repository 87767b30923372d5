//! Resource configuration: which volumes and disks to sample.
//!
//! ```yaml
//! resources:
//!   - type: volume
//!     devices: [vg0-lv0, vg0-lv1]
//!   - type: disk
//!     devices: [sda]
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::ResourceError;

/// Resource class of a group of devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceClass {
    Volume,
    Disk,
}

impl ResourceClass {
    pub const ALL: [ResourceClass; 2] = [ResourceClass::Volume, ResourceClass::Disk];

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceClass::Volume => "volume",
            ResourceClass::Disk => "disk",
        }
    }
}

impl fmt::Display for ResourceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resource class and the devices sampled under it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "type")]
    pub class: ResourceClass,
    #[serde(default)]
    pub devices: Vec<String>,
}

/// Ordered list of monitored resources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceConfig {
    #[serde(default)]
    pub resources: Vec<Resource>,
}

impl ResourceConfig {
    /// Reads and parses the resource file.
    pub fn load(path: &Path) -> Result<Self, ResourceError> {
        let content = fs::read_to_string(path).map_err(|source| ResourceError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ResourceError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// (class, device) pairs in file order.
    pub fn devices(&self) -> impl Iterator<Item = (ResourceClass, &str)> {
        self.resources
            .iter()
            .flat_map(|r| r.devices.iter().map(move |d| (r.class, d.as_str())))
    }

    /// Example document written by `config --resources-example`.
    pub fn example() -> Self {
        Self {
            resources: vec![
                Resource {
                    class: ResourceClass::Volume,
                    devices: vec!["vg0-lv0".into(), "vg0-lv1".into()],
                },
                Resource {
                    class: ResourceClass::Disk,
                    devices: vec!["sda".into()],
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_keeps_order() {
        let cfg = ResourceConfig::parse(
            "resources:\n  - type: disk\n    devices: [sdb, sda]\n  - type: volume\n    devices: [vg0-lv0]\n",
        )
        .unwrap();

        let pairs: Vec<_> = cfg.devices().collect();
        assert_eq!(
            pairs,
            [
                (ResourceClass::Disk, "sdb"),
                (ResourceClass::Disk, "sda"),
                (ResourceClass::Volume, "vg0-lv0"),
            ]
        );
    }

    #[test]
    fn test_unknown_type_is_malformed() {
        assert!(ResourceConfig::parse("resources:\n  - type: pool\n    devices: [x]\n").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = ResourceConfig::load(Path::new("/nonexistent/lvm-resources.yaml")).unwrap_err();
        assert!(matches!(err, ResourceError::Read { .. }));
    }

    #[test]
    fn test_load_malformed_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "resources: {{ not: [a list").unwrap();
        let err = ResourceConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ResourceError::Parse { .. }));
    }

    #[test]
    fn test_example_round_trips_through_yaml() {
        let yaml = serde_yaml::to_string(&ResourceConfig::example()).unwrap();
        assert!(yaml.contains("type: volume"));
        assert_eq!(ResourceConfig::parse(&yaml).unwrap(), ResourceConfig::example());
    }
}
