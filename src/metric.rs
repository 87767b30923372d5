//! Canonical metric vocabulary and the records the driver produces.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Job tag attached to every record.
pub const JOB: &str = "herakles-lvm-exporter";

/// Component tag attached to every record.
pub const COMPONENT: &str = "Volume";

/// The closed set of quantities the driver understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MetricName {
    Iops,
    ReadThroughput,
    WriteThroughput,
    ResponseTime,
    ServiceTime,
    UtilizationPercentage,
}

impl MetricName {
    /// All canonical metrics in reporting order.
    pub const ALL: [MetricName; 6] = [
        MetricName::Iops,
        MetricName::ReadThroughput,
        MetricName::WriteThroughput,
        MetricName::ResponseTime,
        MetricName::ServiceTime,
        MetricName::UtilizationPercentage,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MetricName::Iops => "IOPS",
            MetricName::ReadThroughput => "ReadThroughput",
            MetricName::WriteThroughput => "WriteThroughput",
            MetricName::ResponseTime => "ResponseTime",
            MetricName::ServiceTime => "ServiceTime",
            MetricName::UtilizationPercentage => "UtilizationPercentage",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            MetricName::Iops => "tps",
            MetricName::ReadThroughput | MetricName::WriteThroughput => "KB/s",
            MetricName::ResponseTime | MetricName::ServiceTime => "ms",
            MetricName::UtilizationPercentage => "%",
        }
    }

    /// Looks up a canonical name. Anything outside the vocabulary is `None`.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == name)
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One (timestamp, value) observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    pub timestamp: i64,
    pub value: f64,
}

/// One measured quantity for one device at one point in time.
///
/// `samples` is never empty for a record returned by the driver.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRecord {
    pub instance_id: String,
    pub instance_name: String,
    pub job: String,
    pub labels: HashMap<String, String>,
    pub component: String,
    pub name: MetricName,
    pub unit: String,
    pub aggr_type: String,
    pub samples: Vec<Sample>,
}

impl MetricRecord {
    /// Builds a single-sample record for `device`.
    pub fn for_device(device: &str, name: MetricName, timestamp: i64, value: f64) -> Self {
        let mut labels = HashMap::new();
        labels.insert("device".to_string(), device.to_string());

        Self {
            instance_id: device.to_string(),
            instance_name: device.to_string(),
            job: JOB.to_string(),
            labels,
            component: COMPONENT.to_string(),
            name,
            unit: name.unit().to_string(),
            aggr_type: String::new(),
            samples: vec![Sample { timestamp, value }],
        }
    }

    /// Value of the most recent sample.
    pub fn latest_value(&self) -> Option<f64> {
        self.samples.last().map(|s| s.value)
    }

    /// Value of a label, if present.
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }
}
