//! Sampling driver.
//!
//! Runs the activity reporting tool through an injected [`Executor`], parses
//! its block device table and maps the columns onto the canonical metric
//! vocabulary.

pub mod config;
pub mod table;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::DriverError;
use crate::executor::{ProcessExecutor, SharedExecutor};
use crate::metric::{MetricName, MetricRecord};

pub use config::DriverConfig;
pub use table::DeviceTable;

/// Source of sample timestamps (seconds since the epoch).
pub type Clock = fn() -> i64;

fn wall_clock() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Executors bound to the driver.
#[derive(Clone)]
struct Executors {
    root: SharedExecutor,
    base: SharedExecutor,
}

/// Samples block device performance for one device at a time.
pub struct MetricDriver {
    config_path: Option<PathBuf>,
    config: DriverConfig,
    executors: Option<Executors>,
    clock: Clock,
}

impl MetricDriver {
    /// Creates an unbound driver that reads its configuration from
    /// `config_path` (built-in defaults when `None`) during [`setup`](Self::setup).
    pub fn new(config_path: Option<PathBuf>) -> Self {
        Self {
            config_path,
            config: DriverConfig::default(),
            executors: None,
            clock: wall_clock,
        }
    }

    /// Binds explicit executors. [`setup`](Self::setup) keeps them.
    pub fn with_executors(mut self, root: SharedExecutor, base: SharedExecutor) -> Self {
        self.executors = Some(Executors { root, base });
        self
    }

    /// Replaces the timestamp source.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Loads the driver configuration and binds process-spawning executors
    /// unless executors are already bound. Safe to call repeatedly.
    pub fn setup(&mut self) -> Result<(), DriverError> {
        self.config = DriverConfig::load(self.config_path.as_deref())?;

        if self.executors.is_none() {
            let timeout = self.config.timeout();
            self.executors = Some(Executors {
                root: Arc::new(ProcessExecutor::root().with_timeout(timeout)),
                base: Arc::new(ProcessExecutor::base().with_timeout(timeout)),
            });
            debug!(
                tool = %self.config.tool,
                timeout_secs = self.config.timeout_secs,
                "Metric driver set up"
            );
        }
        Ok(())
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn is_set_up(&self) -> bool {
        self.executors.is_some()
    }

    /// Samples `device` and returns one record per entry of `names`, in order.
    ///
    /// Fails without partial results when the tool cannot run, the device is
    /// absent from the report, or a requested value cannot be parsed.
    pub fn collect_metrics(
        &self,
        names: &[MetricName],
        device: &str,
    ) -> Result<Vec<MetricRecord>, DriverError> {
        let executors = self.executors.as_ref().ok_or_else(|| DriverError::Config {
            path: self.config_path.clone().unwrap_or_default(),
            message: "driver used before setup".to_string(),
        })?;
        let executor = if self.config.privileged {
            &executors.root
        } else {
            &executors.base
        };

        let (program, args) = self.config.invocation();
        let output = executor.run(program, &args)?;
        trace!(device, bytes = output.len(), "Report captured");

        let table = DeviceTable::parse(&output)?;
        let row = table
            .row(device)
            .ok_or_else(|| DriverError::DeviceNotFound(device.to_string()))?;

        let timestamp = (self.clock)();
        names
            .iter()
            .map(|&name| {
                row.value(name)
                    .map(|value| MetricRecord::for_device(device, name, timestamp, value))
            })
            .collect()
    }

    /// String-keyed variant of [`collect_metrics`](Self::collect_metrics).
    /// Names outside the canonical vocabulary are skipped.
    pub fn collect_named(
        &self,
        names: &[&str],
        device: &str,
    ) -> Result<Vec<MetricRecord>, DriverError> {
        let known: Vec<MetricName> = names.iter().filter_map(|n| MetricName::parse(n)).collect();
        self.collect_metrics(&known, device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{FakeExecutor, FakeResponse};

    const REPORT: &str = "\
05:26:43  IST       DEV       tps     rkB/s     wkB/s   areq-sz    aqu-sz     await     svctm     %util
05:26:44      loop0      0.00      0.00      0.00      0.00      0.00      0.00      0.00      0.00
05:26:44        sda      3.16      0.00    134.74     42.67      0.01      2.67      4.00      1.26
";

    fn fixed_clock() -> i64 {
        123456
    }

    fn fake_driver(root: FakeExecutor, base: FakeExecutor) -> MetricDriver {
        let mut driver = MetricDriver::new(None)
            .with_executors(Arc::new(root), Arc::new(base))
            .with_clock(fixed_clock);
        driver.setup().unwrap();
        driver
    }

    #[test]
    fn test_unprivileged_config_uses_base_executor() {
        let base = FakeExecutor::default().respond("sar", FakeResponse::ok(REPORT));
        let driver = fake_driver(FakeExecutor::default(), base);

        let records = driver.collect_metrics(&[MetricName::Iops], "sda").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].samples[0].timestamp, 123456);
    }

    #[test]
    fn test_privileged_config_uses_root_executor() {
        let root = FakeExecutor::default().respond("sar", FakeResponse::ok(REPORT));
        let mut driver = fake_driver(root, FakeExecutor::default());
        driver.config.privileged = true;

        assert!(driver.collect_metrics(&[MetricName::Iops], "sda").is_ok());
    }

    #[test]
    fn test_collect_before_setup_fails() {
        let driver = MetricDriver::new(None);
        assert!(!driver.is_set_up());
        assert!(driver.collect_metrics(&MetricName::ALL, "sda").is_err());
    }

    #[test]
    fn test_setup_binds_process_executors() {
        let mut driver = MetricDriver::new(None);
        driver.setup().unwrap();
        assert!(driver.is_set_up());
        assert_eq!(driver.config(), &DriverConfig::default());
    }

    #[test]
    fn test_empty_request_still_requires_device() {
        let base = FakeExecutor::default().respond("sar", FakeResponse::ok(REPORT));
        let driver = fake_driver(FakeExecutor::default(), base);

        assert!(driver.collect_metrics(&[], "sda").unwrap().is_empty());
        assert!(matches!(
            driver.collect_metrics(&[], "sdz"),
            Err(DriverError::DeviceNotFound(_))
        ));
    }
}
