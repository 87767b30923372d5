//! Herakles LVM Exporter Library
//!
//! Samples block device performance with sysstat's `sar` and republishes it
//! as Prometheus gauges for LVM volumes and their backing disks.
//!
//! # Pipeline
//!
//! - [`executor`]: runs the reporting tool (swappable for a [`FakeExecutor`] in tests)
//! - [`driver`]: parses the block device table into canonical [`MetricRecord`]s
//! - [`collector`]: a `prometheus` collector that samples every configured
//!   device on each scrape
//!
//! # Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use herakles_lvm_exporter::{FakeExecutor, FakeResponse, MetricDriver, MetricName};
//!
//! let report = "\
//! 05:26:43  IST       DEV       tps     rkB/s     wkB/s   areq-sz    aqu-sz     await     svctm     %util
//! 05:26:44        sda      3.16      0.00    134.74     42.67      0.01      2.67      4.00      1.26
//! ";
//! let fake = Arc::new(FakeExecutor::default().respond("sar", FakeResponse::ok(report)));
//! let mut driver = MetricDriver::new(None).with_executors(fake.clone(), fake);
//! driver.setup().unwrap();
//!
//! let records = driver.collect_metrics(&[MetricName::Iops], "sda").unwrap();
//! assert_eq!(records[0].latest_value(), Some(3.16));
//! ```

pub mod collector;
pub mod driver;
pub mod error;
pub mod executor;
pub mod metric;
pub mod resources;

// Re-export main types for convenience
pub use collector::{series_name, LvmCollector, ScrapeReport};
pub use driver::{DriverConfig, MetricDriver};
pub use error::{DriverError, ExecError, ResourceError};
pub use executor::{Executor, FakeExecutor, FakeResponse, ProcessExecutor, SharedExecutor};
pub use metric::{MetricName, MetricRecord, Sample};
pub use resources::{Resource, ResourceClass, ResourceConfig};
