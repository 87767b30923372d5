//! Prometheus collector bridging driver records into labeled gauge series.
//!
//! Every scrape re-reads the resource file, samples each listed device once
//! and publishes the values under `lvm_volume_*` or `lvm_disk_*`. Scrapes are
//! serialized by a mutex. Device failures drop that device's series for the
//! cycle; a resource file failure drops every `lvm_*` series.

use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{Counter, CounterVec, Gauge, GaugeVec, Opts};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;
use tracing::{debug, error, warn};

use crate::driver::MetricDriver;
use crate::metric::{MetricName, MetricRecord};
use crate::resources::{ResourceClass, ResourceConfig};

/// Label key carried by every device series.
pub const DEVICE_LABEL: &str = "device";

/// Exposed series name for a (class, metric) pair.
pub fn series_name(class: ResourceClass, metric: MetricName) -> String {
    let suffix = match metric {
        MetricName::Iops => "iops_tps",
        MetricName::ReadThroughput => "readThroughput_kbs",
        MetricName::WriteThroughput => "writeThroughput_kbs",
        MetricName::ResponseTime => "responseTime_ms",
        MetricName::ServiceTime => "serviceTime_ms",
        MetricName::UtilizationPercentage => "utilization_prcnt",
    };
    format!("lvm_{}_{}", class, suffix)
}

fn series_help(class: ResourceClass, metric: MetricName) -> String {
    let what = match metric {
        MetricName::Iops => "I/O transfers per second",
        MetricName::ReadThroughput => "Read throughput in KB/s",
        MetricName::WriteThroughput => "Write throughput in KB/s",
        MetricName::ResponseTime => "Average I/O response time in ms",
        MetricName::ServiceTime => "Average I/O service time in ms",
        MetricName::UtilizationPercentage => "Device utilization in percent",
    };
    format!("{} of the {}", what, class)
}

/// Outcome of the most recent scrape.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScrapeReport {
    pub resources_loaded: bool,
    pub devices_sampled: usize,
    pub devices_failed: usize,
    pub series: usize,
    pub error: Option<String>,
    pub duration_seconds: f64,
}

struct Family {
    class: ResourceClass,
    metric: MetricName,
    gauge: GaugeVec,
}

/// Internal exporter metrics emitted with every scrape.
struct ExporterMetrics {
    scrape_duration: Gauge,
    scrape_errors: Counter,
    device_failures: CounterVec,
}

impl ExporterMetrics {
    fn new() -> prometheus::Result<Self> {
        Ok(Self {
            scrape_duration: Gauge::new(
                "lvm_exporter_scrape_duration_seconds",
                "Time spent sampling all configured devices",
            )?,
            scrape_errors: Counter::new(
                "lvm_exporter_scrape_errors_total",
                "Scrapes aborted because the resource configuration could not be loaded",
            )?,
            device_failures: CounterVec::new(
                Opts::new(
                    "lvm_exporter_device_failures_total",
                    "Devices that produced no series in a scrape",
                ),
                &["class"],
            )?,
        })
    }
}

struct Inner {
    resources_path: PathBuf,
    families: Vec<Family>,
    exporter: ExporterMetrics,
    driver: Mutex<MetricDriver>,
    last: RwLock<Option<ScrapeReport>>,
}

/// Collector for LVM volume and disk performance series.
///
/// Clones share descriptors, the driver and the scrape lock.
#[derive(Clone)]
pub struct LvmCollector {
    inner: Arc<Inner>,
}

impl LvmCollector {
    /// Defines all descriptors. Descriptors do not change afterwards.
    pub fn new(
        resources_path: impl Into<PathBuf>,
        driver: MetricDriver,
    ) -> prometheus::Result<Self> {
        let mut families = Vec::with_capacity(ResourceClass::ALL.len() * MetricName::ALL.len());
        for class in ResourceClass::ALL {
            for metric in MetricName::ALL {
                let gauge = GaugeVec::new(
                    Opts::new(series_name(class, metric), series_help(class, metric)),
                    &[DEVICE_LABEL],
                )?;
                families.push(Family {
                    class,
                    metric,
                    gauge,
                });
            }
        }

        Ok(Self {
            inner: Arc::new(Inner {
                resources_path: resources_path.into(),
                families,
                exporter: ExporterMetrics::new()?,
                driver: Mutex::new(driver),
                last: RwLock::new(None),
            }),
        })
    }

    pub fn resources_path(&self) -> &Path {
        &self.inner.resources_path
    }

    /// Report of the last finished scrape, `None` before the first one.
    pub fn last_scrape(&self) -> Option<ScrapeReport> {
        self.inner.last.read().ok().and_then(|g| g.clone())
    }

    fn family(&self, class: ResourceClass, metric: MetricName) -> Option<&GaugeVec> {
        self.inner
            .families
            .iter()
            .find(|f| f.class == class && f.metric == metric)
            .map(|f| &f.gauge)
    }

    /// Publishes one record under `class`. Volumes are labeled by instance
    /// name, disks by their `device` label.
    fn publish(&self, class: ResourceClass, record: &MetricRecord) -> bool {
        let label = match class {
            ResourceClass::Volume => Some(record.instance_name.as_str()),
            ResourceClass::Disk => record.label(DEVICE_LABEL),
        };
        let (Some(label), Some(value), Some(gauge)) =
            (label, record.latest_value(), self.family(class, record.name))
        else {
            return false;
        };
        gauge.with_label_values(&[label]).set(value);
        true
    }

    /// One full sampling pass. Must run with the driver lock held.
    fn scrape(&self, driver: &mut MetricDriver) -> ScrapeReport {
        let mut report = ScrapeReport::default();

        let resources = match ResourceConfig::load(&self.inner.resources_path) {
            Ok(r) => r,
            Err(e) => {
                error!("Scrape aborted: {}", e);
                report.error = Some(e.to_string());
                return report;
            }
        };

        if let Err(e) = driver.setup() {
            error!("Scrape aborted, metric driver setup failed: {}", e);
            report.error = Some(e.to_string());
            return report;
        }
        report.resources_loaded = true;

        for (class, device) in resources.devices() {
            report.devices_sampled += 1;
            match driver.collect_metrics(&MetricName::ALL, device) {
                Ok(records) => {
                    report.series += records.iter().filter(|r| self.publish(class, r)).count();
                }
                Err(e) => {
                    warn!(%class, device, "Sampling failed: {}", e);
                    report.devices_failed += 1;
                    self.inner
                        .exporter
                        .device_failures
                        .with_label_values(&[class.as_str()])
                        .inc();
                }
            }
        }

        report
    }
}

impl Collector for LvmCollector {
    fn desc(&self) -> Vec<&Desc> {
        self.inner
            .families
            .iter()
            .flat_map(|f| f.gauge.desc())
            .chain(self.inner.exporter.scrape_duration.desc())
            .chain(self.inner.exporter.scrape_errors.desc())
            .chain(self.inner.exporter.device_failures.desc())
            .collect()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let mut driver = match self.inner.driver.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let start = Instant::now();

        for f in &self.inner.families {
            f.gauge.reset();
        }

        let mut report = self.scrape(&mut driver);
        report.duration_seconds = start.elapsed().as_secs_f64();
        self.inner.exporter.scrape_duration.set(report.duration_seconds);
        if !report.resources_loaded {
            self.inner.exporter.scrape_errors.inc();
        }

        debug!(
            devices = report.devices_sampled,
            failed = report.devices_failed,
            series = report.series,
            "Scrape finished in {:.3}s",
            report.duration_seconds
        );

        let mut out = Vec::new();
        if report.resources_loaded {
            out.extend(self.inner.families.iter().flat_map(|f| f.gauge.collect()));
        }
        out.extend(self.inner.exporter.scrape_duration.collect());
        out.extend(self.inner.exporter.scrape_errors.collect());
        out.extend(self.inner.exporter.device_failures.collect());

        if let Ok(mut last) = self.inner.last.write() {
            *last = Some(report);
        }
        out
    }
}
