//! Parser for the block device report printed by `sar -d`.
//!
//! Expected shape (columns separated by runs of whitespace):
//!
//! ```text
//! Linux 5.4.0 (host)   07/28/20   _x86_64_   (4 CPU)
//!
//! 05:26:43  IST       DEV       tps     rkB/s     wkB/s   areq-sz    aqu-sz     await     svctm     %util
//! 05:26:44      loop0      0.00      0.00      0.00      0.00      0.00      0.00      0.00      0.00
//! 05:26:44        sda      3.16      0.00    134.74     42.67      0.01      2.67      4.00      1.26
//! ```
//!
//! The leading time columns do not line up with the header (the header may
//! carry an extra AM/PM or timezone token), so data rows are aligned to the
//! header from the right.

use crate::error::DriverError;
use crate::metric::MetricName;

/// Header tokens naming the device identifier column.
const DEVICE_HEADERS: &[&str] = &["DEV", "Device", "Device:"];

/// Header token that every block device report carries.
const MARKER_HEADER: &str = "tps";

/// Columns a canonical metric may be read from, with a factor converting
/// the column to the canonical unit. Older sysstat reports sectors/s.
fn columns_for(metric: MetricName) -> &'static [(&'static str, f64)] {
    match metric {
        MetricName::Iops => &[("tps", 1.0)],
        MetricName::ReadThroughput => &[("rkB/s", 1.0), ("rd_sec/s", 0.5)],
        MetricName::WriteThroughput => &[("wkB/s", 1.0), ("wr_sec/s", 0.5)],
        MetricName::ResponseTime => &[("await", 1.0)],
        MetricName::ServiceTime => &[("svctm", 1.0)],
        MetricName::UtilizationPercentage => &[("%util", 1.0)],
    }
}

/// Parsed report: the column names from the device column onwards and one
/// row per device line, both starting at the device identifier.
#[derive(Debug)]
pub struct DeviceTable<'a> {
    columns: Vec<&'a str>,
    rows: Vec<Vec<&'a str>>,
}

impl<'a> DeviceTable<'a> {
    /// Parses raw report text.
    pub fn parse(text: &'a str) -> Result<Self, DriverError> {
        let mut columns: Option<Vec<&'a str>> = None;
        let mut rows = Vec::new();

        for line in text.lines() {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.is_empty() {
                continue;
            }

            // Header rows repeat (e.g. before the "Average:" block); only the
            // first one defines the layout, none of them is data.
            if let Some(dev) = header_device_index(&tokens) {
                if columns.is_none() {
                    columns = Some(tokens[dev..].to_vec());
                }
                continue;
            }

            let Some(cols) = columns.as_ref() else {
                continue;
            };
            if tokens.len() < cols.len() {
                continue;
            }
            rows.push(tokens[tokens.len() - cols.len()..].to_vec());
        }

        let columns = columns.ok_or_else(|| {
            DriverError::Parse("no device header row in report output".to_string())
        })?;

        Ok(Self { columns, rows })
    }

    /// First row reported for `device`.
    pub fn row(&self, device: &str) -> Option<DeviceRow<'_, 'a>> {
        self.rows
            .iter()
            .find(|r| r.first() == Some(&device))
            .map(|values| DeviceRow {
                columns: &self.columns,
                values,
            })
    }

    /// Device identifiers in report order, duplicates included.
    pub fn devices(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().filter_map(|r| r.first().copied())
    }
}

/// One device line of the report.
#[derive(Debug)]
pub struct DeviceRow<'t, 'a> {
    columns: &'t [&'a str],
    values: &'t [&'a str],
}

impl DeviceRow<'_, '_> {
    /// Reads `metric` in its canonical unit.
    pub fn value(&self, metric: MetricName) -> Result<f64, DriverError> {
        let (idx, factor) = columns_for(metric)
            .iter()
            .find_map(|(name, factor)| {
                self.columns
                    .iter()
                    .position(|c| c == name)
                    .map(|i| (i, *factor))
            })
            .ok_or_else(|| {
                DriverError::Parse(format!("report has no column for {}", metric))
            })?;

        let raw = self.values[idx];
        let value: f64 = raw.parse().map_err(|_| {
            DriverError::Parse(format!(
                "invalid {} value '{}' for device {}",
                self.columns[idx], raw, self.values[0]
            ))
        })?;

        Ok(value * factor)
    }
}

fn header_device_index(tokens: &[&str]) -> Option<usize> {
    if !tokens.contains(&MARKER_HEADER) {
        return None;
    }
    tokens.iter().position(|t| DEVICE_HEADERS.contains(t))
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "Linux 5.4.0-42-generic (node1) \t07/28/2020 \t_x86_64_\t(4 CPU)

05:26:43  IST       DEV       tps     rkB/s     wkB/s   areq-sz    aqu-sz     await     svctm     %util
05:26:44      loop0      0.00      0.00      0.00      0.00      0.00      0.00      0.00      0.00
05:26:44        sda      3.16      0.00    134.74     42.67      0.01      2.67      4.00      1.26
05:26:44   vg0-lv0      1.00      8.00     16.00     24.00      0.00      0.50      0.25      0.10

Average:          DEV       tps     rkB/s     wkB/s   areq-sz    aqu-sz     await     svctm     %util
Average:        loop0      0.00      0.00      0.00      0.00      0.00      0.00      0.00      0.00
Average:          sda      9.99      9.99      9.99      9.99      9.99      9.99      9.99      9.99
";

    #[test]
    fn test_parse_aligns_rows_from_the_right() {
        let table = DeviceTable::parse(REPORT).unwrap();
        let row = table.row("sda").unwrap();
        assert_eq!(row.value(MetricName::Iops).unwrap(), 3.16);
        assert_eq!(row.value(MetricName::WriteThroughput).unwrap(), 134.74);
        assert_eq!(row.value(MetricName::ResponseTime).unwrap(), 2.67);
        assert_eq!(row.value(MetricName::ServiceTime).unwrap(), 4.00);
        assert_eq!(row.value(MetricName::UtilizationPercentage).unwrap(), 1.26);
    }

    #[test]
    fn test_headers_banner_and_blank_lines_are_not_rows() {
        let table = DeviceTable::parse(REPORT).unwrap();
        let devices: Vec<_> = table.devices().collect();
        assert_eq!(devices, ["loop0", "sda", "vg0-lv0", "loop0", "sda"]);
        assert!(table.row("DEV").is_none());
        assert!(table.row("Linux").is_none());
    }

    #[test]
    fn test_first_matching_row_wins() {
        let table = DeviceTable::parse(REPORT).unwrap();
        let row = table.row("sda").unwrap();
        assert_eq!(row.value(MetricName::ReadThroughput).unwrap(), 0.0);
    }

    #[test]
    fn test_twelve_hour_clock_rows() {
        let report = "\
05:26:43 PM       DEV       tps     rkB/s     wkB/s   areq-sz    aqu-sz     await     svctm     %util
05:26:44 PM       sdb      7.00     28.00      0.00      4.00      0.02      3.00      1.00      0.70
";
        let table = DeviceTable::parse(report).unwrap();
        let row = table.row("sdb").unwrap();
        assert_eq!(row.value(MetricName::Iops).unwrap(), 7.0);
        assert_eq!(row.value(MetricName::UtilizationPercentage).unwrap(), 0.7);
    }

    #[test]
    fn test_sector_columns_are_converted_to_kb() {
        let report = "\
10:00:01          DEV       tps  rd_sec/s  wr_sec/s  avgrq-sz  avgqu-sz     await     svctm     %util
10:00:02          sda      2.00     64.00     32.00     48.00      0.01      1.50      0.75      0.15
";
        let table = DeviceTable::parse(report).unwrap();
        let row = table.row("sda").unwrap();
        assert_eq!(row.value(MetricName::ReadThroughput).unwrap(), 32.0);
        assert_eq!(row.value(MetricName::WriteThroughput).unwrap(), 16.0);
    }

    #[test]
    fn test_missing_column_is_parse_error() {
        let report = "\
10:00:01          DEV       tps     rkB/s     wkB/s   areq-sz    aqu-sz     await     %util
10:00:02          sda      2.00     64.00     32.00     48.00      0.01      1.50      0.15
";
        let table = DeviceTable::parse(report).unwrap();
        let err = table.row("sda").unwrap().value(MetricName::ServiceTime).unwrap_err();
        assert!(matches!(err, DriverError::Parse(_)));
    }

    #[test]
    fn test_unparsable_number_is_parse_error() {
        let report = "\
10:00:01          DEV       tps     rkB/s     wkB/s   areq-sz    aqu-sz     await     svctm     %util
10:00:02          sda      2,00     64.00     32.00     48.00      0.01      1.50      0.75      0.15
";
        let table = DeviceTable::parse(report).unwrap();
        let err = table.row("sda").unwrap().value(MetricName::Iops).unwrap_err();
        assert!(matches!(err, DriverError::Parse(_)));
    }

    #[test]
    fn test_output_without_header_is_parse_error() {
        let err = DeviceTable::parse("sar: command failed\n\n").unwrap_err();
        assert!(matches!(err, DriverError::Parse(_)));
    }

    #[test]
    fn test_short_lines_after_header_are_skipped() {
        let report = "\
10:00:01          DEV       tps     rkB/s     wkB/s   areq-sz    aqu-sz     await     svctm     %util
truncated sda 1.0
";
        let table = DeviceTable::parse(report).unwrap();
        assert!(table.row("sda").is_none());
    }
}
