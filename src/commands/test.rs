//! Test command implementation.
//!
//! Runs sampling passes over the resource file and prints the records.

use herakles_lvm_exporter::{MetricDriver, MetricName, ResourceConfig};
use std::time::Instant;

use crate::config::Config;

/// Tests metrics collection.
pub fn command_test(
    iterations: usize,
    verbose: bool,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("🧪 Herakles LVM Exporter - Test Mode");
    println!("====================================");

    let resources = ResourceConfig::load(&config.resources_file())?;
    let mut driver = MetricDriver::new(config.driver_config.clone());
    driver.setup()?;

    for iteration in 1..=iterations {
        println!("\n🔄 Iteration {}/{}:", iteration, iterations);

        let start = Instant::now();
        let mut ok_count = 0;
        let mut error_count = 0;

        for (class, device) in resources.devices() {
            match driver.collect_metrics(&MetricName::ALL, device) {
                Ok(records) => {
                    ok_count += 1;
                    println!("   ├─ {} {}", class, device);
                    if verbose {
                        for r in &records {
                            println!("   │  ├─ {}", serde_json::to_string(r)?);
                        }
                    } else {
                        let summary: Vec<String> = records
                            .iter()
                            .map(|r| {
                                format!(
                                    "{}={}{}",
                                    r.name,
                                    r.latest_value().unwrap_or_default(),
                                    r.unit
                                )
                            })
                            .collect();
                        println!("   │  └─ {}", summary.join(" "));
                    }
                }
                Err(e) => {
                    error_count += 1;
                    println!("   ├─ ❌ {} {}: {}", class, device, e);
                }
            }
        }

        println!(
            "   ⏱️  Pass duration: {:.2}ms",
            start.elapsed().as_secs_f64() * 1000.0
        );
        println!("   📊 Sampled: {} devices", ok_count);
        println!("   ❌ Errors: {}", error_count);
    }

    println!("\n✅ Test completed");
    Ok(())
}
