//! Check command implementation.
//!
//! Validates the reporting tool, the resource file and every configured device.

use herakles_lvm_exporter::{DriverConfig, MetricDriver, MetricName, ResourceConfig};

use crate::config::{validate_effective_config, Config};

/// Validates system requirements and configuration.
pub fn command_check(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Herakles LVM Exporter - System Check");
    println!("=======================================");

    let mut all_ok = true;

    println!("\n⚙️  Checking configuration...");
    match validate_effective_config(config) {
        Ok(_) => println!("   ✅ Configuration is valid"),
        Err(e) => {
            println!("   ❌ Configuration invalid: {}", e);
            all_ok = false;
        }
    }

    println!("\n🛠️  Checking reporting tool...");
    let driver_config = match DriverConfig::load(config.driver_config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            println!("   ❌ {}", e);
            DriverConfig::default()
        }
    };
    match which::which(&driver_config.tool) {
        Ok(path) => println!("   ✅ {} found at {}", driver_config.tool, path.display()),
        Err(_) => {
            println!(
                "   ❌ {} not found on PATH (install sysstat)",
                driver_config.tool
            );
            all_ok = false;
        }
    }

    println!("\n📄 Checking resource file...");
    let resources_path = config.resources_file();
    let resources = match ResourceConfig::load(&resources_path) {
        Ok(r) => {
            println!(
                "   ✅ {} lists {} device(s)",
                resources_path.display(),
                r.devices().count()
            );
            Some(r)
        }
        Err(e) => {
            println!("   ❌ {}", e);
            all_ok = false;
            None
        }
    };

    if let Some(resources) = resources {
        println!("\n💽 Sampling configured devices...");
        let mut driver = MetricDriver::new(config.driver_config.clone());
        match driver.setup() {
            Ok(()) => {
                for (class, device) in resources.devices() {
                    match driver.collect_metrics(&MetricName::ALL, device) {
                        Ok(records) => {
                            println!("   ✅ {} {}: {} metrics", class, device, records.len())
                        }
                        Err(e) => {
                            println!("   ❌ {} {}: {}", class, device, e);
                            all_ok = false;
                        }
                    }
                }
            }
            Err(e) => {
                println!("   ❌ Metric driver setup failed: {}", e);
                all_ok = false;
            }
        }
    }

    println!("\n📋 Summary:");
    if all_ok {
        println!("   ✅ All checks passed - exporter is ready");
        Ok(())
    } else {
        println!("   ❌ Some checks failed - please review the output above");
        std::process::exit(1);
    }
}
