//! Bus backend registration and dispatch
//!
//! This module provides a centralized registry for the I2C bus backends
//! and parsing of `name:key=value,...` dispatch strings.

use cdceprog_core::bus::I2cBus;

/// Information about a bus backend
pub struct BusInfo {
    /// Primary name (used for matching)
    pub name: &'static str,
    /// Alternative names/aliases
    pub aliases: &'static [&'static str],
    /// Short description
    pub description: &'static str,
}

/// Get information about all available bus backends
pub fn available_buses() -> Vec<BusInfo> {
    vec![
        BusInfo {
            name: "linux-i2c",
            aliases: &["linux_i2c", "i2c-dev"],
            description: "Linux i2c-dev interface (dev=/dev/i2c-N or bus=N)",
        },
        BusInfo {
            name: "dummy",
            aliases: &[],
            description: "In-memory CDCE9xx emulator for testing (pll=cdce913|cdce925,busy=<polls>)",
        },
    ]
}

/// Generate help text listing all available bus backends
pub fn bus_help() -> String {
    let mut help = String::from("Available buses:\n");
    for b in &available_buses() {
        help.push_str(&format!("  {:12} - {}\n", b.name, b.description));
    }
    help
}

/// Generate a short list of bus names for CLI help
pub fn bus_names_short() -> String {
    let names: Vec<&str> = available_buses().iter().map(|b| b.name).collect();
    names.join(", ")
}

/// Parse a bus string into name and options
///
/// Format: "name" or "name:option1=value1,option2=value2"
pub fn parse_bus_string(s: &str) -> (&str, Vec<(&str, &str)>) {
    if let Some((name, opts)) = s.split_once(':') {
        let options: Vec<_> = opts
            .split(',')
            .filter_map(|opt| opt.split_once('='))
            .collect();
        (name, options)
    } else {
        (s, Vec::new())
    }
}

/// Open the bus backend described by a dispatch string
pub fn open_bus(spec: &str) -> Result<Box<dyn I2cBus + Send>, Box<dyn std::error::Error>> {
    let (name, options) = parse_bus_string(spec);

    match name {
        "linux-i2c" | "linux_i2c" | "i2c-dev" => {
            log::info!("Opening Linux I2C bus...");
            cdceprog_linux_i2c::open_linux_i2c(&options).map_err(|e| {
                format!(
                    "Failed to open Linux I2C bus: {}\n\
                     Make sure the device exists and you have read/write permissions.\n\
                     You may need to: sudo usermod -aG i2c $USER",
                    e
                )
                .into()
            })
        }

        "dummy" => {
            let mut pll = cdceprog_dummy::DummyPll::cdce925();
            let mut busy = 0u32;
            for (key, value) in &options {
                match *key {
                    "pll" => {
                        pll = match *value {
                            "cdce913" => cdceprog_dummy::DummyPll::cdce913(),
                            "cdce925" => cdceprog_dummy::DummyPll::cdce925(),
                            other => return Err(format!("Unknown dummy PLL: {}", other).into()),
                        };
                    }
                    "busy" => {
                        busy = value
                            .parse()
                            .map_err(|_| format!("Invalid busy value: {}", value))?;
                    }
                    _ => {
                        log::warn!("dummy: Unknown option: {}={}", key, value);
                    }
                }
            }
            Ok(Box::new(pll.with_busy_polls(busy)))
        }

        _ => {
            let mut msg = format!("Unknown bus: {}\n\n", name);
            msg.push_str(&bus_help());
            msg.push_str("\nUse 'cdceprog list-buses' for more details");
            Err(msg.into())
        }
    }
}
