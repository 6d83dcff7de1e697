//! cdceprog - CDCE913/925 clock generator EEPROM programmer
//!
//! Programs the EEPROM of a TI CDCE913/925 PLL over a Linux I2C bus from
//! a hex-record register dump, as produced by TI's ClockPro tool.
//!
//! # Architecture
//!
//! The heavy lifting lives in `cdceprog-core`: hex record parsing into a
//! sparse register map, PLL variant resolution from the register
//! footprint, and the register-write / EEPROM-commit sequencing. Bus
//! backends (`cdceprog-linux-i2c`, `cdceprog-dummy`) implement the
//! `I2cBus` trait and are selected with a `name:key=value` dispatch
//! string.

mod buses;
mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    let result = match cli.command {
        Commands::Program {
            hexfile,
            bus,
            strict,
        } => commands::run_program(&bus, &hexfile, strict),
        Commands::Probe { bus } => {
            let mut handle = match buses::open_bus(&bus) {
                Ok(handle) => handle,
                Err(e) => {
                    eprintln!("ERROR: {}", e);
                    std::process::exit(2);
                }
            };
            commands::run_probe(&mut handle)
        }
        Commands::ListPlls => {
            commands::list_plls();
            Ok(())
        }
        Commands::ListBuses => {
            commands::list_buses();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("ERROR: {}", e);
        std::process::exit(2);
    }
}
