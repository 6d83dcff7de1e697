//! CLI argument parsing

use crate::buses;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Default bus dispatch string
pub const DEFAULT_BUS: &str = "linux-i2c:dev=/dev/i2c-1";

/// Generate dynamic help text for the bus argument
fn bus_help() -> String {
    format!("I2C bus to use [available: {}]", buses::bus_names_short())
}

#[derive(Parser)]
#[command(name = "cdceprog")]
#[command(author, version, about = "CDCE913/925 clock generator EEPROM programmer", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Program a hex register dump into the PLL EEPROM
    Program {
        /// Hex-record register dump file
        hexfile: PathBuf,

        /// I2C bus to use
        #[arg(short, long, default_value = DEFAULT_BUS, help = bus_help())]
        bus: String,

        /// Verify the trailing checksum byte of every record
        #[arg(long)]
        strict: bool,
    },

    /// Check which cataloged PLLs answer on the bus
    Probe {
        /// I2C bus to use
        #[arg(short, long, default_value = DEFAULT_BUS, help = bus_help())]
        bus: String,
    },

    /// List known PLL variants
    ListPlls,

    /// List available I2C bus backends
    ListBuses,
}
