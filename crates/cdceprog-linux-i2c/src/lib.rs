//! cdceprog-linux-i2c - Linux i2c-dev support
//!
//! This crate provides access to CDCE9xx chips through Linux's i2c-dev
//! interface at `/dev/i2c-N`, using SMBus byte-data transfers.
//!
//! # Example
//!
//! ```no_run
//! use cdceprog_linux_i2c::{LinuxI2c, LinuxI2cConfig};
//! use cdceprog_core::bus::I2cBus;
//!
//! // Open with an explicit device path
//! let mut bus = LinuxI2c::open_device("/dev/i2c-1")?;
//!
//! // Or from a bus number
//! let config = LinuxI2cConfig::bus_number(1);
//! let mut bus = LinuxI2c::open(&config)?;
//!
//! // Read control register 0 of a CDCE913 at 0x65
//! let value = bus.read_reg(0x65, 0x80)?;
//! println!("register 0: 0x{:02X}", value);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # System Requirements
//!
//! - Linux kernel with i2c-dev support enabled (`CONFIG_I2C_CHARDEV`)
//! - Read/write access to `/dev/i2c-N`
//! - May require adding the user to the `i2c` group or using udev rules
//!
//! On Raspberry Pi boards the PLL usually sits on `/dev/i2c-1`; very old
//! models expose I2C0 on the GPIO header instead.

pub mod device;
pub mod error;

// Re-exports
pub use device::{parse_options, LinuxI2c, LinuxI2cConfig};
pub use error::{LinuxI2cError, Result};

/// Open a Linux I2C bus and return a boxed I2cBus
///
/// This is a convenience function for use in the CLI bus dispatch.
///
/// # Arguments
///
/// * `options` - Slice of (key, value) pairs from bus string parsing
///
/// # Example Options
///
/// - `dev=/dev/i2c-1` - device path
/// - `bus=1` - alternative: bus number
pub fn open_linux_i2c(
    options: &[(&str, &str)],
) -> std::result::Result<Box<dyn cdceprog_core::bus::I2cBus + Send>, Box<dyn std::error::Error>> {
    let config = parse_options(options)?;
    let bus = LinuxI2c::open(&config)?;
    Ok(Box::new(bus))
}
