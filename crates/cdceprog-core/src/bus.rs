//! I2C bus trait
//!
//! The programming sequence only needs SMBus-style byte reads and writes
//! at a command/register address, plus a delay primitive for the EEPROM
//! completion poll. Backends (Linux i2c-dev, the in-memory emulator)
//! implement this trait.

use crate::error::Result;

/// Byte-register access to an I2C bus
pub trait I2cBus {
    /// Read one byte from `reg` of the device at 7-bit address `addr`
    fn read_reg(&mut self, addr: u8, reg: u8) -> Result<u8>;

    /// Write one byte to `reg` of the device at 7-bit address `addr`
    fn write_reg(&mut self, addr: u8, reg: u8, value: u8) -> Result<()>;

    /// Delay for the specified number of milliseconds
    ///
    /// Routing the poll-loop sleep through the bus lets tests simulate
    /// completion without real delay.
    fn delay_ms(&mut self, ms: u32);
}

// Blanket impl for boxed buses to allow trait objects
impl I2cBus for Box<dyn I2cBus + Send> {
    fn read_reg(&mut self, addr: u8, reg: u8) -> Result<u8> {
        (**self).read_reg(addr, reg)
    }

    fn write_reg(&mut self, addr: u8, reg: u8, value: u8) -> Result<()> {
        (**self).write_reg(addr, reg, value)
    }

    fn delay_ms(&mut self, ms: u32) {
        (**self).delay_ms(ms)
    }
}
