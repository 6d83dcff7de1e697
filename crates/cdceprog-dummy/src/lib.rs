//! cdceprog-dummy - In-memory CDCE9xx emulator
//!
//! This crate provides a dummy PLL that emulates the register file and
//! EEPROM busy behavior of a CDCE913/925 in memory. It's useful for
//! testing and development without real hardware.

use std::io;

use cdceprog_core::bus::I2cBus;
use cdceprog_core::pll::{PllVariant, CDCE913, CDCE925};
use cdceprog_core::program::{CONTROL_OFFSET, EEPROM_BUSY, EEPROM_WRITE};
use cdceprog_core::{Error, Result};

/// Dummy PLL device
///
/// Answers SMBus byte transfers at its variant's I2C address, keeps a
/// live register file and reports a configurable number of busy polls
/// after an EEPROM write is triggered.
pub struct DummyPll {
    variant: PllVariant,
    regs: Vec<u8>,
    /// Busy polls to report per triggered write cycle
    busy_polls: u32,
    busy_remaining: u32,
    writes: Vec<(u8, u8)>,
    delays: Vec<u32>,
}

impl DummyPll {
    /// Create a dummy device for the given variant, registers zeroed
    pub fn new(variant: PllVariant) -> Self {
        Self {
            variant,
            regs: vec![0; variant.register_count as usize],
            busy_polls: 0,
            busy_remaining: 0,
            writes: Vec::new(),
            delays: Vec::new(),
        }
    }

    /// Dummy CDCE913 at address 0x65
    pub fn cdce913() -> Self {
        Self::new(CDCE913)
    }

    /// Dummy CDCE925 at address 0x64
    pub fn cdce925() -> Self {
        Self::new(CDCE925)
    }

    /// Report this many busy polls after each triggered EEPROM write
    pub fn with_busy_polls(mut self, polls: u32) -> Self {
        self.busy_polls = polls;
        self
    }

    /// The emulated variant
    pub fn variant(&self) -> &PllVariant {
        &self.variant
    }

    /// Current register file contents
    pub fn registers(&self) -> &[u8] {
        &self.regs
    }

    /// Every (bus register, value) write in order
    pub fn writes(&self) -> &[(u8, u8)] {
        &self.writes
    }

    /// Delays requested by the poll loop, in milliseconds
    pub fn delays(&self) -> &[u32] {
        &self.delays
    }

    fn check_addr(&self, addr: u8) -> Result<()> {
        if addr == self.variant.bus_address {
            Ok(())
        } else {
            Err(Error::Io(io::Error::new(
                io::ErrorKind::NotConnected,
                format!("no acknowledge from address 0x{:02X}", addr),
            )))
        }
    }

    fn register_index(&self, reg: u8) -> Result<usize> {
        let index = reg.checked_sub(CONTROL_OFFSET).ok_or_else(|| {
            Error::Io(io::Error::other(format!(
                "command 0x{:02X} below control offset",
                reg
            )))
        })? as usize;
        if index >= self.regs.len() {
            return Err(Error::Io(io::Error::other(format!(
                "register index {} out of range",
                index
            ))));
        }
        Ok(index)
    }
}

impl I2cBus for DummyPll {
    fn read_reg(&mut self, addr: u8, reg: u8) -> Result<u8> {
        self.check_addr(addr)?;
        let index = self.register_index(reg)?;
        let mut value = self.regs[index];

        // Register 1 carries the EEPROM busy bit while a write cycle runs
        if index == 1 && self.busy_remaining > 0 {
            self.busy_remaining -= 1;
            value |= EEPROM_BUSY;
        }

        Ok(value)
    }

    fn write_reg(&mut self, addr: u8, reg: u8, value: u8) -> Result<()> {
        self.check_addr(addr)?;
        let index = self.register_index(reg)?;
        self.regs[index] = value;
        self.writes.push((reg, value));

        if index == 6 && value & EEPROM_WRITE != 0 {
            log::debug!("dummy: EEPROM write cycle triggered");
            self.busy_remaining = self.busy_polls;
        }

        Ok(())
    }

    fn delay_ms(&mut self, ms: u32) {
        // No real delay for the in-memory device, just record it
        self.delays.push(ms);
    }
}
