//! cdceprog-core - Core library for CDCE913/925 EEPROM programming
//!
//! This crate provides the pieces needed to program the EEPROM of a
//! TI CDCE913/925 clock generator from a hex-record register dump:
//! the record parser, the PLL variant catalog and the register-write /
//! EEPROM-commit sequencing protocol. Bus access goes through the
//! [`bus::I2cBus`] trait so backends and tests can be substituted.
//!
//! # Example
//!
//! ```ignore
//! use cdceprog_core::{hex, pll::PllCatalog, program};
//!
//! let mut regs = hex::parse_lines(dump.lines(), false)?;
//! let count = regs.max_address().map(|a| a + 1).ok_or(Error::NoData)?;
//! let variant = PllCatalog::builtin().resolve(count)?;
//! program::program(&variant, &mut regs, &mut bus, &mut NoProgress)?;
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod bus;
pub mod error;
pub mod hex;
pub mod pll;
pub mod program;

pub use error::{Error, Result};
