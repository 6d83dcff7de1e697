//! PLL variant catalog
//!
//! The CDCE9xx family members differ in I2C address and register file
//! size. The register dump carries no explicit chip identifier, so the
//! variant is resolved from the register footprint of the parsed dump:
//! highest occupied address plus one must exactly match a cataloged
//! variant's register count.

use crate::error::{Error, Result};

/// Immutable descriptor of one PLL family member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PllVariant {
    /// Human-readable chip name
    pub name: &'static str,
    /// Default 7-bit I2C address
    pub bus_address: u8,
    /// Size of the register file; this is the identifying cardinality
    pub register_count: u16,
}

impl PllVariant {
    /// Create a new variant descriptor
    pub const fn new(name: &'static str, bus_address: u8, register_count: u16) -> Self {
        Self {
            name,
            bus_address,
            register_count,
        }
    }
}

/// CDCE913: 1-PLL member, 32 registers
pub const CDCE913: PllVariant = PllVariant::new("CDCE 913", 0x65, 0x20);
/// CDCE925: 2-PLL member, 48 registers
pub const CDCE925: PllVariant = PllVariant::new("CDCE 925", 0x64, 0x30);

/// Catalog of known PLL variants
///
/// The catalog is an immutable value injected into resolution rather
/// than a global table, so tests can substitute their own variant lists.
#[derive(Debug, Clone)]
pub struct PllCatalog {
    variants: Vec<PllVariant>,
}

impl PllCatalog {
    /// Create a catalog from an explicit variant list
    pub fn new(variants: Vec<PllVariant>) -> Self {
        Self { variants }
    }

    /// The builtin catalog of supported chips
    pub fn builtin() -> Self {
        Self::new(vec![CDCE913, CDCE925])
    }

    /// All variants in the catalog
    pub fn variants(&self) -> &[PllVariant] {
        &self.variants
    }

    /// Resolve the variant whose register file has exactly this many
    /// registers
    ///
    /// The caller computes `register_count` as the dump's highest
    /// occupied address plus one. A catalog in which several variants
    /// share a register count cannot resolve that count; this is a
    /// configuration error and reported distinctly from "no match".
    pub fn resolve(&self, register_count: u16) -> Result<PllVariant> {
        let mut matches = self
            .variants
            .iter()
            .filter(|v| v.register_count == register_count);

        match (matches.next(), matches.next()) {
            (Some(&variant), None) => Ok(variant),
            (None, _) => Err(Error::UnknownVariant(register_count)),
            (Some(_), Some(_)) => {
                let count = self
                    .variants
                    .iter()
                    .filter(|v| v.register_count == register_count)
                    .count();
                log::error!(
                    "catalog is misconfigured: {} variants claim {} registers",
                    count,
                    register_count
                );
                Err(Error::AmbiguousVariant {
                    matches: count,
                    register_count,
                })
            }
        }
    }
}

impl Default for PllCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
