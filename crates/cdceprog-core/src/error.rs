//! Error types for cdceprog-core

use thiserror::Error;

/// Core error type covering hex parsing, variant resolution and bus I/O
#[derive(Debug, Error)]
pub enum Error {
    /// Hex record line does not start with ':'
    #[error("line {line}: no start character ':' found")]
    MissingStartMarker { line: usize },

    /// Hex record contains a character that is not a hex digit
    #[error("line {line}: invalid hex digit in record")]
    InvalidHexDigit { line: usize },

    /// Hex record has an odd number of hex digits
    #[error("line {line}: odd number of hex digits in record")]
    OddHexLength { line: usize },

    /// Hex record is shorter than its header and byte count require
    #[error("line {line}: record truncated ({got} bytes, need {need})")]
    TruncatedRecord { line: usize, got: usize, need: usize },

    /// Hex record type is neither data (0) nor end-of-file (1)
    #[error("line {line}: unknown record type {record_type} found")]
    UnknownRecordType { line: usize, record_type: u8 },

    /// Record checksum does not sum to zero (strict mode only)
    #[error("line {line}: record checksum mismatch (sum 0x{sum:02X}, expected 0x00)")]
    ChecksumMismatch { line: usize, sum: u8 },

    /// Record payload extends past the top of the 16-bit address space
    #[error("line {line}: record data extends past address 0xFFFF")]
    AddressOverflow { line: usize },

    /// Input contained no data records at all
    #[error("hex file contains no data records")]
    NoData,

    /// No cataloged PLL variant has this many registers
    #[error("no PLL type with {0} registers known")]
    UnknownVariant(u16),

    /// More than one cataloged PLL variant has this many registers
    #[error("{matches} PLL types with {register_count} registers in catalog")]
    AmbiguousVariant { matches: usize, register_count: u16 },

    /// A register required by the programming sequence is absent from the dump
    #[error("register {0} is not present in the hex file")]
    MissingRegister(u16),

    /// Presence check failed before any register was written
    #[error("no answer from device at 0x{address:02X}: {source} (maybe the PLL is not connected?)")]
    Presence {
        address: u8,
        #[source]
        source: Box<Error>,
    },

    /// Bus transfer failed
    #[error("I2C transfer failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using the core Error type
pub type Result<T> = std::result::Result<T, Error>;
