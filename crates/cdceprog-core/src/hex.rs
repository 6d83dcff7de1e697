//! Hex record parsing
//!
//! Register dumps for the CDCE9xx chips come as Intel-HEX-style records,
//! one per line: `:BBAAAATTDD...DDCC` with a byte count, a 16-bit
//! big-endian address, a record type, the payload bytes and a trailing
//! checksum. Parsing reconstructs a sparse register map from the data
//! records.

use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Record type: data payload
pub const RECORD_DATA: u8 = 0x00;
/// Record type: end-of-file marker
pub const RECORD_EOF: u8 = 0x01;

/// Sparse register address -> value map
///
/// An absent address means "not specified by the input file", which is
/// distinct from a register whose value is zero. Only addresses present
/// in the map are ever written to the chip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterMap {
    regs: BTreeMap<u16, u8>,
}

impl RegisterMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the value at an address, if the input file supplied one
    pub fn get(&self, addr: u16) -> Option<u8> {
        self.regs.get(&addr).copied()
    }

    /// Set the value at an address
    pub fn set(&mut self, addr: u16, value: u8) {
        self.regs.insert(addr, value);
    }

    /// Check whether an address was supplied by the input file
    pub fn contains(&self, addr: u16) -> bool {
        self.regs.contains_key(&addr)
    }

    /// Highest occupied address, or `None` for an empty map
    pub fn max_address(&self) -> Option<u16> {
        self.regs.keys().next_back().copied()
    }

    /// Number of occupied addresses
    pub fn len(&self) -> usize {
        self.regs.len()
    }

    /// True if no address is occupied
    pub fn is_empty(&self) -> bool {
        self.regs.is_empty()
    }

    /// Iterate over (address, value) pairs in address order
    pub fn iter(&self) -> impl Iterator<Item = (u16, u8)> + '_ {
        self.regs.iter().map(|(&a, &v)| (a, v))
    }

    /// Modify the value at an address in place
    ///
    /// Fails if the address was never supplied by the input file.
    pub fn update(&mut self, addr: u16, f: impl FnOnce(u8) -> u8) -> Result<()> {
        match self.regs.get_mut(&addr) {
            Some(value) => {
                *value = f(*value);
                Ok(())
            }
            None => Err(Error::MissingRegister(addr)),
        }
    }
}

/// One decoded hex record line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexRecord {
    /// 16-bit target address of the first payload byte
    pub address: u16,
    /// Record type field; see [`RECORD_DATA`] and [`RECORD_EOF`]
    pub record_type: u8,
    /// Payload bytes (empty for non-data records)
    pub payload: Vec<u8>,
}

/// Parse a sequence of hex record lines into a register map
///
/// With `strict` set, the trailing checksum byte of every record is
/// verified (all record bytes must sum to zero mod 256). The default is
/// lax: the checksum byte is carried in the record but never checked.
///
/// Input that supplies no register values at all (empty, or end-of-file
/// records only) fails with [`Error::NoData`].
pub fn parse_lines<I, S>(lines: I, strict: bool) -> Result<RegisterMap>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut regs = RegisterMap::new();

    for (idx, line) in lines.into_iter().enumerate() {
        let record = parse_record(line.as_ref(), idx + 1, strict)?;
        match record.record_type {
            RECORD_DATA => {
                for (i, &byte) in record.payload.iter().enumerate() {
                    let addr = record
                        .address
                        .checked_add(i as u16)
                        .ok_or(Error::AddressOverflow { line: idx + 1 })?;
                    regs.set(addr, byte);
                }
            }
            RECORD_EOF => {
                // End marker, do nothing. Parsing continues harmlessly if
                // more lines follow.
            }
            other => {
                return Err(Error::UnknownRecordType {
                    line: idx + 1,
                    record_type: other,
                });
            }
        }
    }

    if regs.is_empty() {
        return Err(Error::NoData);
    }

    Ok(regs)
}

/// Decode a single record line
///
/// `line_no` is 1-based and used only for error reporting.
pub fn parse_record(line: &str, line_no: usize, strict: bool) -> Result<HexRecord> {
    let line = line.trim_end();
    let body = line
        .strip_prefix(':')
        .ok_or(Error::MissingStartMarker { line: line_no })?;

    let data = decode_hex(body, line_no)?;

    // Header: byte count, 16-bit address, record type
    if data.len() < 4 {
        return Err(Error::TruncatedRecord {
            line: line_no,
            got: data.len(),
            need: 4,
        });
    }
    let byte_count = data[0] as usize;
    let address = u16::from_be_bytes([data[1], data[2]]);
    let record_type = data[3];

    // Payload plus, in strict mode, the checksum byte
    let need = if strict { 5 + byte_count } else { 4 + byte_count };
    if data.len() < need {
        return Err(Error::TruncatedRecord {
            line: line_no,
            got: data.len(),
            need,
        });
    }

    if strict {
        let sum = data
            .iter()
            .take(5 + byte_count)
            .fold(0u8, |acc, &b| acc.wrapping_add(b));
        if sum != 0 {
            return Err(Error::ChecksumMismatch { line: line_no, sum });
        }
    }

    Ok(HexRecord {
        address,
        record_type,
        payload: data[4..4 + byte_count].to_vec(),
    })
}

fn decode_hex(text: &str, line_no: usize) -> Result<Vec<u8>> {
    if text.len() % 2 != 0 {
        return Err(Error::OddHexLength { line: line_no });
    }
    text.as_bytes()
        .chunks_exact(2)
        .map(|pair| {
            let hi = hex_digit(pair[0], line_no)?;
            let lo = hex_digit(pair[1], line_no)?;
            Ok(hi << 4 | lo)
        })
        .collect()
}

fn hex_digit(c: u8, line_no: usize) -> Result<u8> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        _ => Err(Error::InvalidHexDigit { line: line_no }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_line_input() {
        let regs = parse_lines([":02002000AABB79", ":00000001FF"], false).unwrap();
        assert_eq!(regs.len(), 2);
        assert_eq!(regs.get(0x20), Some(0xAA));
        assert_eq!(regs.get(0x21), Some(0xBB));
        assert_eq!(regs.max_address(), Some(0x21));
    }

    #[test]
    fn test_missing_start_marker() {
        let err = parse_lines(["02002000AABB79"], false).unwrap_err();
        assert!(matches!(err, Error::MissingStartMarker { line: 1 }));

        // Content after the marker position is irrelevant
        let err = parse_lines(["garbage"], false).unwrap_err();
        assert!(matches!(err, Error::MissingStartMarker { line: 1 }));
    }

    #[test]
    fn test_unknown_record_type() {
        let err = parse_lines([":02002002AABB77"], false).unwrap_err();
        assert!(matches!(
            err,
            Error::UnknownRecordType {
                line: 1,
                record_type: 2
            }
        ));
    }

    #[test]
    fn test_eof_record_is_harmless() {
        // Records after the EOF marker are still consumed
        let regs = parse_lines([":00000001FF", ":010030005574"], false).unwrap();
        assert_eq!(regs.get(0x30), Some(0x55));
    }

    #[test]
    fn test_invalid_hex_digits() {
        let err = parse_lines([":02002000AAZZ79"], false).unwrap_err();
        assert!(matches!(err, Error::InvalidHexDigit { line: 1 }));
    }

    #[test]
    fn test_odd_hex_length() {
        let err = parse_lines([":02002000AAB"], false).unwrap_err();
        assert!(matches!(err, Error::OddHexLength { line: 1 }));
    }

    #[test]
    fn test_truncated_record() {
        // Byte count claims 4 payload bytes but only 2 are present
        let err = parse_lines([":04002000AABB"], false).unwrap_err();
        assert!(matches!(
            err,
            Error::TruncatedRecord {
                line: 1,
                got: 6,
                need: 8
            }
        ));
    }

    #[test]
    fn test_lax_mode_ignores_bad_checksum() {
        // Checksum byte is wrong but lax mode never looks at it
        let regs = parse_lines([":02002000AABB00"], false).unwrap();
        assert_eq!(regs.get(0x20), Some(0xAA));
    }

    #[test]
    fn test_strict_mode_verifies_checksum() {
        // 02 + 00 + 20 + 00 + AA + BB + 79 == 0x200 -> 0 mod 256
        let regs = parse_lines([":02002000AABB79"], true).unwrap();
        assert_eq!(regs.get(0x21), Some(0xBB));

        let err = parse_lines([":02002000AABB78"], true).unwrap_err();
        assert!(matches!(err, Error::ChecksumMismatch { line: 1, .. }));
    }

    #[test]
    fn test_strict_mode_requires_checksum_byte() {
        // Valid in lax mode, truncated in strict mode
        assert!(parse_lines([":02002000AABB"], false).is_ok());
        let err = parse_lines([":02002000AABB"], true).unwrap_err();
        assert!(matches!(err, Error::TruncatedRecord { line: 1, .. }));
    }

    #[test]
    fn test_no_data_records_is_an_error() {
        let err = parse_lines([":00000001FF"], false).unwrap_err();
        assert!(matches!(err, Error::NoData));

        let err = parse_lines(std::iter::empty::<&str>(), false).unwrap_err();
        assert!(matches!(err, Error::NoData));

        // A zero-length data record supplies nothing either
        let err = parse_lines([":00002000E0", ":00000001FF"], false).unwrap_err();
        assert!(matches!(err, Error::NoData));
    }

    #[test]
    fn test_payload_past_address_space_is_rejected() {
        // Second payload byte would land at 0x10000
        let err = parse_lines([":02FFFF00AABB"], false).unwrap_err();
        assert!(matches!(err, Error::AddressOverflow { line: 1 }));

        // A single byte at the very top address is fine
        let regs = parse_lines([":01FFFF00AA"], false).unwrap();
        assert_eq!(regs.get(0xFFFF), Some(0xAA));
    }

    #[test]
    fn test_error_reports_line_number() {
        let err = parse_lines([":00000001FF", "not a record"], false).unwrap_err();
        assert!(matches!(err, Error::MissingStartMarker { line: 2 }));
    }

    #[test]
    fn test_register_map_absent_is_not_zero() {
        let mut regs = RegisterMap::new();
        regs.set(3, 0);
        assert_eq!(regs.get(3), Some(0));
        assert_eq!(regs.get(4), None);
        assert!(regs.contains(3));
        assert!(!regs.contains(4));
    }

    #[test]
    fn test_register_map_update_missing() {
        let mut regs = RegisterMap::new();
        let err = regs.update(1, |v| v | 1).unwrap_err();
        assert!(matches!(err, Error::MissingRegister(1)));
    }
}
