//! Register programming sequence
//!
//! The CDCE9xx maps its register file at a 0x80 command offset for both
//! reads and writes. Programming the EEPROM is a fixed sequence: fix up
//! the parsed register image, check the device answers, write the
//! configuration registers (0x10 and up) before the control block
//! (0x00..0x10), pulse the EEPROM write trigger in control register 6,
//! then poll the status bit in control register 1 until the write cycle
//! finishes.

use crate::bus::I2cBus;
use crate::error::{Error, Result};
use crate::hex::RegisterMap;
use crate::pll::PllVariant;

/// Base added to a register index to form the bus-level command address
pub const CONTROL_OFFSET: u8 = 0x80;

/// First register above the control block
pub const CONTROL_BLOCK_LEN: u16 = 0x10;

/// EEPROM lock bit in register 1; must be cleared before a rewrite
pub const EEPROM_LOCK: u8 = 1 << 5;

/// Write-pending bit in register 6; set to start an EEPROM write cycle
pub const EEPROM_WRITE: u8 = 1 << 0;

/// Busy bit in register 1; set while an EEPROM write cycle is running
pub const EEPROM_BUSY: u8 = 1 << 6;

/// Low bits of register 1 selecting the chip's I2C address
pub const ADDR_BITS: u8 = 0x03;

/// Delay between completion polls
const POLL_INTERVAL_MS: u32 = 100;

/// What the pre-write fixups changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixupReport {
    /// The dump carried a non-default I2C address and it was overridden
    pub address_overridden: bool,
}

/// Counters from a completed programming run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgramStats {
    /// Registers written (not counting the trigger write)
    pub registers_written: usize,
    /// Busy polls observed before the EEPROM write cycle finished
    pub poll_iterations: u32,
}

/// Observer for programming progress
///
/// Default impls are no-ops so implementations only override the phases
/// they present.
pub trait ProgramProgress {
    /// Register writes are about to start
    fn writing(&mut self, _registers_to_write: usize) {}

    /// One more register has been written
    fn register_written(&mut self, _written: usize) {}

    /// The EEPROM write cycle is still busy after `iteration` polls
    fn eeprom_wait(&mut self, _iteration: u32) {}

    /// The run finished
    fn complete(&mut self, _stats: &ProgramStats) {}
}

/// No-op progress observer
pub struct NoProgress;

impl ProgramProgress for NoProgress {}

/// Apply the pre-write fixups to a parsed register image
///
/// Clears the EEPROM lock bit in register 1 and the write-pending bit in
/// register 6, and forces the address-select bits of register 1 to the
/// variant's default. All three are idempotent. Fails if register 1 or 6
/// is absent from the dump.
pub fn apply_fixups(regs: &mut RegisterMap, variant: &PllVariant) -> Result<FixupReport> {
    let mut report = FixupReport::default();

    regs.update(1, |v| v & !EEPROM_LOCK)?;
    regs.update(6, |v| v & !EEPROM_WRITE)?;

    let reg1 = regs.get(1).ok_or(Error::MissingRegister(1))?;
    if reg1 & ADDR_BITS != variant.bus_address & ADDR_BITS {
        log::warn!("Non-default I2C address in hex file ignored");
        regs.set(1, (reg1 & !ADDR_BITS) | (variant.bus_address & ADDR_BITS));
        report.address_overridden = true;
    }

    Ok(report)
}

/// Program a register image into the PLL and commit it to EEPROM
///
/// Sequencing: fixups, presence check, configuration registers
/// `[0x10, register_count)`, control registers `[0, 0x10)`, EEPROM
/// trigger, completion poll. Addresses absent from the map are skipped,
/// never written as zero. A failed presence check is wrapped with a
/// disconnect hint; I/O errors in the write phases propagate as-is with
/// no retry and no rollback.
pub fn program<B: I2cBus + ?Sized>(
    variant: &PllVariant,
    regs: &mut RegisterMap,
    bus: &mut B,
    progress: &mut dyn ProgramProgress,
) -> Result<ProgramStats> {
    apply_fixups(regs, variant)?;

    let addr = variant.bus_address;

    // Fail fast with an actionable message before any destructive write
    if let Err(err) = bus.read_reg(addr, CONTROL_OFFSET) {
        return Err(Error::Presence {
            address: addr,
            source: Box::new(err),
        });
    }
    log::debug!("device at 0x{:02X} answered presence check", addr);

    let mut stats = ProgramStats::default();
    let to_write = regs
        .iter()
        .filter(|&(a, _)| a < variant.register_count)
        .count();
    progress.writing(to_write);

    // Configuration registers first; the control block must still hold
    // its old contents while these land, because register 6 in the
    // control block carries the write trigger.
    for i in CONTROL_BLOCK_LEN..variant.register_count {
        if let Some(value) = regs.get(i) {
            bus.write_reg(addr, CONTROL_OFFSET + i as u8, value)?;
            stats.registers_written += 1;
            progress.register_written(stats.registers_written);
        }
    }

    // Control registers
    for i in 0..CONTROL_BLOCK_LEN {
        if let Some(value) = regs.get(i) {
            bus.write_reg(addr, CONTROL_OFFSET + i as u8, value)?;
            stats.registers_written += 1;
            progress.register_written(stats.registers_written);
        }
    }

    // Commit pulse: register 6 with the write bit forced on, strictly
    // after every other register
    let reg6 = regs.get(6).ok_or(Error::MissingRegister(6))?;
    bus.write_reg(addr, CONTROL_OFFSET + 6, reg6 | EEPROM_WRITE)?;
    log::info!("EEPROM write cycle started");

    // Wait until the write cycle finishes. The chip gives no failure
    // indication here, only the busy bit, so this loop is unbounded.
    loop {
        let status = bus.read_reg(addr, CONTROL_OFFSET + 1)?;
        if status & EEPROM_BUSY == 0 {
            break;
        }
        stats.poll_iterations += 1;
        progress.eeprom_wait(stats.poll_iterations);
        bus.delay_ms(POLL_INTERVAL_MS);
    }

    progress.complete(&stats);
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pll::{CDCE913, CDCE925};
    use std::collections::VecDeque;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Op {
        Read(u8, u8),
        Write(u8, u8, u8),
        Delay(u32),
    }

    /// Scripted bus: presence read and status reads are served from
    /// queues, every transaction is recorded.
    struct MockBus {
        ops: Vec<Op>,
        presence_ok: bool,
        status: VecDeque<u8>,
    }

    impl MockBus {
        fn new() -> Self {
            Self {
                ops: Vec::new(),
                presence_ok: true,
                // Not busy on first poll
                status: VecDeque::from([0x00]),
            }
        }

        fn with_status(statuses: &[u8]) -> Self {
            let mut bus = Self::new();
            bus.status = statuses.iter().copied().collect();
            bus
        }

        fn writes(&self) -> Vec<(u8, u8)> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    Op::Write(_, reg, value) => Some((*reg, *value)),
                    _ => None,
                })
                .collect()
        }
    }

    impl I2cBus for MockBus {
        fn read_reg(&mut self, addr: u8, reg: u8) -> Result<u8> {
            self.ops.push(Op::Read(addr, reg));
            match reg {
                0x80 => {
                    if self.presence_ok {
                        Ok(0x01)
                    } else {
                        Err(Error::Io(std::io::Error::other("no ack")))
                    }
                }
                0x81 => Ok(self.status.pop_front().expect("status read past script")),
                _ => Ok(0),
            }
        }

        fn write_reg(&mut self, addr: u8, reg: u8, value: u8) -> Result<()> {
            self.ops.push(Op::Write(addr, reg, value));
            Ok(())
        }

        fn delay_ms(&mut self, ms: u32) {
            self.ops.push(Op::Delay(ms));
        }
    }

    fn full_image(register_count: u16) -> RegisterMap {
        let mut regs = RegisterMap::new();
        for i in 0..register_count {
            regs.set(i, i as u8);
        }
        regs
    }

    #[test]
    fn test_fixups_clear_lock_and_write_bits() {
        let mut regs = RegisterMap::new();
        regs.set(1, 0b0010_0001); // lock set, addr bits 01
        regs.set(6, 0b0000_0001); // write pending set

        let report = apply_fixups(&mut regs, &CDCE913).unwrap();
        assert_eq!(regs.get(1), Some(0b0000_0001)); // 913 addr bits are 01
        assert_eq!(regs.get(6), Some(0));
        assert!(!report.address_overridden);
    }

    #[test]
    fn test_fixups_idempotent() {
        let mut regs = RegisterMap::new();
        regs.set(1, 0b0010_0101);
        regs.set(6, 0b1111_1111);

        apply_fixups(&mut regs, &CDCE925).unwrap();
        let once = regs.clone();
        apply_fixups(&mut regs, &CDCE925).unwrap();
        assert_eq!(regs, once);
    }

    #[test]
    fn test_fixups_override_address_bits() {
        let mut regs = RegisterMap::new();
        // addr bits 01, CDCE925 default is 00
        regs.set(1, 0b0010_0101);
        regs.set(6, 0);

        let report = apply_fixups(&mut regs, &CDCE925).unwrap();
        let reg1 = regs.get(1).unwrap();
        assert_eq!(reg1 & ADDR_BITS, CDCE925.bus_address & ADDR_BITS);
        assert_eq!(reg1 & EEPROM_LOCK, 0);
        assert!(report.address_overridden);
    }

    #[test]
    fn test_fixups_require_control_registers() {
        let mut regs = RegisterMap::new();
        regs.set(6, 0);
        let err = apply_fixups(&mut regs, &CDCE913).unwrap_err();
        assert!(matches!(err, Error::MissingRegister(1)));
    }

    #[test]
    fn test_presence_failure_is_wrapped() {
        let mut regs = full_image(0x20);
        let mut bus = MockBus::new();
        bus.presence_ok = false;

        let err = program(&CDCE913, &mut regs, &mut bus, &mut NoProgress).unwrap_err();
        assert!(matches!(err, Error::Presence { address: 0x65, .. }));
        // Nothing was written before the failed check
        assert!(bus.writes().is_empty());
    }

    #[test]
    fn test_write_order_high_then_control_then_trigger() {
        let mut regs = full_image(0x30);
        let mut bus = MockBus::new();

        program(&CDCE925, &mut regs, &mut bus, &mut NoProgress).unwrap();

        let writes = bus.writes();
        // 48 registers plus the trigger write
        assert_eq!(writes.len(), 49);
        // Configuration block 0x90..0xB0 first
        assert_eq!(writes[0].0, 0x90);
        assert_eq!(writes[31].0, 0xAF);
        // Then control block 0x80..0x90
        assert_eq!(writes[32].0, 0x80);
        assert_eq!(writes[47].0, 0x8F);
        // Trigger last
        assert_eq!(writes[48].0, 0x86);
    }

    #[test]
    fn test_absent_registers_are_skipped() {
        let mut regs = RegisterMap::new();
        regs.set(1, 0);
        regs.set(6, 0);
        regs.set(0x12, 0x55);
        regs.set(0x1F, 0xAA); // footprint: 0x20 -> CDCE913

        let mut bus = MockBus::new();
        program(&CDCE913, &mut regs, &mut bus, &mut NoProgress).unwrap();

        let writes = bus.writes();
        // 0x92, 0x9F, 0x81, 0x86, then the trigger; nothing else.
        // Register 1 picks up the CDCE913 address bits (01) in fixup.
        assert_eq!(
            writes,
            vec![
                (0x92, 0x55),
                (0x9F, 0xAA),
                (0x81, 0x01),
                (0x86, 0x00),
                (0x86, 0x01),
            ]
        );
    }

    #[test]
    fn test_trigger_always_sets_write_bit() {
        let mut regs = full_image(0x20);
        regs.set(6, 0xFE); // write bit clear after fixup too
        let mut bus = MockBus::new();

        program(&CDCE913, &mut regs, &mut bus, &mut NoProgress).unwrap();

        let trigger = *bus.writes().last().unwrap();
        assert_eq!(trigger.0, 0x86);
        assert_eq!(trigger.1 & EEPROM_WRITE, EEPROM_WRITE);
        assert_eq!(trigger.1, 0xFF);
    }

    #[test]
    fn test_poll_stops_at_first_clear_status() {
        let mut regs = full_image(0x20);
        // Busy twice, then done
        let mut bus = MockBus::with_status(&[0x40, 0x40, 0x00]);

        let stats = program(&CDCE913, &mut regs, &mut bus, &mut NoProgress).unwrap();
        assert_eq!(stats.poll_iterations, 2);

        // Exactly three status reads, no more after the clear one
        let status_reads = bus
            .ops
            .iter()
            .filter(|op| matches!(op, Op::Read(_, 0x81)))
            .count();
        assert_eq!(status_reads, 3);
        // One delay per busy poll
        let delays = bus
            .ops
            .iter()
            .filter(|op| matches!(op, Op::Delay(100)))
            .count();
        assert_eq!(delays, 2);
    }

    #[test]
    fn test_end_to_end_fixup_scenario() {
        // 48-register CDCE925 dump, register 1 = 0b00100101:
        // lock set, addr bits 01, variant default addr bits 00
        let mut regs = full_image(0x30);
        regs.set(1, 0b0010_0101);

        let report = apply_fixups(&mut regs, &CDCE925).unwrap();
        let reg1 = regs.get(1).unwrap();
        assert_eq!(reg1 & EEPROM_LOCK, 0);
        assert_eq!(reg1 & ADDR_BITS, 0b00);
        assert!(report.address_overridden);
    }

    #[test]
    fn test_stats_count_written_registers() {
        let mut regs = full_image(0x20);
        let mut bus = MockBus::new();
        let stats = program(&CDCE913, &mut regs, &mut bus, &mut NoProgress).unwrap();
        assert_eq!(stats.registers_written, 0x20);
    }
}
