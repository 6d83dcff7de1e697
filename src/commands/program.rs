//! Program command implementation

use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use cdceprog_core::pll::PllCatalog;
use cdceprog_core::program::{self, ProgramProgress, ProgramStats};
use cdceprog_core::{hex, Error as CoreError};

use crate::buses;

/// Progress reporter using indicatif
struct IndicatifProgress {
    current_bar: Option<ProgressBar>,
}

impl IndicatifProgress {
    fn new() -> Self {
        Self { current_bar: None }
    }

    fn finish(&mut self, message: &'static str) {
        if let Some(pb) = self.current_bar.take() {
            pb.finish_with_message(message);
        }
    }
}

impl ProgramProgress for IndicatifProgress {
    fn writing(&mut self, registers_to_write: usize) {
        let pb = ProgressBar::new(registers_to_write as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} registers {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        self.current_bar = Some(pb);
    }

    fn register_written(&mut self, written: usize) {
        if let Some(pb) = &self.current_bar {
            pb.set_position(written as u64);
        }
    }

    fn eeprom_wait(&mut self, iteration: u32) {
        if iteration == 1 {
            self.finish("Registers written");
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.set_message("Waiting until EEPROM write cycle finishes...");
            pb.enable_steady_tick(Duration::from_millis(100));
            self.current_bar = Some(pb);
        }
    }

    fn complete(&mut self, _stats: &ProgramStats) {
        self.finish("EEPROM write cycle finished");
    }
}

/// Run the program command
pub fn run_program(
    bus_spec: &str,
    hexfile: &Path,
    strict: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // Parse the register dump
    let text = std::fs::read_to_string(hexfile)
        .map_err(|e| format!("Failed to read {}: {}", hexfile.display(), e))?;
    let mut regs = hex::parse_lines(text.lines(), strict)?;

    log::debug!("parsed {} register values", regs.len());

    // Determine PLL type based on highest register used
    let register_count = regs
        .max_address()
        .map(|a| a + 1)
        .ok_or(CoreError::NoData)?;
    let variant = PllCatalog::builtin().resolve(register_count)?;

    println!("Found data for a {} chip", variant.name);

    // Open the bus and run the programming sequence
    let mut bus = buses::open_bus(bus_spec)?;
    let mut progress = IndicatifProgress::new();
    let stats = program::program(&variant, &mut regs, &mut bus, &mut progress)?;

    println!(
        "Programmed {} registers, EEPROM write finished after {} polls",
        stats.registers_written, stats.poll_iterations
    );

    Ok(())
}
