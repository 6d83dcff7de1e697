//! Probe command implementation

use cdceprog_core::bus::I2cBus;
use cdceprog_core::pll::PllCatalog;
use cdceprog_core::program::CONTROL_OFFSET;

/// Presence-read every cataloged variant's address and report what
/// answers
pub fn run_probe<B: I2cBus + ?Sized>(bus: &mut B) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = PllCatalog::builtin();
    let mut found = 0;

    for variant in catalog.variants() {
        match bus.read_reg(variant.bus_address, CONTROL_OFFSET) {
            Ok(value) => {
                println!(
                    "0x{:02X}: {} answered (register 0 = 0x{:02X})",
                    variant.bus_address, variant.name, value
                );
                found += 1;
            }
            Err(e) => {
                log::debug!("no answer at 0x{:02X}: {}", variant.bus_address, e);
                println!("0x{:02X}: no answer ({})", variant.bus_address, variant.name);
            }
        }
    }

    if found == 0 {
        println!();
        println!("No PLL found. Is the chip connected and the right bus selected?");
    }

    Ok(())
}
