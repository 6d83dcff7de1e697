//! List commands implementation

use crate::buses;
use cdceprog_core::pll::PllCatalog;

/// List all known PLL variants
pub fn list_plls() {
    let catalog = PllCatalog::builtin();

    println!("Known PLL variants:");
    println!();
    println!("{:<12} {:>12} {:>10}", "Name", "I2C address", "Registers");
    println!("{}", "-".repeat(38));

    for variant in catalog.variants() {
        println!(
            "{:<12} {:>12} {:>10}",
            variant.name,
            format!("0x{:02X}", variant.bus_address),
            variant.register_count
        );
    }
}

/// List all available bus backends
pub fn list_buses() {
    println!("Available bus backends:");
    println!();

    for bus in &buses::available_buses() {
        println!("  {:12} - {}", bus.name, bus.description);
        if !bus.aliases.is_empty() {
            println!("  {:12}   aliases: {}", "", bus.aliases.join(", "));
        }
    }
}
