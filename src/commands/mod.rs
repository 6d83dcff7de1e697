//! Command implementations

pub mod list;
pub mod probe;
pub mod program;

pub use list::{list_buses, list_plls};
pub use probe::run_probe;
pub use program::run_program;
