//! Error types for Linux I2C operations

use thiserror::Error;

/// Linux I2C specific errors
#[derive(Debug, Error)]
pub enum LinuxI2cError {
    /// Failed to open device
    #[error("Failed to open {path}: {source}")]
    OpenFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to query adapter functionality
    #[error("Failed to query I2C adapter functionality: {0}")]
    FuncsFailed(#[source] std::io::Error),

    /// Adapter does not support SMBus byte-data transfers
    #[error("I2C adapter does not support SMBus byte-data transfers")]
    SmbusNotSupported,

    /// Failed to select the slave address
    #[error("Failed to select slave address 0x{address:02X}: {source}")]
    SetSlaveFailed {
        address: u8,
        #[source]
        source: std::io::Error,
    },

    /// SMBus transfer failed
    #[error("SMBus transfer at register 0x{register:02X} failed: {source}")]
    TransferFailed {
        register: u8,
        #[source]
        source: std::io::Error,
    },

    /// Device not specified
    #[error("No device specified. Use dev=/dev/i2c-N or bus=N")]
    NoDevice,

    /// Invalid option value
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for Linux I2C operations
pub type Result<T> = std::result::Result<T, LinuxI2cError>;
