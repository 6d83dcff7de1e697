//! Linux I2C device implementation
//!
//! This module provides the `LinuxI2c` struct that implements the
//! `I2cBus` trait using Linux's i2c-dev interface.

use crate::error::{LinuxI2cError, Result};

use cdceprog_core::bus::I2cBus;
use cdceprog_core::error::Error as CoreError;

use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::io::AsRawFd;

/// Linux i2c-dev ioctl constants
mod ioctl {
    use nix::ioctl_write_int_bad;

    /// Select the slave address for subsequent transfers
    pub const I2C_SLAVE: libc::c_ulong = 0x0703;
    /// Query adapter functionality bits
    pub const I2C_FUNCS: libc::c_ulong = 0x0705;
    /// Perform an SMBus transfer
    pub const I2C_SMBUS: libc::c_ulong = 0x0720;

    /// Functionality bit: SMBus "read byte data" supported
    pub const I2C_FUNC_SMBUS_READ_BYTE_DATA: libc::c_ulong = 0x0008_0000;
    /// Functionality bit: SMBus "write byte data" supported
    pub const I2C_FUNC_SMBUS_WRITE_BYTE_DATA: libc::c_ulong = 0x0010_0000;

    /// SMBus transfer directions
    pub const I2C_SMBUS_READ: u8 = 1;
    pub const I2C_SMBUS_WRITE: u8 = 0;

    /// SMBus transaction type: byte at a command/register address
    pub const I2C_SMBUS_BYTE_DATA: u32 = 2;

    /// Largest SMBus block transfer
    pub const I2C_SMBUS_BLOCK_MAX: usize = 32;

    ioctl_write_int_bad!(i2c_set_slave, I2C_SLAVE as libc::c_int);
}

/// Data buffer for an SMBus transfer
///
/// This must match the kernel's union i2c_smbus_data layout; only the
/// first byte is used for byte-data transfers.
#[repr(C)]
#[derive(Clone, Copy)]
union I2cSmbusData {
    byte: u8,
    word: u16,
    block: [u8; ioctl::I2C_SMBUS_BLOCK_MAX + 2],
}

impl I2cSmbusData {
    fn zeroed() -> Self {
        Self {
            block: [0; ioctl::I2C_SMBUS_BLOCK_MAX + 2],
        }
    }
}

/// Argument for the I2C_SMBUS ioctl
///
/// This must match the kernel's struct i2c_smbus_ioctl_data layout.
#[repr(C)]
struct I2cSmbusIoctlData {
    read_write: u8,     // __u8 read_write
    command: u8,        // __u8 command
    size: u32,          // __u32 size
    data: *mut I2cSmbusData, // union i2c_smbus_data *data
}

/// Configuration for opening a Linux I2C bus
#[derive(Debug, Clone, Default)]
pub struct LinuxI2cConfig {
    /// Device path (e.g., "/dev/i2c-1")
    pub device: String,
}

impl LinuxI2cConfig {
    /// Create a new configuration with the given device path
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
        }
    }

    /// Create a configuration from a bus number (e.g., 1 -> /dev/i2c-1)
    pub fn bus_number(bus: u32) -> Self {
        Self::new(format!("/dev/i2c-{}", bus))
    }
}

/// Linux I2C bus using the i2c-dev interface
///
/// This struct implements the `I2cBus` trait for Linux systems using
/// the `/dev/i2c-N` character device interface with SMBus byte-data
/// transfers.
pub struct LinuxI2c {
    /// File handle for the i2c-dev device
    file: File,
    /// Slave address currently selected via I2C_SLAVE
    current_addr: Option<u8>,
}

impl LinuxI2c {
    /// Open a Linux I2C bus with the given configuration
    pub fn open(config: &LinuxI2cConfig) -> Result<Self> {
        if config.device.is_empty() {
            return Err(LinuxI2cError::NoDevice);
        }

        log::debug!("linux_i2c: Opening device {}", config.device);

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&config.device)
            .map_err(|e| LinuxI2cError::OpenFailed {
                path: config.device.clone(),
                source: e,
            })?;

        // Check the adapter can do SMBus byte-data transfers at all
        let fd = file.as_raw_fd();
        let mut funcs: libc::c_ulong = 0;
        let ret = unsafe { libc::ioctl(fd, ioctl::I2C_FUNCS, &mut funcs as *mut libc::c_ulong) };
        if ret < 0 {
            return Err(LinuxI2cError::FuncsFailed(io::Error::last_os_error()));
        }
        let needed = ioctl::I2C_FUNC_SMBUS_READ_BYTE_DATA | ioctl::I2C_FUNC_SMBUS_WRITE_BYTE_DATA;
        if funcs & needed != needed {
            return Err(LinuxI2cError::SmbusNotSupported);
        }

        log::info!("linux_i2c: Opened {}", config.device);

        Ok(Self {
            file,
            current_addr: None,
        })
    }

    /// Open a device path with default settings
    pub fn open_device(device: &str) -> Result<Self> {
        Self::open(&LinuxI2cConfig::new(device))
    }

    /// Select the slave address for subsequent transfers
    ///
    /// The kernel remembers the address per file descriptor, so the
    /// ioctl is only issued when the address changes.
    fn set_slave(&mut self, addr: u8) -> Result<()> {
        if self.current_addr == Some(addr) {
            return Ok(());
        }

        let fd = self.file.as_raw_fd();
        unsafe {
            ioctl::i2c_set_slave(fd, addr as libc::c_int).map_err(|e| {
                LinuxI2cError::SetSlaveFailed {
                    address: addr,
                    source: io::Error::from_raw_os_error(e as i32),
                }
            })?;
        }

        log::debug!("linux_i2c: Selected slave address 0x{:02X}", addr);
        self.current_addr = Some(addr);
        Ok(())
    }

    /// Perform one SMBus byte-data transfer
    fn smbus_byte_data(&mut self, read_write: u8, register: u8, value: u8) -> Result<u8> {
        let fd = self.file.as_raw_fd();

        let mut data = I2cSmbusData::zeroed();
        if read_write == ioctl::I2C_SMBUS_WRITE {
            data.byte = value;
        }

        let mut args = I2cSmbusIoctlData {
            read_write,
            command: register,
            size: ioctl::I2C_SMBUS_BYTE_DATA,
            data: &mut data,
        };

        let ret = unsafe { libc::ioctl(fd, ioctl::I2C_SMBUS, &mut args as *mut I2cSmbusIoctlData) };
        if ret < 0 {
            return Err(LinuxI2cError::TransferFailed {
                register,
                source: io::Error::last_os_error(),
            });
        }

        Ok(unsafe { data.byte })
    }

    /// SMBus "read byte data" from the device selected via `set_slave`
    pub fn read_byte_data(&mut self, addr: u8, register: u8) -> Result<u8> {
        self.set_slave(addr)?;
        self.smbus_byte_data(ioctl::I2C_SMBUS_READ, register, 0)
    }

    /// SMBus "write byte data" to the device selected via `set_slave`
    pub fn write_byte_data(&mut self, addr: u8, register: u8, value: u8) -> Result<()> {
        self.set_slave(addr)?;
        self.smbus_byte_data(ioctl::I2C_SMBUS_WRITE, register, value)?;
        Ok(())
    }
}

impl I2cBus for LinuxI2c {
    fn read_reg(&mut self, addr: u8, reg: u8) -> cdceprog_core::Result<u8> {
        self.read_byte_data(addr, reg)
            .map_err(|e| CoreError::Io(io::Error::other(e)))
    }

    fn write_reg(&mut self, addr: u8, reg: u8, value: u8) -> cdceprog_core::Result<()> {
        self.write_byte_data(addr, reg, value)
            .map_err(|e| CoreError::Io(io::Error::other(e)))
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(ms as u64));
    }
}

/// Parse programmer options from a list of key-value pairs
pub fn parse_options(options: &[(&str, &str)]) -> std::result::Result<LinuxI2cConfig, String> {
    let mut config = LinuxI2cConfig::default();

    for (key, value) in options {
        match *key {
            "dev" => {
                config.device = value.to_string();
            }
            "bus" => {
                let bus: u32 = value
                    .parse()
                    .map_err(|_| format!("Invalid bus number: {}", value))?;
                config.device = format!("/dev/i2c-{}", bus);
            }
            _ => {
                log::warn!("linux_i2c: Unknown option: {}={}", key, value);
            }
        }
    }

    if config.device.is_empty() {
        return Err("No device specified. Use dev=/dev/i2c-N or bus=N".to_string());
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_options_dev() {
        let config = parse_options(&[("dev", "/dev/i2c-7")]).unwrap();
        assert_eq!(config.device, "/dev/i2c-7");
    }

    #[test]
    fn test_parse_options_bus_number() {
        let config = parse_options(&[("bus", "2")]).unwrap();
        assert_eq!(config.device, "/dev/i2c-2");
    }

    #[test]
    fn test_parse_options_rejects_bad_bus() {
        assert!(parse_options(&[("bus", "two")]).is_err());
    }

    #[test]
    fn test_parse_options_requires_device() {
        assert!(parse_options(&[]).is_err());
    }

    #[test]
    fn test_config_bus_number() {
        assert_eq!(LinuxI2cConfig::bus_number(1).device, "/dev/i2c-1");
    }
}
