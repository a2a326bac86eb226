//! Argument lists handed to the flasher
//!
//! The flasher takes a flat list in esptool syntax:
//!
//! ```text
//! -p <port> -b <baud> erase_flash
//! -p <port> -b <baud> -c <chip> --before default_reset -a no_reset \
//!     write_flash --flash_mode dio --flash_freq 80m --flash_size <size> \
//!     <offset> <file> [<offset> <file> ...]
//! ```

use crate::board::{BoardProfile, FlashImage, FlashSize};

/// Serial baud rate used for every operation
pub const BAUD_RATE: u32 = 115_200;
/// Flash mode
pub const FLASH_MODE: &str = "dio";
/// Flash frequency
pub const FLASH_FREQ: &str = "80m";
/// Reset mode before connecting
pub const BEFORE_RESET: &str = "default_reset";
/// Reset mode after writing (the device is left in the bootloader)
pub const AFTER_RESET: &str = "no_reset";

/// Parameters for a full-chip erase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EraseParams {
    /// Serial port
    pub port: String,
    /// Baud rate
    pub baud: u32,
}

impl EraseParams {
    /// Erase at the default baud rate
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            baud: BAUD_RATE,
        }
    }

    /// Flatten into flasher arguments
    pub fn to_args(&self) -> Vec<String> {
        vec![
            "-p".to_string(),
            self.port.clone(),
            "-b".to_string(),
            self.baud.to_string(),
            "erase_flash".to_string(),
        ]
    }
}

/// Parameters for writing a board profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteParams {
    /// Serial port
    pub port: String,
    /// Baud rate
    pub baud: u32,
    /// Chip identifier
    pub chip: String,
    /// Flash size class
    pub flash_size: FlashSize,
    /// Images in ascending offset order
    pub images: Vec<FlashImage>,
}

impl WriteParams {
    /// Write `profile` through `port` at the default baud rate
    pub fn for_profile(port: impl Into<String>, profile: &BoardProfile) -> Self {
        Self {
            port: port.into(),
            baud: BAUD_RATE,
            chip: profile.chip.to_string(),
            flash_size: profile.flash_size,
            images: profile.images.clone(),
        }
    }

    /// Flatten into flasher arguments
    pub fn to_args(&self) -> Vec<String> {
        let baud = self.baud.to_string();
        let mut args: Vec<String> = [
            "-p",
            self.port.as_str(),
            "-b",
            baud.as_str(),
            "-c",
            self.chip.as_str(),
            "--before",
            BEFORE_RESET,
            "-a",
            AFTER_RESET,
            "write_flash",
            "--flash_mode",
            FLASH_MODE,
            "--flash_freq",
            FLASH_FREQ,
            "--flash_size",
            self.flash_size.as_str(),
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        for image in &self.images {
            args.push(format_offset(image.offset));
            args.push(image.path.display().to_string());
        }
        args
    }
}

/// Render an offset the way esptool prints them (`0x1000`, `0x0`)
pub fn format_offset(offset: u32) -> String {
    format!("{:#x}", offset)
}
