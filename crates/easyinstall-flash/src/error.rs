//! Error type of the flash orchestrator

use std::io;

use thiserror::Error;

use easyinstall_core::flasher::FlasherError;
use easyinstall_core::prereqs::FirmwareSlot;
use easyinstall_core::CoreError;
use easyinstall_firmware::FirmwareError;
use easyinstall_serial::DiscoveryError;

/// Everything that can end a flashing session
#[derive(Debug, Error)]
pub enum FlashError {
    /// Catalog or profile error
    #[error(transparent)]
    Core(#[from] CoreError),

    /// No usable serial port
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// Sync, download or update failure
    #[error(transparent)]
    Firmware(#[from] FirmwareError),

    /// A release binary needed by the board is not in the cache
    #[error("no local {slot} firmware found (looked for {pattern})")]
    MissingFirmware {
        /// Firmware slot
        slot: FirmwareSlot,
        /// Pattern or path that was searched
        pattern: &'static str,
    },

    /// The flasher kept failing
    #[error("Could not complete the {operation} on {target} after {attempts} attempts: {last}")]
    RetriesExhausted {
        /// `erase` or `write`
        operation: &'static str,
        /// Board or port
        target: String,
        /// Attempts made
        attempts: u32,
        /// Error of the last attempt
        #[source]
        last: FlasherError,
    },

    /// The operator cancelled during the preselection window
    #[error("cancelled by operator")]
    Cancelled,

    /// Reading operator input failed
    #[error("failed to read input: {0}")]
    Operator(#[source] io::Error),

    /// No flasher with that name is compiled in
    #[error("unknown flasher: {0}")]
    UnknownFlasher(String),
}

impl FlashError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Core(CoreError::InvalidChoice(_)) => 2,
            Self::Discovery(DiscoveryError::NotFound) => 3,
            Self::RetriesExhausted { .. } => 4,
            Self::MissingFirmware { .. }
            | Self::Core(CoreError::MissingFirmware(_))
            | Self::Core(CoreError::MissingImage(_)) => 5,
            Self::Cancelled => 130,
            _ => 1,
        }
    }
}
