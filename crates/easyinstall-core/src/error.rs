//! Error types for easyinstall-core

use std::path::PathBuf;

use thiserror::Error;

use crate::prereqs::FirmwareSlot;

/// Core error type
#[derive(Debug, Error)]
pub enum CoreError {
    /// Menu selection outside the catalog
    #[error("Invalid option: {0}")]
    InvalidChoice(i64),

    /// Images of a board profile are not in ascending offset order
    #[error("{board}: image at 0x{offset:x} does not follow the previous image")]
    UnsortedOffsets {
        /// Board display name
        board: &'static str,
        /// Offending offset
        offset: u32,
    },

    /// A release firmware needed by the board was not found locally
    #[error("no local {0} firmware was found")]
    MissingFirmware(FirmwareSlot),

    /// A resolved image path does not point at a file
    #[error("firmware image not found: {}", .0.display())]
    MissingImage(PathBuf),
}

/// Result type alias using the core error type
pub type Result<T> = std::result::Result<T, CoreError>;
