//! Error types for device discovery

use thiserror::Error;

/// Discovery failure
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// No port matched any known USB bridge vendor
    #[error("No ESP32 device was detected")]
    NotFound,

    /// The OS refused to enumerate serial ports
    #[error("failed to enumerate serial ports: {0}")]
    Enumerate(#[from] serialport::Error),
}
