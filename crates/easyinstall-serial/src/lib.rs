//! easyinstall-serial - Finds the serial port an ESP32 is attached to
//!
//! Ports are listed through the [`discovery::PortLister`] trait
//! ([`discovery::SystemPorts`] uses the `serialport` crate) and matched
//! against the USB vendor IDs of common ESP32 bridges.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod discovery;
pub mod error;

pub use discovery::{
    discover, list_ports, DeviceHandle, PortEntry, PortLister, SystemPorts, VendorSignature,
};
pub use error::DiscoveryError;
