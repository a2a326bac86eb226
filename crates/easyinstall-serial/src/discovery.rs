//! Serial port discovery
//!
//! ESP32 boards show up as USB serial bridges. The bridge vendor hints at the
//! board family but does not determine the flashing parameters; it is only
//! reported to the operator.

use std::fmt;

use serialport::SerialPortType;

use crate::error::DiscoveryError;

/// USB bridge vendor recognised on a port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VendorSignature {
    /// Espressif native USB (303A)
    Espressif,
    /// Silicon Labs CP210x (10C4)
    SiliconLabs,
    /// WCH CH340/CH9102 (1A86)
    Wch,
    /// STMicroelectronics (0483)
    StMicro,
    /// The port was given explicitly, nothing was probed
    Skipped,
}

impl VendorSignature {
    /// Vendors in the order they are searched for
    pub const SEARCH_ORDER: [VendorSignature; 4] = [
        VendorSignature::Espressif,
        VendorSignature::SiliconLabs,
        VendorSignature::Wch,
        VendorSignature::StMicro,
    ];

    /// USB vendor ID as it appears in a hardware ID string
    pub fn vendor_id(&self) -> Option<&'static str> {
        match self {
            Self::Espressif => Some("303A"),
            Self::SiliconLabs => Some("10C4"),
            Self::Wch => Some("1A86"),
            Self::StMicro => Some("0483"),
            Self::Skipped => None,
        }
    }

    /// What the operator is probably holding
    pub fn hint(&self) -> &'static str {
        match self {
            Self::Espressif => {
                "You are most likely using a Flipper Zero WiFi Devboard or an ESP32-S2"
            }
            Self::SiliconLabs => {
                "You are most likely using an ESP32-WROOM, an ESP32-S2-WROVER, or an ESP32-S3-WROOM"
            }
            Self::Wch => {
                "You are most likely using a knock-off ESP32 chip! Success is not guaranteed!"
            }
            Self::StMicro => "You are most likely using an DrB0rk S3 Multiboard",
            Self::Skipped => "Unknown device",
        }
    }

    /// Vendor whose ID occurs in `hwid`, in search order
    pub fn recognise(hwid: &str) -> Option<Self> {
        Self::SEARCH_ORDER
            .into_iter()
            .find(|sig| sig.vendor_id().is_some_and(|vid| hwid.contains(vid)))
    }
}

/// An enumerated serial port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortEntry {
    /// OS device name (`/dev/ttyUSB0`, `COM3`)
    pub name: String,
    /// Hardware ID, `USB VID:PID=XXXX:YYYY SER=...` for USB ports, `n/a`
    /// otherwise
    pub hwid: String,
}

impl PortEntry {
    /// Port with the given name and hardware ID
    pub fn new(name: impl Into<String>, hwid: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hwid: hwid.into(),
        }
    }
}

/// Source of serial port listings
pub trait PortLister {
    /// Currently present ports, in enumeration order
    fn list(&self) -> Result<Vec<PortEntry>, DiscoveryError>;
}

/// [`PortLister`] backed by the operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemPorts;

impl PortLister for SystemPorts {
    fn list(&self) -> Result<Vec<PortEntry>, DiscoveryError> {
        let ports = serialport::available_ports()?;
        Ok(ports
            .into_iter()
            .map(|p| {
                let hwid = hardware_id(&p.port_type);
                PortEntry::new(p.port_name, hwid)
            })
            .collect())
    }
}

/// Render a port type the way pyserial formats `hwid`
pub fn hardware_id(port_type: &SerialPortType) -> String {
    match port_type {
        SerialPortType::UsbPort(info) => {
            let mut hwid = format!("USB VID:PID={:04X}:{:04X}", info.vid, info.pid);
            if let Some(serial) = &info.serial_number {
                hwid.push_str(&format!(" SER={}", serial));
            }
            hwid
        }
        _ => "n/a".to_string(),
    }
}

/// The port to flash through
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceHandle {
    /// Serial port name
    pub port: String,
    /// Recognised vendor
    pub signature: VendorSignature,
}

impl fmt::Display for DeviceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.signature {
            VendorSignature::Skipped => f.write_str(&self.port),
            sig => write!(f, "{} ({:?})", self.port, sig),
        }
    }
}

/// Find the port to flash through
///
/// A preconfigured port is used as is, without enumerating anything.
/// Otherwise vendors are tried in [`VendorSignature::SEARCH_ORDER`]; the first
/// vendor with a matching port wins, and among its ports the one enumerated
/// last is taken.
pub fn discover(
    preconfigured: Option<&str>,
    ports: &dyn PortLister,
) -> Result<DeviceHandle, DiscoveryError> {
    if let Some(port) = preconfigured.filter(|p| !p.is_empty()) {
        log::info!(
            "Will not check for serial port or possible chip type since it is specified as {}",
            port
        );
        return Ok(DeviceHandle {
            port: port.to_string(),
            signature: VendorSignature::Skipped,
        });
    }

    log::info!("Checking for serial port...");
    let entries = ports.list()?;
    for entry in &entries {
        log::debug!("{}: {}", entry.name, entry.hwid);
    }

    for signature in VendorSignature::SEARCH_ORDER {
        let Some(vid) = signature.vendor_id() else {
            continue;
        };
        if let Some(entry) = entries.iter().rev().find(|e| e.hwid.contains(vid)) {
            log::info!("Found {:?} bridge on {}", signature, entry.name);
            return Ok(DeviceHandle {
                port: entry.name.clone(),
                signature,
            });
        }
    }

    Err(DiscoveryError::NotFound)
}

/// Every port with its recognised vendor, if any
pub fn list_ports(
    ports: &dyn PortLister,
) -> Result<Vec<(PortEntry, Option<VendorSignature>)>, DiscoveryError> {
    Ok(ports
        .list()?
        .into_iter()
        .map(|entry| {
            let sig = VendorSignature::recognise(&entry.hwid);
            (entry, sig)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct FixedPorts {
        ports: Vec<PortEntry>,
        calls: Cell<u32>,
    }

    impl FixedPorts {
        fn new(ports: &[(&str, &str)]) -> Self {
            Self {
                ports: ports.iter().map(|(n, h)| PortEntry::new(*n, *h)).collect(),
                calls: Cell::new(0),
            }
        }
    }

    impl PortLister for FixedPorts {
        fn list(&self) -> Result<Vec<PortEntry>, DiscoveryError> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.ports.clone())
        }
    }

    #[test]
    fn test_preconfigured_port_skips_enumeration() {
        let ports = FixedPorts::new(&[("/dev/ttyACM0", "USB VID:PID=303A:1001 SER=1")]);
        let handle = discover(Some("/dev/ttyUSB7"), &ports).unwrap();

        assert_eq!(handle.port, "/dev/ttyUSB7");
        assert_eq!(handle.signature, VendorSignature::Skipped);
        assert_eq!(ports.calls.get(), 0);
    }

    #[test]
    fn test_empty_preconfigured_port_means_auto() {
        let ports = FixedPorts::new(&[("COM4", "USB VID:PID=10C4:EA60 SER=0001")]);
        let handle = discover(Some(""), &ports).unwrap();
        assert_eq!(handle.port, "COM4");
        assert_eq!(handle.signature, VendorSignature::SiliconLabs);
    }

    #[test]
    fn test_vendor_order_beats_enumeration_order() {
        let ports = FixedPorts::new(&[
            ("/dev/ttyUSB0", "USB VID:PID=1A86:7523"),
            ("/dev/ttyACM0", "USB VID:PID=303A:1001 SER=AA"),
        ]);
        let handle = discover(None, &ports).unwrap();
        assert_eq!(handle.port, "/dev/ttyACM0");
        assert_eq!(handle.signature, VendorSignature::Espressif);
    }

    #[test]
    fn test_last_port_of_vendor_wins() {
        let ports = FixedPorts::new(&[
            ("/dev/ttyUSB0", "USB VID:PID=10C4:EA60 SER=1"),
            ("/dev/ttyS0", "n/a"),
            ("/dev/ttyUSB1", "USB VID:PID=10C4:EA60 SER=2"),
        ]);
        let handle = discover(None, &ports).unwrap();
        assert_eq!(handle.port, "/dev/ttyUSB1");
    }

    #[test]
    fn test_no_known_vendor() {
        let ports = FixedPorts::new(&[("/dev/ttyS0", "n/a"), ("/dev/ttyUSB0", "USB VID:PID=0403:6001")]);
        assert!(matches!(discover(None, &ports), Err(DiscoveryError::NotFound)));
    }

    #[test]
    fn test_hints() {
        assert!(VendorSignature::StMicro.hint().contains("S3 Multiboard"));
        assert_eq!(VendorSignature::Skipped.hint(), "Unknown device");
    }

    #[test]
    fn test_list_ports_recognises_vendors() {
        let ports = FixedPorts::new(&[
            ("/dev/ttyS0", "n/a"),
            ("/dev/ttyACM1", "USB VID:PID=0483:5740"),
        ]);
        let listed = list_ports(&ports).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].1, None);
        assert_eq!(listed[1].1, Some(VendorSignature::StMicro));
    }
}
