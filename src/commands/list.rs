//! List commands implementation

use easyinstall_core::board::BoardChoice;
use easyinstall_serial::{DiscoveryError, PortLister, VendorSignature};

/// List all flashable boards
pub fn list_boards() {
    print!("{}", boards_table());
}

fn boards_table() -> String {
    let mut out = String::from("Flashable boards:\n\n");
    out.push_str(&format!(
        "{:>3}  {:<14} {:<40} {:<8} {:>5}\n",
        "#", "Firmware", "Board", "Chip", "Size"
    ));
    out.push_str(&format!("{}\n", "-".repeat(74)));

    for choice in BoardChoice::ALL {
        let spec = choice.spec();
        out.push_str(&format!(
            "{:>3}  {:<14} {:<40} {:<8} {:>5}\n",
            choice.number(),
            spec.firmware,
            spec.board,
            spec.chip,
            spec.flash_size.as_str()
        ));
    }
    out
}

/// List serial ports and the vendor recognised on each
pub fn list_ports(ports: &dyn PortLister) -> Result<(), DiscoveryError> {
    let entries = easyinstall_serial::list_ports(ports)?;
    if entries.is_empty() {
        println!("No serial ports found");
        return Ok(());
    }

    println!("{:<20} {:<36} Vendor", "Port", "Hardware ID");
    println!("{}", "-".repeat(74));
    for (entry, signature) in entries {
        println!(
            "{:<20} {:<36} {}",
            entry.name,
            entry.hwid,
            vendor_name(signature)
        );
    }
    Ok(())
}

fn vendor_name(signature: Option<VendorSignature>) -> &'static str {
    match signature {
        Some(VendorSignature::Espressif) => "Espressif",
        Some(VendorSignature::SiliconLabs) => "Silicon Labs",
        Some(VendorSignature::Wch) => "WCH",
        Some(VendorSignature::StMicro) => "STMicroelectronics",
        Some(VendorSignature::Skipped) | None => "-",
    }
}
