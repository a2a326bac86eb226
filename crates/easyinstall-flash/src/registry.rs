//! Flasher registry
//!
//! Opens a flasher by name. Which names exist depends on the enabled
//! features.

use easyinstall_core::flasher::Flasher;

use crate::error::FlashError;
use crate::esptool::Esptool;

/// Information about a flasher
pub struct FlasherInfo {
    /// Name used to open it
    pub name: &'static str,
    /// Short description
    pub description: &'static str,
}

/// Flashers compiled into this build
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_flashers() -> Vec<FlasherInfo> {
    let mut flashers = Vec::new();

    flashers.push(FlasherInfo {
        name: "esptool",
        description: "Run esptool as a subprocess",
    });

    #[cfg(feature = "dummy")]
    flashers.push(FlasherInfo {
        name: "dummy",
        description: "Log the esptool arguments without touching hardware",
    });

    flashers
}

/// Open a flasher by name
///
/// `esptool_program` is only used by the `esptool` flasher.
pub fn open_flasher(name: &str, esptool_program: &str) -> Result<Box<dyn Flasher>, FlashError> {
    match name {
        "esptool" => Ok(Box::new(Esptool::new(esptool_program))),

        #[cfg(feature = "dummy")]
        "dummy" => Ok(Box::new(easyinstall_dummy::DummyFlasher::dry_run())),

        _ => {
            let names: Vec<&str> = available_flashers().iter().map(|f| f.name).collect();
            log::error!("Available flashers: {}", names.join(", "));
            Err(FlashError::UnknownFlasher(name.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_esptool_always_available() {
        assert!(available_flashers().iter().any(|f| f.name == "esptool"));
        assert!(open_flasher("esptool", "esptool.py").is_ok());
    }

    #[test]
    fn test_unknown_flasher() {
        assert!(matches!(
            open_flasher("openocd", "esptool.py"),
            Err(FlashError::UnknownFlasher(name)) if name == "openocd"
        ));
    }
}
