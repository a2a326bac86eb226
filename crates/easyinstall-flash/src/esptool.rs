//! Flasher that runs esptool as a subprocess

use std::process::Command;

use easyinstall_core::flasher::{Flasher, FlasherError};

/// Program run when no other is configured
pub const DEFAULT_PROGRAM: &str = "esptool.py";

/// Runs esptool with the inherited terminal so its progress output is visible
#[derive(Debug, Clone)]
pub struct Esptool {
    program: String,
}

impl Default for Esptool {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl Esptool {
    /// Use `program` (a path or a name looked up in `PATH`)
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Program that is run
    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Flasher for Esptool {
    fn run(&mut self, args: &[String]) -> Result<(), FlasherError> {
        log::debug!("{} {}", self.program, args.join(" "));
        let status = Command::new(&self.program)
            .args(args)
            .status()
            .map_err(|e| FlasherError::Spawn {
                program: self.program.clone(),
                source: e,
            })?;

        if !status.success() {
            return Err(FlasherError::Failed {
                program: self.program.clone(),
                status: status.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program() {
        let mut esptool = Esptool::new("easyinstall-no-such-esptool");
        assert_eq!(esptool.program(), "easyinstall-no-such-esptool");
        let err = esptool.run(&["version".to_string()]).unwrap_err();
        assert!(matches!(err, FlasherError::Spawn { .. }));
    }

    #[test]
    fn test_default_program() {
        assert_eq!(Esptool::default().program(), DEFAULT_PROGRAM);
    }
}
