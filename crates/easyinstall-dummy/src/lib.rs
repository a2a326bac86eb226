//! easyinstall-dummy - In-memory flasher for dry runs and testing
//!
//! [`DummyFlasher`] accepts the same argument lists as esptool, records every
//! invocation and keeps a tiny model of the target: whether it has been
//! erased and which images were written where. It can be told to fail a
//! number of times before succeeding, which is how retry behaviour is tested.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

use std::path::PathBuf;

use easyinstall_core::flasher::{Flasher, FlasherError};

/// Failure behaviour of the dummy flasher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    /// Every invocation succeeds
    #[default]
    Never,
    /// The first `n` invocations fail, the rest succeed
    FirstN(u32),
    /// Every invocation fails
    Always,
    /// The first `n` `write_flash` invocations fail, erases always succeed
    WritesFirstN(u32),
    /// Every `write_flash` invocation fails, erases always succeed
    WritesAlways,
}

/// Configuration for the dummy flasher
#[derive(Debug, Clone, Default)]
pub struct DummyConfig {
    /// When to fail
    pub failure: FailureMode,
    /// Log each argument list at info level (dry-run mode)
    pub echo: bool,
}

/// An image written by a `write_flash` invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenImage {
    /// Flash offset
    pub offset: u32,
    /// Source file
    pub path: PathBuf,
}

/// Recording flasher
#[derive(Debug, Default)]
pub struct DummyFlasher {
    config: DummyConfig,
    invocations: Vec<Vec<String>>,
    erased: bool,
    written: Vec<WrittenImage>,
}

impl DummyFlasher {
    /// Create a dummy flasher with the given configuration
    pub fn new(config: DummyConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Flasher that logs what it would run and always succeeds
    pub fn dry_run() -> Self {
        Self::new(DummyConfig {
            failure: FailureMode::Never,
            echo: true,
        })
    }

    /// Flasher that fails the first `n` invocations
    pub fn failing_first(n: u32) -> Self {
        Self::new(DummyConfig {
            failure: FailureMode::FirstN(n),
            echo: false,
        })
    }

    /// Flasher that never succeeds
    pub fn always_failing() -> Self {
        Self::new(DummyConfig {
            failure: FailureMode::Always,
            echo: false,
        })
    }

    /// Flasher that erases fine but fails the first `n` writes
    pub fn failing_writes(n: u32) -> Self {
        Self::new(DummyConfig {
            failure: FailureMode::WritesFirstN(n),
            echo: false,
        })
    }

    /// Flasher that erases fine but never writes
    pub fn never_writing() -> Self {
        Self::new(DummyConfig {
            failure: FailureMode::WritesAlways,
            echo: false,
        })
    }

    /// Every argument list received, including failed ones
    pub fn invocations(&self) -> &[Vec<String>] {
        &self.invocations
    }

    /// Number of invocations whose command was `command`
    pub fn count(&self, command: &str) -> usize {
        self.invocations
            .iter()
            .filter(|args| args.iter().any(|a| a == command))
            .count()
    }

    /// Whether a successful erase has happened
    pub fn is_erased(&self) -> bool {
        self.erased
    }

    /// Images written by successful `write_flash` invocations
    pub fn written(&self) -> &[WrittenImage] {
        &self.written
    }

    fn should_fail(&self, args: &[String]) -> bool {
        let attempt = self.invocations.len() as u32;
        let is_write = args.iter().any(|a| a == "write_flash");
        match self.config.failure {
            FailureMode::Never => false,
            FailureMode::FirstN(n) => attempt <= n,
            FailureMode::Always => true,
            FailureMode::WritesFirstN(n) => is_write && self.count("write_flash") as u32 <= n,
            FailureMode::WritesAlways => is_write,
        }
    }

    fn apply(&mut self, args: &[String]) -> Result<(), FlasherError> {
        if args.iter().any(|a| a == "erase_flash") {
            self.erased = true;
            self.written.clear();
            return Ok(());
        }

        let Some(pos) = args.iter().position(|a| a == "write_flash") else {
            return Err(FlasherError::Device(format!(
                "unsupported command: {}",
                args.join(" ")
            )));
        };

        let images = parse_images(&args[pos + 1..])?;
        self.written.extend(images);
        Ok(())
    }
}

/// Offset/path pairs following the `write_flash` options
fn parse_images(args: &[String]) -> Result<Vec<WrittenImage>, FlasherError> {
    let mut images = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg.starts_with("--") {
            // Every write_flash option used here takes a value
            iter.next();
            continue;
        }
        let offset = parse_offset(arg)
            .ok_or_else(|| FlasherError::Device(format!("bad offset: {}", arg)))?;
        let path = iter
            .next()
            .ok_or_else(|| FlasherError::Device(format!("no file for offset {}", arg)))?;
        images.push(WrittenImage {
            offset,
            path: PathBuf::from(path),
        });
    }
    Ok(images)
}

fn parse_offset(s: &str) -> Option<u32> {
    let hex = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))?;
    u32::from_str_radix(hex, 16).ok()
}

impl Flasher for DummyFlasher {
    fn run(&mut self, args: &[String]) -> Result<(), FlasherError> {
        self.invocations.push(args.to_vec());
        if self.config.echo {
            log::info!("dry run: esptool {}", args.join(" "));
        } else {
            log::debug!("dummy flasher: {}", args.join(" "));
        }

        if self.should_fail(args) {
            return Err(FlasherError::Device(format!(
                "simulated failure on invocation {}",
                self.invocations.len()
            )));
        }
        self.apply(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_erase_then_write() {
        let mut flasher = DummyFlasher::default();
        flasher
            .run(&args("-p COM3 -b 115200 erase_flash"))
            .unwrap();
        flasher
            .run(&args(
                "-p COM3 -b 115200 -c esp32 --before default_reset -a no_reset write_flash \
                 --flash_mode dio --flash_freq 80m --flash_size 4MB \
                 0x1000 boot.bin 0x8000 part.bin 0x10000 fw.bin",
            ))
            .unwrap();

        assert!(flasher.is_erased());
        assert_eq!(flasher.count("erase_flash"), 1);
        assert_eq!(flasher.count("write_flash"), 1);
        let offsets: Vec<u32> = flasher.written().iter().map(|i| i.offset).collect();
        assert_eq!(offsets, vec![0x1000, 0x8000, 0x10000]);
        assert_eq!(flasher.written()[2].path, PathBuf::from("fw.bin"));
    }

    #[test]
    fn test_failing_first_n() {
        let mut flasher = DummyFlasher::failing_first(2);
        let erase = args("-p COM3 -b 115200 erase_flash");
        assert!(flasher.run(&erase).is_err());
        assert!(flasher.run(&erase).is_err());
        assert!(flasher.run(&erase).is_ok());
        assert_eq!(flasher.invocations().len(), 3);
    }

    #[test]
    fn test_always_failing() {
        let mut flasher = DummyFlasher::always_failing();
        for _ in 0..5 {
            assert!(flasher.run(&args("-p COM3 -b 115200 erase_flash")).is_err());
        }
        assert!(!flasher.is_erased());
    }

    #[test]
    fn test_failing_writes_only() {
        let mut flasher = DummyFlasher::failing_writes(1);
        let write = args("-p COM3 write_flash --flash_size 4MB 0x1000 fw.bin");
        assert!(flasher.run(&args("-p COM3 -b 115200 erase_flash")).is_ok());
        assert!(flasher.run(&write).is_err());
        assert!(flasher.run(&write).is_ok());
        assert_eq!(flasher.written().len(), 1);
    }

    #[test]
    fn test_never_writing_still_erases() {
        let mut flasher = DummyFlasher::never_writing();
        assert!(flasher.run(&args("-p COM3 -b 115200 erase_flash")).is_ok());
        assert!(flasher.is_erased());
        for _ in 0..3 {
            assert!(flasher
                .run(&args("-p COM3 write_flash 0x1000 fw.bin"))
                .is_err());
        }
        assert!(flasher.written().is_empty());
    }

    #[test]
    fn test_unknown_command_rejected() {
        let mut flasher = DummyFlasher::default();
        let err = flasher.run(&args("-p COM3 chip_id")).unwrap_err();
        assert!(matches!(err, FlasherError::Device(_)));
    }

    #[test]
    fn test_bad_offset_rejected() {
        let mut flasher = DummyFlasher::default();
        let err = flasher
            .run(&args("-p COM3 write_flash --flash_size 4MB 4096 fw.bin"))
            .unwrap_err();
        assert!(matches!(err, FlasherError::Device(_)));
    }
}
