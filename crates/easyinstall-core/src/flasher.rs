//! The flasher capability
//!
//! The ESP32 serial bootloader protocol is not implemented here. A [`Flasher`]
//! receives the flat argument list built by [`crate::params`] and does the
//! work, usually by running esptool.

use std::io;

use thiserror::Error;

/// Failure reported by a flasher
#[derive(Debug, Error)]
pub enum FlasherError {
    /// The flasher program could not be started
    #[error("failed to run {program}: {source}")]
    Spawn {
        /// Program name
        program: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The flasher ran but reported failure
    #[error("{program} exited with {status}")]
    Failed {
        /// Program name
        program: String,
        /// Exit status as reported by the OS
        status: String,
    },

    /// Device-level failure reported by an in-process flasher
    #[error("device error: {0}")]
    Device(String),
}

/// Something that can erase and write an ESP32 given esptool-style arguments
pub trait Flasher {
    /// Run one flasher invocation to completion
    fn run(&mut self, args: &[String]) -> Result<(), FlasherError>;
}

impl<F: Flasher + ?Sized> Flasher for &mut F {
    fn run(&mut self, args: &[String]) -> Result<(), FlasherError> {
        (**self).run(args)
    }
}

impl<F: Flasher + ?Sized> Flasher for Box<F> {
    fn run(&mut self, args: &[String]) -> Result<(), FlasherError> {
        (**self).run(args)
    }
}
