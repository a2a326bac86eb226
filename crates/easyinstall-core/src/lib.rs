//! easyinstall-core - Core types for flashing prebuilt ESP32 firmware
//!
//! This crate holds everything that does not touch the outside world:
//!
//! - the static board catalog ([`board::BoardChoice`]) and the menu built
//!   from it ([`menu::MenuAction`])
//! - the resolved firmware paths handed to the orchestrator
//!   ([`prereqs::ResolvedPrerequisites`])
//! - the argument lists passed to the flasher ([`params`])
//! - the [`flasher::Flasher`] capability trait
//! - the bounded retry combinator ([`retry::retry`])
//!
//! # Example
//!
//! ```ignore
//! use easyinstall_core::menu::MenuAction;
//!
//! match MenuAction::try_from(4)? {
//!     MenuAction::Flash(board) => println!("{} on {}", board.firmware(), board.board()),
//!     other => println!("{:?}", other),
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod board;
pub mod error;
pub mod flasher;
pub mod menu;
pub mod params;
pub mod prereqs;
pub mod retry;

pub use error::{CoreError, Result};
