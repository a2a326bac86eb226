//! CLI command implementations
//!
//! Informational commands that print and exit without starting a session.

mod list;

pub use list::{list_boards, list_ports};
