//! easyinstall-flash - Erase-then-write orchestration
//!
//! The binary only talks to this crate and `easyinstall-core`:
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │                 easyinstall (bin)             │
//! │  CLI, terminal operator, logging, exit codes  │
//! └───────────────────────────────────────────────┘
//!                         │
//!                         ▼
//! ┌───────────────────────────────────────────────┐
//! │           easyinstall-flash (this crate)      │
//! │  Orchestrator: menu -> discover -> erase ->   │
//! │  write, with retry; flasher registry          │
//! └───────────────────────────────────────────────┘
//!          │                │                │
//!          ▼                ▼                ▼
//!   easyinstall-core  easyinstall-serial  easyinstall-firmware
//!   catalog, params,  port discovery      cache, releases,
//!   Flasher trait                         updates
//! ```
//!
//! # Example
//!
//! ```ignore
//! use easyinstall_flash::{open_flasher, Orchestrator};
//!
//! let mut flasher = open_flasher("esptool", "esptool.py")?;
//! let outcome = Orchestrator::new(&mut *flasher, &ports, &mut operator, &mut updater, prereqs, ".")
//!     .with_preselect(Some(1))
//!     .run()?;
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod error;
pub mod esptool;
pub mod operator;
pub mod orchestrator;
mod registry;
pub mod session;

pub use error::FlashError;
pub use esptool::Esptool;
pub use operator::Operator;
pub use orchestrator::{Orchestrator, Outcome, Refresh, PRESELECT_WINDOW};
pub use registry::{available_flashers, open_flasher, FlasherInfo};
pub use session::FlashSession;
