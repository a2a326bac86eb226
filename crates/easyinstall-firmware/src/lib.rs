//! easyinstall-firmware - Firmware cache, downloads and updates
//!
//! Firmware comes from three places, all stored below one root directory
//! ([`layout::FirmwareLayout`]):
//!
//! - a mirrored git repository of extra binaries ([`cache::FirmwareCache`])
//! - the latest Marauder GitHub release ([`release::ReleaseFetcher`])
//! - two fixed Evil Portal images
//!
//! [`prereq::Prerequisites`] runs the startup check and resolves one file per
//! firmware slot. [`update::UpdateCoordinator`] deletes everything that was
//! downloaded, refreshes the mirror and runs the check again.
//!
//! Git and HTTP are reached through [`sync::RepoSync`] and
//! [`fetch::AssetFetch`] so that tests can substitute them.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod cache;
pub mod error;
pub mod fetch;
pub mod layout;
pub mod prereq;
pub mod release;
pub mod sync;
pub mod update;

pub use error::{FetchError, FirmwareError, Result, SyncError};
pub use fetch::{AssetFetch, HttpFetcher};
pub use layout::FirmwareLayout;
pub use prereq::{resolve_local, Prerequisites};
pub use sync::{GitCli, RepoSync};
pub use update::UpdateCoordinator;
