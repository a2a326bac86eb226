//! On-disk layout of the firmware cache and where each file comes from
//!
//! All directories live below one root (the working directory by default):
//!
//! ```text
//! <root>/Extra_ESP32_Bins/            mirrored binaries repository
//! <root>/ESP32Marauder/releases/      latest Marauder release assets
//! <root>/EvilPortal/EvilPortalWROOM.bin
//! <root>/EvilPortal/EvilPortalS2.bin
//! ```

use std::path::{Path, PathBuf};

use easyinstall_core::prereqs::FirmwareSlot;

/// Mirrored binaries repository
pub const EXTRA_BINS_REPO: &str = "https://github.com/UberGuidoZ/Marauder_BINs.git";
/// Checkout directory of [`EXTRA_BINS_REPO`]
pub const EXTRA_BINS_DIR: &str = "Extra_ESP32_Bins";

/// Latest Marauder release metadata
pub const MARAUDER_LATEST_RELEASE: &str =
    "https://api.github.com/repos/justcallmekoko/ESP32Marauder/releases/latest";
/// Top-level Marauder directory
pub const MARAUDER_DIR: &str = "ESP32Marauder";
/// Release subdirectory of [`MARAUDER_DIR`]
pub const MARAUDER_RELEASES_SUBDIR: &str = "releases";

/// Evil Portal directory
pub const EVIL_PORTAL_DIR: &str = "EvilPortal";
/// Evil Portal WROOM image
pub const EVIL_PORTAL_WROOM_URL: &str = "https://github.com/bigbrodude6119/flipper-zero-evil-portal/raw/main/Single%20File%20Bins/Evil%20Portal%20WROOM.bin";
/// Evil Portal S2 / WiFi devboard image
pub const EVIL_PORTAL_S2_URL: &str = "https://github.com/bigbrodude6119/flipper-zero-evil-portal/raw/main/Single%20File%20Bins/Evil%20Portal%20WiFi%20Board%20or%20S2.bin";
/// Local name of the WROOM image
pub const EVIL_PORTAL_WROOM_FILE: &str = "EvilPortalWROOM.bin";
/// Local name of the S2 image
pub const EVIL_PORTAL_S2_FILE: &str = "EvilPortalS2.bin";

/// How the local file for a slot is found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotLookup {
    /// Newest file matching a glob pattern, relative to the root
    Pattern(&'static str),
    /// Fixed path relative to the root
    Fixed(&'static str),
}

impl SlotLookup {
    /// Lookup rule for a slot
    pub fn for_slot(slot: FirmwareSlot) -> Self {
        match slot {
            FirmwareSlot::MarauderFlipper => {
                Self::Pattern("ESP32Marauder/releases/esp32_marauder_v*_flipper.bin")
            }
            FirmwareSlot::MarauderMultiboardS3 => {
                Self::Pattern("ESP32Marauder/releases/esp32_marauder_v*ultiboardS3.bin")
            }
            FirmwareSlot::MarauderOldHardware => {
                Self::Pattern("ESP32Marauder/releases/esp32_marauder_v*_old_hardware.bin")
            }
            FirmwareSlot::MarauderMini => {
                Self::Pattern("ESP32Marauder/releases/esp32_marauder_v*_mini.bin")
            }
            FirmwareSlot::MarauderV6 => {
                Self::Pattern("ESP32Marauder/releases/esp32_marauder_v*_v6.bin")
            }
            FirmwareSlot::EvilPortalWroom => Self::Fixed("EvilPortal/EvilPortalWROOM.bin"),
            FirmwareSlot::EvilPortalS2 => Self::Fixed("EvilPortal/EvilPortalS2.bin"),
        }
    }

    /// The pattern or path, for messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pattern(p) | Self::Fixed(p) => *p,
        }
    }
}

/// Directory layout below a root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmwareLayout {
    root: PathBuf,
}

impl FirmwareLayout {
    /// Layout rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory (also the root of the bundled images)
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Checkout of the mirrored binaries repository
    pub fn extra_bins_dir(&self) -> PathBuf {
        self.root.join(EXTRA_BINS_DIR)
    }

    /// `ESP32Marauder`
    pub fn marauder_dir(&self) -> PathBuf {
        self.root.join(MARAUDER_DIR)
    }

    /// `ESP32Marauder/releases`
    pub fn marauder_releases_dir(&self) -> PathBuf {
        self.marauder_dir().join(MARAUDER_RELEASES_SUBDIR)
    }

    /// `EvilPortal`
    pub fn evil_portal_dir(&self) -> PathBuf {
        self.root.join(EVIL_PORTAL_DIR)
    }
}
