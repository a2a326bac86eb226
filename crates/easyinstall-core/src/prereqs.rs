//! Firmware paths resolved by the prerequisite check
//!
//! The prerequisite pass (see `easyinstall-firmware`) downloads what is
//! missing and then looks up one binary per [`FirmwareSlot`]. The result is a
//! plain value that is handed to the orchestrator and replaced wholesale after
//! an update.

use std::fmt;
use std::path::{Path, PathBuf};

/// A release firmware binary that some board profiles write at 0x10000
/// (or 0x1000 for the single-file Evil Portal images)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FirmwareSlot {
    /// Marauder build for the Flipper WiFi devboard / ESP32-S2
    MarauderFlipper,
    /// Marauder build for the DrB0rk S3 multiboard
    MarauderMultiboardS3,
    /// Marauder build for original ESP32-WROOM hardware
    MarauderOldHardware,
    /// Marauder build for the Marauder Mini
    MarauderMini,
    /// Marauder build for v6 hardware
    MarauderV6,
    /// Evil Portal single-file image for ESP32-WROOM
    EvilPortalWroom,
    /// Evil Portal single-file image for ESP32-S2 / WiFi devboard
    EvilPortalS2,
}

impl FirmwareSlot {
    /// All slots, in prerequisite-check order
    pub const ALL: [FirmwareSlot; 7] = [
        FirmwareSlot::MarauderFlipper,
        FirmwareSlot::MarauderMultiboardS3,
        FirmwareSlot::MarauderOldHardware,
        FirmwareSlot::MarauderMini,
        FirmwareSlot::MarauderV6,
        FirmwareSlot::EvilPortalWroom,
        FirmwareSlot::EvilPortalS2,
    ];

    /// Human readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::MarauderFlipper => "Marauder (Flipper/ESP32-S2)",
            Self::MarauderMultiboardS3 => "Marauder (Multiboard S3)",
            Self::MarauderOldHardware => "Marauder (old hardware)",
            Self::MarauderMini => "Marauder (Mini)",
            Self::MarauderV6 => "Marauder (v6)",
            Self::EvilPortalWroom => "Evil Portal (WROOM)",
            Self::EvilPortalS2 => "Evil Portal (S2)",
        }
    }
}

impl fmt::Display for FirmwareSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Firmware paths found by the last prerequisite check
///
/// A `None` slot means nothing matched locally. That is not an error until a
/// board that needs the slot is selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedPrerequisites {
    marauder_flipper: Option<PathBuf>,
    marauder_multiboard_s3: Option<PathBuf>,
    marauder_old_hardware: Option<PathBuf>,
    marauder_mini: Option<PathBuf>,
    marauder_v6: Option<PathBuf>,
    evil_portal_wroom: Option<PathBuf>,
    evil_portal_s2: Option<PathBuf>,
}

impl ResolvedPrerequisites {
    /// Create an empty set (no slot resolved)
    pub fn new() -> Self {
        Self::default()
    }

    fn slot_mut(&mut self, slot: FirmwareSlot) -> &mut Option<PathBuf> {
        match slot {
            FirmwareSlot::MarauderFlipper => &mut self.marauder_flipper,
            FirmwareSlot::MarauderMultiboardS3 => &mut self.marauder_multiboard_s3,
            FirmwareSlot::MarauderOldHardware => &mut self.marauder_old_hardware,
            FirmwareSlot::MarauderMini => &mut self.marauder_mini,
            FirmwareSlot::MarauderV6 => &mut self.marauder_v6,
            FirmwareSlot::EvilPortalWroom => &mut self.evil_portal_wroom,
            FirmwareSlot::EvilPortalS2 => &mut self.evil_portal_s2,
        }
    }

    /// Path resolved for a slot, if any
    pub fn get(&self, slot: FirmwareSlot) -> Option<&Path> {
        let path = match slot {
            FirmwareSlot::MarauderFlipper => &self.marauder_flipper,
            FirmwareSlot::MarauderMultiboardS3 => &self.marauder_multiboard_s3,
            FirmwareSlot::MarauderOldHardware => &self.marauder_old_hardware,
            FirmwareSlot::MarauderMini => &self.marauder_mini,
            FirmwareSlot::MarauderV6 => &self.marauder_v6,
            FirmwareSlot::EvilPortalWroom => &self.evil_portal_wroom,
            FirmwareSlot::EvilPortalS2 => &self.evil_portal_s2,
        };
        path.as_deref()
    }

    /// Record the lookup result for a slot
    pub fn set(&mut self, slot: FirmwareSlot, path: Option<PathBuf>) {
        *self.slot_mut(slot) = path;
    }

    /// Builder-style variant of [`set`](Self::set)
    pub fn with(mut self, slot: FirmwareSlot, path: impl Into<PathBuf>) -> Self {
        self.set(slot, Some(path.into()));
        self
    }

    /// Slots for which nothing was found
    pub fn missing(&self) -> impl Iterator<Item = FirmwareSlot> + '_ {
        FirmwareSlot::ALL
            .into_iter()
            .filter(|slot| self.get(*slot).is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_prerequisites_miss_everything() {
        let prereqs = ResolvedPrerequisites::new();
        assert_eq!(prereqs.missing().count(), FirmwareSlot::ALL.len());
        assert!(prereqs.get(FirmwareSlot::MarauderMini).is_none());
    }

    #[test]
    fn test_set_and_get_slot() {
        let mut prereqs = ResolvedPrerequisites::new()
            .with(FirmwareSlot::MarauderV6, "ESP32Marauder/releases/esp32_marauder_v1_v6.bin");

        assert_eq!(
            prereqs.get(FirmwareSlot::MarauderV6),
            Some(Path::new("ESP32Marauder/releases/esp32_marauder_v1_v6.bin"))
        );
        assert!(!prereqs.missing().any(|s| s == FirmwareSlot::MarauderV6));

        prereqs.set(FirmwareSlot::MarauderV6, None);
        assert!(prereqs.get(FirmwareSlot::MarauderV6).is_none());
    }
}
