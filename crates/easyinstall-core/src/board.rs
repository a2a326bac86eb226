//! Board catalog
//!
//! Every flashable menu entry is a [`BoardChoice`]. Each choice maps to a
//! static [`BoardSpec`] describing the chip, flash size and the images to
//! write. Images either ship with the tool (bundled, relative to the asset
//! root) or come from a release download ([`FirmwareSlot`]); the latter are
//! looked up in [`ResolvedPrerequisites`] only when a profile is built, so a
//! profile always reflects the most recent prerequisite check.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};
use crate::prereqs::{FirmwareSlot, ResolvedPrerequisites};

/// Flash size class passed to `--flash_size`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashSize {
    /// 4 MiB
    Mb4,
    /// 8 MiB
    Mb8,
}

impl FlashSize {
    /// Value understood by esptool
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mb4 => "4MB",
            Self::Mb8 => "8MB",
        }
    }
}

impl fmt::Display for FlashSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an image comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    /// Shipped with the tool, relative to the asset root
    Bundled(&'static str),
    /// Downloaded release binary
    Release(FirmwareSlot),
}

/// One image of a board specification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSpec {
    /// Flash offset
    pub offset: u32,
    /// Image source
    pub source: ImageSource,
}

impl ImageSpec {
    const fn bundled(offset: u32, path: &'static str) -> Self {
        Self {
            offset,
            source: ImageSource::Bundled(path),
        }
    }

    const fn release(offset: u32, slot: FirmwareSlot) -> Self {
        Self {
            offset,
            source: ImageSource::Release(slot),
        }
    }
}

/// Static description of a firmware/board combination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardSpec {
    /// Text shown in the menu
    pub menu_label: &'static str,
    /// Firmware name
    pub firmware: &'static str,
    /// Board display name
    pub board: &'static str,
    /// Chip identifier passed to the flasher (`-c`)
    pub chip: &'static str,
    /// Flash size class
    pub flash_size: FlashSize,
    /// Images in ascending offset order
    pub images: &'static [ImageSpec],
}

// Image layouts shared between boards

const S2_MARAUDER: &[ImageSpec] = &[
    ImageSpec::bundled(0x1000, "Marauder/bootloader.bin"),
    ImageSpec::bundled(0x8000, "Marauder/partitions.bin"),
    ImageSpec::release(0x10000, FirmwareSlot::MarauderFlipper),
];

const S2_BLACKMAGIC: &[ImageSpec] = &[
    ImageSpec::bundled(0x1000, "Blackmagic/bootloader.bin"),
    ImageSpec::bundled(0x8000, "Blackmagic/partition-table.bin"),
    ImageSpec::bundled(0x10000, "Blackmagic/blackmagic.bin"),
];

const WROOM_OLD_HARDWARE: &[ImageSpec] = &[
    ImageSpec::bundled(0x1000, "bootloader.bin"),
    ImageSpec::bundled(0x8000, "partitions.bin"),
    ImageSpec::release(0x10000, FirmwareSlot::MarauderOldHardware),
];

const WROOM_MINI: &[ImageSpec] = &[
    ImageSpec::bundled(0x1000, "bootloader.bin"),
    ImageSpec::bundled(0x8000, "partitions.bin"),
    ImageSpec::release(0x10000, FirmwareSlot::MarauderMini),
];

const WROOM_V6: &[ImageSpec] = &[
    ImageSpec::bundled(0x1000, "bootloader.bin"),
    ImageSpec::bundled(0x8000, "partitions.bin"),
    ImageSpec::release(0x10000, FirmwareSlot::MarauderV6),
];

const S3_MULTIBOARD: &[ImageSpec] = &[
    ImageSpec::bundled(0x0, "S3/bootloader.bin"),
    ImageSpec::bundled(0x8000, "S3/partitions.bin"),
    ImageSpec::bundled(0xE000, "S3/boot_app0.bin"),
    ImageSpec::release(0x10000, FirmwareSlot::MarauderMultiboardS3),
];

// Single-file images
const EVIL_PORTAL_WROOM: &[ImageSpec] =
    &[ImageSpec::release(0x1000, FirmwareSlot::EvilPortalWroom)];
const EVIL_PORTAL_S2: &[ImageSpec] = &[ImageSpec::release(0x1000, FirmwareSlot::EvilPortalS2)];

static MARAUDER_DEVBOARD: BoardSpec = BoardSpec {
    menu_label: "Flash Marauder on WiFi Devboard or ESP32-S2",
    firmware: "Marauder",
    board: "ESP32-S2",
    chip: "esp32s2",
    flash_size: FlashSize::Mb4,
    images: S2_MARAUDER,
};

static BLACKMAGIC_SAVE_SETTINGS: BoardSpec = BoardSpec {
    menu_label: "Save Flipper Blackmagic WiFi settings",
    firmware: "Save Flipper Blackmagic WiFi settings",
    board: "ESP32-S2",
    chip: "esp32s2",
    flash_size: FlashSize::Mb4,
    images: S2_BLACKMAGIC,
};

static BLACKMAGIC: BoardSpec = BoardSpec {
    menu_label: "Flash Flipper Blackmagic",
    firmware: "Blackmagic",
    board: "ESP32-S2",
    chip: "esp32s2",
    flash_size: FlashSize::Mb4,
    images: S2_BLACKMAGIC,
};

static MARAUDER_WROOM: BoardSpec = BoardSpec {
    menu_label: "Flash Marauder on ESP32-WROOM",
    firmware: "Marauder",
    board: "ESP32-WROOM",
    chip: "esp32",
    flash_size: FlashSize::Mb4,
    images: WROOM_OLD_HARDWARE,
};

static MARAUDER_MINI: BoardSpec = BoardSpec {
    menu_label: "Flash Marauder on ESP32 Marauder Mini",
    firmware: "Marauder",
    board: "ESP32 Marauder Mini",
    chip: "esp32",
    flash_size: FlashSize::Mb4,
    images: WROOM_MINI,
};

static MARAUDER_V6_WROOM: BoardSpec = BoardSpec {
    menu_label: "Flash v6 Marauder on ESP32-WROOM (RabbitLabs Minion Marauder)",
    firmware: "Marauder v6",
    board: "ESP32-WROOM",
    chip: "esp32",
    flash_size: FlashSize::Mb4,
    images: WROOM_V6,
};

static MARAUDER_S3: BoardSpec = BoardSpec {
    menu_label: "Flash Marauder on ESP32-S3 (There is no current S3 bin)",
    firmware: "Marauder",
    board: "ESP32-S3",
    chip: "esp32s3",
    flash_size: FlashSize::Mb8,
    images: S3_MULTIBOARD,
};

static AWOK_V1_TO_3: BoardSpec = BoardSpec {
    menu_label: "Flash Marauder on AWOK v1-3 or Duoboard",
    firmware: "Marauder",
    board: "AWOK v1-3 or Duoboard",
    chip: "esp32",
    flash_size: FlashSize::Mb4,
    images: WROOM_OLD_HARDWARE,
};

static AWOK_V4_CHUNGUS: BoardSpec = BoardSpec {
    menu_label: "Flash Marauder on AWOK v4 Chungus Board",
    firmware: "Marauder",
    board: "AWOK v4 Chungus Board",
    chip: "esp32s2",
    flash_size: FlashSize::Mb4,
    images: S2_MARAUDER,
};

static AWOK_V5: BoardSpec = BoardSpec {
    menu_label: "Flash Marauder on AWOK v5 ESP32",
    firmware: "Marauder",
    board: "AWOK v5 ESP32",
    chip: "esp32s2",
    flash_size: FlashSize::Mb4,
    images: S2_MARAUDER,
};

static AWOK_DUAL_ORANGE: BoardSpec = BoardSpec {
    menu_label: "Flash Marauder on AWOK Dual ESP32 (Orange Port)",
    firmware: "Marauder",
    board: "AWOK Dual ESP32 (Orange Port)",
    chip: "esp32s2",
    flash_size: FlashSize::Mb4,
    images: S2_MARAUDER,
};

static AWOK_DUAL_TOUCH: BoardSpec = BoardSpec {
    menu_label: "Flash Marauder on AWOK Dual ESP32 Touch Screen (White Port)",
    firmware: "Marauder",
    board: "AWOK Dual ESP32 Touch Screen (White Port)",
    chip: "esp32",
    flash_size: FlashSize::Mb4,
    images: WROOM_V6,
};

static AWOK_DUAL_MINI: BoardSpec = BoardSpec {
    menu_label: "Flash Marauder on AWOK Dual ESP32 Mini (White Port)",
    firmware: "Marauder Mini",
    board: "AWOK Dual ESP32 Mini (White Port)",
    chip: "esp32",
    flash_size: FlashSize::Mb4,
    images: WROOM_MINI,
};

static EVIL_PORTAL_WROOM_SPEC: BoardSpec = BoardSpec {
    menu_label: "Flash Evil Portal on ESP32-WROOM",
    firmware: "Evil Portal",
    board: "ESP32-WROOM",
    chip: "esp32",
    flash_size: FlashSize::Mb4,
    images: EVIL_PORTAL_WROOM,
};

static EVIL_PORTAL_S2_SPEC: BoardSpec = BoardSpec {
    menu_label: "Flash Evil Portal on ESP32-S2 or WiFi Devboard",
    firmware: "Evil Portal",
    board: "ESP32-S2",
    chip: "esp32s2",
    flash_size: FlashSize::Mb4,
    images: EVIL_PORTAL_S2,
};

/// A flashable menu entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardChoice {
    /// 1: Marauder on the Flipper WiFi devboard or ESP32-S2
    MarauderDevboard,
    /// 2: Blackmagic, keeping the Flipper WiFi settings
    BlackmagicSaveSettings,
    /// 3: Blackmagic on the Flipper WiFi devboard
    Blackmagic,
    /// 4: Marauder on ESP32-WROOM
    MarauderWroom,
    /// 5: Marauder on the Marauder Mini
    MarauderMini,
    /// 6: Marauder v6 on ESP32-WROOM (RabbitLabs Minion)
    MarauderV6Wroom,
    /// 7: Marauder on ESP32-S3
    MarauderS3,
    /// 8: Marauder on AWOK v1-3 or Duoboard
    AwokV1To3,
    /// 9: Marauder on AWOK v4 Chungus
    AwokV4Chungus,
    /// 10: Marauder on AWOK v5
    AwokV5,
    /// 11: Marauder on AWOK Dual, orange port
    AwokDualOrange,
    /// 12: Marauder on AWOK Dual Touch Screen, white port
    AwokDualTouch,
    /// 13: Marauder Mini on AWOK Dual Mini, white port
    AwokDualMini,
    /// 14: Evil Portal on ESP32-WROOM
    EvilPortalWroom,
    /// 15: Evil Portal on ESP32-S2 or WiFi devboard
    EvilPortalS2,
}

impl BoardChoice {
    /// All flashable choices in menu order
    pub const ALL: [BoardChoice; 15] = [
        BoardChoice::MarauderDevboard,
        BoardChoice::BlackmagicSaveSettings,
        BoardChoice::Blackmagic,
        BoardChoice::MarauderWroom,
        BoardChoice::MarauderMini,
        BoardChoice::MarauderV6Wroom,
        BoardChoice::MarauderS3,
        BoardChoice::AwokV1To3,
        BoardChoice::AwokV4Chungus,
        BoardChoice::AwokV5,
        BoardChoice::AwokDualOrange,
        BoardChoice::AwokDualTouch,
        BoardChoice::AwokDualMini,
        BoardChoice::EvilPortalWroom,
        BoardChoice::EvilPortalS2,
    ];

    /// Menu number (1-based)
    pub fn number(&self) -> u32 {
        match self {
            Self::MarauderDevboard => 1,
            Self::BlackmagicSaveSettings => 2,
            Self::Blackmagic => 3,
            Self::MarauderWroom => 4,
            Self::MarauderMini => 5,
            Self::MarauderV6Wroom => 6,
            Self::MarauderS3 => 7,
            Self::AwokV1To3 => 8,
            Self::AwokV4Chungus => 9,
            Self::AwokV5 => 10,
            Self::AwokDualOrange => 11,
            Self::AwokDualTouch => 12,
            Self::AwokDualMini => 13,
            Self::EvilPortalWroom => 14,
            Self::EvilPortalS2 => 15,
        }
    }

    /// Look up a choice by menu number
    pub fn from_number(number: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.number() == number)
    }

    /// Static specification for this choice
    pub fn spec(&self) -> &'static BoardSpec {
        match self {
            Self::MarauderDevboard => &MARAUDER_DEVBOARD,
            Self::BlackmagicSaveSettings => &BLACKMAGIC_SAVE_SETTINGS,
            Self::Blackmagic => &BLACKMAGIC,
            Self::MarauderWroom => &MARAUDER_WROOM,
            Self::MarauderMini => &MARAUDER_MINI,
            Self::MarauderV6Wroom => &MARAUDER_V6_WROOM,
            Self::MarauderS3 => &MARAUDER_S3,
            Self::AwokV1To3 => &AWOK_V1_TO_3,
            Self::AwokV4Chungus => &AWOK_V4_CHUNGUS,
            Self::AwokV5 => &AWOK_V5,
            Self::AwokDualOrange => &AWOK_DUAL_ORANGE,
            Self::AwokDualTouch => &AWOK_DUAL_TOUCH,
            Self::AwokDualMini => &AWOK_DUAL_MINI,
            Self::EvilPortalWroom => &EVIL_PORTAL_WROOM_SPEC,
            Self::EvilPortalS2 => &EVIL_PORTAL_S2_SPEC,
        }
    }

    /// Firmware name
    pub fn firmware(&self) -> &'static str {
        self.spec().firmware
    }

    /// Board display name
    pub fn board(&self) -> &'static str {
        self.spec().board
    }

    /// Build the board profile from the current prerequisites
    ///
    /// Bundled images are resolved against `asset_root`. Fails if a release
    /// slot needed by this board was not resolved.
    pub fn profile(
        &self,
        prereqs: &ResolvedPrerequisites,
        asset_root: &Path,
    ) -> Result<BoardProfile> {
        let spec = self.spec();
        let mut images = Vec::with_capacity(spec.images.len());

        for image in spec.images {
            let path = match image.source {
                ImageSource::Bundled(rel) => asset_root.join(rel),
                ImageSource::Release(slot) => prereqs
                    .get(slot)
                    .map(Path::to_path_buf)
                    .ok_or(CoreError::MissingFirmware(slot))?,
            };
            images.push(FlashImage {
                offset: image.offset,
                path,
            });
        }

        Ok(BoardProfile {
            firmware: spec.firmware,
            board: spec.board,
            chip: spec.chip,
            flash_size: spec.flash_size,
            images,
        })
    }
}

impl fmt::Display for BoardChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.firmware(), self.board())
    }
}

/// An image resolved to a concrete path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashImage {
    /// Flash offset
    pub offset: u32,
    /// Image file
    pub path: PathBuf,
}

/// Everything needed to write one firmware to one board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardProfile {
    /// Firmware name
    pub firmware: &'static str,
    /// Board display name
    pub board: &'static str,
    /// Chip identifier passed to the flasher
    pub chip: &'static str,
    /// Flash size class
    pub flash_size: FlashSize,
    /// Images in ascending offset order
    pub images: Vec<FlashImage>,
}

impl BoardProfile {
    /// Check offsets are strictly ascending
    pub fn check_offsets(&self) -> Result<()> {
        for pair in self.images.windows(2) {
            if pair[1].offset <= pair[0].offset {
                return Err(CoreError::UnsortedOffsets {
                    board: self.board,
                    offset: pair[1].offset,
                });
            }
        }
        Ok(())
    }

    /// Check offsets and that every image exists on disk
    pub fn validate(&self) -> Result<()> {
        self.check_offsets()?;
        for image in &self.images {
            if !image.path.is_file() {
                return Err(CoreError::MissingImage(image.path.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn all_resolved() -> ResolvedPrerequisites {
        FirmwareSlot::ALL
            .into_iter()
            .fold(ResolvedPrerequisites::new(), |p, slot| {
                p.with(slot, format!("releases/{:?}.bin", slot))
            })
    }

    #[test]
    fn test_menu_numbers_are_dense() {
        for (i, choice) in BoardChoice::ALL.iter().enumerate() {
            assert_eq!(choice.number(), i as u32 + 1);
            assert_eq!(BoardChoice::from_number(choice.number()), Some(*choice));
        }
        assert_eq!(BoardChoice::from_number(0), None);
        assert_eq!(BoardChoice::from_number(16), None);
    }

    #[test]
    fn test_every_profile_has_ascending_offsets() {
        let prereqs = all_resolved();
        for choice in BoardChoice::ALL {
            let profile = choice.profile(&prereqs, Path::new("/assets")).unwrap();
            assert!(!profile.images.is_empty(), "{:?} has no images", choice);
            assert!(
                profile.check_offsets().is_ok(),
                "{:?} offsets not ascending",
                choice
            );
        }
    }

    #[test]
    fn test_s3_profile_layout() {
        let prereqs = all_resolved();
        let profile = BoardChoice::MarauderS3
            .profile(&prereqs, Path::new("/assets"))
            .unwrap();

        assert_eq!(profile.chip, "esp32s3");
        assert_eq!(profile.flash_size, FlashSize::Mb8);
        let offsets: Vec<u32> = profile.images.iter().map(|i| i.offset).collect();
        assert_eq!(offsets, vec![0x0, 0x8000, 0xE000, 0x10000]);
        assert_eq!(profile.images[0].path, Path::new("/assets/S3/bootloader.bin"));
    }

    #[test]
    fn test_release_image_comes_from_prerequisites() {
        let prereqs = ResolvedPrerequisites::new().with(
            FirmwareSlot::MarauderOldHardware,
            "ESP32Marauder/releases/esp32_marauder_v1_old_hardware.bin",
        );
        let profile = BoardChoice::AwokV1To3
            .profile(&prereqs, Path::new("."))
            .unwrap();

        assert_eq!(
            profile.images[2].path,
            Path::new("ESP32Marauder/releases/esp32_marauder_v1_old_hardware.bin")
        );
    }

    #[test]
    fn test_missing_release_slot() {
        let err = BoardChoice::EvilPortalS2
            .profile(&ResolvedPrerequisites::new(), Path::new("."))
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::MissingFirmware(FirmwareSlot::EvilPortalS2)
        ));
    }

    #[test]
    fn test_unsorted_offsets_rejected() {
        let profile = BoardProfile {
            firmware: "Test",
            board: "Test board",
            chip: "esp32",
            flash_size: FlashSize::Mb4,
            images: vec![
                FlashImage {
                    offset: 0x8000,
                    path: PathBuf::from("a.bin"),
                },
                FlashImage {
                    offset: 0x1000,
                    path: PathBuf::from("b.bin"),
                },
            ],
        };
        assert!(matches!(
            profile.check_offsets(),
            Err(CoreError::UnsortedOffsets { offset: 0x1000, .. })
        ));
    }

    #[test]
    fn test_validate_requires_files() {
        let temp = TempDir::new().unwrap();
        let prereqs = ResolvedPrerequisites::new()
            .with(FirmwareSlot::EvilPortalWroom, temp.path().join("EvilPortalWROOM.bin"));
        let profile = BoardChoice::EvilPortalWroom
            .profile(&prereqs, temp.path())
            .unwrap();

        assert!(matches!(profile.validate(), Err(CoreError::MissingImage(_))));

        fs::write(temp.path().join("EvilPortalWROOM.bin"), b"image").unwrap();
        assert!(profile.validate().is_ok());
    }
}
