//! Prerequisite check run at startup and after every update

use easyinstall_core::prereqs::{FirmwareSlot, ResolvedPrerequisites};

use crate::cache::{resolve_latest, FirmwareCache};
use crate::error::Result;
use crate::fetch::AssetFetch;
use crate::layout::{FirmwareLayout, SlotLookup, EXTRA_BINS_REPO};
use crate::release::{ReleaseFamily, ReleaseFetcher};
use crate::sync::RepoSync;

const MARAUDER_SLOTS: [FirmwareSlot; 5] = [
    FirmwareSlot::MarauderFlipper,
    FirmwareSlot::MarauderMultiboardS3,
    FirmwareSlot::MarauderOldHardware,
    FirmwareSlot::MarauderMini,
    FirmwareSlot::MarauderV6,
];

const EVIL_PORTAL_SLOTS: [FirmwareSlot; 2] =
    [FirmwareSlot::EvilPortalWroom, FirmwareSlot::EvilPortalS2];

/// Downloads missing firmware and resolves one file per slot
pub struct Prerequisites<'a> {
    layout: &'a FirmwareLayout,
    git: &'a dyn RepoSync,
    http: &'a dyn AssetFetch,
}

impl<'a> Prerequisites<'a> {
    /// Prerequisite check over `layout`
    pub fn new(layout: &'a FirmwareLayout, git: &'a dyn RepoSync, http: &'a dyn AssetFetch) -> Self {
        Self { layout, git, http }
    }

    /// Mirrored repository for `layout`
    pub fn extra_bins(layout: &FirmwareLayout) -> FirmwareCache {
        FirmwareCache::new(EXTRA_BINS_REPO, layout.extra_bins_dir())
    }

    /// Sync, download what is missing, then resolve every slot
    pub fn resolve(&self) -> Result<ResolvedPrerequisites> {
        log::info!("Checking for prerequisites...");
        let mut prereqs = ResolvedPrerequisites::new();
        let fetcher = ReleaseFetcher::new(self.layout, self.http);

        Self::extra_bins(self.layout).ensure_synced(self.git)?;

        fetcher.ensure(ReleaseFamily::Marauder)?;
        lookup(self.layout, &MARAUDER_SLOTS, &mut prereqs)?;

        fetcher.ensure(ReleaseFamily::EvilPortal)?;
        lookup(self.layout, &EVIL_PORTAL_SLOTS, &mut prereqs)?;

        Ok(prereqs)
    }
}

/// Resolve every slot from what is already on disk, without syncing or
/// downloading
pub fn resolve_local(layout: &FirmwareLayout) -> Result<ResolvedPrerequisites> {
    let mut prereqs = ResolvedPrerequisites::new();
    lookup(layout, &FirmwareSlot::ALL, &mut prereqs)?;
    Ok(prereqs)
}

fn lookup(
    layout: &FirmwareLayout,
    slots: &[FirmwareSlot],
    prereqs: &mut ResolvedPrerequisites,
) -> Result<()> {
    for &slot in slots {
        let path = match SlotLookup::for_slot(slot) {
            SlotLookup::Pattern(pattern) => resolve_latest(layout.root(), pattern)?,
            // Fixed paths are recorded even if absent; validation reports them
            SlotLookup::Fixed(path) => Some(layout.root().join(path)),
        };
        log::debug!("{}: {:?}", slot, path);
        prereqs.set(slot, path);
    }
    Ok(())
}
