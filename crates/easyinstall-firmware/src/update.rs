//! Destructive refresh of every cached firmware file

use std::fs;
use std::io;
use std::path::Path;

use easyinstall_core::prereqs::ResolvedPrerequisites;

use crate::cache::rooted_glob;
use crate::error::{FirmwareError, Result};
use crate::fetch::AssetFetch;
use crate::layout::{FirmwareLayout, EVIL_PORTAL_DIR, MARAUDER_DIR};
use crate::prereq::Prerequisites;
use crate::sync::RepoSync;

/// Deletes downloaded releases, refreshes the mirror and re-runs the
/// prerequisite check
pub struct UpdateCoordinator<'a> {
    layout: FirmwareLayout,
    git: &'a dyn RepoSync,
    http: &'a dyn AssetFetch,
}

impl<'a> UpdateCoordinator<'a> {
    /// Coordinator for the cache below `layout`
    pub fn new(layout: FirmwareLayout, git: &'a dyn RepoSync, http: &'a dyn AssetFetch) -> Self {
        Self { layout, git, http }
    }

    /// Layout being updated
    pub fn layout(&self) -> &FirmwareLayout {
        &self.layout
    }

    /// Run the update and return the freshly resolved prerequisites
    ///
    /// The release directories must exist. An update on a cache that was never
    /// populated fails with [`FirmwareError::MissingDirectory`].
    pub fn run(&self) -> Result<ResolvedPrerequisites> {
        log::info!("Checking for and deleting the files before replacing them...");
        let root = self.layout.root();

        remove_matching_files(root, &format!("{}/*/*", MARAUDER_DIR))?;
        remove_matching_files(root, &format!("{}/*", EVIL_PORTAL_DIR))?;

        remove_dir(&self.layout.marauder_releases_dir())?;
        remove_dir(&self.layout.marauder_dir())?;
        remove_dir(&self.layout.evil_portal_dir())?;

        Prerequisites::extra_bins(&self.layout).refresh(self.git)?;

        Prerequisites::new(&self.layout, self.git, self.http).resolve()
    }
}

fn remove_matching_files(root: &Path, pattern: &str) -> Result<()> {
    for path in rooted_glob(root, pattern)?.filter_map(|e| e.ok()) {
        if !path.is_file() {
            continue;
        }
        log::debug!("Removing {}", path.display());
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(FirmwareError::RemoveFailed { path, source: e }),
        }
    }
    Ok(())
}

fn remove_dir(path: &Path) -> Result<()> {
    fs::remove_dir(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => FirmwareError::MissingDirectory(path.to_path_buf()),
        _ => FirmwareError::RemoveFailed {
            path: path.to_path_buf(),
            source: e,
        },
    })
}
