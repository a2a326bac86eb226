//! Firmware cache backed by a mirrored repository
//!
//! The cache never checks freshness on its own. A present directory is taken
//! as up to date until an explicit [`FirmwareCache::refresh`].

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::{FirmwareError, Result};
use crate::sync::RepoSync;

/// A repository mirrored into a local directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmwareCache {
    repo_url: String,
    local_dir: PathBuf,
}

impl FirmwareCache {
    /// Cache of `repo_url` in `local_dir`
    pub fn new(repo_url: impl Into<String>, local_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_url: repo_url.into(),
            local_dir: local_dir.into(),
        }
    }

    /// Repository URL
    pub fn repo_url(&self) -> &str {
        &self.repo_url
    }

    /// Local checkout directory
    pub fn local_dir(&self) -> &Path {
        &self.local_dir
    }

    /// Clone the repository if the local directory does not exist yet
    ///
    /// Returns `true` when a clone was made.
    pub fn ensure_synced(&self, git: &dyn RepoSync) -> Result<bool> {
        if self.local_dir.exists() {
            log::info!("{} folder exists!", self.local_dir.display());
            return Ok(false);
        }

        log::info!(
            "{} folder does not exist, downloading now...",
            self.local_dir.display()
        );
        fs::create_dir_all(&self.local_dir).map_err(|e| FirmwareError::CreateDirFailed {
            path: self.local_dir.clone(),
            source: e,
        })?;
        git.clone_repo(&self.repo_url, &self.local_dir)?;
        Ok(true)
    }

    /// Throw away local changes and pull the latest revision
    pub fn refresh(&self, git: &dyn RepoSync) -> Result<()> {
        log::info!("Refreshing {}", self.local_dir.display());
        git.reset_hard(&self.local_dir)?;
        git.clean(&self.local_dir)?;
        git.pull(&self.local_dir)?;
        Ok(())
    }
}

/// Most recently created file matching `pattern` below `root`
///
/// Creation time is used where the filesystem reports it, modification time
/// otherwise. Files whose timestamps cannot be read sort first. On equal
/// timestamps the file enumerated last wins. No match is not an error: a
/// warning is logged and `None` returned.
pub fn resolve_latest(root: &Path, pattern: &str) -> Result<Option<PathBuf>> {
    let latest = rooted_glob(root, pattern)?
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                log::debug!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .map(|path| (created_at(&path), path))
        .max_by(|a, b| a.0.cmp(&b.0))
        .map(|(_, path)| path);

    match &latest {
        Some(path) => log::info!("Latest firmware found: {}", path.display()),
        None => log::warn!("No firmware files found for pattern: {}", pattern),
    }
    Ok(latest)
}

/// Expand `pattern` relative to `root`, treating `root` literally
pub(crate) fn rooted_glob(root: &Path, pattern: &str) -> Result<glob::Paths> {
    let full = format!(
        "{}/{}",
        glob::Pattern::escape(&root.to_string_lossy()),
        pattern
    );
    glob::glob(&full).map_err(|e| FirmwareError::Pattern {
        pattern: pattern.to_string(),
        source: e,
    })
}

fn created_at(path: &Path) -> Option<SystemTime> {
    let meta = fs::metadata(path).ok()?;
    meta.created().or_else(|_| meta.modified()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;
    use std::cell::RefCell;
    use std::thread;
    use std::time::Duration;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingGit {
        calls: RefCell<Vec<String>>,
    }

    impl RepoSync for RecordingGit {
        fn clone_repo(&self, url: &str, dir: &Path) -> std::result::Result<(), SyncError> {
            self.calls
                .borrow_mut()
                .push(format!("clone {} {}", url, dir.display()));
            Ok(())
        }

        fn reset_hard(&self, _dir: &Path) -> std::result::Result<(), SyncError> {
            self.calls.borrow_mut().push("reset".into());
            Ok(())
        }

        fn clean(&self, _dir: &Path) -> std::result::Result<(), SyncError> {
            self.calls.borrow_mut().push("clean".into());
            Ok(())
        }

        fn pull(&self, _dir: &Path) -> std::result::Result<(), SyncError> {
            self.calls.borrow_mut().push("pull".into());
            Ok(())
        }
    }

    fn touch(path: &Path) {
        fs::write(path, b"fw").unwrap();
        // Separate creation times
        thread::sleep(Duration::from_millis(50));
    }

    #[test]
    fn test_ensure_synced_clones_once_when_missing() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("Extra_ESP32_Bins");
        let cache = FirmwareCache::new("https://example.com/bins.git", &dir);
        let git = RecordingGit::default();
        assert_eq!(cache.repo_url(), "https://example.com/bins.git");
        assert_eq!(cache.local_dir(), dir.as_path());

        assert!(cache.ensure_synced(&git).unwrap());
        assert!(dir.is_dir());
        assert_eq!(git.calls.borrow().len(), 1);
        assert!(git.calls.borrow()[0].starts_with("clone https://example.com/bins.git"));

        // Second call sees the directory and does nothing
        assert!(!cache.ensure_synced(&git).unwrap());
        assert_eq!(git.calls.borrow().len(), 1);
    }

    #[test]
    fn test_ensure_synced_skips_existing_dir() {
        let temp = TempDir::new().unwrap();
        let cache = FirmwareCache::new("https://example.com/bins.git", temp.path());
        let git = RecordingGit::default();

        assert!(!cache.ensure_synced(&git).unwrap());
        assert!(git.calls.borrow().is_empty());
    }

    #[test]
    fn test_refresh_order() {
        let temp = TempDir::new().unwrap();
        let cache = FirmwareCache::new("https://example.com/bins.git", temp.path());
        let git = RecordingGit::default();

        cache.refresh(&git).unwrap();
        assert_eq!(*git.calls.borrow(), vec!["reset", "clean", "pull"]);
    }

    #[test]
    fn test_resolve_latest_no_match() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("releases")).unwrap();
        touch(&temp.path().join("releases/other.bin"));

        let found = resolve_latest(temp.path(), "releases/esp32_marauder_v*_mini.bin").unwrap();
        assert_eq!(found, None);

        // Nothing created or removed
        let entries: Vec<_> = fs::read_dir(temp.path().join("releases"))
            .unwrap()
            .collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_resolve_latest_single_match() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("releases")).unwrap();
        let only = temp.path().join("releases/esp32_marauder_v1_0_0_mini.bin");
        touch(&only);

        let found = resolve_latest(temp.path(), "releases/esp32_marauder_v*_mini.bin").unwrap();
        assert_eq!(found, Some(only));
    }

    #[test]
    fn test_resolve_latest_picks_newest_created() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("releases")).unwrap();
        touch(&temp.path().join("releases/esp32_marauder_v1_0_0_v6.bin"));
        touch(&temp.path().join("releases/esp32_marauder_v1_1_0_v6.bin"));

        let found = resolve_latest(temp.path(), "releases/esp32_marauder_v*_v6.bin").unwrap();
        assert_eq!(
            found,
            Some(temp.path().join("releases/esp32_marauder_v1_1_0_v6.bin"))
        );
    }

    #[test]
    fn test_resolve_latest_stale_file_shadows_newer_version() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("releases")).unwrap();
        touch(&temp.path().join("releases/esp32_marauder_v2_0_0_flipper.bin"));
        // An older version downloaded afterwards wins
        touch(&temp.path().join("releases/esp32_marauder_v1_0_0_flipper.bin"));

        let found = resolve_latest(temp.path(), "releases/esp32_marauder_v*_flipper.bin").unwrap();
        assert_eq!(
            found,
            Some(temp.path().join("releases/esp32_marauder_v1_0_0_flipper.bin"))
        );
    }

    #[test]
    fn test_resolve_latest_invalid_pattern() {
        let temp = TempDir::new().unwrap();
        let err = resolve_latest(temp.path(), "releases/[.bin").unwrap_err();
        assert!(matches!(err, FirmwareError::Pattern { .. }));
    }
}
