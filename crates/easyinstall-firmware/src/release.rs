//! Release downloads
//!
//! Two families are fetched over HTTP:
//!
//! - Marauder: every asset of the latest GitHub release goes into
//!   `ESP32Marauder/releases`
//! - Evil Portal: two fixed single-file images go into `EvilPortal`
//!
//! A family is only downloaded when its directory does not exist. Bodies are
//! stored exactly as received.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{FirmwareError, Result};
use crate::fetch::AssetFetch;
use crate::layout::{
    FirmwareLayout, EVIL_PORTAL_S2_FILE, EVIL_PORTAL_S2_URL, EVIL_PORTAL_WROOM_FILE,
    EVIL_PORTAL_WROOM_URL, MARAUDER_LATEST_RELEASE,
};

/// GitHub release metadata (only the fields used here)
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    /// Release tag
    #[serde(default)]
    pub tag_name: Option<String>,
    /// Downloadable assets
    #[serde(default)]
    pub assets: Vec<Asset>,
}

/// One release asset
#[derive(Debug, Clone, Deserialize)]
pub struct Asset {
    /// Direct download URL
    pub browser_download_url: String,
}

/// Group of firmware files downloaded together
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseFamily {
    /// Latest Marauder release, all assets
    Marauder,
    /// Evil Portal WROOM and S2 images
    EvilPortal,
}

impl ReleaseFamily {
    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Marauder => "Marauder releases",
            Self::EvilPortal => "Evil Portal",
        }
    }
}

/// Downloads release families into a [`FirmwareLayout`]
pub struct ReleaseFetcher<'a> {
    layout: &'a FirmwareLayout,
    http: &'a dyn AssetFetch,
}

impl<'a> ReleaseFetcher<'a> {
    /// Fetcher writing below `layout`
    pub fn new(layout: &'a FirmwareLayout, http: &'a dyn AssetFetch) -> Self {
        Self { layout, http }
    }

    /// Download a family unless its directory already exists
    ///
    /// Returns `true` when something was downloaded.
    pub fn ensure(&self, family: ReleaseFamily) -> Result<bool> {
        log::info!("Checking for {}", family.name());
        let dir = match family {
            ReleaseFamily::Marauder => self.layout.marauder_releases_dir(),
            ReleaseFamily::EvilPortal => self.layout.evil_portal_dir(),
        };
        if dir.exists() {
            log::debug!("{} exists, not downloading", dir.display());
            return Ok(false);
        }

        log::info!(
            "{} folder does not exist, but that's okay, downloading now...",
            family.name()
        );
        fs::create_dir_all(&dir).map_err(|e| FirmwareError::CreateDirFailed {
            path: dir.clone(),
            source: e,
        })?;

        match family {
            ReleaseFamily::Marauder => self.fetch_latest_release(MARAUDER_LATEST_RELEASE, &dir)?,
            ReleaseFamily::EvilPortal => {
                self.download(EVIL_PORTAL_WROOM_URL, &dir.join(EVIL_PORTAL_WROOM_FILE))?;
                self.download(EVIL_PORTAL_S2_URL, &dir.join(EVIL_PORTAL_S2_FILE))?;
            }
        }
        Ok(true)
    }

    fn fetch_latest_release(&self, api_url: &str, dir: &Path) -> Result<()> {
        let body = self.http.get(api_url)?;
        let release: Release =
            serde_json::from_slice(&body).map_err(|e| FirmwareError::ReleaseMetadata {
                url: api_url.to_string(),
                source: e,
            })?;

        if let Some(tag) = &release.tag_name {
            log::info!("Latest release is {} ({} assets)", tag, release.assets.len());
        }

        for asset in &release.assets {
            let url = &asset.browser_download_url;
            match asset_file_name(url) {
                Some(name) => self.download(url, &dir.join(name))?,
                None => log::warn!("Skipping asset without a file name: {}", url),
            }
        }
        Ok(())
    }

    fn download(&self, url: &str, dest: &Path) -> Result<()> {
        let body = self.http.get(url)?;
        fs::write(dest, &body).map_err(|e| FirmwareError::WriteFailed {
            path: dest.to_path_buf(),
            source: e,
        })?;
        log::debug!("Saved {} ({} bytes)", dest.display(), body.len());
        Ok(())
    }
}

/// Last path segment of a download URL, if it is usable as a file name
pub fn asset_file_name(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    match path.rsplit('/').next() {
        Some("") | Some(".") | Some("..") | None => None,
        Some(name) => Some(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[derive(Default)]
    struct FakeHttp {
        responses: HashMap<String, Vec<u8>>,
        requests: RefCell<Vec<String>>,
    }

    impl FakeHttp {
        fn with(mut self, url: &str, body: &[u8]) -> Self {
            self.responses.insert(url.to_string(), body.to_vec());
            self
        }
    }

    impl AssetFetch for FakeHttp {
        fn get(&self, url: &str) -> std::result::Result<Vec<u8>, FetchError> {
            self.requests.borrow_mut().push(url.to_string());
            self.responses
                .get(url)
                .cloned()
                .ok_or_else(|| FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                })
        }
    }

    const RELEASE_JSON: &str = r#"{
        "tag_name": "v1.2.0",
        "assets": [
            {"browser_download_url": "https://dl.example/esp32_marauder_v1_2_0_flipper.bin", "name": "a"},
            {"browser_download_url": "https://dl.example/esp32_marauder_v1_2_0_mini.bin"}
        ]
    }"#;

    #[test]
    fn test_asset_file_name() {
        assert_eq!(
            asset_file_name("https://dl.example/a/b/fw_v1.bin"),
            Some("fw_v1.bin")
        );
        assert_eq!(
            asset_file_name("https://dl.example/fw.bin?raw=1"),
            Some("fw.bin")
        );
        assert_eq!(asset_file_name("https://dl.example/dir/"), None);
        assert_eq!(asset_file_name("https://dl.example/.."), None);
    }

    #[test]
    fn test_marauder_release_downloads_every_asset() {
        let temp = TempDir::new().unwrap();
        let layout = FirmwareLayout::new(temp.path());
        let http = FakeHttp::default()
            .with(MARAUDER_LATEST_RELEASE, RELEASE_JSON.as_bytes())
            .with("https://dl.example/esp32_marauder_v1_2_0_flipper.bin", b"flipper")
            .with("https://dl.example/esp32_marauder_v1_2_0_mini.bin", b"mini");

        let fetcher = ReleaseFetcher::new(&layout, &http);
        assert!(fetcher.ensure(ReleaseFamily::Marauder).unwrap());

        let releases = layout.marauder_releases_dir();
        assert_eq!(
            fs::read(releases.join("esp32_marauder_v1_2_0_flipper.bin")).unwrap(),
            b"flipper"
        );
        assert_eq!(
            fs::read(releases.join("esp32_marauder_v1_2_0_mini.bin")).unwrap(),
            b"mini"
        );
        assert_eq!(http.requests.borrow().len(), 3);
    }

    #[test]
    fn test_existing_directory_is_not_refetched() {
        let temp = TempDir::new().unwrap();
        let layout = FirmwareLayout::new(temp.path());
        fs::create_dir_all(layout.marauder_releases_dir()).unwrap();
        fs::create_dir_all(layout.evil_portal_dir()).unwrap();
        let http = FakeHttp::default();

        let fetcher = ReleaseFetcher::new(&layout, &http);
        assert!(!fetcher.ensure(ReleaseFamily::Marauder).unwrap());
        assert!(!fetcher.ensure(ReleaseFamily::EvilPortal).unwrap());
        assert!(http.requests.borrow().is_empty());
    }

    #[test]
    fn test_evil_portal_fixed_files() {
        let temp = TempDir::new().unwrap();
        let layout = FirmwareLayout::new(temp.path());
        let http = FakeHttp::default()
            .with(EVIL_PORTAL_WROOM_URL, b"wroom")
            .with(EVIL_PORTAL_S2_URL, b"s2");

        ReleaseFetcher::new(&layout, &http)
            .ensure(ReleaseFamily::EvilPortal)
            .unwrap();

        let dir = layout.evil_portal_dir();
        assert_eq!(fs::read(dir.join("EvilPortalWROOM.bin")).unwrap(), b"wroom");
        assert_eq!(fs::read(dir.join("EvilPortalS2.bin")).unwrap(), b"s2");
    }

    #[test]
    fn test_truncated_body_is_stored_as_is() {
        let temp = TempDir::new().unwrap();
        let layout = FirmwareLayout::new(temp.path());
        // Three bytes of what should have been a full image
        let http = FakeHttp::default()
            .with(EVIL_PORTAL_WROOM_URL, &[0xE9, 0x03, 0x02])
            .with(EVIL_PORTAL_S2_URL, b"");

        ReleaseFetcher::new(&layout, &http)
            .ensure(ReleaseFamily::EvilPortal)
            .unwrap();

        let dir = layout.evil_portal_dir();
        assert_eq!(
            fs::read(dir.join("EvilPortalWROOM.bin")).unwrap(),
            vec![0xE9, 0x03, 0x02]
        );
        assert_eq!(fs::read(dir.join("EvilPortalS2.bin")).unwrap().len(), 0);
    }

    #[test]
    fn test_bad_metadata_is_reported() {
        let temp = TempDir::new().unwrap();
        let layout = FirmwareLayout::new(temp.path());
        let http = FakeHttp::default().with(MARAUDER_LATEST_RELEASE, b"<html>rate limited</html>");

        let err = ReleaseFetcher::new(&layout, &http)
            .ensure(ReleaseFamily::Marauder)
            .unwrap_err();
        assert!(matches!(err, FirmwareError::ReleaseMetadata { .. }));
    }

    #[test]
    fn test_http_error_propagates() {
        let temp = TempDir::new().unwrap();
        let layout = FirmwareLayout::new(temp.path());
        let http = FakeHttp::default();

        let err = ReleaseFetcher::new(&layout, &http)
            .ensure(ReleaseFamily::EvilPortal)
            .unwrap_err();
        assert!(matches!(
            err,
            FirmwareError::Fetch(FetchError::Status { status: 404, .. })
        ));
    }
}
