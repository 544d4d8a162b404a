use std::path::{Path, PathBuf};

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use crate::version::Version;
use crate::UpdateError;

pub const GITHUB_API_URL: &str = "https://api.github.com";
const NOTES_PREVIEW_CHARS: usize = 200;

/// GitHub release asset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    /// File name, e.g. "weather.exe"
    pub name: String,

    /// Direct download URL
    pub browser_download_url: String,

    /// Size in bytes
    #[serde(default)]
    pub size: u64,
}

/// GitHub release information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Release {
    /// Tag name, e.g. "v1.3.0"
    #[serde(default)]
    pub tag_name: String,

    /// Release page URL
    pub html_url: Option<String>,

    /// Release notes (markdown)
    pub body: Option<String>,

    /// Downloadable files
    #[serde(default)]
    pub assets: Vec<Asset>,
}

/// A release newer than the running version
#[derive(Debug, Clone)]
pub struct UpdateInfo {
    pub version: Version,
    pub url: Option<String>,
    pub notes: String,
    pub assets: Vec<Asset>,
}

impl UpdateInfo {
    /// Asset with exactly this file name, ignoring case
    pub fn find_asset(&self, name: &str) -> Option<&Asset> {
        self.assets
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
    }

    /// First 200 characters of the release notes, with "..." when cut
    pub fn notes_preview(&self) -> String {
        let mut chars = self.notes.chars();
        let preview: String = chars.by_ref().take(NOTES_PREVIEW_CHARS).collect();
        if chars.next().is_some() {
            format!("{}...", preview)
        } else {
            preview
        }
    }
}

/// Checks a GitHub repository for newer releases
#[derive(Debug, Clone)]
pub struct UpdateChecker {
    client: Client,
    base_url: String,
    repo: String,
    current: Version,
}

impl UpdateChecker {
    /// Create a checker for `repo` ("owner/name") running at `current_version`.
    pub fn new(
        base_url: impl Into<String>,
        repo: impl Into<String>,
        current_version: &str,
    ) -> Result<Self, UpdateError> {
        let client = Client::builder()
            .user_agent(concat!("SkyCast/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            repo: repo.into(),
            current: Version::parse(current_version)?,
        })
    }

    pub fn current_version(&self) -> &Version {
        &self.current
    }

    /// Fetch the latest published release
    pub async fn latest_release(&self) -> Result<Release, UpdateError> {
        let url = format!("{}/repos/{}/releases/latest", self.base_url, self.repo);
        tracing::debug!("Checking for updates at {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!("Failed to check for updates: HTTP {}", status);
            return Err(UpdateError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    /// Returns the latest release if it is strictly newer than the running version.
    pub async fn check(&self) -> Result<Option<UpdateInfo>, UpdateError> {
        let release = self.latest_release().await?;

        if release.tag_name.trim().trim_start_matches(['v', 'V']).is_empty() {
            tracing::warn!("No version tag found in release");
            return Err(UpdateError::MissingTag);
        }

        let latest = Version::parse(&release.tag_name)?;
        tracing::info!(
            "Current version: {}, latest version: {}",
            self.current,
            latest
        );

        if latest <= self.current {
            return Ok(None);
        }

        Ok(Some(UpdateInfo {
            version: latest,
            url: release.html_url,
            notes: release
                .body
                .unwrap_or_else(|| "No release notes available".to_string()),
            assets: release.assets,
        }))
    }

    /// Download `asset` to `dest`, returning the number of bytes written.
    ///
    /// Bytes land in `<dest>.part` first and are renamed into place once
    /// complete, so a failed download never leaves a truncated `dest`.
    pub async fn download_asset(&self, asset: &Asset, dest: &Path) -> Result<u64, UpdateError> {
        tracing::info!("Downloading {} to {}", asset.name, dest.display());

        let mut response = self
            .client
            .get(&asset.browser_download_url)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpdateError::Api {
                status: status.as_u16(),
                message: format!("download of {} failed", asset.name),
            });
        }

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut partial = dest.as_os_str().to_owned();
        partial.push(".part");
        let partial = PathBuf::from(partial);

        let written = match write_body(&mut response, &partial, dest).await {
            Ok(written) => written,
            Err(e) => {
                if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
                    tracing::debug!("No partial download to remove: {}", cleanup);
                }
                return Err(e);
            }
        };

        tracing::info!("Downloaded {} bytes", written);
        Ok(written)
    }
}

/// Stream the body into `partial`, then move it to `dest`.
async fn write_body(
    response: &mut reqwest::Response,
    partial: &Path,
    dest: &Path,
) -> Result<u64, UpdateError> {
    let mut file = tokio::fs::File::create(partial).await?;
    let mut written = 0u64;
    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    drop(file);

    tokio::fs::rename(partial, dest).await?;
    Ok(written)
}
