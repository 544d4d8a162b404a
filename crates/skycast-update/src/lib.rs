//! Release checks against GitHub for SkyCast.
//!
//! Only detection and download are handled here; replacing the running
//! binary is left to the user.

pub mod release;
pub mod version;

pub use release::{Asset, Release, UpdateChecker, UpdateInfo, GITHUB_API_URL};
pub use version::Version;

use skycast_core::{AppError, NetworkError, ReqwestErrorExt, UpdateError as CoreUpdateError};

/// Update check errors
#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("GitHub API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Release has no version tag")]
    MissingTag,
    #[error("Invalid version: {0}")]
    InvalidVersion(String),
    #[error("Asset not found: {0}")]
    AssetNotFound(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<UpdateError> for AppError {
    fn from(e: UpdateError) -> Self {
        match e {
            UpdateError::Network(e) => AppError::Network(e.into_network_error()),
            UpdateError::Api { status: 404, .. } => {
                AppError::Update(CoreUpdateError::CheckFailed("no published release".into()))
            }
            UpdateError::Api { status, message } => {
                AppError::Network(NetworkError::ServerError { status, message })
            }
            UpdateError::MissingTag => AppError::Update(CoreUpdateError::MissingTag),
            UpdateError::InvalidVersion(v) => {
                AppError::Update(CoreUpdateError::CheckFailed(format!("invalid version {}", v)))
            }
            UpdateError::AssetNotFound(name) => {
                AppError::Update(CoreUpdateError::AssetNotFound(name))
            }
            UpdateError::Io(e) => AppError::Update(CoreUpdateError::DownloadFailed(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tag_maps_to_update_error() {
        let app: AppError = UpdateError::MissingTag.into();
        assert!(matches!(app, AppError::Update(CoreUpdateError::MissingTag)));
    }

    #[test]
    fn test_not_found_means_no_release() {
        let app: AppError = UpdateError::Api {
            status: 404,
            message: "Not Found".into(),
        }
        .into();
        assert!(matches!(app, AppError::Update(CoreUpdateError::CheckFailed(_))));
    }

    #[test]
    fn test_io_maps_to_download_failed() {
        let app: AppError =
            UpdateError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk full")).into();
        assert!(matches!(app, AppError::Update(CoreUpdateError::DownloadFailed(_))));
    }
}
