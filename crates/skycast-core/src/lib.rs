pub mod config;
pub mod error;

pub use config::{Config, LoggingConfig, UpdateConfig, ValidationResult, WeatherConfig};
pub use error::{AppError, ConfigError, NetworkError, ReqwestErrorExt, UpdateError, WeatherError};

use anyhow::Result;

/// Initialize logging for the application.
///
/// `RUST_LOG` wins when set; otherwise the filter is `debug` or `info`
/// depending on `debug`. Output goes to stderr so report text on stdout
/// stays clean.
pub fn init(debug: bool) -> Result<()> {
    let fallback = if debug { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::debug!("SkyCast core initialized");
    Ok(())
}
