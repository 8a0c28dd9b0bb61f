mod config;

pub use config::{Config, DriverConfig, NotificationsConfig, TimingConfig};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the fittimer data directory, creating it if needed.
///
/// Resolution order:
/// - `FITTIMER_DATA_DIR` when set
/// - `~/.config/fittimer-dev/` when `FITTIMER_ENV=dev`
/// - `~/.config/fittimer/`
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("FITTIMER_DATA_DIR") {
        Some(custom) => PathBuf::from(custom),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("FITTIMER_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("fittimer-dev")
            } else {
                base_dir.join("fittimer")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}
