//! Configuration for the MAS source and the masipamd daemon.
//!
//! The source itself recognizes a single option, the descriptor file path.
//! The daemon wraps it in a TOML file (default `/etc/masipamd/masipamd.toml`):
//!
//! ```toml
//! [source]
//! file_path = "/etc/kubernetes/interfaces.json"
//!
//! [daemon]
//! refresh_interval_secs = 5
//! ```

use crate::error::{IpamError, IpamResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Descriptor file written by the host agent on Linux hosts.
pub const DEFAULT_LINUX_FILE_PATH: &str = "/etc/kubernetes/interfaces.json";

/// Descriptor file written by the host agent on Windows hosts.
pub const DEFAULT_WINDOWS_FILE_PATH: &str = r"c:\k\interfaces.json";

/// Default location of the daemon configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/masipamd/masipamd.toml";

/// Returns the descriptor path the host agent writes on this platform.
pub fn default_file_path() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from(DEFAULT_WINDOWS_FILE_PATH)
    } else {
        PathBuf::from(DEFAULT_LINUX_FILE_PATH)
    }
}

/// Options consumed by [`crate::MasSource`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasSourceConfig {
    /// Overrides the platform default descriptor path.
    #[serde(default)]
    pub file_path: Option<PathBuf>,
}

impl MasSourceConfig {
    pub fn with_file_path(path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: Some(path.into()),
        }
    }

    /// Returns the override if set, the platform default otherwise.
    pub fn resolved_file_path(&self) -> PathBuf {
        self.file_path.clone().unwrap_or_else(default_file_path)
    }
}

/// Refresh loop settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Seconds between refresh attempts until the descriptor file loads
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
}

fn default_refresh_interval() -> u64 {
    5
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval(),
        }
    }
}

/// Complete masipamd configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasipamdConfig {
    #[serde(default)]
    pub source: MasSourceConfig,

    #[serde(default)]
    pub daemon: DaemonConfig,
}

impl MasipamdConfig {
    /// Load configuration from file, falling back to defaults if file not found
    pub fn load_or_default(path: impl AsRef<Path>) -> IpamResult<Self> {
        let path = path.as_ref();

        match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                IpamError::configuration(format!(
                    "Failed to parse config file {}: {}",
                    path.display(),
                    e
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "Config file not found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(IpamError::configuration(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Get refresh interval as Duration
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.daemon.refresh_interval_secs)
    }

    /// Validate configuration
    pub fn validate(&self) -> IpamResult<()> {
        if self.daemon.refresh_interval_secs == 0 {
            return Err(IpamError::configuration(
                "refresh_interval_secs must be > 0",
            ));
        }

        if let Some(path) = &self.source.file_path {
            if path.as_os_str().is_empty() {
                return Err(IpamError::configuration("file_path must not be empty"));
            }
        }

        Ok(())
    }
}
