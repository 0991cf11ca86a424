//! `gameinit.ron`: where the package comes from, where it goes and how the
//! helper processes are run.
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use engine_logging::{engine_info, engine_warn};
use gameinit_core::InstallSettings;
use gameinit_engine::{FetchSettings, PickerSettings};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::logging::LogDestination;

pub const DEFAULT_CONFIG_FILE: &str = "gameinit.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameInitConfig {
    /// Present once the game content is installed.
    pub marker_path: PathBuf,
    pub package_url: String,
    pub package_path: PathBuf,
    /// Hex digest; checked after download when set.
    pub package_sha256: Option<String>,
    pub game_title: String,
    pub picker_program: PathBuf,
    pub picker_args: Vec<String>,
    pub picker_timeout_secs: u64,
    pub picker_max_output_bytes: usize,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    pub log_destination: LogDestination,
}

impl Default for GameInitConfig {
    fn default() -> Self {
        let picker = PickerSettings::default();
        let fetch = FetchSettings::default();
        Self {
            marker_path: PathBuf::from("packages/conquer.mix"),
            package_url: "https://downloads.example.org/ra-packages.zip".to_string(),
            package_path: PathBuf::from("packages/ra-packages.zip"),
            package_sha256: None,
            game_title: "Red Alert".to_string(),
            picker_program: picker.program,
            picker_args: picker.leading_args,
            picker_timeout_secs: picker.timeout.as_secs(),
            picker_max_output_bytes: picker.max_output_bytes,
            connect_timeout_secs: fetch.connect_timeout.as_secs(),
            read_timeout_secs: fetch.read_timeout.as_secs(),
            log_destination: LogDestination::default(),
        }
    }
}

impl GameInitConfig {
    /// Reads the config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                engine_warn!("no config at {:?}; using defaults", path);
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let config = ron::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        engine_info!("loaded config from {:?}", path);
        Ok(config)
    }

    pub fn install_settings(&self) -> InstallSettings {
        InstallSettings {
            package_url: self.package_url.clone(),
            package_path: self.package_path.clone(),
            game_title: self.game_title.clone(),
        }
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            read_timeout: Duration::from_secs(self.read_timeout_secs),
            request_timeout: None,
        }
    }

    pub fn picker_settings(&self) -> PickerSettings {
        PickerSettings {
            program: self.picker_program.clone(),
            leading_args: self.picker_args.clone(),
            timeout: Duration::from_secs(self.picker_timeout_secs),
            max_output_bytes: self.picker_max_output_bytes,
        }
    }
}
