//! Engine configuration.
//!
//! Where the world is saved, which key it lives under, the random seed,
//! the starting climate zone and the change-feed capacity. Loaded from
//! `saga.toml`; anything missing or unreadable falls back to defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use saga_common::{SagaError, SagaResult};
use saga_sim::ClimateZone;
use saga_world::FileStore;

/// Configuration file name.
pub const CONFIG_FILE: &str = "saga.toml";

/// Engine configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SagaConfig {
    // === Storage ===
    /// Directory holding saved worlds
    pub save_dir: PathBuf,
    /// Store key the world document is saved under
    pub state_key: String,

    // === Simulation ===
    /// Random seed (None = random)
    pub seed: Option<u64>,
    /// Climate zone for a freshly created world
    pub climate_zone: ClimateZone,

    // === Notifications ===
    /// Pending change notifications kept per subscriber
    pub channel_capacity: usize,

    // === Diagnostics ===
    /// Log filter used when `RUST_LOG` is not set
    pub log_filter: String,
}

impl Default for SagaConfig {
    fn default() -> Self {
        Self {
            save_dir: default_save_dir(),
            state_key: "world".to_string(),
            seed: None,
            climate_zone: ClimateZone::Temperate,
            channel_capacity: 64,
            log_filter: "saga=info".to_string(),
        }
    }
}

impl SagaConfig {
    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Failed to read config file: {e}");
                return Self::default();
            },
        };

        match toml::from_str(&contents) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            },
            Err(e) => {
                warn!("Failed to parse config file: {e}");
                Self::default()
            },
        }
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Checks values that would only fail later, at the first save.
    pub fn validate(&self) -> SagaResult<()> {
        if self.channel_capacity == 0 {
            return Err(SagaError::Config("channel_capacity must be at least 1".to_string()));
        }
        FileStore::new(&self.save_dir)
            .path_for(&self.state_key)
            .map_err(|e| SagaError::Config(format!("state_key: {e}")))?;
        Ok(())
    }

    /// Override the seed (e.g. from the command line).
    #[must_use]
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        if seed.is_some() {
            self.seed = seed;
        }
        self
    }
}

fn default_save_dir() -> PathBuf {
    dirs::data_local_dir().map_or_else(|| PathBuf::from("saves"), |dir| dir.join("saga"))
}
