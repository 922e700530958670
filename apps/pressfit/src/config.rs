//! # Configuration
//!
//! `pressfit.toml` layout:
//!
//! ```toml
//! [engine]
//! newton_max_iterations = 50
//! simulation_max_years = 200
//! remaining_life_cap_years = 999
//! thickness_decimals = 3
//! rsf_decimals = 3
//! mawp_decimals = 1
//! life_decimals = 2
//!
//! [storage]
//! path = "pressfit.db"
//!
//! [audit]
//! default_actor = "pressfit"
//! clock_skew_seconds = 300
//! ```
//!
//! Every key is optional. Lookup order: `--config <path>`,
//! `$PRESSFIT_CONFIG`, `./pressfit.toml`, built-in defaults. A file that is
//! found but cannot be read or parsed is an error, never a silent fallback.

use std::path::{Path, PathBuf};

use pressfit_core::EngineSettings;
use pressfit_core::audit::DEFAULT_CLOCK_SKEW_SECONDS;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "PRESSFIT_CONFIG";

/// Config file picked up from the working directory.
pub const LOCAL_CONFIG: &str = "pressfit.toml";

/// Upper bound on the clock-skew allowance (one day).
const MAX_CLOCK_SKEW_SECONDS: i64 = 86_400;

// =============================================================================
// CONFIG STRUCTS
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PressfitConfig {
    pub engine: EngineSettings,
    pub storage: StorageConfig,
    pub audit: AuditConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// redb audit database.
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("pressfit.db"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Actor recorded when `--actor` is not given.
    pub default_actor: String,
    /// How far in the future a record timestamp may be before integrity
    /// verification flags it.
    pub clock_skew_seconds: i64,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            default_actor: "pressfit".to_string(),
            clock_skew_seconds: DEFAULT_CLOCK_SKEW_SECONDS,
        }
    }
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Config parse error ({}): {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Config validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}

// =============================================================================
// LOADING
// =============================================================================

impl PressfitConfig {
    /// Resolve and load the configuration.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }

        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::load_from_file(Path::new(&path));
        }

        let local = Path::new(LOCAL_CONFIG);
        if local.exists() {
            return Self::load_from_file(local);
        }

        debug!("No pressfit.toml found, using built-in defaults");
        let config = Self::default();
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&contents).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parse and validate TOML text.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Collect every problem rather than stopping at the first.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if let Err(e) = self.engine.validate() {
            errors.push(e.to_string());
        }
        if self.storage.path.as_os_str().is_empty() {
            errors.push("storage.path must not be empty".to_string());
        }
        if self.audit.default_actor.trim().is_empty() {
            errors.push("audit.default_actor must not be empty".to_string());
        }
        if !(0..=MAX_CLOCK_SKEW_SECONDS).contains(&self.audit.clock_skew_seconds) {
            errors.push(format!(
                "audit.clock_skew_seconds must be within 0..={}",
                MAX_CLOCK_SKEW_SECONDS
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}
