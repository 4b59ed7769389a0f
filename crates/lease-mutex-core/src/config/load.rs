//! Configuration loading from files and environment (Immutable functional pattern)
//!
//! All operations return new instances rather than mutating in place.

use std::path::{Path, PathBuf};

use super::types::{Config, PartialConfig};
use crate::{Error, Result};

/// Prefix shared by every environment override.
const ENV_PREFIX: &str = "LEASE_MUTEX_";

// ═══════════════════════════════════════════════════════════════════════════
// PUBLIC API
// ═══════════════════════════════════════════════════════════════════════════

/// Load configuration from all sources with hierarchy
///
/// With `explicit` set, that file must exist and stands in for both the
/// global and project files. `overrides` is the CLI layer and wins over
/// everything else.
///
/// # Errors
///
/// Returns error if:
/// - A config file cannot be read or is malformed TOML
/// - An environment variable holds an unparsable value
/// - The resulting config fails validation
pub fn load_config(explicit: Option<&Path>, overrides: PartialConfig) -> Result<Config> {
    let config = Config::default();

    let config = match explicit {
        Some(path) => config.merge(load_toml_file(path)?),
        None => {
            let config = match global_config_path().filter(|path| path.exists()) {
                Some(path) => config.merge(load_toml_file(&path)?),
                None => config,
            };
            let project = project_config_path()?;
            if project.exists() {
                config.merge(load_toml_file(&project)?)
            } else {
                config
            }
        }
    };

    let config = config.apply_env_vars()?.merge(overrides);
    config.validate()?;
    Ok(config)
}

// ═══════════════════════════════════════════════════════════════════════════
// PATH HELPERS
// ═══════════════════════════════════════════════════════════════════════════

/// Get path to global config file
pub fn global_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "lease-mutex")
        .map(|proj_dirs| proj_dirs.config_dir().join("config.toml"))
}

/// Get path to project config file
///
/// # Errors
///
/// Returns error if current directory cannot be determined
pub fn project_config_path() -> Result<PathBuf> {
    std::env::current_dir()
        .map(|dir| dir.join(".lease-mutex").join("config.toml"))
        .map_err(|e| Error::IoError(format!("failed to get current directory: {e}")))
}

/// Load one TOML file as a config layer
///
/// # Errors
///
/// Returns error if:
/// - File cannot be read
/// - Path is a directory instead of a file
/// - TOML is malformed or names unknown keys
pub fn load_toml_file(path: &Path) -> Result<PartialConfig> {
    if path.is_dir() {
        return Err(Error::IoError(format!(
            "config path is a directory, not a file: {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::IoError(format!("failed to read config file {}: {e}", path.display()))
    })?;

    toml::from_str(&content).map_err(|e| {
        Error::ParseError(format!("failed to parse config file {}: {e}", path.display()))
    })
}

// ═══════════════════════════════════════════════════════════════════════════
// ENVIRONMENT VARIABLE OVERRIDES (Immutable pattern)
// ═══════════════════════════════════════════════════════════════════════════

fn parse_env<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| Error::invalid_config(format!("invalid {ENV_PREFIX}{key} value '{value}': {e}")))
}

impl Config {
    /// Apply `LEASE_MUTEX_*` overrides from the process environment
    ///
    /// # Errors
    ///
    /// Returns error if environment variable values are invalid
    pub fn apply_env_vars(self) -> Result<Self> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides read through `lookup`, keyed by full variable name
    ///
    /// # Errors
    ///
    /// Returns error if a numeric variable does not parse
    pub fn apply_env_with(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(&format!("{ENV_PREFIX}{key}"));

        if let Some(value) = var("DATABASE_URL") {
            self.store.database_url = value;
        }
        if let Some(value) = var("TABLE") {
            self.store.table = value;
        }
        if let Some(value) = var("LOCK_NAME") {
            self.lock.name = value;
        }
        if let Some(value) = var("OWNER") {
            if value.trim().is_empty() {
                return Err(Error::invalid_config(format!(
                    "{ENV_PREFIX}OWNER cannot be blank - unset the variable or provide an owner"
                )));
            }
            self.lock.owner = Some(value);
        }
        if let Some(value) = var("LEASE_MS") {
            self.lock.lease_ms = parse_env("LEASE_MS", &value)?;
        }
        if let Some(value) = var("TIMEOUT_MS") {
            self.client.timeout_ms = parse_env("TIMEOUT_MS", &value)?;
        }

        Ok(self)
    }
}
