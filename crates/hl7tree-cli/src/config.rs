//! Configuration file loading for the CLI
//!
//! This module handles finding and loading TOML configuration files
//! from various locations (explicit path, local directory, system directory),
//! and loading the catalog files they may point at.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use hl7tree::{
    Hl7TreeError,
    config::AppConfig,
    levels::LevelTable,
    schema::{CatalogFile, SchemaCatalog},
};

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("Failed to parse catalog file {path}: {message}")]
    Catalog { path: PathBuf, message: String },
}

impl From<ConfigError> for Hl7TreeError {
    fn from(err: ConfigError) -> Self {
        Hl7TreeError::Io(io::Error::other(err.to_string()))
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (hl7tree/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, Hl7TreeError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("hl7tree/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "hl7tree", "hl7tree") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

/// Load the schema tables a configuration points at.
///
/// Returns `None` when the configuration uses the built-in tables.
///
/// # Errors
///
/// Returns error if the catalog file is missing, is not valid TOML, or
/// describes an invalid catalog.
pub fn load_tables(config: &AppConfig) -> Result<Option<(SchemaCatalog, LevelTable)>, Hl7TreeError> {
    let Some(path) = config.schema().catalog() else {
        return Ok(None);
    };

    info!(path = path.display().to_string(); "Loading schema catalog");
    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;
    let file: CatalogFile = toml::from_str(&content).map_err(|e| ConfigError::Catalog {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let tables = file.into_tables()?;
    debug!(segments = tables.0.len(); "Schema catalog loaded");
    Ok(Some(tables))
}

fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, Hl7TreeError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;
    let config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

    Ok(config)
}
