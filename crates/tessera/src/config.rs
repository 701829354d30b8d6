//! Configuration file loading for tessera.
//!
//! Reads `tessera.config.json` from the current working directory, or the
//! file passed with `--config`. A relative `director.base` is resolved
//! against the directory holding the config file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tessera_mosaic::DirectorOptions;
use tessera_tile::PrintOptions;

pub const CONFIG_FILE: &str = "tessera.config.json";

/// Top-level tessera configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TesseraConfig {
    /// JSON Schema reference (for editor autocompletion).
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Template lookup and expression options.
    pub director: DirectorOptions,

    /// Printer options for `render`.
    pub print: PrintOptions,
}

/// Load the config at `path`, or `tessera.config.json` in the working
/// directory when no path is given.
///
/// A missing default file yields the defaults silently; an unreadable or
/// malformed file is reported and also yields the defaults.
pub fn load_config(path: Option<&Path>) -> TesseraConfig {
    let (config_path, explicit) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (
            std::env::current_dir().unwrap_or_default().join(CONFIG_FILE),
            false,
        ),
    };

    if !explicit && !config_path.exists() {
        return TesseraConfig::default();
    }

    let mut config: TesseraConfig = match std::fs::read_to_string(&config_path) {
        Ok(content) => match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %config_path.display(), error = %e, "Failed to parse config");
                return TesseraConfig::default();
            }
        },
        Err(e) => {
            tracing::warn!(path = %config_path.display(), error = %e, "Failed to read config");
            return TesseraConfig::default();
        }
    };

    if let (Some(base), Some(dir)) = (config.director.base.as_mut(), config_path.parent()) {
        if base.is_relative() {
            *base = dir.join(&*base);
        }
    }
    config
}

/// The directory templates are looked up in: `--base`, then the config
/// file, then the working directory.
pub fn resolve_base(flag: Option<PathBuf>, config: &TesseraConfig) -> PathBuf {
    flag.or_else(|| config.director.base.clone())
        .unwrap_or_else(|| PathBuf::from("."))
}
