// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Runtime configuration shared by every promise created through a
/// [`PromiseRuntime`](crate::config::PromiseRuntime).
///
/// A lazy promise hands its configuration to the promise it materializes, and
/// every derived promise inherits it from its source.
///
/// # Fields
/// * `continuations` - How handler continuations are driven (optional, defaults to eager)
/// * `unhandled_rejections` - What to do with rejections nobody observed (optional, defaults to warn)
///
/// # Example
/// ```yaml
/// continuations: on_demand
/// unhandled_rejections: ignore
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub continuations: ContinuationMode,
    #[serde(default)]
    pub unhandled_rejections: RejectionPolicy,
}

/// How a promise's continuation gets polled.
///
/// # Variants
/// * `Eager` - Spawn a driver task on the ambient tokio runtime so handlers run
///   even if nobody awaits the derived promise. Falls back to `OnDemand` when
///   no runtime is available.
/// * `OnDemand` - Continuations run only while somebody awaits the promise
///   (or a promise derived from it).
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ContinuationMode {
    #[default]
    Eager,
    OnDemand,
}

/// What happens when a rejected promise is dropped without ever being observed.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RejectionPolicy {
    /// Emit a `warn!` diagnostic.
    #[default]
    Warn,
    /// Stay silent.
    Ignore,
}

/// Load a config file, picking the parser from the file extension
/// (`.yaml`/`.yml`, `.toml` or `.json`).
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    match extension.as_deref() {
        Some("yaml") | Some("yml") => load_config_from_str(&content),
        Some("toml") => Ok(toml::from_str(&content)?),
        Some("json") => Ok(serde_json::from_str(&content)?),
        _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Parse a YAML config document.
pub fn load_config_from_str(yaml: &str) -> Result<Config, ConfigError> {
    let cfg: Config = serde_yaml::from_str(yaml)?;
    Ok(cfg)
}
