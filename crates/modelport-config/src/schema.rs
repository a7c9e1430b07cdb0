// ModelPort - 3D Model Import Pipeline
// Copyright (C) 2025 ModelPort Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.

//! Configuration schema
//!
//! Every field has a serde default, so an empty file is a valid configuration.

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Import defaults
    #[serde(default)]
    pub import: ImportDefaults,

    /// File loading
    #[serde(default)]
    pub loader: LoaderConfig,

    /// Logging
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load `path` when it exists, otherwise fall back to defaults
    pub async fn load_or_default(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        crate::ConfigLoader::new().load_file(path).await
    }

    /// Render as pretty TOML
    pub fn to_toml(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::SerializationError(e.to_string()))
    }
}

/// Colors applied when a model format imposes none
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportDefaults {
    /// Default surface color, `#rrggbb`
    #[serde(default = "default_color")]
    pub default_color: String,

    /// Default line color, `#rrggbb`
    #[serde(default = "default_line_color")]
    pub default_line_color: String,
}

impl Default for ImportDefaults {
    fn default() -> Self {
        ImportDefaults {
            default_color: default_color(),
            default_line_color: default_line_color(),
        }
    }
}

/// File loading settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Per-file load timeout in seconds; unset means no limit
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// User agent sent with HTTP requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl LoaderConfig {
    /// Timeout as a [`Duration`]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        LoaderConfig {
            timeout_secs: None,
            user_agent: default_user_agent(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level: trace, debug, info, warn or error
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format: pretty, compact or json
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        ObservabilityConfig {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_color() -> String {
    "#c8c8c8".to_string()
}

fn default_line_color() -> String {
    "#646464".to_string()
}

fn default_user_agent() -> String {
    concat!("modelport/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}
