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

//! Configuration file loading and environment overrides

use crate::error::{ConfigError, ConfigResult};
use crate::schema::Config;
use crate::validation::Validator;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

/// Configuration format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML
    Toml,
    /// JSON
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("json") => Ok(ConfigFormat::Json),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::InvalidPath(path.to_path_buf())),
        }
    }

    /// Get format name as string
    pub fn name(&self) -> &'static str {
        match self {
            ConfigFormat::Toml => "TOML",
            ConfigFormat::Json => "JSON",
        }
    }
}

/// Configuration loader
#[derive(Debug)]
pub struct ConfigLoader {
    validate: bool,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        ConfigLoader { validate: true }
    }

    /// Create a loader without validation
    pub fn without_validation() -> Self {
        ConfigLoader { validate: false }
    }

    /// Load configuration from a file
    pub async fn load_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<Config> {
        let path = path.as_ref();
        debug!("Loading configuration from: {}", path.display());

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let format = ConfigFormat::from_path(path)?;
        let content = fs::read_to_string(path).await?;

        info!(
            "Loaded {} configuration file: {}",
            format.name(),
            path.display()
        );

        self.load_from_string(&content, format)
    }

    /// Load configuration from a string
    pub fn load_from_string(&self, content: &str, format: ConfigFormat) -> ConfigResult<Config> {
        let config: Config = match format {
            ConfigFormat::Toml => toml::from_str(content)?,
            ConfigFormat::Json => serde_json::from_str(content)?,
        };

        if self.validate {
            config.validate()?;
            debug!("Configuration validated successfully");
        }

        Ok(config)
    }

    /// Load configuration with environment variable overrides
    pub async fn load_with_overrides<P: AsRef<Path>>(&self, path: P) -> ConfigResult<Config> {
        let mut config = self.load_file(path).await?;
        self.apply_env_overrides(&mut config)?;
        Ok(config)
    }

    /// Apply `MODELPORT_*` environment variable overrides
    pub fn apply_env_overrides(&self, config: &mut Config) -> ConfigResult<()> {
        self.apply_overrides_from(config, |name| std::env::var(name).ok())
    }

    /// Apply overrides read through `lookup`, validating the result
    pub fn apply_overrides_from<F>(&self, config: &mut Config, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Import defaults
        if let Some(value) = lookup("MODELPORT_DEFAULT_COLOR") {
            config.import.default_color = value;
        }
        if let Some(value) = lookup("MODELPORT_DEFAULT_LINE_COLOR") {
            config.import.default_line_color = value;
        }

        // Loader settings
        if let Some(value) = lookup("MODELPORT_LOAD_TIMEOUT_SECS") {
            config.loader.timeout_secs = Some(value.parse().map_err(|_| {
                ConfigError::env_var_parsing_error(
                    "MODELPORT_LOAD_TIMEOUT_SECS",
                    &value,
                    "expected a whole number of seconds",
                )
            })?);
        }

        // Observability settings
        if let Some(value) = lookup("MODELPORT_LOG_LEVEL") {
            config.observability.log_level = value.to_lowercase();
        }
        if let Some(value) = lookup("MODELPORT_LOG_FORMAT") {
            config.observability.log_format = value.to_lowercase();
        }

        if self.validate {
            config.validate()?;
        }
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_format_detection() {
        assert_eq!(ConfigFormat::from_path("config.toml").unwrap(), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path("config.json").unwrap(), ConfigFormat::Json);
    }

    #[test]
    fn test_format_detection_error() {
        assert!(ConfigFormat::from_path("config.yaml").is_err());
        assert!(ConfigFormat::from_path("config").is_err());
    }

    #[test]
    fn test_parse_toml() {
        let loader = ConfigLoader::new();
        let toml = r##"
        [import]
        default_color = "#ff0000"

        [loader]
        timeout_secs = 15
        "##;
        let config = loader.load_from_string(toml, ConfigFormat::Toml).unwrap();
        assert_eq!(config.import.default_color, "#ff0000");
        assert_eq!(config.import.default_line_color, "#646464");
        assert_eq!(config.loader.timeout_secs, Some(15));
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_parse_json() {
        let loader = ConfigLoader::new();
        let json = r#"{"observability": {"log_format": "json"}}"#;
        let config = loader.load_from_string(json, ConfigFormat::Json).unwrap();
        assert_eq!(config.observability.log_format, "json");
        assert_eq!(config.loader.timeout_secs, None);
    }

    #[test]
    fn test_invalid_values_rejected_unless_disabled() {
        let json = r#"{"import": {"default_color": "red"}}"#;
        assert!(ConfigLoader::new()
            .load_from_string(json, ConfigFormat::Json)
            .is_err());
        assert!(ConfigLoader::without_validation()
            .load_from_string(json, ConfigFormat::Json)
            .is_ok());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("MODELPORT_DEFAULT_LINE_COLOR", "#010203"),
            ("MODELPORT_LOAD_TIMEOUT_SECS", "42"),
            ("MODELPORT_LOG_LEVEL", "DEBUG"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        ConfigLoader::new()
            .apply_overrides_from(&mut config, |name| vars.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.import.default_color, "#c8c8c8");
        assert_eq!(config.import.default_line_color, "#010203");
        assert_eq!(config.loader.timeout_secs, Some(42));
        assert_eq!(config.observability.log_level, "debug");
    }

    #[test]
    fn test_override_parse_error() {
        let mut config = Config::default();
        let result = ConfigLoader::new().apply_overrides_from(&mut config, |name| {
            (name == "MODELPORT_LOAD_TIMEOUT_SECS").then(|| "soon".to_string())
        });
        assert!(matches!(result, Err(ConfigError::EnvVarParsingError { .. })));
    }

    #[tokio::test]
    async fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("modelport.toml");
        tokio::fs::write(&path, "[observability]\nlog_level = \"warn\"\n")
            .await
            .unwrap();

        let config = ConfigLoader::new().load_file(&path).await.unwrap();
        assert_eq!(config.observability.log_level, "warn");

        let missing = ConfigLoader::new().load_file(dir.path().join("nope.toml")).await;
        assert!(matches!(missing, Err(ConfigError::FileNotFound(_))));
    }

    #[tokio::test]
    async fn test_load_or_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(dir.path().join("absent.toml")).await.unwrap();
        assert_eq!(config, Config::default());
    }
}
