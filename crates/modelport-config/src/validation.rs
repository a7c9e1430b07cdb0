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

//! Configuration validation

use crate::error::{ConfigError, ConfigResult};
use crate::schema::*;

/// Validator for configuration settings
pub trait Validator {
    /// Check every field, returning the first violation
    fn validate(&self) -> ConfigResult<()>;
}

impl Validator for Config {
    fn validate(&self) -> ConfigResult<()> {
        self.import.validate()?;
        self.loader.validate()?;
        self.observability.validate()?;
        Ok(())
    }
}

impl Validator for ImportDefaults {
    fn validate(&self) -> ConfigResult<()> {
        validate_hex_color("import.default_color", &self.default_color)?;
        validate_hex_color("import.default_line_color", &self.default_line_color)?;
        Ok(())
    }
}

impl Validator for LoaderConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.timeout_secs == Some(0) {
            return Err(ConfigError::invalid_value(
                "loader.timeout_secs",
                "must be greater than 0 when set",
            ));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "loader.user_agent",
                "must not be empty",
            ));
        }
        Ok(())
    }
}

impl Validator for ObservabilityConfig {
    fn validate(&self) -> ConfigResult<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(ConfigError::invalid_value(
                "observability.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["pretty", "compact", "json"];
        if !valid_formats.contains(&self.log_format.as_str()) {
            return Err(ConfigError::invalid_value(
                "observability.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        Ok(())
    }
}

/// Whether `value` has the form `#rrggbb`
pub fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

fn validate_hex_color(field: &str, value: &str) -> ConfigResult<()> {
    if is_hex_color(value) {
        Ok(())
    } else {
        Err(ConfigError::invalid_value(
            field,
            format!("must be a #rrggbb color, got {}", value),
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_color_validation() {
        let mut config = Config::default();
        config.import.default_color = "c8c8c8".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "import.default_color"
        ));

        config.import.default_color = "#C8c8Zz".to_string();
        assert!(config.validate().is_err());

        config.import.default_color = "#A0B1C2".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_timeout_validation() {
        let mut config = Config::default();
        config.loader.timeout_secs = Some(0);
        assert!(config.validate().is_err());
        config.loader.timeout_secs = Some(30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_log_level_validation() {
        let mut config = Config::default();
        config.observability.log_level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_log_format_validation() {
        let mut config = Config::default();
        config.observability.log_format = "xml".to_string();
        assert!(config.validate().is_err());
        config.observability.log_format = "json".to_string();
        assert!(config.validate().is_ok());
    }
}
