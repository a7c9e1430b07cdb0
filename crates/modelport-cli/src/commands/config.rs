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

use anyhow::Result;
use clap::Parser;
use modelport_config::Config;

/// Print the configuration after file and environment overrides
#[derive(Parser, Debug)]
pub struct ConfigCmd {
    /// Print as JSON instead of TOML
    #[arg(long)]
    pub json: bool,
}

impl ConfigCmd {
    pub fn execute(&self, config: &Config) -> Result<()> {
        println!("{}", self.render(config)?);
        Ok(())
    }

    fn render(&self, config: &Config) -> Result<String> {
        if self.json {
            Ok(serde_json::to_string_pretty(config)?)
        } else {
            Ok(config.to_toml()?)
        }
    }
}
