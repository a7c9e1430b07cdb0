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

mod commands;
mod output;
mod progress;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use commands::*;
use modelport_config::{Config, ConfigLoader};
use modelport_observability::{init_tracing, LogFormat};
use std::io;
use std::path::{Path, PathBuf};

/// Configuration file picked up from the working directory
const DEFAULT_CONFIG_FILE: &str = "modelport.toml";

#[derive(Parser)]
#[command(name = "modelport")]
#[command(version, about = "Import 3D models from loose files, URLs and archives")]
#[command(
    long_about = "ModelPort gathers the files that make up a 3D model, expands archives,
picks the main model file and converts it into a single in-memory model."
)]
#[command(propagate_version = true)]
#[command(author = "ModelPort Contributors")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress progress and log output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Colored output (always|auto|never)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Configuration file (TOML or JSON)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a model from files, URLs or archives
    Import(ImportCmd),

    /// List the registered format importers
    Formats(FormatsCmd),

    /// Show the effective configuration
    Config(ConfigCmd),

    /// Show version information
    Version,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.color.as_str() {
        "never" => console::set_colors_enabled(false),
        "always" => console::set_colors_enabled(true),
        "auto" => {}
        _ => {
            eprintln!("Invalid color option: {}", cli.color);
            std::process::exit(1);
        }
    }

    let result = run(cli).await;

    if let Err(e) = result {
        output::error(&format!("Error: {:#}", e));
        std::process::exit(1);
    }

    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref()).await?;

    if !cli.quiet {
        let level = if cli.verbose {
            "debug"
        } else {
            config.observability.log_level.as_str()
        };
        let format: LogFormat = config.observability.log_format.parse()?;
        // A subscriber installed earlier in the process wins.
        init_tracing(format, Some(level)).ok();
    }

    match cli.command {
        Commands::Import(cmd) => cmd.execute(&config, cli.quiet).await,
        Commands::Formats(cmd) => cmd.execute(),
        Commands::Config(cmd) => cmd.execute(&config),
        Commands::Version => {
            print_version();
            Ok(())
        }
        Commands::Completions { shell } => {
            generate_completions(shell);
            Ok(())
        }
    }
}

/// Explicit `--config` must exist; the implicit file is optional. Environment
/// overrides apply either way.
async fn load_config(path: Option<&Path>) -> Result<Config> {
    let loader = ConfigLoader::new();
    match path {
        Some(path) => loader
            .load_with_overrides(path)
            .await
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => {
            let mut config = Config::load_or_default(DEFAULT_CONFIG_FILE)
                .await
                .context("Failed to load modelport.toml")?;
            loader
                .apply_env_overrides(&mut config)
                .context("Invalid MODELPORT_* environment override")?;
            Ok(config)
        }
    }
}

fn print_version() {
    println!("modelport {}", env!("CARGO_PKG_VERSION"));
    println!("rust-version: {}", env!("CARGO_PKG_RUST_VERSION"));
    println!("license: {}", env!("CARGO_PKG_LICENSE"));
}

fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "modelport", &mut io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_import_arguments() {
        let cli = Cli::parse_from([
            "modelport",
            "--quiet",
            "import",
            "model.obj",
            "model.mtl",
            "--url",
            "https://example.com/wood.jpg",
            "--json",
        ]);
        assert!(cli.quiet);
        match cli.command {
            Commands::Import(cmd) => {
                assert_eq!(cmd.paths.len(), 2);
                assert_eq!(cmd.urls, vec!["https://example.com/wood.jpg".to_string()]);
                assert!(cmd.json);
            }
            _ => panic!("expected import command"),
        }
    }
}
