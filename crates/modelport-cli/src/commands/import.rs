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

//! `modelport import`: run the import pipeline over files, URLs and archives.

use crate::output;
use crate::progress::ImportProgress;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use clap::Parser;
use dialoguer::{Input, Select};
use modelport_config::Config;
use modelport_import::{
    DefaultFileLoader, Direction, ImportError, ImportResult, ImportSettings, Importer, InputFile,
    MainFileChoice, MainFileSelector, ModelSummary, RgbColor,
};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Import a model and report what was built
#[derive(Parser, Debug)]
pub struct ImportCmd {
    /// Local files, including zip archives
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Remote files to download
    #[arg(long = "url", value_name = "URL")]
    pub urls: Vec<String>,

    /// Main file to use when several files are importable
    #[arg(long, value_name = "NAME", conflicts_with = "select")]
    pub main: Option<String>,

    /// Prompt for the main file when several files are importable
    #[arg(short, long)]
    pub select: bool,

    /// Prompt for files that supply missing dependencies and re-import
    #[arg(short, long, conflicts_with = "json")]
    pub interactive: bool,

    /// Seconds allowed for loading each file (overrides loader.timeout_secs)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ImportCmd {
    pub async fn execute(&self, config: &Config, quiet: bool) -> Result<()> {
        let inputs = self.inputs();
        if inputs.is_empty() {
            bail!("Nothing to import: pass at least one file or --url");
        }

        let settings = import_settings(config)?;
        let loader = DefaultFileLoader::with_user_agent(&config.loader.user_agent)
            .context("Failed to create HTTP client")?;
        let mut importer = Importer::with_loader(Box::new(loader));
        if let Some(timeout) = self.load_timeout(config)? {
            importer = importer.with_load_timeout(timeout);
        }

        let selector = self.selector();
        let progress = ImportProgress::new(quiet || self.json, selector.as_deref());

        let mut result = match importer.import_files(&inputs, &settings, &progress).await {
            Ok(result) => result,
            Err(error) => {
                if self.json {
                    println!("{}", serde_json::to_string_pretty(&ErrorReport::new(&error))?);
                }
                return Err(anyhow::Error::new(error).context("Import failed"));
            }
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&ImportReport::new(&result))?);
            return Ok(());
        }
        print_result(&result);

        // Files supplied here are merged into the previous file set.
        while self.interactive && !result.missing_files.is_empty() {
            let supplied = prompt_missing_files(&result.missing_files)?;
            if supplied.is_empty() {
                break;
            }
            result = importer
                .import_files(&supplied, &settings, &progress)
                .await
                .context("Re-import failed")?;
            print_result(&result);
        }
        Ok(())
    }

    fn inputs(&self) -> Vec<InputFile> {
        self.paths
            .iter()
            .map(|path| InputFile::from_path(path.clone()))
            .chain(self.urls.iter().map(InputFile::from_url))
            .collect()
    }

    fn load_timeout(&self, config: &Config) -> Result<Option<Duration>> {
        match self.timeout {
            Some(0) => bail!("--timeout must be greater than 0"),
            Some(secs) => Ok(Some(Duration::from_secs(secs))),
            None => Ok(config.loader.timeout()),
        }
    }

    fn selector(&self) -> Option<Box<dyn MainFileSelector>> {
        if let Some(name) = &self.main {
            Some(Box::new(NamedSelector { name: name.clone() }))
        } else if self.select {
            Some(Box::new(PromptSelector))
        } else {
            None
        }
    }
}

fn import_settings(config: &Config) -> Result<ImportSettings> {
    let default_color = RgbColor::from_hex(&config.import.default_color)
        .with_context(|| format!("Invalid import.default_color {}", config.import.default_color))?;
    let default_line_color = RgbColor::from_hex(&config.import.default_line_color)
        .with_context(|| {
            format!(
                "Invalid import.default_line_color {}",
                config.import.default_line_color
            )
        })?;
    Ok(ImportSettings {
        default_color,
        default_line_color,
    })
}

/// Ask for a local path per missing file; empty answers are skipped
fn prompt_missing_files(missing: &[String]) -> Result<Vec<InputFile>> {
    let mut supplied = Vec::new();
    for name in missing {
        let answer: String = Input::new()
            .with_prompt(format!("Path for {} (empty to skip)", name))
            .allow_empty(true)
            .interact_text()?;
        let answer = answer.trim();
        if !answer.is_empty() {
            supplied.push(InputFile::from_path(answer));
        }
    }
    Ok(supplied)
}

fn print_result(result: &ImportResult) {
    let summary = result.model.summary();
    output::success(&format!("Imported {}", result.main_file));
    output::detail("Up axis", &format!("{:?}", result.up_vector));
    output::detail("Meshes", &summary.meshes.to_string());
    output::detail("Vertices", &summary.vertices.to_string());
    output::detail("Triangles", &summary.triangles.to_string());
    output::detail("Lines", &summary.lines.to_string());
    output::detail("Materials", &summary.materials.to_string());

    if result.used_files.len() > 1 {
        output::header("Used files:");
        for name in &result.used_files {
            output::item(name);
        }
    }

    if !result.missing_files.is_empty() {
        output::warning(&format!(
            "{} referenced file(s) missing, supply them to complete the model:",
            result.missing_files.len()
        ));
        for name in &result.missing_files {
            output::item(name);
        }
    }
}

/// JSON shape of a successful import
#[derive(Debug, Serialize)]
struct ImportReport<'a> {
    main_file: &'a str,
    up_vector: Direction,
    summary: ModelSummary,
    materials: Vec<&'a str>,
    used_files: &'a [String],
    missing_files: &'a [String],
}

impl<'a> ImportReport<'a> {
    fn new(result: &'a ImportResult) -> Self {
        ImportReport {
            main_file: &result.main_file,
            up_vector: result.up_vector,
            summary: result.model.summary(),
            materials: result
                .model
                .materials()
                .iter()
                .map(|material| material.name.as_str())
                .collect(),
            used_files: &result.used_files,
            missing_files: &result.missing_files,
        }
    }
}

/// JSON shape of a failed import
#[derive(Debug, Serialize)]
struct ErrorReport<'a> {
    error: &'static str,
    main_file: Option<&'a str>,
    message: Option<&'a str>,
}

impl<'a> ErrorReport<'a> {
    fn new(error: &'a ImportError) -> Self {
        ErrorReport {
            error: error.code.as_str(),
            main_file: error.main_file.as_deref(),
            message: error.message.as_deref(),
        }
    }
}

/// Picks the candidate whose name matches, ignoring case
struct NamedSelector {
    name: String,
}

#[async_trait(?Send)]
impl MainFileSelector for NamedSelector {
    async fn select_main_file(&self, candidates: &[String]) -> MainFileChoice {
        match candidates
            .iter()
            .position(|candidate| candidate.eq_ignore_ascii_case(&self.name))
        {
            Some(index) => MainFileChoice::Index(index),
            None => {
                output::warning(&format!(
                    "{} is not an importable file; candidates are: {}",
                    self.name,
                    candidates.join(", ")
                ));
                MainFileChoice::Cancel
            }
        }
    }
}

/// Asks on the terminal; escape cancels
struct PromptSelector;

#[async_trait(?Send)]
impl MainFileSelector for PromptSelector {
    async fn select_main_file(&self, candidates: &[String]) -> MainFileChoice {
        let items = candidates.to_vec();
        let answer = tokio::task::spawn_blocking(move || {
            Select::new()
                .with_prompt("Several model files found, choose the main file")
                .items(&items)
                .default(0)
                .interact_opt()
        })
        .await;

        match answer {
            Ok(Ok(Some(index))) => MainFileChoice::Index(index),
            Ok(Ok(None)) => MainFileChoice::Cancel,
            Ok(Err(e)) => {
                warn!("Main file prompt failed: {}", e);
                MainFileChoice::Cancel
            }
            Err(e) => {
                warn!("Main file prompt task failed: {}", e);
                MainFileChoice::Cancel
            }
        }
    }
}
