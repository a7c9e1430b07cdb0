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

//! Ordered, name-unique collection of files taking part in an import
//!
//! Names compare case-insensitively on their base name. Content is loaded
//! lazily through a [`FileLoader`]; one file failing to load never fails the
//! batch.

use crate::error::LoadError;
use crate::file::{FileSource, ImporterFile, InputFile};
use crate::loader::FileLoader;
use crate::scheduler::run_sequential;
use bytes::Bytes;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Progress notifications emitted while loading file content
pub trait LoadProgress {
    /// About to load file `index` of `total`
    fn on_file_list_progress(&self, _index: usize, _total: usize) {}

    /// Bytes received for the file currently loading
    fn on_file_load_progress(&self, _loaded: u64, _total: u64) {}
}

/// [`LoadProgress`] that ignores every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl LoadProgress for NoProgress {}

/// Ordered collection of [`ImporterFile`]s, unique by case-insensitive name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImporterFileList {
    files: Vec<ImporterFile>,
}

impl ImporterFileList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from submitted inputs
    pub fn from_input_files(inputs: &[InputFile]) -> Self {
        let mut list = Self::new();
        list.fill_from_input_files(inputs);
        list
    }

    /// Replace the contents with wrappers around `inputs`
    pub fn fill_from_input_files(&mut self, inputs: &[InputFile]) {
        self.files.clear();
        for input in inputs {
            let file = ImporterFile::from_input(input);
            if !self.add_file(file) {
                debug!("Skipping duplicate input: {}", input.name);
            }
        }
    }

    /// Append every file of `other` whose name is not present yet. Existing
    /// entries are never replaced.
    pub fn extend_from_file_list(&mut self, other: ImporterFileList) {
        for file in other.files {
            let name = file.name().to_string();
            if !self.add_file(file) {
                debug!("Keeping existing entry for {}", name);
            }
        }
    }

    /// Append `file` unless a file with the same name exists
    pub fn add_file(&mut self, file: ImporterFile) -> bool {
        if self.contains_file_by_path(file.name()) {
            return false;
        }
        self.files.push(file);
        true
    }

    /// Files in insertion order
    pub fn files(&self) -> &[ImporterFile] {
        &self.files
    }

    /// Number of files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the list has no files
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Whether a file matches the base name of `path`, ignoring case
    pub fn contains_file_by_path(&self, path: &str) -> bool {
        self.find_file_by_path(path).is_some()
    }

    /// File matching the base name of `path`, ignoring case
    pub fn find_file_by_path(&self, path: &str) -> Option<&ImporterFile> {
        self.files.iter().find(|file| file.matches_path(path))
    }

    /// True when the list is non-empty and no file comes from a local handle
    pub fn is_only_url_source(&self) -> bool {
        !self.files.is_empty()
            && self
                .files
                .iter()
                .all(|file| matches!(file.source(), FileSource::Url | FileSource::Decompressed))
    }

    /// Load content for every file that has none, one file at a time in list
    /// order. Failures are logged and leave the file without content.
    ///
    /// Returns the number of files that failed to load.
    #[instrument(skip_all, fields(files = self.files.len()))]
    pub async fn load_content(
        &mut self,
        loader: &dyn FileLoader,
        progress: &dyn LoadProgress,
        timeout: Option<Duration>,
    ) -> usize {
        let files = &self.files;

        // Every task has been awaited once run_sequential returns.
        let outcomes = run_sequential(
            files.len(),
            |index, total| progress.on_file_list_progress(index, total),
            |index| async move {
                let file = &files[index];
                if file.has_content() {
                    None
                } else {
                    Some(load_file(loader, file, progress, timeout).await)
                }
            },
        )
        .await;

        let mut failed = 0;
        for (file, outcome) in self.files.iter_mut().zip(outcomes) {
            match outcome {
                Some(Ok(content)) => {
                    debug!("Loaded {} ({} bytes)", file.name(), content.len());
                    file.set_content(content);
                }
                Some(Err(e)) => {
                    warn!("Failed to load {}: {}", file.name(), e);
                    failed += 1;
                }
                None => {}
            }
        }

        info!(
            "Content loading finished: {} files, {} failed",
            self.files.len(),
            failed
        );
        failed
    }
}

async fn load_file(
    loader: &dyn FileLoader,
    file: &ImporterFile,
    progress: &dyn LoadProgress,
    timeout: Option<Duration>,
) -> Result<Bytes, LoadError> {
    let on_bytes = |loaded: u64, total: u64| progress.on_file_load_progress(loaded, total);
    let load = loader.load(file, &on_bytes);
    match timeout {
        Some(limit) => tokio::time::timeout(limit, load)
            .await
            .map_err(|_| LoadError::Timeout(limit))?,
        None => load.await,
    }
}
