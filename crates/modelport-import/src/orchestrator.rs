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

//! Import orchestration
//!
//! [`Importer::import_files`] drives one import through a fixed sequence of
//! awaited stages:
//!
//! ```text
//! Idle -> LoadingFiles -> DecompressingArchives -> (SelectingMainFile)
//!      -> Importing -> Succeeded | Failed -> Complete
//! ```
//!
//! The importer keeps its file list between calls. A follow-up call that only
//! supplies files the previous import reported missing is merged into the
//! existing list instead of starting over.

use crate::archive::{decompress, is_archive_extension};
use crate::error::{ImportError, ImportErrorCode};
use crate::file::{ImporterFile, InputFile};
use crate::file_list::{ImporterFileList, LoadProgress, NoProgress};
use crate::finalize::ImportSettings;
use crate::importer::{ImportContext, ImporterRegistry};
use crate::loader::{DefaultFileLoader, FileLoader};
use crate::model::{Direction, Model};
use crate::resolver::DependencyResolver;
use crate::scheduler::{defer, next_turn};
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Stage of the import currently in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportState {
    /// No import has started
    Idle,
    /// Reconciling inputs and loading file content
    LoadingFiles,
    /// Expanding zip archives into file entries
    DecompressingArchives,
    /// Waiting for the caller to pick among several importable files
    SelectingMainFile,
    /// Running the format importer
    Importing,
    /// The last import produced a model
    Succeeded,
    /// The last import failed
    Failed,
    /// Callbacks for the last import have been delivered
    Complete,
}

impl fmt::Display for ImportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImportState::Idle => "idle",
            ImportState::LoadingFiles => "loading_files",
            ImportState::DecompressingArchives => "decompressing_archives",
            ImportState::SelectingMainFile => "selecting_main_file",
            ImportState::Importing => "importing",
            ImportState::Succeeded => "succeeded",
            ImportState::Failed => "failed",
            ImportState::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// Answer of a [`MainFileSelector`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainFileChoice {
    /// Import the candidate at this position
    Index(usize),
    /// Abort the import
    Cancel,
}

/// Picks the main file when several files are importable
#[async_trait(?Send)]
pub trait MainFileSelector {
    /// Choose one of `candidates`, in file-list order
    async fn select_main_file(&self, candidates: &[String]) -> MainFileChoice;
}

/// Notifications emitted by [`Importer::import_files`]
pub trait ImportCallbacks: LoadProgress {
    /// Content loading is about to start
    fn on_load_start(&self) {}

    /// Loading finished; archive expansion and parsing follow
    fn on_import_start(&self) {}

    /// Selector consulted when more than one file is importable. Without one
    /// the first importable file wins.
    fn main_file_selector(&self) -> Option<&dyn MainFileSelector> {
        None
    }

    /// The import produced a model
    fn on_import_success(&self, _result: &ImportResult) {}

    /// The import failed
    fn on_import_error(&self, _error: &ImportError) {}
}

impl ImportCallbacks for NoProgress {}

/// Outcome of a successful import
#[derive(Debug, Clone, PartialEq)]
pub struct ImportResult {
    /// Finalized model
    pub model: Model,
    /// Name of the file the model was parsed from
    pub main_file: String,
    /// Axis the source format treats as up
    pub up_vector: Direction,
    /// Files read during the import; the main file comes first
    pub used_files: Vec<String>,
    /// Files requested by the importer but not available
    pub missing_files: Vec<String>,
}

/// Top-level import driver
///
/// At most one import may run at a time; `import_files` takes `&mut self`.
pub struct Importer {
    registry: ImporterRegistry,
    loader: Box<dyn FileLoader>,
    file_list: ImporterFileList,
    missing_files: Vec<String>,
    state: ImportState,
    load_timeout: Option<Duration>,
}

impl Default for Importer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Importer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Importer")
            .field("registry", &self.registry)
            .field("loader", &self.loader)
            .field("files", &self.file_list.len())
            .field("missing_files", &self.missing_files)
            .field("state", &self.state)
            .field("load_timeout", &self.load_timeout)
            .finish()
    }
}

impl Importer {
    /// Importer with the built-in formats and the network/filesystem loader
    pub fn new() -> Self {
        Self::with_registry(
            ImporterRegistry::with_defaults(),
            Box::new(DefaultFileLoader::new()),
        )
    }

    /// Importer over a custom registry and loader
    pub fn with_registry(registry: ImporterRegistry, loader: Box<dyn FileLoader>) -> Self {
        Importer {
            registry,
            loader,
            file_list: ImporterFileList::new(),
            missing_files: Vec::new(),
            state: ImportState::Idle,
            load_timeout: None,
        }
    }

    /// Importer with the built-in formats and a custom loader
    pub fn with_loader(loader: Box<dyn FileLoader>) -> Self {
        Self::with_registry(ImporterRegistry::with_defaults(), loader)
    }

    /// Fail any single file load that takes longer than `timeout`
    pub fn with_load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = Some(timeout);
        self
    }

    /// Registered format importers
    pub fn registry(&self) -> &ImporterRegistry {
        &self.registry
    }

    /// Registered format importers, for adding formats
    pub fn registry_mut(&mut self) -> &mut ImporterRegistry {
        &mut self.registry
    }

    /// Current stage
    pub fn state(&self) -> ImportState {
        self.state
    }

    /// Files taking part in the current or last import
    pub fn file_list(&self) -> &ImporterFileList {
        &self.file_list
    }

    /// Files the last import requested but could not find
    pub fn missing_files(&self) -> &[String] {
        &self.missing_files
    }

    fn transition(&mut self, state: ImportState) {
        debug!("Import state {} -> {}", self.state, state);
        self.state = state;
    }

    /// Run a complete import of `inputs`
    ///
    /// The outcome is reported both through `callbacks` and the return value.
    #[instrument(skip_all, fields(inputs = inputs.len()))]
    pub async fn import_files(
        &mut self,
        inputs: &[InputFile],
        settings: &ImportSettings,
        callbacks: &dyn ImportCallbacks,
    ) -> Result<ImportResult, ImportError> {
        callbacks.on_load_start();
        self.load_files(inputs, callbacks).await;

        callbacks.on_import_start();
        next_turn().await;
        self.decompress_archives();

        let outcome = self.import_loaded_files(settings, callbacks).await;
        match &outcome {
            Ok(result) => {
                self.transition(ImportState::Succeeded);
                info!(
                    "Imported {} ({} used, {} missing)",
                    result.main_file,
                    result.used_files.len(),
                    result.missing_files.len()
                );
                callbacks.on_import_success(result);
            }
            Err(error) => {
                self.transition(ImportState::Failed);
                warn!("Import failed: {}", error);
                callbacks.on_import_error(error);
            }
        }
        self.transition(ImportState::Complete);
        outcome
    }

    /// Reconcile `inputs` with the current file list, then load content
    async fn load_files(&mut self, inputs: &[InputFile], progress: &dyn LoadProgress) {
        self.transition(ImportState::LoadingFiles);

        let candidate = ImporterFileList::from_input_files(inputs);
        let has_importable = candidate
            .files()
            .iter()
            .any(|file| self.registry.can_import(file));
        let supplies_missing = self
            .missing_files
            .iter()
            .any(|name| candidate.contains_file_by_path(name));

        if has_importable || !supplies_missing {
            debug!("Starting a new file set with {} files", candidate.len());
            self.file_list = candidate;
        } else {
            info!(
                "Adding {} files to the previous file set as missing dependencies",
                candidate.len()
            );
            self.file_list.extend_from_file_list(candidate);
        }

        let failed = self
            .file_list
            .load_content(self.loader.as_ref(), progress, self.load_timeout)
            .await;
        if failed > 0 {
            warn!("{} files could not be loaded", failed);
        }
    }

    /// Append the entries of every loaded zip archive to the file list
    fn decompress_archives(&mut self) {
        self.transition(ImportState::DecompressingArchives);

        let archives: Vec<_> = self
            .file_list
            .files()
            .iter()
            .filter(|file| is_archive_extension(file.extension()))
            .filter_map(|file| file.content().map(|content| (file.name().to_string(), content.clone())))
            .collect();

        for (name, content) in archives {
            match decompress(&content) {
                Ok(entries) => {
                    debug!("Expanded {} into {} entries", name, entries.len());
                    for entry in entries {
                        let file = ImporterFile::decompressed(&entry.path, entry.content);
                        if !self.file_list.add_file(file) {
                            debug!("Archive entry {} shadowed by an existing file", entry.path);
                        }
                    }
                }
                Err(e) => warn!("Failed to decompress {}: {}", name, e),
            }
        }
    }

    /// Pick the main file and run its importer
    async fn import_loaded_files(
        &mut self,
        settings: &ImportSettings,
        callbacks: &dyn ImportCallbacks,
    ) -> Result<ImportResult, ImportError> {
        let candidates: Vec<(usize, usize)> = self
            .file_list
            .files()
            .iter()
            .enumerate()
            .filter(|(_, file)| !is_archive_extension(file.extension()))
            .filter_map(|(file_index, file)| {
                self.registry
                    .find_index(file.extension())
                    .map(|importer_index| (file_index, importer_index))
            })
            .collect();

        if candidates.is_empty() {
            return Err(ImportError::new(ImportErrorCode::NoImportableFile));
        }

        let selector = callbacks.main_file_selector();
        let chosen = match selector {
            Some(selector) if candidates.len() > 1 => {
                self.transition(ImportState::SelectingMainFile);
                let names: Vec<String> = candidates
                    .iter()
                    .map(|(file_index, _)| self.file_list.files()[*file_index].name().to_string())
                    .collect();
                match selector.select_main_file(&names).await {
                    MainFileChoice::Index(index) if index < candidates.len() => index,
                    MainFileChoice::Index(index) => {
                        warn!(
                            "Selected main file {} out of {} candidates, cancelling",
                            index,
                            candidates.len()
                        );
                        return Err(ImportError::new(ImportErrorCode::NoImportableFile));
                    }
                    MainFileChoice::Cancel => {
                        info!("Main file selection cancelled");
                        return Err(ImportError::new(ImportErrorCode::NoImportableFile));
                    }
                }
            }
            _ => 0,
        };

        let (file_index, importer_index) = candidates[chosen];
        defer(|| self.import_loaded_main_file(file_index, importer_index, settings)).await
    }

    fn import_loaded_main_file(
        &mut self,
        file_index: usize,
        importer_index: usize,
        settings: &ImportSettings,
    ) -> Result<ImportResult, ImportError> {
        self.transition(ImportState::Importing);

        let file = &self.file_list.files()[file_index];
        let main_file = file.name().to_string();
        let extension = file.extension().to_string();
        let Some(content) = file.content().cloned() else {
            return Err(ImportError::new(ImportErrorCode::FailedToLoadFile).with_main_file(main_file));
        };

        self.missing_files.clear();
        let Some(importer) = self.registry.get_mut(importer_index) else {
            return Err(ImportError::new(ImportErrorCode::UnknownError).with_main_file(main_file));
        };
        info!("Importing {} with the {} importer", main_file, importer.name());

        let mut resolver = DependencyResolver::for_file_list(&self.file_list, &main_file);
        let outcome = {
            let mut ctx = ImportContext::new(*settings, &mut resolver);
            importer.import(&main_file, &extension, &content, &mut ctx)
        };
        let parsed = match outcome {
            Ok(()) => importer
                .take_model()
                .map(|model| (model, importer.up_direction()))
                .ok_or_else(|| "The importer produced no model.".to_string()),
            Err(error) => Err(importer.error_message().unwrap_or(error.message)),
        };
        importer.clear();

        let (used_files, missing_files) = resolver.into_files();
        self.missing_files = missing_files.clone();

        match parsed {
            Ok((model, up_vector)) => Ok(ImportResult {
                model,
                main_file,
                up_vector,
                used_files,
                missing_files,
            }),
            Err(message) => Err(ImportError::new(ImportErrorCode::ImportFailed)
                .with_main_file(main_file)
                .with_message(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ImporterError;
    use crate::importer::FormatImporter;
    use crate::loader::MemoryLoader;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    const TRIANGLE: &[u8] = b"v 0 0 0\nv 1 0 0\nv 1 1 0\nf 1 2 3\n";

    #[derive(Default)]
    struct RecordingCallbacks {
        events: RefCell<Vec<String>>,
        selector: Option<FixedSelector>,
    }

    impl LoadProgress for RecordingCallbacks {
        fn on_file_list_progress(&self, index: usize, total: usize) {
            self.events.borrow_mut().push(format!("progress {}/{}", index, total));
        }
    }

    impl ImportCallbacks for RecordingCallbacks {
        fn on_load_start(&self) {
            self.events.borrow_mut().push("load_start".into());
        }
        fn on_import_start(&self) {
            self.events.borrow_mut().push("import_start".into());
        }
        fn main_file_selector(&self) -> Option<&dyn MainFileSelector> {
            self.selector.as_ref().map(|s| s as &dyn MainFileSelector)
        }
        fn on_import_success(&self, result: &ImportResult) {
            self.events.borrow_mut().push(format!("success {}", result.main_file));
        }
        fn on_import_error(&self, error: &ImportError) {
            self.events.borrow_mut().push(format!("error {}", error.code));
        }
    }

    struct FixedSelector {
        choice: MainFileChoice,
        offered: RefCell<Vec<String>>,
    }

    impl FixedSelector {
        fn new(choice: MainFileChoice) -> Self {
            FixedSelector {
                choice,
                offered: RefCell::new(Vec::new()),
            }
        }
    }

    #[async_trait(?Send)]
    impl MainFileSelector for FixedSelector {
        async fn select_main_file(&self, candidates: &[String]) -> MainFileChoice {
            *self.offered.borrow_mut() = candidates.to_vec();
            self.choice
        }
    }

    #[derive(Debug)]
    struct CountingImporter {
        clears: Rc<Cell<usize>>,
        clears_before_parse: Rc<Cell<usize>>,
        fail: bool,
    }

    impl FormatImporter for CountingImporter {
        fn name(&self) -> &'static str {
            "counting"
        }
        fn can_import_extension(&self, extension: &str) -> bool {
            extension == "cnt"
        }
        fn up_direction(&self) -> Direction {
            Direction::Z
        }
        fn parse(
            &mut self,
            _name: &str,
            _extension: &str,
            _content: &[u8],
            _ctx: &mut ImportContext<'_, '_>,
        ) -> Result<(), ImporterError> {
            self.clears_before_parse.set(self.clears.get());
            if self.fail {
                Err(ImporterError::new("broken"))
            } else {
                Ok(())
            }
        }
        fn take_model(&mut self) -> Option<Model> {
            Some(Model::new())
        }
        fn error_message(&self) -> Option<String> {
            self.fail.then(|| "broken file".to_string())
        }
        fn clear(&mut self) {
            self.clears.set(self.clears.get() + 1);
        }
    }

    fn memory_importer(loader: MemoryLoader) -> Importer {
        Importer::with_loader(Box::new(loader))
    }

    #[tokio::test]
    async fn test_single_obj_succeeds() {
        let mut importer = memory_importer(MemoryLoader::new().with_file("tri.obj", TRIANGLE));
        let callbacks = RecordingCallbacks::default();

        let result = importer
            .import_files(
                &[InputFile::from_url("https://host/tri.obj")],
                &ImportSettings::default(),
                &callbacks,
            )
            .await
            .unwrap();

        assert_eq!(result.main_file, "tri.obj");
        assert_eq!(result.up_vector, Direction::Y);
        assert_eq!(result.used_files, vec!["tri.obj"]);
        assert!(result.missing_files.is_empty());
        assert_eq!(importer.state(), ImportState::Complete);
        assert_eq!(
            callbacks.events.into_inner(),
            vec!["load_start", "progress 0/1", "import_start", "success tri.obj"]
        );
    }

    #[tokio::test]
    async fn test_no_importable_file() {
        let mut importer = memory_importer(MemoryLoader::new());
        let callbacks = RecordingCallbacks::default();

        let error = importer
            .import_files(
                &[InputFile::from_bytes("notes.txt", &b"hello"[..])],
                &ImportSettings::default(),
                &callbacks,
            )
            .await
            .unwrap_err();

        assert_eq!(error, ImportError::new(ImportErrorCode::NoImportableFile));
        assert_eq!(callbacks.events.borrow().last().map(String::as_str), Some("error no_importable_file"));
    }

    #[tokio::test]
    async fn test_main_file_without_content() {
        let mut importer = memory_importer(MemoryLoader::new());
        let error = importer
            .import_files(
                &[InputFile::from_url("https://host/gone.obj")],
                &ImportSettings::default(),
                &NoProgress,
            )
            .await
            .unwrap_err();

        assert_eq!(error.code, ImportErrorCode::FailedToLoadFile);
        assert_eq!(error.main_file.as_deref(), Some("gone.obj"));
    }

    #[tokio::test]
    async fn test_parse_failure_is_import_failed() {
        let mut importer =
            memory_importer(MemoryLoader::new().with_file("bad.obj", &b"v 0 0 0\nf 1 2 3\n"[..]));
        let error = importer
            .import_files(
                &[InputFile::from_url("https://host/bad.obj")],
                &ImportSettings::default(),
                &NoProgress,
            )
            .await
            .unwrap_err();

        assert_eq!(error.code, ImportErrorCode::ImportFailed);
        assert_eq!(error.main_file.as_deref(), Some("bad.obj"));
        assert_eq!(error.message.as_deref(), Some("Invalid vertex index."));
    }

    fn counting_importer(fail: bool) -> (Importer, Rc<Cell<usize>>, Rc<Cell<usize>>) {
        let clears = Rc::new(Cell::new(0));
        let clears_before_parse = Rc::new(Cell::new(0));
        let mut registry = ImporterRegistry::new();
        registry.register(Box::new(CountingImporter {
            clears: Rc::clone(&clears),
            clears_before_parse: Rc::clone(&clears_before_parse),
            fail,
        }));
        let importer = Importer::with_registry(registry, Box::new(MemoryLoader::new()));
        (importer, clears, clears_before_parse)
    }

    #[tokio::test]
    async fn test_importer_reset_before_parse_and_cleared_after() {
        let inputs = [InputFile::from_bytes("a.cnt", &b"x"[..])];

        let (mut importer, clears, clears_before_parse) = counting_importer(false);
        let result = importer
            .import_files(&inputs, &ImportSettings::default(), &NoProgress)
            .await
            .unwrap();
        assert_eq!(result.up_vector, Direction::Z);
        assert_eq!(clears_before_parse.get(), 1);
        assert_eq!(clears.get(), 2);

        let (mut importer, clears, clears_before_parse) = counting_importer(true);
        let error = importer
            .import_files(&inputs, &ImportSettings::default(), &NoProgress)
            .await
            .unwrap_err();
        assert_eq!(error.message.as_deref(), Some("broken file"));
        assert_eq!(clears_before_parse.get(), 1);
        assert_eq!(clears.get(), 2);
    }

    fn two_models() -> Vec<InputFile> {
        vec![
            InputFile::from_bytes("first.obj", TRIANGLE),
            InputFile::from_bytes("second.obj", TRIANGLE),
        ]
    }

    #[tokio::test]
    async fn test_without_selector_first_candidate_wins() {
        let mut importer = memory_importer(MemoryLoader::new());
        let result = importer
            .import_files(&two_models(), &ImportSettings::default(), &NoProgress)
            .await
            .unwrap();
        assert_eq!(result.main_file, "first.obj");
    }

    #[tokio::test]
    async fn test_selector_picks_candidate() {
        let mut importer = memory_importer(MemoryLoader::new());
        let callbacks = RecordingCallbacks {
            selector: Some(FixedSelector::new(MainFileChoice::Index(1))),
            ..Default::default()
        };

        let result = importer
            .import_files(&two_models(), &ImportSettings::default(), &callbacks)
            .await
            .unwrap();

        assert_eq!(result.main_file, "second.obj");
        let offered = callbacks.selector.as_ref().map(|s| s.offered.borrow().clone());
        assert_eq!(offered, Some(vec!["first.obj".to_string(), "second.obj".to_string()]));
    }

    #[tokio::test]
    async fn test_selector_cancel_and_out_of_range() {
        for choice in [MainFileChoice::Cancel, MainFileChoice::Index(7)] {
            let mut importer = memory_importer(MemoryLoader::new());
            let callbacks = RecordingCallbacks {
                selector: Some(FixedSelector::new(choice)),
                ..Default::default()
            };
            let error = importer
                .import_files(&two_models(), &ImportSettings::default(), &callbacks)
                .await
                .unwrap_err();
            assert_eq!(error.code, ImportErrorCode::NoImportableFile);
        }
    }

    #[tokio::test]
    async fn test_selector_skipped_for_single_candidate() {
        let mut importer = memory_importer(MemoryLoader::new());
        let callbacks = RecordingCallbacks {
            selector: Some(FixedSelector::new(MainFileChoice::Cancel)),
            ..Default::default()
        };
        let result = importer
            .import_files(
                &[InputFile::from_bytes("only.obj", TRIANGLE)],
                &ImportSettings::default(),
                &callbacks,
            )
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_supplying_missing_files_merges() {
        let mut importer = memory_importer(MemoryLoader::new());
        let main = b"mtllib cube.mtl\nv 0 0 0\nv 1 0 0\nv 1 1 0\nusemtl red\nf 1 2 3\n";

        let first = importer
            .import_files(
                &[InputFile::from_bytes("cube.obj", &main[..])],
                &ImportSettings::default(),
                &NoProgress,
            )
            .await
            .unwrap();
        assert_eq!(first.missing_files, vec!["cube.mtl"]);
        assert_eq!(importer.missing_files(), ["cube.mtl"]);

        let second = importer
            .import_files(
                &[InputFile::from_bytes("cube.mtl", &b"newmtl red\nKd 1 0 0\n"[..])],
                &ImportSettings::default(),
                &NoProgress,
            )
            .await
            .unwrap();

        assert_eq!(importer.file_list().len(), 2);
        assert_eq!(second.main_file, "cube.obj");
        assert_eq!(second.used_files, vec!["cube.obj", "cube.mtl"]);
        assert!(second.missing_files.is_empty());
        assert_eq!(second.model.materials()[0].name, "red");
    }

    #[tokio::test]
    async fn test_new_importable_file_replaces_list() {
        let mut importer = memory_importer(MemoryLoader::new());
        importer
            .import_files(
                &[InputFile::from_bytes("a.obj", &b"mtllib a.mtl\nv 0 0 0\nv 1 0 0\nv 1 1 0\nf 1 2 3\n"[..])],
                &ImportSettings::default(),
                &NoProgress,
            )
            .await
            .unwrap();

        let result = importer
            .import_files(
                &[
                    InputFile::from_bytes("b.obj", TRIANGLE),
                    InputFile::from_bytes("a.mtl", &b"newmtl m\n"[..]),
                ],
                &ImportSettings::default(),
                &NoProgress,
            )
            .await
            .unwrap();

        assert_eq!(result.main_file, "b.obj");
        assert!(!importer.file_list().contains_file_by_path("a.obj"));
    }

    #[tokio::test]
    async fn test_unrelated_files_replace_list() {
        let mut importer = memory_importer(MemoryLoader::new());
        importer
            .import_files(
                &[InputFile::from_bytes("a.obj", TRIANGLE)],
                &ImportSettings::default(),
                &NoProgress,
            )
            .await
            .unwrap();

        let error = importer
            .import_files(
                &[InputFile::from_bytes("readme.txt", &b"text"[..])],
                &ImportSettings::default(),
                &NoProgress,
            )
            .await
            .unwrap_err();

        assert_eq!(error.code, ImportErrorCode::NoImportableFile);
        assert_eq!(importer.file_list().len(), 1);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(ImportState::SelectingMainFile.to_string(), "selecting_main_file");
        assert_eq!(Importer::new().state(), ImportState::Idle);
    }
}
