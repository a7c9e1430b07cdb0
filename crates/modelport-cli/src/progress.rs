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

//! Terminal progress reporting for imports.
//!
//! [`ImportProgress`] bridges the pipeline's [`ImportCallbacks`] to
//! indicatif bars drawn on stderr.

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressFinish, ProgressStyle};
use modelport_import::{
    ImportCallbacks, ImportError, ImportResult, LoadProgress, MainFileSelector,
};
use std::cell::RefCell;
use std::time::Duration;

const FILE_TEMPLATE: &str =
    "{spinner:.magenta} {msg} [{bar:40.magenta/blue}] {pos}/{len} files ({percent}%)";
const DOWNLOAD_TEMPLATE: &str =
    "{spinner:.cyan} {msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";
const SPINNER_TEMPLATE: &str = "{spinner:.cyan} {msg}";

/// Factory for progress bars sharing one stderr draw target
pub struct ProgressTracker {
    multi: MultiProgress,
    quiet: bool,
}

impl ProgressTracker {
    /// Create a tracker; `quiet` hides every bar
    pub fn new(quiet: bool) -> Self {
        Self {
            multi: if quiet {
                MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
            } else {
                MultiProgress::with_draw_target(ProgressDrawTarget::stderr())
            },
            quiet,
        }
    }

    /// Bar counting files of the input set
    pub fn file_bar(&self, msg: &str, total: u64) -> ProgressBar {
        self.styled(ProgressBar::new(total), FILE_TEMPLATE, msg)
    }

    /// Bar counting bytes of a single transfer
    pub fn download_bar(&self, msg: &str) -> ProgressBar {
        self.styled(
            ProgressBar::new(0).with_finish(ProgressFinish::AndClear),
            DOWNLOAD_TEMPLATE,
            msg,
        )
    }

    /// Spinner for work of unknown length; cleared on finish
    pub fn spinner(&self, msg: &str) -> ProgressBar {
        self.styled(
            ProgressBar::new_spinner().with_finish(ProgressFinish::AndClear),
            SPINNER_TEMPLATE,
            msg,
        )
    }

    fn styled(&self, bar: ProgressBar, template: &str, msg: &str) -> ProgressBar {
        if self.quiet {
            return ProgressBar::hidden();
        }

        let pb = self.multi.add(bar);
        // Templates are constants; a parse failure keeps the default style.
        if let Ok(style) = ProgressStyle::default_bar().template(template) {
            pb.set_style(style.progress_chars("█▓░"));
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}

/// [`ImportCallbacks`] implementation that renders progress bars
pub struct ImportProgress<'s> {
    tracker: ProgressTracker,
    selector: Option<&'s dyn MainFileSelector>,
    files: RefCell<Option<ProgressBar>>,
    bytes: RefCell<Option<ProgressBar>>,
    parse: RefCell<Option<ProgressBar>>,
}

impl<'s> ImportProgress<'s> {
    /// Create a reporter, optionally consulting `selector` for the main file
    pub fn new(quiet: bool, selector: Option<&'s dyn MainFileSelector>) -> Self {
        ImportProgress {
            tracker: ProgressTracker::new(quiet),
            selector,
            files: RefCell::new(None),
            bytes: RefCell::new(None),
            parse: RefCell::new(None),
        }
    }

    fn finish_transfers(&self) {
        if let Some(bar) = self.bytes.borrow_mut().take() {
            bar.finish_and_clear();
        }
        if let Some(bar) = self.files.borrow_mut().take() {
            bar.finish_and_clear();
        }
    }

    fn finish_all(&self) {
        self.finish_transfers();
        if let Some(bar) = self.parse.borrow_mut().take() {
            bar.finish_and_clear();
        }
    }
}

impl LoadProgress for ImportProgress<'_> {
    fn on_file_list_progress(&self, index: usize, total: usize) {
        let mut files = self.files.borrow_mut();
        let bar = files.get_or_insert_with(|| self.tracker.file_bar("Loading", total as u64));
        bar.set_position(index as u64);

        // Each file gets a fresh byte counter.
        if let Some(previous) = self.bytes.borrow_mut().take() {
            previous.finish_and_clear();
        }
    }

    fn on_file_load_progress(&self, loaded: u64, total: u64) {
        let mut bytes = self.bytes.borrow_mut();
        let bar = bytes.get_or_insert_with(|| self.tracker.download_bar("Downloading"));
        if total > 0 {
            bar.set_length(total);
        }
        bar.set_position(loaded);
    }
}

impl ImportCallbacks for ImportProgress<'_> {
    fn on_load_start(&self) {
        tracing::debug!("Loading input files");
    }

    fn on_import_start(&self) {
        self.finish_transfers();
        *self.parse.borrow_mut() = Some(self.tracker.spinner("Importing model..."));
    }

    fn main_file_selector(&self) -> Option<&dyn MainFileSelector> {
        // The selector may prompt on the terminal.
        if self.selector.is_some() {
            if let Some(bar) = self.parse.borrow_mut().take() {
                bar.finish_and_clear();
            }
        }
        self.selector
    }

    fn on_import_success(&self, result: &ImportResult) {
        self.finish_all();
        tracing::info!(main_file = %result.main_file, "Import succeeded");
    }

    fn on_import_error(&self, error: &ImportError) {
        self.finish_all();
        tracing::debug!(%error, "Import failed");
    }
}
