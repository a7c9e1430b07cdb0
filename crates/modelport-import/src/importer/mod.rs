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

//! Pluggable format importers
//!
//! Every format implements [`FormatImporter`]. Importers are kept in an
//! [`ImporterRegistry`] in priority order; the first importer accepting a
//! file's extension handles it.
//!
//! # Supported Formats
//!
//! - **OBJ**: Wavefront OBJ with MTL material libraries ([`obj::ObjImporter`])
//!
//! Other formats plug in by implementing the trait and calling
//! [`ImporterRegistry::register`].

pub mod obj;

use crate::error::ImporterError;
use crate::file::ImporterFile;
use crate::finalize::{finalize_model, ImportSettings};
use crate::model::{Direction, Model};
use crate::resolver::DependencyResolver;
use bytes::Bytes;
use std::fmt::Debug;

pub use obj::ObjImporter;

/// Collaborators available to an importer during one import
#[derive(Debug)]
pub struct ImportContext<'r, 'a> {
    settings: ImportSettings,
    resolver: &'r mut DependencyResolver<'a>,
}

impl<'r, 'a> ImportContext<'r, 'a> {
    /// Bundle settings and the dependency resolver
    pub fn new(settings: ImportSettings, resolver: &'r mut DependencyResolver<'a>) -> Self {
        ImportContext { settings, resolver }
    }

    /// Settings in effect
    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    /// Fetch an auxiliary file by name
    pub fn file_buffer(&mut self, path: &str) -> Option<Bytes> {
        self.resolver.file_buffer(path)
    }
}

/// Contract every format parser satisfies
///
/// The orchestrator calls [`FormatImporter::import`] once per attempt and
/// [`FormatImporter::clear`] once afterwards, whatever the outcome.
/// Implementors provide [`FormatImporter::parse`]; `import` resets working
/// state before delegating to it.
pub trait FormatImporter: Debug {
    /// Short format name for logs
    fn name(&self) -> &'static str;

    /// Whether this importer handles files with `extension` (lower-case, no dot)
    fn can_import_extension(&self, extension: &str) -> bool;

    /// Axis this format treats as up
    fn up_direction(&self) -> Direction;

    /// Format-specific parsing of `content` into fresh working state. On
    /// success the model is available through [`FormatImporter::take_model`].
    fn parse(
        &mut self,
        name: &str,
        extension: &str,
        content: &[u8],
        ctx: &mut ImportContext<'_, '_>,
    ) -> Result<(), ImporterError>;

    /// Reset, then parse `content`
    fn import(
        &mut self,
        name: &str,
        extension: &str,
        content: &[u8],
        ctx: &mut ImportContext<'_, '_>,
    ) -> Result<(), ImporterError> {
        self.clear();
        self.parse(name, extension, content, ctx)
    }

    /// The model built by the last successful import
    fn take_model(&mut self) -> Option<Model>;

    /// Message describing the last failure
    fn error_message(&self) -> Option<String>;

    /// Release working state; calling it twice is harmless
    fn clear(&mut self);
}

/// Validate and finalize a freshly parsed model. Every importer runs this as
/// its last step.
pub fn complete_model(model: &mut Model, settings: &ImportSettings) -> Result<(), ImporterError> {
    if model.is_empty() {
        return Err(ImporterError::new("The model doesn't contain any meshes."));
    }
    finalize_model(model, settings);
    Ok(())
}

/// Priority-ordered importer table
#[derive(Debug, Default)]
pub struct ImporterRegistry {
    importers: Vec<Box<dyn FormatImporter>>,
}

impl ImporterRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in importer
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(ObjImporter::new()));
        registry
    }

    /// Append an importer at the lowest priority
    pub fn register(&mut self, importer: Box<dyn FormatImporter>) {
        self.importers.push(importer);
    }

    /// Index of the first importer accepting `extension`
    pub fn find_index(&self, extension: &str) -> Option<usize> {
        self.importers
            .iter()
            .position(|importer| importer.can_import_extension(extension))
    }

    /// Whether any importer accepts `file`
    pub fn can_import(&self, file: &ImporterFile) -> bool {
        self.find_index(file.extension()).is_some()
    }

    /// Importer at `index`
    pub fn get_mut(&mut self, index: usize) -> Option<&mut (dyn FormatImporter + 'static)> {
        self.importers.get_mut(index).map(|importer| importer.as_mut())
    }

    /// Registered importers in priority order
    pub fn importers(&self) -> impl Iterator<Item = &(dyn FormatImporter + 'static)> {
        self.importers.iter().map(|importer| importer.as_ref())
    }

    /// Number of registered importers
    pub fn len(&self) -> usize {
        self.importers.len()
    }

    /// Whether no importer is registered
    pub fn is_empty(&self) -> bool {
        self.importers.is_empty()
    }
}
