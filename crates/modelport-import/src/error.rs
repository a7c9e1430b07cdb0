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

//! Error types for file loading, archive decoding and import operations

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Classification of a failed import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportErrorCode {
    /// No registered importer accepts any file, or main-file selection was cancelled
    NoImportableFile,
    /// The chosen main file never obtained content
    FailedToLoadFile,
    /// The selected format importer reported a failure
    ImportFailed,
    /// Failure outside the modeled import flow
    UnknownError,
}

impl ImportErrorCode {
    /// Stable identifier for the code
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportErrorCode::NoImportableFile => "no_importable_file",
            ImportErrorCode::FailedToLoadFile => "failed_to_load_file",
            ImportErrorCode::ImportFailed => "import_failed",
            ImportErrorCode::UnknownError => "unknown_error",
        }
    }
}

impl fmt::Display for ImportErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured, user-visible import failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}{}", describe(.main_file, .message))]
pub struct ImportError {
    /// Failure classification
    pub code: ImportErrorCode,

    /// Name of the main file, when one had been chosen
    pub main_file: Option<String>,

    /// Importer-provided detail
    pub message: Option<String>,
}

impl ImportError {
    /// Create an error carrying only a code
    pub fn new(code: ImportErrorCode) -> Self {
        ImportError {
            code,
            main_file: None,
            message: None,
        }
    }

    /// Attach the main file name
    pub fn with_main_file(mut self, main_file: impl Into<String>) -> Self {
        self.main_file = Some(main_file.into());
        self
    }

    /// Attach a detail message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

fn describe(main_file: &Option<String>, message: &Option<String>) -> String {
    let mut out = String::new();
    if let Some(name) = main_file {
        out.push_str(&format!(" ({})", name));
    }
    if let Some(message) = message {
        out.push_str(&format!(": {}", message));
    }
    out
}

/// Failure reported by a format importer while parsing content
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ImporterError {
    /// Human-readable reason
    pub message: String,
}

impl ImporterError {
    /// Create a new importer error
    pub fn new(message: impl Into<String>) -> Self {
        ImporterError {
            message: message.into(),
        }
    }
}

/// Errors raised while obtaining the content of a single file
#[derive(Debug, Error)]
pub enum LoadError {
    /// Local read failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP status {status} for {url}")]
    HttpStatus {
        /// Response status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// The load did not finish within the configured timeout
    #[error("Loading timed out after {0:?}")]
    Timeout(Duration),

    /// The loader cannot handle this kind of file
    #[error("Unsupported file source: {0}")]
    UnsupportedSource(String),

    /// The requested file is unknown to the loader
    #[error("File not found: {0}")]
    NotFound(String),
}

/// Errors raised while decompressing an archive
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Malformed or unsupported zip data
    #[error("Zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Reading an entry failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An entry inflates past the size limit
    #[error("Archive entry {path} exceeds {limit} bytes")]
    EntryTooLarge {
        /// Path inside the archive
        path: String,
        /// Limit in bytes
        limit: u64,
    },
}

/// Result type for archive operations
pub type ArchiveResult<T> = std::result::Result<T, ArchiveError>;

/// Result type for import operations
pub type Result<T> = std::result::Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_error_display() {
        let error = ImportError::new(ImportErrorCode::ImportFailed)
            .with_main_file("model.obj")
            .with_message("Invalid vertex index.");
        assert_eq!(
            error.to_string(),
            "import_failed (model.obj): Invalid vertex index."
        );
    }

    #[test]
    fn test_import_error_code_only() {
        let error = ImportError::new(ImportErrorCode::NoImportableFile);
        assert_eq!(error.to_string(), "no_importable_file");
        assert!(error.main_file.is_none());
        assert!(error.message.is_none());
    }
}
