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

//! 3D model import pipeline for ModelPort
//!
//! This crate provides:
//! - Typed file descriptors and a case-insensitive, lazily loaded file list
//! - Cooperative single-threaded scheduling primitives
//! - Zip archive expansion
//! - A dependency resolver that tracks used and missing files
//! - The pluggable format-importer contract and a Wavefront OBJ importer
//! - The import orchestrator tying it all together
//!
//! # Example
//!
//! ```rust,no_run
//! use modelport_import::{ImportSettings, Importer, InputFile, NoProgress};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mut importer = Importer::new();
//! let inputs = [
//!     InputFile::from_path("models/cube.obj"),
//!     InputFile::from_path("models/cube.mtl"),
//! ];
//! match importer.import_files(&inputs, &ImportSettings::default(), &NoProgress).await {
//!     Ok(result) => println!("{} meshes", result.model.meshes().len()),
//!     Err(error) => eprintln!("import failed: {}", error),
//! }
//! # }
//! ```

pub mod archive;
pub mod error;
pub mod file;
pub mod file_list;
pub mod finalize;
pub mod importer;
pub mod loader;
pub mod model;
pub mod orchestrator;
pub mod resolver;
pub mod scheduler;

// Re-export commonly used types
pub use error::{ImportError, ImportErrorCode, ImporterError, LoadError, Result};
pub use file::{FileHandle, FileSource, ImporterFile, InputFile};
pub use file_list::{ImporterFileList, LoadProgress, NoProgress};
pub use finalize::ImportSettings;
pub use importer::{FormatImporter, ImporterRegistry, ObjImporter};
pub use loader::{DefaultFileLoader, FileLoader, MemoryLoader};
pub use model::{Direction, Material, Mesh, Model, ModelSummary, RgbColor};
pub use orchestrator::{
    ImportCallbacks, ImportResult, ImportState, Importer, MainFileChoice, MainFileSelector,
};
pub use resolver::DependencyResolver;
