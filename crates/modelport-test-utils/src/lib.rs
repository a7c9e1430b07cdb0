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

//! # ModelPort Test Utilities
//!
//! Shared test utilities for ModelPort crates providing:
//! - Sample OBJ/MTL sources and binary texture stand-ins
//! - In-memory zip archive construction
//! - Scratch directories for tests that read real files

pub mod fixtures;
pub mod workspace;

// Re-export commonly used items at crate root
pub use fixtures::TestFixtures;
pub use workspace::TestWorkspace;
