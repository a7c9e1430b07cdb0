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

use crate::output;
use anyhow::Result;
use clap::Parser;
use modelport_import::archive::ARCHIVE_EXTENSION;
use modelport_import::{Direction, ImporterRegistry};
use serde::Serialize;

/// Common model extensions checked against the registry
const KNOWN_EXTENSIONS: &[&str] = &[
    "obj", "stl", "off", "ply", "3ds", "3dm", "3mf", "amf", "bim", "dae", "fbx", "fcstd", "gltf",
    "glb", "ifc", "step", "stp", "iges", "igs", "brep", "wrl", "vrml",
];

#[derive(Parser, Debug)]
pub struct FormatsCmd {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize, PartialEq)]
struct FormatInfo {
    name: &'static str,
    extensions: Vec<&'static str>,
    up_vector: Direction,
}

impl FormatsCmd {
    pub fn execute(&self) -> Result<()> {
        let formats = registered_formats(&ImporterRegistry::with_defaults());

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "formats": formats,
                    "archives": [ARCHIVE_EXTENSION],
                }))?
            );
            return Ok(());
        }

        output::header("Model formats:");
        for format in &formats {
            output::detail(
                format.name,
                &format!(
                    ".{} (up axis {:?})",
                    format.extensions.join(", ."),
                    format.up_vector
                ),
            );
        }
        output::header("Archives:");
        output::item(&format!(".{}", ARCHIVE_EXTENSION));
        Ok(())
    }
}

fn registered_formats(registry: &ImporterRegistry) -> Vec<FormatInfo> {
    registry
        .importers()
        .map(|importer| FormatInfo {
            name: importer.name(),
            extensions: KNOWN_EXTENSIONS
                .iter()
                .copied()
                .filter(|extension| importer.can_import_extension(extension))
                .collect(),
            up_vector: importer.up_direction(),
        })
        .collect()
}
