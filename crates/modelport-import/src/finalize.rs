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

//! Post-parse cleanup shared by every format importer

use crate::model::{Material, Model, RgbColor};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Colors applied where a format imposes none
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSettings {
    /// Color of the default surface material
    pub default_color: RgbColor,
    /// Color of the default line material
    pub default_line_color: RgbColor,
}

impl Default for ImportSettings {
    fn default() -> Self {
        ImportSettings {
            default_color: RgbColor::new(200, 200, 200),
            default_line_color: RgbColor::new(100, 100, 100),
        }
    }
}

#[derive(Default)]
struct DefaultMaterials {
    surface: Option<usize>,
    vertex_color: Option<usize>,
    line: Option<usize>,
}

/// Remove empty meshes and give untagged triangles and lines a default
/// material. Default materials are only created when something uses them.
pub fn finalize_model(model: &mut Model, settings: &ImportSettings) {
    let removed = model.remove_empty_meshes();
    if removed > 0 {
        debug!("Removed {} empty meshes", removed);
    }

    let mut defaults = DefaultMaterials::default();
    for mesh_index in 0..model.meshes().len() {
        let mut pending_triangles = Vec::new();
        let mut pending_lines = Vec::new();
        if let Some(mesh) = model.meshes().get(mesh_index) {
            for (index, triangle) in mesh.triangles().iter().enumerate() {
                if triangle.material.is_none() {
                    pending_triangles.push((index, triangle.colors.is_some()));
                }
            }
            for (index, line) in mesh.lines().iter().enumerate() {
                if line.material.is_none() {
                    pending_lines.push(index);
                }
            }
        }

        let mut triangle_assignments = Vec::with_capacity(pending_triangles.len());
        for (index, has_colors) in pending_triangles {
            let material = if has_colors {
                *defaults.vertex_color.get_or_insert_with(|| {
                    let mut material = default_material(settings.default_color);
                    material.vertex_colors = true;
                    model.add_material(material)
                })
            } else {
                *defaults
                    .surface
                    .get_or_insert_with(|| model.add_material(default_material(settings.default_color)))
            };
            triangle_assignments.push((index, material));
        }

        let mut line_assignments = Vec::with_capacity(pending_lines.len());
        for index in pending_lines {
            let material = *defaults.line.get_or_insert_with(|| {
                model.add_material(default_material(settings.default_line_color))
            });
            line_assignments.push((index, material));
        }

        if let Some(mesh) = model.mesh_mut(mesh_index) {
            let triangles = mesh.triangles_mut();
            for (index, material) in triangle_assignments {
                triangles[index].material = Some(material);
            }
            let lines = mesh.lines_mut();
            for (index, material) in line_assignments {
                lines[index].material = Some(material);
            }
        }
    }
}

fn default_material(color: RgbColor) -> Material {
    let mut material = Material::new("");
    material.color = color;
    material.is_default = true;
    material
}
