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

//! Normalized in-memory scene produced by format importers
//!
//! Buffers are append-only: every `add_*` method returns the index of the
//! appended element and nothing is ever removed from a mesh.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Point or direction in 3D space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coord3D {
    /// X component
    pub x: f64,
    /// Y component
    pub y: f64,
    /// Z component
    pub z: f64,
}

impl Coord3D {
    /// Create a new coordinate
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Coord3D { x, y, z }
    }
}

/// Texture-space coordinate
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coord2D {
    /// U component
    pub x: f64,
    /// V component
    pub y: f64,
}

impl Coord2D {
    /// Create a new coordinate
    pub fn new(x: f64, y: f64) -> Self {
        Coord2D { x, y }
    }
}

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RgbColor {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
}

impl RgbColor {
    /// Create a new color
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        RgbColor { r, g, b }
    }

    /// Build from normalized float components, clamping to `[0, 1]`
    pub fn from_float_components(r: f64, g: f64, b: f64) -> Self {
        RgbColor {
            r: color_component_from_float(r),
            g: color_component_from_float(g),
            b: color_component_from_float(b),
        }
    }

    /// Parse `#rrggbb` (the leading `#` is optional)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
        Some(RgbColor {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    /// Format as `#rrggbb`
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

fn color_component_from_float(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Coordinate axis a format treats as "up"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// X axis
    X,
    /// Y axis
    Y,
    /// Z axis
    Z,
}

/// Texture reference attached to a material
#[derive(Debug, Clone, PartialEq)]
pub struct TextureMap {
    /// Name the texture was referenced by
    pub name: String,
    /// Texture bytes, `None` when the file was missing
    pub buffer: Option<Bytes>,
    /// UV offset
    pub offset: Coord2D,
    /// UV scale
    pub scale: Coord2D,
}

impl TextureMap {
    /// Create a texture with identity transform
    pub fn new(name: impl Into<String>, buffer: Option<Bytes>) -> Self {
        TextureMap {
            name: name.into(),
            buffer,
            offset: Coord2D::new(0.0, 0.0),
            scale: Coord2D::new(1.0, 1.0),
        }
    }
}

/// Phong-style material
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Material name
    pub name: String,
    /// Diffuse color
    pub color: RgbColor,
    /// Ambient color
    pub ambient: RgbColor,
    /// Specular color
    pub specular: RgbColor,
    /// Shininess in `[0, 1]`
    pub shininess: f64,
    /// Opacity, 1.0 is fully opaque
    pub opacity: f64,
    /// Whether the material needs blending
    pub transparent: bool,
    /// Diffuse texture
    pub diffuse_map: Option<TextureMap>,
    /// Specular texture
    pub specular_map: Option<TextureMap>,
    /// Bump texture
    pub bump_map: Option<TextureMap>,
    /// Whether per-vertex colors drive the surface color
    pub vertex_colors: bool,
    /// Created during finalization rather than by an importer
    pub is_default: bool,
}

impl Material {
    /// Create an opaque material with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Material {
            name: name.into(),
            color: RgbColor::default(),
            ambient: RgbColor::default(),
            specular: RgbColor::default(),
            shininess: 0.0,
            opacity: 1.0,
            transparent: false,
            diffuse_map: None,
            specular_map: None,
            bump_map: None,
            vertex_colors: false,
            is_default: false,
        }
    }

    /// Recompute [`Material::transparent`] from the current opacity
    pub fn update_transparency(&mut self) {
        self.transparent = self.opacity < 1.0 - f64::EPSILON;
    }
}

/// Triangle referencing mesh-local buffer indices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triangle {
    /// First vertex
    pub v0: usize,
    /// Second vertex
    pub v1: usize,
    /// Third vertex
    pub v2: usize,
    /// Per-corner vertex colors
    pub colors: Option<[usize; 3]>,
    /// Per-corner normals
    pub normals: Option<[usize; 3]>,
    /// Per-corner texture coordinates
    pub uvs: Option<[usize; 3]>,
    /// Model-level material index
    pub material: Option<usize>,
}

impl Triangle {
    /// Create a triangle with no attributes attached
    pub fn new(v0: usize, v1: usize, v2: usize) -> Self {
        Triangle {
            v0,
            v1,
            v2,
            colors: None,
            normals: None,
            uvs: None,
            material: None,
        }
    }

    /// Vertex indices as an array
    pub fn vertices(&self) -> [usize; 3] {
        [self.v0, self.v1, self.v2]
    }
}

/// Polyline referencing mesh-local vertex indices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Ordered vertex indices
    pub vertices: Vec<usize>,
    /// Model-level material index
    pub material: Option<usize>,
}

impl Line {
    /// Create a line with no material
    pub fn new(vertices: Vec<usize>) -> Self {
        Line {
            vertices,
            material: None,
        }
    }
}

/// Named geometry with its own index space
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Mesh name
    pub name: String,
    vertices: Vec<Coord3D>,
    vertex_colors: Vec<RgbColor>,
    normals: Vec<Coord3D>,
    uvs: Vec<Coord2D>,
    triangles: Vec<Triangle>,
    lines: Vec<Line>,
}

impl Mesh {
    /// Create an empty mesh
    pub fn new(name: impl Into<String>) -> Self {
        Mesh {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Append a vertex position
    pub fn add_vertex(&mut self, vertex: Coord3D) -> usize {
        self.vertices.push(vertex);
        self.vertices.len() - 1
    }

    /// Append a vertex color
    pub fn add_vertex_color(&mut self, color: RgbColor) -> usize {
        self.vertex_colors.push(color);
        self.vertex_colors.len() - 1
    }

    /// Append a normal
    pub fn add_normal(&mut self, normal: Coord3D) -> usize {
        self.normals.push(normal);
        self.normals.len() - 1
    }

    /// Append a texture coordinate
    pub fn add_uv(&mut self, uv: Coord2D) -> usize {
        self.uvs.push(uv);
        self.uvs.len() - 1
    }

    /// Append a triangle
    pub fn add_triangle(&mut self, triangle: Triangle) -> usize {
        self.triangles.push(triangle);
        self.triangles.len() - 1
    }

    /// Append a line
    pub fn add_line(&mut self, line: Line) -> usize {
        self.lines.push(line);
        self.lines.len() - 1
    }

    /// Vertex positions
    pub fn vertices(&self) -> &[Coord3D] {
        &self.vertices
    }

    /// Vertex colors
    pub fn vertex_colors(&self) -> &[RgbColor] {
        &self.vertex_colors
    }

    /// Normals
    pub fn normals(&self) -> &[Coord3D] {
        &self.normals
    }

    /// Texture coordinates
    pub fn uvs(&self) -> &[Coord2D] {
        &self.uvs
    }

    /// Triangles
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Lines
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub(crate) fn triangles_mut(&mut self) -> &mut [Triangle] {
        &mut self.triangles
    }

    pub(crate) fn lines_mut(&mut self) -> &mut [Line] {
        &mut self.lines
    }

    /// Whether the mesh has neither triangles nor lines
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty() && self.lines.is_empty()
    }
}

/// Scene-graph node referencing meshes by model index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    /// Node name
    pub name: String,
    /// Indices into [`Model::meshes`]
    pub mesh_indices: Vec<usize>,
    /// Child nodes
    pub children: Vec<Node>,
}

impl Node {
    /// Visit this node and all descendants, depth first
    pub fn walk_mut(&mut self, visit: &mut dyn FnMut(&mut Node)) {
        visit(self);
        for child in &mut self.children {
            child.walk_mut(visit);
        }
    }
}

/// Imported scene: materials, meshes and the node hierarchy
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    materials: Vec<Material>,
    meshes: Vec<Mesh>,
    root: Node,
}

impl Model {
    /// Create an empty model
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a material and return its index
    pub fn add_material(&mut self, material: Material) -> usize {
        self.materials.push(material);
        self.materials.len() - 1
    }

    /// Add a mesh and attach it to the root node
    pub fn add_mesh_to_root_node(&mut self, mesh: Mesh) -> usize {
        self.meshes.push(mesh);
        let index = self.meshes.len() - 1;
        self.root.mesh_indices.push(index);
        index
    }

    /// Materials in registration order
    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    /// Material by index
    pub fn material(&self, index: usize) -> Option<&Material> {
        self.materials.get(index)
    }

    /// Mutable material by index
    pub fn material_mut(&mut self, index: usize) -> Option<&mut Material> {
        self.materials.get_mut(index)
    }

    /// Meshes in creation order
    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    /// Mutable mesh by index
    pub fn mesh_mut(&mut self, index: usize) -> Option<&mut Mesh> {
        self.meshes.get_mut(index)
    }

    /// Root of the node hierarchy
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Whether no mesh holds any triangle or line
    pub fn is_empty(&self) -> bool {
        self.meshes.iter().all(Mesh::is_empty)
    }

    /// Drop meshes without triangles or lines, re-indexing node references
    pub(crate) fn remove_empty_meshes(&mut self) -> usize {
        let mut remap = Vec::with_capacity(self.meshes.len());
        let mut kept = Vec::with_capacity(self.meshes.len());
        for mesh in self.meshes.drain(..) {
            if mesh.is_empty() {
                remap.push(None);
            } else {
                remap.push(Some(kept.len()));
                kept.push(mesh);
            }
        }
        let removed = remap.len() - kept.len();
        self.meshes = kept;
        self.root.walk_mut(&mut |node| {
            node.mesh_indices = node
                .mesh_indices
                .iter()
                .filter_map(|index| remap.get(*index).copied().flatten())
                .collect();
        });
        removed
    }

    /// Aggregate counts for reporting
    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            meshes: self.meshes.len(),
            vertices: self.meshes.iter().map(|m| m.vertices.len()).sum(),
            triangles: self.meshes.iter().map(|m| m.triangles.len()).sum(),
            lines: self.meshes.iter().map(|m| m.lines.len()).sum(),
            materials: self.materials.len(),
        }
    }
}

/// Serializable element counts of a [`Model`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSummary {
    /// Number of meshes
    pub meshes: usize,
    /// Total vertex positions
    pub vertices: usize,
    /// Total triangles
    pub triangles: usize,
    /// Total lines
    pub lines: usize,
    /// Number of materials
    pub materials: usize,
}
