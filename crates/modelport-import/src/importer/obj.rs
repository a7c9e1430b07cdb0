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

//! Wavefront OBJ importer
//!
//! OBJ declares positions, colors, normals and texture coordinates once per
//! file, in a single global index space, while faces may belong to any named
//! mesh. Each mesh therefore keeps its own global-to-local index maps: an
//! attribute is copied into the mesh the first time the mesh references it and
//! every later reference reuses that local index.
//!
//! # Example
//!
//! ```rust
//! use modelport_import::importer::{FormatImporter, ImportContext, ObjImporter};
//! use modelport_import::{DependencyResolver, ImportSettings};
//!
//! let source = b"v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
//! let mut resolver = DependencyResolver::new("quad.obj", None, |_| None);
//! let mut ctx = ImportContext::new(ImportSettings::default(), &mut resolver);
//!
//! let mut importer = ObjImporter::new();
//! importer.import("quad.obj", "obj", source, &mut ctx).unwrap();
//! let model = importer.take_model().unwrap();
//! assert_eq!(model.meshes()[0].triangles().len(), 2);
//! ```

use super::{complete_model, FormatImporter, ImportContext};
use crate::error::ImporterError;
use crate::file::file_name;
use crate::model::{
    Coord2D, Coord3D, Direction, Line, Material, Mesh, Model, RgbColor, TextureMap, Triangle,
};
use std::collections::HashMap;
use tracing::{debug, instrument, trace, warn};

/// Importer for `.obj` files and the `.mtl` libraries they reference
#[derive(Debug, Default)]
pub struct ObjImporter {
    model: Option<Model>,
    error: Option<String>,
}

impl ObjImporter {
    /// Create an importer with no working state
    pub fn new() -> Self {
        Self::default()
    }
}

impl FormatImporter for ObjImporter {
    fn name(&self) -> &'static str {
        "obj"
    }

    fn can_import_extension(&self, extension: &str) -> bool {
        extension == "obj"
    }

    fn up_direction(&self) -> Direction {
        Direction::Y
    }

    #[instrument(skip(self, content, ctx), fields(size = content.len()))]
    fn parse(
        &mut self,
        name: &str,
        _extension: &str,
        content: &[u8],
        ctx: &mut ImportContext<'_, '_>,
    ) -> Result<(), ImporterError> {
        let mut state = ObjParseState::new(name);
        state.process_text(&String::from_utf8_lossy(content), ctx);

        let outcome = match state.error.take() {
            Some(message) => Err(ImporterError::new(message)),
            None => {
                let mut model = state.model;
                complete_model(&mut model, ctx.settings()).map(|()| model)
            }
        };

        match outcome {
            Ok(model) => {
                debug!(
                    "Parsed OBJ: meshes={}, materials={}",
                    model.meshes().len(),
                    model.materials().len()
                );
                self.model = Some(model);
                Ok(())
            }
            Err(error) => {
                self.error = Some(error.message.clone());
                Err(error)
            }
        }
    }

    fn take_model(&mut self) -> Option<Model> {
        self.model.take()
    }

    fn error_message(&self) -> Option<String> {
        self.error.clone()
    }

    fn clear(&mut self) {
        self.model = None;
        self.error = None;
    }
}

/// Global-to-local index maps for one named mesh
#[derive(Debug)]
struct ObjMeshConverter {
    mesh_index: usize,
    vertices: HashMap<usize, usize>,
    colors: HashMap<usize, usize>,
    normals: HashMap<usize, usize>,
    uvs: HashMap<usize, usize>,
}

impl ObjMeshConverter {
    fn new(mesh_index: usize) -> Self {
        ObjMeshConverter {
            mesh_index,
            vertices: HashMap::new(),
            colors: HashMap::new(),
            normals: HashMap::new(),
            uvs: HashMap::new(),
        }
    }
}

/// Mesh-local index for `global_index`, copying the value into the mesh on
/// first use
fn local_index<T: Copy>(
    map: &mut HashMap<usize, usize>,
    global_index: usize,
    globals: &[T],
    add: &mut dyn FnMut(T) -> usize,
) -> Option<usize> {
    if let Some(local) = map.get(&global_index) {
        return Some(*local);
    }
    let value = *globals.get(global_index)?;
    let local = add(value);
    map.insert(global_index, local);
    Some(local)
}

fn local_indices<T: Copy>(
    map: &mut HashMap<usize, usize>,
    global_indices: &[usize],
    globals: &[T],
    add: &mut dyn FnMut(T) -> usize,
) -> Option<Vec<usize>> {
    global_indices
        .iter()
        .map(|global_index| local_index(map, *global_index, globals, add))
        .collect()
}

/// Resolve a 1-based or relative OBJ reference against `count` declared
/// elements
fn resolve_index(token: &str, count: usize) -> Option<usize> {
    let index: i64 = token.trim().parse().ok()?;
    let count = i64::try_from(count).ok()?;
    let resolved = if index > 0 { index - 1 } else { count + index };
    if (0..count).contains(&resolved) {
        usize::try_from(resolved).ok()
    } else {
        None
    }
}

fn parse_float(token: &str) -> f64 {
    token.parse().unwrap_or(0.0)
}

/// Up to `max` leading numeric tokens
fn leading_floats(tokens: &[&str], max: usize) -> Vec<f64> {
    tokens
        .iter()
        .take(max)
        .map_while(|token| token.parse::<f64>().ok())
        .collect()
}

/// Text after the keyword, trimmed. `content` is already comment-free.
fn name_from_line<'l>(content: &'l str, keyword: &str) -> &'l str {
    content.trim_start()[keyword.len()..].trim()
}

#[derive(Debug, Default)]
struct FaceReferences {
    vertices: Vec<usize>,
    colors: Vec<usize>,
    normals: Vec<usize>,
    uvs: Vec<usize>,
}

/// Working state of one OBJ parse, threaded through every directive
#[derive(Debug)]
struct ObjParseState {
    model: Model,
    global_vertices: Vec<Coord3D>,
    global_vertex_colors: Vec<RgbColor>,
    global_normals: Vec<Coord3D>,
    global_uvs: Vec<Coord2D>,
    mesh_converters: Vec<ObjMeshConverter>,
    mesh_name_to_converter: HashMap<String, usize>,
    current_converter: Option<usize>,
    material_name_to_index: HashMap<String, usize>,
    current_material: Option<usize>,
    current_material_index: Option<usize>,
    library_stack: Vec<String>,
    error: Option<String>,
}

impl ObjParseState {
    fn new(main_file: &str) -> Self {
        ObjParseState {
            model: Model::new(),
            global_vertices: Vec::new(),
            global_vertex_colors: Vec::new(),
            global_normals: Vec::new(),
            global_uvs: Vec::new(),
            mesh_converters: Vec::new(),
            mesh_name_to_converter: HashMap::new(),
            current_converter: None,
            material_name_to_index: HashMap::new(),
            current_material: None,
            current_material_index: None,
            library_stack: vec![file_name(main_file).to_lowercase()],
            error: None,
        }
    }

    fn fail(&mut self, message: &str) {
        warn!("OBJ parse failed: {}", message);
        self.error = Some(message.to_string());
    }

    fn process_text(&mut self, text: &str, ctx: &mut ImportContext<'_, '_>) {
        for line in text.lines() {
            if self.error.is_some() {
                continue;
            }
            self.process_line(line, ctx);
        }
    }

    fn process_line(&mut self, line: &str, ctx: &mut ImportContext<'_, '_>) {
        let content = line.split('#').next().unwrap_or_default();
        let mut tokens = content.split_whitespace();
        let Some(first) = tokens.next() else {
            return;
        };
        let keyword = first.to_lowercase();
        let parameters: Vec<&str> = tokens.collect();
        let name = name_from_line(content, first);

        if self.process_mesh_directive(&keyword, &parameters, name) {
            return;
        }
        if self.process_material_directive(&keyword, &parameters, name, ctx) {
            return;
        }
        trace!("Ignoring OBJ directive: {}", keyword);
    }

    fn process_mesh_directive(&mut self, keyword: &str, parameters: &[&str], name: &str) -> bool {
        match keyword {
            "g" | "o" => {
                if !parameters.is_empty() {
                    self.switch_mesh(name);
                }
            }
            "v" => {
                if parameters.len() < 3 {
                    return true;
                }
                self.global_vertices.push(Coord3D::new(
                    parse_float(parameters[0]),
                    parse_float(parameters[1]),
                    parse_float(parameters[2]),
                ));
                if parameters.len() >= 6 {
                    self.global_vertex_colors.push(RgbColor::from_float_components(
                        parse_float(parameters[3]),
                        parse_float(parameters[4]),
                        parse_float(parameters[5]),
                    ));
                }
            }
            "vn" => {
                if parameters.len() >= 3 {
                    self.global_normals.push(Coord3D::new(
                        parse_float(parameters[0]),
                        parse_float(parameters[1]),
                        parse_float(parameters[2]),
                    ));
                }
            }
            "vt" => {
                if parameters.len() >= 2 {
                    self.global_uvs.push(Coord2D::new(
                        parse_float(parameters[0]),
                        parse_float(parameters[1]),
                    ));
                }
            }
            "l" => {
                if parameters.len() >= 2 {
                    self.process_polyline(parameters);
                }
            }
            "f" => {
                if parameters.len() >= 3 {
                    self.process_face(parameters);
                }
            }
            _ => return false,
        }
        true
    }

    fn process_material_directive(
        &mut self,
        keyword: &str,
        parameters: &[&str],
        name: &str,
        ctx: &mut ImportContext<'_, '_>,
    ) -> bool {
        match keyword {
            "newmtl" => {
                if parameters.is_empty() {
                    return true;
                }
                let index = self.model.add_material(Material::new(name));
                self.current_material = Some(index);
                self.material_name_to_index.insert(name.to_string(), index);
                return true;
            }
            "usemtl" => {
                if let Some(index) = self.material_name_to_index.get(name) {
                    self.current_material_index = Some(*index);
                }
                return true;
            }
            "mtllib" => {
                if !parameters.is_empty() {
                    self.process_material_library(name, ctx);
                }
                return true;
            }
            "map_kd" | "map_ks" | "map_bump" | "bump" | "ka" | "kd" | "ks" | "ns" | "tr" | "d" => {}
            _ => return false,
        }

        let Some(material_index) = self.current_material else {
            return true;
        };
        let texture = match keyword {
            "map_kd" | "map_ks" | "map_bump" | "bump" if !parameters.is_empty() => {
                Some(create_texture(parameters, ctx))
            }
            _ => None,
        };
        let Some(material) = self.model.material_mut(material_index) else {
            return true;
        };

        match keyword {
            "map_kd" => {
                if texture.is_some() {
                    material.diffuse_map = texture;
                    material.update_transparency();
                }
            }
            "map_ks" => {
                if texture.is_some() {
                    material.specular_map = texture;
                }
            }
            "map_bump" | "bump" => {
                if texture.is_some() {
                    material.bump_map = texture;
                }
            }
            "ka" | "kd" | "ks" => {
                if parameters.len() < 3 {
                    return true;
                }
                let color = RgbColor::from_float_components(
                    parse_float(parameters[0]),
                    parse_float(parameters[1]),
                    parse_float(parameters[2]),
                );
                match keyword {
                    "ka" => material.ambient = color,
                    "kd" => material.color = color,
                    _ => material.specular = color,
                }
            }
            "ns" => {
                if let Some(value) = parameters.first() {
                    material.shininess = parse_float(value) / 1000.0;
                }
            }
            "tr" => {
                if let Some(value) = parameters.first() {
                    material.opacity = 1.0 - parse_float(value);
                    material.update_transparency();
                }
            }
            "d" => {
                if let Some(value) = parameters.first() {
                    material.opacity = parse_float(value);
                    material.update_transparency();
                }
            }
            _ => {}
        }
        true
    }

    fn process_material_library(&mut self, name: &str, ctx: &mut ImportContext<'_, '_>) {
        let key = file_name(name).to_lowercase();
        if self.library_stack.contains(&key) {
            warn!("Skipping recursive material library reference: {}", name);
            return;
        }
        let Some(buffer) = ctx.file_buffer(name) else {
            debug!("Material library not available: {}", name);
            return;
        };

        let text = String::from_utf8_lossy(&buffer).into_owned();
        self.library_stack.push(key);
        self.process_text(&text, ctx);
        self.library_stack.pop();
    }

    fn switch_mesh(&mut self, name: &str) -> usize {
        if let Some(index) = self.mesh_name_to_converter.get(name) {
            self.current_converter = Some(*index);
            return *index;
        }
        let mesh_index = self.model.add_mesh_to_root_node(Mesh::new(name));
        self.mesh_converters.push(ObjMeshConverter::new(mesh_index));
        let index = self.mesh_converters.len() - 1;
        self.mesh_name_to_converter.insert(name.to_string(), index);
        self.current_converter = Some(index);
        index
    }

    fn current_converter(&mut self) -> usize {
        match self.current_converter {
            Some(index) => index,
            None => self.switch_mesh(""),
        }
    }

    fn resolve_face_references(&mut self, parameters: &[&str]) -> Option<FaceReferences> {
        let has_vertex_colors = self.global_vertex_colors.len() == self.global_vertices.len();
        let mut refs = FaceReferences::default();

        for parameter in parameters {
            let mut parts = parameter.split('/');
            let vertex = parts.next().unwrap_or_default();
            let Some(vertex) = resolve_index(vertex, self.global_vertices.len()) else {
                self.fail("Invalid vertex index.");
                return None;
            };
            refs.vertices.push(vertex);
            if has_vertex_colors {
                refs.colors.push(vertex);
            }

            if let Some(uv) = parts.next().filter(|part| !part.is_empty()) {
                let Some(uv) = resolve_index(uv, self.global_uvs.len()) else {
                    self.fail("Invalid uv index.");
                    return None;
                };
                refs.uvs.push(uv);
            }

            if let Some(normal) = parts.next().filter(|part| !part.is_empty()) {
                let Some(normal) = resolve_index(normal, self.global_normals.len()) else {
                    self.fail("Invalid normal index.");
                    return None;
                };
                refs.normals.push(normal);
            }
        }

        Some(refs)
    }

    fn process_face(&mut self, parameters: &[&str]) {
        let Some(refs) = self.resolve_face_references(parameters) else {
            return;
        };
        let converter_index = self.current_converter();
        let material = self.current_material_index;
        let count = refs.vertices.len();

        let converter = &mut self.mesh_converters[converter_index];
        let Some(mesh) = self.model.mesh_mut(converter.mesh_index) else {
            return;
        };

        let vertices = local_indices(
            &mut converter.vertices,
            &refs.vertices,
            &self.global_vertices,
            &mut |value| mesh.add_vertex(value),
        );
        let colors = if refs.colors.len() == count {
            local_indices(
                &mut converter.colors,
                &refs.colors,
                &self.global_vertex_colors,
                &mut |value| mesh.add_vertex_color(value),
            )
        } else {
            None
        };
        let normals = if refs.normals.len() == count {
            local_indices(
                &mut converter.normals,
                &refs.normals,
                &self.global_normals,
                &mut |value| mesh.add_normal(value),
            )
        } else {
            None
        };
        let uvs = if refs.uvs.len() == count {
            local_indices(
                &mut converter.uvs,
                &refs.uvs,
                &self.global_uvs,
                &mut |value| mesh.add_uv(value),
            )
        } else {
            None
        };

        let Some(vertices) = vertices else {
            self.fail("Invalid vertex index.");
            return;
        };

        let corner = |indices: &Option<Vec<usize>>, a: usize, b: usize, c: usize| {
            indices.as_ref().map(|indices| [indices[a], indices[b], indices[c]])
        };
        for i in 1..count - 1 {
            let mut triangle = Triangle::new(vertices[0], vertices[i], vertices[i + 1]);
            triangle.colors = corner(&colors, 0, i, i + 1);
            triangle.normals = corner(&normals, 0, i, i + 1);
            triangle.uvs = corner(&uvs, 0, i, i + 1);
            triangle.material = material;
            mesh.add_triangle(triangle);
        }
    }

    fn process_polyline(&mut self, parameters: &[&str]) {
        let mut global_vertices = Vec::with_capacity(parameters.len());
        for parameter in parameters {
            let vertex = parameter.split('/').next().unwrap_or_default();
            let Some(vertex) = resolve_index(vertex, self.global_vertices.len()) else {
                self.fail("Invalid vertex index.");
                return;
            };
            global_vertices.push(vertex);
        }

        let converter_index = self.current_converter();
        let material = self.current_material_index;
        let converter = &mut self.mesh_converters[converter_index];
        let Some(mesh) = self.model.mesh_mut(converter.mesh_index) else {
            return;
        };

        let vertices = local_indices(
            &mut converter.vertices,
            &global_vertices,
            &self.global_vertices,
            &mut |value| mesh.add_vertex(value),
        );
        match vertices {
            Some(vertices) => {
                let mut line = Line::new(vertices);
                line.material = material;
                mesh.add_line(line);
            }
            None => self.fail("Invalid vertex index."),
        }
    }
}

/// Build a texture from `map_*` parameters: `[-o u [v]] [-s u [v]] filename`
fn create_texture(parameters: &[&str], ctx: &mut ImportContext<'_, '_>) -> TextureMap {
    let (texture_name, options) = match parameters.split_last() {
        Some((last, options)) => (*last, options),
        None => ("", parameters),
    };
    let mut texture = TextureMap::new(texture_name, ctx.file_buffer(texture_name));

    let mut i = 0;
    while i < options.len() {
        let option = options[i].to_lowercase();
        if option == "-o" || option == "-s" {
            let values = leading_floats(&options[i + 1..], 2);
            let target = if option == "-o" {
                &mut texture.offset
            } else {
                &mut texture.scale
            };
            if let Some(x) = values.first() {
                target.x = *x;
            }
            if let Some(y) = values.get(1) {
                target.y = *y;
            }
            i += values.len();
        }
        i += 1;
    }

    texture
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finalize::ImportSettings;
    use crate::resolver::DependencyResolver;
    use bytes::Bytes;
    use proptest::prelude::*;
    use std::collections::HashMap;

    struct Parsed {
        state: ObjParseState,
        used: Vec<String>,
        missing: Vec<String>,
    }

    fn parse_with_files(main: &str, files: &[(&str, &str)]) -> Parsed {
        let files: HashMap<String, Bytes> = files
            .iter()
            .map(|(name, text)| (name.to_string(), Bytes::from(text.to_string())))
            .collect();
        let mut resolver =
            DependencyResolver::new("main.obj", Some(Bytes::from(main.to_string())), |name| {
                files.get(name).cloned()
            });
        let mut state = ObjParseState::new("main.obj");
        {
            let mut ctx = ImportContext::new(ImportSettings::default(), &mut resolver);
            state.process_text(main, &mut ctx);
        }
        let (used, missing) = resolver.into_files();
        Parsed {
            state,
            used,
            missing,
        }
    }

    fn parse(main: &str) -> ObjParseState {
        parse_with_files(main, &[]).state
    }

    fn triangle_vertices(state: &ObjParseState, mesh: usize) -> Vec<[usize; 3]> {
        state.model.meshes()[mesh]
            .triangles()
            .iter()
            .map(Triangle::vertices)
            .collect()
    }

    const TRIANGLE: &str = "v 0 0 0\nv 1 0 0\nv 1 1 0\nf 1 2 3";

    #[test]
    fn test_single_triangle() {
        let state = parse(TRIANGLE);
        assert!(state.error.is_none());
        assert_eq!(state.model.meshes().len(), 1);
        let mesh = &state.model.meshes()[0];
        assert_eq!(mesh.vertices().len(), 3);
        assert_eq!(triangle_vertices(&state, 0), vec![[0, 1, 2]]);
        assert_eq!(mesh.vertices()[1], Coord3D::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_relative_indices_match_absolute() {
        let relative = parse("v 0 0 0\nv 1 0 0\nv 1 1 0\nf -1 -2 -3");
        let absolute = parse("v 0 0 0\nv 1 0 0\nv 1 1 0\nf 3 2 1");
        assert!(relative.error.is_none());
        assert_eq!(relative.model, absolute.model);
        assert_eq!(relative.model.meshes()[0].vertices()[0], Coord3D::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_relative_index_uses_count_at_directive_time() {
        let state = parse("v 0 0 0\nv 1 0 0\nv 1 1 0\nf -3 -2 -1\nv 5 5 5\n");
        let mesh = &state.model.meshes()[0];
        assert_eq!(mesh.vertices().len(), 3);
        assert_eq!(mesh.vertices()[0], Coord3D::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_quad_fan_triangulation() {
        let state = parse("v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4");
        assert_eq!(triangle_vertices(&state, 0), vec![[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn test_partial_normals_dropped() {
        let state = parse(
            "v 0 0 0\nv 1 0 0\nv 1 1 0\nvn 0 0 1\nf 1//1 2//1 3\n",
        );
        assert!(state.error.is_none());
        let mesh = &state.model.meshes()[0];
        assert!(mesh.triangles().iter().all(|t| t.normals.is_none()));
        assert!(mesh.normals().is_empty());
    }

    #[test]
    fn test_full_attribute_sets_attached() {
        let state = parse(
            "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\n\
             vt 0 0\nvt 1 0\nvt 1 1\nvt 0 1\n\
             vn 0 0 1\n\
             f 1/1/1 2/2/1 3/3/1 4/4/1\n",
        );
        let mesh = &state.model.meshes()[0];
        assert_eq!(mesh.normals().len(), 1);
        assert_eq!(mesh.uvs().len(), 4);
        assert_eq!(mesh.triangles()[0].normals, Some([0, 0, 0]));
        assert_eq!(mesh.triangles()[1].uvs, Some([0, 2, 3]));
    }

    #[test]
    fn test_partial_uvs_dropped() {
        let state = parse("v 0 0 0\nv 1 0 0\nv 1 1 0\nvt 0 0\nf 1/1 2 3\n");
        let mesh = &state.model.meshes()[0];
        assert!(mesh.triangles()[0].uvs.is_none());
        assert!(mesh.uvs().is_empty());
    }

    #[test]
    fn test_vertex_colors_require_aligned_sequences() {
        let colored = parse("v 0 0 0 1 0 0\nv 1 0 0 0 1 0\nv 1 1 0 0 0 1\nf 1 2 3\n");
        let mesh = &colored.model.meshes()[0];
        assert_eq!(mesh.triangles()[0].colors, Some([0, 1, 2]));
        assert_eq!(mesh.vertex_colors()[1], RgbColor::new(0, 255, 0));

        let mixed = parse("v 0 0 0 1 0 0\nv 1 0 0\nv 1 1 0 0 0 1\nf 1 2 3\n");
        let mesh = &mixed.model.meshes()[0];
        assert!(mesh.triangles()[0].colors.is_none());
        assert!(mesh.vertex_colors().is_empty());
    }

    #[test]
    fn test_repeated_global_index_reuses_local_index() {
        let state = parse(
            "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\n\
             g first\nf 4 2 3\nf 2 4 1\nf 4 3 1\n",
        );
        let mesh = &state.model.meshes()[0];
        assert_eq!(mesh.vertices().len(), 4);
        assert_eq!(triangle_vertices(&state, 0), vec![[0, 1, 2], [1, 0, 3], [0, 2, 3]]);
    }

    #[test]
    fn test_meshes_have_disjoint_local_spaces() {
        let state = parse(
            "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\n\
             g a\nf 1 2 3\n\
             g b\nf 2 3 4\n",
        );
        assert_eq!(state.model.meshes().len(), 2);
        assert_eq!(state.model.meshes()[1].name, "b");
        assert_eq!(triangle_vertices(&state, 1), vec![[0, 1, 2]]);
        assert_eq!(state.model.meshes()[1].vertices()[0], Coord3D::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_group_name_resumes_existing_mesh() {
        let state = parse(
            "v 0 0 0\nv 1 0 0\nv 1 1 0\n\
             o left side\nf 1 2 3\n\
             o right\nf 3 2 1\n\
             o left side\nf 2 3 1\n",
        );
        assert_eq!(state.model.meshes().len(), 2);
        assert_eq!(state.model.meshes()[0].name, "left side");
        assert_eq!(state.model.meshes()[0].triangles().len(), 2);
        assert_eq!(state.model.meshes()[0].vertices().len(), 3);
        assert_eq!(state.model.root().mesh_indices, vec![0, 1]);
    }

    #[test]
    fn test_out_of_range_index_stops_side_effects() {
        let state = parse("v 0 0 0\nv 1 0 0\nv 1 1 0\nf 1 2 4\nf 1 2 3\nv 9 9 9\n");
        assert_eq!(state.error.as_deref(), Some("Invalid vertex index."));
        assert!(state.model.meshes().is_empty());
        assert_eq!(state.global_vertices.len(), 3);
    }

    #[test]
    fn test_zero_and_bad_references_fail() {
        assert!(parse("v 0 0 0\nv 1 0 0\nv 1 1 0\nf 0 1 2").error.is_some());
        assert!(parse("v 0 0 0\nv 1 0 0\nv 1 1 0\nf -4 1 2").error.is_some());
        assert!(parse("v 0 0 0\nv 1 0 0\nv 1 1 0\nf a b c").error.is_some());
        assert_eq!(
            parse("v 0 0 0\nv 1 0 0\nv 1 1 0\nf 1/1 2/1 3/1").error.as_deref(),
            Some("Invalid uv index.")
        );
        assert_eq!(
            parse("v 0 0 0\nv 1 0 0\nv 1 1 0\nf 1//2 2//2 3//2").error.as_deref(),
            Some("Invalid normal index.")
        );
        assert!(parse("v 0 0 0\nl 1 2").error.is_some());
    }

    #[test]
    fn test_comments_and_keyword_case() {
        let state = parse(
            "# header comment\n\
             V 0 0 0 # trailing\n\
             v 1 0 0\n\
             \n\
             v 1 1 0\n\
             F 1 2 3 # face\n",
        );
        assert!(state.error.is_none());
        assert_eq!(triangle_vertices(&state, 0), vec![[0, 1, 2]]);
    }

    #[test]
    fn test_short_directives_ignored() {
        let state = parse("v 1 2\nvn 0 1\nvt 0\nf 1 2\nl 1\ng\n");
        assert!(state.error.is_none());
        assert!(state.global_vertices.is_empty());
        assert!(state.global_normals.is_empty());
        assert!(state.global_uvs.is_empty());
        assert!(state.model.meshes().is_empty());
    }

    #[test]
    fn test_polyline_with_material() {
        let parsed = parse_with_files(
            "mtllib lines.mtl\nv 0 0 0\nv 1 0 0\nv 1 1 0\nusemtl wire\nl 1 2 3 1\n",
            &[("lines.mtl", "newmtl wire\nkd 1 0 0\n")],
        );
        let mesh = &parsed.state.model.meshes()[0];
        assert_eq!(mesh.lines().len(), 1);
        assert_eq!(mesh.lines()[0].vertices, vec![0, 1, 2, 0]);
        assert_eq!(mesh.lines()[0].material, Some(0));
        assert_eq!(mesh.vertices().len(), 3);
    }

    #[test]
    fn test_usemtl_switches_between_library_materials() {
        let parsed = parse_with_files(
            "mtllib scene.mtl\n\
             v 0 0 0\nv 1 0 0\nv 1 1 0\n\
             f 1 2 3\n\
             usemtl red\nf 1 2 3\n\
             usemtl blue\nf 1 2 3\n\
             usemtl unknown\nf 1 2 3\n",
            &[(
                "scene.mtl",
                "newmtl red\nKd 1 0 0\n\nnewmtl blue\nKd 0 0 1\n",
            )],
        );
        let materials: Vec<Option<usize>> = parsed.state.model.meshes()[0]
            .triangles()
            .iter()
            .map(|t| t.material)
            .collect();
        assert_eq!(materials, vec![None, Some(0), Some(1), Some(1)]);
        assert_eq!(parsed.state.model.materials()[0].color, RgbColor::new(255, 0, 0));
        assert_eq!(parsed.state.model.materials()[1].color, RgbColor::new(0, 0, 255));
        assert_eq!(parsed.used, vec!["main.obj", "scene.mtl"]);
    }

    #[test]
    fn test_material_properties() {
        let parsed = parse_with_files(
            "mtllib m.mtl\n",
            &[
                (
                    "m.mtl",
                    "Ka 0 0 0\n\
                     newmtl glass\n\
                     Ka 0.2 0.2 0.2\nKs 1 1 1\nNs 500\nd 0.25\n\
                     map_Kd -o 0.5 0.25 -s 2 3 glass.png\n\
                     map_Ks spec.png\n\
                     bump -s 4 bump.png\n\
                     newmtl solid\nTr 0\n",
                ),
                ("glass.png", "png"),
            ],
        );
        let materials = parsed.state.model.materials();
        assert_eq!(materials.len(), 2);

        let glass = &materials[0];
        assert_eq!(glass.name, "glass");
        assert_eq!(glass.ambient, RgbColor::new(51, 51, 51));
        assert_eq!(glass.specular, RgbColor::new(255, 255, 255));
        assert!((glass.shininess - 0.5).abs() < 1e-9);
        assert!((glass.opacity - 0.25).abs() < 1e-9);
        assert!(glass.transparent);

        let diffuse = glass.diffuse_map.as_ref().unwrap();
        assert_eq!(diffuse.name, "glass.png");
        assert!(diffuse.buffer.is_some());
        assert_eq!(diffuse.offset, Coord2D::new(0.5, 0.25));
        assert_eq!(diffuse.scale, Coord2D::new(2.0, 3.0));
        assert!(glass.specular_map.as_ref().unwrap().buffer.is_none());
        assert_eq!(glass.bump_map.as_ref().unwrap().scale, Coord2D::new(4.0, 1.0));

        let solid = &materials[1];
        assert!((solid.opacity - 1.0).abs() < 1e-9);
        assert!(!solid.transparent);

        assert_eq!(parsed.used, vec!["main.obj", "m.mtl", "glass.png"]);
        assert_eq!(parsed.missing, vec!["spec.png", "bump.png"]);
    }

    #[test]
    fn test_missing_material_library_recorded() {
        let parsed = parse_with_files("mtllib absent.mtl\n", &[]);
        assert_eq!(parsed.missing, vec!["absent.mtl"]);
        assert!(parsed.state.error.is_none());
    }

    #[test]
    fn test_material_library_cycles_terminate() {
        let parsed = parse_with_files(
            "mtllib a.mtl\nmtllib main.obj\n",
            &[
                ("a.mtl", "newmtl from_a\nmtllib b.mtl\n"),
                ("b.mtl", "newmtl from_b\nmtllib a.mtl\nmtllib b.mtl\n"),
            ],
        );
        let names: Vec<&str> = parsed
            .state
            .model
            .materials()
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(names, vec!["from_a", "from_b"]);
    }

    #[test]
    fn test_importer_success_finalizes_model() {
        let mut resolver = DependencyResolver::new("t.obj", None, |_| None);
        let mut ctx = ImportContext::new(ImportSettings::default(), &mut resolver);
        let mut importer = ObjImporter::new();

        importer
            .import("t.obj", "obj", TRIANGLE.as_bytes(), &mut ctx)
            .unwrap();
        assert!(importer.error_message().is_none());
        let model = importer.take_model().unwrap();
        assert_eq!(model.meshes()[0].triangles()[0].material, Some(0));
        assert!(model.materials()[0].is_default);
        assert_eq!(importer.up_direction(), Direction::Y);
    }

    #[test]
    fn test_importer_failure_reports_message() {
        let mut resolver = DependencyResolver::new("t.obj", None, |_| None);
        let mut ctx = ImportContext::new(ImportSettings::default(), &mut resolver);
        let mut importer = ObjImporter::new();

        let error = importer
            .import("t.obj", "obj", b"v 0 0 0\nf 1 2 3\n", &mut ctx)
            .unwrap_err();
        assert_eq!(error.message, "Invalid vertex index.");
        assert_eq!(importer.error_message().as_deref(), Some("Invalid vertex index."));
        assert!(importer.take_model().is_none());

        importer.clear();
        importer.clear();
        assert!(importer.error_message().is_none());
    }

    #[test]
    fn test_importer_rejects_model_without_geometry() {
        let mut resolver = DependencyResolver::new("t.obj", None, |_| None);
        let mut ctx = ImportContext::new(ImportSettings::default(), &mut resolver);
        let mut importer = ObjImporter::new();

        let error = importer
            .import("t.obj", "obj", b"v 0 0 0\ng empty\n", &mut ctx)
            .unwrap_err();
        assert_eq!(error.message, "The model doesn't contain any meshes.");
    }

    #[test]
    fn test_import_discards_previous_failure() {
        let mut resolver = DependencyResolver::new("t.obj", None, |_| None);
        let mut ctx = ImportContext::new(ImportSettings::default(), &mut resolver);
        let mut importer = ObjImporter::new();

        assert!(importer
            .import("t.obj", "obj", b"v 0 0 0\nf 1 2 3\n", &mut ctx)
            .is_err());
        importer
            .import("t.obj", "obj", TRIANGLE.as_bytes(), &mut ctx)
            .unwrap();
        assert!(importer.error_message().is_none());
        assert_eq!(importer.take_model().map(|m| m.meshes().len()), Some(1));
    }

    #[test]
    fn test_resolve_index() {
        assert_eq!(resolve_index("1", 3), Some(0));
        assert_eq!(resolve_index("3", 3), Some(2));
        assert_eq!(resolve_index("4", 3), None);
        assert_eq!(resolve_index("-1", 3), Some(2));
        assert_eq!(resolve_index("-3", 3), Some(0));
        assert_eq!(resolve_index("-4", 3), None);
        assert_eq!(resolve_index("0", 3), None);
        assert_eq!(resolve_index("x", 3), None);
    }

    proptest! {
        #[test]
        fn prop_polygon_fan_has_k_minus_two_triangles(k in 3usize..24) {
            let mut text = String::new();
            for i in 0..k {
                text.push_str(&format!("v {} {} 0\n", i, i * i));
            }
            let refs: Vec<String> = (1..=k).map(|i| i.to_string()).collect();
            text.push_str(&format!("f {}\n", refs.join(" ")));

            let state = parse(&text);
            let triangles = triangle_vertices(&state, 0);
            prop_assert_eq!(triangles.len(), k - 2);
            for (i, triangle) in triangles.iter().enumerate() {
                prop_assert_eq!(*triangle, [0, i + 1, i + 2]);
            }
        }
    }
}
