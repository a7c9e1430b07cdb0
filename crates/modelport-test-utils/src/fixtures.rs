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

//! Test fixture data.
//!
//! Small model sources and archives built in memory, so tests never depend
//! on files checked into the repository.

use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Test fixture helpers.
pub struct TestFixtures;

impl TestFixtures {
    /// A textured cube split into two groups, using `cube.mtl`.
    pub fn cube_obj() -> &'static str {
        "# cube\n\
         mtllib cube.mtl\n\
         v -1 -1 -1\nv 1 -1 -1\nv 1 1 -1\nv -1 1 -1\n\
         v -1 -1 1\nv 1 -1 1\nv 1 1 1\nv -1 1 1\n\
         vt 0 0\nvt 1 0\nvt 1 1\nvt 0 1\n\
         vn 0 0 -1\nvn 0 0 1\nvn 0 -1 0\nvn 0 1 0\nvn -1 0 0\nvn 1 0 0\n\
         g front_back\n\
         usemtl wood\n\
         f 1/1/1 4/4/1 3/3/1 2/2/1\n\
         f 5/1/2 6/2/2 7/3/2 8/4/2\n\
         g sides\n\
         usemtl metal\n\
         f 1/1/3 2/2/3 6/3/3 5/4/3\n\
         f 4/1/4 8/2/4 7/3/4 3/4/4\n\
         f 1/1/5 5/2/5 8/3/5 4/4/5\n\
         f 2/1/6 3/2/6 7/3/6 6/4/6\n"
    }

    /// Material library for [`TestFixtures::cube_obj`]. `wood` references
    /// `wood.jpg`.
    pub fn cube_mtl() -> &'static str {
        "newmtl wood\n\
         Kd 0.6 0.4 0.2\n\
         Ns 250\n\
         map_Kd wood.jpg\n\
         \n\
         newmtl metal\n\
         Kd 0.8 0.8 0.8\n\
         Ks 1 1 1\n\
         d 0.5\n"
    }

    /// Single triangle without materials.
    pub fn triangle_obj() -> &'static str {
        "v 0 0 0\nv 1 0 0\nv 1 1 0\nf 1 2 3\n"
    }

    /// Stand-in bytes for a JPEG texture; only the SOI/EOI markers are real.
    pub fn texture_bytes() -> Vec<u8> {
        let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
        bytes.extend((0..64).map(|i| (i % 256) as u8));
        bytes.extend([0xFF, 0xD9]);
        bytes
    }

    /// OBJ source with `vertex_count` vertices in a row and one polygon
    /// referencing them all.
    pub fn polygon_obj(vertex_count: usize) -> String {
        let mut source = String::with_capacity(vertex_count * 16);
        for i in 0..vertex_count {
            let angle = i as f64 / vertex_count as f64 * std::f64::consts::TAU;
            source.push_str(&format!("v {:.4} {:.4} 0\n", angle.cos(), angle.sin()));
        }
        source.push('f');
        for i in 1..=vertex_count {
            source.push_str(&format!(" {}", i));
        }
        source.push('\n');
        source
    }

    /// A grid of `size` x `size` quads, for benchmarks.
    pub fn grid_obj(size: usize) -> String {
        let mut source = String::new();
        for y in 0..=size {
            for x in 0..=size {
                source.push_str(&format!("v {} {} 0\nvt {} {}\n", x, y, x, y));
            }
        }
        source.push_str("vn 0 0 1\ng grid\n");
        let row = size + 1;
        for y in 0..size {
            for x in 0..size {
                let a = y * row + x + 1;
                let b = a + 1;
                let c = b + row;
                let d = a + row;
                source.push_str(&format!(
                    "f {a}/{a}/1 {b}/{b}/1 {c}/{c}/1 {d}/{d}/1\n"
                ));
            }
        }
        source
    }

    /// Build a deflate-compressed zip archive holding `entries` in order.
    ///
    /// # Panics
    ///
    /// Panics if the archive cannot be written, which only happens on
    /// invalid entry names.
    pub fn zip_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, content) in entries {
            writer
                .start_file(*name, options)
                .expect("Failed to start zip entry");
            writer
                .write_all(content)
                .expect("Failed to write zip entry");
        }
        writer
            .finish()
            .expect("Failed to finish zip archive")
            .into_inner()
    }
}
