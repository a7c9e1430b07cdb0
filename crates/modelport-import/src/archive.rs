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

//! Zip archive expansion

use crate::error::{ArchiveError, ArchiveResult};
use bytes::Bytes;
use std::io::{Cursor, Read};
use tracing::debug;

/// Extension that marks a file as an archive
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Largest uncompressed entry [`decompress`] accepts
pub const MAX_ENTRY_SIZE: u64 = 1 << 30;

/// Header sizes are untrusted; buffers start at most this large
const MAX_PREALLOCATION: u64 = 16 << 20;

/// A file extracted from an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Path inside the archive
    pub path: String,
    /// Uncompressed bytes
    pub content: Bytes,
}

/// Whether `extension` (lower-case, no dot) names an archive
pub fn is_archive_extension(extension: &str) -> bool {
    extension == ARCHIVE_EXTENSION
}

/// Expand every file entry of a zip archive, in archive order. Directory
/// entries are skipped.
pub fn decompress(data: &[u8]) -> ArchiveResult<Vec<ArchiveEntry>> {
    decompress_with_limit(data, MAX_ENTRY_SIZE)
}

/// [`decompress`] with an explicit per-entry size limit
pub fn decompress_with_limit(data: &[u8], max_entry_size: u64) -> ArchiveResult<Vec<ArchiveEntry>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data))?;
    let mut entries = Vec::with_capacity(archive.len());

    for index in 0..archive.len() {
        let mut file = archive.by_index(index)?;
        if file.is_dir() {
            continue;
        }
        let path = file.name().to_string();
        let capacity = file.size().min(max_entry_size).min(MAX_PREALLOCATION);
        let mut content = Vec::with_capacity(capacity as usize);
        (&mut file)
            .take(max_entry_size.saturating_add(1))
            .read_to_end(&mut content)?;
        if content.len() as u64 > max_entry_size {
            return Err(ArchiveError::EntryTooLarge {
                path,
                limit: max_entry_size,
            });
        }
        debug!("Extracted {} ({} bytes)", path, content.len());
        entries.push(ArchiveEntry {
            path,
            content: Bytes::from(content),
        });
    }

    Ok(entries)
}
