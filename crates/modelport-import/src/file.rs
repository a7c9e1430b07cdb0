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

//! File descriptors submitted for import
//!
//! An [`InputFile`] is what a caller hands in; an [`ImporterFile`] is the
//! orchestrator's view of it, with a normalized name, a derived extension and
//! write-once content.

use bytes::Bytes;
use std::borrow::Cow;
use std::fmt;
use std::path::PathBuf;

/// Where a file's content comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileSource {
    /// Remote resource fetched by URL
    Url,
    /// Local file handle
    File,
    /// Entry extracted from an archive in the same file set
    Decompressed,
}

impl fmt::Display for FileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileSource::Url => "url",
            FileSource::File => "file",
            FileSource::Decompressed => "decompressed",
        };
        f.write_str(name)
    }
}

/// Opaque payload identifying an input's content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileHandle {
    /// URL to fetch
    Url(String),
    /// Path on the local filesystem
    Path(PathBuf),
    /// Content already held in memory
    Memory(Bytes),
}

/// A user-submitted item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    /// Name as submitted (may include a path or URL)
    pub name: String,
    /// Origin of the content
    pub source: FileSource,
    /// Handle used to obtain the content
    pub data: FileHandle,
}

impl InputFile {
    /// Create an input with an explicit source and handle
    pub fn new(name: impl Into<String>, source: FileSource, data: FileHandle) -> Self {
        InputFile {
            name: name.into(),
            source,
            data,
        }
    }

    /// Input fetched from a URL; the URL doubles as the name
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        InputFile::new(url.clone(), FileSource::Url, FileHandle::Url(url))
    }

    /// Input read from a local path
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        InputFile::new(
            path.to_string_lossy().into_owned(),
            FileSource::File,
            FileHandle::Path(path),
        )
    }

    /// Local input whose bytes are already in memory
    pub fn from_bytes(name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        InputFile::new(name, FileSource::File, FileHandle::Memory(content.into()))
    }
}

/// A member of an [`ImporterFileList`](crate::file_list::ImporterFileList)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImporterFile {
    name: String,
    extension: String,
    source: FileSource,
    handle: Option<FileHandle>,
    content: Option<Bytes>,
}

impl ImporterFile {
    /// Wrap a submitted input; in-memory handles provide the content directly
    pub fn from_input(input: &InputFile) -> Self {
        let content = match &input.data {
            FileHandle::Memory(bytes) => Some(bytes.clone()),
            _ => None,
        };
        ImporterFile {
            name: file_name(&input.name),
            extension: file_extension(&input.name),
            source: input.source,
            handle: Some(input.data.clone()),
            content,
        }
    }

    /// An archive entry; always arrives with content
    pub fn decompressed(path: &str, content: Bytes) -> Self {
        ImporterFile {
            name: file_name(path),
            extension: file_extension(path),
            source: FileSource::Decompressed,
            handle: None,
            content: Some(content),
        }
    }

    /// Normalized base name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lower-cased extension without the dot; empty when absent
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Origin of the content
    pub fn source(&self) -> FileSource {
        self.source
    }

    /// Handle used by loaders; `None` for decompressed entries
    pub fn handle(&self) -> Option<&FileHandle> {
        self.handle.as_ref()
    }

    /// Loaded content, if any
    pub fn content(&self) -> Option<&Bytes> {
        self.content.as_ref()
    }

    /// Whether content is present
    pub fn has_content(&self) -> bool {
        self.content.is_some()
    }

    /// Store loaded content. Returns `false` and keeps the existing bytes when
    /// content was already set.
    pub fn set_content(&mut self, content: Bytes) -> bool {
        if self.content.is_some() {
            return false;
        }
        self.content = Some(content);
        true
    }

    /// Case-insensitive comparison against the base name of `path`
    pub fn matches_path(&self, path: &str) -> bool {
        self.name.to_lowercase() == file_name(path).to_lowercase()
    }
}

/// Base name of a path or URL: query string dropped, last `/` or `\`
/// component kept, percent-escapes decoded
pub fn file_name(path: &str) -> String {
    let without_query = path.split('?').next().unwrap_or(path);
    let base = without_query
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(without_query);
    urlencoding::decode(base)
        .unwrap_or(Cow::Borrowed(base))
        .into_owned()
}

/// Lower-cased extension of a path's base name; empty when there is none
pub fn file_extension(path: &str) -> String {
    let name = file_name(path);
    match name.rfind('.') {
        Some(dot) => name[dot + 1..].to_lowercase(),
        None => String::new(),
    }
}
