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

//! Cached, attribution-tracking access to auxiliary files
//!
//! Format importers ask for referenced files (material libraries, textures)
//! by name. Every distinct name is looked up once; the name lands in the used
//! list when found and in the missing list otherwise.

use crate::file::file_name;
use crate::file_list::ImporterFileList;
use bytes::Bytes;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

type Lookup<'a> = Box<dyn FnMut(&str) -> Option<Bytes> + 'a>;

/// Dependency accessor handed to format importers
pub struct DependencyResolver<'a> {
    lookup: Lookup<'a>,
    cache: HashMap<String, Option<Bytes>>,
    used_files: Vec<String>,
    missing_files: Vec<String>,
}

impl<'a> DependencyResolver<'a> {
    /// Wrap `lookup`. The main file is recorded as used up front and answers
    /// from the cache, so it never goes through `lookup`.
    pub fn new<F>(main_file: &str, main_content: Option<Bytes>, lookup: F) -> Self
    where
        F: FnMut(&str) -> Option<Bytes> + 'a,
    {
        let main_name = file_name(main_file);
        let mut cache = HashMap::new();
        cache.insert(cache_key(&main_name), main_content);
        DependencyResolver {
            lookup: Box::new(lookup),
            cache,
            used_files: vec![main_name],
            missing_files: Vec::new(),
        }
    }

    /// Resolver whose lookups go to `file_list`; a file without content
    /// counts as missing
    pub fn for_file_list(file_list: &'a ImporterFileList, main_file: &str) -> Self {
        let main_content = file_list
            .find_file_by_path(main_file)
            .and_then(|file| file.content().cloned());
        DependencyResolver::new(main_file, main_content, move |name| {
            file_list
                .find_file_by_path(name)
                .and_then(|file| file.content().cloned())
        })
    }

    /// Content of the file referenced by `path`, or `None` when it is absent
    pub fn file_buffer(&mut self, path: &str) -> Option<Bytes> {
        let name = file_name(path);
        let key = cache_key(&name);
        if let Some(cached) = self.cache.get(&key) {
            return cached.clone();
        }

        let buffer = (self.lookup)(&name);
        if buffer.is_some() {
            debug!("Resolved dependency {}", name);
            self.used_files.push(name);
        } else {
            debug!("Missing dependency {}", name);
            self.missing_files.push(name);
        }
        self.cache.insert(key, buffer.clone());
        buffer
    }

    /// Names resolved so far; the main file comes first
    pub fn used_files(&self) -> &[String] {
        &self.used_files
    }

    /// Names requested but not found
    pub fn missing_files(&self) -> &[String] {
        &self.missing_files
    }

    /// Consume the resolver, returning `(used, missing)`
    pub fn into_files(self) -> (Vec<String>, Vec<String>) {
        (self.used_files, self.missing_files)
    }
}

impl fmt::Debug for DependencyResolver<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyResolver")
            .field("cached", &self.cache.len())
            .field("used_files", &self.used_files)
            .field("missing_files", &self.missing_files)
            .finish()
    }
}

fn cache_key(name: &str) -> String {
    name.to_lowercase()
}
