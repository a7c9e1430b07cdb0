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

//! Content loaders for files in an import set
//!
//! The [`FileLoader`] trait is the boundary to raw I/O. Two implementations
//! ship with the crate:
//!
//! - [`DefaultFileLoader`]: local reads through `tokio::fs`, URL fetches
//!   through `reqwest`
//! - [`MemoryLoader`]: serves content from an in-memory map, for tests and
//!   for embedding callers that already hold the bytes
//!
//! # Example
//!
//! ```rust
//! use modelport_import::file::{ImporterFile, InputFile};
//! use modelport_import::loader::{FileLoader, MemoryLoader};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let loader = MemoryLoader::new().with_file("cube.obj", &b"v 0 0 0"[..]);
//! let file = ImporterFile::from_input(&InputFile::from_url("https://host/cube.obj"));
//! let bytes = loader.load(&file, &|_, _| {}).await.unwrap();
//! assert_eq!(&bytes[..], b"v 0 0 0");
//! # }
//! ```

use crate::error::LoadError;
use crate::file::{FileHandle, ImporterFile};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Debug;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tracing::{debug, instrument};

const READ_CHUNK_SIZE: usize = 64 * 1024;

/// Announced sizes are untrusted; buffers start at most this large
const MAX_PREALLOCATION: u64 = 16 << 20;

fn initial_capacity(announced: u64) -> usize {
    announced.min(MAX_PREALLOCATION) as usize
}

/// Byte-progress callback: `(loaded, total)`; `total` is 0 when unknown
pub type ByteProgress<'a> = &'a dyn Fn(u64, u64);

/// Obtains the content of a single file
///
/// Implementations run on the caller's task; the import pipeline never
/// loads two files at once.
#[async_trait(?Send)]
pub trait FileLoader: Debug {
    /// Load the full content of `file`, reporting byte progress as it arrives
    async fn load(&self, file: &ImporterFile, on_progress: ByteProgress<'_>)
        -> Result<Bytes, LoadError>;
}

/// Filesystem and HTTP loader
#[derive(Debug, Clone, Default)]
pub struct DefaultFileLoader {
    client: reqwest::Client,
}

impl DefaultFileLoader {
    /// Create a loader with a default HTTP client
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a loader whose HTTP requests carry `user_agent`
    pub fn with_user_agent(user_agent: &str) -> Result<Self, LoadError> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(DefaultFileLoader { client })
    }

    #[instrument(skip(self, on_progress))]
    async fn fetch(&self, url: &str, on_progress: ByteProgress<'_>) -> Result<Bytes, LoadError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let total = response.content_length().unwrap_or(0);
        let mut buffer = BytesMut::with_capacity(initial_capacity(total));
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            buffer.extend_from_slice(&chunk);
            on_progress(buffer.len() as u64, total);
        }

        debug!("Fetched {} bytes from {}", buffer.len(), url);
        Ok(buffer.freeze())
    }

    #[instrument(skip(path, on_progress), fields(path = %path.display()))]
    async fn read(path: &Path, on_progress: ByteProgress<'_>) -> Result<Bytes, LoadError> {
        let mut file = tokio::fs::File::open(path).await?;
        let total = file.metadata().await?.len();
        let mut buffer = BytesMut::with_capacity(initial_capacity(total));
        let mut chunk = vec![0u8; READ_CHUNK_SIZE];
        loop {
            let read = file.read(&mut chunk).await?;
            if read == 0 {
                break;
            }
            buffer.extend_from_slice(&chunk[..read]);
            on_progress(buffer.len() as u64, total);
        }

        debug!("Read {} bytes", buffer.len());
        Ok(buffer.freeze())
    }
}

#[async_trait(?Send)]
impl FileLoader for DefaultFileLoader {
    async fn load(
        &self,
        file: &ImporterFile,
        on_progress: ByteProgress<'_>,
    ) -> Result<Bytes, LoadError> {
        match file.handle() {
            Some(FileHandle::Memory(bytes)) => {
                on_progress(bytes.len() as u64, bytes.len() as u64);
                Ok(bytes.clone())
            }
            Some(FileHandle::Path(path)) => Self::read(path, on_progress).await,
            Some(FileHandle::Url(url)) => self.fetch(url, on_progress).await,
            None => Err(LoadError::UnsupportedSource(file.source().to_string())),
        }
    }
}

/// In-memory loader keyed by case-insensitive file name
#[derive(Debug, Default)]
pub struct MemoryLoader {
    files: HashMap<String, Bytes>,
    delays: HashMap<String, Duration>,
    requests: RefCell<Vec<String>>,
}

impl MemoryLoader {
    /// Create an empty loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`MemoryLoader::insert`]
    pub fn with_file(mut self, name: &str, content: impl Into<Bytes>) -> Self {
        self.insert(name, content);
        self
    }

    /// Make loads of `name` take `delay` before answering
    pub fn with_delay(mut self, name: &str, delay: Duration) -> Self {
        self.delays.insert(name.to_lowercase(), delay);
        self
    }

    /// Serve `content` for files named `name`
    pub fn insert(&mut self, name: &str, content: impl Into<Bytes>) {
        self.files.insert(name.to_lowercase(), content.into());
    }

    /// Names requested so far, in request order
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

#[async_trait(?Send)]
impl FileLoader for MemoryLoader {
    async fn load(
        &self,
        file: &ImporterFile,
        on_progress: ByteProgress<'_>,
    ) -> Result<Bytes, LoadError> {
        let key = file.name().to_lowercase();
        self.requests.borrow_mut().push(file.name().to_string());

        if let Some(delay) = self.delays.get(&key) {
            tokio::time::sleep(*delay).await;
        }

        let content = self
            .files
            .get(&key)
            .cloned()
            .ok_or_else(|| LoadError::NotFound(file.name().to_string()))?;
        on_progress(content.len() as u64, content.len() as u64);
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::InputFile;
    use std::cell::Cell;
    use std::io::Write;

    #[tokio::test]
    async fn test_default_loader_reads_path_with_progress() {
        let mut temp = tempfile::NamedTempFile::new().unwrap();
        temp.write_all(b"v 1 2 3\n").unwrap();

        let file = ImporterFile::from_input(&InputFile::from_path(temp.path()));
        let last = Cell::new((0u64, 0u64));
        let bytes = DefaultFileLoader::new()
            .load(&file, &|loaded, total| last.set((loaded, total)))
            .await
            .unwrap();

        assert_eq!(&bytes[..], b"v 1 2 3\n");
        assert_eq!(last.get(), (8, 8));
    }

    #[test]
    fn test_initial_capacity_is_capped() {
        assert_eq!(initial_capacity(0), 0);
        assert_eq!(initial_capacity(8), 8);
        assert_eq!(initial_capacity(u64::MAX), MAX_PREALLOCATION as usize);
    }

    #[tokio::test]
    async fn test_fetch_survives_forged_content_length() {
        use tokio::io::AsyncWriteExt;
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = vec![0u8; 4096];
            let _ = socket.read(&mut request).await.unwrap();
            socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 4611686018427387904\r\n\r\n12345678")
                .await
                .unwrap();
            socket.shutdown().await.unwrap();
        });

        let url = format!("http://{}/model.obj", addr);
        let file = ImporterFile::from_input(&InputFile::from_url(&url));
        let result = DefaultFileLoader::new().load(&file, &|_, _| {}).await;
        match result {
            Ok(bytes) => assert_eq!(&bytes[..], b"12345678"),
            Err(error) => assert!(matches!(error, LoadError::Http(_))),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_default_loader_missing_path() {
        let file = ImporterFile::from_input(&InputFile::from_path("/nonexistent/dir/model.obj"));
        let result = DefaultFileLoader::new().load(&file, &|_, _| {}).await;
        assert!(matches!(result, Err(LoadError::Io(_))));
    }

    #[tokio::test]
    async fn test_default_loader_rejects_decompressed() {
        let file = ImporterFile::decompressed("a.jpg", Bytes::new());
        let result = DefaultFileLoader::new().load(&file, &|_, _| {}).await;
        assert!(matches!(result, Err(LoadError::UnsupportedSource(_))));
    }

    #[tokio::test]
    async fn test_memory_loader_case_insensitive() {
        let loader = MemoryLoader::new().with_file("Cube.OBJ", &b"data"[..]);
        let file = ImporterFile::from_input(&InputFile::from_url("https://x/cube.obj"));
        assert_eq!(&loader.load(&file, &|_, _| {}).await.unwrap()[..], b"data");
        assert_eq!(loader.requests(), vec!["cube.obj".to_string()]);
    }

    #[tokio::test]
    async fn test_memory_loader_not_found() {
        let loader = MemoryLoader::new();
        let file = ImporterFile::from_input(&InputFile::from_url("https://x/none.obj"));
        let result = loader.load(&file, &|_, _| {}).await;
        assert!(matches!(result, Err(LoadError::NotFound(name)) if name == "none.obj"));
    }
}
