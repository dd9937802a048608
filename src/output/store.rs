//! Destination upload support (HDFS, local filesystem, in-memory)

use super::writer::FileRef;
use crate::error::{Error, Result};
use futures::TryStreamExt;
use hdfs_native_object_store::HdfsObjectStore;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use std::sync::Arc;
use tracing::info;

/// Upload destination parsed from the configured destination path.
///
/// Authentication and cluster addressing for HDFS are delegated to the
/// Hadoop client configuration files (`core-site.xml`, `hdfs-site.xml`)
/// resolved out-of-band; this type only routes bytes.
#[derive(Debug, Clone)]
pub struct Destination {
    /// The object store implementation
    store: Arc<dyn ObjectStore>,
    /// Base path prefix within the filesystem
    prefix: String,
    /// Original URL scheme for logging
    scheme: String,
}

impl Destination {
    /// Parse a destination path and create the appropriate store
    ///
    /// Supported formats:
    /// - `hdfs://namenode:port/path/` - HDFS
    /// - `/local/path/` or `./path/` - local filesystem (staging/testing)
    pub fn parse(url: &str) -> Result<Self> {
        if url.starts_with("hdfs://") {
            Self::parse_hdfs(url)
        } else {
            Self::parse_local(url)
        }
    }

    /// Parse an HDFS URL
    fn parse_hdfs(url: &str) -> Result<Self> {
        let without_scheme = url
            .strip_prefix("hdfs://")
            .ok_or_else(|| Error::config(format!("Invalid hdfs URL: {url}")))?;

        let (authority, prefix) = match without_scheme.find('/') {
            Some(idx) => (
                &without_scheme[..idx],
                without_scheme[idx + 1..].trim_end_matches('/').to_string(),
            ),
            None => (without_scheme, String::new()),
        };

        let store = HdfsObjectStore::with_url(&format!("hdfs://{authority}"))
            .map_err(|e| Error::config(format!("Failed to create HDFS client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix,
            scheme: "hdfs".to_string(),
        })
    }

    /// Parse a local filesystem path
    fn parse_local(path: &str) -> Result<Self> {
        let path = path.strip_prefix("file://").unwrap_or(path);

        std::fs::create_dir_all(path)
            .map_err(|e| Error::config(format!("Failed to create directory {path}: {e}")))?;

        let store = LocalFileSystem::new_with_prefix(path)
            .map_err(|e| Error::config(format!("Failed to create local store: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix: String::new(),
            scheme: "file".to_string(),
        })
    }

    /// An in-memory destination for tests
    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(InMemory::new()),
            prefix: String::new(),
            scheme: "memory".to_string(),
        }
    }

    /// Check if this destination is a remote filesystem
    pub fn is_remote(&self) -> bool {
        self.scheme == "hdfs"
    }

    /// Get the scheme (hdfs, file, memory)
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Upload a finished file under the destination prefix.
    ///
    /// Blocking from the pipeline's point of view: the engine awaits every
    /// upload before reading further input. No internal retry.
    pub async fn put(&self, file: &FileRef) -> Result<String> {
        let path = if self.prefix.is_empty() {
            ObjectPath::from(file.path.as_str())
        } else {
            ObjectPath::from(format!("{}/{}", self.prefix, file.path))
        };

        self.store
            .put(&path, file.data.clone().into())
            .await
            .map_err(|e| Error::upload(path.to_string(), e.to_string()))?;

        let full_path = format!("{}://{path}", self.scheme);
        info!(
            rows = file.rows,
            bytes = file.size(),
            "Uploaded {full_path}"
        );
        Ok(full_path)
    }

    /// List all uploaded paths, in sorted order. Test helper.
    pub async fn list_paths(&self) -> Result<Vec<String>> {
        let objects: Vec<_> = self.store.list(None).try_collect().await?;
        let mut paths: Vec<String> = objects.iter().map(|o| o.location.to_string()).collect();
        paths.sort();
        Ok(paths)
    }

    /// Fetch an uploaded object's bytes. Test helper.
    pub async fn fetch(&self, path: &str) -> Result<bytes::Bytes> {
        let result = self.store.get(&ObjectPath::from(path)).await?;
        Ok(result.bytes().await?)
    }
}
