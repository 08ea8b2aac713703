use std::path::Path;

use log::debug;
use tokio_stream::StreamExt;

use crate::{
    content_type::ContentType,
    error::{Error, Result},
    path::GcsPath,
    storage::{ByteSource, KeyStream, SharedStore},
};

/// Directory-like view over a flat object namespace: a "directory" exists while at least one
/// key lives under `dir/`.
#[derive(Debug, Clone)]
pub struct GcsFileSystem {
    store: SharedStore,
}

impl GcsFileSystem {
    pub fn new(store: SharedStore) -> Self {
        GcsFileSystem { store }
    }

    pub async fn exists(&self, path: &GcsPath) -> Result<bool> {
        if !path.is_dir_key() && self.store.exists(path.bucket(), path.key()).await? {
            return Ok(true);
        }

        self.is_dir(path).await
    }

    pub async fn is_dir(&self, path: &GcsPath) -> Result<bool> {
        if path.is_root() {
            return Ok(true);
        }

        let prefix = path.dir_prefix();
        self.store.any_key(path.bucket(), Some(&prefix)).await
    }

    /// Object stores have no directories to create.
    #[allow(clippy::unused_async)]
    pub async fn mkdir(&self, _path: &GcsPath) -> Result<()> {
        Ok(())
    }

    /// Returns whether anything was removed.
    pub async fn remove(&self, path: &GcsPath, recursive: bool) -> Result<bool> {
        if path.is_root() {
            return Err(Error::RootNotRemovable(path.bucket().to_owned()));
        }

        if !path.is_dir_key() && self.store.exists(path.bucket(), path.key()).await? {
            self.store.delete(path.bucket(), path.key()).await?;
            return Ok(true);
        }

        if !self.is_dir(path).await? {
            return Ok(false);
        }

        if !recursive {
            return Err(Error::IsDirectory(path.to_string()));
        }

        let prefix = path.dir_prefix();
        let keys = self.store.keys_vec(path.bucket(), Some(&prefix)).await?;
        debug!("removing {} objects under {path}", keys.len());
        for key in keys {
            self.store.delete(path.bucket(), &key).await?;
        }

        Ok(true)
    }

    /// Uploads a local file in one request. Not atomic with respect to the local file: use
    /// [`crate::AtomicTarget`] for content that is still being produced.
    pub async fn put_file(&self, local_path: &Path, destination: &GcsPath) -> Result<()> {
        let content_type = ContentType::for_path(destination)?;
        let source = ByteSource::File(local_path.to_owned());
        self.store
            .put(destination.bucket(), destination.key(), source, content_type)
            .await
    }

    pub fn list<'a>(&'a self, path: &'a GcsPath, prefix: &'a str) -> KeyStream<'a> {
        self.store.list_keys(path.bucket(), Some(prefix))
    }

    pub async fn list_dir(&self, path: &GcsPath) -> Result<Vec<String>> {
        let prefix = if path.is_root() {
            String::new()
        } else {
            path.dir_prefix()
        };

        let mut keys = self.list(path, &prefix);
        let mut found = vec![];
        while let Some(key) = keys.next().await {
            found.push(key?);
        }
        Ok(found)
    }
}
