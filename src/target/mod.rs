mod read;
mod write;

#[cfg(test)]
mod tests;

use std::{path::PathBuf, str::FromStr};

use async_trait::async_trait;
use log::debug;
use tokio::io::AsyncWriteExt;

use crate::{
    content_type::ContentType,
    error::{Error, Result},
    path::GcsPath,
    storage::SharedStore,
};

pub use {read::ReadSession, write::WriteSession};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Read,
    Write,
}

impl FromStr for OpenMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "r" => Ok(OpenMode::Read),
            "w" => Ok(OpenMode::Write),
            _ => Err(Error::UnsupportedMode(s.to_owned())),
        }
    }
}

#[derive(Debug)]
pub enum TargetHandle {
    Read(ReadSession),
    Write(WriteSession),
}

/// What a workflow host needs from an output: a stable identity, an existence check and a
/// way to open it.
#[async_trait]
pub trait Target: Send + Sync {
    fn path(&self) -> &GcsPath;
    async fn exists(&self) -> Result<bool>;
    async fn open(&self, mode: OpenMode) -> Result<TargetHandle>;
}

/// A GCS object whose content appears all at once, or not at all.
#[derive(Debug, Clone)]
pub struct AtomicTarget {
    path: GcsPath,
    store: SharedStore,
    staging_dir: Option<PathBuf>,
}

impl AtomicTarget {
    pub fn new(path: GcsPath, store: SharedStore) -> Self {
        AtomicTarget {
            path,
            store,
            staging_dir: None,
        }
    }

    #[must_use]
    pub fn with_staging_dir(mut self, staging_dir: Option<PathBuf>) -> Self {
        self.staging_dir = staging_dir;
        self
    }

    pub fn path(&self) -> &GcsPath {
        &self.path
    }

    pub fn content_type(&self) -> Result<ContentType> {
        ContentType::for_path(&self.path)
    }

    pub async fn exists(&self) -> Result<bool> {
        self.store.exists(self.path.bucket(), self.path.key()).await
    }

    pub async fn open_read(&self) -> Result<ReadSession> {
        let reader = self.store.get(self.path.bucket(), self.path.key()).await?;
        Ok(ReadSession::new(self.path.clone(), reader))
    }

    /// Fails before touching disk or network if the path has no known content type.
    pub async fn open_write(&self) -> Result<WriteSession> {
        let content_type = self.content_type()?;
        WriteSession::create(
            self.path.clone(),
            content_type,
            self.store.clone(),
            self.staging_dir.clone(),
        )
        .await
    }

    pub async fn write(&self, bytes: &[u8]) -> Result<()> {
        let mut session = self.open_write().await?;
        session.write_all(bytes).await?;
        session.commit().await
    }

    pub async fn read(&self) -> Result<Vec<u8>> {
        self.open_read().await?.read_all().await
    }

    pub async fn remove(&self) -> Result<()> {
        debug!("removing {}", self.path);
        self.store
            .delete(self.path.bucket(), self.path.key())
            .await
    }
}

#[async_trait]
impl Target for AtomicTarget {
    fn path(&self) -> &GcsPath {
        &self.path
    }

    async fn exists(&self) -> Result<bool> {
        AtomicTarget::exists(self).await
    }

    async fn open(&self, mode: OpenMode) -> Result<TargetHandle> {
        match mode {
            OpenMode::Read => Ok(TargetHandle::Read(self.open_read().await?)),
            OpenMode::Write => Ok(TargetHandle::Write(self.open_write().await?)),
        }
    }
}
