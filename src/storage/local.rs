use std::{
    io,
    path::{Component, Path, PathBuf},
    time::Duration,
};

use async_stream::try_stream;
use async_trait::async_trait;
use log::trace;
use tempfile::NamedTempFile;
use tokio::{
    fs::{self, File},
    io::BufReader,
    task::spawn_blocking,
    time::sleep,
};
use tokio_stream::Stream;

use crate::{
    content_type::ContentType,
    error::{Error, Result},
};

use super::{ByteSource, KeyStream, ObjectReader, ObjectStore, StoreStats};

const STAGING_DIR: &str = ".staging";

/// Buckets as directories under `path`, for development and tests.
#[derive(Debug)]
pub struct LocalStore {
    path: PathBuf,
    latency: Option<Duration>,
    stats: StoreStats,
}

impl LocalStore {
    pub fn new<P: Into<PathBuf>>(path: P, latency: Option<Duration>) -> Self {
        LocalStore {
            path: path.into(),
            latency,
            stats: StoreStats::new(),
        }
    }

    fn bucket_path(&self, bucket: &str) -> PathBuf {
        self.path.join(bucket)
    }

    /// Only keys that map back to themselves are accepted: `a//b.txt` or `c.txt/` would
    /// otherwise share a file with `a/b.txt` or `c.txt`.
    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let segments = relative
            .components()
            .map(|component| match component {
                Component::Normal(segment) => segment.to_str(),
                _ => None,
            })
            .collect::<Option<Vec<_>>>();

        match segments {
            Some(segments) if !segments.is_empty() && segments.join("/") == key => {
                Ok(self.bucket_path(bucket).join(relative))
            }
            _ => Err(Error::InvalidPath(format!("gs://{bucket}/{key}"))),
        }
    }

    fn staging_path(&self) -> PathBuf {
        self.path.join(STAGING_DIR)
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            sleep(latency).await;
        }
    }

    fn keys<'a>(
        &'a self,
        bucket: &'a str,
        prefix: Option<&'a str>,
    ) -> impl Stream<Item = Result<String>> + Send + 'a {
        try_stream! {
            self.simulate_latency().await;
            self.stats.add_list();

            let root = self.bucket_path(bucket);
            let mut keys = vec![];
            let mut pending = vec![root.clone()];

            while let Some(dir) = pending.pop() {
                let mut entries = match fs::read_dir(&dir).await {
                    Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
                    result => result?,
                };

                while let Some(entry) = entries.next_entry().await? {
                    let path = entry.path();
                    if entry.file_type().await?.is_dir() {
                        pending.push(path);
                    } else {
                        keys.push(key_from_path(&root, &path)?);
                    }
                }
            }

            keys.sort();
            for key in keys {
                if prefix.map_or(true, |prefix| key.starts_with(prefix)) {
                    yield key;
                }
            }
        }
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    async fn exists(&self, bucket: &str, key: &str) -> Result<bool> {
        self.simulate_latency().await;
        self.stats.add_exists();

        let path = self.object_path(bucket, key)?;
        match fs::metadata(path).await {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<ObjectReader> {
        self.simulate_latency().await;

        let path = self.object_path(bucket, key)?;
        let file = match File::open(&path).await {
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(Error::not_found(bucket, key));
            }
            result => result?,
        };

        let metadata = file.metadata().await?;
        if metadata.is_dir() {
            return Err(Error::not_found(bucket, key));
        }

        self.stats.add_get(metadata.len());
        Ok(Box::pin(BufReader::new(file)))
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        source: ByteSource,
        content_type: ContentType,
    ) -> Result<()> {
        self.simulate_latency().await;

        let path = self.object_path(bucket, key)?;
        let staging_path = self.staging_path();
        let size = source.len().await?;
        trace!("writing {} as {content_type}", path.display());

        fs::create_dir_all(&staging_path).await?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Readers only ever see the old file or the complete new one.
        spawn_blocking(move || -> Result<()> {
            let mut staged = NamedTempFile::new_in(staging_path)?;
            match source {
                ByteSource::Bytes(bytes) => io::Write::write_all(&mut staged, &bytes)?,
                ByteSource::File(source_path) => {
                    let mut file = std::fs::File::open(source_path)?;
                    io::copy(&mut file, &mut staged)?;
                }
            }

            staged.as_file().sync_all()?;
            staged.persist(path)?;
            Ok(())
        })
        .await??;

        self.stats.add_put(size);
        Ok(())
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<()> {
        self.simulate_latency().await;
        self.stats.add_delete();

        let path = self.object_path(bucket, key)?;
        match fs::remove_file(path).await {
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            result => Ok(result?),
        }
    }

    fn list_keys<'a>(&'a self, bucket: &'a str, prefix: Option<&'a str>) -> KeyStream<'a> {
        Box::pin(self.keys(bucket, prefix))
    }

    fn stats(&self) -> &StoreStats {
        &self.stats
    }
}

fn key_from_path(root: &Path, path: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| Error::InvalidPath(path.display().to_string()))?;
    let segments = relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>();
    Ok(segments.join("/"))
}
