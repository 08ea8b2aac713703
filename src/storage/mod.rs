mod gcs;
mod local;
mod stats;

use std::{
    fmt::Debug,
    io::Read,
    path::PathBuf,
    pin::Pin,
    sync::Arc,
};

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine};
use tokio::{
    fs,
    io::{AsyncBufRead, AsyncReadExt},
    task::spawn_blocking,
};
use tokio_stream::{Stream, StreamExt};

use crate::{content_type::ContentType, error::Result};

pub use {gcs::GcsStore, local::LocalStore, stats::StoreStats};

pub type ObjectReader = Pin<Box<dyn AsyncBufRead + Send>>;
pub type KeyStream<'a> = Pin<Box<dyn Stream<Item = Result<String>> + Send + 'a>>;
pub type SharedStore = Arc<dyn ObjectStore>;

const DIGEST_BUFFER_SIZE: usize = 64 * 1024;

/// Where the payload of a `put` comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ByteSource {
    Bytes(Vec<u8>),
    File(PathBuf),
}

#[async_trait]
pub trait ObjectStore: Debug + Send + Sync {
    async fn exists(&self, bucket: &str, key: &str) -> Result<bool>;
    async fn get(&self, bucket: &str, key: &str) -> Result<ObjectReader>;
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        source: ByteSource,
        content_type: ContentType,
    ) -> Result<()>;
    async fn delete(&self, bucket: &str, key: &str) -> Result<()>;

    /// Every call starts a fresh listing.
    fn list_keys<'a>(&'a self, bucket: &'a str, prefix: Option<&'a str>) -> KeyStream<'a>;

    fn stats(&self) -> &StoreStats;

    async fn get_bytes(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let mut reader = self.get(bucket, key).await?;
        let mut bytes = vec![];
        reader.read_to_end(&mut bytes).await?;
        Ok(bytes)
    }

    async fn keys_vec(&self, bucket: &str, prefix: Option<&str>) -> Result<Vec<String>> {
        self.list_keys(bucket, prefix).collect().await
    }

    async fn any_key(&self, bucket: &str, prefix: Option<&str>) -> Result<bool> {
        let mut keys = self.list_keys(bucket, prefix);
        match keys.next().await {
            Some(Ok(_)) => Ok(true),
            Some(Err(err)) => Err(err),
            None => Ok(false),
        }
    }
}

impl ByteSource {
    pub async fn len(&self) -> Result<u64> {
        match self {
            ByteSource::Bytes(bytes) => Ok(bytes.len() as u64),
            ByteSource::File(path) => Ok(fs::metadata(path).await?.len()),
        }
    }

    pub async fn md5_base64(&self) -> Result<String> {
        let source = self.clone();
        let encoded_digest = spawn_blocking(move || match source {
            ByteSource::Bytes(bytes) => Ok(md5_base64(&bytes)),
            ByteSource::File(path) => md5_base64_file(&path),
        })
        .await??;
        Ok(encoded_digest)
    }

    pub async fn into_byte_stream(self) -> Result<ByteStream> {
        let stream = match self {
            ByteSource::Bytes(bytes) => ByteStream::from(bytes),
            ByteSource::File(path) => ByteStream::from_path(path).await?,
        };
        Ok(stream)
    }
}

fn md5_base64(bytes: &[u8]) -> String {
    let digest = md5::compute(bytes);
    BASE64_STANDARD.encode(digest.0)
}

fn md5_base64_file(path: &std::path::Path) -> Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut context = md5::Context::new();
    let mut buffer = vec![0; DIGEST_BUFFER_SIZE];
    loop {
        let n = file.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        context.consume(&buffer[..n]);
    }

    Ok(BASE64_STANDARD.encode(context.compute().0))
}
