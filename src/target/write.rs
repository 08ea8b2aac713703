use std::{
    io,
    path::{Path, PathBuf},
    pin::Pin,
    task::{Context, Poll},
};

use log::{debug, info};
use tempfile::{Builder, TempPath};
use tokio::{
    fs::File,
    io::{AsyncWrite, AsyncWriteExt},
    task::spawn_blocking,
};

use crate::{
    content_type::ContentType,
    error::Result,
    path::GcsPath,
    storage::{ByteSource, SharedStore},
};

const STAGING_PREFIX: &str = "gcstarget-";

/// Bytes staged in a local temporary file until [`WriteSession::commit`] uploads them.
///
/// Dropping a session without committing discards the staging file and leaves the remote
/// object untouched.
#[derive(Debug)]
pub struct WriteSession {
    path: GcsPath,
    content_type: ContentType,
    store: SharedStore,
    file: File,
    staging: TempPath,
    bytes_written: u64,
}

impl WriteSession {
    pub(super) async fn create(
        path: GcsPath,
        content_type: ContentType,
        store: SharedStore,
        staging_dir: Option<PathBuf>,
    ) -> Result<Self> {
        let suffix = path.extension().map(|ext| format!(".{ext}")).unwrap_or_default();
        let named = spawn_blocking(move || {
            let mut builder = Builder::new();
            builder.prefix(STAGING_PREFIX).suffix(&suffix);
            match staging_dir {
                Some(dir) => builder.tempfile_in(dir),
                None => builder.tempfile(),
            }
        })
        .await??;

        let (file, staging) = named.into_parts();
        debug!("staging {path} in {}", staging.display());

        Ok(WriteSession {
            path,
            content_type,
            store,
            file: File::from_std(file),
            staging,
            bytes_written: 0,
        })
    }

    pub fn path(&self) -> &GcsPath {
        &self.path
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn staging_path(&self) -> &Path {
        &self.staging
    }

    /// Uploads everything written so far in a single `put`. The target becomes visible only
    /// if this returns `Ok`.
    pub async fn commit(mut self) -> Result<()> {
        self.file.flush().await?;
        self.file.sync_all().await?;

        let WriteSession {
            path,
            content_type,
            store,
            file,
            staging,
            bytes_written,
        } = self;
        drop(file);

        let source = ByteSource::File(staging.to_path_buf());
        store
            .put(path.bucket(), path.key(), source, content_type)
            .await?;

        info!("committed {bytes_written} bytes to {path}");
        drop(staging);
        Ok(())
    }

    pub fn abort(self) {
        debug!(
            "discarding {} staged bytes for {}",
            self.bytes_written, self.path
        );
    }
}

impl AsyncWrite for WriteSession {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        let poll = Pin::new(&mut this.file).poll_write(cx, buf);
        if let Poll::Ready(Ok(n)) = poll {
            this.bytes_written += n as u64;
        }
        poll
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().file).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().file).poll_shutdown(cx)
    }
}
