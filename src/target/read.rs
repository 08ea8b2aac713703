use std::{
    io,
    pin::Pin,
    task::{Context, Poll},
};

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, Lines, ReadBuf};

use crate::{error::Result, path::GcsPath, storage::ObjectReader};

/// Sequential reader over a committed object. A failed read has to start over from a new
/// session; there are no range requests.
pub struct ReadSession {
    path: GcsPath,
    reader: ObjectReader,
}

impl ReadSession {
    pub(super) fn new(path: GcsPath, reader: ObjectReader) -> Self {
        ReadSession { path, reader }
    }

    pub fn path(&self) -> &GcsPath {
        &self.path
    }

    pub async fn read_all(mut self) -> Result<Vec<u8>> {
        let mut bytes = vec![];
        self.read_to_end(&mut bytes).await?;
        Ok(bytes)
    }

    pub fn lines(self) -> Lines<Self> {
        AsyncBufReadExt::lines(self)
    }
}

impl std::fmt::Debug for ReadSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadSession")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl AsyncRead for ReadSession {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        self.get_mut().reader.as_mut().poll_read(cx, buf)
    }
}

impl AsyncBufRead for ReadSession {
    fn poll_fill_buf(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<&[u8]>> {
        self.get_mut().reader.as_mut().poll_fill_buf(cx)
    }

    fn consume(self: Pin<&mut Self>, amt: usize) {
        self.get_mut().reader.as_mut().consume(amt);
    }
}
