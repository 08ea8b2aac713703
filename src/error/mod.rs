mod from;

use std::{fmt::Display, path::PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error("no object found at `gs://{bucket}/{key}`")]
    NotFound { bucket: String, key: String },

    #[error("path `{0}` is invalid")]
    InvalidPath(String),

    #[error("no known content type for `{0}`")]
    UnknownContentType(String),

    #[error("open mode `{0}` is not supported")]
    UnsupportedMode(String),

    #[error("can't remove root of bucket `{0}`")]
    RootNotRemovable(String),

    #[error("`{0}` is a directory, remove it recursively")]
    IsDirectory(String),

    #[error("config `{0}` does not exist")]
    MissingConfig(PathBuf),

    #[error("config is invalid: {0}")]
    InvalidConfig(String),

    #[error("service account email and HMAC secret must be provided")]
    MissingCredentials,

    #[error(transparent)]
    Io(AnyError),

    #[error(transparent)]
    Transport(AnyError),
}

/// Broad classes of failure, used to decide whether an operation may be retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Config,
    Transport,
    Io,
}

#[derive(Error, Debug)]
pub struct AnyError(anyhow::Error);

impl Display for AnyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialEq for AnyError {
    fn eq(&self, _other: &Self) -> bool {
        false
    }
}

impl Error {
    pub fn not_found(bucket: &str, key: &str) -> Self {
        Error::NotFound {
            bucket: bucket.to_owned(),
            key: key.to_owned(),
        }
    }

    pub fn transport<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Transport(AnyError(error.into()))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::InvalidPath(_)
            | Error::UnknownContentType(_)
            | Error::UnsupportedMode(_)
            | Error::RootNotRemovable(_)
            | Error::IsDirectory(_)
            | Error::MissingConfig(_)
            | Error::InvalidConfig(_)
            | Error::MissingCredentials => ErrorKind::Config,
            Error::Io(_) => ErrorKind::Io,
            Error::Transport(_) => ErrorKind::Transport,
        }
    }

    /// Every store operation fully replaces or reads whole objects, so transport failures are
    /// safe to retry; everything else will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }
}

impl From<anyhow::Error> for Error {
    fn from(error: anyhow::Error) -> Self {
        Error::Transport(AnyError(error))
    }
}
