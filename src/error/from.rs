use std::fmt::Debug;

use aws_sdk_s3::{error::SdkError, primitives::ByteStreamError};
use tokio::task::JoinError;

use super::{AnyError, Error};

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::Io(AnyError(error.into()))
    }
}

impl From<tempfile::PersistError> for Error {
    fn from(error: tempfile::PersistError) -> Self {
        Error::Io(AnyError(error.into()))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(error: serde_yaml::Error) -> Self {
        Error::InvalidConfig(error.to_string())
    }
}

impl From<JoinError> for Error {
    fn from(error: JoinError) -> Self {
        Error::Io(AnyError(error.into()))
    }
}

impl From<ByteStreamError> for Error {
    fn from(error: ByteStreamError) -> Self {
        Error::transport(error)
    }
}

impl<E: std::error::Error + Send + Sync + 'static, R: Debug + Send + Sync + 'static>
    From<SdkError<E, R>> for Error
{
    fn from(error: SdkError<E, R>) -> Self {
        Error::transport(error)
    }
}
