#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

pub mod cli;
pub mod config;
pub mod content_type;
pub mod error;
pub mod filesystem;
pub mod path;
pub mod storage;
pub mod target;

mod logger;

pub use {
    config::Config,
    content_type::ContentType,
    error::{Error, ErrorKind, Result},
    filesystem::GcsFileSystem,
    path::GcsPath,
    storage::{ByteSource, GcsStore, LocalStore, ObjectStore, SharedStore},
    target::{AtomicTarget, OpenMode, ReadSession, Target, TargetHandle, WriteSession},
};
