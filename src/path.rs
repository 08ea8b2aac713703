use std::{fmt, path::Path, str::FromStr};

use crate::error::{Error, Result};

pub const GS_PREFIX: &str = "gs://";
pub const LEGACY_PREFIX: &str = "gcs://";

const DELIMITER: char = '/';

/// A bucket and an object key, parsed from `gs://bucket/some/key`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GcsPath {
    bucket: String,
    key: String,
}

impl GcsPath {
    pub fn new<B: Into<String>, K: Into<String>>(bucket: B, key: K) -> Result<Self> {
        let bucket = bucket.into();
        let key = key.into();
        if bucket.is_empty() || bucket.contains(DELIMITER) {
            return Err(Error::InvalidPath(format!("{GS_PREFIX}{bucket}/{key}")));
        }

        Ok(GcsPath { bucket, key })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_root(&self) -> bool {
        self.key.is_empty() || self.key == "/"
    }

    /// Key with a trailing delimiter, for listing everything "inside" this path.
    pub fn dir_prefix(&self) -> String {
        if self.key.ends_with(DELIMITER) {
            self.key.clone()
        } else {
            format!("{}{DELIMITER}", self.key)
        }
    }

    /// Whether the key names a directory placeholder rather than a file.
    pub fn is_dir_key(&self) -> bool {
        self.key.is_empty() || self.key.ends_with(DELIMITER)
    }

    /// The last extension of the key's final segment, without the dot. Directory keys have none.
    pub fn extension(&self) -> Option<&str> {
        if self.is_dir_key() {
            return None;
        }

        Path::new(&self.key).extension().and_then(|ext| ext.to_str())
    }

    pub fn join(&self, key: &str) -> GcsPath {
        GcsPath {
            bucket: self.bucket.clone(),
            key: key.to_owned(),
        }
    }
}

impl FromStr for GcsPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let rest = s
            .strip_prefix(GS_PREFIX)
            .or_else(|| s.strip_prefix(LEGACY_PREFIX))
            .ok_or_else(|| Error::InvalidPath(s.to_owned()))?;

        let (bucket, key) = rest.split_once(DELIMITER).unwrap_or((rest, ""));
        if bucket.is_empty() {
            return Err(Error::InvalidPath(s.to_owned()));
        }

        Ok(GcsPath {
            bucket: bucket.to_owned(),
            key: key.to_owned(),
        })
    }
}

impl fmt::Display for GcsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{GS_PREFIX}{}/{}", self.bucket, self.key)
    }
}
