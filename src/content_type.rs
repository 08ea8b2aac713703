use std::fmt;

use crate::{
    error::{Error, Result},
    path::GcsPath,
};

/// MIME types a target can be written with, keyed by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Text,
    Csv,
    Tsv,
    Json,
    JsonLines,
    Xml,
    Html,
    Yaml,
    Avro,
    Parquet,
    Gzip,
    Zip,
    Tar,
    Pdf,
    Png,
    Jpeg,
    Gif,
    OctetStream,
}

impl ContentType {
    pub fn from_extension(extension: &str) -> Option<Self> {
        let content_type = match extension.to_ascii_lowercase().as_str() {
            "txt" | "log" => ContentType::Text,
            "csv" => ContentType::Csv,
            "tsv" => ContentType::Tsv,
            "json" => ContentType::Json,
            "jsonl" | "ndjson" => ContentType::JsonLines,
            "xml" => ContentType::Xml,
            "html" | "htm" => ContentType::Html,
            "yaml" | "yml" => ContentType::Yaml,
            "avro" => ContentType::Avro,
            "parquet" => ContentType::Parquet,
            "gz" | "gzip" => ContentType::Gzip,
            "zip" => ContentType::Zip,
            "tar" => ContentType::Tar,
            "pdf" => ContentType::Pdf,
            "png" => ContentType::Png,
            "jpg" | "jpeg" => ContentType::Jpeg,
            "gif" => ContentType::Gif,
            "bin" => ContentType::OctetStream,
            _ => return None,
        };

        Some(content_type)
    }

    pub fn for_path(path: &GcsPath) -> Result<Self> {
        path.extension()
            .and_then(ContentType::from_extension)
            .ok_or_else(|| Error::UnknownContentType(path.to_string()))
    }

    pub fn mime(self) -> &'static str {
        match self {
            ContentType::Text => "text/plain",
            ContentType::Csv => "text/csv",
            ContentType::Tsv => "text/tab-separated-values",
            ContentType::Json => "application/json",
            ContentType::JsonLines => "application/x-ndjson",
            ContentType::Xml => "application/xml",
            ContentType::Html => "text/html",
            ContentType::Yaml => "application/yaml",
            ContentType::Avro => "application/avro",
            ContentType::Parquet => "application/vnd.apache.parquet",
            ContentType::Gzip => "application/gzip",
            ContentType::Zip => "application/zip",
            ContentType::Tar => "application/x-tar",
            ContentType::Pdf => "application/pdf",
            ContentType::Png => "image/png",
            ContentType::Jpeg => "image/jpeg",
            ContentType::Gif => "image/gif",
            ContentType::OctetStream => "application/octet-stream",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}
