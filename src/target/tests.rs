use std::{
    io,
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use tempfile::{tempdir, TempDir};
use tokio::io::AsyncWriteExt;

use crate::{
    content_type::ContentType,
    error::{Error, Result},
    storage::{ByteSource, KeyStream, LocalStore, ObjectReader, ObjectStore, StoreStats},
};

use super::{AtomicTarget, OpenMode, Target, TargetHandle};

const PATH: &str = "gs://bucket/test/target.txt";

/// Local store that counts remote calls and can be told to fail uploads.
#[derive(Debug)]
struct FlakyStore {
    inner: LocalStore,
    fail_puts: AtomicBool,
    calls: AtomicUsize,
}

impl FlakyStore {
    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ObjectStore for FlakyStore {
    async fn exists(&self, bucket: &str, key: &str) -> Result<bool> {
        self.record();
        self.inner.exists(bucket, key).await
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<ObjectReader> {
        self.record();
        self.inner.get(bucket, key).await
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        source: ByteSource,
        content_type: ContentType,
    ) -> Result<()> {
        self.record();
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(Error::transport(io::Error::other("connection reset")));
        }
        self.inner.put(bucket, key, source, content_type).await
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<()> {
        self.record();
        self.inner.delete(bucket, key).await
    }

    fn list_keys<'a>(&'a self, bucket: &'a str, prefix: Option<&'a str>) -> KeyStream<'a> {
        self.record();
        self.inner.list_keys(bucket, prefix)
    }

    fn stats(&self) -> &StoreStats {
        self.inner.stats()
    }
}

struct Fixture {
    _dir: TempDir,
    staging: PathBuf,
    store: Arc<FlakyStore>,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempdir().unwrap();
        let staging = dir.path().join("staging");
        std::fs::create_dir(&staging).unwrap();
        let store = Arc::new(FlakyStore {
            inner: LocalStore::new(dir.path().join("store"), None),
            fail_puts: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        });

        Fixture {
            _dir: dir,
            staging,
            store,
        }
    }

    fn target(&self, path: &str) -> AtomicTarget {
        AtomicTarget::new(path.parse().unwrap(), self.store.clone())
            .with_staging_dir(Some(self.staging.clone()))
    }

    fn staged_files(&self) -> usize {
        std::fs::read_dir(&self.staging).unwrap().count()
    }

    fn calls(&self) -> usize {
        self.store.calls.load(Ordering::SeqCst)
    }

    fn fail_puts(&self, fail: bool) {
        self.store.fail_puts.store(fail, Ordering::SeqCst);
    }
}

async fn roundtrip(bytes: Vec<u8>) {
    let fixture = Fixture::new();
    let target = fixture.target(PATH);
    target.write(&bytes).await.unwrap();
    assert_eq!(target.read().await.unwrap(), bytes);
}

#[tokio::test]
async fn roundtrip_empty() {
    roundtrip(vec![]).await;
}

#[tokio::test]
async fn roundtrip_single_byte() {
    roundtrip(vec![42]).await;
}

#[tokio::test]
async fn roundtrip_multi_megabyte() {
    let bytes = (0..3 * 1024 * 1024).map(|i| (i % 251) as u8).collect();
    roundtrip(bytes).await;
}

#[tokio::test]
async fn invisible_until_commit() {
    let fixture = Fixture::new();
    let target = fixture.target(PATH);
    assert!(!target.exists().await.unwrap());

    let mut session = target.open_write().await.unwrap();
    session.write_all(b"first line\n").await.unwrap();
    assert!(!target.exists().await.unwrap());
    session.write_all(b"second line\n").await.unwrap();
    session.flush().await.unwrap();
    assert!(!target.exists().await.unwrap());
    assert_eq!(session.bytes_written(), 23);

    session.commit().await.unwrap();
    assert!(target.exists().await.unwrap());
}

#[tokio::test]
async fn abandoned_write_leaves_target_absent() {
    let fixture = Fixture::new();
    let target = fixture.target(PATH);

    for len in [0, 1, 4096] {
        let mut session = target.open_write().await.unwrap();
        session.write_all(&vec![b'x'; len]).await.unwrap();
        drop(session);
        assert!(!target.exists().await.unwrap());
    }

    let session = target.open_write().await.unwrap();
    session.abort();
    assert!(!target.exists().await.unwrap());
    assert_eq!(fixture.staged_files(), 0);
}

#[tokio::test]
async fn abandoned_overwrite_keeps_old_content() {
    let fixture = Fixture::new();
    let target = fixture.target(PATH);
    target.write(b"old").await.unwrap();

    let mut session = target.open_write().await.unwrap();
    session.write_all(b"new but never committed").await.unwrap();
    drop(session);

    assert!(target.exists().await.unwrap());
    assert_eq!(target.read().await.unwrap(), b"old");
}

#[tokio::test]
async fn failed_commit_leaves_target_unchanged() {
    let fixture = Fixture::new();
    let target = fixture.target(PATH);

    fixture.fail_puts(true);
    let result = target.write(b"payload").await;
    assert!(result.unwrap_err().is_retryable());
    assert!(!target.exists().await.unwrap());
    assert_eq!(fixture.staged_files(), 0);

    fixture.fail_puts(false);
    target.write(b"old").await.unwrap();
    fixture.fail_puts(true);
    assert!(target.write(b"new").await.is_err());
    assert_eq!(target.read().await.unwrap(), b"old");
}

#[tokio::test]
async fn missing_staging_dir_fails_before_upload() {
    let fixture = Fixture::new();
    let target = fixture
        .target(PATH)
        .with_staging_dir(Some(fixture.staging.join("missing")));

    let result = target.open_write().await;
    assert!(matches!(result, Err(Error::Io(_))));
    assert_eq!(fixture.calls(), 0);
    assert!(!target.exists().await.unwrap());
}

#[tokio::test]
async fn overwrite_replaces() {
    let fixture = Fixture::new();
    let target = fixture.target(PATH);
    target.write(b"first payload, longer").await.unwrap();
    target.write(b"second").await.unwrap();
    assert_eq!(target.read().await.unwrap(), b"second");
}

#[tokio::test]
async fn unknown_extension_fails_before_staging() {
    let fixture = Fixture::new();
    let target = fixture.target("gs://bucket/test/sample_upload");

    let result = target.open_write().await;
    assert_eq!(
        result.err(),
        Some(Error::UnknownContentType(
            "gs://bucket/test/sample_upload".to_owned()
        ))
    );
    assert_eq!(fixture.calls(), 0);
    assert_eq!(fixture.staged_files(), 0);
}

#[tokio::test]
async fn directory_key_is_not_writable() {
    let fixture = Fixture::new();
    let target = fixture.target("gs://bucket/out/dir.txt/");

    let result = target.write(b"data").await;
    assert_eq!(
        result,
        Err(Error::UnknownContentType(
            "gs://bucket/out/dir.txt/".to_owned()
        ))
    );
    assert_eq!(fixture.calls(), 0);
    assert_eq!(fixture.staged_files(), 0);
}

#[tokio::test]
async fn remove_is_idempotent() {
    let fixture = Fixture::new();
    let target = fixture.target(PATH);
    target.remove().await.unwrap();
    assert!(!target.exists().await.unwrap());

    target.write(b"x").await.unwrap();
    target.remove().await.unwrap();
    target.remove().await.unwrap();
    assert!(!target.exists().await.unwrap());
}

#[tokio::test]
async fn read_absent_is_not_found() {
    let fixture = Fixture::new();
    let target = fixture.target(PATH);
    let result = target.open_read().await;
    assert_eq!(
        result.err(),
        Some(Error::not_found("bucket", "test/target.txt"))
    );
}

#[tokio::test]
async fn staging_file_keeps_extension_and_is_removed() {
    let fixture = Fixture::new();
    let target = fixture.target("gs://bucket/out/data.csv");

    let session = target.open_write().await.unwrap();
    let staging_path = session.staging_path().to_owned();
    assert_eq!(staging_path.extension().unwrap(), "csv");
    assert!(staging_path.starts_with(&fixture.staging));
    assert_eq!(session.content_type(), ContentType::Csv);

    session.commit().await.unwrap();
    assert!(!staging_path.exists());
    assert_eq!(target.read().await.unwrap(), b"");
}

#[tokio::test]
async fn read_lines() {
    let fixture = Fixture::new();
    let target = fixture.target(PATH);
    target.write(b"alpha\nbeta\ngamma\n").await.unwrap();

    let mut lines = target.open_read().await.unwrap().lines();
    let mut read = vec![];
    while let Some(line) = lines.next_line().await.unwrap() {
        read.push(line);
    }
    assert_eq!(read, ["alpha", "beta", "gamma"]);
}

#[tokio::test]
async fn open_modes() {
    assert_eq!("r".parse::<OpenMode>(), Ok(OpenMode::Read));
    assert_eq!("w".parse::<OpenMode>(), Ok(OpenMode::Write));
    assert_eq!(
        "a".parse::<OpenMode>(),
        Err(Error::UnsupportedMode("a".to_owned()))
    );

    let fixture = Fixture::new();
    let target = fixture.target(PATH);
    assert_eq!(Target::path(&target).to_string(), PATH);

    let TargetHandle::Write(mut session) = target.open(OpenMode::Write).await.unwrap() else {
        panic!("expected a write handle");
    };
    session.write_all(b"via host").await.unwrap();
    session.commit().await.unwrap();
    assert!(Target::exists(&target).await.unwrap());

    let TargetHandle::Read(session) = target.open(OpenMode::Read).await.unwrap() else {
        panic!("expected a read handle");
    };
    assert_eq!(session.read_all().await.unwrap(), b"via host");
}
