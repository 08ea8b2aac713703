use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct StoreStats {
    exists_requests: AtomicU64,
    get_requests: AtomicU64,
    put_requests: AtomicU64,
    delete_requests: AtomicU64,
    list_requests: AtomicU64,
    bytes_downloaded: AtomicU64,
    bytes_uploaded: AtomicU64,
}

impl StoreStats {
    pub fn new() -> Self {
        StoreStats::default()
    }

    pub fn add_exists(&self) {
        self.exists_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_get(&self, size: u64) {
        self.get_requests.fetch_add(1, Ordering::Relaxed);
        self.bytes_downloaded.fetch_add(size, Ordering::Relaxed);
    }

    pub fn add_put(&self, size: u64) {
        self.put_requests.fetch_add(1, Ordering::Relaxed);
        self.bytes_uploaded.fetch_add(size, Ordering::Relaxed);
    }

    pub fn add_delete(&self) {
        self.delete_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_list(&self) {
        self.list_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn exists_requests(&self) -> u64 {
        self.exists_requests.load(Ordering::Relaxed)
    }

    pub fn get_requests(&self) -> u64 {
        self.get_requests.load(Ordering::Relaxed)
    }

    pub fn put_requests(&self) -> u64 {
        self.put_requests.load(Ordering::Relaxed)
    }

    pub fn delete_requests(&self) -> u64 {
        self.delete_requests.load(Ordering::Relaxed)
    }

    pub fn list_requests(&self) -> u64 {
        self.list_requests.load(Ordering::Relaxed)
    }

    pub fn bytes_downloaded(&self) -> u64 {
        self.bytes_downloaded.load(Ordering::Relaxed)
    }

    pub fn bytes_uploaded(&self) -> u64 {
        self.bytes_uploaded.load(Ordering::Relaxed)
    }

    pub fn total_requests(&self) -> u64 {
        self.exists_requests()
            + self.get_requests()
            + self.put_requests()
            + self.delete_requests()
            + self.list_requests()
    }
}
