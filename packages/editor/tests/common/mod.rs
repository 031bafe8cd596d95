//! Shared fakes for the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use journal_editor::{
    DocumentStore, ImageUploader, MemoryStore, PdfUploader, PendingFile, Services, StaticAuth,
    StoreError, UploadError,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Image uploader that records every call and answers `https://img.test/{name}`
#[derive(Default)]
pub struct RecordingImages {
    calls: Mutex<Vec<String>>,
    fail_on: Option<String>,
    delays: HashMap<String, Duration>,
}

impl RecordingImages {
    pub fn failing_on(name: &str) -> Self {
        Self {
            fail_on: Some(name.to_string()),
            ..Self::default()
        }
    }

    /// Delay the response for `name`, to force a completion order
    pub fn with_delays(delays: &[(&str, u64)]) -> Self {
        Self {
            delays: delays
                .iter()
                .map(|(name, ms)| (name.to_string(), Duration::from_millis(*ms)))
                .collect(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageUploader for RecordingImages {
    async fn upload(&self, file: &PendingFile) -> Result<String, UploadError> {
        if let Some(delay) = self.delays.get(&file.name) {
            tokio::time::sleep(*delay).await;
        }

        self.calls.lock().unwrap().push(file.name.clone());

        if self.fail_on.as_deref() == Some(file.name.as_str()) {
            return Err(UploadError::Rejected {
                name: file.name.clone(),
                status: 500,
            });
        }
        Ok(format!("https://img.test/{}", file.name))
    }
}

#[derive(Default)]
pub struct RecordingPdfs {
    namespaces: Mutex<Vec<String>>,
}

impl RecordingPdfs {
    pub fn namespaces(&self) -> Vec<String> {
        self.namespaces.lock().unwrap().clone()
    }
}

#[async_trait]
impl PdfUploader for RecordingPdfs {
    async fn upload(&self, _file: &PendingFile, namespace: &str) -> Result<String, UploadError> {
        self.namespaces.lock().unwrap().push(namespace.to_string());
        Ok(format!("https://files.test/{}", namespace))
    }
}

/// Which store call should fail
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StoreFault {
    Write,
    NewKey,
}

/// Memory-backed store that reports one kind of call as unavailable
pub struct FaultyStore {
    inner: MemoryStore,
    fault: StoreFault,
}

impl FaultyStore {
    pub fn new(fault: StoreFault) -> Self {
        Self {
            inner: MemoryStore::new(),
            fault,
        }
    }

    fn unavailable() -> StoreError {
        StoreError::Unavailable("connection reset".to_string())
    }
}

#[async_trait]
impl DocumentStore for FaultyStore {
    async fn read(&self, path: &str) -> Result<Option<Value>, StoreError> {
        self.inner.read(path).await
    }

    async fn write(&self, path: &str, value: Value) -> Result<(), StoreError> {
        if self.fault == StoreFault::Write {
            return Err(Self::unavailable());
        }
        self.inner.write(path, value).await
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        self.inner.delete(path).await
    }

    async fn new_key(&self, collection: &str) -> Result<String, StoreError> {
        if self.fault == StoreFault::NewKey {
            return Err(Self::unavailable());
        }
        self.inner.new_key(collection).await
    }

    async fn list(&self, collection: &str) -> Result<Vec<(String, Value)>, StoreError> {
        self.inner.list(collection).await
    }
}

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub images: Arc<RecordingImages>,
    pub pdfs: Arc<RecordingPdfs>,
    pub services: Services,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(MemoryStore::new(), RecordingImages::default(), StaticAuth::signed_in("editor-1", None))
    }

    pub fn with_store(store: MemoryStore) -> Self {
        Self::build(store, RecordingImages::default(), StaticAuth::signed_in("editor-1", None))
    }

    pub fn with_images(images: RecordingImages) -> Self {
        Self::build(MemoryStore::new(), images, StaticAuth::signed_in("editor-1", None))
    }

    /// Services whose store fails with `fault`; `store` is left unused
    pub fn with_faulty_store(fault: StoreFault) -> Self {
        let mut harness = Self::new();
        harness.services.store = Arc::new(FaultyStore::new(fault));
        harness
    }

    pub fn anonymous() -> Self {
        Self::build(MemoryStore::new(), RecordingImages::default(), StaticAuth::anonymous())
    }

    fn build(store: MemoryStore, images: RecordingImages, auth: StaticAuth) -> Self {
        let store = Arc::new(store);
        let images = Arc::new(images);
        let pdfs = Arc::new(RecordingPdfs::default());

        let services = Services {
            store: store.clone(),
            images: images.clone(),
            pdfs: pdfs.clone(),
            auth: Arc::new(auth),
        };

        Self {
            store,
            images,
            pdfs,
            services,
        }
    }
}

pub fn image(name: &str) -> PendingFile {
    PendingFile::new(name, "image/png", vec![0x89, 0x50, 0x4e, 0x47])
}

pub fn pdf(name: &str) -> PendingFile {
    PendingFile::new(name, "application/pdf", b"%PDF-1.7".to_vec())
}
