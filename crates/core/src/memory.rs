//! In-memory gateways.
//!
//! Used by tests and for running the API without a database or bucket.
//! Both types support failure injection so error paths can be exercised.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use crate::error::CoreError;
use crate::gateway::{ObjectStore, PhotoRecords};
use crate::photo::{sort_for_display, NewPhoto, Photo};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Default)]
struct RecordsInner {
    photos: Vec<Photo>,
    fail_writes: bool,
    /// Order writes that may still succeed before failures start.
    order_budget: Option<usize>,
    /// Order writes report that a photo vanished mid-batch.
    order_conflict: bool,
    order_writes: usize,
}

/// Vec-backed [`PhotoRecords`].
#[derive(Default)]
pub struct MemoryPhotoRecords {
    inner: Mutex<RecordsInner>,
}

impl MemoryPhotoRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_photos(photos: Vec<Photo>) -> Self {
        let records = Self::new();
        lock(&records.inner).photos = photos;
        records
    }

    /// Make every write (create, order update, delete) fail.
    pub fn fail_writes(&self, fail: bool) {
        lock(&self.inner).fail_writes = fail;
    }

    /// Let `n` more order writes succeed, then fail the rest.
    pub fn fail_order_updates_after(&self, n: usize) {
        lock(&self.inner).order_budget = Some(n);
    }

    /// Make order writes fail with [`CoreError::Conflict`], as when a photo
    /// is deleted while a reorder is being saved.
    pub fn conflict_order_updates(&self, conflict: bool) {
        lock(&self.inner).order_conflict = conflict;
    }

    pub fn clear_failures(&self) {
        let mut inner = lock(&self.inner);
        inner.fail_writes = false;
        inner.order_budget = None;
        inner.order_conflict = false;
    }

    /// Number of order writes that have been applied.
    pub fn order_writes(&self) -> usize {
        lock(&self.inner).order_writes
    }

    /// Current rows, in insertion order.
    pub fn snapshot(&self) -> Vec<Photo> {
        lock(&self.inner).photos.clone()
    }
}

fn simulated(operation: &str) -> CoreError {
    CoreError::Upstream(format!("Simulated {operation} failure"))
}

#[async_trait]
impl PhotoRecords for MemoryPhotoRecords {
    async fn create(&self, input: NewPhoto) -> Result<Photo, CoreError> {
        let mut inner = lock(&self.inner);
        if inner.fail_writes {
            return Err(simulated("insert"));
        }
        let photo = Photo {
            id: uuid::Uuid::new_v4().to_string(),
            url: input.url,
            storage_key: input.storage_key,
            original_file_name: input.original_file_name,
            size_bytes: input.size_bytes,
            mime_type: input.mime_type,
            created_at: Utc::now(),
            order: input.order,
        };
        inner.photos.push(photo.clone());
        Ok(photo)
    }

    async fn update_order(&self, id: &str, order: i32) -> Result<(), CoreError> {
        let mut inner = lock(&self.inner);
        if inner.fail_writes {
            return Err(simulated("order update"));
        }
        if inner.order_conflict {
            return Err(CoreError::Conflict(format!(
                "Photo {id} no longer exists"
            )));
        }
        if let Some(budget) = inner.order_budget.as_mut() {
            if *budget == 0 {
                return Err(simulated("order update"));
            }
            *budget -= 1;
        }
        let photo = inner
            .photos
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| CoreError::photo_not_found(id))?;
        photo.order = order;
        inner.order_writes += 1;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), CoreError> {
        let mut inner = lock(&self.inner);
        if inner.fail_writes {
            return Err(simulated("delete"));
        }
        let before = inner.photos.len();
        inner.photos.retain(|p| p.id != id);
        if inner.photos.len() == before {
            return Err(CoreError::photo_not_found(id));
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Photo>, CoreError> {
        let mut photos = lock(&self.inner).photos.clone();
        sort_for_display(&mut photos);
        Ok(photos)
    }

    async fn find(&self, id: &str) -> Result<Option<Photo>, CoreError> {
        Ok(lock(&self.inner).photos.iter().find(|p| p.id == id).cloned())
    }
}

// ---------------------------------------------------------------------------
// Objects
// ---------------------------------------------------------------------------

/// A stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

#[derive(Default)]
struct ObjectsInner {
    objects: HashMap<String, StoredObject>,
    fail_puts: bool,
    fail_deletes: bool,
}

/// HashMap-backed [`ObjectStore`].
pub struct MemoryObjectStore {
    public_domain: String,
    inner: Mutex<ObjectsInner>,
}

impl MemoryObjectStore {
    pub fn new(public_domain: impl Into<String>) -> Self {
        Self {
            public_domain: public_domain.into().trim_end_matches('/').to_string(),
            inner: Mutex::new(ObjectsInner::default()),
        }
    }

    pub fn fail_puts(&self, fail: bool) {
        lock(&self.inner).fail_puts = fail;
    }

    pub fn fail_deletes(&self, fail: bool) {
        lock(&self.inner).fail_deletes = fail;
    }

    pub fn get(&self, key: &str) -> Option<StoredObject> {
        lock(&self.inner).objects.get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        lock(&self.inner).objects.contains_key(key)
    }

    pub fn len(&self) -> usize {
        lock(&self.inner).objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), CoreError> {
        let mut inner = lock(&self.inner);
        if inner.fail_puts {
            return Err(simulated("put"));
        }
        inner.objects.insert(
            key.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CoreError> {
        let mut inner = lock(&self.inner);
        if inner.fail_deletes {
            return Err(simulated("object delete"));
        }
        // S3 semantics: deleting a missing key succeeds.
        inner.objects.remove(key);
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.public_domain)
    }
}
