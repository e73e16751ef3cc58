//! Collaborator contracts for durable state.
//!
//! The gallery never talks to a database or bucket directly; it is handed
//! implementations of these traits at construction time. Production wiring
//! uses `folio_db::PgPhotoRecords` and `folio_storage::S3ObjectStore`; tests
//! use the in-memory versions in [`crate::memory`].

use async_trait::async_trait;

use crate::error::CoreError;
use crate::photo::{NewPhoto, OrderUpdate, Photo};

/// Photo record persistence (the database side).
#[async_trait]
pub trait PhotoRecords: Send + Sync {
    /// Insert a record, returning it with its assigned `id` and `created_at`.
    async fn create(&self, input: NewPhoto) -> Result<Photo, CoreError>;

    /// Set the `order` of a single record.
    async fn update_order(&self, id: &str, order: i32) -> Result<(), CoreError>;

    /// Apply a batch of order writes.
    ///
    /// The default sends them one at a time and stops at the first failure,
    /// which can leave the batch partially applied. Callers treat any error
    /// as "resend the whole batch".
    async fn update_orders(&self, updates: &[OrderUpdate]) -> Result<(), CoreError> {
        for update in updates {
            self.update_order(&update.id, update.order).await?;
        }
        Ok(())
    }

    /// Delete a record by id.
    async fn delete(&self, id: &str) -> Result<(), CoreError>;

    /// All records, sorted by `order` ascending then `created_at` descending.
    async fn list(&self) -> Result<Vec<Photo>, CoreError>;

    /// Look up a single record.
    async fn find(&self, id: &str) -> Result<Option<Photo>, CoreError>;
}

/// Object storage for image bytes.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), CoreError>;

    async fn delete(&self, key: &str) -> Result<(), CoreError>;

    /// Publicly resolvable URL for `key`.
    fn public_url(&self, key: &str) -> String;
}
