//! Gallery operations that span both gateways.
//!
//! Upload stores bytes first and then creates the record; delete removes
//! bytes first and then the record. Either way a crash between the two steps
//! can only leave an orphaned blob, never a record pointing at missing bytes.
//! Completed steps are not rolled back.

use std::sync::Arc;

use crate::error::CoreError;
use crate::gateway::{ObjectStore, PhotoRecords};
use crate::photo::{storage_key_for, validate_content_type, NewPhoto, Photo};
use crate::reconcile::{Reconciler, SaveOutcome};

/// An image received from the operator.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Name of the uploaded file part, if the client sent one.
    pub file_name: Option<String>,
    /// Explicit original name, preferred over `file_name` when present.
    pub original_file_name: Option<String>,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadRequest {
    /// The name recorded for the upload: the explicit original name, falling
    /// back to the file part's name.
    pub fn resolved_file_name(&self) -> Option<&str> {
        [&self.original_file_name, &self.file_name]
            .into_iter()
            .flatten()
            .map(|name| name.trim())
            .find(|name| !name.is_empty())
    }

    fn validate(&self) -> Result<&str, CoreError> {
        if self.bytes.is_empty() {
            return Err(CoreError::Validation("No file uploaded".into()));
        }
        let name = self.resolved_file_name().ok_or_else(|| {
            CoreError::Validation("File name could not be determined".into())
        })?;
        validate_content_type(&self.content_type)?;
        Ok(name)
    }
}

/// Photo gallery backed by injected record and object gateways.
#[derive(Clone)]
pub struct GalleryService {
    records: Arc<dyn PhotoRecords>,
    objects: Arc<dyn ObjectStore>,
}

impl GalleryService {
    pub fn new(records: Arc<dyn PhotoRecords>, objects: Arc<dyn ObjectStore>) -> Self {
        Self { records, objects }
    }

    /// All photos in display order.
    pub async fn list(&self) -> Result<Vec<Photo>, CoreError> {
        self.records.list().await
    }

    /// Store the bytes, then create the record.
    ///
    /// New records get order 0, so they show first among equal ranks until
    /// the operator saves a reorder.
    pub async fn upload(&self, request: UploadRequest) -> Result<Photo, CoreError> {
        let original_file_name = request.validate()?.to_string();
        let storage_key = storage_key_for(&original_file_name);
        let size_bytes = i64::try_from(request.bytes.len())
            .map_err(|_| CoreError::Validation("File is too large".into()))?;

        self.objects
            .put(&storage_key, request.bytes, &request.content_type)
            .await?;
        tracing::debug!(key = %storage_key, size_bytes, "Stored photo bytes");

        let input = NewPhoto {
            url: self.objects.public_url(&storage_key),
            storage_key: storage_key.clone(),
            original_file_name,
            size_bytes,
            mime_type: request.content_type,
            order: 0,
        };

        match self.records.create(input).await {
            Ok(photo) => {
                tracing::info!(photo_id = %photo.id, key = %photo.storage_key, "Photo uploaded");
                Ok(photo)
            }
            Err(err) => {
                tracing::warn!(
                    key = %storage_key,
                    error = %err,
                    "Photo record insert failed; stored object left orphaned"
                );
                Err(err)
            }
        }
    }

    /// Delete the bytes, then the record.
    pub async fn delete(&self, id: &str) -> Result<Photo, CoreError> {
        let photo = self
            .records
            .find(id)
            .await?
            .ok_or_else(|| CoreError::photo_not_found(id))?;

        self.objects.delete(&photo.storage_key).await?;

        if let Err(err) = self.records.delete(&photo.id).await {
            tracing::error!(
                photo_id = %photo.id,
                key = %photo.storage_key,
                error = %err,
                "Object deleted but photo record delete failed"
            );
            return Err(err);
        }

        tracing::info!(photo_id = %photo.id, key = %photo.storage_key, "Photo deleted");
        Ok(photo)
    }

    /// Rearrange the gallery into the order given by `ids` and persist it.
    ///
    /// `ids` must list every photo exactly once. Returns the gallery as
    /// stored after the call: the new order when it was saved, otherwise the
    /// stored records unchanged.
    pub async fn reorder<S: AsRef<str>>(&self, ids: &[S]) -> Result<Vec<Photo>, CoreError> {
        let mut reconciler = Reconciler::load(self.records.list().await?);
        reconciler.reorder_by_ids(ids)?;

        match reconciler.save_and_publish(self.records.as_ref()).await? {
            SaveOutcome::NothingToSave => {
                tracing::debug!("Reorder matches stored order");
                Ok(reconciler.collection().confirmed().to_vec())
            }
            SaveOutcome::Saved { updated } => {
                tracing::debug!(updated, "Reorder persisted");
                Ok(reconciler.into_collection().into_working())
            }
        }
    }
}
