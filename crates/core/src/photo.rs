//! Photo record types and ordering rules.
//!
//! The `order` field is the sole ordering key. Records sharing an `order`
//! value fall back to `created_at` descending, so a freshly uploaded photo
//! (inserted with order 0) shows ahead of older photos at the same rank.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{PhotoId, Timestamp};

/// Object-store prefix under which gallery images are stored.
pub const STORAGE_PREFIX: &str = "images/gallery";

/// Extension used when the uploaded file name has none.
const FALLBACK_EXTENSION: &str = "bin";

/// One uploaded image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub id: PhotoId,
    pub url: String,
    pub storage_key: String,
    pub original_file_name: String,
    pub size_bytes: i64,
    pub mime_type: String,
    pub created_at: Timestamp,
    pub order: i32,
}

/// A record to create once its bytes are in the object store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPhoto {
    pub url: String,
    pub storage_key: String,
    pub original_file_name: String,
    pub size_bytes: i64,
    pub mime_type: String,
    pub order: i32,
}

/// A single `order` write sent to the records gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub id: PhotoId,
    pub order: i32,
}

/// Display comparator: `order` ascending, then `created_at` descending.
pub fn display_order(a: &Photo, b: &Photo) -> Ordering {
    a.order
        .cmp(&b.order)
        .then_with(|| b.created_at.cmp(&a.created_at))
}

/// Sort a snapshot in place into display order.
///
/// The sort is stable, so records equal on both keys keep their relative
/// position.
pub fn sort_for_display(photos: &mut [Photo]) {
    photos.sort_by(display_order);
}

/// Build a unique object key for an uploaded file, keeping its extension.
///
/// ```text
/// "sunset.JPG" -> "images/gallery/<uuid>.jpg"
/// ```
pub fn storage_key_for(file_name: &str) -> String {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.trim().to_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_string());
    format!("{STORAGE_PREFIX}/{}.{ext}", uuid::Uuid::new_v4())
}

/// Reject anything that is not an `image/*` MIME type.
pub fn validate_content_type(content_type: &str) -> Result<(), CoreError> {
    match content_type.split_once('/') {
        Some(("image", subtype)) if !subtype.trim().is_empty() => Ok(()),
        _ => Err(CoreError::Validation(format!(
            "Unsupported content type '{content_type}'. Only image uploads are accepted"
        ))),
    }
}
