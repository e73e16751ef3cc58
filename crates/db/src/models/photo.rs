//! Photo row model.

use folio_core::photo::Photo;
use folio_core::types::Timestamp;
use sqlx::FromRow;

/// A row from the `photos` table.
///
/// The ordering key is stored as `sort_order` since `order` is reserved in SQL.
#[derive(Debug, Clone, FromRow)]
pub struct PhotoRow {
    pub id: String,
    pub url: String,
    pub storage_key: String,
    pub original_file_name: String,
    pub size_bytes: i64,
    pub mime_type: String,
    pub created_at: Timestamp,
    pub sort_order: i32,
}

impl From<PhotoRow> for Photo {
    fn from(row: PhotoRow) -> Self {
        Photo {
            id: row.id,
            url: row.url,
            storage_key: row.storage_key,
            original_file_name: row.original_file_name,
            size_bytes: row.size_bytes,
            mime_type: row.mime_type,
            created_at: row.created_at,
            order: row.sort_order,
        }
    }
}
