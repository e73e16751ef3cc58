//! Repository for the `photos` table.

use folio_core::photo::{NewPhoto, OrderUpdate};
use sqlx::PgPool;

use crate::models::photo::PhotoRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, url, storage_key, original_file_name, size_bytes, mime_type, created_at, sort_order";

/// Provides CRUD operations for photo records.
pub struct PhotoRepo;

impl PhotoRepo {
    /// Insert a new photo, returning the created row.
    pub async fn create(pool: &PgPool, input: &NewPhoto) -> Result<PhotoRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO photos (url, storage_key, original_file_name, size_bytes, mime_type, sort_order) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PhotoRow>(&query)
            .bind(&input.url)
            .bind(&input.storage_key)
            .bind(&input.original_file_name)
            .bind(input.size_bytes)
            .bind(&input.mime_type)
            .bind(input.order)
            .fetch_one(pool)
            .await
    }

    /// Find a photo by id.
    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<PhotoRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM photos WHERE id = $1");
        sqlx::query_as::<_, PhotoRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all photos in display order: sort_order, then newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<PhotoRow>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM photos ORDER BY sort_order ASC, created_at DESC");
        sqlx::query_as::<_, PhotoRow>(&query).fetch_all(pool).await
    }

    /// Set the sort order of a single photo. Returns `false` if no row matched.
    pub async fn update_order(pool: &PgPool, id: &str, order: i32) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE photos SET sort_order = $2 WHERE id = $1")
            .bind(id)
            .bind(order)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Apply a batch of order writes in one transaction.
    ///
    /// Either every row is updated or none is. An id with no matching row
    /// aborts the batch with `RowNotFound`.
    pub async fn update_orders(pool: &PgPool, updates: &[OrderUpdate]) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;
        for update in updates {
            let result = sqlx::query("UPDATE photos SET sort_order = $2 WHERE id = $1")
                .bind(&update.id)
                .bind(update.order)
                .execute(&mut *tx)
                .await?;
            if result.rows_affected() == 0 {
                return Err(sqlx::Error::RowNotFound);
            }
        }
        tx.commit().await
    }

    /// Delete a photo. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM photos WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
