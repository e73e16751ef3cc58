//! [`PhotoRecords`] backed by PostgreSQL.

use async_trait::async_trait;
use folio_core::error::CoreError;
use folio_core::gateway::PhotoRecords;
use folio_core::photo::{NewPhoto, OrderUpdate, Photo};

use crate::repositories::PhotoRepo;
use crate::DbPool;

#[derive(Clone)]
pub struct PgPhotoRecords {
    pool: DbPool,
}

impl PgPhotoRecords {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn upstream(err: sqlx::Error) -> CoreError {
    tracing::error!(error = %err, "Photo record query failed");
    CoreError::Upstream(format!("Database error: {err}"))
}

#[async_trait]
impl PhotoRecords for PgPhotoRecords {
    async fn create(&self, input: NewPhoto) -> Result<Photo, CoreError> {
        let row = PhotoRepo::create(&self.pool, &input)
            .await
            .map_err(upstream)?;
        Ok(row.into())
    }

    async fn update_order(&self, id: &str, order: i32) -> Result<(), CoreError> {
        if PhotoRepo::update_order(&self.pool, id, order)
            .await
            .map_err(upstream)?
        {
            Ok(())
        } else {
            Err(CoreError::photo_not_found(id))
        }
    }

    /// Transactional, so a failure never leaves a half-applied batch.
    async fn update_orders(&self, updates: &[OrderUpdate]) -> Result<(), CoreError> {
        PhotoRepo::update_orders(&self.pool, updates)
            .await
            .map_err(|err| match err {
                sqlx::Error::RowNotFound => CoreError::Conflict(
                    "A photo in the reorder batch no longer exists".into(),
                ),
                other => upstream(other),
            })
    }

    async fn delete(&self, id: &str) -> Result<(), CoreError> {
        if PhotoRepo::delete(&self.pool, id).await.map_err(upstream)? {
            Ok(())
        } else {
            Err(CoreError::photo_not_found(id))
        }
    }

    async fn list(&self) -> Result<Vec<Photo>, CoreError> {
        let rows = PhotoRepo::list(&self.pool).await.map_err(upstream)?;
        Ok(rows.into_iter().map(Photo::from).collect())
    }

    async fn find(&self, id: &str) -> Result<Option<Photo>, CoreError> {
        let row = PhotoRepo::find_by_id(&self.pool, id)
            .await
            .map_err(upstream)?;
        Ok(row.map(Photo::from))
    }
}
