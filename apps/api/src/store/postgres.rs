use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{ApplicationStore, StoreError};
use crate::models::application::{ApplicationRecord, ApplicationRow, ApplicationStatus};
use crate::models::upload::{UploadRecord, UploadRow};

/// Postgres-backed store. The document is stored as a serialized text blob.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }
}

#[async_trait]
impl ApplicationStore for PgStore {
    async fn insert_application(&self, record: &ApplicationRecord) -> Result<(), StoreError> {
        let row = ApplicationRow::from_record(record)?;
        sqlx::query(
            r#"
            INSERT INTO applications (id, status, data, created_at, updated_at, submitted_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(row.id)
        .bind(&row.status)
        .bind(&row.data)
        .bind(row.created_at)
        .bind(row.updated_at)
        .bind(row.submitted_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn fetch_application(&self, id: Uuid) -> Result<Option<ApplicationRecord>, StoreError> {
        let row: Option<ApplicationRow> =
            sqlx::query_as("SELECT * FROM applications WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(ApplicationRow::into_record).transpose()
    }

    async fn update_application(&self, record: &ApplicationRecord) -> Result<(), StoreError> {
        let row = ApplicationRow::from_record(record)?;
        let result = sqlx::query(
            r#"
            UPDATE applications
            SET status = $2, data = $3, updated_at = $4, submitted_at = $5
            WHERE id = $1
            "#,
        )
        .bind(row.id)
        .bind(&row.status)
        .bind(&row.data)
        .bind(row.updated_at)
        .bind(row.submitted_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("Application {}", record.id)));
        }
        Ok(())
    }

    async fn list_applications(
        &self,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<ApplicationRecord>, StoreError> {
        let rows: Vec<ApplicationRow> = match status {
            Some(status) => {
                sqlx::query_as(
                    "SELECT * FROM applications WHERE status = $1 ORDER BY created_at DESC",
                )
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as("SELECT * FROM applications ORDER BY created_at DESC")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        rows.into_iter().map(ApplicationRow::into_record).collect()
    }

    async fn insert_upload(&self, upload: &UploadRecord) -> Result<(), StoreError> {
        let row = UploadRow::from_record(upload);
        sqlx::query(
            r#"
            INSERT INTO uploads
                (id, application_id, filename, mime_type, size, category, storage_path, uploaded_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(row.id)
        .bind(row.application_id)
        .bind(&row.filename)
        .bind(&row.mime_type)
        .bind(row.size)
        .bind(&row.category)
        .bind(&row.storage_path)
        .bind(row.uploaded_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn fetch_upload(&self, id: Uuid) -> Result<Option<UploadRecord>, StoreError> {
        let row: Option<UploadRow> = sqlx::query_as("SELECT * FROM uploads WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(UploadRow::into_record).transpose()
    }

    async fn list_uploads(&self, application_id: Uuid) -> Result<Vec<UploadRecord>, StoreError> {
        let rows: Vec<UploadRow> = sqlx::query_as(
            "SELECT * FROM uploads WHERE application_id = $1 ORDER BY uploaded_at DESC",
        )
        .bind(application_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(UploadRow::into_record).collect()
    }

    async fn delete_upload(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM uploads WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("Upload {id}")));
        }
        Ok(())
    }
}
