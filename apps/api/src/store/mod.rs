//! Persistence boundary for applications and their uploads.
//!
//! Handlers and services receive an `Arc<dyn ApplicationStore>` from `AppState`;
//! nothing else in the crate talks to the database directly.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::application::{ApplicationRecord, ApplicationRow, ApplicationStatus};
use crate::models::upload::{UploadCategory, UploadRecord, UploadRow};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupt row {id}: {reason}")]
    Corrupt { id: Uuid, reason: String },
}

#[async_trait]
pub trait ApplicationStore: Send + Sync {
    async fn insert_application(&self, record: &ApplicationRecord) -> Result<(), StoreError>;

    async fn fetch_application(&self, id: Uuid) -> Result<Option<ApplicationRecord>, StoreError>;

    /// Overwrites status, data and timestamps. `NotFound` if the row is gone.
    async fn update_application(&self, record: &ApplicationRecord) -> Result<(), StoreError>;

    /// Newest-created first.
    async fn list_applications(
        &self,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<ApplicationRecord>, StoreError>;

    async fn insert_upload(&self, upload: &UploadRecord) -> Result<(), StoreError>;

    async fn fetch_upload(&self, id: Uuid) -> Result<Option<UploadRecord>, StoreError>;

    /// Newest upload first.
    async fn list_uploads(&self, application_id: Uuid) -> Result<Vec<UploadRecord>, StoreError>;

    async fn delete_upload(&self, id: Uuid) -> Result<(), StoreError>;
}

impl ApplicationRow {
    pub fn from_record(record: &ApplicationRecord) -> Result<Self, StoreError> {
        Ok(ApplicationRow {
            id: record.id,
            status: record.status.as_str().to_string(),
            data: serde_json::to_string(&record.data)?,
            created_at: record.created_at,
            updated_at: record.updated_at,
            submitted_at: record.submitted_at,
        })
    }

    pub fn into_record(self) -> Result<ApplicationRecord, StoreError> {
        let status = self
            .status
            .parse::<ApplicationStatus>()
            .map_err(|reason| StoreError::Corrupt {
                id: self.id,
                reason,
            })?;
        let data = serde_json::from_str(&self.data).map_err(|e| StoreError::Corrupt {
            id: self.id,
            reason: format!("data blob is not valid JSON: {e}"),
        })?;

        Ok(ApplicationRecord {
            id: self.id,
            status,
            data,
            created_at: self.created_at,
            updated_at: self.updated_at,
            submitted_at: self.submitted_at,
        })
    }
}

impl UploadRow {
    pub fn from_record(upload: &UploadRecord) -> Self {
        UploadRow {
            id: upload.id,
            application_id: upload.application_id,
            filename: upload.filename.clone(),
            mime_type: upload.mime_type.clone(),
            size: upload.size,
            category: upload.category.as_str().to_string(),
            storage_path: upload.storage_path.clone(),
            uploaded_at: upload.uploaded_at,
        }
    }

    pub fn into_record(self) -> Result<UploadRecord, StoreError> {
        let category = self
            .category
            .parse::<UploadCategory>()
            .map_err(|reason| StoreError::Corrupt {
                id: self.id,
                reason,
            })?;

        Ok(UploadRecord {
            id: self.id,
            application_id: self.application_id,
            filename: self.filename,
            mime_type: self.mime_type,
            size: self.size,
            category,
            storage_path: self.storage_path,
            uploaded_at: self.uploaded_at,
        })
    }
}
