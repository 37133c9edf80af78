use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ApplicationStore, StoreError};
use crate::models::application::{ApplicationRecord, ApplicationRow, ApplicationStatus};
use crate::models::upload::{UploadRecord, UploadRow};

/// Process-local store used when no `DATABASE_URL` is configured, and by tests.
///
/// Rows are kept in their persisted shape so the document blob goes through the
/// same serialize/deserialize cycle as it does in Postgres.
#[derive(Default)]
pub struct MemoryStore {
    applications: RwLock<HashMap<Uuid, ApplicationRow>>,
    uploads: RwLock<HashMap<Uuid, UploadRow>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ApplicationStore for MemoryStore {
    async fn insert_application(&self, record: &ApplicationRecord) -> Result<(), StoreError> {
        let row = ApplicationRow::from_record(record)?;
        self.applications.write().await.insert(row.id, row);
        Ok(())
    }

    async fn fetch_application(&self, id: Uuid) -> Result<Option<ApplicationRecord>, StoreError> {
        let row = self.applications.read().await.get(&id).cloned();
        row.map(ApplicationRow::into_record).transpose()
    }

    async fn update_application(&self, record: &ApplicationRecord) -> Result<(), StoreError> {
        let row = ApplicationRow::from_record(record)?;
        let mut applications = self.applications.write().await;
        match applications.get_mut(&record.id) {
            Some(existing) => {
                existing.status = row.status;
                existing.data = row.data;
                existing.updated_at = row.updated_at;
                existing.submitted_at = row.submitted_at;
                Ok(())
            }
            None => Err(StoreError::NotFound(format!("Application {}", record.id))),
        }
    }

    async fn list_applications(
        &self,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<ApplicationRecord>, StoreError> {
        let mut rows: Vec<ApplicationRow> = self
            .applications
            .read()
            .await
            .values()
            .filter(|row| status.map_or(true, |s| row.status == s.as_str()))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.into_iter().map(ApplicationRow::into_record).collect()
    }

    async fn insert_upload(&self, upload: &UploadRecord) -> Result<(), StoreError> {
        if !self
            .applications
            .read()
            .await
            .contains_key(&upload.application_id)
        {
            return Err(StoreError::NotFound(format!(
                "Application {}",
                upload.application_id
            )));
        }
        self.uploads
            .write()
            .await
            .insert(upload.id, UploadRow::from_record(upload));
        Ok(())
    }

    async fn fetch_upload(&self, id: Uuid) -> Result<Option<UploadRecord>, StoreError> {
        let row = self.uploads.read().await.get(&id).cloned();
        row.map(UploadRow::into_record).transpose()
    }

    async fn list_uploads(&self, application_id: Uuid) -> Result<Vec<UploadRecord>, StoreError> {
        let mut rows: Vec<UploadRow> = self
            .uploads
            .read()
            .await
            .values()
            .filter(|row| row.application_id == application_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        rows.into_iter().map(UploadRow::into_record).collect()
    }

    async fn delete_upload(&self, id: Uuid) -> Result<(), StoreError> {
        match self.uploads.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(format!("Upload {id}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_list_is_newest_first_and_filters_by_status() {
        let store = MemoryStore::new();
        let now = Utc::now();

        let older = ApplicationRecord::new_draft(json!({}), now - Duration::minutes(5));
        let mut newer = ApplicationRecord::new_draft(json!({}), now);
        newer.status = ApplicationStatus::Submitted;
        store.insert_application(&older).await.unwrap();
        store.insert_application(&newer).await.unwrap();

        let all = store.list_applications(None).await.unwrap();
        assert_eq!(
            all.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![newer.id, older.id]
        );

        let drafts = store
            .list_applications(Some(ApplicationStatus::Draft))
            .await
            .unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].id, older.id);
    }

    #[tokio::test]
    async fn test_update_unknown_application_is_not_found() {
        let store = MemoryStore::new();
        let record = ApplicationRecord::new_draft(json!({}), Utc::now());
        let err = store.update_application(&record).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_missing_upload_is_not_found() {
        let store = MemoryStore::new();
        let err = store.delete_upload(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
