use chrono::Utc;
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::intake::merge::merge;
use crate::models::application::{skeleton_document, ApplicationRecord, ApplicationStatus};
use crate::store::ApplicationStore;

/// Creates a new DRAFT application seeded with the skeleton document.
pub async fn create_application(store: &dyn ApplicationStore) -> Result<ApplicationRecord, AppError> {
    let record = ApplicationRecord::new_draft(skeleton_document(), Utc::now());
    store.insert_application(&record).await?;
    info!("Created application {}", record.id);
    Ok(record)
}

pub async fn load_application(
    store: &dyn ApplicationStore,
    id: Uuid,
) -> Result<ApplicationRecord, AppError> {
    store
        .fetch_application(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Application {id} not found")))
}

/// Fails with `ImmutableRecord` once the application has been submitted.
pub fn ensure_draft(record: &ApplicationRecord) -> Result<(), AppError> {
    if record.is_submitted() {
        return Err(AppError::ImmutableRecord(record.id));
    }
    Ok(())
}

/// Deep-merges an already-validated partial document into a draft.
pub async fn apply_update(
    store: &dyn ApplicationStore,
    id: Uuid,
    partial: &Value,
) -> Result<ApplicationRecord, AppError> {
    let mut record = load_application(store, id).await?;
    ensure_draft(&record)?;

    record.data = merge(&record.data, partial);
    record.updated_at = Utc::now();
    store.update_application(&record).await?;
    Ok(record)
}

/// DRAFT -> SUBMITTED. Callers run submission validation first.
pub async fn mark_submitted(
    store: &dyn ApplicationStore,
    mut record: ApplicationRecord,
) -> Result<ApplicationRecord, AppError> {
    ensure_draft(&record)?;

    let now = Utc::now();
    record.status = ApplicationStatus::Submitted;
    record.submitted_at = Some(now);
    record.updated_at = now;
    store.update_application(&record).await?;
    info!("Application {} submitted", record.id);
    Ok(record)
}

/// Unconditional return to DRAFT, clearing `submitted_at`.
pub async fn reset_to_draft(
    store: &dyn ApplicationStore,
    id: Uuid,
) -> Result<ApplicationRecord, AppError> {
    let mut record = load_application(store, id).await?;
    let previous = record.status;

    record.status = ApplicationStatus::Draft;
    record.submitted_at = None;
    record.updated_at = Utc::now();
    store.update_application(&record).await?;
    info!("Application {id} reset to DRAFT (was {previous})");
    Ok(record)
}

pub async fn list_applications(
    store: &dyn ApplicationStore,
    status: Option<ApplicationStatus>,
) -> Result<Vec<ApplicationRecord>, AppError> {
    Ok(store.list_applications(status).await?)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_create_seeds_skeleton() {
        let store = MemoryStore::new();
        let record = create_application(&store).await.unwrap();
        let loaded = load_application(&store, record.id).await.unwrap();
        assert_eq!(loaded.status, ApplicationStatus::Draft);
        assert_eq!(loaded.data, skeleton_document());
        assert!(loaded.submitted_at.is_none());
    }

    #[tokio::test]
    async fn test_load_unknown_is_not_found() {
        let store = MemoryStore::new();
        let err = load_application(&store, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_merges_without_clobbering() {
        let store = MemoryStore::new();
        let record = create_application(&store).await.unwrap();

        apply_update(&store, record.id, &json!({ "income": { "otherIncome": "Child support" } }))
            .await
            .unwrap();
        let loaded = load_application(&store, record.id).await.unwrap();
        assert_eq!(loaded.data["income"]["otherIncome"], json!("Child support"));
        assert_eq!(loaded.data["income"]["receives"], json!({}));
        assert_eq!(loaded.data["vendors"].as_array().map(Vec::len), Some(3));
        assert!(loaded.updated_at >= record.updated_at);
    }

    #[tokio::test]
    async fn test_submitted_record_rejects_updates_until_reset() {
        let store = MemoryStore::new();
        let record = create_application(&store).await.unwrap();
        let submitted = mark_submitted(&store, record).await.unwrap();
        assert!(submitted.submitted_at.is_some());

        let err = apply_update(&store, submitted.id, &json!({ "natureOfRequest": "x" }))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ImmutableRecord(id) if id == submitted.id));

        let reset = reset_to_draft(&store, submitted.id).await.unwrap();
        assert_eq!(reset.status, ApplicationStatus::Draft);
        assert!(reset.submitted_at.is_none());
        apply_update(&store, submitted.id, &json!({ "natureOfRequest": "x" }))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_reset_is_unconditional_on_drafts() {
        let store = MemoryStore::new();
        let record = create_application(&store).await.unwrap();
        let reset = reset_to_draft(&store, record.id).await.unwrap();
        assert_eq!(reset.status, ApplicationStatus::Draft);
        assert_eq!(reset.data, record.data);
    }

    #[tokio::test]
    async fn test_double_submit_is_rejected() {
        let store = MemoryStore::new();
        let record = create_application(&store).await.unwrap();
        let submitted = mark_submitted(&store, record).await.unwrap();
        assert!(matches!(
            mark_submitted(&store, submitted).await,
            Err(AppError::ImmutableRecord(_))
        ));
    }
}
