use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::upload::{UploadCategory, UploadRecord};
use crate::store::{ApplicationStore, StoreError};

pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "image/jpeg",
    "image/png",
    "image/gif",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("File type '{0}' is not accepted")]
    UnsupportedMediaType(String),

    #[error("Upload stream failed: {0}")]
    Stream(String),

    #[error("Upload exceeds the size limit: {0}")]
    TooLarge(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::UnsupportedMediaType(mime) => AppError::UnsupportedMediaType(mime),
            UploadError::Stream(msg) => AppError::BadRequest(msg),
            UploadError::TooLarge(msg) => AppError::PayloadTooLarge(msg),
            UploadError::Io(e) => AppError::Io(e),
            UploadError::Store(e) => e.into(),
        }
    }
}

/// Pull-based source of file bytes. `Ok(None)` marks the end of the stream.
#[async_trait]
pub trait ChunkSource: Send {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, UploadError>;
}

/// True when the essence type (parameters stripped) is on the allow-list.
pub fn is_allowed_mime(content_type: &str) -> bool {
    content_type
        .parse::<mime::Mime>()
        .map(|m| ALLOWED_MIME_TYPES.contains(&m.essence_str()))
        .unwrap_or(false)
}

/// Replaces every character outside `[A-Za-z0-9.-]` with `_`.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

pub const MAX_STORED_NAME_LEN: usize = 100;

/// Cuts a sanitized name down to `MAX_STORED_NAME_LEN`, keeping a short extension.
fn truncate_name(sanitized: String) -> String {
    if sanitized.len() <= MAX_STORED_NAME_LEN {
        return sanitized;
    }
    // Sanitized names are ASCII, so byte offsets are char boundaries.
    let ext = match sanitized.rfind('.') {
        Some(dot) if dot > 0 && sanitized.len() - dot <= 16 => &sanitized[dot..],
        _ => "",
    };
    let stem = &sanitized[..MAX_STORED_NAME_LEN - ext.len()];
    format!("{stem}{ext}")
}

pub fn storage_filename(upload_id: Uuid, original: &str, unix_millis: i64) -> String {
    let simple = upload_id.simple().to_string();
    format!(
        "{unix_millis}_{}_{}",
        &simple[..8],
        truncate_name(sanitize_filename(original))
    )
}

/// A file that is fully on disk but not yet recorded in the store.
#[derive(Debug)]
pub struct StagedUpload {
    pub id: Uuid,
    pub application_id: Uuid,
    pub filename: String,
    pub mime_type: String,
    pub size: i64,
    pub storage_path: PathBuf,
}

impl StagedUpload {
    /// Inserts the metadata row. The file is removed if the insert fails.
    pub async fn commit(
        self,
        store: &dyn ApplicationStore,
        category: UploadCategory,
    ) -> Result<UploadRecord, UploadError> {
        let record = UploadRecord {
            id: self.id,
            application_id: self.application_id,
            filename: self.filename,
            mime_type: self.mime_type,
            size: self.size,
            category,
            storage_path: self.storage_path.to_string_lossy().into_owned(),
            uploaded_at: Utc::now(),
        };

        if let Err(e) = store.insert_upload(&record).await {
            remove_quietly(&self.storage_path).await;
            return Err(e.into());
        }

        info!(
            "Stored upload {} ({} bytes, {}) for application {}",
            record.id, record.size, record.category, record.application_id
        );
        Ok(record)
    }

    pub async fn discard(self) {
        remove_quietly(&self.storage_path).await;
    }
}

/// Streams uploaded files to `<root>/<application id>/` and manages their rows.
#[derive(Debug, Clone)]
pub struct UploadPipeline {
    root: PathBuf,
}

impl UploadPipeline {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Checks the MIME type, then streams the body to disk. Nothing is written when
    /// the type is rejected; a failed stream leaves no partial file behind.
    pub async fn stage(
        &self,
        application_id: Uuid,
        filename: &str,
        content_type: &str,
        source: &mut dyn ChunkSource,
    ) -> Result<StagedUpload, UploadError> {
        if !is_allowed_mime(content_type) {
            return Err(UploadError::UnsupportedMediaType(content_type.to_string()));
        }

        let id = Uuid::new_v4();
        let dir = self.root.join(application_id.to_string());
        fs::create_dir_all(&dir).await?;
        let path = dir.join(storage_filename(id, filename, Utc::now().timestamp_millis()));

        let size = match write_stream(&path, source).await {
            Ok(size) => size,
            Err(e) => {
                remove_quietly(&path).await;
                return Err(e);
            }
        };

        Ok(StagedUpload {
            id,
            application_id,
            filename: filename.to_string(),
            mime_type: content_type.to_string(),
            size,
            storage_path: path,
        })
    }

    /// Stages and commits in one go. The application must exist.
    #[cfg(test)]
    pub async fn save_upload(
        &self,
        store: &dyn ApplicationStore,
        application_id: Uuid,
        filename: &str,
        content_type: &str,
        category: UploadCategory,
        source: &mut dyn ChunkSource,
    ) -> Result<UploadRecord, AppError> {
        ensure_application(store, application_id).await?;
        let staged = self
            .stage(application_id, filename, content_type, source)
            .await?;
        Ok(staged.commit(store, category).await?)
    }
}

pub async fn ensure_application(
    store: &dyn ApplicationStore,
    application_id: Uuid,
) -> Result<(), AppError> {
    match store.fetch_application(application_id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::NotFound(format!(
            "Application {application_id} not found"
        ))),
    }
}

/// Removes the file (a missing file is fine) and then the row.
pub async fn delete_upload(store: &dyn ApplicationStore, upload_id: Uuid) -> Result<(), AppError> {
    let upload = store
        .fetch_upload(upload_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Upload {upload_id} not found")))?;

    match fs::remove_file(&upload.storage_path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(
            "Could not remove file {} for upload {upload_id}: {e}",
            upload.storage_path
        ),
    }

    store.delete_upload(upload_id).await?;
    info!("Deleted upload {upload_id}");
    Ok(())
}

pub async fn list_uploads(
    store: &dyn ApplicationStore,
    application_id: Uuid,
) -> Result<Vec<UploadRecord>, AppError> {
    Ok(store.list_uploads(application_id).await?)
}

async fn write_stream(path: &Path, source: &mut dyn ChunkSource) -> Result<i64, UploadError> {
    let mut file = fs::File::create(path).await?;
    let mut size: i64 = 0;
    while let Some(chunk) = source.next_chunk().await? {
        file.write_all(&chunk).await?;
        size += chunk.len() as i64;
    }
    file.flush().await?;
    Ok(size)
}

async fn remove_quietly(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("Could not remove {}: {e}", path.display());
        }
    }
}
