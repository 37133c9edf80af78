use async_trait::async_trait;
use axum::{
    extract::{
        multipart::{Field, MultipartError},
        Multipart, Path, State,
    },
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::upload::{UploadCategory, UploadRecord};
use crate::state::AppState;
use crate::uploads::pipeline::{
    delete_upload, ensure_application, ChunkSource, StagedUpload, UploadError,
};

#[async_trait]
impl ChunkSource for Field<'_> {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, UploadError> {
        self.chunk().await.map_err(|e| {
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                UploadError::TooLarge(e.body_text())
            } else {
                UploadError::Stream(e.body_text())
            }
        })
    }
}

/// Keeps the transport's classification: an exceeded body limit is 413, the rest 400.
fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::BadRequest(e.body_text())
    }
}

/// POST /applications/:id/uploads
/// Multipart body: one `file` part and an optional `category` text part.
pub async fn handle_upload(
    State(state): State<AppState>,
    Path(application_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadRecord>), AppError> {
    ensure_application(state.store.as_ref(), application_id).await?;

    let mut staged: Option<StagedUpload> = None;
    let category = match read_form(&state, application_id, &mut multipart, &mut staged).await {
        Ok(category) => category,
        Err(e) => {
            if let Some(file) = staged {
                file.discard().await;
            }
            return Err(e);
        }
    };

    let Some(file) = staged else {
        return Err(AppError::BadRequest("No file provided".to_string()));
    };
    let record = file.commit(state.store.as_ref(), category).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn read_form(
    state: &AppState,
    application_id: Uuid,
    multipart: &mut Multipart,
    staged: &mut Option<StagedUpload>,
) -> Result<UploadCategory, AppError> {
    let mut category = UploadCategory::Other;

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("category") => {
                let raw = field.text().await.map_err(multipart_error)?;
                category = raw.parse().map_err(AppError::BadRequest)?;
            }
            Some("file") if staged.is_none() => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let file = state
                    .uploads
                    .stage(application_id, &filename, &content_type, &mut field)
                    .await?;
                *staged = Some(file);
            }
            Some("file") => {
                return Err(AppError::BadRequest(
                    "Only one file may be uploaded per request".to_string(),
                ));
            }
            _ => {}
        }
    }

    Ok(category)
}

/// DELETE /uploads/:upload_id
pub async fn handle_delete_upload(
    State(state): State<AppState>,
    Path(upload_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    delete_upload(state.store.as_ref(), upload_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
