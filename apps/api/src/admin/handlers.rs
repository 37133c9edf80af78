use axum::{
    extract::{Path, Query, State},
    response::Redirect,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::intake::applications::{list_applications, load_application, reset_to_draft};
use crate::models::application::{ApplicationRecord, ApplicationStatus};
use crate::models::upload::UploadRecord;
use crate::state::AppState;
use crate::uploads::pipeline::list_uploads;

#[derive(Deserialize)]
pub struct StatusQuery {
    pub status: Option<String>,
}

#[derive(Serialize)]
pub struct ApplicationList {
    pub applications: Vec<ApplicationRecord>,
}

#[derive(Serialize)]
pub struct ApplicationDetail {
    pub application: ApplicationRecord,
    pub uploads: Vec<UploadRecord>,
}

/// GET /admin/applications[?status=DRAFT|SUBMITTED]
pub async fn handle_list(
    State(state): State<AppState>,
    Query(params): Query<StatusQuery>,
) -> Result<Json<ApplicationList>, AppError> {
    let status = match params.status.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(raw.parse::<ApplicationStatus>().map_err(AppError::BadRequest)?),
    };
    let applications = list_applications(state.store.as_ref(), status).await?;
    Ok(Json(ApplicationList { applications }))
}

/// GET /admin/applications/:id
pub async fn handle_detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApplicationDetail>, AppError> {
    let application = load_application(state.store.as_ref(), id).await?;
    let uploads = list_uploads(state.store.as_ref(), id).await?;
    Ok(Json(ApplicationDetail {
        application,
        uploads,
    }))
}

/// POST /admin/applications/:id/reset
pub async fn handle_reset(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Redirect, AppError> {
    reset_to_draft(state.store.as_ref(), id).await?;
    Ok(Redirect::to(&format!("/admin/applications/{id}")))
}
