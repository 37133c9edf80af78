use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::errors::AppError;
use crate::intake::applications::{create_application, load_application};
use crate::intake::rules::{validate_section, FieldError, MAX_RESOURCES};
use crate::intake::steps::{
    autosave, save_step, show_step, submit_application, Next, Step, StepOutcome, StepView,
};
use crate::models::application::ApplicationRecord;
use crate::models::upload::UploadRecord;
use crate::state::AppState;
use crate::uploads::pipeline::list_uploads;

fn object_body(body: Value) -> Result<Map<String, Value>, AppError> {
    match body {
        Value::Object(map) => Ok(map),
        _ => Err(AppError::BadRequest(
            "Request body must be a JSON object".to_string(),
        )),
    }
}

/// POST /applications
pub async fn handle_create(State(state): State<AppState>) -> Result<Redirect, AppError> {
    let record = create_application(state.store.as_ref()).await?;
    let first = Next::Step(Step::new(1)?);
    Ok(Redirect::to(&first.location(record.id)))
}

/// GET /applications/:id/step/:step
pub async fn handle_get_step(
    State(state): State<AppState>,
    Path((id, step)): Path<(Uuid, u32)>,
) -> Result<Json<StepView>, AppError> {
    let step = Step::new(step)?;
    Ok(Json(show_step(state.store.as_ref(), id, step).await?))
}

/// POST /applications/:id/step/:step
/// 303 to the next step on success, 422 with the re-rendered view otherwise.
pub async fn handle_post_step(
    State(state): State<AppState>,
    Path((id, step)): Path<(Uuid, u32)>,
    Json(body): Json<Value>,
) -> Result<Response, AppError> {
    let step = Step::new(step)?;
    let body = object_body(body)?;

    match save_step(state.store.as_ref(), id, step, &body).await? {
        StepOutcome::Saved(next) => Ok(Redirect::to(&next.location(id)).into_response()),
        StepOutcome::Rejected(view) => {
            Ok((StatusCode::UNPROCESSABLE_ENTITY, Json(view)).into_response())
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutosaveResponse {
    pub saved_at: DateTime<Utc>,
}

/// POST /applications/:id/autosave
pub async fn handle_autosave(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<Value>,
) -> Result<Json<AutosaveResponse>, AppError> {
    let body = object_body(body)?;
    let record = autosave(state.store.as_ref(), id, &body).await?;
    Ok(Json(AutosaveResponse {
        saved_at: record.updated_at,
    }))
}

#[derive(Serialize)]
pub struct SectionErrors {
    pub errors: Vec<FieldError>,
}

/// POST /applications/:id/validate/:section
/// Stateless; the id only scopes the route.
pub async fn handle_validate_section(
    Path((_id, section)): Path<(Uuid, String)>,
    Json(body): Json<Value>,
) -> Result<Json<SectionErrors>, AppError> {
    let body = object_body(body)?;
    let errors = validate_section(&section, &body)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown section '{section}'")))?;
    Ok(Json(SectionErrors { errors }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
    pub view: &'static str,
    pub application: ApplicationRecord,
    pub uploads: Vec<UploadRecord>,
}

/// GET /applications/:id/review
pub async fn handle_review(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReviewView>, AppError> {
    let application = load_application(state.store.as_ref(), id).await?;
    let uploads = list_uploads(state.store.as_ref(), id).await?;
    Ok(Json(ReviewView {
        view: "review",
        application,
        uploads,
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationView {
    pub view: &'static str,
    pub application_id: Uuid,
    pub submitted_at: Option<DateTime<Utc>>,
}

/// POST /applications/:id/submit
pub async fn handle_submit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ConfirmationView>, AppError> {
    let record = submit_application(state.store.as_ref(), id).await?;
    Ok(Json(ConfirmationView {
        view: "confirmation",
        application_id: record.id,
        submitted_at: record.submitted_at,
    }))
}

#[derive(Deserialize)]
pub struct ResourceRowQuery {
    #[serde(default)]
    pub index: usize,
}

#[derive(Serialize)]
pub struct ResourceRow {
    pub view: &'static str,
    pub index: usize,
}

/// GET /partials/resource-row?index=N
pub async fn handle_resource_row(
    Query(params): Query<ResourceRowQuery>,
) -> Result<Json<ResourceRow>, AppError> {
    if params.index >= MAX_RESOURCES {
        return Err(AppError::BadRequest(format!(
            "Maximum {MAX_RESOURCES} resources allowed"
        )));
    }
    Ok(Json(ResourceRow {
        view: "partials/resource-row",
        index: params.index,
    }))
}
