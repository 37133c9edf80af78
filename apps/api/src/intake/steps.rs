//! Six-step form flow: 1 -> 2 -> ... -> 6 -> review -> submitted.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::intake::applications::{apply_update, ensure_draft, load_application, mark_submitted};
use crate::intake::merge::overlay;
use crate::intake::redact::mask_pii;
use crate::intake::rules::{validate_draft, validate_submission, FieldError};
use crate::models::application::{ApplicationRecord, ApplicationStatus};
use crate::store::ApplicationStore;

pub const STEP_COUNT: u8 = 6;

const STEP_SECTIONS: [&[&str]; STEP_COUNT as usize] = [
    &["guardianName", "applicant", "request"],
    &["medicalHistory", "medicalCoverage"],
    &["income", "employmentApplicant", "spouse"],
    &["dependents", "residencyGA", "resourcesContacted"],
    &["natureOfRequest", "vendors"],
    &["certification"],
];

const STEP_VIEWS: [&str; STEP_COUNT as usize] =
    ["step1", "step2", "step3", "step4", "step5", "step6"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Step(u8);

impl Step {
    /// Rejects anything outside 1..=6 before storage is touched.
    pub fn new(number: u32) -> Result<Self, AppError> {
        match u8::try_from(number) {
            Ok(n) if (1..=STEP_COUNT).contains(&n) => Ok(Step(n)),
            _ => Err(AppError::BadRequest(format!(
                "Invalid step number {number}; expected 1 to {STEP_COUNT}"
            ))),
        }
    }

    pub fn number(self) -> u8 {
        self.0
    }

    pub fn sections(self) -> &'static [&'static str] {
        STEP_SECTIONS[usize::from(self.0 - 1)]
    }

    pub fn view(self) -> &'static str {
        STEP_VIEWS[usize::from(self.0 - 1)]
    }

    pub fn next(self) -> Next {
        if self.0 < STEP_COUNT {
            Next::Step(Step(self.0 + 1))
        } else {
            Next::Review
        }
    }
}

/// Where the applicant goes after a successful save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Next {
    Step(Step),
    Review,
}

impl Next {
    pub fn location(self, application_id: Uuid) -> String {
        match self {
            Next::Step(step) => format!("/applications/{application_id}/step/{}", step.number()),
            Next::Review => format!("/applications/{application_id}/review"),
        }
    }
}

/// Data context for a step template.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepView {
    pub view: &'static str,
    pub step: Step,
    pub application_id: Uuid,
    pub status: ApplicationStatus,
    pub data: Value,
    pub errors: Vec<FieldError>,
}

#[derive(Debug)]
pub enum StepOutcome {
    Saved(Next),
    /// Validation failed; nothing was persisted.
    Rejected(StepView),
}

pub async fn show_step(
    store: &dyn ApplicationStore,
    application_id: Uuid,
    step: Step,
) -> Result<StepView, AppError> {
    let record = load_application(store, application_id).await?;
    Ok(StepView {
        view: step.view(),
        step,
        application_id,
        status: record.status,
        data: record.data,
        errors: Vec::new(),
    })
}

pub async fn save_step(
    store: &dyn ApplicationStore,
    application_id: Uuid,
    step: Step,
    body: &Map<String, Value>,
) -> Result<StepOutcome, AppError> {
    let record = load_application(store, application_id).await?;
    ensure_draft(&record)?;

    match validate_draft(step.sections(), body) {
        Ok(coerced) => {
            apply_update(store, application_id, &coerced).await?;
            info!(
                "Saved step {} for application {application_id}",
                step.number()
            );
            Ok(StepOutcome::Saved(step.next()))
        }
        Err(errors) => {
            let masked = mask_pii(&Value::Object(body.clone()));
            debug!(
                "Step {} rejected for application {application_id}: {} error(s), body {masked}",
                step.number(),
                errors.len()
            );
            Ok(StepOutcome::Rejected(StepView {
                view: step.view(),
                step,
                application_id,
                status: record.status,
                data: overlay(&record.data, body),
                errors,
            }))
        }
    }
}

/// Autosave accepts any section, validated leniently, and merges it.
pub async fn autosave(
    store: &dyn ApplicationStore,
    application_id: Uuid,
    body: &Map<String, Value>,
) -> Result<ApplicationRecord, AppError> {
    let record = load_application(store, application_id).await?;
    ensure_draft(&record)?;

    let all_sections: Vec<&str> = STEP_SECTIONS.iter().flat_map(|s| s.iter().copied()).collect();
    let coerced = validate_draft(&all_sections, body).map_err(AppError::ValidationFailed)?;
    apply_update(store, application_id, &coerced).await
}

/// Strict validation of the stored document, then DRAFT -> SUBMITTED.
pub async fn submit_application(
    store: &dyn ApplicationStore,
    application_id: Uuid,
) -> Result<ApplicationRecord, AppError> {
    let record = load_application(store, application_id).await?;
    ensure_draft(&record)?;

    let empty = Map::new();
    let document = record.data.as_object().unwrap_or(&empty);
    if let Err(errors) = validate_submission(document) {
        info!(
            "Submission of application {application_id} failed validation ({} error(s))",
            errors.len()
        );
        return Err(AppError::ValidationFailed(errors));
    }

    mark_submitted(store, record).await
}
