pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use tower_http::validate_request::ValidateRequestHeaderLayer;

use crate::admin::handlers as admin;
use crate::intake::handlers as intake;
use crate::state::AppState;
use crate::uploads::handlers as uploads;

/// Room for multipart boundaries and the category part on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/applications", get(admin::handle_list))
        .route("/applications/:id", get(admin::handle_detail))
        .route("/applications/:id/reset", post(admin::handle_reset))
        .route_layer(ValidateRequestHeaderLayer::basic(
            &state.config.admin_username,
            &state.config.admin_password,
        ));

    let upload_limit = state.config.max_file_size.saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route("/health", get(health::health_handler))
        // Applicant flow
        .route("/applications", post(intake::handle_create))
        .route(
            "/applications/:id/step/:step",
            get(intake::handle_get_step).post(intake::handle_post_step),
        )
        .route("/applications/:id/autosave", post(intake::handle_autosave))
        .route(
            "/applications/:id/validate/:section",
            post(intake::handle_validate_section),
        )
        .route("/applications/:id/review", get(intake::handle_review))
        .route("/applications/:id/submit", post(intake::handle_submit))
        .route("/partials/resource-row", get(intake::handle_resource_row))
        // Documents
        .route(
            "/applications/:id/uploads",
            post(uploads::handle_upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/uploads/:upload_id", delete(uploads::handle_delete_upload))
        .nest("/admin", admin_routes)
        .with_state(state)
}
