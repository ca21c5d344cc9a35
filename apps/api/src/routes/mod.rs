pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::grading::handlers as grading;
use crate::rubric::handlers as rubric;
use crate::session;
use crate::state::AppState;
use crate::submission::handlers as submission;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/session", post(session::handle_create_session))
        .route("/api/v1/submission", post(submission::handle_submit_essay))
        .route(
            "/api/v1/submission/image",
            post(submission::handle_submit_image),
        )
        .route(
            "/api/v1/criteria",
            get(rubric::handle_list_criteria).post(rubric::handle_add_criterion),
        )
        .route("/api/v1/criteria/clear", post(rubric::handle_clear_criteria))
        .route("/api/v1/grade", post(grading::handle_grade))
        .with_state(state)
}
