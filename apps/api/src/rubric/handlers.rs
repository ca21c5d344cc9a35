use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::input::sanitize;
use crate::rubric::{Criterion, Rubric};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SessionIdQuery {
    pub session_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct AddCriterionRequest {
    pub session_id: Uuid,
    pub name: String,
    /// Percentage as entered in the form (e.g. 25.0). Converted to a 0–1
    /// fraction before storage.
    pub weight: f64,
    pub points_possible: f64,
    pub detailed_breakdown: String,
}

#[derive(Debug, Serialize)]
pub struct RubricResponse {
    pub criteria: Vec<Criterion>,
    pub total_points_possible: f64,
}

impl From<Rubric> for RubricResponse {
    fn from(rubric: Rubric) -> Self {
        RubricResponse {
            total_points_possible: rubric.total_points_possible(),
            criteria: rubric.criteria().to_vec(),
        }
    }
}

/// POST /api/v1/criteria
pub async fn handle_add_criterion(
    State(state): State<AppState>,
    Json(req): Json<AddCriterionRequest>,
) -> Result<Json<RubricResponse>, AppError> {
    let name = sanitize(&req.name);
    if name.is_empty() {
        return Err(AppError::Validation(
            "Criterion name must not be empty".to_string(),
        ));
    }
    if !(req.points_possible > 0.0) {
        return Err(AppError::Validation(
            "points_possible must be a positive number".to_string(),
        ));
    }
    if !(0.0..=100.0).contains(&req.weight) {
        return Err(AppError::Validation(
            "weight must be a percentage between 0 and 100".to_string(),
        ));
    }

    let criterion = Criterion {
        name,
        weight: req.weight / 100.0,
        points_possible: req.points_possible,
        detailed_breakdown: sanitize(&req.detailed_breakdown),
    };

    let rubric = state
        .sessions
        .with_session(req.session_id, |session| {
            session.rubric.add(criterion);
            session.rubric.clone()
        })
        .await?;

    info!(
        "Added criterion to session {}: {} criteria, {} points total",
        req.session_id,
        rubric.criteria().len(),
        rubric.total_points_possible()
    );

    Ok(Json(rubric.into()))
}

/// GET /api/v1/criteria
pub async fn handle_list_criteria(
    State(state): State<AppState>,
    Query(params): Query<SessionIdQuery>,
) -> Result<Json<RubricResponse>, AppError> {
    let rubric = state
        .sessions
        .with_session(params.session_id, |session| session.rubric.clone())
        .await?;
    Ok(Json(rubric.into()))
}

#[derive(Debug, Deserialize)]
pub struct ClearCriteriaRequest {
    pub session_id: Uuid,
}

/// POST /api/v1/criteria/clear
pub async fn handle_clear_criteria(
    State(state): State<AppState>,
    Json(req): Json<ClearCriteriaRequest>,
) -> Result<Json<RubricResponse>, AppError> {
    let rubric = state
        .sessions
        .with_session(req.session_id, |session| {
            session.rubric.clear();
            session.rubric.clone()
        })
        .await?;

    info!("Cleared criteria for session {}", req.session_id);
    Ok(Json(rubric.into()))
}
