use axum::{extract::State, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::qa::{Profile, Verdict};
use crate::qa::evaluator::evaluate;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct QaRequest {
    pub menu_id: Uuid,
    pub question: String,
    pub profile: Profile,
}

/// POST /qa
///
/// A verdict is only produced for a menu with a non-empty parsed-page list;
/// anything earlier in the lifecycle is a precondition failure.
pub async fn handle_qa(
    State(state): State<AppState>,
    Json(req): Json<QaRequest>,
) -> Result<Json<Verdict>, AppError> {
    let record = state
        .store
        .get(&req.menu_id)
        .ok_or_else(|| AppError::NotFound(format!("Menu {} not found", req.menu_id)))?;

    let pages = record
        .pages
        .filter(|pages| !pages.is_empty())
        .ok_or_else(|| {
            AppError::PreconditionFailed(format!(
                "Menu {} has not been parsed yet — call POST /menus/{}/parse first",
                req.menu_id, req.menu_id
            ))
        })?;

    let verdict = evaluate(state.llm.as_ref(), &req.profile, &req.question, &pages).await;
    Ok(Json(verdict))
}
