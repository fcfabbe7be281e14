//! Axum route handlers for the Screening API.

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::extract::AppJson;
use crate::screening::composite::{score_resume, validate, ScoreResult, ScreenRequest};
use crate::screening::ranking::{rank_candidates, RankRequest, RankedCandidate};
use crate::screening::skill_gap::{analyze_skill_gap, SkillGapReport, SkillGapRequest};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RankResponse {
    pub ranked: Vec<RankedCandidate>,
}

/// POST /api/v1/recruitment/screen
///
/// Composite skills + JD similarity score for one resume.
pub async fn handle_screen(
    State(state): State<AppState>,
    AppJson(request): AppJson<ScreenRequest>,
) -> Result<Json<ScoreResult>, AppError> {
    validate(&request)?;
    Ok(Json(score_resume(&request, state.config.composite_weights)))
}

/// POST /api/v1/candidates/rank
pub async fn handle_rank(
    State(state): State<AppState>,
    AppJson(request): AppJson<RankRequest>,
) -> Result<Json<RankResponse>, AppError> {
    let ranked = rank_candidates(&request, &state.config.ranking_policy);
    info!(
        "Ranked {} candidates (top score {})",
        ranked.len(),
        ranked.first().map_or(0, |r| r.score)
    );
    Ok(Json(RankResponse { ranked }))
}

/// POST /api/v1/skills/gap
pub async fn handle_skill_gap(
    AppJson(request): AppJson<SkillGapRequest>,
) -> Json<SkillGapReport> {
    Json(analyze_skill_gap(&request))
}
