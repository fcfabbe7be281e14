//! Axum route handlers for the Resume API.

use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::extract::AppJson;
use crate::resume::ats::{analyze_resume, AnalyzeRequest, AtsReport};
use crate::resume::improve::{ImprovementResult, ImproveRequest};
use crate::state::AppState;

/// POST /api/v1/resumes/analyze
///
/// ATS score, parsed sections and JD fit for one extracted resume text.
pub async fn handle_analyze(
    State(state): State<AppState>,
    AppJson(request): AppJson<AnalyzeRequest>,
) -> Result<Json<AtsReport>, AppError> {
    let report = analyze_resume(&request, &state.semantic_fit, &state.config.ats_weights).await?;
    Ok(Json(report))
}

/// POST /api/v1/resumes/improve
pub async fn handle_improve(
    State(state): State<AppState>,
    AppJson(request): AppJson<ImproveRequest>,
) -> Result<Json<ImprovementResult>, AppError> {
    let result = state.improver.improve(&request).await?;
    Ok(Json(result))
}
