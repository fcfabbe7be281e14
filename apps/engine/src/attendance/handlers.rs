//! Axum route handlers for the Attendance API.

use axum::{extract::State, Json};

use crate::attendance::anomaly::{detect_anomalies, AnomalyReport, AnomalyRequest};
use crate::errors::AppError;
use crate::extract::AppJson;
use crate::state::AppState;

/// POST /api/v1/attendance/anomalies
pub async fn handle_anomalies(
    State(state): State<AppState>,
    AppJson(request): AppJson<AnomalyRequest>,
) -> Result<Json<AnomalyReport>, AppError> {
    let report = detect_anomalies(&request, &state.config.attendance_policy)?;
    Ok(Json(report))
}
