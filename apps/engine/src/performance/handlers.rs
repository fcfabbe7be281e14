//! Axum route handlers for the Performance API.

use axum::Json;

use crate::errors::AppError;
use crate::extract::AppJson;
use crate::performance::insights::{performance_insights, InsightsRequest, PerformanceInsights};

/// POST /api/v1/performance/insights
pub async fn handle_insights(
    AppJson(request): AppJson<InsightsRequest>,
) -> Result<Json<PerformanceInsights>, AppError> {
    Ok(Json(performance_insights(&request)?))
}
