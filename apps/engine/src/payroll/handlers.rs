//! Axum route handlers for the Payroll API.

use axum::Json;

use crate::errors::AppError;
use crate::extract::AppJson;
use crate::payroll::forecast::{forecast, ForecastRequest, PayrollForecast};

/// POST /api/v1/payroll/forecast
pub async fn handle_forecast(
    AppJson(request): AppJson<ForecastRequest>,
) -> Result<Json<PayrollForecast>, AppError> {
    Ok(Json(forecast(&request)?))
}
