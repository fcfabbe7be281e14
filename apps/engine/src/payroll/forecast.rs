//! Payroll forecast: a flat monthly net salary projected over a horizon.
//!
//! monthly_net = max(0, base + Σadditions − Σdeductions)

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub const DEFAULT_MONTHS: u32 = 12;
/// Longest horizon accepted, ten years.
pub const MAX_MONTHS: u32 = 120;

/// One addition or deduction line. Labels such as `type` or `description` are accepted and
/// ignored; only the amount feeds the forecast.
#[derive(Debug, Clone, Deserialize)]
pub struct PayAdjustment {
    #[serde(default)]
    pub amount: f64,
}

fn default_months() -> u32 {
    DEFAULT_MONTHS
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastRequest {
    #[serde(default)]
    pub base: f64,
    #[serde(default)]
    pub additions: Vec<PayAdjustment>,
    #[serde(default)]
    pub deductions: Vec<PayAdjustment>,
    /// 0 is treated as 1.
    #[serde(default = "default_months")]
    pub months: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthProjection {
    pub month: u32,
    pub net: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayrollForecast {
    pub monthly_net: f64,
    pub projection: Vec<MonthProjection>,
    pub total: f64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn sum_amounts(items: &[PayAdjustment]) -> f64 {
    items.iter().map(|item| item.amount).sum()
}

pub fn validate(request: &ForecastRequest) -> Result<(), AppError> {
    if request.months > MAX_MONTHS {
        return Err(AppError::Validation(format!(
            "months must be at most {MAX_MONTHS}"
        )));
    }
    let amounts = std::iter::once(request.base)
        .chain(request.additions.iter().map(|a| a.amount))
        .chain(request.deductions.iter().map(|d| d.amount));
    for amount in amounts {
        if !amount.is_finite() {
            return Err(AppError::Validation("amounts must be finite numbers".to_string()));
        }
    }
    Ok(())
}

pub fn monthly_net(request: &ForecastRequest) -> f64 {
    let net = request.base + sum_amounts(&request.additions) - sum_amounts(&request.deductions);
    round2(net.max(0.0))
}

pub fn forecast(request: &ForecastRequest) -> Result<PayrollForecast, AppError> {
    validate(request)?;

    let net = monthly_net(request);
    let months = request.months.max(1);
    let projection: Vec<MonthProjection> = (1..=months)
        .map(|month| MonthProjection { month, net })
        .collect();

    Ok(PayrollForecast {
        monthly_net: net,
        total: round2(net * f64::from(months)),
        projection,
    })
}
