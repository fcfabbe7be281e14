//! Review insights: a weight-averaged goal score plus coaching tips keyed off the
//! reviewer's comments.
//!
//! auto_score = Σ(score × weight) / Σweight, rounded to two decimals. A zero total weight
//! divides by 1, so unweighted goals score 0.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// A goal's `title` may be sent; it plays no part in the score.
#[derive(Debug, Clone, Deserialize)]
pub struct GoalScore {
    /// 0 to 100.
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub weight: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InsightsRequest {
    #[serde(default)]
    pub goals: Vec<GoalScore>,
    #[serde(default)]
    pub comments: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceInsights {
    pub auto_score: f64,
    pub tips: Vec<String>,
}

struct ReviewTheme {
    pattern: Regex,
    tip: &'static str,
}

static THEMES: LazyLock<Vec<ReviewTheme>> = LazyLock::new(|| {
    [
        (
            r"(?i)communication|collaborat(?:e|ion)",
            "Consider targeted communication training.",
        ),
        (
            r"(?i)deadline|delay",
            "Review time management approaches and set clearer milestones.",
        ),
        (
            r"(?i)quality|bug",
            "Introduce code reviews and automated tests to improve quality.",
        ),
    ]
    .into_iter()
    .map(|(pattern, tip)| ReviewTheme {
        pattern: Regex::new(pattern).expect("valid review theme regex"),
        tip,
    })
    .collect()
});

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn validate(request: &InsightsRequest) -> Result<(), AppError> {
    for (i, goal) in request.goals.iter().enumerate() {
        if !goal.score.is_finite() || !(0.0..=100.0).contains(&goal.score) {
            return Err(AppError::Validation(format!(
                "goals[{i}].score must be between 0 and 100"
            )));
        }
        if !goal.weight.is_finite() || goal.weight < 0.0 {
            return Err(AppError::Validation(format!(
                "goals[{i}].weight must not be negative"
            )));
        }
    }
    Ok(())
}

pub fn weighted_goal_score(goals: &[GoalScore]) -> f64 {
    let total_weight: f64 = goals.iter().map(|g| g.weight).sum();
    let total_weight = if total_weight == 0.0 { 1.0 } else { total_weight };
    let weighted: f64 = goals.iter().map(|g| g.score * g.weight).sum();
    round2(weighted / total_weight)
}

/// One tip per theme found in `comments`, in theme order.
pub fn review_tips(comments: &str) -> Vec<String> {
    THEMES
        .iter()
        .filter(|theme| theme.pattern.is_match(comments))
        .map(|theme| theme.tip.to_string())
        .collect()
}

pub fn performance_insights(request: &InsightsRequest) -> Result<PerformanceInsights, AppError> {
    validate(request)?;
    Ok(PerformanceInsights {
        auto_score: weighted_goal_score(&request.goals),
        tips: review_tips(&request.comments),
    })
}
