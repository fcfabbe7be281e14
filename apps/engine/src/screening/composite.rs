//! Composite screening score: skill coverage blended with JD text similarity.
//!
//! composite = round(skills_score × w_skills + jd_score × w_jd)
//!
//! The weights are applied exactly as given. They are NOT renormalized when they do not sum
//! to 1; only the final value is clamped to 0–100 like every other percentage.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::text::similarity::{similarity_percent, term_frequencies};
use crate::text::tokenizer::{normalize_terms, tokenize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositeWeights {
    pub skills: f64,
    pub jd: f64,
}

impl Default for CompositeWeights {
    fn default() -> Self {
        Self {
            skills: 0.6,
            jd: 0.4,
        }
    }
}

/// Caller override for one or both weights. Missing fields fall back to the configured default.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeightOverride {
    pub skills: Option<f64>,
    pub jd: Option<f64>,
}

impl WeightOverride {
    pub fn resolve(&self, defaults: CompositeWeights) -> CompositeWeights {
        CompositeWeights {
            skills: self.skills.unwrap_or(defaults.skills),
            jd: self.jd.unwrap_or(defaults.jd),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScreenRequest {
    #[serde(default)]
    pub resume_text: String,
    #[serde(default)]
    pub job_description: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub weight: WeightOverride,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResult {
    pub skills_score: u32,
    pub jd_score: u32,
    pub composite_score: u32,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
}

/// Rounds and clamps a raw percentage into 0–100.
pub fn clamp_percent(value: f64) -> u32 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u32
}

/// Weighted blend of the two sub-scores. Monotonic non-decreasing in each sub-score
/// for non-negative weights.
pub fn combine(skills_score: u32, jd_score: u32, weights: CompositeWeights) -> u32 {
    clamp_percent(skills_score as f64 * weights.skills + jd_score as f64 * weights.jd)
}

/// Validates a screening request before any computation happens.
pub fn validate(request: &ScreenRequest) -> Result<(), AppError> {
    if request.resume_text.trim().is_empty() {
        return Err(AppError::Validation("resume_text is required".to_string()));
    }
    if request.job_description.trim().is_empty() && normalize_terms(&request.skills).is_empty() {
        return Err(AppError::Validation(
            "Provide a job_description or at least one skill to screen against".to_string(),
        ));
    }
    Ok(())
}

/// Scores one resume against a skills list and a job description.
pub fn score_resume(request: &ScreenRequest, defaults: CompositeWeights) -> ScoreResult {
    let resume_lower = request.resume_text.to_lowercase();
    let skills = normalize_terms(&request.skills);

    let (matched_skills, missing_skills): (Vec<String>, Vec<String>) = skills
        .into_iter()
        .partition(|s| resume_lower.contains(s.as_str()));

    let total = matched_skills.len() + missing_skills.len();
    let skills_score = if total == 0 {
        0
    } else {
        clamp_percent(matched_skills.len() as f64 / total as f64 * 100.0)
    };

    let resume_tf = term_frequencies(&tokenize(&request.resume_text));
    let jd_tf = term_frequencies(&tokenize(&request.job_description));
    let jd_score = similarity_percent(&resume_tf, &jd_tf);

    let weights = request.weight.resolve(defaults);
    let composite_score = combine(skills_score, jd_score, weights);

    ScoreResult {
        skills_score,
        jd_score,
        composite_score,
        matched_skills,
        missing_skills,
    }
}
