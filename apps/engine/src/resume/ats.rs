//! ATS analysis: keyword coverage, section presence and formatting folded into one score,
//! then blended 50/50 with the JD fit.
//!
//! score       = round(coverage×60 + 10·skills + 10·experience + 8·education + 4·contact
//!                     + min(8, bullets×0.5))
//! final_score = round(0.5×score + 0.5×jd_fit), whichever source produced jd_fit

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::resume::intake::{check_format, check_readable, DocumentSource};
use crate::resume::sections::{
    parse_document, ContactInfo, FormattingSignals, ParsedSections, SectionFlags,
};
use crate::resume::semantic_fit::{JdFitSource, SemanticFitAdapter};
use crate::screening::composite::clamp_percent;
use crate::screening::ranking::KeywordPartition;
use crate::text::tokenizer::{dedup_ordered, normalize_terms, token_set, tokenize};

const MAX_REQUIRED_KEYWORDS: usize = 100;
const MATCHED_DISPLAY: usize = 20;
const MISSING_DISPLAY: usize = 15;
const FEEDBACK_KEYWORDS: usize = 10;
const DETECTED_SKILLS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AtsWeights {
    pub coverage: f64,
    pub skills: f64,
    pub experience: f64,
    pub education: f64,
    pub contact: f64,
    pub per_bullet: f64,
    pub bullet_cap: f64,
    /// Share of the final score taken by the ATS score; the rest is JD fit.
    pub ats_share: f64,
}

impl Default for AtsWeights {
    fn default() -> Self {
        Self {
            coverage: 60.0,
            skills: 10.0,
            experience: 10.0,
            education: 8.0,
            contact: 4.0,
            per_bullet: 0.5,
            bullet_cap: 8.0,
            ats_share: 0.5,
        }
    }
}

/// Keywords arrive either as a list or as one comma-separated string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum KeywordInput {
    List(Vec<String>),
    Csv(String),
}

impl Default for KeywordInput {
    fn default() -> Self {
        KeywordInput::List(Vec::new())
    }
}

impl KeywordInput {
    pub fn terms(&self) -> Vec<String> {
        match self {
            KeywordInput::List(items) => normalize_terms(items),
            KeywordInput::Csv(raw) => normalize_terms(&raw.split(',').collect::<Vec<_>>()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default, alias = "text")]
    pub resume_text: String,
    #[serde(default, alias = "jd")]
    pub job_description: String,
    #[serde(default)]
    pub keywords: KeywordInput,
    #[serde(flatten)]
    pub source: DocumentSource,
}

#[derive(Debug, Clone, Serialize)]
pub struct AtsReport {
    pub score: u32,
    pub jd_fit: u32,
    pub jd_fit_source: JdFitSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jd_fit_provider: Option<&'static str>,
    pub final_score: u32,
    pub matched_keywords: Vec<String>,
    pub missing_keywords: Vec<String>,
    pub total_keywords: usize,
    pub sections: SectionFlags,
    pub formatting: FormattingSignals,
    pub feedback: Vec<String>,
    pub parsed_sections: ParsedSections,
    pub contact: ContactInfo,
    pub detected_skills: Vec<String>,
}

/// Caller keywords first, then JD tokens; deduplicated and capped.
pub fn required_keywords(keywords: &[String], job_description: &str) -> Vec<String> {
    let mut required = dedup_ordered(
        keywords
            .iter()
            .cloned()
            .chain(tokenize(job_description)),
    );
    required.truncate(MAX_REQUIRED_KEYWORDS);
    required
}

/// Single-word keywords must be resume tokens; multi-word phrases match as substrings.
pub fn keyword_coverage(required: &[String], resume_text: &str) -> KeywordPartition {
    let tokens: HashSet<String> = token_set(resume_text);
    let lower = resume_text.to_lowercase();
    let (matched, missing) = required.iter().cloned().partition(|k| {
        if k.contains(char::is_whitespace) {
            lower.contains(k.as_str())
        } else {
            tokens.contains(k)
        }
    });
    KeywordPartition { matched, missing }
}

pub fn base_score(
    coverage: f64,
    flags: &SectionFlags,
    formatting: &FormattingSignals,
    weights: &AtsWeights,
) -> u32 {
    let bonus = |present: bool, points: f64| if present { points } else { 0.0 };
    let raw = coverage * weights.coverage
        + bonus(flags.skills, weights.skills)
        + bonus(flags.experience, weights.experience)
        + bonus(flags.education, weights.education)
        + bonus(flags.contact, weights.contact)
        + (formatting.bullets as f64 * weights.per_bullet).min(weights.bullet_cap);
    clamp_percent(raw)
}

pub fn final_score(score: u32, jd_fit: u32, weights: &AtsWeights) -> u32 {
    clamp_percent(
        weights.ats_share * score as f64 + (1.0 - weights.ats_share) * jd_fit as f64,
    )
}

/// Deterministic improvement hints, in a fixed order.
pub fn build_feedback(
    flags: &SectionFlags,
    formatting: &FormattingSignals,
    missing: &[String],
) -> Vec<String> {
    let mut feedback = Vec::new();

    if !flags.skills {
        feedback.push("Add a clear Skills section with role-relevant keywords.".to_string());
    }
    if !flags.experience {
        feedback
            .push("Highlight experience with measurable impact and recent projects.".to_string());
    }
    if !flags.education {
        feedback.push("Include Education details (degree, institution, year).".to_string());
    }
    if !flags.contact {
        feedback.push("Add contact details (email and phone number) near the top.".to_string());
    }
    if formatting.bullets < 5 {
        feedback.push("Use bullet points to improve scannability.".to_string());
    }
    if formatting.headings < 2 {
        feedback
            .push("Add clear section headings (e.g., SKILLS, EXPERIENCE, EDUCATION).".to_string());
    }
    if formatting.pages_approx > 2 {
        feedback.push("Keep resume concise (1–2 pages is recommended).".to_string());
    }
    if !missing.is_empty() {
        let named: Vec<&str> = missing
            .iter()
            .take(FEEDBACK_KEYWORDS)
            .map(String::as_str)
            .collect();
        feedback.push(format!("Optimize keywords: {}", named.join(", ")));
    }

    feedback
}

/// Full analysis of one resume. Fails only on intake checks; provider trouble is absorbed.
pub async fn analyze_resume(
    request: &AnalyzeRequest,
    semantic: &SemanticFitAdapter,
    weights: &AtsWeights,
) -> Result<AtsReport, AppError> {
    check_format(&request.source)?;
    check_readable(&request.resume_text)?;

    let document = parse_document(&request.resume_text);
    let required = required_keywords(&request.keywords.terms(), &request.job_description);
    let partition = keyword_coverage(&required, &request.resume_text);
    let coverage = partition.coverage();

    let score = base_score(coverage, &document.flags, &document.formatting, weights);
    let feedback = build_feedback(&document.flags, &document.formatting, &partition.missing);

    let lexical_fit = clamp_percent(coverage * 100.0);
    let jd_fit = semantic
        .jd_fit(&request.job_description, &request.resume_text, lexical_fit)
        .await;
    let final_score = final_score(score, jd_fit.score, weights);

    info!(
        "ATS analysis: score={score} jd_fit={} ({:?}) final={final_score} keywords={}/{}",
        jd_fit.score,
        jd_fit.source,
        partition.matched.len(),
        required.len()
    );

    Ok(AtsReport {
        score,
        jd_fit: jd_fit.score,
        jd_fit_source: jd_fit.source,
        jd_fit_provider: jd_fit.provider,
        final_score,
        detected_skills: partition
            .matched
            .iter()
            .take(DETECTED_SKILLS)
            .cloned()
            .collect(),
        matched_keywords: partition
            .matched
            .iter()
            .take(MATCHED_DISPLAY)
            .cloned()
            .collect(),
        missing_keywords: partition
            .missing
            .iter()
            .take(MISSING_DISPLAY)
            .cloned()
            .collect(),
        total_keywords: required.len(),
        sections: document.flags,
        formatting: document.formatting,
        feedback,
        parsed_sections: document.sections,
        contact: document.contact,
    })
}
