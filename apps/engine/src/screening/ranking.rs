//! Candidate ranking against a single job description.
//!
//! Algorithm:
//! 1. JD → tokens → deduplicated keywords (stop words removed, first-seen order, capped)
//! 2. Per candidate: haystack = declared skills ∪ resume tokens
//! 3. matched / missing partition of the keyword list
//! 4. score = min(100, round(coverage × coverage_weight + skill_boost))
//! 5. Stable sort by score, descending; ties keep submission order

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::text::tokenizer::{dedup_ordered, normalize_terms, tokenize};

/// Words that never count as JD keywords.
const STOP_WORDS: &[&str] = &[
    "the",
    "and",
    "for",
    "with",
    "from",
    "into",
    "have",
    "has",
    "are",
    "our",
    "you",
    "your",
    "years",
    "experience",
    "responsibilities",
    "requirements",
    "work",
    "team",
    "using",
    "in",
    "on",
    "to",
    "of",
    "a",
    "an",
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankingPolicy {
    /// Maximum number of JD keywords considered.
    pub keyword_cap: usize,
    /// Points awarded for full keyword coverage.
    pub coverage_weight: f64,
    /// Flat bonus when any declared skill is itself a JD keyword.
    pub skill_boost: f64,
    /// Max matched / missing entries echoed back per candidate.
    pub display_limit: usize,
}

impl Default for RankingPolicy {
    fn default() -> Self {
        Self {
            keyword_cap: 100,
            coverage_weight: 80.0,
            skill_boost: 20.0,
            display_limit: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default, alias = "resume")]
    pub resume_text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RankRequest {
    #[serde(default, alias = "jd")]
    pub job_description: String,
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

/// Identity fields only; resume text never leaves the ranker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateIdentity {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedCandidate {
    /// Position in the submitted list.
    pub index: usize,
    pub candidate: CandidateIdentity,
    pub score: u32,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub justification: String,
}

/// Complete split of a keyword list into present and absent terms.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordPartition {
    pub matched: Vec<String>,
    pub missing: Vec<String>,
}

impl KeywordPartition {
    /// matched / max(1, total)
    pub fn coverage(&self) -> f64 {
        let total = self.matched.len() + self.missing.len();
        self.matched.len() as f64 / total.max(1) as f64
    }
}

/// Extracts the ranking keyword list from a job description.
pub fn extract_keywords(job_description: &str, cap: usize) -> Vec<String> {
    let stop: HashSet<&str> = STOP_WORDS.iter().copied().collect();
    let mut keywords = dedup_ordered(
        tokenize(job_description)
            .into_iter()
            .filter(|t| !stop.contains(t.as_str())),
    );
    keywords.truncate(cap);
    keywords
}

/// Splits `keywords` by membership in `haystack`, preserving keyword order.
pub fn partition_keywords(keywords: &[String], haystack: &HashSet<String>) -> KeywordPartition {
    let (matched, missing) = keywords
        .iter()
        .cloned()
        .partition(|k| haystack.contains(k));
    KeywordPartition { matched, missing }
}

fn score_candidate(
    index: usize,
    candidate: &Candidate,
    keywords: &[String],
    policy: &RankingPolicy,
) -> RankedCandidate {
    let declared = normalize_terms(&candidate.skills);

    let mut haystack: HashSet<String> = declared.iter().cloned().collect();
    haystack.extend(tokenize(&candidate.resume_text));

    let partition = partition_keywords(keywords, &haystack);

    let keyword_set: HashSet<&str> = keywords.iter().map(String::as_str).collect();
    let skill_matches = dedup_ordered(
        declared
            .into_iter()
            .filter(|s| keyword_set.contains(s.as_str())),
    );

    let boost = if skill_matches.is_empty() {
        0.0
    } else {
        policy.skill_boost
    };
    let raw = partition.coverage() * policy.coverage_weight + boost;
    let score = raw.round().clamp(0.0, 100.0) as u32;

    let justification = format!(
        "Matched {}/{} JD keywords; skills matched: {}",
        partition.matched.len(),
        keywords.len(),
        if skill_matches.is_empty() {
            "none".to_string()
        } else {
            skill_matches
                .iter()
                .take(5)
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        }
    );

    let limit = policy.display_limit;
    RankedCandidate {
        index,
        candidate: CandidateIdentity {
            name: candidate.name.clone(),
            email: candidate.email.clone(),
            phone: candidate.phone.clone(),
        },
        score,
        matched_skills: partition.matched.into_iter().take(limit).collect(),
        missing_skills: partition.missing.into_iter().take(limit).collect(),
        justification,
    }
}

/// Ranks candidates against a job description. An empty list yields an empty ranking.
pub fn rank_candidates(request: &RankRequest, policy: &RankingPolicy) -> Vec<RankedCandidate> {
    let keywords = extract_keywords(&request.job_description, policy.keyword_cap);

    let mut ranked: Vec<RankedCandidate> = request
        .candidates
        .iter()
        .enumerate()
        .map(|(i, c)| score_candidate(i, c, &keywords, policy))
        .collect();

    // sort_by is stable: equal scores keep submission order.
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}
