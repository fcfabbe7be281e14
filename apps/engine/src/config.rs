use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::attendance::anomaly::AttendancePolicy;
use crate::conversation::prompts::DEFAULT_RECRUITER_PROMPT;
use crate::llm_client::{gemini, openai};
use crate::resume::ats::AtsWeights;
use crate::screening::composite::CompositeWeights;
use crate::screening::ranking::RankingPolicy;

/// Application configuration loaded from environment variables.
/// Nothing is required: absent credentials disable the matching provider, an absent
/// `DATABASE_URL` selects the in-memory session store.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub database_url: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_embed_model: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_embed_model: String,
    pub recruiter_system_prompt: String,
    pub provider_timeout: Duration,
    pub composite_weights: CompositeWeights,
    pub ranking_policy: RankingPolicy,
    pub ats_weights: AtsWeights,
    pub attendance_policy: AttendancePolicy,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let composite_defaults = CompositeWeights::default();
        let attendance_defaults = AttendancePolicy::default();

        Ok(Config {
            port: env_or("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            database_url: optional_env("DATABASE_URL"),
            openai_api_key: optional_env("OPENAI_API_KEY"),
            openai_model: env_or("OPENAI_MODEL", openai::DEFAULT_CHAT_MODEL.to_string())?,
            openai_embed_model: env_or(
                "OPENAI_EMBED_MODEL",
                openai::DEFAULT_EMBED_MODEL.to_string(),
            )?,
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            gemini_model: env_or("GEMINI_MODEL", gemini::DEFAULT_CHAT_MODEL.to_string())?,
            gemini_embed_model: env_or(
                "GEMINI_EMBED_MODEL",
                gemini::DEFAULT_EMBED_MODEL.to_string(),
            )?,
            recruiter_system_prompt: env_or(
                "RECRUITER_SYSTEM_PROMPT",
                DEFAULT_RECRUITER_PROMPT.to_string(),
            )?,
            provider_timeout: Duration::from_secs(env_or("PROVIDER_TIMEOUT_SECS", 15u64)?),
            composite_weights: CompositeWeights {
                skills: env_or("COMPOSITE_SKILLS_WEIGHT", composite_defaults.skills)?,
                jd: env_or("COMPOSITE_JD_WEIGHT", composite_defaults.jd)?,
            },
            ranking_policy: ranking_policy_from_env()?,
            ats_weights: ats_weights_from_env()?,
            attendance_policy: AttendancePolicy {
                late_hour: env_or("LATE_HOUR_THRESHOLD", attendance_defaults.late_hour)?,
                late_weight: env_or("RISK_LATE_WEIGHT", attendance_defaults.late_weight)?,
                absent_weight: env_or("RISK_ABSENT_WEIGHT", attendance_defaults.absent_weight)?,
            },
        })
    }
}

fn ranking_policy_from_env() -> Result<RankingPolicy> {
    let defaults = RankingPolicy::default();
    Ok(RankingPolicy {
        keyword_cap: env_or("RANK_KEYWORD_CAP", defaults.keyword_cap)?,
        coverage_weight: env_or("RANK_COVERAGE_WEIGHT", defaults.coverage_weight)?,
        skill_boost: env_or("RANK_SKILL_BOOST", defaults.skill_boost)?,
        display_limit: env_or("RANK_DISPLAY_LIMIT", defaults.display_limit)?,
    })
}

fn ats_weights_from_env() -> Result<AtsWeights> {
    let defaults = AtsWeights::default();
    Ok(AtsWeights {
        coverage: env_or("ATS_COVERAGE_WEIGHT", defaults.coverage)?,
        skills: env_or("ATS_SKILLS_BONUS", defaults.skills)?,
        experience: env_or("ATS_EXPERIENCE_BONUS", defaults.experience)?,
        education: env_or("ATS_EDUCATION_BONUS", defaults.education)?,
        contact: env_or("ATS_CONTACT_BONUS", defaults.contact)?,
        per_bullet: env_or("ATS_PER_BULLET", defaults.per_bullet)?,
        bullet_cap: env_or("ATS_BULLET_CAP", defaults.bullet_cap)?,
        ats_share: env_or("ATS_SHARE", defaults.ats_share)?,
    })
}

/// Set and non-blank, or `None`.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Keys are unique to each test so parallel tests do not race on the environment.

    #[test]
    fn test_env_or_default_when_unset() {
        assert_eq!(env_or("ENGINE_TEST_UNSET_KEY", 42u32).unwrap(), 42);
    }

    #[test]
    fn test_env_or_parses_value() {
        std::env::set_var("ENGINE_TEST_PARSE_KEY", " 0.75 ");
        assert_eq!(env_or("ENGINE_TEST_PARSE_KEY", 0.6f64).unwrap(), 0.75);
    }

    #[test]
    fn test_env_or_rejects_malformed_value() {
        std::env::set_var("ENGINE_TEST_BAD_KEY", "ten");
        let err = env_or("ENGINE_TEST_BAD_KEY", 10u32).unwrap_err();
        assert!(err.to_string().contains("ENGINE_TEST_BAD_KEY"));
    }

    #[test]
    fn test_blank_optional_is_none() {
        std::env::set_var("ENGINE_TEST_BLANK_KEY", "   ");
        assert_eq!(optional_env("ENGINE_TEST_BLANK_KEY"), None);
    }

    #[test]
    fn test_ranking_policy_reads_overrides() {
        std::env::set_var("RANK_SKILL_BOOST", "25");
        std::env::set_var("RANK_DISPLAY_LIMIT", "5");
        let policy = ranking_policy_from_env().unwrap();
        assert_eq!(policy.skill_boost, 25.0);
        assert_eq!(policy.display_limit, 5);
        assert_eq!(policy.keyword_cap, RankingPolicy::default().keyword_cap);
        assert_eq!(policy.coverage_weight, 80.0);
    }

    #[test]
    fn test_ats_weights_read_overrides() {
        std::env::set_var("ATS_SHARE", "0.7");
        std::env::set_var("ATS_BULLET_CAP", "4");
        let weights = ats_weights_from_env().unwrap();
        assert_eq!(weights.ats_share, 0.7);
        assert_eq!(weights.bullet_cap, 4.0);
        assert_eq!(weights.coverage, 60.0);
        assert_eq!(weights.contact, AtsWeights::default().contact);
    }
}
