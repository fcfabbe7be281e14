//! Skill-gap analysis: which role skills an employee does not hold yet, and which
//! catalog courses cover them.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::text::tokenizer::{dedup_ordered, normalize_terms};

const COURSES_PER_GAP: usize = 3;

#[derive(Debug, Clone, Deserialize)]
pub struct EmployeeSkill {
    pub name: String,
    // Accepted for forward compatibility; proficiency does not affect gap detection yet.
    #[allow(dead_code)]
    #[serde(default)]
    pub level: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogCourse {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SkillGapRequest {
    #[serde(default)]
    pub employee_skills: Vec<EmployeeSkill>,
    #[serde(default)]
    pub role_skills: Vec<String>,
    #[serde(default)]
    pub catalog: Vec<CatalogCourse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapSuggestion {
    pub skill: String,
    pub courses: Vec<CatalogCourse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillGapReport {
    pub gaps: Vec<String>,
    pub suggestions: Vec<GapSuggestion>,
}

pub fn analyze_skill_gap(request: &SkillGapRequest) -> SkillGapReport {
    let held: HashSet<String> = request
        .employee_skills
        .iter()
        .map(|s| s.name.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();

    let gaps: Vec<String> = dedup_ordered(normalize_terms(&request.role_skills))
        .into_iter()
        .filter(|s| !held.contains(s))
        .collect();

    let suggestions = gaps
        .iter()
        .map(|gap| GapSuggestion {
            skill: gap.clone(),
            courses: request
                .catalog
                .iter()
                .filter(|c| c.name.to_lowercase().contains(gap.as_str()))
                .take(COURSES_PER_GAP)
                .cloned()
                .collect(),
        })
        .collect();

    SkillGapReport { gaps, suggestions }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(name: &str) -> CatalogCourse {
        CatalogCourse {
            name: name.to_string(),
            url: None,
        }
    }

    fn skill(name: &str) -> EmployeeSkill {
        EmployeeSkill {
            name: name.to_string(),
            level: Some(3),
        }
    }

    #[test]
    fn test_gaps_exclude_held_skills_case_insensitive() {
        let report = analyze_skill_gap(&SkillGapRequest {
            employee_skills: vec![skill("React"), skill(" Node ")],
            role_skills: vec!["react".into(), "node".into(), "GraphQL".into()],
            catalog: vec![],
        });
        assert_eq!(report.gaps, vec!["graphql"]);
        assert_eq!(report.suggestions.len(), 1);
        assert!(report.suggestions[0].courses.is_empty());
    }

    #[test]
    fn test_suggestions_limited_to_three_courses() {
        let report = analyze_skill_gap(&SkillGapRequest {
            employee_skills: vec![],
            role_skills: vec!["kubernetes".into()],
            catalog: vec![
                course("Kubernetes Basics"),
                course("Intro to Go"),
                course("Advanced Kubernetes"),
                course("Kubernetes Security"),
                course("Kubernetes Networking"),
            ],
        });
        let courses = &report.suggestions[0].courses;
        assert_eq!(courses.len(), 3);
        assert_eq!(courses[0].name, "Kubernetes Basics");
        assert_eq!(courses[1].name, "Advanced Kubernetes");
    }

    #[test]
    fn test_duplicate_and_blank_role_skills_ignored() {
        let report = analyze_skill_gap(&SkillGapRequest {
            employee_skills: vec![],
            role_skills: vec!["Rust".into(), "rust".into(), "  ".into()],
            catalog: vec![],
        });
        assert_eq!(report.gaps, vec!["rust"]);
    }
}
