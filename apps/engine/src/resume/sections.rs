//! Heuristic resume structure extraction.
//!
//! Every extractor here is independent and best-effort: malformed input degrades to empty
//! results, never to an error. Two kinds of section detection coexist on purpose:
//! `detect_sections` is a lenient keyword check used for scoring, `extract_segments` only
//! fires on real header lines. They may disagree (flag set, segment empty).

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

const NAME_SCAN_LINES: usize = 6;
const NAME_MAX_CHARS: usize = 80;
const SEGMENT_MAX_CHARS: usize = 2000;
/// Segments shorter than this are treated as a stray header and the next synonym is tried.
const SEGMENT_MIN_CHARS: usize = 10;
const MAX_CONTACTS: usize = 5;
const MIN_PHONE_DIGITS: usize = 7;
const CHARS_PER_PAGE: usize = 2500;

const SKILL_HEADERS: &[&str] = &["skills", "technical skills", "technologies", "tools"];
const EXPERIENCE_HEADERS: &[&str] = &[
    "experience",
    "work experience",
    "professional experience",
    "employment history",
];
const EDUCATION_HEADERS: &[&str] = &["education", "academics", "qualifications"];
/// Other common headers; they end a segment but are never captured themselves.
const BOUNDARY_HEADERS: &[&str] = &[
    "summary",
    "profile",
    "objective",
    "projects",
    "certifications",
    "awards",
    "languages",
    "interests",
    "contact",
    "references",
];

const BULLET_GLYPHS: &[char] = &['•', '●', '▪', '◦', '‣', '■'];

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid email regex")
});
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+?\(?\d[\d \t().-]{5,}\d").expect("valid phone regex"));
static YEAR_RANGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}\s*[-–]\s*\d{4}$").expect("valid year range regex"));
static LONG_DIGIT_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+?\d{7,}").expect("valid digit run regex"));
static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Z ]{2,}$").expect("valid heading regex"));

static SKILLS_FLAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)skills|technolog|tool").expect("valid skills regex"));
static EXPERIENCE_FLAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)experience|worked|project|employment").expect("valid experience regex")
});
static EDUCATION_FLAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)education|degree|university|college").expect("valid education regex")
});
static CONTACT_FLAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@|\+?\d{7,}").expect("valid contact regex"));

/// Header-line matchers for every known label, compiled once.
static HEADER_MATCHERS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    SKILL_HEADERS
        .iter()
        .chain(EXPERIENCE_HEADERS)
        .chain(EDUCATION_HEADERS)
        .chain(BOUNDARY_HEADERS)
        .filter_map(|label| header_regex(label).map(|re| (*label, re)))
        .collect()
});

/// A label on its own line, optionally followed by a colon.
fn header_regex(label: &str) -> Option<Regex> {
    Regex::new(&format!(
        r"(?im)^[ \t]*{}[ \t]*(?::|$)",
        regex::escape(label)
    ))
    .ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Skills,
    Experience,
    Education,
}

impl SectionKind {
    fn headers(self) -> &'static [&'static str] {
        match self {
            SectionKind::Skills => SKILL_HEADERS,
            SectionKind::Experience => EXPERIENCE_HEADERS,
            SectionKind::Education => EDUCATION_HEADERS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedSections {
    pub name: String,
    pub skills: String,
    pub experience: String,
    pub education: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionFlags {
    pub skills: bool,
    pub experience: bool,
    pub education: bool,
    pub contact: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub name: String,
    pub emails: Vec<String>,
    pub phones: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FormattingSignals {
    pub bullets: usize,
    pub headings: usize,
    pub pages_approx: usize,
}

/// Everything the extractors could recover from one resume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeDocument {
    pub sections: ParsedSections,
    pub flags: SectionFlags,
    pub contact: ContactInfo,
    pub formatting: FormattingSignals,
}

/// Runs every extractor over `text`.
pub fn parse_document(text: &str) -> ResumeDocument {
    let normalized = normalize_newlines(text);
    let name = guess_name(&normalized);

    let sections = ParsedSections {
        name: name.clone(),
        skills: extract_segment(&normalized, SectionKind::Skills),
        experience: extract_segment(&normalized, SectionKind::Experience),
        education: extract_segment(&normalized, SectionKind::Education),
    };

    ResumeDocument {
        sections,
        flags: detect_sections(&normalized),
        contact: ContactInfo {
            name,
            emails: extract_emails(&normalized),
            phones: extract_phones(&normalized),
        },
        formatting: formatting_signals(&normalized),
    }
}

fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Longest of the first few non-empty lines that does not look like an email or phone.
pub fn guess_name(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(NAME_SCAN_LINES)
        .filter(|l| !l.contains('@') && !LONG_DIGIT_RUN_RE.is_match(l))
        .fold("", |best, line| {
            if line.chars().count() > best.chars().count() {
                line
            } else {
                best
            }
        })
        .chars()
        .take(NAME_MAX_CHARS)
        .collect()
}

/// Text under the first recognized header for `kind`, up to the next header or the cap.
pub fn extract_segment(text: &str, kind: SectionKind) -> String {
    for label in kind.headers() {
        let Some(re) = header_regex(label) else {
            continue;
        };
        let Some(header) = re.find(text) else {
            continue;
        };

        let rest = &text[header.end()..];
        let end = next_header_offset(rest).unwrap_or(rest.len());
        let segment: String = rest[..end].trim().chars().take(SEGMENT_MAX_CHARS).collect();

        if segment.chars().count() > SEGMENT_MIN_CHARS {
            return segment;
        }
    }
    String::new()
}

fn next_header_offset(rest: &str) -> Option<usize> {
    HEADER_MATCHERS
        .iter()
        .filter_map(|(_, re)| re.find(rest).map(|m| m.start()))
        .min()
}

/// Lenient presence checks; independent of `extract_segment`.
pub fn detect_sections(text: &str) -> SectionFlags {
    SectionFlags {
        skills: SKILLS_FLAG_RE.is_match(text),
        experience: EXPERIENCE_FLAG_RE.is_match(text),
        education: EDUCATION_FLAG_RE.is_match(text),
        contact: CONTACT_FLAG_RE.is_match(text),
    }
}

fn distinct_limited<'a, I>(items: I) -> Vec<String>
where
    I: Iterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    items
        .filter(|s| seen.insert(s.to_string()))
        .take(MAX_CONTACTS)
        .map(str::to_string)
        .collect()
}

pub fn extract_emails(text: &str) -> Vec<String> {
    distinct_limited(EMAIL_RE.find_iter(text).map(|m| m.as_str()))
}

pub fn extract_phones(text: &str) -> Vec<String> {
    distinct_limited(
        PHONE_RE
            .find_iter(text)
            .map(|m| m.as_str().trim())
            .filter(|s| s.chars().filter(char::is_ascii_digit).count() >= MIN_PHONE_DIGITS)
            .filter(|s| !YEAR_RANGE_RE.is_match(s)),
    )
}

/// Bullet glyphs anywhere, plus `-`, `*` or `–` used as a list marker at line start.
pub fn count_bullets(text: &str) -> usize {
    let glyphs = text.chars().filter(|c| BULLET_GLYPHS.contains(c)).count();
    let dashes = text
        .lines()
        .map(str::trim_start)
        .filter(|l| ["- ", "* ", "– "].iter().any(|m| l.starts_with(m)))
        .count();
    glyphs + dashes
}

/// All-caps lines after the first non-empty line (which is usually the candidate's name).
pub fn count_headings(text: &str) -> usize {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .skip(1)
        .filter(|l| HEADING_RE.is_match(l))
        .count()
}

pub fn estimate_pages(text: &str) -> usize {
    text.chars().count().div_ceil(CHARS_PER_PAGE)
}

pub fn formatting_signals(text: &str) -> FormattingSignals {
    FormattingSignals {
        bullets: count_bullets(text),
        headings: count_headings(text),
        pages_approx: estimate_pages(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESUME: &str = "Jane Q. Developer\n\
        jane.dev@example.com | +1 (555) 123-4567\n\
        Senior Backend Engineer\n\
        \n\
        SKILLS\n\
        Rust, Go, PostgreSQL, Kubernetes, gRPC\n\
        \n\
        EXPERIENCE\n\
        • Acme Corp 2019 - 2023: built the billing pipeline in Rust\n\
        • Initech: migrated services to Kubernetes\n\
        \n\
        EDUCATION\n\
        B.Sc. Computer Science, State University\n";

    #[test]
    fn test_guess_name_skips_contact_lines() {
        let text = "Jane Developer\njane@example.com\n5551234567\nCV";
        assert_eq!(guess_name(text), "Jane Developer");
    }

    #[test]
    fn test_guess_name_truncates_and_handles_empty() {
        assert_eq!(guess_name(""), "");
        let long = "x".repeat(200);
        assert_eq!(guess_name(&long).chars().count(), 80);
    }

    #[test]
    fn test_guess_name_prefers_first_of_equal_length() {
        assert_eq!(guess_name("abcd\nwxyz"), "abcd");
    }

    #[test]
    fn test_segments_stop_at_next_header() {
        let skills = extract_segment(RESUME, SectionKind::Skills);
        assert_eq!(skills, "Rust, Go, PostgreSQL, Kubernetes, gRPC");

        let experience = extract_segment(RESUME, SectionKind::Experience);
        assert!(experience.starts_with("• Acme Corp"));
        assert!(experience.ends_with("Kubernetes"));
        assert!(!experience.contains("EDUCATION"));

        let education = extract_segment(RESUME, SectionKind::Education);
        assert_eq!(education, "B.Sc. Computer Science, State University");
    }

    #[test]
    fn test_segment_header_with_colon_keeps_same_line_text() {
        let text = "Name\nTechnical Skills: Python, Django, Celery, Redis\nProjects\nthing";
        assert_eq!(
            extract_segment(text, SectionKind::Skills),
            "Python, Django, Celery, Redis"
        );
    }

    #[test]
    fn test_segment_requires_header_line() {
        // "experience" appears in prose only; the lenient flag fires, the segment does not.
        let text = "I have experience with Rust and a degree from college.";
        assert_eq!(extract_segment(text, SectionKind::Experience), "");
        assert!(detect_sections(text).experience);
        assert!(detect_sections(text).education);
    }

    #[test]
    fn test_segment_capped() {
        let text = format!("Skills\n{}", "rust ".repeat(1000));
        assert_eq!(
            extract_segment(&text, SectionKind::Skills).chars().count(),
            2000
        );
    }

    #[test]
    fn test_detect_sections_contact() {
        assert!(detect_sections("call +15551234567").contact);
        assert!(detect_sections("me@x.io").contact);
        assert!(!detect_sections("no way to reach me").contact);
    }

    #[test]
    fn test_extract_emails_distinct_and_limited() {
        let text = (0..8)
            .map(|i| format!("user{i}@example.com user0@example.com"))
            .collect::<Vec<_>>()
            .join(" ");
        let emails = extract_emails(&text);
        assert_eq!(emails.len(), 5);
        assert_eq!(emails[0], "user0@example.com");
        assert_eq!(emails[1], "user1@example.com");
    }

    #[test]
    fn test_extract_phones() {
        let phones = extract_phones(RESUME);
        assert_eq!(phones, vec!["+1 (555) 123-4567"]);
        assert!(extract_phones("ext 12-34").is_empty());
    }

    #[test]
    fn test_count_bullets_and_headings() {
        assert_eq!(count_bullets(RESUME), 2);
        assert_eq!(count_bullets("- one\n* two\nnot-a-bullet"), 2);
        assert_eq!(count_headings(RESUME), 3);
        assert_eq!(count_headings("JOHN DOE\nsummary"), 0);
    }

    #[test]
    fn test_estimate_pages() {
        assert_eq!(estimate_pages(""), 0);
        assert_eq!(estimate_pages(&"a".repeat(2500)), 1);
        assert_eq!(estimate_pages(&"a".repeat(2501)), 2);
    }

    #[test]
    fn test_parse_document_never_fails_on_garbage() {
        let doc = parse_document("\u{0}\u{1}::::\r\n\r\n@@@");
        assert_eq!(doc.sections.skills, "");
        assert_eq!(doc.formatting.headings, 0);
    }
}
