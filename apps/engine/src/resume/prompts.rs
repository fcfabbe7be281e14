// Prompt constants for resume improvement.

/// System prompt for the ATS rewrite. The reply must carry the two headers the parser
/// splits on.
pub const IMPROVE_SYSTEM: &str = "You are an ATS resume optimizer. \
    Given the current resume text, an optional target job description and keywords, provide:\n\
    1) A prioritized, concise list of improvement suggestions to increase the ATS score.\n\
    2) An improved resume draft (plain text), preserving truthfulness and structure.\n\n\
    Return two sections with these exact headers: SUGGESTIONS and IMPROVED_RESUME.";

/// User message carrying the job description, keywords and resume.
pub fn improve_prompt(jd: &str, keywords: &[String], resume: &str) -> String {
    format!(
        "JOB DESCRIPTION:\n{jd}\n\nKEYWORDS: {}\n\nRESUME:\n{resume}",
        keywords.join(", ")
    )
}

/// Returned when no provider produced a usable rewrite.
pub const FALLBACK_SUGGESTIONS: &[&str] = &[
    "Add missing keywords from the job description into Skills and Experience.",
    "Use bullet points to improve scannability.",
    "Add clear section headings: SKILLS, EXPERIENCE, EDUCATION, CONTACT.",
    "Quantify achievements (numbers, percentages, impact).",
];
