//! Intake checks on text handed over by the document converter.

use serde::Deserialize;

use crate::errors::AppError;

const MIN_TEXT_CHARS: usize = 20;
const MIN_ALPHABETIC_CHARS: usize = 10;

const ACCEPTED_EXTENSIONS: &[&str] = &[".pdf", ".docx", ".txt"];
const ACCEPTED_CONTENT_TYPES: &[&str] = &["pdf", "wordprocessingml", "text/plain"];

/// What the upstream converter reports about the original file, if anything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentSource {
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
}

/// Rejects file types the converter cannot turn into text. No metadata means plain text.
pub fn check_format(source: &DocumentSource) -> Result<(), AppError> {
    if source.file_name.is_none() && source.content_type.is_none() {
        return Ok(());
    }

    let by_name = source.file_name.as_deref().is_some_and(|name| {
        let name = name.to_lowercase();
        ACCEPTED_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
    });
    let by_type = source.content_type.as_deref().is_some_and(|ct| {
        let ct = ct.to_lowercase();
        ACCEPTED_CONTENT_TYPES.iter().any(|t| ct.contains(t))
    });

    if by_name || by_type {
        Ok(())
    } else {
        Err(AppError::UnsupportedFormat(
            "Unsupported file type. Please upload a PDF or DOCX file.".to_string(),
        ))
    }
}

/// Rejects text that is empty or mostly non-alphabetic (typically a scanned PDF).
pub fn check_readable(text: &str) -> Result<(), AppError> {
    let trimmed = text.trim();
    let letters = trimmed.chars().filter(|c| c.is_alphabetic()).count();

    if trimmed.chars().count() < MIN_TEXT_CHARS || letters < MIN_ALPHABETIC_CHARS {
        return Err(AppError::ExtractionFailure(
            "Unable to extract readable text from this document. Scanned PDFs are not supported; \
            please upload a text-based resume."
                .to_string(),
        ));
    }
    Ok(())
}
