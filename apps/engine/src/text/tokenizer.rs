//! Tokenizer: lowercases text and splits it into scoring tokens.
//!
//! A token is a maximal run of letters, digits, `+`, `#` or `.`; everything else is a
//! separator, so a sentence-final dot stays on its word ("mongodb."). Single-character tokens
//! carry no signal and are dropped, which keeps "c++", "c#", ".net" and "node.js" intact while
//! discarding stray initials.

use std::collections::HashSet;

/// Returns `true` for characters that may appear inside a token.
fn is_token_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '+' | '#' | '.')
}

/// Splits `text` into ordered lowercase tokens. Never fails; empty input yields an empty Vec.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !is_token_char(c))
        .filter(|t| t.chars().count() > 1)
        .map(str::to_string)
        .collect()
}

/// Tokens of `text` as a set, for membership checks.
pub fn token_set(text: &str) -> HashSet<String> {
    tokenize(text).into_iter().collect()
}

/// Deduplicates while keeping first-seen order.
pub fn dedup_ordered<I>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// Lowercases, trims and drops empty entries from a caller-supplied skill or keyword list.
pub fn normalize_terms<S: AsRef<str>>(terms: &[S]) -> Vec<String> {
    terms
        .iter()
        .map(|t| t.as_ref().trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_lowercases_and_splits() {
        assert_eq!(
            tokenize("Senior Rust/Go Engineer"),
            vec!["senior", "rust", "go", "engineer"]
        );
    }

    #[test]
    fn test_tokenize_keeps_symbol_skills() {
        assert_eq!(
            tokenize("C++, C#, Node.js and F# (x)"),
            vec!["c++", "c#", "node.js", "and", "f#"]
        );
    }

    #[test]
    fn test_tokenize_keeps_dots_as_token_chars() {
        assert_eq!(
            tokenize("Shipped on MongoDB. Also .NET and v2..."),
            vec!["shipped", "on", "mongodb.", "also", ".net", "and", "v2..."]
        );
        assert_eq!(tokenize("mongodb. v2..."), vec!["mongodb.", "v2..."]);
    }

    #[test]
    fn test_tokenize_drops_single_chars() {
        assert_eq!(tokenize("a b c de"), vec!["de"]);
    }

    #[test]
    fn test_tokenize_empty_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \n\t ,;").is_empty());
    }

    #[test]
    fn test_tokenize_is_deterministic() {
        let text = "React, Node, MongoDB; react again";
        assert_eq!(tokenize(text), tokenize(text));
    }

    #[test]
    fn test_dedup_ordered_keeps_first_seen() {
        let out = dedup_ordered(vec![
            "rust".to_string(),
            "go".to_string(),
            "rust".to_string(),
            "sql".to_string(),
        ]);
        assert_eq!(out, vec!["rust", "go", "sql"]);
    }

    #[test]
    fn test_normalize_terms() {
        let out = normalize_terms(&["  React ", "", "NODE", "   "]);
        assert_eq!(out, vec!["react", "node"]);
    }
}
