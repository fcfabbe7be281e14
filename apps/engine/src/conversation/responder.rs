//! Deterministic recruiter replies used when no chat provider answers.
//! Intents are checked in order; the first match wins.

use std::sync::LazyLock;

use regex::Regex;

pub const CLARIFY_REPLY: &str =
    "I'm here to help with recruitment. Could you clarify your question?";

struct Intent {
    pattern: Regex,
    reply: &'static str,
}

static INTENTS: LazyLock<Vec<Intent>> = LazyLock::new(|| {
    [
        (
            r"\b(?:hello|hi|hey)\b",
            "Hello! How can I help you with the hiring process?",
        ),
        (
            r"\b(?:status|application)",
            "Your application is under review. We will update you within 3-5 business days.",
        ),
        (
            r"\b(?:interview|schedul)",
            "Interviews are typically scheduled within a week after screening. \
            Do you have any preferred time slots?",
        ),
        (
            r"\b(?:salar|ctc\b|compensation)",
            "Compensation is aligned with market standards and experience. \
            What range are you targeting?",
        ),
        (
            r"\b(?:experience|years|exp\b)",
            "Please share your total years of experience and key technologies you have worked on.",
        ),
        (
            r"\b(?:next steps?|process)",
            "Next steps: resume screening → interview(s) → offer. \
            Would you like to proceed to the screening?",
        ),
    ]
    .into_iter()
    .map(|(pattern, reply)| Intent {
        pattern: Regex::new(pattern).expect("valid intent regex"),
        reply,
    })
    .collect()
});

/// Reply for `message`, matched case-insensitively against the intent list.
pub fn local_reply(message: &str) -> &'static str {
    let message = message.trim().to_lowercase();
    INTENTS
        .iter()
        .find(|intent| intent.pattern.is_match(&message))
        .map_or(CLARIFY_REPLY, |intent| intent.reply)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_intent() {
        assert!(local_reply("Hey there").starts_with("Hello!"));
        assert!(local_reply("Any update on my application?").contains("under review"));
        assert!(local_reply("When can we schedule the interview").starts_with("Interviews"));
        assert!(local_reply("What is the CTC?").starts_with("Compensation"));
        assert!(local_reply("I have 5 years in Rust").contains("years of experience"));
        assert!(local_reply("what are the next steps").starts_with("Next steps"));
    }

    #[test]
    fn test_first_match_wins() {
        // Greeting precedes status.
        assert!(local_reply("hi, what is my application status").starts_with("Hello!"));
        // Status precedes interview.
        assert!(local_reply("status of my interview").contains("under review"));
    }

    #[test]
    fn test_word_boundaries() {
        // "hi" inside "this" and "exp" inside "expect" do not trigger intents.
        assert_eq!(local_reply("this is unexpected"), CLARIFY_REPLY);
        assert_eq!(local_reply("what should I expect"), CLARIFY_REPLY);
    }

    #[test]
    fn test_unmatched_and_blank() {
        assert_eq!(local_reply("tell me a joke"), CLARIFY_REPLY);
        assert_eq!(local_reply(""), CLARIFY_REPLY);
    }
}
