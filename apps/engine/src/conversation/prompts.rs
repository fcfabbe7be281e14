// Prompt constants for the recruiter assistant.

pub const DEFAULT_RECRUITER_PROMPT: &str = "You are NextGenHR Recruiter Assistant. \
    Be concise, helpful, and ask follow-up questions when screening candidates. \
    Focus on skills, experience, cultural fit, and availability.";

pub const CHAT_TEMPERATURE: f32 = 0.3;

/// Turns of prior context sent with each message.
pub const HISTORY_TURNS: usize = 10;
