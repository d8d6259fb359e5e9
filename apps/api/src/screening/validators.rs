//! Field validators and input parsing for the collection stages.

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.-]+@([\w-]+\.)+[A-Za-z]{2,}$").expect("valid email regex"));

static PHONE_SEPARATORS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s\-().]").expect("valid phone separator regex"));

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?\d{10,15}$").expect("valid phone regex"));

static TECH_SEPARATORS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[,;]|\sand\s").expect("valid tech separator regex"));

/// Inputs that end the conversation at any stage.
pub const END_CONVERSATION_KEYWORDS: &[&str] = &["exit", "quit", "bye", "goodbye", "end", "stop"];

static ENDING_RE: Lazy<Regex> = Lazy::new(|| {
    let alternatives = END_CONVERSATION_KEYWORDS
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b(?:{alternatives})\b")).expect("escaped keywords form a valid regex")
});

/// Format check only; no DNS or mailbox verification.
pub fn validate_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

/// Strips spaces, dashes, parentheses and dots, then expects an optional `+`
/// followed by 10 to 15 digits.
pub fn validate_phone(phone: &str) -> bool {
    let cleaned = PHONE_SEPARATORS_RE.replace_all(phone, "");
    PHONE_RE.is_match(&cleaned)
}

/// Splits a free-text tech stack on commas, semicolons and the word "and".
/// Order is preserved and duplicates are kept.
pub fn parse_tech_stack(input: &str) -> Vec<String> {
    TECH_SEPARATORS_RE
        .split(input)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// True when the input contains an ending keyword as a whole word.
pub fn is_conversation_ending(input: &str) -> bool {
    ENDING_RE.is_match(&input.to_lowercase())
}
