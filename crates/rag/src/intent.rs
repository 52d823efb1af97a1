//! Request intent classification
//!
//! Decides, before any matrix lookup, whether a question is small talk, a
//! question about the assistant itself, or a real work scenario. Also
//! detects ticket-focused questions so the ranker can prefer rows from
//! ticket tabs.

use compliance_assist_core::CategoryPreference;

use crate::text::normalize;

/// Detected request intent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryIntent {
    /// Greeting or pleasantry; answered without the matrix
    SmallTalk,
    /// "What can you do?"; answered with the usage guide
    Capability,
    /// A work scenario to match against the matrix
    Procedure,
}

impl QueryIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SmallTalk => "smalltalk",
            Self::Capability => "capability",
            Self::Procedure => "procedure",
        }
    }
}

const SMALL_TALK: &[&str] = &[
    "hi",
    "hello",
    "hey",
    "yo",
    "good morning",
    "good afternoon",
    "good evening",
    "how are you",
    "how r u",
    "whats up",
    "what s up",
    "who are you",
    "what are you",
    "are you real",
    "are you a bot",
    "thanks",
    "thank you",
];

const GREETING_PREFIXES: &[&str] = &["hi", "hey", "hello"];

/// Short greetings ("hey there", "hello!!") up to this many characters
const SHORT_GREETING_CHARS: usize = 12;

const CAPABILITY_PHRASES: &[&str] = &[
    "what can you do",
    "can you help",
    "help me",
    "what do you do",
    "how do i use this",
    "how does this work",
    "can you answer anything",
    "what can you answer",
    "what questions can i ask",
];

const TICKET_TERMS: &[&str] = &["ticket", "tickets", "case", "cases", "jira", "zendesk"];

/// Classify a raw question
pub fn classify(question: &str) -> QueryIntent {
    let text = normalize(question);

    if is_small_talk(&text) {
        QueryIntent::SmallTalk
    } else if CAPABILITY_PHRASES.iter().any(|p| text.contains(p)) {
        QueryIntent::Capability
    } else {
        QueryIntent::Procedure
    }
}

fn is_small_talk(text: &str) -> bool {
    if text.is_empty() || SMALL_TALK.contains(&text) {
        return true;
    }

    text.chars().count() <= SHORT_GREETING_CHARS
        && GREETING_PREFIXES.iter().any(|p| text.starts_with(p))
}

/// Category preference implied by the question, if any
///
/// Questions mentioning tickets, cases, Jira or Zendesk prefer rows from
/// ticket tabs.
pub fn category_preference(question: &str) -> Option<CategoryPreference> {
    let text = normalize(question);
    text.split_whitespace()
        .any(|token| TICKET_TERMS.contains(&token))
        .then_some(CategoryPreference::Ticket)
}
