//! Text normalization and tokenization
//!
//! Every comparison in the matcher happens on normalized text: zero-width
//! characters removed, lowercased, punctuation replaced by spaces, whitespace
//! collapsed. Tokens are compared by exact equality; there is no stemming.

/// Invisible characters that leak in from spreadsheet exports
const INVISIBLE: [char; 6] = [
    '\u{200b}', '\u{200c}', '\u{200d}', '\u{2060}', '\u{feff}', '\u{00ad}',
];

pub fn is_invisible(c: char) -> bool {
    INVISIBLE.contains(&c)
}

/// Normalize text for matching
///
/// `"Can't check-in!"` becomes `"can t check in"`.
pub fn normalize(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());

    for c in text.chars().filter(|c| !is_invisible(*c)) {
        if c.is_alphanumeric() || c == '_' {
            cleaned.extend(c.to_lowercase());
        } else {
            cleaned.push(' ');
        }
    }

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split text into normalized tokens, keeping every token
///
/// Used for indexing rows: short tokens such as "no" are preserved.
pub fn tokenize(text: &str) -> Vec<String> {
    normalize(text)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Word-boundary containment on already-normalized text
///
/// `contains_phrase("hotel sold out", "sold out")` is true while
/// `contains_phrase("resold outlet", "sold out")` is not.
pub fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    if phrase.is_empty() || haystack.is_empty() {
        return false;
    }
    format!(" {} ", haystack).contains(&format!(" {} ", phrase))
}

/// Normalize a header/field name for alias lookup
///
/// Case-insensitive, invisible characters removed, inner whitespace
/// collapsed. Punctuation is kept so "Row #" and "Queue?" stay distinct keys.
pub fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| !is_invisible(*c))
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// URL-ish slug used for derived row ids
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.trim().chars().filter(|c| !is_invisible(*c)) {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        "sheet".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_basic() {
        assert_eq!(normalize("  Hotel SOLD out!!  "), "hotel sold out");
        assert_eq!(normalize("Can't check-in"), "can t check in");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("...---..."), "");
    }

    #[test]
    fn test_normalize_strips_invisible() {
        assert_eq!(normalize("re\u{200b}fund\u{feff}"), "refund");
    }

    #[test]
    fn test_normalize_keeps_digits_and_underscore() {
        assert_eq!(normalize("Step 2: call_back"), "step 2 call_back");
    }

    #[test]
    fn test_tokenize_keeps_short_tokens() {
        assert_eq!(tokenize("Slack: No"), vec!["slack", "no"]);
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn test_contains_phrase_word_boundary() {
        assert!(contains_phrase("hotel sold out at check in", "sold out"));
        assert!(contains_phrase("sold out", "sold out"));
        assert!(!contains_phrase("resold outlet", "sold out"));
        assert!(!contains_phrase("sold out", ""));
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key(" Refund\u{200b}  Queue "), "refund queue");
        assert_eq!(normalize_key("RefundQueue"), "refundqueue");
        assert_eq!(normalize_key("Row #"), "row #");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Voice Matrix (2026)"), "voice-matrix-2026");
        assert_eq!(slugify("  "), "sheet");
        assert_eq!(slugify("--Ticket--"), "ticket");
    }
}
