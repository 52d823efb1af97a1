//! Instruction splitting
//!
//! Matrix instruction cells pack several actions into one string using
//! whatever convention the author liked: `1. a 2. b`, `1.a,2.b`, or one step
//! per line. Strategies are tried in a fixed order; the first producing more
//! than one step wins.

use once_cell::sync::Lazy;
use regex::Regex;

/// Numbered prefix after whitespace or a comma; `2.5` is not a prefix
static NUMBERED_AFTER_SPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s,](\d+\.)(?:\D|$)").expect("valid regex"));

/// Numbered prefix directly after a comma, e.g. `1.Call,2.Rebook`
static NUMBERED_AFTER_COMMA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",\s*(\d+\.)").expect("valid regex"));

static NUMERIC_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\s*").expect("valid regex"));

static BULLET_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-*•]\s+").expect("valid regex"));

#[derive(Debug, Clone, Copy)]
enum Strategy {
    NumberedAfterSpace,
    NumberedAfterComma,
    Newline,
}

impl Strategy {
    const ORDER: [Strategy; 3] = [
        Strategy::NumberedAfterSpace,
        Strategy::NumberedAfterComma,
        Strategy::Newline,
    ];

    fn segments<'a>(&self, text: &'a str) -> Vec<&'a str> {
        match self {
            Self::NumberedAfterSpace => split_before_group(&NUMBERED_AFTER_SPACE, text),
            Self::NumberedAfterComma => split_before_group(&NUMBERED_AFTER_COMMA, text),
            Self::Newline => text.split('\n').collect(),
        }
    }
}

/// Split `text` immediately before capture group 1 of every match
fn split_before_group<'a>(pattern: &Regex, text: &'a str) -> Vec<&'a str> {
    let mut segments = Vec::new();
    let mut start = 0;

    for caps in pattern.captures_iter(text) {
        if let Some(group) = caps.get(1) {
            segments.push(&text[start..group.start()]);
            start = group.start();
        }
    }
    segments.push(&text[start..]);

    segments
}

/// Strip numbering, bullets and bold markers from one step
fn clean_step(segment: &str) -> String {
    let unmarked = segment.replace("**", "").replace("__", "");
    let trimmed = unmarked.trim().trim_end_matches(',').trim();
    let without_number = NUMERIC_PREFIX.replace(trimmed, "");
    BULLET_PREFIX.replace(without_number.trim(), "").trim().to_string()
}

fn clean_all(segments: Vec<&str>) -> Vec<String> {
    segments
        .into_iter()
        .map(clean_step)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Split an instructions cell into ordered steps
///
/// Never fails. Empty input yields no steps; non-empty input without any
/// recognised delimiter yields exactly one step.
pub fn split_steps(instructions: &str) -> Vec<String> {
    let text = instructions.replace('\r', "");
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    for strategy in Strategy::ORDER {
        let steps = clean_all(strategy.segments(text));
        if steps.len() > 1 {
            return steps;
        }
    }

    let single = clean_step(text);
    if single.is_empty() {
        vec![text.to_string()]
    } else {
        vec![single]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_steps() {
        let steps =
            split_steps("1. Call supplier. 2. Offer alternate room. 3. Escalate if unresolved.");
        assert_eq!(
            steps,
            vec!["Call supplier.", "Offer alternate room.", "Escalate if unresolved."]
        );
    }

    #[test]
    fn test_empty_and_single() {
        assert!(split_steps("").is_empty());
        assert!(split_steps("   \r\n ").is_empty());
        assert_eq!(
            split_steps("Just call the guest back."),
            vec!["Just call the guest back."]
        );
    }

    #[test]
    fn test_comma_separated_numbered() {
        let steps = split_steps("1. Verify booking, 2. Call hotel, 3. Document in notes");
        assert_eq!(steps, vec!["Verify booking", "Call hotel", "Document in notes"]);
    }

    #[test]
    fn test_comma_without_spaces() {
        let steps = split_steps("1.Call supplier,2.Rebook guest,3.Close case");
        assert_eq!(steps, vec!["Call supplier", "Rebook guest", "Close case"]);
    }

    #[test]
    fn test_newline_steps_with_markdown() {
        let steps = split_steps("**Confirm identity**\r\n- Check voucher\n\n* Escalate");
        assert_eq!(steps, vec!["Confirm identity", "Check voucher", "Escalate"]);
    }

    #[test]
    fn test_numbered_without_space_after_dot() {
        let steps = split_steps("1.Call supplier 2.Rebook guest 3.Escalate to supervisor");
        assert_eq!(steps, vec!["Call supplier", "Rebook guest", "Escalate to supervisor"]);
    }

    #[test]
    fn test_preamble_kept_as_step() {
        let steps = split_steps("Before calling: 1. Check notes 2. Call supplier");
        assert_eq!(steps, vec!["Before calling:", "Check notes", "Call supplier"]);
    }

    #[test]
    fn test_decimal_is_not_a_step_boundary() {
        let steps = split_steps("Refund 2.5 nights minus fees");
        assert_eq!(steps, vec!["Refund 2.5 nights minus fees"]);
    }

    #[test]
    fn test_single_numbered_step_is_stripped() {
        assert_eq!(split_steps("1. Call the supplier"), vec!["Call the supplier"]);
    }

    #[test]
    fn test_decoration_only_falls_back_to_raw() {
        assert_eq!(split_steps("**"), vec!["**"]);
    }
}
