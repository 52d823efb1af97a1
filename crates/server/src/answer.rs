//! Answer composition
//!
//! Renders a match outcome as the sectioned plain-text answer agents read on
//! screen: Acknowledge, Matrix Reference, Step-by-step Guidance, Source.

use serde::Serialize;

use compliance_assist_core::{QueryResult, Routing, SearchHit};

/// Steps shown when the matrix has no confident match
pub const FALLBACK_STEPS: [&str; 2] = [
    "Search the closest documented procedure.",
    "If still unclear, escalate to a supervisor.",
];

/// Step shown when a matched row carries no instructions
const NO_INSTRUCTIONS_STEP: &str = "not covered in documentation.";

/// Response body of `/api/ask`
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub answer: String,
    pub source: String,
    /// False for guardrail replies and for scenarios the matrix does not cover
    pub covered: bool,
    pub steps: Vec<String>,
    /// Routing of the matched row; absent when nothing was matched
    pub routing: Option<Routing>,
    /// Top-ranked hits backing the answer
    pub proof: Vec<SearchHit>,
    pub debug: AnswerDebug,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AnswerDebug {
    pub top_score: f32,
    pub matched_count: usize,
    pub prefer_ticket_tab: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

/// Reply to greetings and other non-work chatter
pub fn small_talk(label: &str) -> Answer {
    let answer = format!(
        "Acknowledge\n\
         I'm here as a work tool for compliance guidance, not as a person.\n\n\
         What I can help with\n\
         - {label}: step-by-step procedures (voice + ticket routing)\n\n\
         Next step\n\
         Ask a work scenario like: \"guest wants refund outside policy\" or \"hotel sold out at check-in\".\n\n\
         Source\n\
         System Guardrail"
    );

    guardrail(answer, "Guardrail • Engine: Intent-router", "smalltalk")
}

/// Reply to questions about what the assistant can do
pub fn capability(label: &str) -> Answer {
    let answer = format!(
        "Acknowledge\n\
         Yes, I can help, but I only answer using the {label} documentation.\n\n\
         What I cover\n\
         - Procedures and routing (Slack / Refund Queue / Ticket / Supervisor)\n\n\
         How to ask\n\
         - Describe the scenario: \"hotel sold out at check-in\"\n\
         - Mention a ticket or case to prefer ticket-handling rows\n\n\
         Source\n\
         System Guide"
    );

    guardrail(answer, "Guide • Engine: Intent-router", "capability")
}

fn guardrail(answer: String, source: &str, reason: &'static str) -> Answer {
    Answer {
        answer,
        source: source.to_string(),
        covered: false,
        steps: Vec::new(),
        routing: None,
        proof: Vec::new(),
        debug: AnswerDebug {
            reason: Some(reason),
            ..Default::default()
        },
    }
}

/// Standard reply when no row clears the acceptance threshold
pub fn not_covered(
    label: &str,
    top_score: f32,
    matched_count: usize,
    prefer_ticket_tab: bool,
) -> Answer {
    let steps: Vec<String> = FALLBACK_STEPS.iter().map(|s| s.to_string()).collect();

    let answer = format!(
        "Acknowledge\n\
         I understand the scenario, but it is not clearly covered in the {label} documentation.\n\n\
         Matrix Reference\n\
         {label}: Not covered (no matching row found)\n\n\
         Step-by-step Guidance\n\
         {}\n\n\
         Source\n\
         {label}",
        numbered(&steps)
    );

    Answer {
        answer,
        source: engine_source(label),
        covered: false,
        steps,
        routing: None,
        proof: Vec::new(),
        debug: AnswerDebug {
            top_score,
            matched_count,
            prefer_ticket_tab,
            reason: Some("not_covered"),
        },
    }
}

/// Reply built from the accepted row
pub fn matched(
    label: &str,
    question: &str,
    result: &QueryResult,
    proof_limit: usize,
    prefer_ticket_tab: bool,
) -> Answer {
    let row = &result.matched_row;

    let mut acknowledge = format!(
        "I understand the scenario: \"{question}\". Based on the {label} guide, \
         the closest match is the procedure below."
    );
    if prefer_ticket_tab {
        acknowledge.push_str(" (Ticket-focused match)");
    }

    let reference = format!("{} → {}", row.citation(), row.description);

    let steps_block = if result.extracted_steps.is_empty() {
        format!("1. {}", NO_INSTRUCTIONS_STEP)
    } else {
        numbered(&result.extracted_steps)
    };

    let answer = format!(
        "Acknowledge\n{acknowledge}\n\n\
         Matrix Reference\n{reference}\n\n\
         Step-by-step Guidance\n{steps_block}\n\n\
         Source\n{label}"
    );

    Answer {
        answer,
        source: engine_source(label),
        covered: true,
        steps: result.extracted_steps.clone(),
        routing: Some(row.routing.or_not_specified()),
        proof: result
            .top_k
            .iter()
            .take(proof_limit)
            .map(SearchHit::from)
            .collect(),
        debug: AnswerDebug {
            top_score: result.top_k.first().map(|s| s.score).unwrap_or(result.score),
            matched_count: result.top_k.len(),
            prefer_ticket_tab,
            reason: None,
        },
    }
}

fn engine_source(label: &str) -> String {
    format!("{} • Engine: Matrix-only", label)
}

fn numbered(steps: &[String]) -> String {
    steps
        .iter()
        .enumerate()
        .map(|(i, step)| format!("{}. {}", i + 1, step))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use compliance_assist_core::{KnowledgeRow, ScoredRow, NOT_SPECIFIED};
    use std::sync::Arc;

    fn result(instructions_steps: Vec<String>) -> QueryResult {
        let row = Arc::new(KnowledgeRow {
            id: "voice-matrix-2".to_string(),
            tab: "Voice Matrix".to_string(),
            row_number: 2,
            description: "Reservation not found at check-in".to_string(),
            routing: Routing {
                supervisor: "Yes".to_string(),
                ..Default::default()
            },
            ..Default::default()
        });
        let top_k = (0..8)
            .map(|i| ScoredRow {
                row: Arc::clone(&row),
                score: 80.0 - i as f32,
            })
            .collect();

        QueryResult {
            matched_row: row,
            score: 80.0,
            extracted_steps: instructions_steps,
            top_k,
            preferred: false,
        }
    }

    #[test]
    fn test_matched_answer_sections() {
        let result = result(vec!["Call supplier.".to_string(), "Rebook guest.".to_string()]);
        let answer = matched("Matrix-2026", "hotel sold out", &result, 6, false);

        assert!(answer.covered);
        assert!(answer
            .answer
            .contains("Matrix Reference\nVoice Matrix → Row 2 → Reservation not found at check-in"));
        assert!(answer
            .answer
            .contains("Step-by-step Guidance\n1. Call supplier.\n2. Rebook guest."));
        assert!(answer.answer.ends_with("Source\nMatrix-2026"));
        assert!(!answer.answer.contains("Ticket-focused"));
        assert_eq!(answer.proof.len(), 6);
        assert_eq!(answer.debug.matched_count, 8);

        let routing = answer.routing.unwrap();
        assert_eq!(routing.supervisor, "Yes");
        assert_eq!(routing.slack, NOT_SPECIFIED);
    }

    #[test]
    fn test_matched_without_steps() {
        let answer = matched("Matrix-2026", "q", &result(Vec::new()), 6, true);
        assert!(answer.answer.contains("1. not covered in documentation."));
        assert!(answer.answer.contains("(Ticket-focused match)"));
        assert!(answer.steps.is_empty());
    }

    #[test]
    fn test_not_covered() {
        let answer = not_covered("Matrix-2026", 4.0, 2, false);
        assert!(!answer.covered);
        assert!(answer.routing.is_none());
        assert!(answer.proof.is_empty());
        assert_eq!(answer.steps.len(), 2);
        assert!(answer
            .answer
            .contains("1. Search the closest documented procedure.\n2. If still unclear, escalate to a supervisor."));
        assert_eq!(answer.debug.top_score, 4.0);
    }

    #[test]
    fn test_guardrails_serialize_without_routing() {
        let json = serde_json::to_value(small_talk("Matrix-2026")).unwrap();
        assert!(json["routing"].is_null());
        assert_eq!(json["debug"]["reason"], "smalltalk");

        let json = serde_json::to_value(capability("Matrix-2026")).unwrap();
        assert_eq!(json["debug"]["reason"], "capability");
    }
}
