//! Knowledge base loader
//!
//! Turns a loosely-shaped matrix export into uniform [`KnowledgeRow`]s. Exports
//! come from spreadsheets, so header names drift between tabs and versions;
//! each canonical field is looked up through an alias table.
//!
//! For every field the first non-empty value wins, searching in order:
//! 1. the row object itself
//! 2. a nested `fields` object
//! 3. a nested `raw` object
//! 4. a pipe-packed `text` value (`Issue | Instructions: ... | Slack: Yes`)

use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::path::Path;

use compliance_assist_core::{KnowledgeRow, Routing, UNKNOWN_TAB};

use crate::text::{normalize_key, slugify, tokenize};
use crate::RagError;

/// Canonical row fields recognised by the loader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    Id,
    Tab,
    RowNumber,
    Description,
    GuestSays,
    Summary,
    Instructions,
    Slack,
    RefundQueue,
    Ticket,
    Supervisor,
    Keywords,
    PackedText,
}

impl CanonicalField {
    /// Accepted header names, already in `normalize_key` form
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Id => &["id", "row id", "row_id"],
            Self::Tab => &["tab", "sheet", "sheet name", "sheetname", "tab name"],
            Self::RowNumber => &["row", "row #", "row#", "row number", "rownumber", "row_number"],
            Self::Description => &[
                "issue",
                "scenario",
                "scenario / issue",
                "scenario/issue",
                "issue / scenario",
                "issue type",
                "description",
                "title",
                "topic",
                "situation",
            ],
            Self::GuestSays => &[
                "guest says",
                "guestsays",
                "guest_says",
                "guest said",
                "caller says",
                "customer says",
            ],
            Self::Summary => &[
                "quick answer",
                "quickanswer",
                "quick_answer",
                "what to do",
                "what to do next",
                "guidance",
                "summary",
            ],
            Self::Instructions => &["instructions", "instruction", "procedure", "steps"],
            Self::Slack => &["slack", "slack?", "slack channel"],
            Self::RefundQueue => &[
                "refundqueue",
                "refund queue",
                "refund_queue",
                "refund queue?",
                "queue",
                "queue?",
                "routing queue",
                "routing",
            ],
            Self::Ticket => &[
                "ticket",
                "ticket?",
                "create ticket",
                "create a ticket",
                "createticket",
                "create_ticket",
                "submit ticket",
            ],
            Self::Supervisor => &[
                "supervisor",
                "supervisor?",
                "supervisor/escalation",
                "supervisor/escalations",
                "supervisor / escalation",
                "escalation",
                "escalations",
            ],
            Self::Keywords => &["keywords", "keyword", "tags"],
            Self::PackedText => &["text"],
        }
    }
}

/// Fields recovered from a pipe-packed text cell
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackedFields {
    pub description: String,
    pub instructions: String,
    pub slack: String,
    pub refund_queue: String,
    pub ticket: String,
    pub supervisor: String,
}

impl PackedFields {
    fn get(&self, field: CanonicalField) -> &str {
        match field {
            CanonicalField::Description => &self.description,
            CanonicalField::Instructions => &self.instructions,
            CanonicalField::Slack => &self.slack,
            CanonicalField::RefundQueue => &self.refund_queue,
            CanonicalField::Ticket => &self.ticket,
            CanonicalField::Supervisor => &self.supervisor,
            _ => "",
        }
    }
}

/// Labels recognised inside packed text, matched case-insensitively
const PACKED_LABELS: [(&str, CanonicalField); 5] = [
    ("instructions:", CanonicalField::Instructions),
    ("slack", CanonicalField::Slack),
    ("refund queue", CanonicalField::RefundQueue),
    ("create a ticket", CanonicalField::Ticket),
    ("supervisor", CanonicalField::Supervisor),
];

/// Parse `Issue | Instructions: ... | Slack: Yes | Refund Queue: No | ...`
///
/// The first segment is the issue; it may itself carry an inline
/// `Instructions:` label. Labelled segments take the text after their first
/// colon. Unlabelled later segments are ignored.
pub fn parse_packed_text(text: &str) -> PackedFields {
    let parts: Vec<&str> = text
        .split('|')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    let mut packed = PackedFields::default();
    let Some(first) = parts.first() else {
        return packed;
    };

    // ASCII lowercasing keeps byte offsets aligned with the original
    let lowered = first.to_ascii_lowercase();
    match lowered.find("instructions:") {
        Some(idx) => {
            packed.description = first[..idx].trim().to_string();
            packed.instructions = first[idx + "instructions:".len()..].trim().to_string();
        },
        None => packed.description = first.to_string(),
    }

    for part in &parts {
        let lowered = part.to_ascii_lowercase();
        let Some((_, field)) = PACKED_LABELS
            .iter()
            .find(|(label, _)| lowered.starts_with(label))
        else {
            continue;
        };

        let value = part
            .split_once(':')
            .map(|(_, v)| v.trim().to_string())
            .unwrap_or_default();

        let slot = match field {
            CanonicalField::Instructions => &mut packed.instructions,
            CanonicalField::Slack => &mut packed.slack,
            CanonicalField::RefundQueue => &mut packed.refund_queue,
            CanonicalField::Ticket => &mut packed.ticket,
            _ => &mut packed.supervisor,
        };
        if !value.is_empty() {
            *slot = value;
        }
    }

    packed
}

/// Render a JSON value as cell text
///
/// Booleans become "Yes"/"No", arrays are joined with ", ", objects and nulls
/// are empty.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "Yes".to_string(),
        Value::Bool(false) => "No".to_string(),
        Value::Array(items) => items
            .iter()
            .map(value_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Null | Value::Object(_) => String::new(),
    }
}

/// One row object keyed by normalized header names
struct FieldSource<'a> {
    fields: HashMap<String, &'a Value>,
}

impl<'a> FieldSource<'a> {
    fn new(map: &'a Map<String, Value>) -> Self {
        let mut fields: HashMap<String, &'a Value> = HashMap::new();
        for (key, value) in map {
            let key = normalize_key(key);
            // Duplicate headers after normalization: first non-empty wins
            let occupied = fields
                .get(&key)
                .is_some_and(|existing| !value_text(existing).is_empty());
            if !occupied {
                fields.insert(key, value);
            }
        }
        Self { fields }
    }

    fn nested(map: &'a Map<String, Value>, key: &str) -> Option<Self> {
        map.iter()
            .find(|(k, _)| normalize_key(k) == key)
            .and_then(|(_, v)| v.as_object())
            .map(Self::new)
    }

    fn lookup(&self, field: CanonicalField) -> Option<&'a Value> {
        field
            .aliases()
            .iter()
            .filter_map(|alias| self.fields.get(*alias).copied())
            .find(|value| !value_text(value).is_empty())
    }
}

/// Field lookup across the precedence chain for one record
struct RowReader<'a> {
    sources: Vec<FieldSource<'a>>,
    packed: PackedFields,
    packed_raw: String,
}

impl<'a> RowReader<'a> {
    fn new(map: &'a Map<String, Value>) -> Self {
        let mut sources = vec![FieldSource::new(map)];
        sources.extend(FieldSource::nested(map, "fields"));
        sources.extend(FieldSource::nested(map, "raw"));

        let packed_raw = sources
            .iter()
            .find_map(|s| s.lookup(CanonicalField::PackedText))
            .map(value_text)
            .unwrap_or_default();
        let packed = parse_packed_text(&packed_raw);

        Self {
            sources,
            packed,
            packed_raw,
        }
    }

    fn value(&self, field: CanonicalField) -> Option<&'a Value> {
        self.sources.iter().find_map(|s| s.lookup(field))
    }

    fn text(&self, field: CanonicalField) -> String {
        match self.value(field) {
            Some(value) => value_text(value),
            None => self.packed.get(field).to_string(),
        }
    }

    fn keywords(&self) -> Vec<String> {
        let Some(value) = self.value(CanonicalField::Keywords) else {
            return Vec::new();
        };

        let items: Vec<String> = match value {
            Value::Array(items) => items.iter().map(value_text).collect(),
            other => value_text(other).split(',').map(str::to_string).collect(),
        };

        items
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect()
    }

    fn row_number(&self) -> Option<u32> {
        let text = self.text(CanonicalField::RowNumber);
        let text = text.trim();
        if let Ok(n) = text.parse::<u32>() {
            return Some(n);
        }
        text.parse::<f64>()
            .ok()
            .filter(|n| n.is_finite() && *n >= 0.0 && n.fract() == 0.0 && *n <= u32::MAX as f64)
            .map(|n| n as u32)
    }
}

/// Normalize a parsed knowledge document into rows
///
/// The root must be a list of records, or an object with a `rows` list.
/// Entries that are not objects are skipped.
pub fn load_rows(source: &Value) -> Result<Vec<KnowledgeRow>, RagError> {
    let entries = match source {
        Value::Array(entries) => entries,
        Value::Object(map) => match map.get("rows") {
            Some(Value::Array(entries)) => entries,
            _ => {
                return Err(RagError::MalformedKnowledgeBase(
                    "expected an object with a `rows` list".to_string(),
                ))
            },
        },
        _ => {
            return Err(RagError::MalformedKnowledgeBase(
                "expected a list of rows or an object with a `rows` list".to_string(),
            ))
        },
    };

    let mut rows = Vec::with_capacity(entries.len());
    let mut positions: HashMap<String, u32> = HashMap::new();
    let mut skipped = 0usize;

    for entry in entries {
        let Some(map) = entry.as_object() else {
            skipped += 1;
            continue;
        };

        let reader = RowReader::new(map);

        let tab = match reader.text(CanonicalField::Tab) {
            t if t.is_empty() => UNKNOWN_TAB.to_string(),
            t => t,
        };
        let position = positions.entry(tab.clone()).or_insert(0);
        *position += 1;
        let row_number = reader.row_number().unwrap_or(*position);

        let id = match reader.text(CanonicalField::Id) {
            id if id.is_empty() => format!("{}-{}", slugify(&tab), row_number),
            id => id,
        };

        let mut row = KnowledgeRow {
            id,
            tab,
            row_number,
            description: reader.text(CanonicalField::Description),
            guest_says: reader.text(CanonicalField::GuestSays),
            summary: reader.text(CanonicalField::Summary),
            instructions: reader.text(CanonicalField::Instructions),
            routing: Routing {
                slack: reader.text(CanonicalField::Slack),
                refund_queue: reader.text(CanonicalField::RefundQueue),
                ticket: reader.text(CanonicalField::Ticket),
                supervisor: reader.text(CanonicalField::Supervisor),
            },
            keywords: reader.keywords(),
            ..Default::default()
        };

        row.keyword_tokens = tokenize(&row.keywords.join(" ")).into_iter().collect();
        row.search_tokens = searchable_tokens(&row, &reader.packed_raw);

        rows.push(row);
    }

    if skipped > 0 {
        tracing::warn!(skipped, "Skipped knowledge entries that are not objects");
    }

    Ok(rows)
}

fn searchable_tokens(row: &KnowledgeRow, packed_raw: &str) -> HashSet<String> {
    let text = format!("{} {}", row.searchable_text(), packed_raw);
    tokenize(&text).into_iter().collect()
}

/// Knowledge loader for the matrix file
pub struct KnowledgeLoader;

impl KnowledgeLoader {
    /// Load rows from a JSON or YAML file
    ///
    /// Files with an unrecognised extension are parsed as JSON.
    pub fn load_file(path: &Path) -> Result<Vec<KnowledgeRow>, RagError> {
        if !path.exists() {
            return Err(RagError::NotFound(format!(
                "Knowledge file does not exist: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| RagError::Io(format!("{}: {}", path.display(), e)))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let document: Value = match extension {
            "yaml" | "yml" => serde_yaml::from_str(&content)
                .map_err(|e| RagError::Parse(format!("{}: YAML parse error: {}", path.display(), e)))?,
            _ => serde_json::from_str(&content)
                .map_err(|e| RagError::Parse(format!("{}: JSON parse error: {}", path.display(), e)))?,
        };

        let rows = load_rows(&document)?;

        let tabs: HashSet<&str> = rows.iter().map(|r| r.tab.as_str()).collect();
        tracing::info!(
            file = %path.display(),
            rows = rows.len(),
            tabs = tabs.len(),
            "Loaded knowledge file"
        );

        Ok(rows)
    }
}
