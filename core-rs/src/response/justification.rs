//! Justification records
//!
//! A DESCRIBE of `?x aida:justifiedBy ?j` comes back as N3 blocks, one per
//! justification node. Each block becomes a span entry filed under the
//! document it was taken from:
//!
//! ```text
//! doc1 -> [ { text_span: { system_nodeid, confidence, <mapped fields>... } } ]
//! ```

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::debug;

use super::n3::{self, local_name, N3Statement, N3Value};
use super::JustificationError;
use crate::ontology::FieldMapping;

type ParseResult<T> = std::result::Result<T, JustificationError>;

/// Fields consumed into fixed slots rather than copied through the mapping
const RESERVED_FIELDS: [&str; 4] = ["confidence", "system", "privateData", "a"];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Node(IndexMap<String, FieldValue>),
}

impl FieldValue {
    /// Text as it appears in the response XML
    ///
    /// Whole numbers keep one decimal place (`1.0`), matching how the
    /// downstream consumers print confidences.
    pub fn render(&self) -> Option<String> {
        match self {
            FieldValue::Text(t) => Some(t.clone()),
            FieldValue::Number(n) => Some(format_float(*n)),
            FieldValue::Node(_) => None,
        }
    }
}

impl From<&N3Value> for FieldValue {
    fn from(value: &N3Value) -> Self {
        match value {
            N3Value::Term(t) => FieldValue::Text(t.clone()),
            N3Value::Node(node) => FieldValue::Node(
                node.iter()
                    .map(|(k, v)| (k.clone(), FieldValue::Text(v.clone())))
                    .collect(),
            ),
        }
    }
}

pub fn format_float(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e16 {
        format!("{:.1}", n)
    } else {
        n.to_string()
    }
}

/// One justification node, e.g. `text_span -> {system_nodeid, confidence, ...}`
#[derive(Debug, Clone, PartialEq)]
pub struct SpanEntry {
    pub span_type: String,
    pub fields: IndexMap<String, FieldValue>,
}

impl SpanEntry {
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn confidence(&self) -> Option<f64> {
        match self.fields.get("confidence") {
            Some(FieldValue::Number(n)) => Some(*n),
            _ => None,
        }
    }
}

impl Serialize for SpanEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.span_type, &self.fields)?;
        map.end()
    }
}

/// Span entries of one DESCRIBE result, grouped by source document id
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct JustificationRecord {
    by_source: IndexMap<String, Vec<SpanEntry>>,
}

impl JustificationRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, source: impl Into<String>, entry: SpanEntry) {
        self.by_source.entry(source.into()).or_default().push(entry);
    }

    pub fn get(&self, source: &str) -> Option<&[SpanEntry]> {
        self.by_source.get(source).map(Vec::as_slice)
    }

    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.by_source.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[SpanEntry])> {
        self.by_source.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.by_source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_source.is_empty()
    }
}

/// `aida:TextJustification` -> `text_span`
pub fn span_key(class: &str) -> String {
    let name = local_name(class);
    let stem = match name.rfind("Justification") {
        Some(idx) => &name[..idx],
        None => name,
    };
    format!("{}_span", stem.to_lowercase())
}

/// Blank-line separated blocks, skipping empty ones and prefix declarations
fn blocks(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines().chain(std::iter::once("")) {
        if line.trim().is_empty() {
            if !current.is_empty() {
                out.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }

    out.retain(|b| !b.trim_start().starts_with('@'));
    out
}

fn required_term<'a>(statement: &'a N3Statement, field: &str) -> ParseResult<&'a str> {
    statement
        .properties
        .get(field)
        .and_then(N3Value::as_term)
        .ok_or_else(|| JustificationError::MissingField(field.to_string()))
}

fn confidence_of(statement: &N3Statement) -> ParseResult<f64> {
    let raw = statement
        .properties
        .get("confidence")
        .and_then(N3Value::as_node)
        .and_then(|node| node.get("confidenceValue"))
        .ok_or_else(|| JustificationError::MissingField("confidence.confidenceValue".to_string()))?;

    raw.trim()
        .parse::<f64>()
        .map_err(|_| JustificationError::InvalidConfidence(raw.clone()))
}

/// Build the span entry for one statement, returning it with its source id
pub fn entry_from_statement(
    statement: &N3Statement,
    mapping: &FieldMapping,
) -> ParseResult<(String, SpanEntry)> {
    let span_type = span_key(required_term(statement, "a")?);
    let source = required_term(statement, "source")?.to_string();
    let system = required_term(statement, "system")?;
    let confidence = confidence_of(statement)?;

    let mut fields = IndexMap::new();
    fields.insert(
        "system_nodeid".to_string(),
        FieldValue::Text(system.trim_start_matches('<').trim_end_matches('>').to_string()),
    );
    fields.insert("confidence".to_string(), FieldValue::Number(confidence));

    for (name, value) in &statement.properties {
        if RESERVED_FIELDS.contains(&name.as_str()) {
            continue;
        }
        match mapping.tag_for(name) {
            Some(tag) => {
                fields.insert(tag.to_string(), FieldValue::from(value));
            }
            None => debug!(field = %name, subject = %statement.subject, "no xml tag for field, omitted"),
        }
    }

    Ok((source, SpanEntry { span_type, fields }))
}

/// Parse the N3 text of one DESCRIBE result
pub fn parse_justification(text: &str, mapping: &FieldMapping) -> ParseResult<JustificationRecord> {
    let mut record = JustificationRecord::new();

    for block in blocks(text) {
        for statement in n3::parse_statements(&block)? {
            let (source, entry) = entry_from_statement(&statement, mapping)?;
            record.push(source, entry);
        }
    }

    Ok(record)
}
