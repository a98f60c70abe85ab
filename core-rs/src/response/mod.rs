/**
 * response module
 *
 * - n3: tokenizer and statement parser for DESCRIBE output
 * - justification: N3 text -> justification entries keyed by source document
 * - grouping: result bindings -> per-variable URIs and justifications
 * - assembly: grouped justifications -> response XML
 */

pub mod assembly;
pub mod grouping;
pub mod justification;
pub mod n3;

use thiserror::Error;

pub use assembly::to_xml;
pub use grouping::{group_justifications, GroupedResults, GroupedVariable, MalformedPolicy};
pub use justification::{parse_justification, FieldValue, JustificationRecord, SpanEntry};
pub use n3::{N3Statement, N3Value};

/// Failure to read one justification document
#[derive(Error, Debug, Clone, PartialEq)]
pub enum JustificationError {
    #[error("Malformed N3: {0}")]
    Malformed(String),

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Invalid confidence value: {0}")]
    InvalidConfidence(String),
}
