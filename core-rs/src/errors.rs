//! Error types for QGraph Core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum QgError {
    #[error("Malformed question: {0}")]
    MalformedQuestion(String),

    #[error("Unknown predicate: {0}")]
    UnknownPredicate(String),

    #[error("Unknown class: {0}")]
    UnknownClass(String),

    #[error("Invalid query mode: {0}")]
    InvalidMode(String),

    #[error("SPARQL syntax error: {0}")]
    SparqlSyntax(String),

    #[error("Justification error: {0}")]
    Justification(#[from] crate::response::JustificationError),

    #[error("Missing binding for variable: {0}")]
    MissingBinding(String),

    #[error("Endpoint error: {0}")]
    Endpoint(String),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Regex error: {0}")]
    RegexError(String),
}

impl From<regex::Error> for QgError {
    fn from(err: regex::Error) -> Self {
        QgError::RegexError(err.to_string())
    }
}

impl From<quick_xml::Error> for QgError {
    fn from(err: quick_xml::Error) -> Self {
        QgError::Xml(err.to_string())
    }
}

impl From<reqwest::Error> for QgError {
    fn from(err: reqwest::Error) -> Self {
        QgError::Endpoint(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, QgError>;
