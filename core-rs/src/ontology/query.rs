/**
 * query.rs
 * Query types and builders for SPARQL
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{QgError, Result};

/// Output form of a compiled question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    /// `CONSTRUCT { edges } WHERE { ... }`
    Construct,
    /// `SELECT DISTINCT <edge variables> WHERE { ... }`
    #[default]
    Select,
}

impl FromStr for QueryMode {
    type Err = QgError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "construct" => Ok(QueryMode::Construct),
            "select" => Ok(QueryMode::Select),
            other => Err(QgError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for QueryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryMode::Construct => write!(f, "construct"),
            QueryMode::Select => write!(f, "select"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparqlQuery {
    query: String,
}

impl SparqlQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.query
    }

    pub fn into_string(self) -> String {
        self.query
    }

    /// DESCRIBE the justifications attached to a result URI
    ///
    /// `prefix_block` is the rendered PREFIX header of the question the URI
    /// came from.
    pub fn describe_justification(prefix_block: &str, uri: &str) -> Self {
        Self::new(format!(
            "{} \nDESCRIBE ?j WHERE {{ <{}> aida:justifiedBy ?j . }}",
            prefix_block, uri
        ))
    }

    /// Run the text through oxigraph's SPARQL 1.1 parser
    pub fn check_syntax(&self) -> Result<()> {
        oxigraph::sparql::Query::parse(&self.query, None)
            .map(|_| ())
            .map_err(|e| QgError::SparqlSyntax(e.to_string()))
    }
}

impl fmt::Display for SparqlQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.query)
    }
}

impl From<SparqlQuery> for String {
    fn from(query: SparqlQuery) -> Self {
        query.query
    }
}
