//! SPARQL endpoint trait
//!
//! Abstracts the transport a compiled question is sent over. Implementations:
//! - HttpEndpoint (SPARQL 1.1 protocol over HTTP)
//! - in-memory endpoints in tests

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::ontology::SparqlQuery;

/// Accept header for SELECT results
pub const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// Accept header for DESCRIBE results
pub const TEXT_N3: &str = "text/n3, text/turtle;q=0.9";

/// One bound value in a SELECT result row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingValue {
    /// `uri`, `literal`, `bnode` (some stores send `typed-literal`)
    #[serde(rename = "type")]
    pub kind: String,

    pub value: String,

    #[serde(rename = "xml:lang", default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
}

impl BindingValue {
    pub fn uri(value: impl Into<String>) -> Self {
        Self {
            kind: "uri".to_string(),
            value: value.into(),
            lang: None,
            datatype: None,
        }
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            kind: "literal".to_string(),
            value: value.into(),
            lang: None,
            datatype: None,
        }
    }

    pub fn is_uri(&self) -> bool {
        self.kind == "uri"
    }
}

/// Variable name (no `?`) -> value, in the order the endpoint sent them
pub type BindingRow = IndexMap<String, BindingValue>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultsHead {
    #[serde(default)]
    pub vars: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultBindings {
    #[serde(default)]
    pub bindings: Vec<BindingRow>,
}

/// SPARQL 1.1 JSON results document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparqlResults {
    #[serde(default)]
    pub head: ResultsHead,
    pub results: ResultBindings,
}

impl SparqlResults {
    pub fn from_rows(rows: Vec<BindingRow>) -> Self {
        let mut vars: Vec<String> = Vec::new();
        for name in rows.iter().flat_map(|row| row.keys()) {
            if !vars.contains(name) {
                vars.push(name.clone());
            }
        }
        Self {
            head: ResultsHead { vars },
            results: ResultBindings { bindings: rows },
        }
    }

    pub fn rows(&self) -> &[BindingRow] {
        &self.results.bindings
    }
}

/// SPARQL endpoint
///
/// `select` answers SELECT queries with JSON bindings; `describe` answers
/// DESCRIBE queries with N3 text (blank-line separated statement blocks).
pub trait SparqlEndpoint {
    fn select(&self, query: &SparqlQuery) -> Result<SparqlResults>;

    fn describe(&self, query: &SparqlQuery) -> Result<String>;
}

impl<T: SparqlEndpoint + ?Sized> SparqlEndpoint for &T {
    fn select(&self, query: &SparqlQuery) -> Result<SparqlResults> {
        (**self).select(query)
    }

    fn describe(&self, query: &SparqlQuery) -> Result<String> {
        (**self).describe(query)
    }
}
