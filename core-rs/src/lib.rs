//! # QGraph Core - XML query graphs to SPARQL and back
//!
//! Compiles XML query-graph questions into SPARQL using a JSON ontology
//! mapping, and translates SPARQL results plus the N3 justifications of every
//! bound URI into a grouped XML response.
//!
//! ## Pipeline
//!
//! ```text
//!  question.xml ──► Question ──► SPARQL SELECT ──► endpoint
//!                     │                              │
//!                     │ edges              bindings  ▼
//!                     │                    DESCRIBE justifications (N3)
//!                     ▼                              │
//!               response.xml ◄── to_xml ◄── group_justifications
//! ```
//!
//! ## Example
//!
//! ```
//! use qgraph_core::{compile, OntologyMapping, QueryMode};
//!
//! let ont = OntologyMapping::from_json_str(r#"{
//!     "prefix": {"rdf": "http://www.w3.org/1999/02/22-rdf-syntax-ns#", "ldc": "http://ldc/#"},
//!     "predicate": {"Attack_Target": {"path": ["ldc:Attack_Target"], "domain": "Event", "range": "Entity"}}
//! }"#).unwrap();
//!
//! let query = compile(&ont, r#"<query id="Q1"><graph><edges>
//!     <edge id="e1"><subject>?ev</subject><predicate>Attack_Target</predicate><object>?t</object></edge>
//! </edges></graph></query>"#, QueryMode::Select).unwrap();
//!
//! assert!(query.as_str().contains("SELECT DISTINCT ?e1 ?ev ?t"));
//! ```

pub mod config;
pub mod drivers;
pub mod errors;
pub mod ontology;
pub mod question;
pub mod response;
pub mod translator;

pub use config::RunConfig;
pub use drivers::{BindingRow, BindingValue, HttpEndpoint, SparqlEndpoint, SparqlResults};
pub use errors::{QgError, Result};
pub use ontology::{FieldMapping, OntologyMapping, PredicateDef, QueryMode, SparqlQuery};
pub use question::{compile, EdgeIndex, Question, QuestionDoc, TripleSet};
pub use response::{
    parse_justification, to_xml, GroupedResults, JustificationError, JustificationRecord,
    MalformedPolicy, SpanEntry,
};
pub use translator::{fetch_justification, ResponseTranslator};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
