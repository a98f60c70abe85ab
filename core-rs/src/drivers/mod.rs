//! Drivers module for SPARQL transport
//!
//! Provides the SparqlEndpoint trait, the SELECT results model and:
//! - HttpEndpoint: SPARQL 1.1 protocol over HTTP

mod http;
mod traits;

pub use http::{HttpEndpoint, DEFAULT_TIMEOUT_SECS};
pub use traits::{
    BindingRow, BindingValue, ResultBindings, ResultsHead, SparqlEndpoint, SparqlResults,
    SPARQL_RESULTS_JSON, TEXT_N3,
};
