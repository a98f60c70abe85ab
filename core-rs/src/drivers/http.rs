//! HttpEndpoint for SPARQL 1.1 protocol endpoints
//!
//! Queries are POSTed form-encoded (`query=...`); the Accept header picks
//! JSON results for SELECT and N3 for DESCRIBE.

use reqwest::blocking::{Client, Response};
use reqwest::header::ACCEPT;
use std::time::Duration;
use tracing::debug;

use super::traits::{SparqlEndpoint, SparqlResults, SPARQL_RESULTS_JSON, TEXT_N3};
use crate::errors::{QgError, Result};
use crate::ontology::SparqlQuery;

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// HTTP transport for a single SPARQL endpoint
#[derive(Debug, Clone)]
pub struct HttpEndpoint {
    url: String,
    client: Client,
    auth_token: Option<String>,
}

impl HttpEndpoint {
    /// Create an endpoint with the default timeout
    ///
    /// # Example
    ///
    /// ```
    /// use qgraph_core::drivers::HttpEndpoint;
    ///
    /// let endpoint = HttpEndpoint::new("http://localhost:3030/ds/query").unwrap();
    /// assert_eq!(endpoint.url(), "http://localhost:3030/ds/query");
    /// ```
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let url = url.into();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(QgError::ValidationError(format!(
                "Endpoint URL must be http(s): {}",
                url
            )));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url,
            client,
            auth_token: None,
        })
    }

    /// Add a bearer token
    ///
    /// # Example
    ///
    /// ```
    /// use qgraph_core::drivers::HttpEndpoint;
    ///
    /// let endpoint = HttpEndpoint::new("https://kb.example.org/sparql")
    ///     .unwrap()
    ///     .with_auth("token123".to_string());
    /// ```
    pub fn with_auth(mut self, token: String) -> Self {
        self.auth_token = Some(token);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn post(&self, query: &SparqlQuery, accept: &str) -> Result<Response> {
        debug!(url = %self.url, accept, "sending SPARQL query");

        let mut request = self
            .client
            .post(&self.url)
            .header(ACCEPT, accept)
            .form(&[("query", query.as_str())]);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(QgError::Endpoint(format!(
                "{} returned {}: {}",
                self.url,
                status,
                body.trim()
            )));
        }
        Ok(response)
    }
}

impl SparqlEndpoint for HttpEndpoint {
    fn select(&self, query: &SparqlQuery) -> Result<SparqlResults> {
        Ok(self.post(query, SPARQL_RESULTS_JSON)?.json::<SparqlResults>()?)
    }

    fn describe(&self, query: &SparqlQuery) -> Result<String> {
        Ok(self.post(query, TEXT_N3)?.text()?)
    }
}
