//! Response translator
//!
//! Runs a compiled question against an endpoint and turns the bindings into
//! the grouped justification XML. The transport is passed in per call; the
//! translator itself only holds the field mapping and the malformed-input
//! policy.

use tracing::info;

use crate::drivers::{BindingRow, SparqlEndpoint};
use crate::errors::Result;
use crate::ontology::{FieldMapping, QueryMode, SparqlQuery};
use crate::question::{EdgeIndex, Question};
use crate::response::{
    group_justifications, parse_justification, to_xml, GroupedResults, JustificationRecord,
    MalformedPolicy,
};

/// Fetch the N3 description of everything `uri` is justified by
///
/// `prefix_block` must declare `aida:`; it is normally the PREFIX header of
/// the question the URI was bound by.
pub fn fetch_justification(endpoint: &dyn SparqlEndpoint, prefix_block: &str, uri: &str) -> Result<String> {
    endpoint.describe(&SparqlQuery::describe_justification(prefix_block, uri))
}

#[derive(Debug, Clone, Default)]
pub struct ResponseTranslator {
    xml_mapping: FieldMapping,
    policy: MalformedPolicy,
}

impl ResponseTranslator {
    pub fn new(xml_mapping: FieldMapping) -> Self {
        Self {
            xml_mapping,
            policy: MalformedPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: MalformedPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn xml_mapping(&self) -> &FieldMapping {
        &self.xml_mapping
    }

    pub fn policy(&self) -> MalformedPolicy {
        self.policy
    }

    pub fn parse_justification(&self, n3: &str) -> Result<JustificationRecord> {
        Ok(parse_justification(n3, &self.xml_mapping)?)
    }

    pub fn group_justifications<F>(&self, bindings: &[BindingRow], fetch: F) -> Result<GroupedResults>
    where
        F: FnMut(&str) -> Result<String>,
    {
        group_justifications(bindings, &self.xml_mapping, self.policy, fetch)
    }

    pub fn to_xml(&self, question_id: &str, results: &GroupedResults, edges: &EdgeIndex) -> Result<String> {
        to_xml(question_id, results, edges)
    }

    /// SELECT the question, fetch justifications for every bound URI and
    /// assemble the response document
    pub fn ask(&self, question: &Question, endpoint: &dyn SparqlEndpoint) -> Result<String> {
        let prefix = question.prefix_block();
        let query = question.serialize(QueryMode::Select);

        let results = endpoint.select(&query)?;
        info!(
            question = %question.question_id(),
            rows = results.rows().len(),
            "query answered"
        );

        let grouped = self.group_justifications(results.rows(), |uri| {
            fetch_justification(endpoint, &prefix, uri)
        })?;

        self.to_xml(question.question_id(), &grouped, question.edges())
    }
}
