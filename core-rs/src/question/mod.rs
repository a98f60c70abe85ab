/**
 * question module
 *
 * - xml: question document model and single-or-sequence normalisation
 * - triples: ordered triple groups
 * - compiler: edges/entrypoints -> triple groups via the ontology mapping
 * - serializer: SPARQL text rendering
 */

pub mod compiler;
pub mod serializer;
pub mod triples;
pub mod xml;

use indexmap::IndexMap;
use std::collections::BTreeSet;
use tracing::info;

pub use compiler::{Compiler, EdgeIndex, EntrypointIndex};
pub use serializer::Serializer;
pub use triples::{TripleGroup, TripleSet};
pub use xml::{load_question_text, EdgeSpec, EntrypointSpec, QuestionDoc, XmlElement};

use crate::errors::Result;
use crate::ontology::{OntologyMapping, QueryMode, SparqlQuery};

/// Compiled query graph
///
/// Immutable once built; serialising it any number of times gives the same text.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    question_id: String,
    prefix: IndexMap<String, String>,
    edges: EdgeIndex,
    edge_triples: TripleSet,
    entrypoints: EntrypointIndex,
}

impl Question {
    /// Compile XML question text
    pub fn new(ont: &OntologyMapping, xml: &str) -> Result<Self> {
        Self::from_doc(ont, &QuestionDoc::parse(xml)?)
    }

    /// Compile from a `.xml` path or literal XML text
    pub fn from_source(ont: &OntologyMapping, input: &str) -> Result<Self> {
        Self::new(ont, &load_question_text(input)?)
    }

    pub fn from_doc(ont: &OntologyMapping, doc: &QuestionDoc) -> Result<Self> {
        let compiler = Compiler::new(ont);
        let (edge_triples, edges) = compiler.parse_edges(&doc.edges)?;
        let entrypoints = compiler.parse_entrypoints(&doc.entrypoints)?;

        info!(
            question = %doc.id,
            edges = edges.len(),
            nodes = entrypoints.len(),
            "compiled question"
        );

        Ok(Self {
            question_id: doc.id.clone(),
            prefix: ont.prefix.clone(),
            edges,
            edge_triples,
            entrypoints,
        })
    }

    pub fn question_id(&self) -> &str {
        &self.question_id
    }

    pub fn edges(&self) -> &EdgeIndex {
        &self.edges
    }

    pub fn prefix(&self) -> &IndexMap<String, String> {
        &self.prefix
    }

    pub fn edge_triples(&self) -> &TripleSet {
        &self.edge_triples
    }

    pub fn entrypoints(&self) -> &EntrypointIndex {
        &self.entrypoints
    }

    /// Rendered `PREFIX` header
    pub fn prefix_block(&self) -> String {
        Serializer::prefix(&self.prefix)
    }

    /// Every edge variable with its subject and object
    pub fn variables(&self) -> BTreeSet<String> {
        self.edges
            .iter()
            .flat_map(|(edge, (s, o))| [edge.clone(), s.clone(), o.clone()])
            .collect()
    }

    /// One UNION block per node, covering all of its constraint groups
    pub fn entrypoint_clauses(&self) -> String {
        self.entrypoints
            .values()
            .map(|by_type| {
                let clauses: Vec<String> = by_type
                    .values()
                    .flatten()
                    .map(Serializer::triples)
                    .collect();
                Serializer::union(&clauses)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn serialize(&self, mode: QueryMode) -> SparqlQuery {
        SparqlQuery::new(Serializer::sparql(
            &self.prefix_block(),
            &Serializer::triples(&self.edge_triples),
            &self.entrypoint_clauses(),
            mode,
            &self.variables(),
        ))
    }
}

/// Compile XML question text straight to SPARQL
pub fn compile(ont: &OntologyMapping, xml: &str, mode: QueryMode) -> Result<SparqlQuery> {
    Ok(Question::new(ont, xml)?.serialize(mode))
}
