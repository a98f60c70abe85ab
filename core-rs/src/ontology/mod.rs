/**
 * ontology module
 *
 * - mapping: ontology mapping (prefixes, predicates, classes) and the
 *   justification field-to-tag mapping
 * - query: SPARQL query text, output modes and syntax checking
 */

pub mod mapping;
pub mod query;

pub use mapping::{ClassDef, FieldMapping, OntologyMapping, PredicateDef, RangeKind, SplitTarget, ENTITY};
pub use query::{QueryMode, SparqlQuery};
