//! SPARQL text rendering
//!
//! Layout is fixed: compiling the same question twice must give the same
//! bytes, and the rendered text is what downstream tooling diffs against.

use indexmap::IndexMap;
use std::collections::BTreeSet;

use super::triples::{TripleGroup, TripleSet};
use crate::ontology::QueryMode;

pub struct Serializer;

impl Serializer {
    /// Render every group of a set
    ///
    /// ```text
    /// ?e a rdf:Statement ;
    /// 		 rdf:subject ?n1 ;
    /// 		 rdf:object ?n2 .
    /// ```
    pub fn triples(set: &TripleSet) -> String {
        set.iter()
            .map(|(subject, group)| match group {
                TripleGroup::Raw(clause) => clause.clone(),
                TripleGroup::Pairs(pairs) => Self::group(subject, pairs),
            })
            .collect::<Vec<_>>()
            .join("\n\t")
    }

    fn group(subject: &str, pairs: &[(String, String)]) -> String {
        let last = pairs.len().saturating_sub(1);
        pairs
            .iter()
            .enumerate()
            .map(|(i, (p, o))| {
                let lead = if i == 0 { subject } else { "\t\t" };
                let end = if i < last { ";" } else { "." };
                format!("{} {} {} {}", lead, p, o, end)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn prefix(prefix: &IndexMap<String, String>) -> String {
        prefix
            .iter()
            .map(|(name, uri)| format!("PREFIX {}: <{}>", name, uri))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn union(clauses: &[String]) -> String {
        format!("\t{{\n\t{}\n\t}}", clauses.join("\n\t}\n\tUNION\n\t{\n\t"))
    }

    pub fn sparql(
        prefix: &str,
        edges: &str,
        others: &str,
        mode: QueryMode,
        variables: &BTreeSet<String>,
    ) -> String {
        match mode {
            QueryMode::Construct => format!(
                "{}\n\nCONSTRUCT {{\n\t{}\n}}\nWHERE {{\n\t{}\n\n{}\n}}",
                prefix, edges, edges, others
            ),
            QueryMode::Select => format!(
                "{}\n\nSELECT DISTINCT {} \nWHERE {{\n\t{}\n\n{}\n}}",
                prefix,
                variables.iter().map(String::as_str).collect::<Vec<_>>().join(" "),
                edges,
                others
            ),
        }
    }
}
