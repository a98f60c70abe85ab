//! Query-graph compiler
//!
//! Turns normalised edges and entrypoint constraints into triple groups using
//! the ontology mapping. Edges always become reified statements; entrypoint
//! fields become predicate chains hanging off the constrained node.

use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use regex::Regex;
use std::collections::HashMap;
use tracing::debug;

use super::triples::{statement, TripleSet, FILTER_KEY};
use super::xml::{EdgeSpec, EntrypointSpec};
use crate::errors::{QgError, Result};
use crate::ontology::{OntologyMapping, PredicateDef, RangeKind};

pub const JUSTIFIED_BY: &str = "aida:justifiedBy";
pub const ENTITY_RELATION: &str = "aida:Relation";

static UNSAFE_VAR_CHARS: OnceCell<Regex> = OnceCell::new();

/// Edge variable (`?<id>`) -> (subject, object)
pub type EdgeIndex = IndexMap<String, (String, String)>;

/// node -> entrypoint type -> constraint groups
pub type EntrypointIndex = IndexMap<String, IndexMap<String, Vec<TripleSet>>>;

/// Path segment -> chain variable already created for it
type ChainCache = HashMap<String, String>;

pub struct Compiler<'a> {
    ont: &'a OntologyMapping,
}

impl<'a> Compiler<'a> {
    pub fn new(ont: &'a OntologyMapping) -> Self {
        Self { ont }
    }

    /// Compile query-graph edges into reified statements
    ///
    /// Entity-to-entity predicates make the edge variable an `aida:Relation`
    /// with three role statements plus a FILTER pinning the role helpers. Only
    /// the last edge's FILTER survives in the returned set.
    pub fn parse_edges(&self, edges: &[EdgeSpec]) -> Result<(TripleSet, EdgeIndex)> {
        let mut triples = TripleSet::new();
        let mut index = EdgeIndex::new();

        for edge in edges {
            let def = self
                .ont
                .predicate(&edge.predicate)
                .ok_or_else(|| QgError::UnknownPredicate(edge.predicate.clone()))?;
            let predicate = def.head().ok_or_else(|| {
                QgError::UnknownPredicate(format!("{} (empty path)", edge.predicate))
            })?;

            let super_edge = format!("?{}", edge.id);
            index.insert(super_edge.clone(), (edge.subject.clone(), edge.object.clone()));

            if def.is_entity_relation() {
                let ps = format!("{}_ps", super_edge);
                let po = format!("{}_po", super_edge);
                triples.set_group(
                    super_edge.clone(),
                    vec![("a".to_string(), ENTITY_RELATION.to_string())],
                );
                triples.set_group(
                    format!("{}_s", super_edge),
                    statement(&super_edge, &ps, &edge.subject),
                );
                triples.set_group(
                    format!("{}_p", super_edge),
                    statement(&super_edge, "rdf:type", predicate),
                );
                triples.set_group(
                    format!("{}_o", super_edge),
                    statement(&super_edge, &po, &edge.object),
                );
                triples.set_raw(
                    FILTER_KEY,
                    format!(
                        "FILTER(REGEX(STR({}), \"subject$\") && REGEX(STR({}), \"object$\"))",
                        ps, po
                    ),
                );
            } else {
                triples.set_group(
                    super_edge.clone(),
                    statement(&edge.subject, predicate, &edge.object),
                );
            }

            debug!(
                edge = %super_edge,
                predicate = %predicate,
                relation = def.is_entity_relation(),
                "compiled edge"
            );
        }

        Ok((triples, index))
    }

    /// Group constraint groups by node, then by entrypoint type
    ///
    /// Types are visited in order of first appearance, each with all of its
    /// constraint elements, so interleaved types group the same as adjacent ones.
    pub fn parse_entrypoints(&self, entrypoints: &[EntrypointSpec]) -> Result<EntrypointIndex> {
        let mut by_type: IndexMap<&str, Vec<&EntrypointSpec>> = IndexMap::new();
        for ep in entrypoints {
            by_type.entry(ep.ep_type.as_str()).or_default().push(ep);
        }

        let mut index = EntrypointIndex::new();
        for (ep_type, group) in by_type {
            for ep in group {
                let triples = self.parse_entrypoint(ep)?;
                index
                    .entry(ep.node.clone())
                    .or_default()
                    .entry(ep_type.to_string())
                    .or_default()
                    .push(triples);
            }
        }
        Ok(index)
    }

    /// Compile one constraint group
    ///
    /// Fields without a predicate mapping are skipped. When the entrypoint type
    /// names a class and a field walked through `aida:justifiedBy`, the
    /// justification node is typed with that class.
    pub fn parse_entrypoint(&self, ep: &EntrypointSpec) -> Result<TripleSet> {
        let mut triples = TripleSet::new();
        let mut exists = ChainCache::new();
        let subject = ep.node.as_str();

        for (field, value) in &ep.fields {
            let Some(def) = self.ont.predicate(field) else {
                debug!(field = %field, ep_type = %ep.ep_type, "no predicate mapping, skipping field");
                continue;
            };

            match def.splitter.as_deref() {
                Some("") => {
                    return Err(QgError::ValidationError(format!(
                        "predicate '{}' has an empty splitter",
                        field
                    )))
                }
                Some(splitter) => {
                    for (target, part) in def.split_to.iter().zip(value.split(splitter)) {
                        let sub = self.ont.resolve_split_target(target, def);
                        self.parse_triple(subject, &sub, part, &mut exists, &mut triples)?;
                    }
                }
                None => self.parse_triple(subject, def, value, &mut exists, &mut triples)?,
            }
        }

        if let (Some(class_path), Some(target)) =
            (self.ont.class_path(&ep.ep_type), exists.get(JUSTIFIED_BY))
        {
            triples.add(target.clone(), "a", class_path);
        }

        Ok(triples)
    }

    /// Bind `value` to `subject` through a predicate definition
    ///
    /// A one-segment `statement` predicate is reified under
    /// `<subject>_var_<predicate>`. Otherwise the path is walked, creating
    /// `<subject>_var<i>` for each inner segment; `exists` makes later fields
    /// sharing a segment reuse its variable.
    pub fn parse_triple(
        &self,
        subject: &str,
        def: &PredicateDef,
        value: &str,
        exists: &mut HashMap<String, String>,
        triples: &mut TripleSet,
    ) -> Result<()> {
        let object = self.resolve_range(def, value)?;

        if def.statement && def.path.len() == 1 {
            let predicate = &def.path[0];
            let node = format!("{}_var_{}", subject, sanitize(predicate)?);
            for (p, o) in statement(subject, predicate, &object) {
                triples.add(node.clone(), p, o);
            }
            return Ok(());
        }

        let mut s = subject.to_string();
        let last = def.path.len().saturating_sub(1);
        for (i, segment) in def.path.iter().enumerate() {
            if i < last {
                if let Some(var) = exists.get(segment) {
                    s = var.clone();
                } else {
                    let var = format!("{}_var{}", s, i);
                    triples.add(s.clone(), segment.clone(), var.clone());
                    exists.insert(segment.clone(), var.clone());
                    s = var;
                }
            } else {
                triples.add(s.clone(), segment.clone(), object.clone());
            }
        }
        Ok(())
    }

    fn resolve_range(&self, def: &PredicateDef, value: &str) -> Result<String> {
        match def.range_kind() {
            RangeKind::Literal => Ok(format!("\"{}\"", escape_literal(value))),
            RangeKind::Uri => self
                .ont
                .class_path(value)
                .map(str::to_string)
                .ok_or_else(|| QgError::UnknownClass(value.to_string())),
            RangeKind::PassThrough => Ok(value.to_string()),
        }
    }
}

/// Make a predicate usable inside a variable name
fn sanitize(term: &str) -> Result<String> {
    let re = UNSAFE_VAR_CHARS.get_or_try_init(|| Regex::new(r"[^A-Za-z0-9_]"))?;
    Ok(re.replace_all(term, "_").into_owned())
}

fn escape_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
