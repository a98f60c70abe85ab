//! Ontology mapping loader
//!
//! Maps question vocabulary (predicate names, class names, prefixes) onto
//! SPARQL terms. The mapping is trusted as-is: nothing here checks that the
//! referenced URIs exist in the target graph.
//!
//! ```json
//! {
//!   "prefix":    { "aida": "https://tac.nist.gov/tracks/SM-KBP/2018/ontologies/InterchangeOntology#" },
//!   "predicate": { "Attack_Attacker": { "path": ["ldcOnt:Conflict.Attack_Attacker"],
//!                                       "domain": "Entity", "range": "Entity" } },
//!   "class":     { "TextJustification": { "path": "aida:TextJustification" } }
//! }
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::errors::{QgError, Result};

/// Domain/range label marking an entity-to-entity relation
pub const ENTITY: &str = "Entity";

/// Complete ontology mapping document
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct OntologyMapping {
    #[serde(default)]
    pub prefix: IndexMap<String, String>,
    #[serde(default)]
    pub predicate: IndexMap<String, PredicateDef>,
    #[serde(default)]
    pub class: IndexMap<String, ClassDef>,
}

/// Predicate definition
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct PredicateDef {
    /// URI segments walked from the subject to the value
    #[serde(default)]
    pub path: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    /// Reify a one-segment path as an rdf:Statement
    #[serde(default)]
    pub statement: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub splitter: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub split_to: Vec<SplitTarget>,
}

/// Sub-predicate a split value is bound through
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum SplitTarget {
    /// Name looked up in the `predicate` section
    Name(String),
    /// Definition given in place
    Inline(PredicateDef),
}

/// Class definition
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ClassDef {
    #[serde(default)]
    pub path: String,
}

/// How an entrypoint value is turned into a SPARQL object term
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeKind {
    /// Quoted string literal
    Literal,
    /// Class name resolved through `class.<value>.path`
    Uri,
    /// Emitted unchanged (`number` and anything unrecognised)
    PassThrough,
}

impl PredicateDef {
    /// First path segment, used as the predicate of a reified statement
    pub fn head(&self) -> Option<&str> {
        self.path.first().map(String::as_str)
    }

    pub fn range_kind(&self) -> RangeKind {
        match self.range.as_deref() {
            Some("string") => RangeKind::Literal,
            Some("uri") => RangeKind::Uri,
            _ => RangeKind::PassThrough,
        }
    }

    /// Both ends are entities, so the edge itself is a reified relation
    pub fn is_entity_relation(&self) -> bool {
        self.domain.as_deref() == Some(ENTITY) && self.range.as_deref() == Some(ENTITY)
    }
}

impl OntologyMapping {
    /// Load a mapping, substituting an empty one when the file is unusable
    ///
    /// Failure is logged rather than raised; lookups against the empty mapping
    /// then come back `None` and each call site decides how to react.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(mapping) => mapping,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load ontology mapping, using empty mapping");
                Self::default()
            }
        }
    }

    /// Load a mapping, surfacing any IO or JSON error
    pub fn try_load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(QgError::FileNotFound(path.to_string_lossy().to_string()));
        }
        let content = fs::read_to_string(path)?;
        let mapping = Self::from_json_str(&content)?;
        debug!(
            path = %path.display(),
            predicates = mapping.predicate.len(),
            classes = mapping.class.len(),
            "loaded ontology mapping"
        );
        Ok(mapping)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn is_empty(&self) -> bool {
        self.prefix.is_empty() && self.predicate.is_empty() && self.class.is_empty()
    }

    pub fn predicate(&self, name: &str) -> Option<&PredicateDef> {
        self.predicate.get(name)
    }

    pub fn class_path(&self, name: &str) -> Option<&str> {
        self.class
            .get(name)
            .map(|c| c.path.as_str())
            .filter(|p| !p.is_empty())
    }

    /// Resolve one `split_to` entry against this mapping
    ///
    /// A name missing from the `predicate` section becomes a one-segment path
    /// carrying the parent's range.
    pub fn resolve_split_target<'a>(
        &'a self,
        target: &'a SplitTarget,
        parent: &PredicateDef,
    ) -> Cow<'a, PredicateDef> {
        match target {
            SplitTarget::Inline(def) => Cow::Borrowed(def),
            SplitTarget::Name(name) => match self.predicate(name) {
                Some(def) => Cow::Borrowed(def),
                None => Cow::Owned(PredicateDef {
                    path: vec![name.clone()],
                    range: parent.range.clone(),
                    ..PredicateDef::default()
                }),
            },
        }
    }
}

/// Justification field name -> response XML tag name
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(transparent)]
pub struct FieldMapping(pub IndexMap<String, String>);

impl FieldMapping {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(QgError::FileNotFound(path.to_string_lossy().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn tag_for(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldMapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
