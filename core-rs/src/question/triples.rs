//! Ordered triple groups
//!
//! A [`TripleSet`] maps a subject term to the predicate/object pairs hanging
//! off it. Keys starting with `@` hold raw clause text (a FILTER) instead.
//! Insertion order is kept so rendering is stable.

use indexmap::IndexMap;

/// Key prefix for raw clause entries
pub const RAW_KEY_PREFIX: char = '@';

/// Key of the per-set FILTER clause; later edges overwrite earlier ones
pub const FILTER_KEY: &str = "@filter";

pub type Pair = (String, String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TripleGroup {
    Pairs(Vec<Pair>),
    Raw(String),
}

impl TripleGroup {
    pub fn pairs(&self) -> &[Pair] {
        match self {
            TripleGroup::Pairs(pairs) => pairs,
            TripleGroup::Raw(_) => &[],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripleSet {
    groups: IndexMap<String, TripleGroup>,
}

impl TripleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `(p, o)` under subject `s`
    pub fn add(&mut self, s: impl Into<String>, p: impl Into<String>, o: impl Into<String>) {
        let pair = (p.into(), o.into());
        let group = self
            .groups
            .entry(s.into())
            .or_insert_with(|| TripleGroup::Pairs(Vec::new()));
        if let TripleGroup::Pairs(pairs) = group {
            pairs.push(pair);
        } else {
            *group = TripleGroup::Pairs(vec![pair]);
        }
    }

    /// Replace the whole group under `s`, keeping its existing position
    pub fn set_group(&mut self, s: impl Into<String>, pairs: Vec<Pair>) {
        self.groups.insert(s.into(), TripleGroup::Pairs(pairs));
    }

    /// Store raw clause text, e.g. under [`FILTER_KEY`]
    pub fn set_raw(&mut self, key: impl Into<String>, clause: impl Into<String>) {
        self.groups.insert(key.into(), TripleGroup::Raw(clause.into()));
    }

    /// Merge another set in, appending pairs to shared subjects
    pub fn extend(&mut self, other: TripleSet) {
        for (key, group) in other.groups {
            match group {
                TripleGroup::Pairs(pairs) => {
                    for (p, o) in pairs {
                        self.add(key.clone(), p, o);
                    }
                }
                TripleGroup::Raw(clause) => self.set_raw(key, clause),
            }
        }
    }

    pub fn get(&self, s: &str) -> Option<&TripleGroup> {
        self.groups.get(s)
    }

    pub fn pairs(&self, s: &str) -> &[Pair] {
        self.groups.get(s).map(TripleGroup::pairs).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &TripleGroup)> {
        self.groups.iter()
    }

    pub fn subjects(&self) -> impl Iterator<Item = &String> {
        self.groups.keys()
    }

    /// Number of triple groups, raw clauses excluded
    pub fn group_count(&self) -> usize {
        self.groups
            .values()
            .filter(|g| matches!(g, TripleGroup::Pairs(_)))
            .count()
    }

    pub fn raw_count(&self) -> usize {
        self.groups.len() - self.group_count()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// `a rdf:Statement ; rdf:subject s ; rdf:predicate p ; rdf:object o`
pub fn statement(s: &str, p: &str, o: &str) -> Vec<Pair> {
    vec![
        ("a".to_string(), "rdf:Statement".to_string()),
        ("rdf:subject".to_string(), s.to_string()),
        ("rdf:predicate".to_string(), p.to_string()),
        ("rdf:object".to_string(), o.to_string()),
    ]
}
