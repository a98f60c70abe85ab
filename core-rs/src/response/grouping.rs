//! Group result bindings by variable
//!
//! Every URI bound to a variable gets its justifications fetched and parsed;
//! literal bindings only register the variable.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::justification::{parse_justification, JustificationRecord};
use crate::drivers::BindingRow;
use crate::errors::Result;
use crate::ontology::FieldMapping;

/// What to do when one justification document cannot be parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Abort the whole response
    #[default]
    Propagate,
    /// Log and keep an empty record in its place
    Skip,
}

/// Everything collected for one result variable
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupedVariable {
    pub label: String,
    /// Bound URIs, one per row that bound this variable to a URI
    pub uris: Vec<String>,
    /// Parsed justifications, parallel to `uris`
    pub justifications: Vec<JustificationRecord>,
}

impl GroupedVariable {
    fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            ..Default::default()
        }
    }
}

/// Variable name (no `?`) -> grouped URIs and justifications
pub type GroupedResults = IndexMap<String, GroupedVariable>;

/// Group bindings, fetching N3 justification text for each URI through `fetch`
///
/// `fetch` receives the bare URI and returns the DESCRIBE output for it.
/// Transport failures always propagate; parse failures follow `policy`.
pub fn group_justifications<F>(
    bindings: &[BindingRow],
    mapping: &FieldMapping,
    policy: MalformedPolicy,
    mut fetch: F,
) -> Result<GroupedResults>
where
    F: FnMut(&str) -> Result<String>,
{
    let mut grouped = GroupedResults::new();

    for row in bindings {
        for (var, value) in row {
            let entry = grouped
                .entry(var.clone())
                .or_insert_with(|| GroupedVariable::new(var));

            if !value.is_uri() {
                continue;
            }

            let text = fetch(&value.value)?;
            let record = match parse_justification(&text, mapping) {
                Ok(record) => record,
                Err(e) if policy == MalformedPolicy::Skip => {
                    warn!(uri = %value.value, error = %e, "skipping malformed justification");
                    JustificationRecord::new()
                }
                Err(e) => return Err(e.into()),
            };

            debug!(var = %var, uri = %value.value, sources = record.len(), "justification parsed");
            entry.uris.push(value.value.clone());
            entry.justifications.push(record);
        }
    }

    Ok(grouped)
}
