//! Response XML assembly
//!
//! ```xml
//! <queryresponses id="Q1">
//!     <response>
//!         <edge id="?e1">
//!             <justifications>
//!                 <justification id="doc1">
//!                     <edge_justification>...</edge_justification>
//!                     <subject_justification>...</subject_justification>
//!                 </justification>
//!             </justifications>
//!         </edge>
//!     </response>
//! </queryresponses>
//! ```
//!
//! A single `<response>` holds every edge.

use indexmap::IndexMap;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::grouping::GroupedResults;
use super::justification::{FieldValue, SpanEntry};
use crate::errors::{QgError, Result};
use crate::question::EdgeIndex;

const ROLES: [&str; 3] = ["edge", "subject", "object"];

/// document id -> role -> span entries, in first-seen order
type ByDocument<'a> = IndexMap<&'a str, IndexMap<&'static str, Vec<&'a SpanEntry>>>;

struct XmlOut {
    writer: Writer<Vec<u8>>,
}

impl XmlOut {
    fn new() -> Self {
        Self {
            writer: Writer::new_with_indent(Vec::new(), b'\t', 1),
        }
    }

    fn decl(&mut self) -> Result<()> {
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", None, None)))?;
        Ok(())
    }

    fn open(&mut self, name: &str, id: Option<&str>) -> Result<()> {
        let mut start = BytesStart::new(name);
        if let Some(id) = id {
            start.push_attribute(("id", id));
        }
        self.writer.write_event(Event::Start(start))?;
        Ok(())
    }

    fn close(&mut self, name: &str) -> Result<()> {
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    fn empty(&mut self, name: &str) -> Result<()> {
        self.writer.write_event(Event::Empty(BytesStart::new(name)))?;
        Ok(())
    }

    fn leaf(&mut self, name: &str, text: &str) -> Result<()> {
        if text.is_empty() {
            return self.empty(name);
        }
        self.open(name, None)?;
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        self.close(name)
    }

    fn value(&mut self, name: &str, value: &FieldValue) -> Result<()> {
        match value {
            FieldValue::Node(children) if children.is_empty() => self.empty(name),
            FieldValue::Node(children) => {
                self.open(name, None)?;
                for (child, v) in children {
                    self.value(child, v)?;
                }
                self.close(name)
            }
            other => self.leaf(name, &other.render().unwrap_or_default()),
        }
    }

    fn span(&mut self, entry: &SpanEntry) -> Result<()> {
        self.value(&entry.span_type, &FieldValue::Node(entry.fields.clone()))
    }

    fn finish(self) -> Result<String> {
        String::from_utf8(self.writer.into_inner()).map_err(|e| QgError::Xml(e.to_string()))
    }
}

/// Collect every role's span entries for one edge, keyed by document id
fn collect_by_document<'a>(
    edge: &str,
    (subject, object): (&str, &str),
    results: &'a GroupedResults,
) -> Result<ByDocument<'a>> {
    let mut by_doc = ByDocument::new();

    for (role, var) in ROLES.iter().zip([edge, subject, object]) {
        let key = var.trim_start_matches('?');
        let grouped = results
            .get(key)
            .ok_or_else(|| QgError::MissingBinding(key.to_string()))?;

        for record in &grouped.justifications {
            for (doc_id, entries) in record.iter() {
                by_doc
                    .entry(doc_id)
                    .or_default()
                    .entry(*role)
                    .or_default()
                    .extend(entries.iter());
            }
        }
    }

    Ok(by_doc)
}

/// Render grouped justifications as the response document
///
/// Every edge's own variable, subject and object must be present in
/// `results`; a missing one is [`QgError::MissingBinding`].
pub fn to_xml(question_id: &str, results: &GroupedResults, edges: &EdgeIndex) -> Result<String> {
    let mut out = XmlOut::new();
    out.decl()?;
    out.open("queryresponses", Some(question_id))?;

    if edges.is_empty() {
        out.empty("response")?;
    } else {
        out.open("response", None)?;
        for (edge, (subject, object)) in edges {
            let by_doc = collect_by_document(edge, (subject.as_str(), object.as_str()), results)?;

            out.open("edge", Some(edge.as_str()))?;
            if by_doc.is_empty() {
                out.empty("justifications")?;
            } else {
                out.open("justifications", None)?;
                for (doc_id, roles) in &by_doc {
                    out.open("justification", Some(*doc_id))?;
                    for (role, entries) in roles {
                        let tag = format!("{}_justification", role);
                        out.open(&tag, None)?;
                        for entry in entries {
                            out.span(entry)?;
                        }
                        out.close(&tag)?;
                    }
                    out.close("justification")?;
                }
                out.close("justifications")?;
            }
            out.close("edge")?;
        }
        out.close("response")?;
    }

    out.close("queryresponses")?;
    out.finish()
}
