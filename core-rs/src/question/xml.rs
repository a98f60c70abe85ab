//! XML question document model
//!
//! The question is read into a plain element tree first and then normalised
//! into [`QuestionDoc`]. Repeated children always come out as a sequence, so a
//! lone `<edge>` and a list of them go through the same code path.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs;
use std::path::Path;

use crate::errors::{QgError, Result};

/// Extension that marks question input as a file path
pub const QUESTION_EXTENSION: &str = ".xml";

/// Generic XML element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Parse a document and return its root element
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) => stack.push(Self::from_start(&e)?),
                Event::Empty(e) => {
                    let element = Self::from_start(&e)?;
                    Self::attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| QgError::Xml("unbalanced closing tag".to_string()))?;
                    Self::attach(&mut stack, &mut root, element)?;
                }
                Event::Text(t) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&t.unescape()?);
                    }
                }
                Event::CData(c) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(QgError::Xml(format!("unclosed element <{}>", stack[stack.len() - 1].name)));
        }
        root.ok_or_else(|| QgError::Xml("document has no root element".to_string()))
    }

    fn from_start(e: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in e.attributes() {
            let attr = attr.map_err(|err| QgError::Xml(err.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            ..Self::default()
        })
    }

    fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) -> Result<()> {
        match stack.last_mut() {
            Some(parent) => parent.children.push(element),
            None if root.is_none() => *root = Some(element),
            None => return Err(QgError::Xml("multiple root elements".to_string())),
        }
        Ok(())
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Follow a chain of child names
    pub fn path(&self, names: &[&str]) -> Option<&XmlElement> {
        names.iter().try_fold(self, |el, name| el.child(name))
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// One `<edge>` of the query graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeSpec {
    pub id: String,
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

/// One constraint group under `<entrypoints>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrypointSpec {
    /// Element name of the constraint, e.g. `TextJustification`
    pub ep_type: String,
    /// Query variable the constraint anchors
    pub node: String,
    /// Leaf fields other than `node`, in document order
    pub fields: Vec<(String, String)>,
}

/// Normalised question document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDoc {
    pub id: String,
    pub edges: Vec<EdgeSpec>,
    pub entrypoints: Vec<EntrypointSpec>,
}

impl QuestionDoc {
    pub fn parse(xml: &str) -> Result<Self> {
        Self::from_element(&XmlElement::parse(xml)?)
    }

    pub fn from_element(root: &XmlElement) -> Result<Self> {
        if root.name != "query" {
            return Err(QgError::MalformedQuestion(format!(
                "expected <query> root, found <{}>",
                root.name
            )));
        }

        let id = root.attr("id").unwrap_or("unknown").to_string();

        let edges = match root.path(&["graph", "edges"]) {
            Some(edges) => edges
                .children_named("edge")
                .map(Self::edge_from)
                .collect::<Result<Vec<_>>>()?,
            None => Vec::new(),
        };

        let entrypoints = match root.child("entrypoints") {
            Some(eps) => eps
                .children
                .iter()
                .map(Self::entrypoint_from)
                .collect::<Result<Vec<_>>>()?,
            None => Vec::new(),
        };

        Ok(Self { id, edges, entrypoints })
    }

    fn edge_from(edge: &XmlElement) -> Result<EdgeSpec> {
        let id = edge
            .attr("id")
            .ok_or_else(|| QgError::MalformedQuestion("edge without id attribute".to_string()))?;
        let part = |name: &str| {
            edge.child(name).map(|c| c.text.clone()).ok_or_else(|| {
                QgError::MalformedQuestion(format!("edge '{}' has no <{}>", id, name))
            })
        };
        Ok(EdgeSpec {
            id: id.to_string(),
            subject: part("subject")?,
            predicate: part("predicate")?,
            object: part("object")?,
        })
    }

    fn entrypoint_from(constraint: &XmlElement) -> Result<EntrypointSpec> {
        let node = constraint.child("node").map(|n| n.text.clone()).ok_or_else(|| {
            QgError::MalformedQuestion(format!("entrypoint <{}> has no <node>", constraint.name))
        })?;
        let fields = constraint
            .children
            .iter()
            .filter(|c| c.name != "node" && c.is_leaf())
            .map(|c| (c.name.clone(), c.text.clone()))
            .collect();
        Ok(EntrypointSpec {
            ep_type: constraint.name.clone(),
            node,
            fields,
        })
    }
}

/// Resolve question input: a `.xml` path is read from disk, anything else is XML text
pub fn load_question_text(input: &str) -> Result<String> {
    if input.ends_with(QUESTION_EXTENSION) {
        let path = Path::new(input);
        if !path.exists() {
            return Err(QgError::FileNotFound(input.to_string()));
        }
        Ok(fs::read_to_string(path)?)
    } else {
        Ok(input.to_string())
    }
}
