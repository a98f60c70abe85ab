//! Integration tests for the question -> SPARQL -> response pipeline
//!
//! Tests the full flow against an in-memory endpoint:
//! - Loading mappings and questions from files
//! - SELECT + one DESCRIBE per bound URI
//! - Response XML grouping
//! - Malformed justification policies

use qgraph_core::{
    BindingRow, BindingValue, FieldMapping, MalformedPolicy, OntologyMapping, QgError, Question,
    ResponseTranslator, SparqlEndpoint, SparqlQuery, SparqlResults,
};
use qgraph_core::question::XmlElement;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use tempfile::TempDir;

const ONTOLOGY: &str = r#"{
    "prefix": {
        "rdf": "http://www.w3.org/1999/02/22-rdf-syntax-ns#",
        "aida": "https://tac.nist.gov/tracks/SM-KBP/2018/ontologies/InterchangeOntology#",
        "ldcOnt": "https://tac.nist.gov/tracks/SM-KBP/2018/ontologies/SeedlingOntology#"
    },
    "predicate": {
        "Conflict.Attack_Attacker": {"path": ["ldcOnt:Conflict.Attack_Attacker"], "domain": "Entity", "range": "Entity"},
        "Conflict.Attack_Place": {"path": ["ldcOnt:Conflict.Attack_Place"], "domain": "Event", "range": "Entity"},
        "source": {"path": ["aida:justifiedBy", "aida:source"], "range": "string"},
        "start_offset": {"path": ["aida:justifiedBy", "aida:startOffset"], "range": "number"},
        "end_offset": {"path": ["aida:justifiedBy", "aida:endOffsetInclusive"], "range": "number"}
    },
    "class": {"TextJustification": {"path": "aida:TextJustification"}}
}"#;

const XML_MAPPING: &str = r#"{
    "source": "source",
    "startOffset": "start_offset",
    "endOffsetInclusive": "end_offset_inclusive"
}"#;

const QUESTION: &str = r#"<?xml version="1.0"?>
<query id="GRAPH_QUERY_1">
  <graph>
    <edges>
      <edge id="AIDA_EDGE_1">
        <subject>?attacker</subject>
        <predicate>Conflict.Attack_Attacker</predicate>
        <object>?attack</object>
      </edge>
      <edge id="AIDA_EDGE_2">
        <subject>?attack</subject>
        <predicate>Conflict.Attack_Place</predicate>
        <object>?place</object>
      </edge>
    </edges>
  </graph>
  <entrypoints>
    <TextJustification>
      <node>?place</node>
      <source>HC000ZUW7</source>
      <start_offset>10</start_offset>
      <end_offset>20</end_offset>
    </TextJustification>
  </entrypoints>
</query>"#;

fn justification(source: &str, start: u32, confidence: &str) -> String {
    format!(
        r#"@prefix aida: <https://tac.nist.gov/tracks/SM-KBP/2018/ontologies/InterchangeOntology#> .
@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .

<http://ex/j/{source}/{start}> a aida:TextJustification ;
    aida:confidence [ a aida:Confidence ;
            aida:confidenceValue "{confidence}"^^xsd:double ;
            aida:system <http://ex/system> ] ;
    aida:endOffsetInclusive {end} ;
    aida:privateData "{{}}" ;
    aida:source "{source}" ;
    aida:startOffset {start} ;
    aida:system <http://ex/system> .
"#,
        source = source,
        start = start,
        end = start + 5,
        confidence = confidence
    )
}

/// In-memory endpoint recording every query it receives
struct RecordingEndpoint {
    rows: Vec<BindingRow>,
    describe: HashMap<String, String>,
    log: RefCell<Vec<String>>,
}

impl RecordingEndpoint {
    fn new(rows: Vec<BindingRow>) -> Self {
        Self {
            rows,
            describe: HashMap::new(),
            log: RefCell::new(Vec::new()),
        }
    }

    fn justify(mut self, uri: &str, n3: String) -> Self {
        self.describe.insert(uri.to_string(), n3);
        self
    }
}

impl SparqlEndpoint for RecordingEndpoint {
    fn select(&self, query: &SparqlQuery) -> qgraph_core::Result<SparqlResults> {
        self.log.borrow_mut().push(query.to_string());
        Ok(SparqlResults::from_rows(self.rows.clone()))
    }

    fn describe(&self, query: &SparqlQuery) -> qgraph_core::Result<String> {
        self.log.borrow_mut().push(query.to_string());
        let text = query.as_str();
        let uri = self
            .describe
            .keys()
            .find(|uri| text.contains(&format!("<{}>", uri)))
            .ok_or_else(|| QgError::Endpoint(format!("no canned DESCRIBE for {}", text)))?;
        Ok(self.describe[uri].clone())
    }
}

fn row(values: &[(&str, &str)]) -> BindingRow {
    values
        .iter()
        .map(|(k, v)| (k.to_string(), BindingValue::uri(*v)))
        .collect()
}

fn endpoint() -> RecordingEndpoint {
    RecordingEndpoint::new(vec![row(&[
        ("AIDA_EDGE_1", "http://ex/rel1"),
        ("AIDA_EDGE_2", "http://ex/rel2"),
        ("attacker", "http://ex/ent1"),
        ("attack", "http://ex/evt1"),
        ("place", "http://ex/ent2"),
    ])])
    .justify("http://ex/rel1", justification("HC000ZUW7", 100, "1.0"))
    .justify("http://ex/rel2", justification("HC000ZUW7", 200, "0.8"))
    .justify("http://ex/ent1", justification("HC000ZUW7", 110, "0.9"))
    .justify("http://ex/evt1", justification("HC000T6GU", 10, "0.7"))
    .justify("http://ex/ent2", justification("HC000ZUW7", 10, "1.0"))
}

fn load_fixtures(dir: &TempDir) -> (OntologyMapping, FieldMapping, Question) {
    let ont_path = dir.path().join("ontology.json");
    let mapping_path = dir.path().join("xml_mapping.json");
    let question_path = dir.path().join("question.xml");
    fs::write(&ont_path, ONTOLOGY).unwrap();
    fs::write(&mapping_path, XML_MAPPING).unwrap();
    fs::write(&question_path, QUESTION).unwrap();

    let ont = OntologyMapping::try_load(&ont_path).unwrap();
    let mapping = FieldMapping::load(&mapping_path).unwrap();
    let question = Question::from_source(&ont, question_path.to_str().unwrap()).unwrap();
    (ont, mapping, question)
}

#[test]
fn test_complete_ask_pipeline() {
    let temp_dir = TempDir::new().unwrap();
    let (_, mapping, question) = load_fixtures(&temp_dir);
    let endpoint = endpoint();

    // 1. Ask
    let xml = ResponseTranslator::new(mapping).ask(&question, &endpoint).unwrap();

    // 2. One SELECT then one DESCRIBE per bound URI, sharing the question's prefixes
    let log = endpoint.log.borrow();
    assert_eq!(log.len(), 6);
    assert!(log[0].contains("SELECT DISTINCT ?AIDA_EDGE_1 ?AIDA_EDGE_2 ?attack ?attacker ?place"));
    for describe in &log[1..] {
        assert!(describe.starts_with(&question.prefix_block()));
        assert!(describe.contains("DESCRIBE ?j WHERE {"));
    }

    // 3. Response shape
    let root = XmlElement::parse(&xml).unwrap();
    assert_eq!(root.attr("id"), Some("GRAPH_QUERY_1"));
    let response = root.child("response").unwrap();
    let edges: Vec<_> = response.children_named("edge").collect();
    assert_eq!(edges.len(), 2);
    assert_eq!(edges[0].attr("id"), Some("?AIDA_EDGE_1"));
    assert_eq!(edges[1].attr("id"), Some("?AIDA_EDGE_2"));

    // Edge 1: edge + subject cite HC000ZUW7, object cites HC000T6GU
    let docs: Vec<_> = edges[0]
        .child("justifications")
        .unwrap()
        .children_named("justification")
        .collect();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].attr("id"), Some("HC000ZUW7"));
    let roles: Vec<&str> = docs[0].children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(roles, vec!["edge_justification", "subject_justification"]);
    assert_eq!(docs[1].attr("id"), Some("HC000T6GU"));
    assert!(docs[1].child("object_justification").is_some());

    // 4. Span fields renamed through the XML mapping, privateData dropped
    let span = docs[0].path(&["edge_justification", "text_span"]).unwrap();
    let fields: Vec<&str> = span.children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        fields,
        vec!["system_nodeid", "confidence", "end_offset_inclusive", "source", "start_offset"]
    );
    assert_eq!(span.child("confidence").unwrap().text, "1.0");
    assert_eq!(span.child("start_offset").unwrap().text, "100");
    assert_eq!(span.child("system_nodeid").unwrap().text, "http://ex/system");
}

#[test]
fn test_compiled_select_is_valid_sparql() {
    let temp_dir = TempDir::new().unwrap();
    let (_, _, question) = load_fixtures(&temp_dir);

    let query = question.serialize(qgraph_core::QueryMode::Select);
    query.check_syntax().unwrap();
    assert!(query.as_str().contains("?place aida:justifiedBy ?place_var0 ."));
    assert!(query.as_str().contains("\t\t a aida:TextJustification ."));
}

#[test]
fn test_malformed_justification_policies() {
    let temp_dir = TempDir::new().unwrap();
    let (_, mapping, question) = load_fixtures(&temp_dir);

    let broken = || {
        let mut e = endpoint();
        e.describe
            .insert("http://ex/evt1".to_string(), "<j> aida:source \"x\" .".to_string());
        e
    };

    // Default policy aborts
    let err = ResponseTranslator::new(mapping.clone())
        .ask(&question, &broken())
        .unwrap_err();
    assert!(matches!(err, QgError::Justification(_)));

    // Skip keeps the other justifications
    let xml = ResponseTranslator::new(mapping)
        .with_policy(MalformedPolicy::Skip)
        .ask(&question, &broken())
        .unwrap();
    assert!(!xml.contains("HC000T6GU"));
    assert!(xml.contains("HC000ZUW7"));
}

#[test]
fn test_endpoint_failure_propagates() {
    let temp_dir = TempDir::new().unwrap();
    let (_, mapping, question) = load_fixtures(&temp_dir);

    let endpoint = RecordingEndpoint::new(vec![row(&[
        ("AIDA_EDGE_1", "http://ex/unknown"),
    ])]);
    let err = ResponseTranslator::new(mapping)
        .with_policy(MalformedPolicy::Skip)
        .ask(&question, &endpoint)
        .unwrap_err();
    assert!(matches!(err, QgError::Endpoint(_)));
}

#[test]
fn test_unusable_ontology_degrades_to_empty() {
    let temp_dir = TempDir::new().unwrap();
    let bad = temp_dir.path().join("broken.json");
    fs::write(&bad, "{ not json").unwrap();

    let ont = OntologyMapping::load(&bad);
    assert!(ont.is_empty());

    // Edges cannot compile without their predicates
    let err = Question::new(&ont, QUESTION).unwrap_err();
    assert!(matches!(err, QgError::UnknownPredicate(_)));
}
