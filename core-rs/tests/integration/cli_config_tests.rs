//! Integration tests for the qgraph CLI and run configuration
//!
//! Runs the built binary against files in a temp directory.

use qgraph_core::{MalformedPolicy, QueryMode, RunConfig};
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const ONTOLOGY: &str = r#"{
    "prefix": {"rdf": "http://www.w3.org/1999/02/22-rdf-syntax-ns#", "aida": "http://aida/#", "ex": "http://example.org/"},
    "predicate": {
        "Attack_Target": {"path": ["ex:Attack_Target"], "domain": "Event", "range": "Entity"},
        "text": {"path": ["ex:text"], "range": "string"}
    }
}"#;

const QUESTION: &str = r#"<query id="Q1">
  <graph><edges>
    <edge id="e1"><subject>?ev</subject><predicate>Attack_Target</predicate><object>?t</object></edge>
  </edges></graph>
  <entrypoints><Statement><node>?t</node><text>hello</text></Statement></entrypoints>
</query>"#;

fn qgraph(dir: &Path, args: &[&str]) -> Output {
    let output = Command::new(env!("CARGO_BIN_EXE_qgraph"))
        .current_dir(dir)
        .args(args)
        .output()
        .expect("Failed to run qgraph");

    if !output.status.success() {
        eprintln!("STDOUT:\n{}", String::from_utf8_lossy(&output.stdout));
        eprintln!("STDERR:\n{}", String::from_utf8_lossy(&output.stderr));
    }
    output
}

fn write_fixtures(dir: &TempDir) {
    fs::write(dir.path().join("ontology.json"), ONTOLOGY).unwrap();
    fs::write(dir.path().join("question.xml"), QUESTION).unwrap();
}

#[test]
fn test_compile_prints_select() {
    let temp_dir = TempDir::new().unwrap();
    write_fixtures(&temp_dir);

    let output = qgraph(
        temp_dir.path(),
        &["compile", "question.xml", "--ontology", "ontology.json", "--check"],
    );
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#>"));
    assert!(stdout.contains("SELECT DISTINCT ?e1 ?ev ?t \nWHERE {"));
    assert!(stdout.contains("?t ex:text \"hello\" ."));
}

#[test]
fn test_compile_construct_to_file() {
    let temp_dir = TempDir::new().unwrap();
    write_fixtures(&temp_dir);

    let output = qgraph(
        temp_dir.path(),
        &["compile", "question.xml", "--ontology", "ontology.json", "--mode", "construct", "--out", "q.rq"],
    );
    assert!(output.status.success());

    let query = fs::read_to_string(temp_dir.path().join("q.rq")).unwrap();
    assert!(query.contains("CONSTRUCT {\n\t?e1 a rdf:Statement ;"));
}

#[test]
fn test_compile_rejects_unknown_mode() {
    let temp_dir = TempDir::new().unwrap();
    write_fixtures(&temp_dir);

    let output = qgraph(
        temp_dir.path(),
        &["compile", "question.xml", "--ontology", "ontology.json", "--mode", "describe"],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid query mode"));
}

#[test]
fn test_compile_mode_from_config() {
    let temp_dir = TempDir::new().unwrap();
    write_fixtures(&temp_dir);
    fs::write(
        temp_dir.path().join("qgraph.yaml"),
        "ontology: ontology.json\nmode: construct\n",
    )
    .unwrap();

    // ./qgraph.yaml picked up, its mode used
    let output = qgraph(temp_dir.path(), &["compile", "question.xml"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("CONSTRUCT {"));

    // --mode wins over the config
    let output = qgraph(temp_dir.path(), &["compile", "question.xml", "--mode", "select"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("SELECT DISTINCT"));
    assert!(!stdout.contains("CONSTRUCT"));
}

#[test]
fn test_compile_explicit_config_path() {
    let temp_dir = TempDir::new().unwrap();
    write_fixtures(&temp_dir);
    let conf = temp_dir.path().join("conf");
    fs::create_dir_all(&conf).unwrap();
    fs::write(conf.join("run.yaml"), "ontology: ../ontology.json\nmode: construct\n").unwrap();

    let output = qgraph(temp_dir.path(), &["compile", "question.xml", "--config", "conf/run.yaml"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("CONSTRUCT {\n\t?e1 a rdf:Statement ;"));
}

#[test]
fn test_compile_without_ontology_fails() {
    let temp_dir = TempDir::new().unwrap();
    write_fixtures(&temp_dir);

    let output = qgraph(temp_dir.path(), &["compile", "question.xml"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no ontology given"));
}

#[test]
fn test_justify_prints_json() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("j.n3"),
        r#"<u1> a aida:TextJustification ; aida:source "doc1" ; aida:confidence [ aida:confidenceValue "0.9" ] ; aida:system <sys1> ."#,
    )
    .unwrap();

    let output = qgraph(temp_dir.path(), &["justify", "j.n3"]);
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"doc1": [{"text_span": {"system_nodeid": "sys1", "confidence": 0.9}}]})
    );
}

#[test]
fn test_check_sparql_file() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("good.rq"), "SELECT * WHERE { ?s ?p ?o }").unwrap();
    fs::write(temp_dir.path().join("bad.rq"), "SELECT WHERE {").unwrap();

    assert!(qgraph(temp_dir.path(), &["check", "good.rq"]).status.success());
    assert!(!qgraph(temp_dir.path(), &["check", "bad.rq"]).status.success());
}

#[test]
fn test_ask_requires_endpoint() {
    let temp_dir = TempDir::new().unwrap();
    write_fixtures(&temp_dir);
    fs::write(temp_dir.path().join("qgraph.yaml"), "ontology: ontology.json\n").unwrap();

    let output = qgraph(temp_dir.path(), &["ask", "question.xml"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no endpoint given"));
}

#[test]
fn test_run_config_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("qgraph.yaml");

    let mut config = RunConfig::new(temp_dir.path().join("ontology.json"));
    config.endpoint = Some("http://localhost:3030/kb/query".to_string());
    config.xml_mapping = Some(temp_dir.path().join("xml_mapping.json"));
    config.mode = QueryMode::Construct;
    config.on_malformed_justification = MalformedPolicy::Skip;
    config.save(&path).unwrap();

    let loaded = RunConfig::load_from_dir(temp_dir.path()).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_run_config_relative_paths() {
    let temp_dir = TempDir::new().unwrap();
    let nested = temp_dir.path().join("conf");
    fs::create_dir_all(&nested).unwrap();
    fs::write(
        nested.join("qgraph.yaml"),
        "ontology: ../ontology.json\nxmlMapping: mapping.json\n",
    )
    .unwrap();

    let config = RunConfig::load(nested.join("qgraph.yaml")).unwrap();
    assert_eq!(config.ontology, nested.join("../ontology.json"));
    assert_eq!(config.xml_mapping, Some(nested.join("mapping.json")));
}
