//! Integration tests for HttpEndpoint
//!
//! Each test serves one canned HTTP response from a listener on an
//! ephemeral local port and returns the raw request it received.

use qgraph_core::{HttpEndpoint, QgError, SparqlEndpoint, SparqlQuery};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use std::time::Duration;

fn serve_once(status: &str, content_type: &str, body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/sparql", listener.local_addr().unwrap());
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        content_type,
        body.len(),
        body
    );

    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream);

        let mut head = String::new();
        let mut content_length = 0;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            if let Some((name, value)) = line.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().unwrap();
                }
            }
            head.push_str(&line);
            if line == "\r\n" || line.is_empty() {
                break;
            }
        }
        let mut body = vec![0u8; content_length];
        reader.read_exact(&mut body).unwrap();

        let mut stream = reader.into_inner();
        stream.write_all(response.as_bytes()).unwrap();
        stream.flush().unwrap();

        head + &String::from_utf8(body).unwrap()
    });

    (url, handle)
}

fn endpoint(url: String) -> HttpEndpoint {
    HttpEndpoint::with_timeout(url, Duration::from_secs(10)).unwrap()
}

#[test]
fn test_select_parses_results() {
    let results = r#"{
        "head": {"vars": ["e1", "doc"]},
        "results": {"bindings": [
            {"e1": {"type": "uri", "value": "http://ex/e1"}, "doc": {"type": "literal", "value": "doc1"}}
        ]}
    }"#;
    let (url, server) = serve_once("200 OK", "application/sparql-results+json", results);

    let parsed = endpoint(url)
        .select(&SparqlQuery::new("SELECT * WHERE { ?s ?p ?o }"))
        .unwrap();
    let request = server.join().unwrap();

    assert_eq!(parsed.rows().len(), 1);
    assert!(parsed.rows()[0]["e1"].is_uri());
    assert_eq!(parsed.rows()[0]["doc"].value, "doc1");

    let lower = request.to_ascii_lowercase();
    assert!(request.starts_with("POST /sparql HTTP/1.1\r\n"));
    assert!(lower.contains("accept: application/sparql-results+json\r\n"));
    assert!(lower.contains("content-type: application/x-www-form-urlencoded"));
    assert!(request.contains("\r\n\r\nquery=SELECT"));
}

#[test]
fn test_describe_returns_text() {
    let n3 = "<http://ex/j1> aida:source \"doc1\" .\n";
    let (url, server) = serve_once("200 OK", "text/n3", n3);

    let text = endpoint(url)
        .with_auth("token123".to_string())
        .describe(&SparqlQuery::new("DESCRIBE <http://ex/j1>"))
        .unwrap();
    let request = server.join().unwrap().to_ascii_lowercase();

    assert_eq!(text, n3);
    assert!(request.contains("accept: text/n3, text/turtle;q=0.9\r\n"));
    assert!(request.contains("authorization: bearer token123\r\n"));
}

/// Test: a non-success status surfaces as an Endpoint error carrying status and body
#[test]
fn test_error_status_is_endpoint_error() {
    let (url, server) = serve_once("500 Internal Server Error", "text/plain", "boom\n");

    let err = endpoint(url.clone())
        .select(&SparqlQuery::new("SELECT * WHERE { ?s ?p ?o }"))
        .unwrap_err();
    server.join().unwrap();

    match err {
        QgError::Endpoint(msg) => {
            assert!(msg.starts_with(&url));
            assert!(msg.contains("500"));
            assert!(msg.ends_with(": boom"));
        }
        other => panic!("Expected Endpoint error, got {:?}", other),
    }
}
