//! N3 statement reader
//!
//! Covers the subset a DESCRIBE of justification nodes produces: one subject
//! per statement, `;`/`,` separated predicate-object lists, and anonymous
//! `[ ... ]` nodes one level deep. An empty `[]` subject is accepted as an
//! anonymous subject (stored as `[]`). Collections and nested anonymous nodes
//! are rejected.
//!
//! Tokenizing is separate from parsing so a statement reads the same whether
//! it is spread over several lines or packed onto one.

use indexmap::IndexMap;

use super::JustificationError;

type ParseResult<T> = std::result::Result<T, JustificationError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `<...>`, brackets kept
    Iri(String),
    /// Quoted literal, lexical form only (datatype and language dropped)
    Literal(String),
    /// Prefixed name, keyword or bare number
    Name(String),
    OpenNode,
    CloseNode,
    Semicolon,
    Comma,
    Dot,
}

/// Object of a predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum N3Value {
    Term(String),
    Node(IndexMap<String, String>),
}

impl N3Value {
    pub fn as_term(&self) -> Option<&str> {
        match self {
            N3Value::Term(t) => Some(t),
            N3Value::Node(_) => None,
        }
    }

    pub fn as_node(&self) -> Option<&IndexMap<String, String>> {
        match self {
            N3Value::Node(n) => Some(n),
            N3Value::Term(_) => None,
        }
    }
}

/// One subject with its properties, keyed by predicate local name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct N3Statement {
    pub subject: String,
    pub properties: IndexMap<String, N3Value>,
}

/// Local part of a predicate or class term
///
/// `aida:source` -> `source`, `<http://x/o#source>` -> `source`, `a` -> `a`
pub fn local_name(term: &str) -> &str {
    if let Some(iri) = term.strip_prefix('<').and_then(|t| t.strip_suffix('>')) {
        return iri.rsplit(|c| c == '#' || c == '/').next().unwrap_or(iri);
    }
    term.rsplit(':').next().unwrap_or(term)
}

pub fn tokenize(text: &str) -> ParseResult<Vec<Token>> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '#' => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '<' => {
                let start = i + 1;
                let end = (start..chars.len())
                    .find(|&j| chars[j] == '>')
                    .ok_or_else(|| JustificationError::Malformed("unterminated IRI".to_string()))?;
                tokens.push(Token::Iri(format!("<{}>", chars[start..end].iter().collect::<String>())));
                i = end + 1;
            }
            '"' | '\'' => {
                let (lexical, next) = read_literal(&chars, i)?;
                tokens.push(Token::Literal(lexical));
                i = skip_literal_suffix(&chars, next)?;
            }
            '[' => {
                tokens.push(Token::OpenNode);
                i += 1;
            }
            ']' => {
                tokens.push(Token::CloseNode);
                i += 1;
            }
            ';' => {
                tokens.push(Token::Semicolon);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            '.' if ends_word(&chars, i + 1) => {
                tokens.push(Token::Dot);
                i += 1;
            }
            '(' | ')' => {
                return Err(JustificationError::Malformed("collections are not supported".to_string()))
            }
            _ => {
                let start = i;
                while i < chars.len() && !is_delimiter(chars[i]) {
                    if chars[i] == '.' && ends_word(&chars, i + 1) {
                        break;
                    }
                    i += 1;
                }
                tokens.push(Token::Name(chars[start..i].iter().collect()));
            }
        }
    }

    Ok(tokens)
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, ';' | ',' | '[' | ']' | '(' | ')' | '<' | '"')
}

/// A `.` at `i - 1` terminates a statement when nothing word-like follows
fn ends_word(chars: &[char], i: usize) -> bool {
    i >= chars.len() || is_delimiter(chars[i]) || chars[i] == '#'
}

/// Read a quoted literal starting at `start`; returns lexical form and next index
fn read_literal(chars: &[char], start: usize) -> ParseResult<(String, usize)> {
    let quote = chars[start];
    let long = start + 2 < chars.len() && chars[start + 1] == quote && chars[start + 2] == quote;
    let mut i = if long { start + 3 } else { start + 1 };
    let mut out = String::new();

    while i < chars.len() {
        let c = chars[i];
        if c == '\\' && i + 1 < chars.len() {
            match chars[i + 1] {
                'u' => {
                    out.push(read_unicode_escape(chars, i + 2, 4)?);
                    i += 6;
                }
                'U' => {
                    out.push(read_unicode_escape(chars, i + 2, 8)?);
                    i += 10;
                }
                other => {
                    out.push(match other {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        'b' => '\u{8}',
                        'f' => '\u{c}',
                        other => other,
                    });
                    i += 2;
                }
            }
            continue;
        }
        if c == quote {
            if !long {
                return Ok((out, i + 1));
            }
            if i + 2 < chars.len() && chars[i + 1] == quote && chars[i + 2] == quote {
                return Ok((out, i + 3));
            }
        }
        if c == '\n' && !long {
            break;
        }
        out.push(c);
        i += 1;
    }

    Err(JustificationError::Malformed("unterminated literal".to_string()))
}

/// Decode the `len` hex digits of a `\u`/`\U` escape starting at `start`
fn read_unicode_escape(chars: &[char], start: usize, len: usize) -> ParseResult<char> {
    let digits: String = chars.get(start..start + len).unwrap_or_default().iter().collect();
    if digits.len() != len {
        return Err(JustificationError::Malformed("truncated unicode escape".to_string()));
    }
    u32::from_str_radix(&digits, 16)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| JustificationError::Malformed(format!("invalid unicode escape \\{}", digits)))
}

/// Skip `^^<type>`, `^^prefix:type` or `@lang` after a literal
fn skip_literal_suffix(chars: &[char], mut i: usize) -> ParseResult<usize> {
    if i + 1 < chars.len() && chars[i] == '^' && chars[i + 1] == '^' {
        i += 2;
        if i < chars.len() && chars[i] == '<' {
            while i < chars.len() && chars[i] != '>' {
                i += 1;
            }
            if i == chars.len() {
                return Err(JustificationError::Malformed("unterminated datatype IRI".to_string()));
            }
            return Ok(i + 1);
        }
    } else if i < chars.len() && chars[i] == '@' {
        i += 1;
    } else {
        return Ok(i);
    }
    while i < chars.len() && !is_delimiter(chars[i]) && !(chars[i] == '.' && ends_word(chars, i + 1)) {
        i += 1;
    }
    Ok(i)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    Subject,
    /// `[` seen in subject position, `]` must follow
    AnonSubject,
    Predicate,
    Object,
    Separator,
}

/// Where objects are currently being written
enum Scope {
    TopLevel,
    InsideNode {
        predicate: String,
        node: IndexMap<String, String>,
    },
}

struct StatementParser {
    expect: Expect,
    scope: Scope,
    subject: Option<String>,
    predicate: Option<String>,
    properties: IndexMap<String, N3Value>,
    statements: Vec<N3Statement>,
    skipping_directive: bool,
}

impl StatementParser {
    fn new() -> Self {
        Self {
            expect: Expect::Subject,
            scope: Scope::TopLevel,
            subject: None,
            predicate: None,
            properties: IndexMap::new(),
            statements: Vec::new(),
            skipping_directive: false,
        }
    }

    fn feed(&mut self, token: Token) -> ParseResult<()> {
        if self.skipping_directive {
            if token == Token::Dot {
                self.skipping_directive = false;
            }
            return Ok(());
        }

        match (self.expect, token) {
            (Expect::Subject, Token::Name(n)) if n.starts_with('@') => {
                self.skipping_directive = true;
            }
            (Expect::Subject, Token::OpenNode) => self.expect = Expect::AnonSubject,
            (Expect::AnonSubject, Token::CloseNode) => {
                self.subject = Some("[]".to_string());
                self.expect = Expect::Predicate;
            }
            (Expect::Subject, Token::Iri(s)) | (Expect::Subject, Token::Name(s)) => {
                self.subject = Some(s);
                self.expect = Expect::Predicate;
            }
            (Expect::Predicate, Token::Iri(p)) | (Expect::Predicate, Token::Name(p)) => {
                self.predicate = Some(local_name(&p).to_string());
                self.expect = Expect::Object;
            }
            // trailing `;` before the end of a node or statement
            (Expect::Predicate, Token::CloseNode) => self.close_node()?,
            (Expect::Predicate, Token::Dot) => self.finish()?,
            (Expect::Object, Token::Iri(o))
            | (Expect::Object, Token::Name(o))
            | (Expect::Object, Token::Literal(o)) => {
                self.assign(o)?;
                self.expect = Expect::Separator;
            }
            (Expect::Object, Token::OpenNode) => {
                if matches!(self.scope, Scope::InsideNode { .. }) {
                    return Err(JustificationError::Malformed(
                        "nested anonymous node inside anonymous node".to_string(),
                    ));
                }
                let predicate = self.take_predicate()?;
                self.scope = Scope::InsideNode {
                    predicate,
                    node: IndexMap::new(),
                };
                self.expect = Expect::Predicate;
            }
            (Expect::Separator, Token::Semicolon) => self.expect = Expect::Predicate,
            (Expect::Separator, Token::Comma) => self.expect = Expect::Object,
            (Expect::Separator, Token::CloseNode) => self.close_node()?,
            (Expect::Separator, Token::Dot) => self.finish()?,
            (expect, token) => {
                return Err(JustificationError::Malformed(format!(
                    "unexpected {:?} while expecting {:?}",
                    token, expect
                )))
            }
        }
        Ok(())
    }

    fn take_predicate(&mut self) -> ParseResult<String> {
        self.predicate
            .clone()
            .ok_or_else(|| JustificationError::Malformed("object without predicate".to_string()))
    }

    fn assign(&mut self, object: String) -> ParseResult<()> {
        let predicate = self.take_predicate()?;
        match &mut self.scope {
            Scope::TopLevel => {
                self.properties.insert(predicate, N3Value::Term(object));
            }
            Scope::InsideNode { node, .. } => {
                node.insert(predicate, object);
            }
        }
        Ok(())
    }

    fn close_node(&mut self) -> ParseResult<()> {
        match std::mem::replace(&mut self.scope, Scope::TopLevel) {
            Scope::InsideNode { predicate, node } => {
                self.properties.insert(predicate.clone(), N3Value::Node(node));
                self.predicate = Some(predicate);
                self.expect = Expect::Separator;
                Ok(())
            }
            Scope::TopLevel => Err(JustificationError::Malformed("unbalanced ']'".to_string())),
        }
    }

    fn finish(&mut self) -> ParseResult<()> {
        if matches!(self.scope, Scope::InsideNode { .. }) {
            return Err(JustificationError::Malformed("statement ended inside anonymous node".to_string()));
        }
        let subject = self
            .subject
            .take()
            .ok_or_else(|| JustificationError::Malformed("statement without subject".to_string()))?;
        self.statements.push(N3Statement {
            subject,
            properties: std::mem::take(&mut self.properties),
        });
        self.predicate = None;
        self.expect = Expect::Subject;
        Ok(())
    }

    fn end(mut self) -> ParseResult<Vec<N3Statement>> {
        match (self.expect, &self.scope) {
            (Expect::Subject, _) => {}
            // lenient about a missing final `.`
            (Expect::Separator, Scope::TopLevel) | (Expect::Predicate, Scope::TopLevel)
                if !self.properties.is_empty() =>
            {
                self.finish()?
            }
            _ => {
                return Err(JustificationError::Malformed(
                    "input ended in the middle of a statement".to_string(),
                ))
            }
        }
        Ok(self.statements)
    }
}

/// Parse N3 text into statements, skipping `@prefix`/`@base` directives
pub fn parse_statements(text: &str) -> ParseResult<Vec<N3Statement>> {
    let mut parser = StatementParser::new();
    for token in tokenize(text)? {
        parser.feed(token)?;
    }
    parser.end()
}
