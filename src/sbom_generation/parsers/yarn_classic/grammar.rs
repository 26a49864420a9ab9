//! The yarn v1 `yarn.lock` syntax.
//!
//! An indentation-structured format, two spaces per level:
//!
//! ```text
//! # yarn lockfile v1
//!
//! "@babel/code-frame@^7.0.0", "@babel/code-frame@^7.22.13":
//!   version "7.22.13"
//!   dependencies:
//!     chalk "^2.4.2"
//! ```
//!
//! Keys may be quoted or bare and comma-joined. A `key value` or
//! `key: value` line is a scalar pair; `key:` alone opens a nested block.
//! Bare strings must start with a letter, `/`, `.` or `-`; bare numbers are
//! digits only. Anything else is a syntax error.

use std::collections::BTreeMap;

const INDENT_WIDTH: usize = 2;

/// A value in a yarn v1 document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YarnValue {
    String(String),
    Bool(bool),
    Number(u64),
    Map(BTreeMap<String, YarnValue>),
}

impl YarnValue {
    /// Scalar values rendered as text.
    pub fn as_text(&self) -> Option<String> {
        match self {
            YarnValue::String(s) => Some(s.clone()),
            YarnValue::Bool(b) => Some(b.to_string()),
            YarnValue::Number(n) => Some(n.to_string()),
            YarnValue::Map(_) => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, YarnValue>> {
        match self {
            YarnValue::Map(map) => Some(map),
            _ => None,
        }
    }
}

/// One top-level block: the descriptors on its header line and its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YarnEntry {
    pub descriptors: Vec<String>,
    pub value: YarnValue,
}

impl YarnEntry {
    pub fn fields(&self) -> Option<&BTreeMap<String, YarnValue>> {
        self.value.as_map()
    }

    pub fn field_text(&self, key: &str) -> Option<String> {
        self.fields()?.get(key)?.as_text()
    }

    pub fn has_descriptor(&self, descriptor: &str) -> bool {
        self.descriptors.iter().any(|d| d == descriptor)
    }
}

/// A parsed `yarn.lock` in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct YarnLockDocument {
    pub entries: Vec<YarnEntry>,
}

impl YarnLockDocument {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|entry| entry.has_descriptor(key))
    }
}

/// A syntax error with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {message}")]
pub struct GrammarError {
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Str(String),
    Bool(bool),
    Number(u64),
    Colon,
    Comma,
}

#[derive(Debug)]
struct Line {
    number: usize,
    depth: usize,
    tokens: Vec<Token>,
}

/// Parses a whole yarn v1 document.
pub fn parse(content: &str) -> Result<YarnLockDocument, GrammarError> {
    let lines = tokenize(content)?;
    let mut pos = 0;
    let mut entries = Vec::new();

    while pos < lines.len() {
        let line = &lines[pos];
        if line.depth != 0 {
            return Err(error(line.number, "unexpected indentation"));
        }
        pos += 1;

        let (keys, value) = parse_line(line, &lines, &mut pos)?;
        let descriptors = keys
            .iter()
            .flat_map(|key| key.split(','))
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .collect();
        entries.push(YarnEntry { descriptors, value });
    }

    Ok(YarnLockDocument { entries })
}

fn parse_block(lines: &[Line], pos: &mut usize, depth: usize) -> Result<YarnValue, GrammarError> {
    let mut map = BTreeMap::new();

    while let Some(line) = lines.get(*pos) {
        if line.depth < depth {
            break;
        }
        if line.depth > depth {
            return Err(error(line.number, "unexpected indentation"));
        }
        *pos += 1;

        let (keys, value) = parse_line(line, lines, pos)?;
        for key in keys {
            map.insert(key, value.clone());
        }
    }

    Ok(YarnValue::Map(map))
}

fn parse_line(
    line: &Line,
    lines: &[Line],
    pos: &mut usize,
) -> Result<(Vec<String>, YarnValue), GrammarError> {
    let mut tokens = line.tokens.iter().peekable();
    let mut keys = Vec::new();

    loop {
        match tokens.next() {
            Some(Token::Str(key)) => keys.push(key.clone()),
            Some(Token::Bool(b)) => keys.push(b.to_string()),
            Some(Token::Number(n)) => keys.push(n.to_string()),
            _ => return Err(error(line.number, "expected a key")),
        }
        if tokens.peek() == Some(&&Token::Comma) {
            tokens.next();
        } else {
            break;
        }
    }

    let had_colon = tokens.peek() == Some(&&Token::Colon);
    if had_colon {
        tokens.next();
    }

    let value = match tokens.next() {
        Some(Token::Str(s)) => YarnValue::String(s.clone()),
        Some(Token::Bool(b)) => YarnValue::Bool(*b),
        Some(Token::Number(n)) => YarnValue::Number(*n),
        Some(_) => return Err(error(line.number, "unexpected punctuation")),
        None if had_colon => {
            let nested = lines
                .get(*pos)
                .is_some_and(|next| next.depth > line.depth);
            if nested {
                parse_block(lines, pos, line.depth + 1)?
            } else {
                YarnValue::Map(BTreeMap::new())
            }
        }
        None => return Err(error(line.number, "expected a value or `:`")),
    };

    if tokens.next().is_some() {
        return Err(error(line.number, "unexpected trailing tokens"));
    }

    Ok((keys, value))
}

fn tokenize(content: &str) -> Result<Vec<Line>, GrammarError> {
    let mut lines = Vec::new();

    for (index, raw) in content.lines().enumerate() {
        let number = index + 1;
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        let body = raw.trim_start_matches(' ');
        if body.is_empty() || body.starts_with('#') {
            continue;
        }
        if body.starts_with('\t') {
            return Err(error(number, "tabs are not valid indentation"));
        }

        let indent = raw.len() - body.len();
        if indent % INDENT_WIDTH != 0 {
            return Err(error(number, "indentation is not a multiple of two spaces"));
        }

        let tokens = tokenize_line(body, number)?;
        if !tokens.is_empty() {
            lines.push(Line {
                number,
                depth: indent / INDENT_WIDTH,
                tokens,
            });
        }
    }

    Ok(lines)
}

fn tokenize_line(body: &str, number: usize) -> Result<Vec<Token>, GrammarError> {
    let mut tokens = Vec::new();
    let mut rest = body;

    loop {
        rest = rest.trim_start_matches(' ');
        let Some(first) = rest.chars().next() else {
            break;
        };

        let consumed = match first {
            '#' => break,
            ':' => {
                tokens.push(Token::Colon);
                1
            }
            ',' => {
                tokens.push(Token::Comma);
                1
            }
            '"' => {
                let (value, len) = quoted_string(rest, number)?;
                tokens.push(Token::Str(value));
                len
            }
            c if c.is_ascii_digit() => {
                let len = rest
                    .find(|c: char| !c.is_ascii_digit())
                    .unwrap_or(rest.len());
                let digits = &rest[..len];
                if rest[len..].starts_with(|c: char| !matches!(c, ' ' | ':' | ',')) {
                    return Err(error(number, format!("invalid number near `{}`", rest)));
                }
                let value = digits
                    .parse()
                    .map_err(|_| error(number, format!("number out of range: {}", digits)))?;
                tokens.push(Token::Number(value));
                len
            }
            c if c.is_ascii_alphabetic() || matches!(c, '/' | '.' | '-') => {
                let len = rest
                    .find([':', ' ', ','])
                    .unwrap_or(rest.len());
                let word = &rest[..len];
                tokens.push(match word {
                    "true" => Token::Bool(true),
                    "false" => Token::Bool(false),
                    _ => Token::Str(word.to_string()),
                });
                len
            }
            other => {
                return Err(error(number, format!("invalid character `{}`", other)));
            }
        };

        rest = &rest[consumed..];
    }

    Ok(tokens)
}

/// Reads a `"..."` string with JSON escapes, returning it and its byte length.
fn quoted_string(input: &str, number: usize) -> Result<(String, usize), GrammarError> {
    let mut escaped = false;
    for (offset, c) in input.char_indices().skip(1) {
        match c {
            '\\' if !escaped => escaped = true,
            '"' if !escaped => {
                let literal = &input[..=offset];
                let value = serde_json::from_str::<String>(literal)
                    .map_err(|e| error(number, format!("invalid string escape: {}", e)))?;
                return Ok((value, offset + 1));
            }
            _ => escaped = false,
        }
    }
    Err(error(number, "unterminated string"))
}

fn error(line: usize, message: impl Into<String>) -> GrammarError {
    GrammarError {
        line,
        message: message.into(),
    }
}
