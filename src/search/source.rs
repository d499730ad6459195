//! # Source decoding
//!
//! Turns on-disk search data into [`SourceRecord`]s. Two formats are read:
//!
//! - Doxygen `search/all_*.js` files, which declare `var searchData = [...]`
//!   as a JavaScript array literal of single-quoted strings and integers
//! - a JSON array of `{"key", "targets": [{"label", "url", "context"}]}`
//!
//! A Doxygen record looks like
//! `['addkey_5',['addKey',['../classmongo_1_1IndexSpec.html#a1',1,'mongo::IndexSpec']]]`:
//! a key carrying a `_<n>` counter suffix, then the label followed by one
//! `[url, local, context]` array per anchor.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::search::config::MAX_NESTING_DEPTH;
use crate::search::entry::{SourceRecord, SourceTarget};
use crate::search::error::MalformedDataError;
use crate::search::index::SearchIndex;

/// On-disk representation of a search data file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    SearchData,
    Json,
}

impl SourceFormat {
    /// Pick a format from the file extension, defaulting to Doxygen JS
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::SearchData,
        }
    }

    pub fn decode(self, text: &str) -> Result<Vec<SourceRecord>, MalformedDataError> {
        match self {
            Self::SearchData => parse_search_data(text),
            Self::Json => parse_json_records(text),
        }
    }
}

/// Read every file in order and load the concatenated records as one index
///
/// Errors found while building the index name the file and the record's
/// position within that file.
pub fn load_files(paths: &[PathBuf]) -> Result<SearchIndex> {
    let mut records = Vec::new();
    let mut starts: Vec<(usize, &Path)> = Vec::with_capacity(paths.len());
    for path in paths {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read search data: {}", path.display()))?;
        let decoded = SourceFormat::from_path(path)
            .decode(&text)
            .with_context(|| format!("Malformed search data in {}", path.display()))?;
        tracing::debug!("Decoded {} records from {}", decoded.len(), path.display());
        starts.push((records.len(), path.as_path()));
        records.extend(decoded);
    }

    SearchIndex::load(records).map_err(|err| {
        let origin = err.record().and_then(|record| {
            starts
                .iter()
                .rev()
                .find(|(start, _)| *start <= record)
                .map(|&(start, path)| (record - start, path))
        });
        match origin {
            Some((local, path)) => anyhow::Error::new(err.with_record(local))
                .context(format!("Malformed search data in {}", path.display())),
            None => anyhow::Error::new(err).context("Failed to build search index"),
        }
    })
}

/// Decode a JSON record array
pub fn parse_json_records(text: &str) -> Result<Vec<SourceRecord>, MalformedDataError> {
    serde_json::from_str(text).map_err(|e| {
        MalformedDataError::syntax(offset_of(text, e.line(), e.column()), e.to_string())
    })
}

/// Byte offset of a 1-based line/column pair as reported by serde_json
fn offset_of(text: &str, line: usize, column: usize) -> usize {
    let line_start: usize = text
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(text.len())
}

/// Decode a Doxygen `searchData` file
pub fn parse_search_data(text: &str) -> Result<Vec<SourceRecord>, MalformedDataError> {
    let mut parser = Parser::new(text);
    let value = parser.parse_document()?;

    let Value::List(items) = value else {
        return Err(MalformedDataError::syntax(0, "expected a top-level array"));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(record, item)| record_from_value(record, item))
        .collect()
}

fn record_from_value(record: usize, value: Value) -> Result<SourceRecord, MalformedDataError> {
    let Value::List(parts) = value else {
        return Err(MalformedDataError::shape(record, "record is not an array"));
    };
    let mut parts = parts.into_iter();

    let raw_key = match parts.next() {
        Some(Value::Str(key)) => key,
        Some(_) => return Err(MalformedDataError::shape(record, "key is not a string")),
        None => return Err(MalformedDataError::MissingKey { record }),
    };

    let Some(Value::List(body)) = parts.next() else {
        return Err(MalformedDataError::shape(record, "missing label and targets"));
    };
    let mut body = body.into_iter();

    let label = match body.next() {
        Some(Value::Str(label)) => decode_entities(&label),
        _ => return Err(MalformedDataError::shape(record, "label is not a string")),
    };

    let targets = body
        .map(|anchor| target_from_value(record, &label, anchor))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SourceRecord {
        key: Some(decode_key(&raw_key)),
        targets,
    })
}

fn target_from_value(
    record: usize,
    label: &str,
    value: Value,
) -> Result<SourceTarget, MalformedDataError> {
    let Value::List(fields) = value else {
        return Err(MalformedDataError::shape(record, "target is not an array"));
    };
    let mut fields = fields.into_iter();

    let url = match fields.next() {
        Some(Value::Str(url)) => url,
        _ => return Err(MalformedDataError::shape(record, "target url is not a string")),
    };
    let external = match fields.next() {
        Some(Value::Int(local)) => local == 0,
        None => false,
        Some(_) => return Err(MalformedDataError::shape(record, "target flag is not an integer")),
    };
    let context = match fields.next() {
        Some(Value::Str(context)) => decode_entities(&context),
        None => String::new(),
        Some(_) => return Err(MalformedDataError::shape(record, "target context is not a string")),
    };

    Ok(SourceTarget {
        label: label.to_string(),
        url,
        context,
        external,
    })
}

/// Strip the `_<n>` counter and decode `_xx` hex escapes
fn decode_key(raw: &str) -> String {
    let base = match raw.rsplit_once('_') {
        Some((head, counter))
            if !counter.is_empty() && counter.bytes().all(|b| b.is_ascii_digit()) =>
        {
            head
        }
        _ => raw,
    };

    let bytes = base.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'_'
            && i + 2 < bytes.len()
            && bytes[i + 1].is_ascii_hexdigit()
            && bytes[i + 2].is_ascii_hexdigit()
        {
            if let Ok(byte) = u8::from_str_radix(&base[i + 1..i + 3], 16) {
                decoded.push(byte);
                i += 3;
                continue;
            }
        }
        decoded.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&decoded).into_owned()
}

/// Decode the HTML entities Doxygen emits in labels and contexts
fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail.find(';').and_then(|semi| {
            let name = &tail[1..semi];
            let ch = match name {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => name.strip_prefix('#').and_then(|num| {
                    let code = match num.strip_prefix(['x', 'X']) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => num.parse().ok(),
                    };
                    code.and_then(char::from_u32)
                }),
            };
            ch.map(|ch| (ch, semi + 1))
        });

        match decoded {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[derive(Debug, Clone, PartialEq)]
enum Value {
    Str(String),
    Int(i64),
    List(Vec<Value>),
}

/// Recursive-descent reader for the array literal subset Doxygen emits
struct Parser<'a> {
    text: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            depth: 0,
        }
    }

    fn parse_document(&mut self) -> Result<Value, MalformedDataError> {
        self.skip_whitespace();
        if self.rest().starts_with("var") {
            match self.rest().find('=') {
                Some(eq) => self.pos += eq + 1,
                None => return Err(self.error("expected '=' after variable declaration")),
            }
        }

        self.skip_whitespace();
        let value = self.parse_value()?;

        self.skip_whitespace();
        if self.peek() == Some(';') {
            self.pos += 1;
            self.skip_whitespace();
        }
        if self.pos != self.text.len() {
            return Err(self.error("unexpected trailing content"));
        }
        Ok(value)
    }

    fn parse_value(&mut self) -> Result<Value, MalformedDataError> {
        match self.peek() {
            Some('[') => self.parse_list(),
            Some(quote @ ('\'' | '"')) => self.parse_string(quote).map(Value::Str),
            Some(c) if c == '-' || c.is_ascii_digit() => self.parse_int(),
            Some(c) => Err(self.error(format!("unexpected character '{c}'"))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn parse_list(&mut self) -> Result<Value, MalformedDataError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.error("array nesting too deep"));
        }
        self.depth += 1;
        let list = self.parse_list_items();
        self.depth -= 1;
        list
    }

    fn parse_list_items(&mut self) -> Result<Value, MalformedDataError> {
        self.pos += 1;
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek() == Some(']') {
                self.pos += 1;
                return Ok(Value::List(items));
            }

            items.push(self.parse_value()?);

            self.skip_whitespace();
            match self.peek() {
                Some(',') => self.pos += 1,
                Some(']') => {}
                Some(c) => return Err(self.error(format!("expected ',' or ']', found '{c}'"))),
                None => return Err(self.error("unterminated array")),
            }
        }
    }

    fn parse_string(&mut self, quote: char) -> Result<String, MalformedDataError> {
        let start = self.pos;
        self.pos += quote.len_utf8();
        let mut out = String::new();

        let mut chars = self.rest().char_indices();
        while let Some((offset, c)) = chars.next() {
            match c {
                c if c == quote => {
                    self.pos += offset + c.len_utf8();
                    return Ok(out);
                }
                '\\' => {
                    let Some((_, escaped)) = chars.next() else {
                        break;
                    };
                    match escaped {
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        'r' => out.push('\r'),
                        'u' => {
                            let hex: String = chars.by_ref().take(4).map(|(_, h)| h).collect();
                            let ch = u32::from_str_radix(&hex, 16)
                                .ok()
                                .and_then(char::from_u32)
                                .ok_or_else(|| {
                                    MalformedDataError::syntax(
                                        self.pos + offset,
                                        format!("invalid unicode escape '\\u{hex}'"),
                                    )
                                })?;
                            out.push(ch);
                        }
                        other => out.push(other),
                    }
                }
                c => out.push(c),
            }
        }

        Err(MalformedDataError::syntax(start, "unterminated string"))
    }

    fn parse_int(&mut self) -> Result<Value, MalformedDataError> {
        let start = self.pos;
        let len = self
            .rest()
            .char_indices()
            .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && c == '-')))
            .map(|(i, _)| i)
            .unwrap_or(self.rest().len());

        let literal = &self.text[start..start + len];
        let value = literal
            .parse()
            .map_err(|_| MalformedDataError::syntax(start, format!("invalid integer '{literal}'")))?;
        self.pos += len;
        Ok(Value::Int(value))
    }

    fn skip_whitespace(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.text.len() - trimmed.len();
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn error(&self, message: impl Into<String>) -> MalformedDataError {
        MalformedDataError::syntax(self.pos, message)
    }
}
