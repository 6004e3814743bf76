//! Sub-path expressions for extracting part of an ingredient's value.
//!
//! Supports dotted fields and bracketed indices, chained arbitrarily:
//!
//! ```text
//! .name
//! .a.b[1]
//! .items[0].title
//! ["key with spaces"].value
//! $.a.b          (a leading `$` is accepted and ignored)
//! ```
//!
//! Grammar (informal):
//! ```text
//! path     = ["$"] [IDENT] segment*
//! segment  = "." IDENT | "[" INDEX "]" | "[" QUOTED "]"
//! INDEX    = DIGIT+
//! QUOTED   = '"' chars '"' | "'" chars "'"
//! ```
//!
//! Extraction yields exactly one value or nothing. An absent result is a
//! hard failure for the caller; JSON `null` is a present value.

use crate::error::{Error, Result};
use serde_json::Value;
use std::fmt;

/// One addressing step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// `.field` or `["field"]`: an object key.
    Field(String),
    /// `[n]`: an array position.
    Index(usize),
}

/// A parsed sub-path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubPath {
    raw: String,
    segments: Vec<Segment>,
}

impl SubPath {
    /// Parse a path expression.
    pub fn parse(expr: &str) -> Result<Self> {
        let segments = Parser::new(expr).parse()?;
        Ok(Self {
            raw: expr.to_string(),
            segments,
        })
    }

    /// The expression as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Walk `value` along the path. `None` means the path addressed nothing.
    pub fn extract<'v>(&self, value: &'v Value) -> Option<&'v Value> {
        self.segments
            .iter()
            .try_fold(value, |current, segment| match segment {
                Segment::Field(key) => current.as_object()?.get(key),
                Segment::Index(i) => current.as_array()?.get(*i),
            })
    }
}

impl fmt::Display for SubPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl std::str::FromStr for SubPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

// ── Parser ────────────────────────────────────────────────────────────────

struct Parser<'a> {
    expr: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl<'a> Parser<'a> {
    fn new(expr: &'a str) -> Self {
        Self {
            expr,
            chars: expr.char_indices().peekable(),
        }
    }

    fn error(&self, reason: impl Into<String>) -> Error {
        Error::InvalidPath {
            path: self.expr.to_string(),
            reason: reason.into(),
        }
    }

    fn parse(mut self) -> Result<Vec<Segment>> {
        let mut segments = Vec::new();

        if let Some(&(_, '$')) = self.chars.peek() {
            self.chars.next();
        }

        // A bare leading identifier is shorthand for `.ident`.
        if let Some(&(_, c)) = self.chars.peek() {
            if c != '.' && c != '[' {
                segments.push(Segment::Field(self.ident()?));
            }
        }

        while let Some((pos, c)) = self.chars.next() {
            match c {
                '.' => segments.push(Segment::Field(self.ident()?)),
                '[' => segments.push(self.bracket()?),
                other => {
                    return Err(self.error(format!("unexpected '{other}' at offset {pos}")));
                }
            }
        }

        Ok(segments)
    }

    fn ident(&mut self) -> Result<String> {
        let mut ident = String::new();
        while let Some(&(_, c)) = self.chars.peek() {
            if c == '.' || c == '[' || c == ']' {
                break;
            }
            ident.push(c);
            self.chars.next();
        }
        if ident.is_empty() {
            return Err(self.error("empty field name"));
        }
        Ok(ident)
    }

    fn bracket(&mut self) -> Result<Segment> {
        let segment = match self.chars.peek().map(|&(_, c)| c) {
            Some(quote @ ('"' | '\'')) => {
                self.chars.next();
                let mut key = String::new();
                loop {
                    match self.chars.next() {
                        Some((_, c)) if c == quote => break,
                        Some((_, c)) => key.push(c),
                        None => return Err(self.error("unterminated quoted key")),
                    }
                }
                Segment::Field(key)
            }
            Some(c) if c.is_ascii_digit() => {
                let mut digits = String::new();
                while let Some(&(_, c)) = self.chars.peek() {
                    if !c.is_ascii_digit() {
                        break;
                    }
                    digits.push(c);
                    self.chars.next();
                }
                let index = digits
                    .parse::<usize>()
                    .map_err(|e| self.error(format!("bad index '{digits}': {e}")))?;
                Segment::Index(index)
            }
            Some(other) => {
                return Err(self.error(format!(
                    "expected an index or quoted key after '[', found '{other}'"
                )));
            }
            None => return Err(self.error("unterminated '['")),
        };

        match self.chars.next() {
            Some((_, ']')) => Ok(segment),
            _ => Err(self.error("expected ']'")),
        }
    }
}
