//! Tag extraction for short descriptions.
//!
//! A description becomes an ordered list of lowercase word tokens. Pure
//! numbers are dropped and identifiers such as `srv42east` have their digit
//! run replaced by a placeholder so similarity never keys on exact numbers.
//!
//! The dataset stores each row's tags as a list literal (`['db', 'timeout']`).
//! [`parse_tag_list`] reads that form back with a strict literal parser.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Stand-in for every digit run inside an identifier-like token
pub const DIGIT_PLACEHOLDER: &str = "XXXXX";

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("valid word pattern"));
static ALL_DIGITS: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^\d+$").expect("valid digit pattern"));
static IDENTIFIER: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[A-Za-z]+\d+[A-Za-z]*$").expect("valid identifier pattern"));
static DIGIT_RUN: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\d+").expect("valid digit run pattern"));

/// Turn a description into its normalized tags.
///
/// `None` stands for a missing or non-text value and yields no tags.
pub fn normalize(text: Option<&str>) -> Vec<String> {
  let Some(text) = text else {
    return Vec::new();
  };

  WORD.find_iter(text).filter_map(|word| normalize_token(word.as_str())).collect()
}

fn normalize_token(token: &str) -> Option<String> {
  if ALL_DIGITS.is_match(token) {
    return None;
  }

  let lowered = token.to_lowercase();
  if IDENTIFIER.is_match(token) {
    Some(DIGIT_RUN.replace_all(&lowered, DIGIT_PLACEHOLDER).into_owned())
  } else {
    Some(lowered)
  }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TagListError {
  #[error("tag list is missing")]
  Missing,
  #[error("tag list ended unexpectedly")]
  UnexpectedEnd,
  #[error("unexpected '{found}' at position {position}")]
  Unexpected { found: char, position: usize },
  #[error("unexpected trailing input at position {position}")]
  TrailingInput { position: usize },
  #[error("invalid escape sequence at position {position}")]
  InvalidEscape { position: usize },
}

/// Parse a stored tag list literal.
///
/// Accepts a bracketed (`[...]`) or parenthesized (`(...)`) sequence of
/// single- or double-quoted strings separated by commas, with an optional
/// trailing comma. Anything else is rejected.
pub fn parse_tag_list(raw: Option<&str>) -> Result<Vec<String>, TagListError> {
  let raw = raw.ok_or(TagListError::Missing)?;
  let mut parser = LiteralParser::new(raw);
  let tags = parser.sequence()?;
  parser.skip_whitespace();
  match parser.peek() {
    None => Ok(tags),
    Some(_) => Err(TagListError::TrailingInput { position: parser.position }),
  }
}

/// Parse a stored tag list, falling back to no tags when it is missing or malformed
pub fn tags_or_empty(raw: Option<&str>) -> Vec<String> {
  match parse_tag_list(raw) {
    Ok(tags) => tags,
    Err(TagListError::Missing) => Vec::new(),
    Err(e) => {
      tracing::debug!(error = %e, "ignoring malformed tag list");
      Vec::new()
    }
  }
}

/// Serialize tags in the list literal form read by [`parse_tag_list`]
pub fn format_tag_list(tags: &[String]) -> String {
  let quoted: Vec<String> = tags.iter().map(|tag| quote(tag)).collect();
  format!("[{}]", quoted.join(", "))
}

fn quote(tag: &str) -> String {
  let delimiter = if tag.contains('\'') && !tag.contains('"') { '"' } else { '\'' };

  let mut out = String::with_capacity(tag.len() + 2);
  out.push(delimiter);
  for c in tag.chars() {
    match c {
      '\\' => out.push_str("\\\\"),
      '\n' => out.push_str("\\n"),
      '\r' => out.push_str("\\r"),
      '\t' => out.push_str("\\t"),
      c if c == delimiter => {
        out.push('\\');
        out.push(c);
      }
      c => out.push(c),
    }
  }
  out.push(delimiter);
  out
}

struct LiteralParser {
  chars: Vec<char>,
  position: usize,
}

impl LiteralParser {
  fn new(source: &str) -> Self {
    Self { chars: source.chars().collect(), position: 0 }
  }

  fn peek(&self) -> Option<char> {
    self.chars.get(self.position).copied()
  }

  fn next(&mut self) -> Result<char, TagListError> {
    let c = self.peek().ok_or(TagListError::UnexpectedEnd)?;
    self.position += 1;
    Ok(c)
  }

  fn skip_whitespace(&mut self) {
    while self.peek().is_some_and(char::is_whitespace) {
      self.position += 1;
    }
  }

  fn unexpected(&self, found: char) -> TagListError {
    TagListError::Unexpected { found, position: self.position.saturating_sub(1) }
  }

  fn sequence(&mut self) -> Result<Vec<String>, TagListError> {
    self.skip_whitespace();
    let close = match self.next()? {
      '[' => ']',
      '(' => ')',
      other => return Err(self.unexpected(other)),
    };

    let mut items = Vec::new();
    loop {
      self.skip_whitespace();
      match self.next()? {
        c if c == close => return Ok(items),
        quote @ ('\'' | '"') => items.push(self.string(quote)?),
        other => return Err(self.unexpected(other)),
      }

      self.skip_whitespace();
      match self.next()? {
        ',' => continue,
        c if c == close => return Ok(items),
        other => return Err(self.unexpected(other)),
      }
    }
  }

  fn string(&mut self, quote: char) -> Result<String, TagListError> {
    let mut value = String::new();
    loop {
      match self.next()? {
        c if c == quote => return Ok(value),
        '\\' => self.escape(&mut value)?,
        '\n' => return Err(self.unexpected('\n')),
        c => value.push(c),
      }
    }
  }

  fn escape(&mut self, value: &mut String) -> Result<(), TagListError> {
    let start = self.position - 1;
    match self.next()? {
      '\\' => value.push('\\'),
      '\'' => value.push('\''),
      '"' => value.push('"'),
      'n' => value.push('\n'),
      'r' => value.push('\r'),
      't' => value.push('\t'),
      '0' => value.push('\0'),
      '\n' => {}
      'x' => value.push(self.code_point(2, start)?),
      'u' => value.push(self.code_point(4, start)?),
      'U' => value.push(self.code_point(8, start)?),
      other => {
        // Unknown escapes keep their backslash.
        value.push('\\');
        value.push(other);
      }
    }
    Ok(())
  }

  fn code_point(&mut self, digits: usize, start: usize) -> Result<char, TagListError> {
    let mut hex = String::with_capacity(digits);
    for _ in 0..digits {
      hex.push(self.next()?);
    }
    u32::from_str_radix(&hex, 16)
      .ok()
      .and_then(char::from_u32)
      .ok_or(TagListError::InvalidEscape { position: start })
  }
}
