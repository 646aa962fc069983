//! Hierarchical names
//!
//! A [`Name`] is an ordered sequence of string segments. String forms use the
//! composite-name grammar: segments are separated by `/`, a backslash escapes
//! the next separator, backslash, or quote, and a segment that starts with a
//! quote runs to the matching close quote.

use crate::error::NamingError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const SEPARATOR: char = '/';
const ESCAPE: char = '\\';

/// Immutable-by-convention ordered sequence of name segments.
///
/// An empty name denotes "this context itself".
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Name {
    segments: Vec<String>,
}

impl Name {
    /// The empty name
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a string using the composite-name grammar
    pub fn parse(input: &str) -> Result<Self, NamingError> {
        let mut segments = Vec::new();
        let mut chars = input.chars().peekable();
        let mut all_empty = true;

        if input.is_empty() {
            return Ok(Self::empty());
        }

        loop {
            let segment = read_segment(input, &mut chars)?;
            if !segment.is_empty() {
                all_empty = false;
            }
            segments.push(segment);

            match chars.next() {
                Some(SEPARATOR) => {
                    // Trailing separator adds one empty segment, unless every
                    // segment so far was empty ("/" is a single empty segment).
                    if chars.peek().is_none() {
                        if !all_empty {
                            segments.push(String::new());
                        }
                        break;
                    }
                }
                None => break,
                Some(other) => {
                    return Err(NamingError::malformed(
                        input,
                        format!("unexpected character '{}' after segment", other),
                    ))
                }
            }
        }

        Ok(Self { segments })
    }

    /// Compose `name` onto `prefix`: prefix segments first, then name segments.
    pub fn compose(prefix: &Name, name: &Name) -> Name {
        let mut result = prefix.clone();
        result.extend_from(name);
        result
    }

    /// This name with `other` appended
    pub fn join(&self, other: &Name) -> Name {
        Self::compose(self, other)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.segments.get(index).map(String::as_str)
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// The first `count` segments (clamped to the name's length)
    pub fn prefix(&self, count: usize) -> Name {
        let count = count.min(self.segments.len());
        Self {
            segments: self.segments[..count].to_vec(),
        }
    }

    /// The segments from `start` onwards (empty if `start` is past the end)
    pub fn suffix(&self, start: usize) -> Name {
        let start = start.min(self.segments.len());
        Self {
            segments: self.segments[start..].to_vec(),
        }
    }

    /// Everything but the last segment; `None` for the empty name
    pub fn parent(&self) -> Option<Name> {
        if self.is_empty() {
            None
        } else {
            Some(self.prefix(self.len() - 1))
        }
    }

    pub fn starts_with(&self, other: &Name) -> bool {
        self.segments.starts_with(&other.segments)
    }

    pub fn ends_with(&self, other: &Name) -> bool {
        self.segments.ends_with(&other.segments)
    }

    pub fn push(&mut self, segment: impl Into<String>) {
        self.segments.push(segment.into());
    }

    pub fn extend_from(&mut self, other: &Name) {
        self.segments.extend(other.segments.iter().cloned());
    }
}

/// Read one segment up to (not including) the next unescaped separator.
fn read_segment<I>(input: &str, chars: &mut std::iter::Peekable<I>) -> Result<String, NamingError>
where
    I: Iterator<Item = char>,
{
    let mut segment = String::new();

    if let Some(&quote) = chars.peek() {
        if quote == '"' || quote == '\'' {
            chars.next();
            loop {
                match chars.next() {
                    None => {
                        return Err(NamingError::malformed(input, "no close quote"));
                    }
                    // Inside quotes only an escaped close quote is unescaped
                    Some(ESCAPE) => match chars.peek() {
                        Some(&next) if next == quote => {
                            segment.push(next);
                            chars.next();
                        }
                        _ => segment.push(ESCAPE),
                    },
                    Some(c) if c == quote => break,
                    Some(c) => segment.push(c),
                }
            }
            return match chars.peek() {
                None | Some(&SEPARATOR) => Ok(segment),
                Some(_) => Err(NamingError::malformed(
                    input,
                    "close quote appears before end of segment",
                )),
            };
        }
    }

    while let Some(&c) = chars.peek() {
        match c {
            SEPARATOR => break,
            ESCAPE => {
                chars.next();
                match chars.peek() {
                    Some(&next) if is_escapable(next) => {
                        segment.push(next);
                        chars.next();
                    }
                    Some(_) => segment.push(ESCAPE),
                    None => {
                        return Err(NamingError::malformed(
                            input,
                            "unescaped escape at end of name",
                        ))
                    }
                }
            }
            _ => {
                segment.push(c);
                chars.next();
            }
        }
    }

    Ok(segment)
}

fn is_escapable(c: char) -> bool {
    matches!(c, SEPARATOR | ESCAPE | '"' | '\'')
}

/// A backslash is only escaped where `parse` would otherwise consume it:
/// before a meta character or at the end of the segment.
fn write_segment(f: &mut fmt::Formatter<'_>, segment: &str) -> fmt::Result {
    let mut chars = segment.chars().peekable();
    let mut index = 0;
    while let Some(c) = chars.next() {
        let needs_escape = match c {
            SEPARATOR => true,
            '"' | '\'' => index == 0,
            ESCAPE => chars.peek().map_or(true, |&next| is_escapable(next)),
            _ => false,
        };
        if needs_escape {
            write!(f, "{}", ESCAPE)?;
        }
        write!(f, "{}", c)?;
        index += 1;
    }
    Ok(())
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, segment) in self.segments.iter().enumerate() {
            if index > 0 {
                write!(f, "{}", SEPARATOR)?;
            }
            write_segment(f, segment)?;
        }
        // A name of only empty segments needs a trailing separator to survive
        // a round trip through `parse`.
        if !self.segments.is_empty() && self.segments.iter().all(String::is_empty) {
            write!(f, "{}", SEPARATOR)?;
        }
        Ok(())
    }
}

impl FromStr for Name {
    type Err = NamingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Name::parse(s)
    }
}

impl TryFrom<String> for Name {
    type Error = NamingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Name::parse(&value)
    }
}

impl From<Name> for String {
    fn from(name: Name) -> Self {
        name.to_string()
    }
}

impl<'a> IntoIterator for &'a Name {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}
