//! Parsed field paths.
//!
//! A field path addresses a value inside one plan section, e.g.
//! `cacModel.targetCPL`, `platformBreakdown[0].monthlyBudget`, or
//! `[2].budget` for array sections. Paths are parsed once into a
//! [`FieldPath`] so malformed input is rejected before anything is edited.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Object key.
    Key(String),
    /// Array index.
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(name) => f.write_str(name),
            Self::Index(i) => write!(f, "[{i}]"),
        }
    }
}

/// Errors that can occur while parsing a field path.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FieldPathError {
    #[error("empty segment at position {position} in field path {path:?}")]
    EmptySegment { path: String, position: usize },

    #[error("unclosed '[' in field path {path:?}")]
    UnclosedBracket { path: String },

    #[error("invalid array index {index:?} in field path {path:?}")]
    InvalidIndex { path: String, index: String },

    #[error("unexpected {found:?} after ']' in field path {path:?}")]
    TrailingCharacters { path: String, found: String },
}

/// A validated path into a plan section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// Parse a dot-separated path with optional `[n]` index suffixes.
    ///
    /// The empty string parses to the empty path, which addresses the whole
    /// section. A segment made only of digits is an index.
    pub fn parse(path: &str) -> Result<Self, FieldPathError> {
        let trimmed = path.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }

        let mut segments = Vec::new();
        for (position, part) in trimmed.split('.').enumerate() {
            if part.is_empty() {
                return Err(FieldPathError::EmptySegment {
                    path: path.to_owned(),
                    position,
                });
            }
            parse_part(path, part, &mut segments)?;
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The first key of the path, if it starts with one.
    pub fn first_key(&self) -> Option<&str> {
        match self.segments.first() {
            Some(PathSegment::Key(name)) => Some(name),
            _ => None,
        }
    }

    /// The path without its first segment.
    pub fn without_first(&self) -> Self {
        Self {
            segments: self.segments.iter().skip(1).cloned().collect(),
        }
    }
}

impl FromStr for FieldPath {
    type Err = FieldPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 && matches!(segment, PathSegment::Key(_)) {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

/// Parse one dot-delimited part such as `name`, `name[0][1]`, `[3]` or `3`.
fn parse_part(
    path: &str,
    part: &str,
    segments: &mut Vec<PathSegment>,
) -> Result<(), FieldPathError> {
    if part.bytes().all(|b| b.is_ascii_digit()) {
        segments.push(PathSegment::Index(parse_index(path, part)?));
        return Ok(());
    }

    let (name, mut rest) = match part.find('[') {
        Some(pos) => (&part[..pos], &part[pos..]),
        None => (part, ""),
    };
    if !name.is_empty() {
        segments.push(PathSegment::Key(name.to_owned()));
    }

    while !rest.is_empty() {
        let Some(after_open) = rest.strip_prefix('[') else {
            return Err(FieldPathError::TrailingCharacters {
                path: path.to_owned(),
                found: rest.to_owned(),
            });
        };
        let Some(close) = after_open.find(']') else {
            return Err(FieldPathError::UnclosedBracket {
                path: path.to_owned(),
            });
        };
        segments.push(PathSegment::Index(parse_index(path, &after_open[..close])?));
        rest = &after_open[close + 1..];
    }
    Ok(())
}

fn parse_index(path: &str, raw: &str) -> Result<usize, FieldPathError> {
    raw.trim()
        .parse::<usize>()
        .map_err(|_| FieldPathError::InvalidIndex {
            path: path.to_owned(),
            index: raw.to_owned(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> PathSegment {
        PathSegment::Key(s.to_owned())
    }

    #[test]
    fn parses_dotted_keys() {
        let path = FieldPath::parse("cacModel.targetCPL").unwrap();
        assert_eq!(path.segments(), &[key("cacModel"), key("targetCPL")]);
    }

    #[test]
    fn parses_array_index_suffix() {
        let path = FieldPath::parse("platformBreakdown[0].monthlyBudget").unwrap();
        assert_eq!(
            path.segments(),
            &[
                key("platformBreakdown"),
                PathSegment::Index(0),
                key("monthlyBudget")
            ]
        );
    }

    #[test]
    fn parses_leading_index_and_numeric_segment() {
        let bracketed = FieldPath::parse("[2].budget").unwrap();
        let dotted = FieldPath::parse("2.budget").unwrap();
        assert_eq!(bracketed, dotted);
        assert_eq!(bracketed.segments()[0], PathSegment::Index(2));
    }

    #[test]
    fn parses_nested_indices() {
        let path = FieldPath::parse("matrix[1][3]").unwrap();
        assert_eq!(
            path.segments(),
            &[key("matrix"), PathSegment::Index(1), PathSegment::Index(3)]
        );
    }

    #[test]
    fn empty_path_addresses_whole_section() {
        assert!(FieldPath::parse("").unwrap().is_empty());
        assert!(FieldPath::parse("   ").unwrap().is_empty());
    }

    #[test]
    fn rejects_empty_segment() {
        let err = FieldPath::parse("a..b").unwrap_err();
        assert!(matches!(err, FieldPathError::EmptySegment { position: 1, .. }));
    }

    #[test]
    fn rejects_unclosed_bracket() {
        let err = FieldPath::parse("platformBreakdown[0").unwrap_err();
        assert!(matches!(err, FieldPathError::UnclosedBracket { .. }));
    }

    #[test]
    fn rejects_non_numeric_index() {
        let err = FieldPath::parse("platformBreakdown[first]").unwrap_err();
        assert!(matches!(err, FieldPathError::InvalidIndex { ref index, .. } if index == "first"));
    }

    #[test]
    fn rejects_characters_after_bracket() {
        let err = FieldPath::parse("items[0]name").unwrap_err();
        assert!(matches!(err, FieldPathError::TrailingCharacters { .. }));
    }

    #[test]
    fn display_roundtrips() {
        for raw in ["cacModel.targetCPL", "platformBreakdown[0].percentage", "[1].target"] {
            let path = FieldPath::parse(raw).unwrap();
            assert_eq!(path.to_string(), raw);
        }
    }
}
