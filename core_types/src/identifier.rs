//! Colon-delimited identifiers
//!
//! An identifier addresses a node in a registered access tree. The empty
//! identifier is the root; every other identifier is one or more segments
//! joined by [`DELIMITER`].

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Segment separator
pub const DELIMITER: char = ':';

/// Tree key matching exactly one segment
pub const WILDCARD: &str = "*";

/// Tree key matching the whole remaining suffix
pub const GLOBSTAR: &str = "**/*";

/// Errors produced while parsing an identifier
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentifierError {
    /// Identifier contains an empty segment (leading, trailing or doubled delimiter)
    #[error("Identifier '{0}' contains an empty segment")]
    EmptySegment(String),

    /// Segment is reserved or contains a forbidden character
    #[error("Identifier '{identifier}' contains invalid segment '{segment}'")]
    InvalidSegment { identifier: String, segment: String },
}

/// A validated identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Identifier(String);

impl Identifier {
    /// The root identifier
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Parses and validates an identifier
    ///
    /// # Examples
    ///
    /// ```
    /// use core_types::Identifier;
    ///
    /// let id = Identifier::parse("config:theme.json").unwrap();
    /// assert_eq!(id.segments().collect::<Vec<_>>(), vec!["config", "theme.json"]);
    ///
    /// assert!(Identifier::parse("config::theme.json").is_err());
    /// assert!(Identifier::parse("").unwrap().is_root());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, IdentifierError> {
        if raw.is_empty() {
            return Ok(Self::root());
        }

        for segment in raw.split(DELIMITER) {
            if segment.is_empty() {
                return Err(IdentifierError::EmptySegment(raw.to_string()));
            }
            if !Self::is_valid_segment(segment) {
                return Err(IdentifierError::InvalidSegment {
                    identifier: raw.to_string(),
                    segment: segment.to_string(),
                });
            }
        }

        Ok(Self(raw.to_string()))
    }

    /// Returns true if `segment` may appear inside an identifier
    ///
    /// Wildcard tokens and relative path names are reserved.
    pub fn is_valid_segment(segment: &str) -> bool {
        !segment.is_empty()
            && segment != WILDCARD
            && segment != GLOBSTAR
            && segment != "."
            && segment != ".."
            && !segment.contains(DELIMITER)
            && !segment.contains('/')
            && !segment.contains('\\')
            && !segment.contains('\0')
    }

    /// Returns the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the segments; the root has none
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(DELIMITER).filter(|segment| !segment.is_empty())
    }

    pub fn segment_count(&self) -> usize {
        self.segments().count()
    }

    /// Returns the identifier made of the first `count` segments
    pub fn prefix(&self, count: usize) -> Identifier {
        let joined: Vec<&str> = self.segments().take(count).collect();
        Self(joined.join(":"))
    }

    /// Returns `self` nested under `prefix`
    pub fn under(&self, prefix: &Identifier) -> Identifier {
        match (prefix.is_root(), self.is_root()) {
            (true, _) => self.clone(),
            (false, true) => prefix.clone(),
            (false, false) => Self(format!("{}{}{}", prefix.0, DELIMITER, self.0)),
        }
    }

    /// Whether `self` is `ancestor` or lies below it
    ///
    /// Matches whole segments only: `ab` is not within `a`.
    pub fn is_within(&self, ancestor: &Identifier) -> bool {
        if ancestor.is_root() || self == ancestor {
            return true;
        }
        self.0
            .strip_prefix(ancestor.as_str())
            .map_or(false, |rest| rest.starts_with(DELIMITER))
    }

    /// Returns the last segment, or `None` for the root
    pub fn last_segment(&self) -> Option<&str> {
        self.segments().last()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Identifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Identifier {
    type Error = IdentifierError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_identifier() {
        let id = Identifier::parse("index.json").unwrap();
        assert_eq!(id.as_str(), "index.json");
        assert_eq!(id.segment_count(), 1);
    }

    #[test]
    fn test_parse_nested_identifier() {
        let id = Identifier::parse("dir:sub:file.txt").unwrap();
        assert_eq!(
            id.segments().collect::<Vec<_>>(),
            vec!["dir", "sub", "file.txt"]
        );
        assert_eq!(id.last_segment(), Some("file.txt"));
    }

    #[test]
    fn test_empty_identifier_is_root() {
        let id = Identifier::parse("").unwrap();
        assert!(id.is_root());
        assert_eq!(id.segment_count(), 0);
        assert_eq!(id.last_segment(), None);
    }

    #[test]
    fn test_is_within_matches_whole_segments() {
        let a = Identifier::parse("a").unwrap();
        let nested = Identifier::parse("a:b").unwrap();
        let sibling = Identifier::parse("ab").unwrap();

        assert!(nested.is_within(&a));
        assert!(a.is_within(&a));
        assert!(!sibling.is_within(&a));
        assert!(!a.is_within(&nested));
        assert!(sibling.is_within(&Identifier::root()));
    }

    #[test]
    fn test_empty_segment_rejected() {
        assert!(matches!(
            Identifier::parse("a::b"),
            Err(IdentifierError::EmptySegment(_))
        ));
        assert!(matches!(
            Identifier::parse(":a"),
            Err(IdentifierError::EmptySegment(_))
        ));
        assert!(matches!(
            Identifier::parse("a:"),
            Err(IdentifierError::EmptySegment(_))
        ));
        assert!(matches!(
            Identifier::parse(":"),
            Err(IdentifierError::EmptySegment(_))
        ));
    }

    #[test]
    fn test_reserved_segments_rejected() {
        assert!(Identifier::parse("a:*").is_err());
        assert!(Identifier::parse("**/*").is_err());
        assert!(Identifier::parse("a:..:b").is_err());
        assert!(Identifier::parse("a/b").is_err());
    }

    #[test]
    fn test_prefix() {
        let id = Identifier::parse("a:b:c").unwrap();
        assert_eq!(id.prefix(0).as_str(), "");
        assert_eq!(id.prefix(2).as_str(), "a:b");
        assert_eq!(id.prefix(5).as_str(), "a:b:c");
    }

    #[test]
    fn test_under_prefix() {
        let prefix = Identifier::parse("sub").unwrap();
        let id = Identifier::parse("file.txt").unwrap();
        assert_eq!(id.under(&prefix).as_str(), "sub:file.txt");
        assert_eq!(Identifier::root().under(&prefix).as_str(), "sub");
        assert_eq!(id.under(&Identifier::root()).as_str(), "file.txt");
    }
}
