use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors raised when building paths or form trees from external input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormError {
    /// The path string was empty.
    #[error("field path is empty")]
    EmptyPath,

    /// The path contained an empty segment, e.g. `a..b` or a trailing dot.
    #[error("field path '{0}' contains an empty segment")]
    EmptySegment(String),

    /// A form tree must have a map at its root.
    #[error("form data root must be an object, got {0}")]
    RootNotMap(&'static str),
}

/// A validated, dot-separated path into a [`FormData`](super::FormData) tree.
///
/// ```
/// use plan_core::FieldPath;
///
/// let path = FieldPath::parse("parent1_income.gross_monthly").unwrap();
/// assert_eq!(path.segments(), ["parent1_income", "gross_monthly"]);
/// assert!(FieldPath::parse("parent1_income.").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath {
    raw: String,
    segments: Vec<String>,
}

impl FieldPath {
    /// Parses a dot-separated path, rejecting empty paths and empty segments.
    pub fn parse(raw: &str) -> Result<Self, FormError> {
        if raw.is_empty() {
            return Err(FormError::EmptyPath);
        }
        let segments: Vec<String> = raw.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(FormError::EmptySegment(raw.to_string()));
        }
        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns `true` if `other` is this path or lies beneath it.
    pub fn covers(
        &self,
        other: &FieldPath,
    ) -> bool {
        other.segments.len() >= self.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|(a, b)| a == b)
    }
}

impl FromStr for FieldPath {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_splits_on_dots() {
        let path = FieldPath::parse("child_support.childcare_monthly").unwrap();

        assert_eq!(path.segments(), ["child_support", "childcare_monthly"]);
        assert_eq!(path.as_str(), "child_support.childcare_monthly");
    }

    #[test]
    fn parse_accepts_single_segment() {
        let path = FieldPath::parse("relationship_status").unwrap();

        assert_eq!(path.segments().len(), 1);
    }

    #[test]
    fn parse_rejects_empty_path() {
        assert_eq!(FieldPath::parse(""), Err(FormError::EmptyPath));
    }

    #[test]
    fn parse_rejects_empty_segments() {
        for raw in ["a..b", ".a", "a."] {
            assert_eq!(
                FieldPath::parse(raw),
                Err(FormError::EmptySegment(raw.to_string()))
            );
        }
    }

    #[test]
    fn covers_matches_self_and_descendants_only() {
        let parent = FieldPath::parse("children.details").unwrap();

        assert!(parent.covers(&FieldPath::parse("children.details").unwrap()));
        assert!(parent.covers(&FieldPath::parse("children.details.0.name").unwrap()));
        assert!(!parent.covers(&FieldPath::parse("children").unwrap()));
        assert!(!parent.covers(&FieldPath::parse("children.count").unwrap()));
    }
}
