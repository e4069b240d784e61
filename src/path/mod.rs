//! Deterministic addresses into a tree snapshot.
//!
//! A [`Path`] is a dot-separated list of 1-based numbers. What the numbers
//! count depends on the [`AddressingScheme`]:
//!
//! - `Declaration`: declarations only, hierarchically. Numbering restarts at
//!   1 under each declaration; nested declarations are the ones reached
//!   without crossing another declaration (`"1.2"` is the second member of
//!   the first top-level declaration).
//! - `Token`: every token of the document in pre-order, flat. A token path
//!   has exactly one segment and the end-of-file token is not addressable.
//!
//! Paths are not stable across mutations: an edit can renumber everything
//! at or after the edit point. Resolve against the tree a path was computed
//! from, and recompute after every mutation.

pub mod resolver;

pub use resolver::{compute, enumerate, resolve, ResolvedNode};

use crate::mutation::NodeOperationError;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path(Vec<usize>);

impl Path {
    /// `None` when empty or when a segment is zero.
    pub fn new(segments: Vec<usize>) -> Option<Self> {
        (!segments.is_empty() && !segments.contains(&0)).then_some(Self(segments))
    }

    pub fn single(number: usize) -> Option<Self> {
        Self::new(vec![number])
    }

    pub fn segments(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Nesting depth, 1 for top-level entries.
    pub fn depth(&self) -> usize {
        self.0.len()
    }
}

impl FromStr for Path {
    type Err = NodeOperationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || NodeOperationError::not_found(s);
        if s.is_empty() {
            return Err(malformed());
        }
        let mut segments = Vec::new();
        for segment in s.split('.') {
            if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed());
            }
            let number: usize = segment.parse().map_err(|_| malformed())?;
            if number == 0 {
                return Err(malformed());
            }
            segments.push(number);
        }
        Ok(Self(segments))
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressingScheme {
    Declaration,
    Token,
}

impl fmt::Display for AddressingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressingScheme::Declaration => f.write_str("declaration"),
            AddressingScheme::Token => f.write_str("token"),
        }
    }
}

/// A path tagged with the scheme it is numbered in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NodePath {
    pub scheme: AddressingScheme,
    pub path: Path,
}

impl NodePath {
    pub fn new(scheme: AddressingScheme, path: Path) -> Self {
        Self { scheme, path }
    }

    pub fn token(path: Path) -> Self {
        Self::new(AddressingScheme::Token, path)
    }

    pub fn declaration(path: Path) -> Self {
        Self::new(AddressingScheme::Declaration, path)
    }

    pub fn parse(scheme: AddressingScheme, s: &str) -> Result<Self, NodeOperationError> {
        Ok(Self::new(scheme, s.parse()?))
    }

    pub(crate) fn not_found(&self) -> NodeOperationError {
        NodeOperationError::not_found(self.path.to_string())
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} path {}", self.scheme, self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dotted_numbers() {
        let path: Path = "1.3.2".parse().unwrap();
        assert_eq!(path.segments(), &[1, 3, 2]);
        assert_eq!(path.to_string(), "1.3.2");
        assert_eq!(path.depth(), 3);
    }

    #[test]
    fn malformed_paths_are_not_found() {
        for input in ["", ".", "1.", ".1", "1..2", "a", "1.b", "0", "1.0", "-1", "+1", " 1", "1 "] {
            assert_eq!(
                input.parse::<Path>(),
                Err(NodeOperationError::not_found(input)),
                "{input:?}"
            );
        }
    }

    #[test]
    fn overflowing_segments_are_not_found() {
        assert!("99999999999999999999999999".parse::<Path>().is_err());
    }

    #[test]
    fn constructors_reject_zero() {
        assert!(Path::new(vec![]).is_none());
        assert!(Path::new(vec![1, 0]).is_none());
        assert_eq!(Path::single(4).map(|p| p.to_string()), Some("4".to_string()));
    }

    #[test]
    fn node_path_display_names_scheme() {
        let path = NodePath::parse(AddressingScheme::Declaration, "2.1").unwrap();
        assert_eq!(path.to_string(), "declaration path 2.1");
        assert_eq!(serde_json::to_value(&path).unwrap()["path"], "2.1");
    }
}
