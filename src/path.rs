//! Addressing of fields inside nested schemas and state trees
//!
//! A path alternates field keys and item indices: `skills.0.name` is the `name`
//! field of the first item of the `skills` collection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FormError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Index(usize),
    Key(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Path of a top-level field.
    pub fn field(key: impl Into<String>) -> Self {
        Self(vec![PathSegment::Key(key.into())])
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.0.push(PathSegment::Key(key.into()));
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.0.push(PathSegment::Index(index));
        self
    }

    pub fn child_key(&self, key: impl Into<String>) -> Self {
        self.clone().key(key)
    }

    pub fn child_index(&self, index: usize) -> Self {
        self.clone().index(index)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The top-level field this path points into.
    pub fn first_key(&self) -> Option<&str> {
        match self.0.first() {
            Some(PathSegment::Key(key)) => Some(key.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            match segment {
                PathSegment::Key(key) => f.write_str(key)?,
                PathSegment::Index(index) => write!(f, "{}", index)?,
            }
        }
        Ok(())
    }
}

/// Parses dotted paths; all-digit segments are indices.
impl FromStr for FieldPath {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::root());
        }
        s.split('.')
            .map(|part| {
                if part.is_empty() {
                    Err(FormError::InvalidPath(s.to_string()))
                } else if part.bytes().all(|b| b.is_ascii_digit()) {
                    part.parse()
                        .map(PathSegment::Index)
                        .map_err(|_| FormError::InvalidPath(s.to_string()))
                } else {
                    Ok(PathSegment::Key(part.to_string()))
                }
            })
            .collect::<Result<Vec<_>, _>>()
            .map(FieldPath)
    }
}

impl From<&str> for FieldPath {
    /// Lenient conversion for literals; an unparsable path becomes a single key.
    fn from(s: &str) -> Self {
        s.parse().unwrap_or_else(|_| FieldPath::field(s))
    }
}
