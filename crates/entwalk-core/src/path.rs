//! # Entity Paths
//!
//! Addresses of positions inside an entity value tree, relative to the root
//! of a traversal.
//!
//! The dotted form (`list.0.title`) is parsed once at the API boundary into
//! explicit [`PathSegment`]s. A segment that is a canonical decimal integer
//! (`0`, `17`, never `007`) becomes [`PathSegment::Index`]; everything else is
//! a [`PathSegment::Key`]. Downstream code matches on the segment kind instead
//! of re-splitting strings.
//!
//! ## Lookup Rules
//!
//! [`EntityPath::lookup`] indexes a plain value tree without any schema:
//!
//! | Segment | Object                     | Array                     |
//! |---------|----------------------------|---------------------------|
//! | `Key`   | field by name              | element, if key is numeric |
//! | `Index` | field by its decimal name  | element by position       |
//!
//! Any other combination (a segment applied to a scalar) yields `None`.
//!
//! ## Limitations
//!
//! Keys containing `.` cannot be expressed in the dotted form. Build the path
//! from segments when such keys are possible; `Display` still joins with `.`.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One step of an [`EntityPath`]: an object key or an array index.
///
/// Serializes as a JSON string or a JSON integer respectively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Position within an array.
    Index(usize),
    /// Field name within an object.
    Key(String),
}

impl PathSegment {
    /// Parse a single dotted-path segment.
    pub fn parse(segment: &str) -> Self {
        if is_canonical_index(segment) {
            if let Ok(index) = segment.parse() {
                return Self::Index(index);
            }
        }
        Self::Key(segment.to_string())
    }

    /// The segment as an object key. Indices render in decimal.
    pub fn as_key(&self) -> Cow<'_, str> {
        match self {
            Self::Key(key) => Cow::Borrowed(key),
            Self::Index(index) => Cow::Owned(index.to_string()),
        }
    }

    /// The segment as an array index, if it is one or spells one.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Index(index) => Some(*index),
            Self::Key(key) if is_canonical_index(key) => key.parse().ok(),
            Self::Key(_) => None,
        }
    }

    /// Step into `value` by this segment.
    pub fn get<'v>(&self, value: &'v Value) -> Option<&'v Value> {
        match value {
            Value::Object(fields) => fields.get(self.as_key().as_ref()),
            Value::Array(items) => self.as_index().and_then(|index| items.get(index)),
            _ => None,
        }
    }
}

fn is_canonical_index(segment: &str) -> bool {
    !segment.is_empty()
        && segment.bytes().all(|b| b.is_ascii_digit())
        && (segment == "0" || !segment.starts_with('0'))
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

/// Full address of a value relative to the traversal root.
///
/// The root itself is the empty path, which displays as the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityPath(Vec<PathSegment>);

impl EntityPath {
    /// The empty path, addressing the traversal root.
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    /// Parse a dotted path such as `collection.2.ba.baba`.
    ///
    /// The empty string parses to [`EntityPath::root`].
    pub fn parse(dotted: &str) -> Self {
        if dotted.is_empty() {
            return Self::root();
        }
        dotted.split('.').map(PathSegment::parse).collect()
    }

    /// Returns the segments in root-to-leaf order.
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Returns true for the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true for the root path.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The last segment: the key or index of the addressed value within its
    /// parent. `None` at the root.
    pub fn last(&self) -> Option<&PathSegment> {
        self.0.last()
    }

    /// Append a segment.
    pub fn push(&mut self, segment: impl Into<PathSegment>) {
        self.0.push(segment.into());
    }

    /// Remove and return the last segment.
    pub fn pop(&mut self) -> Option<PathSegment> {
        self.0.pop()
    }

    /// A new path one segment deeper.
    pub fn child(&self, segment: impl Into<PathSegment>) -> Self {
        let mut child = self.clone();
        child.push(segment);
        child
    }

    /// The path of the enclosing container. `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        self.0.split_last().map(|(_, parent)| Self(parent.to_vec()))
    }

    /// Returns true if `self` is `other` or one of its ancestors.
    pub fn is_prefix_of(&self, other: &EntityPath) -> bool {
        other.0.starts_with(&self.0)
    }

    /// Index a plain value tree along this path.
    ///
    /// The root path returns `value` itself.
    pub fn lookup<'v>(&self, value: &'v Value) -> Option<&'v Value> {
        self.0
            .iter()
            .try_fold(value, |current, segment| segment.get(current))
    }
}

impl fmt::Display for EntityPath {
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

impl From<&str> for EntityPath {
    fn from(dotted: &str) -> Self {
        Self::parse(dotted)
    }
}

impl From<Vec<PathSegment>> for EntityPath {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }
}

impl FromIterator<PathSegment> for EntityPath {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl AsRef<[PathSegment]> for EntityPath {
    fn as_ref(&self) -> &[PathSegment] {
        &self.0
    }
}
