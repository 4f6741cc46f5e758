#![forbid(unsafe_code)]

//! Validity tree addresses and their flat key projection.
//!
//! A [`ValidityPath`] names one node of the validity tree: the whole model,
//! one attribute, or one test of one attribute. Records never store the tree
//! itself; each node is projected into two keys joined by a separator:
//!
//! ```
//! use vmodel_core::ValidityPath;
//!
//! let path = ValidityPath::test("name", "required");
//! assert_eq!(path.valid_key("/"), "$valid/name/required");
//! assert_eq!(path.invalid_key("#"), "$invalid#name#required");
//! assert_eq!(ValidityPath::Root.valid_key("/"), "$valid");
//! ```

use std::fmt;

/// Key prefix for the positive flag of every node.
pub const VALID_PREFIX: &str = "$valid";

/// Key prefix for the negated flag of every node.
pub const INVALID_PREFIX: &str = "$invalid";

/// Separator used when none is configured.
pub const DEFAULT_SEPARATOR: &str = "/";

/// Address of a node in the validity tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValidityPath {
    /// The whole model.
    Root,
    /// One declared attribute.
    Attribute(String),
    /// One declared test of one attribute.
    Test { attribute: String, test: String },
}

impl ValidityPath {
    /// Path of an attribute node.
    #[must_use]
    pub fn attribute(name: impl Into<String>) -> Self {
        Self::Attribute(name.into())
    }

    /// Path of a test node.
    #[must_use]
    pub fn test(attribute: impl Into<String>, test: impl Into<String>) -> Self {
        Self::Test {
            attribute: attribute.into(),
            test: test.into(),
        }
    }

    /// Path segments, root first. Empty for [`ValidityPath::Root`].
    #[must_use]
    pub fn segments(&self) -> Vec<&str> {
        match self {
            Self::Root => Vec::new(),
            Self::Attribute(attribute) => vec![attribute.as_str()],
            Self::Test { attribute, test } => vec![attribute.as_str(), test.as_str()],
        }
    }

    /// Number of segments (0, 1 or 2).
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Root => 0,
            Self::Attribute(_) => 1,
            Self::Test { .. } => 2,
        }
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        matches!(self, Self::Root)
    }

    /// The attribute this path belongs to, if any.
    #[must_use]
    pub fn attribute_name(&self) -> Option<&str> {
        match self {
            Self::Root => None,
            Self::Attribute(attribute) | Self::Test { attribute, .. } => Some(attribute),
        }
    }

    /// The parent node. The root is its own parent.
    #[must_use]
    pub fn parent(&self) -> Self {
        match self {
            Self::Root | Self::Attribute(_) => Self::Root,
            Self::Test { attribute, .. } => Self::Attribute(attribute.clone()),
        }
    }

    /// Segments joined by `separator`. Empty for the root.
    #[must_use]
    pub fn join(&self, separator: &str) -> String {
        self.segments().join(separator)
    }

    /// Key holding this node's validity flag.
    #[must_use]
    pub fn valid_key(&self, separator: &str) -> String {
        self.key(VALID_PREFIX, separator)
    }

    /// Key holding the negation of this node's validity flag.
    #[must_use]
    pub fn invalid_key(&self, separator: &str) -> String {
        self.key(INVALID_PREFIX, separator)
    }

    fn key(&self, prefix: &str, separator: &str) -> String {
        let mut key = String::from(prefix);
        for segment in self.segments() {
            key.push_str(separator);
            key.push_str(segment);
        }
        key
    }
}

impl fmt::Display for ValidityPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            f.write_str("<root>")
        } else {
            f.write_str(&self.join(DEFAULT_SEPARATOR))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_keys_have_no_separator() {
        assert_eq!(ValidityPath::Root.valid_key("/"), "$valid");
        assert_eq!(ValidityPath::Root.invalid_key("::"), "$invalid");
        assert_eq!(ValidityPath::Root.join("/"), "");
    }

    #[test]
    fn attribute_keys() {
        let path = ValidityPath::attribute("age");
        assert_eq!(path.valid_key("/"), "$valid/age");
        assert_eq!(path.invalid_key("/"), "$invalid/age");
        assert_eq!(path.depth(), 1);
    }

    #[test]
    fn multi_char_separator() {
        let path = ValidityPath::test("age", "positive");
        assert_eq!(path.valid_key("::"), "$valid::age::positive");
        assert_eq!(path.join("::"), "age::positive");
    }

    #[test]
    fn parent_chain_reaches_root() {
        let path = ValidityPath::test("name", "length");
        assert_eq!(path.parent(), ValidityPath::attribute("name"));
        assert_eq!(path.parent().parent(), ValidityPath::Root);
        assert_eq!(ValidityPath::Root.parent(), ValidityPath::Root);
    }

    #[test]
    fn attribute_name_lookup() {
        assert_eq!(ValidityPath::Root.attribute_name(), None);
        assert_eq!(ValidityPath::test("a", "b").attribute_name(), Some("a"));
    }

    #[test]
    fn display_uses_default_separator() {
        assert_eq!(ValidityPath::test("name", "required").to_string(), "name/required");
        assert_eq!(ValidityPath::Root.to_string(), "<root>");
    }
}
