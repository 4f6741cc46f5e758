#![forbid(unsafe_code)]

//! Test declarations: which predicates decide the validity of which attribute.
//!
//! A [`TestDeclaration`] maps attribute names to named predicates. Both levels
//! keep declaration order, which is the order the engine evaluates and
//! publishes them in.
//!
//! ```
//! use vmodel_core::{TestDeclaration, is_truthy, to_number};
//!
//! let declaration = TestDeclaration::builder()
//!     .attribute("name", |t| {
//!         t.test("required", |v, _| v.as_str() != Some(""))
//!             .test("length", |v, _| v.as_str().is_some_and(|s| s.chars().count() >= 3))
//!     })
//!     .attribute("age", |t| {
//!         t.test("required", |v, _| is_truthy(v))
//!             .test("positive", |v, _| to_number(v) > 0.0)
//!     })
//!     .build();
//!
//! assert_eq!(declaration.len(), 2);
//! assert_eq!(declaration.test_count(), 4);
//! ```

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::record::ObservableRecord;
use crate::validity_override::ValidityOverride;
use crate::value::Value;

/// A single test: receives the attribute value and the subject record.
pub type Predicate = Rc<dyn Fn(&Value, &dyn ObservableRecord) -> bool>;

/// Ordered named predicates for one attribute.
#[derive(Clone, Default)]
pub struct AttributeTests {
    tests: IndexMap<String, Predicate>,
}

impl AttributeTests {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a test. Re-declaring a name replaces its predicate but keeps
    /// its original position.
    #[must_use]
    pub fn test(
        mut self,
        name: impl Into<String>,
        predicate: impl Fn(&Value, &dyn ObservableRecord) -> bool + 'static,
    ) -> Self {
        self.tests.insert(name.into(), Rc::new(predicate));
        self
    }

    /// Tests in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Predicate)> {
        self.tests.iter().map(|(name, p)| (name.as_str(), p))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tests.keys().map(String::as_str)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Predicate> {
        self.tests.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tests.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }
}

impl fmt::Debug for AttributeTests {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.tests.keys()).finish()
    }
}

/// Attribute name → test name → predicate.
///
/// Immutable once attached to a record; share it through `Rc`.
#[derive(Clone, Default)]
pub struct TestDeclaration {
    attributes: IndexMap<String, AttributeTests>,
}

impl TestDeclaration {
    /// An empty declaration. Binding it publishes only the root node.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn builder() -> TestDeclarationBuilder {
        TestDeclarationBuilder::default()
    }

    /// Attributes in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeTests)> {
        self.attributes.iter().map(|(name, t)| (name.as_str(), t))
    }

    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&AttributeTests> {
        self.attributes.get(name)
    }

    /// Number of declared attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Number of declared tests across all attributes.
    #[must_use]
    pub fn test_count(&self) -> usize {
        self.attributes.values().map(AttributeTests::len).sum()
    }
}

impl fmt::Debug for TestDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.attributes.iter()).finish()
    }
}

/// Builder for [`TestDeclaration`].
#[derive(Default)]
pub struct TestDeclarationBuilder {
    declaration: TestDeclaration,
}

impl TestDeclarationBuilder {
    /// Declare an attribute and its tests. Re-declaring an attribute replaces
    /// its tests in place.
    #[must_use]
    pub fn attribute(
        mut self,
        name: impl Into<String>,
        tests: impl FnOnce(AttributeTests) -> AttributeTests,
    ) -> Self {
        self.declaration
            .attributes
            .insert(name.into(), tests(AttributeTests::new()));
        self
    }

    #[must_use]
    pub fn build(self) -> TestDeclaration {
        self.declaration
    }
}

/// A record that can be validated.
///
/// The subject exposes its test declarations by property name and may carry
/// its own validity override, consulted when no override is configured.
pub trait ValidatedRecord: ObservableRecord {
    /// The declaration stored under `property`, if any.
    fn test_declaration(&self, property: &str) -> Option<Rc<TestDeclaration>>;

    fn validity_override(&self) -> Option<Rc<dyn ValidityOverride>> {
        None
    }
}
