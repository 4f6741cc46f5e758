#![forbid(unsafe_code)]

//! Read-side projection of published validity flags.
//!
//! The engine never keeps the validity tree in memory; it only writes flat
//! keys to the sink. [`ValidityTree::read`] rebuilds the tree from those keys
//! for callers that want structured access (form rendering, diagnostics).
//! Nodes that were never written read as `None`.

use vmodel_core::{ObservableRecord, TestDeclaration, ValidityPath};

/// Published validity of one test.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestValidity {
    pub name: String,
    pub valid: Option<bool>,
}

/// Published validity of one attribute and its tests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeValidity {
    pub name: String,
    pub valid: Option<bool>,
    pub tests: Vec<TestValidity>,
}

impl AttributeValidity {
    #[must_use]
    pub fn test(&self, name: &str) -> Option<&TestValidity> {
        self.tests.iter().find(|t| t.name == name)
    }
}

/// Published validity of the whole model, in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidityTree {
    pub valid: Option<bool>,
    pub attributes: Vec<AttributeValidity>,
}

impl ValidityTree {
    /// Read the flags for `declaration` from `sink`.
    #[must_use]
    pub fn read(
        sink: &dyn ObservableRecord,
        declaration: Option<&TestDeclaration>,
        separator: &str,
    ) -> Self {
        let flag = |path: &ValidityPath| sink.get_bool(&path.valid_key(separator));
        let attributes = declaration
            .into_iter()
            .flat_map(TestDeclaration::iter)
            .map(|(attribute, tests)| AttributeValidity {
                name: attribute.to_string(),
                valid: flag(&ValidityPath::attribute(attribute)),
                tests: tests
                    .names()
                    .map(|test| TestValidity {
                        name: test.to_string(),
                        valid: flag(&ValidityPath::test(attribute, test)),
                    })
                    .collect(),
            })
            .collect();
        Self {
            valid: flag(&ValidityPath::Root),
            attributes,
        }
    }

    /// Whether the root was published as valid.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid == Some(true)
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&AttributeValidity> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Paths of every attribute and test published as invalid.
    #[must_use]
    pub fn failing_paths(&self) -> Vec<ValidityPath> {
        let mut failing = Vec::new();
        for attribute in &self.attributes {
            for test in &attribute.tests {
                if test.valid == Some(false) {
                    failing.push(ValidityPath::test(&attribute.name, &test.name));
                }
            }
            if attribute.valid == Some(false) {
                failing.push(ValidityPath::attribute(&attribute.name));
            }
        }
        failing
    }
}

/// Paths whose `$valid`/`$invalid` pair is missing a half or not negated.
///
/// Paths where neither key was written are not reported.
#[must_use]
pub fn inconsistent_paths(
    sink: &dyn ObservableRecord,
    declaration: Option<&TestDeclaration>,
    separator: &str,
) -> Vec<ValidityPath> {
    let mut paths = vec![ValidityPath::Root];
    if let Some(declaration) = declaration {
        for (attribute, tests) in declaration.iter() {
            paths.push(ValidityPath::attribute(attribute));
            paths.extend(tests.names().map(|test| ValidityPath::test(attribute, test)));
        }
    }
    paths
        .into_iter()
        .filter(|path| {
            let valid = sink.get_bool(&path.valid_key(separator));
            let invalid = sink.get_bool(&path.invalid_key(separator));
            match (valid, invalid) {
                (None, None) => false,
                (Some(v), Some(i)) => v == i,
                _ => true,
            }
        })
        .collect()
}
