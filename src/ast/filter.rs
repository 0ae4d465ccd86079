use serde::Serialize;

use crate::ast::AstNode;

/// Entity types named by `@xsi:type='...'` tests, in order of appearance.
///
/// Duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EntityTypeSet(Vec<String>);

impl EntityTypeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entity_type: impl Into<String>) {
        self.0.push(entity_type.into());
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, entity_type: &str) -> bool {
        self.0.iter().any(|t| t == entity_type)
    }
}

impl From<Vec<String>> for EntityTypeSet {
    fn from(types: Vec<String>) -> Self {
        EntityTypeSet(types)
    }
}

impl<'a> IntoIterator for &'a EntityTypeSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A parsed search expression.
///
/// `predicate` is `None` for type-only expressions such as
/// `//entities[@xsi:type='Group']`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Filter {
    pub entity_types: EntityTypeSet,
    pub predicate: Option<AstNode>,
}

impl Filter {
    /// True when the predicate spans both stores and must be split.
    pub fn is_federated(&self) -> bool {
        self.predicate.as_ref().is_some_and(AstNode::is_federated)
    }
}
