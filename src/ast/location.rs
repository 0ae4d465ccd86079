use std::fmt;

use serde::Serialize;

/// Where the properties referenced by a subtree are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Location {
    /// The backing directory
    Repository,
    /// The locally managed overlay store
    LookAside,
    /// Parsed without a metadata oracle
    Unclassified,
}

impl Location {
    /// Location of a combinator whose operands are at `left` and `right`.
    ///
    /// `None` stands for a federated (mixed) subtree and is absorbing.
    pub fn combine(left: Option<Location>, right: Option<Location>) -> Option<Location> {
        match (left, right) {
            (Some(l), Some(r)) if l == r => Some(l),
            _ => None,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Location::Repository => "repository",
            Location::LookAside => "look-aside",
            Location::Unclassified => "unclassified",
        };
        f.write_str(text)
    }
}

#[test]
fn test_combine() {
    use Location::*;
    assert_eq!(Location::combine(Some(Repository), Some(Repository)), Some(Repository));
    assert_eq!(Location::combine(Some(LookAside), Some(LookAside)), Some(LookAside));
    assert_eq!(Location::combine(Some(Repository), Some(LookAside)), None);
    assert_eq!(Location::combine(None, Some(Repository)), None);
    assert_eq!(Location::combine(Some(LookAside), None), None);
}
