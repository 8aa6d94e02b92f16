//! Ownership predicates and virtual root matching

use std::fmt;
use std::sync::Arc;

use crate::domain::id::NodeId;

/// Shared predicate over node identifiers.
pub type NodePredicate = Arc<dyn Fn(&NodeId) -> bool + Send + Sync>;

/// Decides whether a provider answers for an identifier below the root.
#[derive(Clone)]
pub enum Ownership {
    /// Accepts every identifier.
    Always,
    /// Accepts identifiers starting with the prefix.
    Prefix(String),
    /// Arbitrary predicate.
    Predicate(NodePredicate),
}

impl Ownership {
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self::Prefix(prefix.into())
    }

    pub fn predicate(f: impl Fn(&NodeId) -> bool + Send + Sync + 'static) -> Self {
        Self::Predicate(Arc::new(f))
    }

    pub fn owns(&self, id: &NodeId) -> bool {
        match self {
            Self::Always => true,
            Self::Prefix(prefix) => id.as_str().starts_with(prefix.as_str()),
            Self::Predicate(f) => f(id),
        }
    }

    /// Whether some identifier may be accepted by both.
    ///
    /// Only two prefixes can be proven disjoint; anything involving
    /// `Always` or an opaque predicate counts as overlapping.
    pub fn may_overlap(&self, other: &Ownership) -> bool {
        match (self, other) {
            (Self::Prefix(a), Self::Prefix(b)) => a.starts_with(b.as_str()) || b.starts_with(a.as_str()),
            _ => true,
        }
    }
}

impl fmt::Debug for Ownership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => f.write_str("Always"),
            Self::Prefix(prefix) => f.debug_tuple("Prefix").field(prefix).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// Decides which identifiers denote the virtual root of a group.
#[derive(Clone)]
pub enum RootMatcher {
    Exact(NodeId),
    Prefix(String),
    Predicate(NodePredicate),
}

impl RootMatcher {
    pub fn exact(id: impl Into<NodeId>) -> Self {
        Self::Exact(id.into())
    }

    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self::Prefix(prefix.into())
    }

    pub fn predicate(f: impl Fn(&NodeId) -> bool + Send + Sync + 'static) -> Self {
        Self::Predicate(Arc::new(f))
    }

    pub fn is_root(&self, id: &NodeId) -> bool {
        match self {
            Self::Exact(root) => root == id,
            Self::Prefix(prefix) => id.as_str().starts_with(prefix.as_str()),
            Self::Predicate(f) => f(id),
        }
    }
}

impl fmt::Debug for RootMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(id) => f.debug_tuple("Exact").field(id).finish(),
            Self::Prefix(prefix) => f.debug_tuple("Prefix").field(prefix).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("pinned:", "document:", false)]
    #[case("document:", "document:xwiki:", true)]
    #[case("document:xwiki:", "document:", true)]
    #[case("space:", "space:", true)]
    fn given_two_prefixes_when_checking_overlap_then_detects_shared_namespace(
        #[case] a: &str,
        #[case] b: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(Ownership::prefix(a).may_overlap(&Ownership::prefix(b)), expected);
    }

    #[test]
    fn given_always_or_predicate_when_checking_overlap_then_assumes_overlap() {
        let prefix = Ownership::prefix("pinned:");
        assert!(Ownership::Always.may_overlap(&prefix));
        assert!(prefix.may_overlap(&Ownership::predicate(|_| false)));
    }

    #[test]
    fn given_prefix_ownership_when_testing_ids_then_matches_namespace_only() {
        let owns = Ownership::prefix("pinned:");
        assert!(owns.owns(&NodeId::new("pinned:xwiki:Help.WebHome")));
        assert!(!owns.owns(&NodeId::new("document:xwiki:Help.WebHome")));
    }

    #[test]
    fn given_exact_root_when_matching_then_only_that_id_is_root() {
        let root = RootMatcher::exact("wiki:xwiki");
        assert!(root.is_root(&NodeId::new("wiki:xwiki")));
        assert!(!root.is_root(&NodeId::new("wiki:xwiki2")));
        assert!(RootMatcher::prefix("wiki:").is_root(&NodeId::new("wiki:xwiki2")));
    }
}
