//! Tree files: TOML description of a wiki's pinned pages and documents.
//!
//! ```toml
//! root = "wiki:xwiki"
//!
//! [properties]
//! locale = "en"
//!
//! [pinned]
//! "wiki:xwiki" = ["pinned:xwiki:Help.WebHome"]
//!
//! [documents]
//! "wiki:xwiki" = ["document:xwiki:Main.WebHome", "document:xwiki:Sandbox.WebHome"]
//! "document:xwiki:Main.WebHome" = ["document:xwiki:Main.Child"]
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{
    MemoryTreeProvider, NodeId, NodeProperties, Ownership, RootMatcher, TreeError, TreeResult,
    WikiTreeNode,
};

/// Root used when a tree file does not name one.
pub const DEFAULT_ROOT: &str = "wiki:xwiki";

/// Parsed tree file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TreeFile {
    pub root: Option<NodeId>,
    pub properties: NodeProperties,
    /// Parent -> ordered pinned children.
    pub pinned: BTreeMap<NodeId, Vec<NodeId>>,
    /// Parent -> ordered ordinary children.
    pub documents: BTreeMap<NodeId, Vec<NodeId>>,
}

/// A wiki node assembled from a tree file, with the root it answers for.
#[derive(Debug, Clone)]
pub struct LoadedTree {
    pub root: NodeId,
    pub node: WikiTreeNode,
}

impl TreeFile {
    pub fn parse(content: &str, path: &Path) -> ApplicationResult<Self> {
        toml::from_str(content).map_err(|e| ApplicationError::InvalidTreeFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn root(&self) -> NodeId {
        self.root.clone().unwrap_or_else(|| NodeId::new(DEFAULT_ROOT))
    }

    /// Build both providers and check their identifier spaces are disjoint.
    ///
    /// The wiki node routes nested identifiers to the pinned provider
    /// first, so an identifier present in both would hide the document.
    /// Pinned parents must be the root or pinned nodes: the pinned provider
    /// answers for nothing else.
    #[instrument(level = "debug", skip(self))]
    pub fn providers(&self) -> TreeResult<(MemoryTreeProvider, MemoryTreeProvider)> {
        let pinned = Self::provider("pinned", &self.pinned)?;
        let documents = Self::provider("documents", &self.documents)?;

        let root = self.root();
        let pinned_nodes: HashSet<&NodeId> = pinned.nodes().collect();
        if let Some(parent) = self
            .pinned
            .keys()
            .find(|parent| **parent != root && !pinned_nodes.contains(parent))
        {
            return Err(TreeError::UnreachableParent(parent.clone()));
        }
        if let Some(shared) = documents.nodes().find(|id| pinned_nodes.contains(id)) {
            return Err(TreeError::OverlappingIdentifier(shared.clone()));
        }

        debug!(pinned = pinned.len(), documents = documents.len(), "providers built");
        Ok((pinned, documents))
    }

    fn provider(name: &str, edges: &BTreeMap<NodeId, Vec<NodeId>>) -> TreeResult<MemoryTreeProvider> {
        let mut provider = MemoryTreeProvider::new(name);
        for (parent, children) in edges {
            for child in children {
                provider.insert(parent.clone(), child.clone())?;
            }
        }
        Ok(provider)
    }

    /// Assemble the wiki node; `overrides` win over the file's properties.
    ///
    /// The pinned provider owns only the identifiers it lists, so nested
    /// documents are answered by the documents provider.
    pub fn into_tree(self, overrides: &NodeProperties) -> ApplicationResult<LoadedTree> {
        let (pinned, documents) = self.providers()?;
        let pinned_nodes: HashSet<NodeId> = pinned.nodes().cloned().collect();
        let root = self.root();
        let node = WikiTreeNode::builder(Arc::new(pinned), Arc::new(documents))
            .pinned_ownership(Ownership::predicate(move |id| pinned_nodes.contains(id)))
            .root(RootMatcher::Exact(root.clone()))
            .properties(self.properties.merged(overrides))
            .build();
        Ok(LoadedTree { root, node })
    }
}
