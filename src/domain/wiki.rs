//! The wiki tree node: pinned pages and documents under one root.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::domain::composite::CompositeTreeNodeGroup;
use crate::domain::error::TreeResult;
use crate::domain::id::NodeId;
use crate::domain::predicate::{Ownership, RootMatcher};
use crate::domain::properties::NodeProperties;
use crate::domain::provider::{ProviderResult, TreeNodeProvider};

/// Node type hint of wiki nodes.
pub const HINT: &str = "wiki";

/// Prefix of wiki node identifiers (`wiki:xwiki`).
pub const WIKI_NODE_PREFIX: &str = "wiki:";

/// Entry point of a wiki's tree.
///
/// Children are the pinned pages followed by the ordinary documents. By
/// default both providers accept every identifier below the root, so they
/// must produce disjoint identifiers: for a nested identifier the pinned
/// provider is asked first. Narrow the pinned ownership with
/// [`WikiTreeNodeBuilder::pinned_ownership`] to let nested documents reach
/// the documents provider.
///
/// Cloning is cheap; clones share the child group and may carry different
/// properties.
#[derive(Debug, Clone)]
pub struct WikiTreeNode {
    child_nodes: Arc<CompositeTreeNodeGroup>,
    properties: NodeProperties,
}

/// Assembles a [`WikiTreeNode`]; `build` runs the registration exactly once.
pub struct WikiTreeNodeBuilder {
    pinned_child_pages: Arc<dyn TreeNodeProvider>,
    child_documents: Arc<dyn TreeNodeProvider>,
    pinned_ownership: Ownership,
    root: RootMatcher,
    properties: NodeProperties,
}

impl WikiTreeNodeBuilder {
    /// Which identifiers denote this node (default: any `wiki:` identifier).
    pub fn root(mut self, root: RootMatcher) -> Self {
        self.root = root;
        self
    }

    pub fn properties(mut self, properties: NodeProperties) -> Self {
        self.properties = properties;
        self
    }

    /// Identifiers below the root the pinned provider answers for (default: all).
    pub fn pinned_ownership(mut self, ownership: Ownership) -> Self {
        self.pinned_ownership = ownership;
        self
    }

    pub fn build(self) -> WikiTreeNode {
        let mut child_nodes = CompositeTreeNodeGroup::new(self.root);
        child_nodes
            .add_tree_node(self.pinned_child_pages, self.pinned_ownership)
            .add_tree_node(self.child_documents, Ownership::Always);
        debug!(?child_nodes, "wiki tree node ready");

        WikiTreeNode {
            child_nodes: Arc::new(child_nodes),
            properties: self.properties,
        }
    }
}

impl WikiTreeNode {
    pub fn builder(
        pinned_child_pages: Arc<dyn TreeNodeProvider>,
        child_documents: Arc<dyn TreeNodeProvider>,
    ) -> WikiTreeNodeBuilder {
        WikiTreeNodeBuilder {
            pinned_child_pages,
            child_documents,
            pinned_ownership: Ownership::Always,
            root: RootMatcher::prefix(WIKI_NODE_PREFIX),
            properties: NodeProperties::new(),
        }
    }

    pub fn properties(&self) -> &NodeProperties {
        &self.properties
    }

    /// Same tree, different properties.
    pub fn with_properties(&self, properties: NodeProperties) -> Self {
        Self {
            child_nodes: Arc::clone(&self.child_nodes),
            properties,
        }
    }

    pub fn with_property(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_properties(self.properties.clone().with(key, value))
    }

    pub fn child_nodes(&self) -> &CompositeTreeNodeGroup {
        &self.child_nodes
    }

    #[instrument(level = "debug", skip(self, id), fields(node = %id))]
    pub fn child_count(&self, id: &NodeId) -> TreeResult<usize> {
        self.child_nodes.child_count(id, &self.properties)
    }

    #[instrument(level = "debug", skip(self, id), fields(node = %id))]
    pub fn children(&self, id: &NodeId, offset: usize, limit: usize) -> TreeResult<Vec<NodeId>> {
        self.child_nodes.children(id, offset, limit, &self.properties)
    }

    /// Always the farm: a wiki sits directly below the top.
    pub fn parent(&self, _id: &NodeId) -> NodeId {
        NodeId::farm()
    }
}

/// A wiki node can itself be registered in a farm-level group; the
/// caller's properties replace the node's own.
impl TreeNodeProvider for WikiTreeNode {
    fn name(&self) -> &str {
        HINT
    }

    fn child_count(&self, id: &NodeId, properties: &NodeProperties) -> ProviderResult<usize> {
        Ok(self.child_nodes.child_count(id, properties)?)
    }

    fn children(
        &self,
        id: &NodeId,
        offset: usize,
        limit: usize,
        properties: &NodeProperties,
    ) -> ProviderResult<Vec<NodeId>> {
        Ok(self.child_nodes.children(id, offset, limit, properties)?)
    }

    fn parent(&self, _id: &NodeId, _properties: &NodeProperties) -> ProviderResult<Option<NodeId>> {
        Ok(Some(NodeId::farm()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::memory::MemoryTreeProvider;

    fn wiki() -> WikiTreeNode {
        let pinned = MemoryTreeProvider::new("pinned")
            .with_children("wiki:xwiki", ["pinned:Help"])
            .unwrap();
        let documents = MemoryTreeProvider::new("documents")
            .with_children("wiki:xwiki", ["document:Main", "document:Sandbox"])
            .unwrap();
        WikiTreeNode::builder(Arc::new(pinned), Arc::new(documents)).build()
    }

    #[test]
    fn given_built_node_when_inspecting_group_then_pinned_registered_first() {
        assert_eq!(wiki().child_nodes().provider_names(), vec!["pinned", "documents"]);
    }

    #[test]
    fn given_wiki_when_listing_root_then_pinned_before_documents() {
        let children = wiki().children(&NodeId::new("wiki:xwiki"), 0, 10).unwrap();
        assert_eq!(children, vec!["pinned:Help", "document:Main", "document:Sandbox"]);
    }

    #[test]
    fn given_with_property_when_cloned_then_original_untouched() {
        let node = wiki();
        let french = node.with_property("locale", "fr");

        assert_eq!(french.properties().get("locale"), Some("fr"));
        assert!(node.properties().is_empty());
    }
}
