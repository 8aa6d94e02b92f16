//! In-memory provider backed by an ordered adjacency map.

use std::collections::{BTreeMap, HashMap};

use tracing::instrument;

use crate::domain::error::{TreeError, TreeResult};
use crate::domain::id::NodeId;
use crate::domain::properties::NodeProperties;
use crate::domain::provider::{ProviderResult, TreeNodeProvider};

/// Provider over parent -> ordered children edges.
///
/// Every child has exactly one parent; the child -> parent index is kept
/// alongside so `parent` is a single lookup.
#[derive(Debug, Clone, Default)]
pub struct MemoryTreeProvider {
    name: String,
    children: BTreeMap<NodeId, Vec<NodeId>>,
    parents: HashMap<NodeId, NodeId>,
}

impl MemoryTreeProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Append `child` to the children of `parent`.
    pub fn insert(&mut self, parent: impl Into<NodeId>, child: impl Into<NodeId>) -> TreeResult<()> {
        let parent = parent.into();
        let child = child.into();
        if self.parents.contains_key(&child) {
            return Err(TreeError::DuplicateChild { parent, child });
        }
        self.parents.insert(child.clone(), parent.clone());
        self.children.entry(parent).or_default().push(child);
        Ok(())
    }

    pub fn with_children<I, C>(mut self, parent: impl Into<NodeId>, children: I) -> TreeResult<Self>
    where
        I: IntoIterator<Item = C>,
        C: Into<NodeId>,
    {
        let parent = parent.into();
        for child in children {
            self.insert(parent.clone(), child)?;
        }
        Ok(self)
    }

    /// Every identifier this provider produces as a child.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeId> {
        self.parents.keys()
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.parents.contains_key(id) || self.children.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}

impl TreeNodeProvider for MemoryTreeProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn child_count(&self, id: &NodeId, _properties: &NodeProperties) -> ProviderResult<usize> {
        Ok(self.children.get(id).map_or(0, Vec::len))
    }

    #[instrument(level = "trace", skip(self, _properties), fields(provider = %self.name))]
    fn children(
        &self,
        id: &NodeId,
        offset: usize,
        limit: usize,
        _properties: &NodeProperties,
    ) -> ProviderResult<Vec<NodeId>> {
        Ok(self
            .children
            .get(id)
            .map(|all| all.iter().skip(offset).take(limit).cloned().collect())
            .unwrap_or_default())
    }

    fn parent(&self, id: &NodeId, _properties: &NodeProperties) -> ProviderResult<Option<NodeId>> {
        Ok(self.parents.get(id).cloned())
    }
}
