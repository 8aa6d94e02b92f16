//! Composite tree node group: several providers beneath one virtual root.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, instrument, trace};

use crate::domain::error::{TreeError, TreeResult};
use crate::domain::id::NodeId;
use crate::domain::predicate::{Ownership, RootMatcher};
use crate::domain::properties::NodeProperties;
use crate::domain::provider::TreeNodeProvider;

struct Registration {
    provider: Arc<dyn TreeNodeProvider>,
    ownership: Ownership,
}

impl Registration {
    fn name(&self) -> &str {
        self.provider.name()
    }

    fn child_count(&self, id: &NodeId, properties: &NodeProperties) -> TreeResult<usize> {
        self.provider
            .child_count(id, properties)
            .map_err(|source| TreeError::provider(self.name(), source))
    }

    fn children(
        &self,
        id: &NodeId,
        offset: usize,
        limit: usize,
        properties: &NodeProperties,
    ) -> TreeResult<Vec<NodeId>> {
        self.provider
            .children(id, offset, limit, properties)
            .map_err(|source| TreeError::provider(self.name(), source))
    }

    fn parent(&self, id: &NodeId, properties: &NodeProperties) -> TreeResult<Option<NodeId>> {
        self.provider
            .parent(id, properties)
            .map_err(|source| TreeError::provider(self.name(), source))
    }
}

/// Presents independently sourced providers as one tree.
///
/// At the virtual root every provider contributes a contiguous block of
/// children in registration order. Below the root each query goes to the
/// first registration whose ownership accepts the identifier.
///
/// Registrations are appended through `&mut self`; once the group is
/// shared (typically behind an `Arc`) it can only be queried.
pub struct CompositeTreeNodeGroup {
    root: RootMatcher,
    registrations: Vec<Registration>,
}

impl CompositeTreeNodeGroup {
    pub fn new(root: RootMatcher) -> Self {
        Self {
            root,
            registrations: Vec::new(),
        }
    }

    /// Append a provider. Order fixes result order at the virtual root.
    pub fn add_tree_node(
        &mut self,
        provider: Arc<dyn TreeNodeProvider>,
        ownership: Ownership,
    ) -> &mut Self {
        debug!(provider = provider.name(), ?ownership, "registering tree node");
        self.registrations.push(Registration {
            provider,
            ownership,
        });
        self
    }

    /// Append a provider owning exactly the identifiers under `prefix`.
    ///
    /// Fails if any existing registration might accept the same identifiers.
    pub fn add_exclusive_tree_node(
        &mut self,
        provider: Arc<dyn TreeNodeProvider>,
        prefix: impl Into<String>,
    ) -> TreeResult<&mut Self> {
        let prefix = prefix.into();
        let ownership = Ownership::Prefix(prefix.clone());
        if let Some(existing) = self
            .registrations
            .iter()
            .find(|r| r.ownership.may_overlap(&ownership))
        {
            return Err(TreeError::OverlappingOwnership {
                prefix,
                existing: existing.name().to_string(),
            });
        }
        Ok(self.add_tree_node(provider, ownership))
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Provider names in registration order.
    pub fn provider_names(&self) -> Vec<&str> {
        self.registrations.iter().map(Registration::name).collect()
    }

    pub fn is_root(&self, id: &NodeId) -> bool {
        self.root.is_root(id)
    }

    fn owner(&self, id: &NodeId) -> Option<&Registration> {
        self.registrations.iter().find(|r| r.ownership.owns(id))
    }

    #[instrument(level = "debug", skip(self, id, properties), fields(node = %id))]
    pub fn child_count(&self, id: &NodeId, properties: &NodeProperties) -> TreeResult<usize> {
        if self.is_root(id) {
            let mut total = 0;
            for registration in &self.registrations {
                total += registration.child_count(id, properties)?;
            }
            return Ok(total);
        }

        match self.owner(id) {
            Some(registration) => registration.child_count(id, properties),
            None => {
                trace!("no owner, no children");
                Ok(0)
            }
        }
    }

    #[instrument(level = "debug", skip(self, id, properties), fields(node = %id))]
    pub fn children(
        &self,
        id: &NodeId,
        offset: usize,
        limit: usize,
        properties: &NodeProperties,
    ) -> TreeResult<Vec<NodeId>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        if !self.is_root(id) {
            return match self.owner(id) {
                Some(registration) => registration.children(id, offset, limit, properties),
                None => {
                    trace!("no owner, no children");
                    Ok(Vec::new())
                }
            };
        }

        // Slide the window across the providers' blocks without
        // materializing the concatenation.
        let mut children = Vec::new();
        let mut offset = offset;
        let mut remaining = limit;
        for registration in &self.registrations {
            if remaining == 0 {
                break;
            }
            let count = registration.child_count(id, properties)?;
            if offset >= count {
                offset -= count;
                continue;
            }
            let window = remaining.min(count - offset);
            let mut block = registration.children(id, offset, window, properties)?;
            block.truncate(window);
            trace!(
                provider = registration.name(),
                offset,
                window,
                returned = block.len(),
                "root block"
            );
            remaining -= block.len();
            children.extend(block);
            offset = 0;
        }
        Ok(children)
    }

    #[instrument(level = "debug", skip(self, id, properties), fields(node = %id))]
    pub fn parent(&self, id: &NodeId, properties: &NodeProperties) -> TreeResult<NodeId> {
        let registration = self
            .owner(id)
            .ok_or_else(|| TreeError::UnownedNode(id.clone()))?;
        registration
            .parent(id, properties)?
            .ok_or_else(|| TreeError::UnownedNode(id.clone()))
    }
}

impl fmt::Debug for CompositeTreeNodeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeTreeNodeGroup")
            .field("root", &self.root)
            .field("providers", &self.provider_names())
            .finish()
    }
}
