//! Tree browsing service
//!
//! Loads wiki trees from tree files and serves paginated views of them.

use std::path::Path;
use std::sync::Arc;

use termtree::Tree;
use tracing::{debug, instrument};

use crate::application::tree_file::{LoadedTree, TreeFile};
use crate::application::{ApplicationError, ApplicationResult};
use crate::config::Settings;
use crate::domain::{NodeId, NodeProperties, WikiTreeNode};
use crate::infrastructure::traits::FileSystem;

/// One page of children.
///
/// `total` and `children` come from two separate provider calls and may
/// disagree if the underlying data changed in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildPage {
    pub parent: NodeId,
    pub offset: usize,
    pub total: usize,
    pub children: Vec<NodeId>,
}

impl ChildPage {
    /// Offset of the following page, if any.
    pub fn next_offset(&self) -> Option<usize> {
        let next = self.offset + self.children.len();
        (!self.children.is_empty() && next < self.total).then_some(next)
    }

    pub fn has_more(&self) -> bool {
        self.next_offset().is_some()
    }
}

/// Service for loading and browsing wiki trees.
pub struct TreeService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
}

impl TreeService {
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self { fs, settings }
    }

    /// Load the tree file at `path`, or the configured one.
    ///
    /// Properties layer as: tree file < settings < `overrides`.
    #[instrument(level = "debug", skip(self, overrides))]
    pub fn load(&self, path: Option<&Path>, overrides: &NodeProperties) -> ApplicationResult<LoadedTree> {
        let path = path
            .or(self.settings.tree_file.as_deref())
            .ok_or(ApplicationError::NoTreeFile)?;
        if !self.fs.exists(path) {
            return Err(ApplicationError::TreeFileNotFound(path.to_path_buf()));
        }
        let content = self
            .fs
            .read_to_string(path)
            .map_err(|e| ApplicationError::OperationFailed {
                context: format!("read tree file: {}", path.display()),
                source: Box::new(e),
            })?;

        let properties = self.settings.properties.merged(overrides);
        let tree = TreeFile::parse(&content, path)?.into_tree(&properties)?;
        debug!(root = %tree.root, "tree loaded");
        Ok(tree)
    }

    /// Children of `id` starting at `offset`; `limit` defaults to the page size.
    #[instrument(level = "debug", skip(self, node, id), fields(node = %id))]
    pub fn page(
        &self,
        node: &WikiTreeNode,
        id: &NodeId,
        offset: usize,
        limit: Option<usize>,
    ) -> ApplicationResult<ChildPage> {
        let limit = limit.unwrap_or(self.settings.page_size);
        let total = node.child_count(id)?;
        let children = node.children(id, offset, limit)?;
        Ok(ChildPage {
            parent: id.clone(),
            offset,
            total,
            children,
        })
    }

    /// Render the first page of every level down to `depth` (default: max depth).
    #[instrument(level = "debug", skip(self, node, id), fields(node = %id))]
    pub fn render(
        &self,
        node: &WikiTreeNode,
        id: &NodeId,
        depth: Option<usize>,
    ) -> ApplicationResult<Tree<String>> {
        let depth = depth.unwrap_or(self.settings.max_depth);
        let mut tree = Tree::new(id.to_string());
        self.render_level(node, id, depth, &mut tree)?;
        Ok(tree)
    }

    fn render_level(
        &self,
        node: &WikiTreeNode,
        id: &NodeId,
        depth: usize,
        parent: &mut Tree<String>,
    ) -> ApplicationResult<()> {
        if depth == 0 {
            return Ok(());
        }
        let page = self.page(node, id, 0, None)?;
        for child in &page.children {
            let mut leaf = Tree::new(child.to_string());
            self.render_level(node, child, depth - 1, &mut leaf)?;
            parent.push(leaf);
        }
        if page.has_more() {
            let hidden = page.total - page.children.len();
            parent.push(Tree::new(format!("... {hidden} more")));
        }
        Ok(())
    }
}
