//! Contract every child provider satisfies

use crate::domain::id::NodeId;
use crate::domain::properties::NodeProperties;

/// Error raised by a provider's data source.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for provider calls.
pub type ProviderResult<T> = Result<T, BoxError>;

/// One logical sub-tree, e.g. "pinned pages under a wiki".
///
/// Implementations treat an identifier they do not recognize as a node
/// without children. The two calls `child_count` then `children` need not
/// observe the same snapshot of the underlying data.
pub trait TreeNodeProvider: Send + Sync {
    /// Label used when tagging failures.
    fn name(&self) -> &str;

    /// Number of direct children of `id`.
    fn child_count(&self, id: &NodeId, properties: &NodeProperties) -> ProviderResult<usize>;

    /// Up to `limit` children of `id` starting at `offset`, in the provider's
    /// own stable order. Past the end this is the remaining tail, or empty.
    fn children(
        &self,
        id: &NodeId,
        offset: usize,
        limit: usize,
        properties: &NodeProperties,
    ) -> ProviderResult<Vec<NodeId>>;

    /// Direct parent of `id`, `None` if the provider does not know `id`.
    fn parent(&self, id: &NodeId, properties: &NodeProperties) -> ProviderResult<Option<NodeId>>;
}
