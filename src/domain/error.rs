//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::id::NodeId;
use crate::domain::provider::BoxError;

/// Tree errors.
///
/// An identifier no provider knows is not an error: counts are 0 and
/// windows are empty. What remains is misassembly and provider failure.
#[derive(Error, Debug)]
pub enum TreeError {
    /// Parent asked for an identifier no registered provider owns.
    #[error("no provider owns node: {0}")]
    UnownedNode(NodeId),

    #[error("provider '{provider}' failed: {source}")]
    Provider {
        provider: String,
        #[source]
        source: BoxError,
    },

    #[error("ownership prefix '{prefix}' overlaps provider '{existing}'")]
    OverlappingOwnership { prefix: String, existing: String },

    #[error("node produced by more than one provider: {0}")]
    OverlappingIdentifier(NodeId),

    /// Children listed under a node the listing provider does not answer for.
    #[error("children listed under {0}, which is neither the root nor one of its nodes")]
    UnreachableParent(NodeId),

    #[error("node {child} listed more than once (under {parent})")]
    DuplicateChild { parent: NodeId, child: NodeId },
}

impl TreeError {
    pub fn provider(provider: impl Into<String>, source: BoxError) -> Self {
        Self::Provider {
            provider: provider.into(),
            source,
        }
    }
}

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;
