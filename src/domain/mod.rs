//! Domain layer: tree identifiers, the provider contract and composition
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod composite;
pub mod error;
pub mod id;
pub mod memory;
pub mod predicate;
pub mod properties;
pub mod provider;
pub mod wiki;

pub use composite::CompositeTreeNodeGroup;
pub use error::{TreeError, TreeResult};
pub use id::{NodeId, FARM_NODE_ID};
pub use memory::MemoryTreeProvider;
pub use predicate::{NodePredicate, Ownership, RootMatcher};
pub use properties::NodeProperties;
pub use provider::{BoxError, ProviderResult, TreeNodeProvider};
pub use wiki::{WikiTreeNode, WikiTreeNodeBuilder};
