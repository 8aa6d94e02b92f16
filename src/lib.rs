//! Composite wiki tree nodes.
//!
//! A [`WikiTreeNode`](domain::WikiTreeNode) merges independent child
//! providers (pinned pages, documents) under one root and serves paginated
//! child windows without materializing the tree.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
