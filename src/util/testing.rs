//! Logging setup and provider doubles for tests

use std::sync::{Arc, Mutex, Once};

use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::{
    MemoryTreeProvider, NodeId, NodeProperties, ProviderResult, TreeNodeProvider,
};

static TEST_SETUP: Once = Once::new();

/// Install the global test subscriber once (level from `RUST_LOG`, default debug).
pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .with_test_writer()
                .with_target(true)
                .with_span_events(FmtSpan::CLOSE)
                .with_filter(env_filter),
        );

        if tracing::dispatcher::has_been_set() {
            debug!("Tracing subscriber already set");
        } else if let Err(e) = subscriber.try_init() {
            eprintln!("Error: Failed to set up logging: {}", e);
        }
        info!("Test Setup complete");
    });
}

/// Provider with `count` children `{prefix}{i}` under `parent`.
pub fn numbered_provider(name: &str, parent: &str, prefix: &str, count: usize) -> MemoryTreeProvider {
    let mut provider = MemoryTreeProvider::new(name);
    for i in 0..count {
        provider
            .insert(parent, format!("{prefix}{i}"))
            .expect("numbered children are distinct");
    }
    provider
}

/// One recorded provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ChildCount(NodeId),
    Children { id: NodeId, offset: usize, limit: usize },
    Parent(NodeId),
}

/// Wraps a provider and records every call with the properties it received.
pub struct RecordingProvider<P> {
    inner: P,
    calls: Mutex<Vec<(Call, NodeProperties)>>,
}

impl<P: TreeNodeProvider> RecordingProvider<P> {
    pub fn new(inner: P) -> Arc<Self> {
        Arc::new(Self {
            inner,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<(Call, NodeProperties)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Windows requested through `children`.
    pub fn windows(&self) -> Vec<(usize, usize)> {
        self.calls()
            .into_iter()
            .filter_map(|(call, _)| match call {
                Call::Children { offset, limit, .. } => Some((offset, limit)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call, properties: &NodeProperties) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((call, properties.clone()));
        }
    }
}

impl<P: TreeNodeProvider> TreeNodeProvider for RecordingProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn child_count(&self, id: &NodeId, properties: &NodeProperties) -> ProviderResult<usize> {
        self.record(Call::ChildCount(id.clone()), properties);
        self.inner.child_count(id, properties)
    }

    fn children(
        &self,
        id: &NodeId,
        offset: usize,
        limit: usize,
        properties: &NodeProperties,
    ) -> ProviderResult<Vec<NodeId>> {
        self.record(
            Call::Children {
                id: id.clone(),
                offset,
                limit,
            },
            properties,
        );
        self.inner.children(id, offset, limit, properties)
    }

    fn parent(&self, id: &NodeId, properties: &NodeProperties) -> ProviderResult<Option<NodeId>> {
        self.record(Call::Parent(id.clone()), properties);
        self.inner.parent(id, properties)
    }
}

/// Provider whose data source is permanently unavailable.
#[derive(Debug, Clone)]
pub struct FailingProvider {
    name: String,
}

impl FailingProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl TreeNodeProvider for FailingProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn child_count(&self, _id: &NodeId, _properties: &NodeProperties) -> ProviderResult<usize> {
        Err("document store unavailable".into())
    }

    fn children(
        &self,
        _id: &NodeId,
        _offset: usize,
        _limit: usize,
        _properties: &NodeProperties,
    ) -> ProviderResult<Vec<NodeId>> {
        Err("document store unavailable".into())
    }

    fn parent(&self, _id: &NodeId, _properties: &NodeProperties) -> ProviderResult<Option<NodeId>> {
        Err("document store unavailable".into())
    }
}
