//! Service container for dependency injection
//!
//! Wires settings and the filesystem into the tree service.

use std::sync::Arc;

use tracing::debug;

use crate::application::services::TreeService;
use crate::config::Settings;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};
use crate::infrastructure::{InfraError, InfraResult};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Tree loading and browsing
    pub tree_service: TreeService,
}

impl ServiceContainer {
    /// Load layered settings for the working directory and wire real implementations.
    pub fn load() -> InfraResult<Self> {
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        let cwd = fs
            .current_dir()
            .map_err(|e| InfraError::io("resolve working directory", e))?;
        debug!(cwd = %cwd.display(), "loading settings");
        let settings = Settings::load(Some(&cwd))?;
        Ok(Self::with_deps(settings, fs))
    }

    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        let settings = Arc::new(settings);
        let tree_service = TreeService::new(Arc::clone(&fs), Arc::clone(&settings));

        Self {
            settings,
            fs,
            tree_service,
        }
    }
}
