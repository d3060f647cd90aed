//! Adapter registry and factory
//!
//! Resolves a runtime adapter name to a constructed, configured adapter. The
//! registry is an explicit map populated at startup, so the set of valid
//! adapters is closed and typo-safe; plugin-contributed adapters register
//! alongside the built-in ones.

use std::collections::HashMap;
use std::sync::Arc;

use arkiv_archive::Archive;
use arkiv_core::{ArchiveConfig, IngestError, IngestHook, IngestOptions, Item, RecordStore};

use crate::adapter::IngestAdapter;
use crate::adapters::{LocalPathAdapter, UploadAdapter, UrlAdapter};
use crate::orchestrator::Ingestor;

/// Shared dependencies handed to adapter builders.
#[derive(Clone)]
pub struct AdapterDeps {
    pub archive: Arc<Archive>,
    pub config: Arc<ArchiveConfig>,
}

type AdapterBuilder = Arc<dyn Fn(&AdapterDeps) -> Box<dyn IngestAdapter> + Send + Sync>;

/// Registry mapping adapter names to builder functions.
pub struct AdapterRegistry {
    builders: HashMap<String, AdapterBuilder>,
}

impl AdapterRegistry {
    /// An empty registry. Most callers want `with_defaults`.
    pub fn new() -> Self {
        AdapterRegistry {
            builders: HashMap::new(),
        }
    }

    /// Registry with the built-in adapters: `local`, `url`, `upload`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("local", |deps: &AdapterDeps| {
            Box::new(LocalPathAdapter::new(
                deps.archive.clone(),
                deps.config.clone(),
            )) as Box<dyn IngestAdapter>
        });
        registry.register("url", |deps: &AdapterDeps| {
            Box::new(UrlAdapter::new(deps.archive.clone(), deps.config.clone()))
                as Box<dyn IngestAdapter>
        });
        registry.register("upload", |deps: &AdapterDeps| {
            Box::new(UploadAdapter::new(
                deps.archive.clone(),
                deps.config.clone(),
            )) as Box<dyn IngestAdapter>
        });
        registry
    }

    /// Register an adapter builder under `name`, replacing any previous one.
    pub fn register<F>(&mut self, name: impl Into<String>, builder: F)
    where
        F: Fn(&AdapterDeps) -> Box<dyn IngestAdapter> + Send + Sync + 'static,
    {
        self.builders.insert(name.into(), Arc::new(builder));
    }

    /// Names of all registered adapters, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.builders.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Construct the adapter registered under `name`.
    pub fn create(
        &self,
        name: &str,
        deps: &AdapterDeps,
    ) -> Result<Box<dyn IngestAdapter>, IngestError> {
        self.builders
            .get(name)
            .map(|builder| builder(deps))
            .ok_or_else(|| {
                IngestError::UnknownAdapter(format!(
                    "No ingest adapter registered under '{}'",
                    name
                ))
            })
    }

    /// Construct a ready-to-run `Ingestor`: the adapter registered under
    /// `name`, bound to `item`, `options`, and the collaborators.
    pub fn create_ingestor(
        &self,
        name: &str,
        deps: &AdapterDeps,
        item: Item,
        options: IngestOptions,
        store: Arc<dyn RecordStore>,
        hook: Arc<dyn IngestHook>,
    ) -> Result<Ingestor, IngestError> {
        let adapter = self.create(name, deps)?;
        Ok(Ingestor::new(
            adapter,
            deps.archive.clone(),
            item,
            options,
            store,
            hook,
        ))
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
