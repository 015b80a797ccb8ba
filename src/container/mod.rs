//! Object registry: named definitions, scoped resolution, lifecycle, and
//! target post-processing.
//!
//! The registry is the wiring surface for advised objects: definitions
//! declare how targets are built, and post-processors (notably
//! [`AutoProxy`]) rewrite each produced instance before anyone sees it.
//! Resolution and post-processing are synchronous; the lifecycle surface
//! ([`ObjectRegistry::start`] / [`ObjectRegistry::shutdown`]) is async.

mod auto_proxy;
mod definition;

pub use auto_proxy::AutoProxy;
pub use definition::{ObjectDefinition, Scope};

use std::collections::HashSet;
use std::sync::{Arc, Mutex, RwLock};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::contract::{BoxError, CallTarget};
use crate::proxy::ProxyError;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("definition '{name}' is already registered")]
    DuplicateDefinition { name: String },

    #[error("no definition named '{name}'")]
    NotFound { name: String },

    #[error("circular dependency: {chain}")]
    CircularDependency { chain: String },

    #[error("factory for '{name}' failed: {source}")]
    Factory {
        name: String,
        #[source]
        source: BoxError,
    },

    #[error("{phase} hook for '{name}' failed: {source}")]
    Lifecycle {
        name: String,
        phase: &'static str,
        #[source]
        source: BoxError,
    },

    #[error(transparent)]
    Proxy(#[from] ProxyError),
}

impl RegistryError {
    /// Wrap a user failure raised inside a factory closure.
    pub fn factory(name: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Factory {
            name: name.into(),
            source: source.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;

/// Rewrites instances as the registry produces them.
///
/// Processors run in ascending [`order`](TargetPostProcessor::order) over
/// every resolved instance, each seeing the previous processor's output.
/// Returning the input unchanged is the no-op.
pub trait TargetPostProcessor: Send + Sync {
    /// Diagnostic name, shown in logs.
    fn name(&self) -> &str;

    /// Application order, ascending. Ties keep insertion order.
    fn order(&self) -> i32 {
        1000
    }

    fn process(
        &self,
        definition: &ObjectDefinition,
        instance: Arc<dyn CallTarget>,
    ) -> Result<Arc<dyn CallTarget>>;
}

/// Registry of object definitions with scoped resolution and an async
/// lifecycle.
///
/// Singletons are cached on first resolve; prototypes are rebuilt per
/// resolve. Declared dependencies are resolved before a definition's
/// factory runs, and cycles in the declared graph are reported rather
/// than recursed into.
#[derive(Default)]
pub struct ObjectRegistry {
    definitions: DashMap<String, Arc<ObjectDefinition>>,
    registration_order: Mutex<Vec<String>>,
    singletons: DashMap<String, Arc<dyn CallTarget>>,
    creation_order: Mutex<Vec<String>>,
    started: Mutex<Vec<String>>,
    post_processors: RwLock<Vec<Arc<dyn TargetPostProcessor>>>,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition. Names are unique per registry.
    pub fn register(&self, definition: ObjectDefinition) -> Result<()> {
        let name = definition.name().to_string();
        match self.definitions.entry(name.clone()) {
            Entry::Occupied(_) => return Err(RegistryError::DuplicateDefinition { name }),
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(definition));
            }
        }
        self.lock(&self.registration_order).push(name);
        Ok(())
    }

    /// Add a post-processor. The processor list is re-sorted by `order`;
    /// instances already produced are not revisited.
    pub fn add_post_processor(&self, processor: Arc<dyn TargetPostProcessor>) {
        let mut processors = self
            .post_processors
            .write()
            .unwrap_or_else(|e| e.into_inner());
        processors.push(processor);
        processors.sort_by_key(|p| p.order());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Registered definition names in registration order.
    pub fn definition_names(&self) -> Vec<String> {
        self.lock(&self.registration_order).clone()
    }

    /// Resolve `name` to an instance.
    ///
    /// Singletons come from the cache after their first build; prototypes
    /// are fresh per call. Every produced instance has been through the
    /// post-processor pipeline.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn CallTarget>> {
        let mut path = Vec::new();
        self.check_cycle(name, &mut path)?;
        self.materialize(name)
    }

    /// Eagerly build every non-lazy singleton in dependency order, then run
    /// start hooks in creation order. Safe to call again after a partial
    /// failure; hooks that already ran are skipped.
    pub async fn start(&self) -> Result<()> {
        let eager: Vec<String> = self
            .definition_names()
            .into_iter()
            .filter(|name| {
                self.definitions
                    .get(name)
                    .map(|d| d.is_singleton() && !d.is_lazy())
                    .unwrap_or(false)
            })
            .collect();
        for name in &eager {
            self.resolve(name)?;
        }

        let already: HashSet<String> = self.lock(&self.started).iter().cloned().collect();
        let order = self.lock(&self.creation_order).clone();
        for name in order {
            if already.contains(&name) {
                continue;
            }
            let Ok(definition) = self.definition(&name) else {
                continue;
            };
            if let Some(hook) = definition.start_hook() {
                let instance = self.cached_singleton(&name)?;
                hook(instance)
                    .await
                    .map_err(|e| RegistryError::Lifecycle {
                        name: name.clone(),
                        phase: "start",
                        source: e,
                    })?;
                debug!(object = %name, "Started");
            }
            self.lock(&self.started).push(name);
        }
        info!(objects = self.lock(&self.started).len(), "Registry started");
        Ok(())
    }

    /// Run stop hooks in reverse start order. Hook failures are logged and
    /// shutdown continues; teardown never aborts halfway.
    pub async fn shutdown(&self) {
        let order = std::mem::take(&mut *self.lock(&self.started));
        for name in order.iter().rev() {
            let Ok(definition) = self.definition(name) else {
                continue;
            };
            let Some(hook) = definition.stop_hook() else {
                continue;
            };
            let Ok(instance) = self.cached_singleton(name) else {
                continue;
            };
            if let Err(e) = hook(instance).await {
                warn!(object = %name, error = %e, "Stop hook failed");
            } else {
                debug!(object = %name, "Stopped");
            }
        }
        info!("Registry shut down");
    }

    fn definition(&self, name: &str) -> Result<Arc<ObjectDefinition>> {
        self.definitions
            .get(name)
            .map(|d| Arc::clone(&*d))
            .ok_or_else(|| RegistryError::NotFound {
                name: name.to_string(),
            })
    }

    fn cached_singleton(&self, name: &str) -> Result<Arc<dyn CallTarget>> {
        self.singletons
            .get(name)
            .map(|s| Arc::clone(&*s))
            .ok_or_else(|| RegistryError::NotFound {
                name: name.to_string(),
            })
    }

    /// Walk the declared dependency graph without building anything.
    fn check_cycle(&self, name: &str, path: &mut Vec<String>) -> Result<()> {
        if let Some(position) = path.iter().position(|n| n == name) {
            let mut chain: Vec<String> = path[position..].to_vec();
            chain.push(name.to_string());
            return Err(RegistryError::CircularDependency {
                chain: chain.join(" -> "),
            });
        }
        let definition = self.definition(name)?;
        path.push(name.to_string());
        for dependency in definition.dependencies() {
            self.check_cycle(dependency, path)?;
        }
        path.pop();
        Ok(())
    }

    fn materialize(&self, name: &str) -> Result<Arc<dyn CallTarget>> {
        let definition = self.definition(name)?;
        if definition.is_singleton() {
            if let Some(existing) = self.singletons.get(name) {
                return Ok(Arc::clone(&*existing));
            }
        }
        for dependency in definition.dependencies() {
            self.materialize(dependency)?;
        }
        let raw = (definition.factory())(self)?;
        let processed = self.post_process(&definition, raw)?;
        if !definition.is_singleton() {
            return Ok(processed);
        }
        // A concurrent build of the same singleton may finish first; the
        // first insert wins and the loser's instance is dropped.
        match self.singletons.entry(name.to_string()) {
            Entry::Occupied(entry) => return Ok(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                entry.insert(Arc::clone(&processed));
            }
        }
        self.lock(&self.creation_order).push(name.to_string());
        debug!(object = %name, "Singleton materialized");
        Ok(processed)
    }

    fn post_process(
        &self,
        definition: &ObjectDefinition,
        instance: Arc<dyn CallTarget>,
    ) -> Result<Arc<dyn CallTarget>> {
        let processors = {
            let guard = self
                .post_processors
                .read()
                .unwrap_or_else(|e| e.into_inner());
            guard.clone()
        };
        let mut current = instance;
        for processor in &processors {
            let before = Arc::as_ptr(&current) as *const () as usize;
            current = processor.process(definition, current)?;
            let after = Arc::as_ptr(&current) as *const () as usize;
            if before != after {
                debug!(
                    object = %definition.name(),
                    processor = %processor.name(),
                    "Instance replaced"
                );
            }
        }
        Ok(current)
    }

    fn lock<'a>(&self, list: &'a Mutex<Vec<String>>) -> std::sync::MutexGuard<'a, Vec<String>> {
        list.lock().unwrap_or_else(|e| e.into_inner())
    }
}
