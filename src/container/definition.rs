//! Object definitions: named construction recipes for the registry.

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::contract::{BoxError, CallTarget};

use super::{ObjectRegistry, Result};

/// Instance lifetime for a registered object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    /// One shared instance, built on first resolve and cached.
    #[default]
    Singleton,
    /// A fresh instance per resolve. Prototypes take no part in registry
    /// lifecycle; start and stop hooks never run for them.
    Prototype,
}

type Factory = Box<dyn Fn(&ObjectRegistry) -> Result<Arc<dyn CallTarget>> + Send + Sync>;

type LifecycleHook = Box<
    dyn Fn(Arc<dyn CallTarget>) -> BoxFuture<'static, std::result::Result<(), BoxError>>
        + Send
        + Sync,
>;

/// A named recipe: scope, declared dependencies, a factory closure, and
/// optional async lifecycle hooks.
///
/// The factory receives the registry so it can look up dependencies.
/// Anything it resolves must be declared through [`depends_on`]; the
/// declarations drive initialization order and cycle detection.
///
/// [`depends_on`]: ObjectDefinition::depends_on
pub struct ObjectDefinition {
    name: String,
    scope: Scope,
    lazy: bool,
    depends_on: Vec<String>,
    factory: Factory,
    on_start: Option<LifecycleHook>,
    on_stop: Option<LifecycleHook>,
}

impl ObjectDefinition {
    pub fn new(
        name: impl Into<String>,
        factory: impl Fn(&ObjectRegistry) -> Result<Arc<dyn CallTarget>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            scope: Scope::Singleton,
            lazy: false,
            depends_on: Vec::new(),
            factory: Box::new(factory),
            on_start: None,
            on_stop: None,
        }
    }

    /// Fresh instance per resolve instead of a cached singleton.
    pub fn prototype(mut self) -> Self {
        self.scope = Scope::Prototype;
        self
    }

    /// Skip eager initialization during [`ObjectRegistry::start`]; the
    /// singleton is built on first resolve instead.
    pub fn lazy(mut self) -> Self {
        self.lazy = true;
        self
    }

    /// Declare a dependency, resolved before this definition's factory runs.
    pub fn depends_on(mut self, name: impl Into<String>) -> Self {
        self.depends_on.push(name.into());
        self
    }

    /// Async hook run with the built singleton during registry start, after
    /// every declared dependency has started.
    pub fn on_start(
        mut self,
        hook: impl Fn(Arc<dyn CallTarget>) -> BoxFuture<'static, std::result::Result<(), BoxError>>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.on_start = Some(Box::new(hook));
        self
    }

    /// Async hook run during registry shutdown, in reverse start order.
    pub fn on_stop(
        mut self,
        hook: impl Fn(Arc<dyn CallTarget>) -> BoxFuture<'static, std::result::Result<(), BoxError>>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.on_stop = Some(Box::new(hook));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn is_singleton(&self) -> bool {
        self.scope == Scope::Singleton
    }

    pub fn is_lazy(&self) -> bool {
        self.lazy
    }

    pub fn dependencies(&self) -> &[String] {
        &self.depends_on
    }

    pub(crate) fn factory(&self) -> &Factory {
        &self.factory
    }

    pub(crate) fn start_hook(&self) -> Option<&LifecycleHook> {
        self.on_start.as_ref()
    }

    pub(crate) fn stop_hook(&self) -> Option<&LifecycleHook> {
        self.on_stop.as_ref()
    }
}

impl fmt::Debug for ObjectDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectDefinition")
            .field("name", &self.name)
            .field("scope", &self.scope)
            .field("lazy", &self.lazy)
            .field("depends_on", &self.depends_on)
            .finish()
    }
}
