//! Registry auto-proxying step definitions.

use std::fmt;
use std::sync::Arc;

use cucumber::{given, then, when, World};
use heddle::advisor::Advisor;
use heddle::container::{AutoProxy, ObjectDefinition, ObjectRegistry};
use heddle::contract::{Args, CallTarget, Value};
use heddle::pointcut;
use heddle::test_utils::{greeter_target, Journal, RecordingInterceptor};

/// Test context for registry scenarios.
#[derive(World)]
#[world(init = Self::new)]
pub struct RegistryWorld {
    journal: Journal,
    registry: ObjectRegistry,
    resolved: Vec<Arc<dyn CallTarget>>,
    last_error: Option<String>,
}

impl fmt::Debug for RegistryWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryWorld")
            .field("definitions", &self.registry.definition_names())
            .field("resolved", &self.resolved.len())
            .field("last_error", &self.last_error)
            .finish()
    }
}

impl RegistryWorld {
    fn new() -> Self {
        Self {
            journal: Journal::new(),
            registry: ObjectRegistry::new(),
            resolved: Vec::new(),
            last_error: None,
        }
    }

    fn register_greeter(&mut self, name: String, prototype: bool) {
        let journal = self.journal.clone();
        let mut definition = ObjectDefinition::new(name, move |_registry: &ObjectRegistry| {
            let target: Arc<dyn CallTarget> =
                Arc::new(greeter_target().with_journal(journal.clone()));
            Ok(target)
        });
        if prototype {
            definition = definition.prototype();
        }
        self.registry
            .register(definition)
            .expect("Failed to register definition");
    }
}

// --- Given steps ---

#[given("an empty registry")]
fn given_empty_registry(world: &mut RegistryWorld) {
    world.registry = ObjectRegistry::new();
    world.journal.clear();
    world.resolved.clear();
    world.last_error = None;
}

#[given(expr = "an auto-proxy advisor {string} for pointcut {string}")]
fn given_auto_proxy_advisor(world: &mut RegistryWorld, name: String, descriptor: String) {
    let pointcut = pointcut::parse(&descriptor).expect("Failed to parse pointcut");
    let interceptor = Arc::new(RecordingInterceptor::new(
        name.clone(),
        world.journal.clone(),
    ));
    let advisor = Advisor::when(name, pointcut, interceptor);
    world
        .registry
        .add_post_processor(Arc::new(AutoProxy::new().with_advisor(advisor)));
}

#[given(expr = "a greeter definition named {string}")]
fn given_greeter_definition(world: &mut RegistryWorld, name: String) {
    world.register_greeter(name, false);
}

#[given(expr = "a prototype greeter definition named {string}")]
fn given_prototype_greeter_definition(world: &mut RegistryWorld, name: String) {
    world.register_greeter(name, true);
}

// --- When steps ---

#[when(expr = "I resolve {string}")]
fn when_resolve(world: &mut RegistryWorld, name: String) {
    match world.registry.resolve(&name) {
        Ok(instance) => world.resolved.push(instance),
        Err(e) => world.last_error = Some(e.to_string()),
    }
}

#[when(expr = "I resolve {string} twice")]
fn when_resolve_twice(world: &mut RegistryWorld, name: String) {
    for _ in 0..2 {
        let instance = world.registry.resolve(&name).expect("Failed to resolve");
        world.resolved.push(instance);
    }
}

// --- Then steps ---

#[then("the instance is advised")]
fn then_instance_advised(world: &mut RegistryWorld) {
    let instance = world.resolved.first().expect("Nothing resolved");
    assert!(
        instance.as_advised().is_some(),
        "Expected an advised instance"
    );
}

#[then("the instance is not advised")]
fn then_instance_not_advised(world: &mut RegistryWorld) {
    let instance = world.resolved.first().expect("Nothing resolved");
    assert!(instance.as_advised().is_none(), "Expected a raw instance");
}

#[then(expr = "invoking {string} with {string} on the instance yields {string}")]
fn then_invoking_yields(
    world: &mut RegistryWorld,
    method: String,
    argument: String,
    expected: String,
) {
    let instance = world.resolved.first().expect("Nothing resolved");
    let (_, spec) = instance
        .contract()
        .method(&method)
        .expect("Method not in contract");
    let mut args = Args::new(vec![Value::new(argument)]);
    let value = instance.call(spec, &mut args).expect("Call failed");
    assert_eq!(
        value.downcast_ref::<String>(),
        Some(&expected),
        "Unexpected call result"
    );
}

#[then(expr = "the journal reads {string}")]
fn then_journal_reads(world: &mut RegistryWorld, expected: String) {
    assert_eq!(world.journal.entries().join(", "), expected);
}

#[then("both resolutions are the same instance")]
fn then_same_instance(world: &mut RegistryWorld) {
    assert_eq!(world.resolved.len(), 2, "Expected two resolutions");
    assert!(
        Arc::ptr_eq(&world.resolved[0], &world.resolved[1]),
        "Expected the cached singleton both times"
    );
}

#[then("the resolutions are distinct instances")]
fn then_distinct_instances(world: &mut RegistryWorld) {
    assert_eq!(world.resolved.len(), 2, "Expected two resolutions");
    assert!(
        !Arc::ptr_eq(&world.resolved[0], &world.resolved[1]),
        "Expected fresh instances per resolve"
    );
}

#[then(expr = "resolution fails for the missing name {string}")]
fn then_resolution_fails(world: &mut RegistryWorld, name: String) {
    let error = world
        .last_error
        .as_ref()
        .expect("Resolution unexpectedly succeeded");
    assert!(
        error.contains(&format!("no definition named '{name}'")),
        "Unexpected error: {error}"
    );
}
