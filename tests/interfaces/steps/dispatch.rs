//! Dispatch interface step definitions.

use std::sync::Arc;

use cucumber::{given, then, when, World};
use heddle::advisor::Advisor;
use heddle::contract::{Args, BoxError, Value};
use heddle::pointcut;
use heddle::proxy::{Proxy, ProxyFactory};
use heddle::test_utils::{
    greeter_target, Journal, RecordingInterceptor, ScriptedTarget, ShortCircuit, TestFault,
};

/// Test context for dispatch scenarios.
#[derive(Debug, World)]
#[world(init = Self::new)]
pub struct DispatchWorld {
    journal: Journal,
    target: Option<ScriptedTarget>,
    advisors: Vec<Advisor>,
    freeze: bool,
    proxy: Option<Proxy>,
    last_result: Option<Value>,
    last_failure: Option<BoxError>,
    advising_error: Option<String>,
}

impl DispatchWorld {
    fn new() -> Self {
        Self {
            journal: Journal::new(),
            target: None,
            advisors: Vec::new(),
            freeze: false,
            proxy: None,
            last_result: None,
            last_failure: None,
            advising_error: None,
        }
    }

    fn recorder(&self, name: &str) -> Arc<RecordingInterceptor> {
        Arc::new(RecordingInterceptor::new(name, self.journal.clone()))
    }

    fn build_proxy(&mut self) {
        let target = self.target.take().expect("Target not prepared");
        let mut factory = ProxyFactory::new(Arc::new(target));
        for advisor in self.advisors.drain(..) {
            factory = factory.with_advisor(advisor);
        }
        if self.freeze {
            factory = factory.frozen();
        }
        self.proxy = Some(factory.build().expect("Failed to build proxy"));
    }

    fn invoke(&mut self, method: &str, mut args: Args) {
        let proxy = self.proxy.as_ref().expect("Proxy not built");
        match proxy.invoke(method, &mut args) {
            Ok(value) => {
                self.last_result = Some(value);
                self.last_failure = None;
            }
            Err(e) => {
                self.last_failure = Some(e);
                self.last_result = None;
            }
        }
    }
}

// --- Given steps ---

#[given("a greeter target with journaling")]
fn given_greeter_target(world: &mut DispatchWorld) {
    world.target = Some(greeter_target().with_journal(world.journal.clone()));
}

#[given(expr = "an advisor {string} with pointcut {string} and order {int}")]
fn given_advisor(world: &mut DispatchWorld, name: String, descriptor: String, order: i32) {
    let pointcut = pointcut::parse(&descriptor).expect("Failed to parse pointcut");
    let interceptor = world.recorder(&name);
    world
        .advisors
        .push(Advisor::when(name, pointcut, interceptor).with_order(order));
}

#[given(expr = "a short-circuit advisor {string} producing {string}")]
fn given_short_circuit(world: &mut DispatchWorld, name: String, produced: String) {
    let interceptor = Arc::new(ShortCircuit::new(
        name.clone(),
        world.journal.clone(),
        move || Value::new(produced.clone()),
    ));
    world.advisors.push(Advisor::always(name, interceptor));
}

#[given(expr = "the target fails on {string}")]
fn given_target_fails(world: &mut DispatchWorld, method: String) {
    world
        .target
        .as_ref()
        .expect("Target not prepared")
        .set_fail(&method, true);
}

#[given("the proxy is frozen on build")]
fn given_frozen(world: &mut DispatchWorld) {
    world.freeze = true;
}

// --- When steps ---

#[when("I build the proxy")]
fn when_build(world: &mut DispatchWorld) {
    world.build_proxy();
}

#[when(expr = "I build the proxy and invoke {string}")]
fn when_build_and_invoke(world: &mut DispatchWorld, method: String) {
    world.build_proxy();
    world.invoke(&method, Args::none());
}

#[when(expr = "I build the proxy and invoke {string} with argument {string}")]
fn when_build_and_invoke_with_argument(
    world: &mut DispatchWorld,
    method: String,
    argument: String,
) {
    world.build_proxy();
    world.invoke(&method, Args::new(vec![Value::new(argument)]));
}

#[when(expr = "I invoke {string} again")]
fn when_invoke_again(world: &mut DispatchWorld, method: String) {
    world.invoke(&method, Args::none());
}

#[when(expr = "I add an always advisor {string} at runtime")]
fn when_add_runtime_advisor(world: &mut DispatchWorld, name: String) {
    let interceptor = world.recorder(&name);
    let outcome = world
        .proxy
        .as_ref()
        .expect("Proxy not built")
        .advised()
        .add_advisor(Advisor::always(name, interceptor));
    world.advising_error = outcome.err().map(|e| e.to_string());
}

// --- Then steps ---

#[then(expr = "the result is {string}")]
fn then_result_is(world: &mut DispatchWorld, expected: String) {
    let value = world.last_result.as_ref().expect("No result recorded");
    assert_eq!(
        value.downcast_ref::<String>(),
        Some(&expected),
        "Unexpected call result"
    );
}

#[then(expr = "the journal reads {string}")]
fn then_journal_reads(world: &mut DispatchWorld, expected: String) {
    assert_eq!(world.journal.entries().join(", "), expected);
}

#[then("the call fails with the scripted fault")]
fn then_scripted_fault(world: &mut DispatchWorld) {
    let failure = world.last_failure.as_ref().expect("Call did not fail");
    assert!(
        failure.downcast_ref::<TestFault>().is_some(),
        "Fault lost its identity: {failure}"
    );
}

#[then("adding the advisor is rejected as frozen")]
fn then_advising_rejected(world: &mut DispatchWorld) {
    let error = world
        .advising_error
        .as_ref()
        .expect("Advising unexpectedly succeeded");
    assert!(error.contains("frozen"), "Unexpected error: {error}");
}
