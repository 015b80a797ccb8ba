//! Test utilities: scripted targets and journaling interceptors.
//!
//! This module provides configurable implementations of the core traits
//! for exercising dispatch behavior without real services behind the
//! proxies. Shared between unit tests and the interface test suite.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::advice::Interceptor;
use crate::contract::{Args, BoxError, CallTarget, MethodSpec, TypeContract, Value};
use crate::invocation::Invocation;

/// Error raised by scripted failures, downcastable at the caller to assert
/// passthrough identity.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("scripted fault in '{0}'")]
pub struct TestFault(pub String);

/// Shared append-only record of observed calls. Clones share the record.
#[derive(Clone, Debug, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: impl Into<String>) {
        self.entries.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }
}

type Handler = Box<dyn Fn(&mut Args) -> Result<Value, BoxError> + Send + Sync>;

/// Target whose methods run scripted handlers, with per-method hit counts
/// and failure toggles.
///
/// Methods without a handler return the unit value. Failures raise
/// [`TestFault`] after the hit is counted, so attempt counts include
/// failed attempts.
pub struct ScriptedTarget {
    contract: TypeContract,
    handlers: HashMap<String, Handler>,
    journal: Option<Journal>,
    hits: Mutex<HashMap<String, u32>>,
    fail_sticky: Mutex<HashSet<String>>,
    fail_countdown: Mutex<HashMap<String, u32>>,
}

impl ScriptedTarget {
    pub fn new(contract: TypeContract) -> Self {
        Self {
            contract,
            handlers: HashMap::new(),
            journal: None,
            hits: Mutex::new(HashMap::new()),
            fail_sticky: Mutex::new(HashSet::new()),
            fail_countdown: Mutex::new(HashMap::new()),
        }
    }

    /// Record `target:{method}` entries into `journal` on every call.
    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Script a handler for `method`.
    pub fn on(
        mut self,
        method: &str,
        handler: impl Fn(&mut Args) -> Result<Value, BoxError> + Send + Sync + 'static,
    ) -> Self {
        self.handlers.insert(method.to_string(), Box::new(handler));
        self
    }

    /// Make every call to `method` fail until cleared.
    pub fn set_fail(&self, method: &str, fail: bool) {
        let mut sticky = self.fail_sticky.lock().unwrap();
        if fail {
            sticky.insert(method.to_string());
        } else {
            sticky.remove(method);
        }
    }

    /// Make the next `times` calls to `method` fail, then succeed.
    pub fn fail_times(&self, method: &str, times: u32) {
        self.fail_countdown
            .lock()
            .unwrap()
            .insert(method.to_string(), times);
    }

    /// Calls observed for `method`, failed attempts included.
    pub fn hits(&self, method: &str) -> u32 {
        self.hits.lock().unwrap().get(method).copied().unwrap_or(0)
    }
}

impl fmt::Debug for ScriptedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedTarget")
            .field("type_name", &self.contract.type_name())
            .finish()
    }
}

impl CallTarget for ScriptedTarget {
    fn contract(&self) -> &TypeContract {
        &self.contract
    }

    fn call(&self, method: &MethodSpec, args: &mut Args) -> Result<Value, BoxError> {
        let name = method.name();
        *self
            .hits
            .lock()
            .unwrap()
            .entry(name.to_string())
            .or_insert(0) += 1;
        if let Some(journal) = &self.journal {
            journal.record(format!("target:{name}"));
        }
        if self.fail_sticky.lock().unwrap().contains(name) {
            return Err(TestFault(name.to_string()).into());
        }
        {
            let mut countdown = self.fail_countdown.lock().unwrap();
            if let Some(remaining) = countdown.get_mut(name) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(TestFault(name.to_string()).into());
                }
            }
        }
        match self.handlers.get(name) {
            Some(handler) => handler(args),
            None => Ok(Value::unit()),
        }
    }
}

/// Two-method greeter fixture: `greet(name) -> "hello {name}"` and
/// `ping()`.
pub fn greeter_target() -> ScriptedTarget {
    let contract = TypeContract::new("Greeter")
        .with_method(MethodSpec::new("greet", 1))
        .with_method(MethodSpec::new("ping", 0));
    ScriptedTarget::new(contract).on("greet", |args| {
        let name = args
            .get(0)
            .and_then(|v| v.downcast_ref::<String>())
            .cloned()
            .unwrap_or_default();
        Ok(Value::new(format!("hello {name}")))
    })
}

/// Interceptor that journals `name:before` / `name:after` / `name:error`
/// around `proceed`.
pub struct RecordingInterceptor {
    name: String,
    journal: Journal,
}

impl RecordingInterceptor {
    pub fn new(name: impl Into<String>, journal: Journal) -> Self {
        Self {
            name: name.into(),
            journal,
        }
    }
}

impl Interceptor for RecordingInterceptor {
    fn name(&self) -> &str {
        &self.name
    }

    fn invoke(&self, invocation: &mut Invocation<'_>) -> Result<Value, BoxError> {
        self.journal.record(format!("{}:before", self.name));
        match invocation.proceed() {
            Ok(value) => {
                self.journal.record(format!("{}:after", self.name));
                Ok(value)
            }
            Err(e) => {
                self.journal.record(format!("{}:error", self.name));
                Err(e)
            }
        }
    }
}

/// Interceptor that returns a canned value without calling `proceed`.
pub struct ShortCircuit {
    name: String,
    journal: Journal,
    produce: Box<dyn Fn() -> Value + Send + Sync>,
}

impl ShortCircuit {
    pub fn new(
        name: impl Into<String>,
        journal: Journal,
        produce: impl Fn() -> Value + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            journal,
            produce: Box::new(produce),
        }
    }
}

impl Interceptor for ShortCircuit {
    fn name(&self) -> &str {
        &self.name
    }

    fn invoke(&self, _invocation: &mut Invocation<'_>) -> Result<Value, BoxError> {
        self.journal.record(format!("{}:short-circuit", self.name));
        Ok((self.produce)())
    }
}

/// Interceptor that rewrites the argument slots, then proceeds.
pub struct MutatingInterceptor {
    name: String,
    mutate: Box<dyn Fn(&mut Args) + Send + Sync>,
}

impl MutatingInterceptor {
    pub fn new(name: impl Into<String>, mutate: impl Fn(&mut Args) + Send + Sync + 'static) -> Self {
        Self {
            name: name.into(),
            mutate: Box::new(mutate),
        }
    }
}

impl Interceptor for MutatingInterceptor {
    fn name(&self) -> &str {
        &self.name
    }

    fn invoke(&self, invocation: &mut Invocation<'_>) -> Result<Value, BoxError> {
        (self.mutate)(invocation.args_mut());
        invocation.proceed()
    }
}
