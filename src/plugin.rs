//! Link-time advice registration.
//!
//! Crates register named interceptor factories with [`inventory`]; the
//! plan layer resolves advice names against this registry when it
//! materializes a weave plan. The built-ins register themselves here, so
//! `call-log` and `retry` are always resolvable.

use std::sync::Arc;

use crate::advice::{CallLog, Interceptor, Retry};

/// A named interceptor factory, collected at link time.
pub struct AdviceRegistration {
    pub name: &'static str,
    pub construct: fn() -> Arc<dyn Interceptor>,
}

inventory::collect!(AdviceRegistration);

/// Build a fresh instance of the advice registered under `name`.
pub fn find_advice(name: &str) -> Option<Arc<dyn Interceptor>> {
    inventory::iter::<AdviceRegistration>
        .into_iter()
        .find(|registration| registration.name == name)
        .map(|registration| (registration.construct)())
}

/// Every registered advice name, for diagnostics.
pub fn advice_names() -> Vec<&'static str> {
    inventory::iter::<AdviceRegistration>
        .into_iter()
        .map(|registration| registration.name)
        .collect()
}

fn construct_call_log() -> Arc<dyn Interceptor> {
    Arc::new(CallLog::new())
}

fn construct_retry() -> Arc<dyn Interceptor> {
    Arc::new(Retry::default())
}

inventory::submit! {
    AdviceRegistration {
        name: "call-log",
        construct: construct_call_log,
    }
}

inventory::submit! {
    AdviceRegistration {
        name: "retry",
        construct: construct_retry,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_built_ins_are_registered() {
        let names = advice_names();
        assert!(names.contains(&"call-log"));
        assert!(names.contains(&"retry"));
    }

    #[test]
    fn test_find_advice_builds_fresh_instances() {
        let first = find_advice("call-log").unwrap();
        let second = find_advice("call-log").unwrap();
        assert_eq!(first.name(), "call-log");
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_unknown_advice_is_none() {
        assert!(find_advice("transmogrify").is_none());
    }
}
