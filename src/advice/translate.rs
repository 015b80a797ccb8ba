//! Error-translation advice, the canonical *always* advisor.

use super::Interceptor;
use crate::contract::{BoxError, Value};
use crate::invocation::Invocation;

/// Maps downstream errors into another error type on the way out.
///
/// Registered as an *always* advisor this gives every intercepted method a
/// uniform error surface. Errors the mapping does not recognize must be
/// returned unchanged.
pub struct ErrorTranslator {
    name: String,
    translate: Box<dyn Fn(BoxError) -> BoxError + Send + Sync>,
}

impl ErrorTranslator {
    pub fn new(
        name: impl Into<String>,
        translate: impl Fn(BoxError) -> BoxError + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            translate: Box::new(translate),
        }
    }

    /// Translate errors of type `E` through `map`; all other error types
    /// pass through untouched.
    pub fn for_type<E, T, F>(name: impl Into<String>, map: F) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
        T: std::error::Error + Send + Sync + 'static,
        F: Fn(E) -> T + Send + Sync + 'static,
    {
        Self::new(name, move |err: BoxError| match err.downcast::<E>() {
            Ok(source) => Box::new(map(*source)),
            Err(other) => other,
        })
    }
}

impl Interceptor for ErrorTranslator {
    fn name(&self) -> &str {
        &self.name
    }

    fn invoke(&self, invocation: &mut Invocation<'_>) -> Result<Value, BoxError> {
        invocation.proceed().map_err(|e| (self.translate)(e))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use thiserror::Error;

    use super::*;
    use crate::advisor::Advisor;
    use crate::contract::Args;
    use crate::proxy::ProxyFactory;
    use crate::test_utils::{greeter_target, TestFault};

    #[derive(Debug, Error)]
    #[error("service unavailable: {0}")]
    struct DomainError(String);

    fn translating_proxy(target: crate::test_utils::ScriptedTarget) -> crate::proxy::Proxy {
        ProxyFactory::new(Arc::new(target))
            .with_advisor(Advisor::always(
                "translate",
                Arc::new(ErrorTranslator::for_type::<TestFault, _, _>(
                    "translate",
                    |fault| DomainError(fault.0),
                )),
            ))
            .build()
            .unwrap()
    }

    #[test]
    fn test_known_errors_are_translated() {
        let target = greeter_target();
        target.set_fail("ping", true);
        let proxy = translating_proxy(target);
        let mut args = Args::none();
        let err = proxy.invoke("ping", &mut args).unwrap_err();
        assert_eq!(
            err.downcast::<DomainError>().unwrap().0,
            "ping".to_string()
        );
    }

    #[test]
    fn test_unknown_errors_pass_through() {
        #[derive(Debug, Error)]
        #[error("unrelated")]
        struct Unrelated;

        let target = greeter_target().on("ping", |_| Err(Unrelated.into()));
        let proxy = translating_proxy(target);
        let mut args = Args::none();
        let err = proxy.invoke("ping", &mut args).unwrap_err();
        assert!(err.downcast::<Unrelated>().is_ok());
    }

    #[test]
    fn test_successes_are_untouched() {
        let proxy = translating_proxy(greeter_target());
        let mut args = Args::new(vec![crate::contract::Value::new("ada".to_string())]);
        let result = proxy.invoke("greet", &mut args).unwrap();
        assert_eq!(result.downcast::<String>().unwrap(), "hello ada");
    }
}
