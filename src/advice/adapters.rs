//! Adapters lifting the narrow advice traits onto the interceptor SPI.
//!
//! Narrow advice cannot change how the chain proceeds; the adapters own
//! the `proceed` call and keep chain semantics intact.

use std::sync::Arc;

use super::Interceptor;
use crate::contract::{Args, BoxError, MethodSpec, Value};
use crate::invocation::Invocation;

/// Runs before the call proceeds. Returning an error vetoes the call: the
/// error propagates to the caller and neither downstream advice nor the
/// target run.
pub trait BeforeAdvice: Send + Sync {
    fn name(&self) -> &str;

    fn before(&self, method: &MethodSpec, args: &Args) -> Result<(), BoxError>;
}

/// Observes a successful result. Returning an error replaces the success.
pub trait AfterReturningAdvice: Send + Sync {
    fn name(&self) -> &str;

    fn after_returning(
        &self,
        method: &MethodSpec,
        args: &Args,
        result: &Value,
    ) -> Result<(), BoxError>;
}

/// Observes an error without altering its propagation.
pub trait ThrowsAdvice: Send + Sync {
    fn name(&self) -> &str;

    fn thrown(&self, method: &MethodSpec, error: &BoxError);
}

/// Interceptor adapter for [`BeforeAdvice`].
pub struct BeforeAdapter {
    advice: Arc<dyn BeforeAdvice>,
}

impl BeforeAdapter {
    pub fn new(advice: Arc<dyn BeforeAdvice>) -> Self {
        Self { advice }
    }
}

impl Interceptor for BeforeAdapter {
    fn name(&self) -> &str {
        self.advice.name()
    }

    fn invoke(&self, invocation: &mut Invocation<'_>) -> Result<Value, BoxError> {
        self.advice.before(invocation.method(), invocation.args())?;
        invocation.proceed()
    }
}

/// Interceptor adapter for [`AfterReturningAdvice`].
pub struct AfterReturningAdapter {
    advice: Arc<dyn AfterReturningAdvice>,
}

impl AfterReturningAdapter {
    pub fn new(advice: Arc<dyn AfterReturningAdvice>) -> Self {
        Self { advice }
    }
}

impl Interceptor for AfterReturningAdapter {
    fn name(&self) -> &str {
        self.advice.name()
    }

    fn invoke(&self, invocation: &mut Invocation<'_>) -> Result<Value, BoxError> {
        let value = invocation.proceed()?;
        self.advice
            .after_returning(invocation.method(), invocation.args(), &value)?;
        Ok(value)
    }
}

/// Interceptor adapter for [`ThrowsAdvice`].
pub struct ThrowsAdapter {
    advice: Arc<dyn ThrowsAdvice>,
}

impl ThrowsAdapter {
    pub fn new(advice: Arc<dyn ThrowsAdvice>) -> Self {
        Self { advice }
    }
}

impl Interceptor for ThrowsAdapter {
    fn name(&self) -> &str {
        self.advice.name()
    }

    fn invoke(&self, invocation: &mut Invocation<'_>) -> Result<Value, BoxError> {
        match invocation.proceed() {
            Ok(value) => Ok(value),
            Err(e) => {
                self.advice.thrown(invocation.method(), &e);
                Err(e)
            }
        }
    }
}
