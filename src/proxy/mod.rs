//! Proxies: transparent interceptable wrappers over call targets.
//!
//! A [`Proxy`] implements [`CallTarget`], so proxied and raw objects are
//! interchangeable. Calls on methods with a non-empty chain are reified
//! into an [`Invocation`](crate::invocation::Invocation); sealed methods
//! and methods with an empty chain dispatch straight to the target with no
//! invocation constructed at all.

mod advised;
mod factory;

pub use advised::Advised;
pub use factory::ProxyFactory;

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::trace;
use uuid::Uuid;

use crate::contract::{Args, BoxError, CallTarget, MethodSpec, TypeContract, Value};
use crate::invocation::{DispatchError, Invocation};
use crate::pointcut::PointcutError;

/// Configuration-time proxy failures.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("type '{type_name}' declares no methods")]
    EmptyContract { type_name: String },

    #[error("type '{type_name}' declares method '{method}' more than once")]
    DuplicateMethod { type_name: String, method: String },

    #[error("interface proxy requested but type '{type_name}' implements no interfaces")]
    NoInterfaces { type_name: String },

    #[error("target-type proxy requested but every method of '{type_name}' is sealed")]
    NothingToIntercept { type_name: String },

    #[error("advised configuration {id} is frozen")]
    Frozen { id: Uuid },

    #[error("no advisor named '{name}'")]
    AdvisorNotFound { name: String },

    #[error(transparent)]
    Pointcut(#[from] PointcutError),
}

pub type Result<T> = std::result::Result<T, ProxyError>;

/// Which contract surface the proxy reports as its own.
///
/// Matching always runs against the target's contract; the mode only
/// governs the identity the proxy exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProxyMode {
    /// Report the target's own type name.
    #[default]
    TargetType,
    /// Report the primary (first) implemented interface.
    Interfaces,
}

/// Transparent interceptable wrapper over one target.
///
/// Cheap to clone; clones share the same advised configuration.
#[derive(Clone)]
pub struct Proxy {
    advised: Arc<Advised>,
    exposed: TypeContract,
}

impl Proxy {
    pub(crate) fn new(advised: Arc<Advised>, exposed: TypeContract) -> Self {
        Self { advised, exposed }
    }

    /// The shared interception configuration, for introspection and
    /// runtime advising.
    pub fn advised(&self) -> &Advised {
        &self.advised
    }

    /// Invoke `method_name` with `args` through the interception chain.
    ///
    /// Dispatch failures (unknown method, arity mismatch, configuration
    /// errors from a call-time chain rebuild) are returned as a boxed
    /// [`DispatchError`]; errors raised by advice or the target pass
    /// through unchanged.
    pub fn invoke(&self, method_name: &str, args: &mut Args) -> std::result::Result<Value, BoxError> {
        let target = self.advised.target();
        let contract = target.contract();
        let (index, method) = match contract.method(method_name) {
            Some(found) => found,
            None => {
                return Err(DispatchError::UnknownMethod {
                    type_name: self.exposed.type_name().to_string(),
                    method: method_name.to_string(),
                }
                .into())
            }
        };
        if args.arity() != method.arity() {
            return Err(DispatchError::ArityMismatch {
                method: method_name.to_string(),
                expected: method.arity(),
                got: args.arity(),
            }
            .into());
        }
        if method.is_sealed() {
            return target.call(method, args);
        }
        let chain = match self.advised.chain_for(index, contract, method) {
            Ok(chain) => chain,
            Err(e) => return Err(DispatchError::Config(e).into()),
        };
        if chain.is_empty() {
            // Fast path: nothing matched, dispatch as if unproxied.
            return target.call(method, args);
        }
        let mut invocation = Invocation::new(self, target.as_ref(), method, args, &chain);
        let result = invocation.proceed();
        invocation.mark_outcome(result.is_ok());
        trace!(
            advised = %self.advised.id(),
            method = %method_name,
            state = ?invocation.state(),
            "Invocation unwound"
        );
        result
    }
}

impl CallTarget for Proxy {
    fn contract(&self) -> &TypeContract {
        &self.exposed
    }

    fn call(&self, method: &MethodSpec, args: &mut Args) -> std::result::Result<Value, BoxError> {
        self.invoke(method.name(), args)
    }

    fn as_advised(&self) -> Option<&Advised> {
        Some(&self.advised)
    }
}

impl fmt::Debug for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proxy")
            .field("advised", &self.advised.id())
            .field("type_name", &self.exposed.type_name())
            .finish()
    }
}
