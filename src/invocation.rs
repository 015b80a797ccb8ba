//! Reified calls and `proceed` dispatch.
//!
//! An [`Invocation`] is created fresh for every top-level proxy call that
//! has a non-empty chain. It owns the cursor walking the chain; interceptor
//! `i` calling [`Invocation::proceed`] runs interceptor `i + 1`, and the
//! last interceptor's `proceed` runs the target. The cursor is restored
//! after each dispatch, so an interceptor may call `proceed` again and
//! re-run the entire downstream tail.

use std::sync::Arc;

use thiserror::Error;

use crate::advice::Interceptor;
use crate::contract::{Args, BoxError, CallTarget, MethodSpec, TypeContract, Value};

/// Call-time dispatch failures, distinct from errors the target or advice
/// raise themselves. Boxed into the passthrough channel so callers can
/// downcast and tell the two apart.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no method '{method}' on type '{type_name}'")]
    UnknownMethod { type_name: String, method: String },

    #[error("method '{method}' expects {expected} arguments, got {got}")]
    ArityMismatch {
        method: String,
        expected: usize,
        got: usize,
    },

    /// Configuration failure surfaced while (re)building a chain at call
    /// time, after a runtime advisor mutation.
    #[error(transparent)]
    Config(#[from] crate::proxy::ProxyError),
}

/// Observable progress of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationState {
    /// Constructed, no stage dispatched yet.
    Created,
    /// Interceptor at this chain position is executing.
    Proceeding(usize),
    /// The target has been invoked at least once.
    TargetInvoked,
    /// Unwound with a success result.
    Completed,
    /// Unwound with an error.
    Faulted,
}

/// One in-flight call: proxy back-reference, target, method, mutable
/// arguments, the chain snapshot, and the cursor.
///
/// Thread-confined; never shared or reused across calls.
pub struct Invocation<'a> {
    proxy: &'a dyn CallTarget,
    target: &'a dyn CallTarget,
    method: &'a MethodSpec,
    args: &'a mut Args,
    chain: &'a [Arc<dyn Interceptor>],
    cursor: usize,
    state: InvocationState,
}

impl<'a> Invocation<'a> {
    pub(crate) fn new(
        proxy: &'a dyn CallTarget,
        target: &'a dyn CallTarget,
        method: &'a MethodSpec,
        args: &'a mut Args,
        chain: &'a [Arc<dyn Interceptor>],
    ) -> Self {
        Self {
            proxy,
            target,
            method,
            args,
            chain,
            cursor: 0,
            state: InvocationState::Created,
        }
    }

    /// Continue toward the target: run the next chain stage, or the target
    /// itself once the chain is exhausted.
    ///
    /// The cursor is saved per frame and restored afterwards, so calling
    /// `proceed` a second time from the same interceptor re-runs the whole
    /// downstream tail, target included.
    pub fn proceed(&mut self) -> Result<Value, BoxError> {
        let frame = self.cursor;
        if frame >= self.chain.len() {
            self.state = InvocationState::TargetInvoked;
            return self.target.call(self.method, self.args);
        }
        let stage = Arc::clone(&self.chain[frame]);
        self.cursor = frame + 1;
        self.state = InvocationState::Proceeding(frame);
        let result = stage.invoke(self);
        self.cursor = frame;
        result
    }

    /// The method being invoked.
    pub fn method(&self) -> &MethodSpec {
        self.method
    }

    /// Read access to the argument slots.
    pub fn args(&self) -> &Args {
        self.args
    }

    /// Mutable access to the argument slots. Replacements are visible to
    /// downstream interceptors and to the target.
    pub fn args_mut(&mut self) -> &mut Args {
        self.args
    }

    /// The proxy this call entered through, for self-calls that should be
    /// re-intercepted.
    pub fn proxy(&self) -> &dyn CallTarget {
        self.proxy
    }

    /// Contract of the underlying target (the contract pointcuts matched
    /// against).
    pub fn target_contract(&self) -> &TypeContract {
        self.target.contract()
    }

    /// Number of chain stages for this call.
    pub fn chain_len(&self) -> usize {
        self.chain.len()
    }

    pub fn state(&self) -> InvocationState {
        self.state
    }

    /// Record the final outcome after the outermost stage unwinds.
    pub(crate) fn mark_outcome(&mut self, ok: bool) {
        self.state = if ok {
            InvocationState::Completed
        } else {
            InvocationState::Faulted
        };
    }
}
