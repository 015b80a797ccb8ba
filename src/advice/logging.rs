//! Structured call logging advice.

use std::time::Instant;

use tracing::{debug, warn};

use super::Interceptor;
use crate::contract::{BoxError, Value};
use crate::invocation::Invocation;

/// Logs entry, completion, and failure of every intercepted call.
///
/// Entry and completion log at debug, failures at warn; the error itself
/// passes through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallLog;

impl CallLog {
    pub fn new() -> Self {
        Self
    }
}

impl Interceptor for CallLog {
    fn name(&self) -> &str {
        "call-log"
    }

    fn invoke(&self, invocation: &mut Invocation<'_>) -> Result<Value, BoxError> {
        let signature = invocation.target_contract().signature(invocation.method());
        debug!(
            method = %signature,
            arity = invocation.args().arity(),
            "Call entering chain"
        );
        let start = Instant::now();
        match invocation.proceed() {
            Ok(value) => {
                debug!(
                    method = %signature,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Call completed"
                );
                Ok(value)
            }
            Err(e) => {
                warn!(method = %signature, error = %e, "Call failed");
                Err(e)
            }
        }
    }
}
