//! Metrics instrumentation advice.
//!
//! Wraps intercepted methods to emit OpenTelemetry-compatible metrics
//! without modifying targets or other advice.

use std::time::Instant;

use metrics::{counter, histogram};

use super::Interceptor;
use crate::contract::{BoxError, Value};
use crate::invocation::Invocation;

/// Advice that adds metrics instrumentation to every matched method.
///
/// Emits counters and histograms per call:
/// - `heddle_calls_total` - Calls attempted (by method)
/// - `heddle_call_failures_total` - Calls that returned an error (by method)
/// - `heddle_call_duration_seconds` - Call latencies (by method)
///
/// The duration covers the rest of the chain plus the target, so placing
/// this advisor first (low order) times the whole interception.
///
/// # Example
///
/// ```ignore
/// let proxy = ProxyFactory::new(target)
///     .with_advisor(Advisor::always("metrics", Arc::new(Instrument)).with_order(0))
///     .build()?;
/// ```
pub struct Instrument;

impl Interceptor for Instrument {
    fn name(&self) -> &str {
        "instrument"
    }

    fn invoke(&self, invocation: &mut Invocation<'_>) -> Result<Value, BoxError> {
        let signature = invocation
            .target_contract()
            .signature(invocation.method());
        let start = Instant::now();

        let result = invocation.proceed();

        histogram!(
            "heddle_call_duration_seconds",
            "method" => signature.clone()
        )
        .record(start.elapsed().as_secs_f64());
        counter!(
            "heddle_calls_total",
            "method" => signature.clone()
        )
        .increment(1);
        if result.is_err() {
            counter!(
                "heddle_call_failures_total",
                "method" => signature
            )
            .increment(1);
        }

        result
    }
}
