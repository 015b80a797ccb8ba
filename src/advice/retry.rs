//! Retry advice: re-dispatches failed calls on a backoff schedule.

use std::thread;

use backon::{BackoffBuilder, ExponentialBuilder};
use tracing::warn;

use super::Interceptor;
use crate::contract::{BoxError, Value};
use crate::invocation::Invocation;

/// Retries erroring calls by calling `proceed` again, which re-runs all
/// downstream advice and the target.
///
/// The schedule bounds the retry count; once it is exhausted the last
/// error propagates unchanged. Dispatch is synchronous, so delays block
/// the calling thread.
pub struct Retry {
    policy: ExponentialBuilder,
}

impl Retry {
    pub fn new(policy: ExponentialBuilder) -> Self {
        Self { policy }
    }
}

impl Default for Retry {
    /// Up to two retries with short exponential delays.
    fn default() -> Self {
        Self::new(
            ExponentialBuilder::default()
                .with_min_delay(std::time::Duration::from_millis(1))
                .with_max_delay(std::time::Duration::from_millis(25))
                .with_max_times(2),
        )
    }
}

impl Interceptor for Retry {
    fn name(&self) -> &str {
        "retry"
    }

    fn invoke(&self, invocation: &mut Invocation<'_>) -> Result<Value, BoxError> {
        let mut schedule = self.policy.clone().build();
        let mut attempt: u32 = 1;
        loop {
            match invocation.proceed() {
                Ok(value) => return Ok(value),
                Err(e) => match schedule.next() {
                    Some(delay) => {
                        warn!(
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %e,
                            "Retrying failed call"
                        );
                        thread::sleep(delay);
                        attempt += 1;
                    }
                    None => return Err(e),
                },
            }
        }
    }
}
