//! Advice: the interceptor SPI plus built-in interceptors and the adapters
//! that lift narrow advice forms onto the chain.
//!
//! Advice is applied at proxy composition time, not in target
//! implementations:
//!
//! ```ignore
//! // Core implementation - pure business logic
//! let target = Arc::new(OrderService::new());
//!
//! // Apply advice through a proxy
//! let proxy = ProxyFactory::new(target)
//!     .with_advisor(Advisor::when("log", parse("name:place_*")?, Arc::new(CallLog::new())))
//!     .build()?;
//!
//! // Use as normal - interception is transparent
//! proxy.invoke("place_order", &mut args)?;
//! ```
//!
//! # Available Advice
//!
//! - [`CallLog`] - Structured entry/exit/error logging
//! - [`Retry`] - Re-dispatches failed calls on a backoff schedule
//! - [`ErrorTranslator`] - Maps downstream errors into a domain error
//! - `Instrument` - Call counters and latency histograms (`metrics` feature)
//! - [`BeforeAdapter`], [`AfterReturningAdapter`], [`ThrowsAdapter`] - Lift
//!   the narrow advice traits onto the interceptor SPI

mod adapters;
#[cfg(feature = "metrics")]
mod instrument;
mod logging;
mod retry;
mod translate;

pub use adapters::{
    AfterReturningAdapter, AfterReturningAdvice, BeforeAdapter, BeforeAdvice, ThrowsAdapter,
    ThrowsAdvice,
};
#[cfg(feature = "metrics")]
pub use instrument::Instrument;
pub use logging::CallLog;
pub use retry::Retry;
pub use translate::ErrorTranslator;

use crate::contract::{BoxError, Value};
use crate::invocation::Invocation;

/// Around-advice: one stage of an interception chain.
///
/// An implementation calls [`Invocation::proceed`] to continue toward the
/// target. Calling it zero times short-circuits the rest of the chain;
/// calling it more than once re-runs the whole downstream tail, which is how
/// retry advice works. Downstream errors must be returned unchanged unless
/// transforming them is the interceptor's declared purpose.
pub trait Interceptor: Send + Sync {
    /// Diagnostic name, shown in logs and introspection output.
    fn name(&self) -> &str;

    /// Run this stage.
    fn invoke(&self, invocation: &mut Invocation<'_>) -> Result<Value, BoxError>;
}
