//! Heddle - Method interception framework
//!
//! A Rust implementation of pointcut-driven interception: advisors pair
//! join-point predicates with advice, proxies thread the matching advice
//! into per-method chains, and an object registry auto-proxies the
//! targets it builds.

pub mod advice;
pub mod advisor;
pub mod chain;
pub mod container;
pub mod contract;
pub mod invocation;
#[cfg(feature = "plan")]
pub mod plan;
pub mod plugin;
pub mod pointcut;
pub mod proxy;
pub mod telemetry;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
