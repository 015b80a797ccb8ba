//! Pointcut combinators: union, intersection, negation.

use std::sync::Arc;

use super::{Pointcut, Result};
use crate::contract::{MethodSpec, TypeContract};

/// Union: matches when any part matches. An empty union matches nothing.
pub struct AnyPointcut {
    parts: Vec<Arc<dyn Pointcut>>,
}

/// Intersection: matches when every part matches. An empty intersection
/// matches everything.
pub struct AllPointcut {
    parts: Vec<Arc<dyn Pointcut>>,
}

/// Negation of one pointcut.
pub struct NotPointcut {
    inner: Arc<dyn Pointcut>,
}

/// Union of `parts`.
pub fn any(parts: Vec<Arc<dyn Pointcut>>) -> Arc<dyn Pointcut> {
    Arc::new(AnyPointcut { parts })
}

/// Intersection of `parts`.
pub fn all(parts: Vec<Arc<dyn Pointcut>>) -> Arc<dyn Pointcut> {
    Arc::new(AllPointcut { parts })
}

/// Negation of `inner`.
pub fn not(inner: Arc<dyn Pointcut>) -> Arc<dyn Pointcut> {
    Arc::new(NotPointcut { inner })
}

fn describe_parts(parts: &[Arc<dyn Pointcut>]) -> String {
    parts
        .iter()
        .map(|p| p.describe())
        .collect::<Vec<_>>()
        .join(", ")
}

impl Pointcut for AnyPointcut {
    fn describe(&self) -> String {
        format!("any({})", describe_parts(&self.parts))
    }

    fn matches(&self, contract: &TypeContract, method: &MethodSpec) -> Result<bool> {
        for part in &self.parts {
            if part.matches(contract, method)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl Pointcut for AllPointcut {
    fn describe(&self) -> String {
        format!("all({})", describe_parts(&self.parts))
    }

    fn matches(&self, contract: &TypeContract, method: &MethodSpec) -> Result<bool> {
        for part in &self.parts {
            if !part.matches(contract, method)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl Pointcut for NotPointcut {
    fn describe(&self) -> String {
        format!("not({})", self.inner.describe())
    }

    fn matches(&self, contract: &TypeContract, method: &MethodSpec) -> Result<bool> {
        Ok(!self.inner.matches(contract, method)?)
    }
}
