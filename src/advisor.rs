//! Advisors: a named pairing of applicability with an interceptor.
//!
//! Conditional advisors carry a pointcut; *always* advisors ignore
//! pointcuts and attach to every interceptable method, which is how
//! infrastructure advice (error translation and the like) is registered.

use std::fmt;
use std::sync::Arc;

use crate::advice::Interceptor;
use crate::contract::{MethodSpec, TypeContract};
use crate::pointcut::{self, Pointcut};

/// How an advisor decides which methods it attaches to.
#[derive(Clone)]
pub enum Applicability {
    /// Attach to every interceptable method.
    Always,
    /// Attach where the pointcut matches.
    When(Arc<dyn Pointcut>),
}

/// A named advice registration: applicability, interceptor, and an optional
/// explicit order value.
///
/// Effective ordering is a stable sort by explicit order ascending;
/// advisors without an order sort last, and ties keep registration order.
#[derive(Clone)]
pub struct Advisor {
    name: String,
    applicability: Applicability,
    interceptor: Arc<dyn Interceptor>,
    order: Option<i32>,
}

impl Advisor {
    /// Conditional advisor: applies where `pointcut` matches.
    pub fn when(
        name: impl Into<String>,
        pointcut: Arc<dyn Pointcut>,
        interceptor: Arc<dyn Interceptor>,
    ) -> Self {
        Self {
            name: name.into(),
            applicability: Applicability::When(pointcut),
            interceptor,
            order: None,
        }
    }

    /// Infrastructure advisor: applies to every interceptable method.
    pub fn always(name: impl Into<String>, interceptor: Arc<dyn Interceptor>) -> Self {
        Self {
            name: name.into(),
            applicability: Applicability::Always,
            interceptor,
            order: None,
        }
    }

    /// Set the explicit order value. Lower values run closer to the caller.
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn order(&self) -> Option<i32> {
        self.order
    }

    /// Sort key: explicit order, or last place when unordered.
    pub fn effective_order(&self) -> i32 {
        self.order.unwrap_or(i32::MAX)
    }

    pub fn is_always(&self) -> bool {
        matches!(self.applicability, Applicability::Always)
    }

    pub fn interceptor(&self) -> &Arc<dyn Interceptor> {
        &self.interceptor
    }

    /// Decide whether this advisor attaches to `method` on `contract`.
    pub fn applies_to(
        &self,
        contract: &TypeContract,
        method: &MethodSpec,
    ) -> pointcut::Result<bool> {
        match &self.applicability {
            Applicability::Always => Ok(true),
            Applicability::When(pointcut) => pointcut.matches(contract, method),
        }
    }
}

impl fmt::Debug for Advisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Advisor")
            .field("name", &self.name)
            .field("order", &self.order)
            .field("always", &self.is_always())
            .finish()
    }
}

/// Stable effective-order sort over a registration-ordered list.
pub(crate) fn sort_by_effective_order(advisors: &mut [Arc<Advisor>]) {
    advisors.sort_by_key(|a| a.effective_order());
}
