//! Pointcuts: deterministic predicates selecting which methods an advisor
//! applies to.
//!
//! Built-in kinds cover name patterns, regexes over the qualified
//! `type.method` signature, tag presence, and type membership, plus
//! union/intersection/negation combinators. A textual descriptor syntax
//! (`name:save*`, `regex:^Orders\..*$`, `tag:transactional`,
//! `tag+:audited`, `within:OrderService`, `true`) drives declarative
//! configuration.

mod compose;
mod name;
mod tag;
mod within;

pub use compose::{all, any, not, AllPointcut, AnyPointcut, NotPointcut};
pub use name::{NamePointcut, RegexPointcut};
pub use tag::TagPointcut;
pub use within::WithinPointcut;

use std::sync::Arc;

use thiserror::Error;

use crate::contract::{MethodSpec, TypeContract};

/// Errors raised by pointcut parsing or evaluation.
#[derive(Debug, Error)]
pub enum PointcutError {
    /// Descriptor or pattern rejected before any call executes.
    #[error("invalid pointcut '{descriptor}': {reason}")]
    Parse { descriptor: String, reason: String },

    /// A pointcut failed while evaluating a join point. Chain building
    /// treats this as fatal configuration, never as a non-match.
    #[error("pointcut '{pointcut}' failed to evaluate: {message}")]
    Evaluation { pointcut: String, message: String },
}

pub type Result<T> = std::result::Result<T, PointcutError>;

/// Join-point predicate.
///
/// Implementations must be deterministic and side-effect free: the same
/// `(contract, method)` input always yields the same answer. Built-in
/// pointcuts never fail at evaluation time; fallibility exists for user
/// implementations that consult external metadata.
pub trait Pointcut: Send + Sync {
    /// Short human-readable form, used in logs and evaluation errors.
    fn describe(&self) -> String;

    /// Decide whether this pointcut selects `method` on `contract`.
    fn matches(&self, contract: &TypeContract, method: &MethodSpec) -> Result<bool>;
}

/// Matches every method. Backs *always* advisors and test fixtures.
#[derive(Debug, Clone, Copy, Default)]
pub struct TruePointcut;

impl Pointcut for TruePointcut {
    fn describe(&self) -> String {
        "true".to_string()
    }

    fn matches(&self, _contract: &TypeContract, _method: &MethodSpec) -> Result<bool> {
        Ok(true)
    }
}

/// Parse a textual pointcut descriptor.
///
/// Malformed descriptors are configuration errors surfaced here, before
/// any call executes.
pub fn parse(descriptor: &str) -> Result<Arc<dyn Pointcut>> {
    let descriptor = descriptor.trim();
    if descriptor == "true" {
        return Ok(Arc::new(TruePointcut));
    }
    let (kind, operand) = descriptor.split_once(':').ok_or_else(|| PointcutError::Parse {
        descriptor: descriptor.to_string(),
        reason: "expected 'kind:operand' or 'true'".to_string(),
    })?;
    let operand = operand.trim();
    if operand.is_empty() {
        return Err(PointcutError::Parse {
            descriptor: descriptor.to_string(),
            reason: "empty operand".to_string(),
        });
    }
    match kind {
        "name" => Ok(Arc::new(NamePointcut::new(operand))),
        "regex" => Ok(Arc::new(RegexPointcut::new(operand)?)),
        "tag" => Ok(Arc::new(TagPointcut::method(operand))),
        "tag+" => Ok(Arc::new(TagPointcut::method_or_type(operand))),
        "within" => Ok(Arc::new(WithinPointcut::new(operand))),
        other => Err(PointcutError::Parse {
            descriptor: descriptor.to_string(),
            reason: format!("unknown pointcut kind '{other}'"),
        }),
    }
}
