//! Type-membership pointcut, the assignability analog.

use super::{Pointcut, Result};
use crate::contract::{MethodSpec, TypeContract};

/// Matches every method of a type whose name or implemented interface list
/// contains the operand.
#[derive(Debug, Clone)]
pub struct WithinPointcut {
    type_or_interface: String,
}

impl WithinPointcut {
    pub fn new(type_or_interface: impl Into<String>) -> Self {
        Self {
            type_or_interface: type_or_interface.into(),
        }
    }
}

impl Pointcut for WithinPointcut {
    fn describe(&self) -> String {
        format!("within:{}", self.type_or_interface)
    }

    fn matches(&self, contract: &TypeContract, _method: &MethodSpec) -> Result<bool> {
        Ok(contract.type_name() == self.type_or_interface
            || contract.has_interface(&self.type_or_interface))
    }
}
