//! Tag-presence pointcut, the declared-attribute analog.

use super::{Pointcut, Result};
use crate::contract::{MethodSpec, TypeContract};

/// Where a tag may be declared for a match to count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagScope {
    MethodOnly,
    MethodOrType,
}

/// Matches methods carrying a tag. With the widened scope, a type-level
/// tag selects every method of the type.
#[derive(Debug, Clone)]
pub struct TagPointcut {
    tag: String,
    scope: TagScope,
}

impl TagPointcut {
    /// Match only tags declared on the method itself (`tag:` descriptor).
    pub fn method(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            scope: TagScope::MethodOnly,
        }
    }

    /// Also accept a tag declared on the type (`tag+:` descriptor).
    pub fn method_or_type(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            scope: TagScope::MethodOrType,
        }
    }
}

impl Pointcut for TagPointcut {
    fn describe(&self) -> String {
        match self.scope {
            TagScope::MethodOnly => format!("tag:{}", self.tag),
            TagScope::MethodOrType => format!("tag+:{}", self.tag),
        }
    }

    fn matches(&self, contract: &TypeContract, method: &MethodSpec) -> Result<bool> {
        if method.has_tag(&self.tag) {
            return Ok(true);
        }
        Ok(self.scope == TagScope::MethodOrType && contract.has_tag(&self.tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contract() -> TypeContract {
        TypeContract::new("Ledger")
            .with_tag("audited")
            .with_method(MethodSpec::new("post", 1).with_tag("transactional"))
            .with_method(MethodSpec::new("balance", 0))
    }

    #[test]
    fn test_method_tag_match() {
        let c = contract();
        let p = TagPointcut::method("transactional");
        assert!(p.matches(&c, c.method_at(0).unwrap()).unwrap());
        assert!(!p.matches(&c, c.method_at(1).unwrap()).unwrap());
    }

    #[test]
    fn test_type_tag_requires_widened_scope() {
        let c = contract();
        let narrow = TagPointcut::method("audited");
        let wide = TagPointcut::method_or_type("audited");
        assert!(!narrow.matches(&c, c.method_at(1).unwrap()).unwrap());
        assert!(wide.matches(&c, c.method_at(1).unwrap()).unwrap());
    }
}
