//! Name-pattern and regex pointcuts.

use regex::Regex;

use super::{Pointcut, PointcutError, Result};
use crate::contract::{MethodSpec, TypeContract};

/// Matches method names against a literal with `*` wildcards
/// (`save*`, `*_total`, `get*count`, `*`).
#[derive(Debug, Clone)]
pub struct NamePointcut {
    pattern: String,
}

impl NamePointcut {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }
}

impl Pointcut for NamePointcut {
    fn describe(&self) -> String {
        format!("name:{}", self.pattern)
    }

    fn matches(&self, _contract: &TypeContract, method: &MethodSpec) -> Result<bool> {
        Ok(wildcard_match(&self.pattern, method.name()))
    }
}

/// Case-sensitive wildcard match where `*` spans any run of characters.
fn wildcard_match(pattern: &str, input: &str) -> bool {
    if !pattern.contains('*') {
        return pattern == input;
    }
    let parts: Vec<&str> = pattern.split('*').collect();
    let mut rest = input;

    // Leading segment anchors at the start.
    if let Some(first) = parts.first() {
        if !first.is_empty() {
            match rest.strip_prefix(first) {
                Some(r) => rest = r,
                None => return false,
            }
        }
    }

    // Middle segments must appear in order within what remains.
    for part in &parts[1..parts.len() - 1] {
        if part.is_empty() {
            continue;
        }
        match rest.find(part) {
            Some(pos) => rest = &rest[pos + part.len()..],
            None => return false,
        }
    }

    // Trailing segment anchors at the end.
    let last = parts[parts.len() - 1];
    last.is_empty() || rest.ends_with(last)
}

/// Matches the qualified `type.method` signature against an anchored regex.
///
/// The pattern is compiled at construction; malformed patterns are
/// configuration errors and never reach dispatch.
#[derive(Debug, Clone)]
pub struct RegexPointcut {
    pattern: String,
    regex: Regex,
}

impl RegexPointcut {
    pub fn new(pattern: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();
        let anchored = format!("^(?:{pattern})$");
        let regex = Regex::new(&anchored).map_err(|e| PointcutError::Parse {
            descriptor: format!("regex:{pattern}"),
            reason: e.to_string(),
        })?;
        Ok(Self { pattern, regex })
    }
}

impl Pointcut for RegexPointcut {
    fn describe(&self) -> String {
        format!("regex:{}", self.pattern)
    }

    fn matches(&self, contract: &TypeContract, method: &MethodSpec) -> Result<bool> {
        Ok(self.regex.is_match(&contract.signature(method)))
    }
}
