//! Call-surface model: type contracts, method descriptors, and the
//! [`CallTarget`] trait every proxied object implements.
//!
//! A [`TypeContract`] describes what a target can do: its type name, the
//! interface names it implements, declared tags, and an ordered method
//! table. Dispatch is dynamic; the contract is the single source of truth
//! for method identity, arity checking, and pointcut matching.

mod args;

pub use args::{Args, Value};

use std::collections::BTreeSet;

/// Boxed error type for call-time results.
///
/// Target and advice errors cross the interception chain unchanged behind
/// this alias, so callers can downcast back to the concrete type they threw.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

// ============================================================================
// Method descriptors
// ============================================================================

/// Identity and shape of one callable method.
///
/// Sealed methods are never intercepted; the proxy dispatches them straight
/// to the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSpec {
    name: String,
    arity: usize,
    tags: BTreeSet<String>,
    sealed: bool,
}

impl MethodSpec {
    pub fn new(name: impl Into<String>, arity: usize) -> Self {
        Self {
            name: name.into(),
            arity,
            tags: BTreeSet::new(),
            sealed: false,
        }
    }

    /// Declare a tag on this method (attribute analog).
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Mark the method sealed. Sealed methods bypass interception.
    pub fn sealed(mut self) -> Self {
        self.sealed = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }
}

// ============================================================================
// Type contracts
// ============================================================================

/// Descriptor of a proxied type: name, implemented interfaces, type-level
/// tags, and the ordered method table.
///
/// Method position in the table is stable and indexes the per-method chain
/// cache. Method names must be unique; duplicates are rejected when a proxy
/// is built over the contract.
#[derive(Debug, Clone)]
pub struct TypeContract {
    type_name: String,
    interfaces: Vec<String>,
    tags: BTreeSet<String>,
    methods: Vec<MethodSpec>,
}

impl TypeContract {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            interfaces: Vec::new(),
            tags: BTreeSet::new(),
            methods: Vec::new(),
        }
    }

    /// Declare an implemented interface name.
    pub fn with_interface(mut self, name: impl Into<String>) -> Self {
        self.interfaces.push(name.into());
        self
    }

    /// Declare a type-level tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Append a method to the table.
    pub fn with_method(mut self, method: MethodSpec) -> Self {
        self.methods.push(method);
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn interfaces(&self) -> &[String] {
        &self.interfaces
    }

    pub fn has_interface(&self, name: &str) -> bool {
        self.interfaces.iter().any(|i| i == name)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    pub fn methods(&self) -> &[MethodSpec] {
        &self.methods
    }

    /// Look up a method by name, returning its table index and descriptor.
    pub fn method(&self, name: &str) -> Option<(usize, &MethodSpec)> {
        self.methods
            .iter()
            .enumerate()
            .find(|(_, m)| m.name() == name)
    }

    pub fn method_at(&self, index: usize) -> Option<&MethodSpec> {
        self.methods.get(index)
    }

    /// Qualified `type.method` signature, the input to regex pointcuts.
    pub fn signature(&self, method: &MethodSpec) -> String {
        format!("{}.{}", self.type_name, method.name())
    }
}

// ============================================================================
// Call target
// ============================================================================

/// The callable object model. Targets expose their contract and accept
/// dynamic calls; proxies implement the same trait, so proxied and raw
/// objects are interchangeable to callers.
pub trait CallTarget: Send + Sync {
    /// The contract this object answers to.
    fn contract(&self) -> &TypeContract;

    /// Execute `method` with `args`. Arity is validated by the caller
    /// against the contract before dispatch.
    fn call(&self, method: &MethodSpec, args: &mut Args) -> Result<Value, BoxError>;

    /// Interception introspection hook. Proxies return their advised
    /// configuration; plain targets return `None`.
    fn as_advised(&self) -> Option<&crate::proxy::Advised> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orders_contract() -> TypeContract {
        TypeContract::new("OrderService")
            .with_interface("IOrderService")
            .with_tag("service")
            .with_method(MethodSpec::new("place_order", 2).with_tag("transactional"))
            .with_method(MethodSpec::new("order_count", 0))
            .with_method(MethodSpec::new("audit_token", 0).sealed())
    }

    #[test]
    fn test_method_lookup_returns_stable_index() {
        let contract = orders_contract();
        let (idx, spec) = contract.method("order_count").unwrap();
        assert_eq!(idx, 1);
        assert_eq!(spec.arity(), 0);
        assert!(contract.method("missing").is_none());
        assert_eq!(contract.method_at(1).unwrap().name(), "order_count");
    }

    #[test]
    fn test_signature_is_dotted() {
        let contract = orders_contract();
        let (_, spec) = contract.method("place_order").unwrap();
        assert_eq!(contract.signature(spec), "OrderService.place_order");
    }

    #[test]
    fn test_tags_and_interfaces() {
        let contract = orders_contract();
        assert!(contract.has_interface("IOrderService"));
        assert!(!contract.has_interface("IShipping"));
        assert!(contract.has_tag("service"));
        let (_, spec) = contract.method("place_order").unwrap();
        assert!(spec.has_tag("transactional"));
        assert!(!spec.has_tag("audited"));
    }

    #[test]
    fn test_sealed_flag() {
        let contract = orders_contract();
        let (_, spec) = contract.method("audit_token").unwrap();
        assert!(spec.is_sealed());
        let (_, spec) = contract.method("place_order").unwrap();
        assert!(!spec.is_sealed());
    }
}
