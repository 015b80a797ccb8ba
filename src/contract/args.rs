//! Opaque call payloads: [`Value`] and the fixed-arity [`Args`] vector.

use std::any::Any;
use std::fmt;

/// An owned, `Send` argument or return payload.
///
/// Wraps the concrete value for checked downcast and remembers its type name
/// for diagnostics, since `dyn Any` alone cannot report one.
pub struct Value {
    inner: Box<dyn Any + Send>,
    type_name: &'static str,
}

impl Value {
    pub fn new<T: Any + Send>(value: T) -> Self {
        Self {
            inner: Box::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// The unit payload, returned by methods with nothing to say.
    pub fn unit() -> Self {
        Self::new(())
    }

    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    pub fn is_unit(&self) -> bool {
        self.is::<()>()
    }

    /// Consume the payload, recovering the concrete value. Returns the
    /// untouched `Value` on a type mismatch.
    pub fn downcast<T: Any>(self) -> Result<T, Value> {
        match self.inner.downcast::<T>() {
            Ok(boxed) => Ok(*boxed),
            Err(inner) => Err(Value {
                inner,
                type_name: self.type_name,
            }),
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref()
    }

    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.inner.downcast_mut()
    }

    /// Type name captured at construction.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value({})", self.type_name)
    }
}

/// Ordered argument slots for one call. Arity is fixed at construction;
/// slot contents are replaceable, and replacements are visible to later
/// chain stages and to the target.
#[derive(Debug)]
pub struct Args {
    slots: Vec<Value>,
}

impl Args {
    pub fn new(slots: Vec<Value>) -> Self {
        Self { slots }
    }

    /// Zero-argument call.
    pub fn none() -> Self {
        Self { slots: Vec::new() }
    }

    pub fn arity(&self) -> usize {
        self.slots.len()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.slots.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Value> {
        self.slots.get_mut(index)
    }

    /// Replace a slot, returning the previous payload. Out-of-range indexes
    /// leave the slots untouched and return `None`; arity never changes.
    pub fn set(&mut self, index: usize, value: Value) -> Option<Value> {
        let slot = self.slots.get_mut(index)?;
        Some(std::mem::replace(slot, value))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.slots.iter()
    }
}
