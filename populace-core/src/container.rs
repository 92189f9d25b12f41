//! Registry of conversions that substitute a generated container with a
//! different type holding the same data.

use crate::value::{TypeRef, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Converts a populated value into another representation.
pub type ConvertFn = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Conversions keyed by target type and child types.
#[derive(Clone, Default)]
pub struct ContainerFactories {
    exact: HashMap<(String, Vec<String>), ConvertFn>,
    any_args: HashMap<String, ConvertFn>,
}

impl ContainerFactories {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert every value of the `target` type, whatever its child types.
    pub fn register<F>(mut self, target: impl Into<String>, convert: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.any_args.insert(target.into(), Arc::new(convert));
        self
    }

    /// Convert values of the `target` type whose children have exactly the
    /// given types.
    pub fn register_with_args<F>(mut self, target: impl Into<String>, args: &[&str], convert: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        let args = args.iter().map(|arg| arg.to_string()).collect();
        self.exact.insert((target.into(), args), Arc::new(convert));
        self
    }

    /// Find the conversion for a node, preferring an exact match on the
    /// child types.
    pub fn lookup(&self, target: &TypeRef, children: &[&TypeRef]) -> Option<&ConvertFn> {
        let key = (
            target.name().to_string(),
            children.iter().map(|child| child.name().to_string()).collect::<Vec<_>>(),
        );
        self.exact
            .get(&key)
            .or_else(|| self.any_args.get(target.name()))
    }

    /// Whether no conversion is registered.
    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.any_args.is_empty()
    }
}

impl fmt::Debug for ContainerFactories {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerFactories")
            .field("exact", &self.exact.keys().collect::<Vec<_>>())
            .field("any_args", &self.any_args.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Collection, Object};

    fn tagged(tag: &'static str) -> impl Fn(Value) -> Value + Send + Sync {
        move |value| Object::new(tag).with_field("inner", value).into()
    }

    #[test]
    fn test_lookup_prefers_exact_match() {
        let factories = ContainerFactories::new()
            .register("ImmutableList", tagged("any"))
            .register_with_args("ImmutableList", &["String"], tagged("exact"));

        let list = TypeRef::named("ImmutableList");
        let string = TypeRef::named("String");
        let int = TypeRef::named("Integer");

        let exact = factories.lookup(&list, &[&string]).expect("exact conversion");
        let converted = exact(Value::Collection(Collection::list()));
        assert_eq!(converted.as_object().map(Object::type_name), Some("exact"));

        let any = factories.lookup(&list, &[&int]).expect("fallback conversion");
        let converted = any(Value::Collection(Collection::list()));
        assert_eq!(converted.as_object().map(Object::type_name), Some("any"));
    }

    #[test]
    fn test_no_match_without_registration() {
        let factories = ContainerFactories::new();
        assert!(factories.is_empty());
        assert!(factories
            .lookup(&TypeRef::named("List"), &[&TypeRef::named("String")])
            .is_none());
    }
}
