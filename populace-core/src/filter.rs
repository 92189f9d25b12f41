//! Filters deciding whether a child position gets populated.

use crate::hints::AfterGenerate;
use crate::listener::NullValueTracker;
use crate::node::Node;
use crate::source::ValueSource;
use crate::value::Value;

/// Decides whether a child node should be left untouched.
pub trait PopulationFilter {
    /// `current` is what the caller holds for the position: the parent
    /// object for fields, the slot value for array elements.
    fn should_skip(&self, node: &Node, action: AfterGenerate, current: &Value) -> bool;
}

/// Filter for the fields of a plain object.
pub struct FieldFilter<'a> {
    source: &'a dyn ValueSource,
    nulls: &'a NullValueTracker,
}

impl<'a> FieldFilter<'a> {
    /// Create a filter consulting `source` for selectors and `nulls` for emitted nulls.
    pub fn new(source: &'a dyn ValueSource, nulls: &'a NullValueTracker) -> Self {
        FieldFilter { source, nulls }
    }
}

impl PopulationFilter for FieldFilter<'_> {
    fn should_skip(&self, node: &Node, action: AfterGenerate, parent: &Value) -> bool {
        if node.is_ignored() || self.nulls.is_null_value(node.id()) {
            return true;
        }
        let Some(slot) = node.slot() else {
            return true;
        };

        let field_value = parent.as_object().and_then(|object| object.get(slot.name()));

        match action {
            AfterGenerate::DoNotModify => true,
            AfterGenerate::ApplySelectors => !self.source.is_targeted(node),
            AfterGenerate::PopulateNulls => field_value.map_or(false, |v| !v.is_null()),
            AfterGenerate::PopulateNullsAndDefaultPrimitives => {
                field_value.map_or(false, |v| v.neither_null_nor_primitive_default(node.target()))
            }
            AfterGenerate::PopulateAll => false,
        }
    }
}

/// Filter for the slots of an array.
pub struct ArrayElementFilter<'a> {
    source: &'a dyn ValueSource,
}

impl<'a> ArrayElementFilter<'a> {
    /// Create a filter consulting `source` for selectors.
    pub fn new(source: &'a dyn ValueSource) -> Self {
        ArrayElementFilter { source }
    }
}

impl PopulationFilter for ArrayElementFilter<'_> {
    fn should_skip(&self, element: &Node, action: AfterGenerate, slot: &Value) -> bool {
        if element.is_ignored() {
            return true;
        }

        match action {
            AfterGenerate::DoNotModify => true,
            AfterGenerate::ApplySelectors => !self.source.is_targeted(element),
            AfterGenerate::PopulateNulls => !slot.is_null(),
            AfterGenerate::PopulateNullsAndDefaultPrimitives => {
                slot.neither_null_nor_primitive_default(element.target())
            }
            AfterGenerate::PopulateAll => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Random;
    use crate::listener::GenerationListener;
    use crate::result::NodeResult;
    use crate::value::{Object, Primitive, TypeRef};

    struct Targeting(Option<crate::node::NodeId>);

    impl ValueSource for Targeting {
        fn generate(&mut self, _node: &Node, _random: &mut Random) -> NodeResult {
            NodeResult::null()
        }

        fn is_targeted(&self, node: &Node) -> bool {
            self.0 == Some(node.id())
        }
    }

    fn person() -> Value {
        Object::new("Person")
            .with_field("name", "ann")
            .with_field("nickname", Value::Null)
            .with_field("age", Value::Int(0))
            .into()
    }

    #[test]
    fn test_field_filter_actions() {
        let name = Node::leaf(TypeRef::named("String")).in_slot("name");
        let nickname = Node::leaf(TypeRef::named("String")).in_slot("nickname");
        let age = Node::leaf(TypeRef::primitive(Primitive::Int)).in_slot("age");

        let source = Targeting(Some(age.id()));
        let nulls = NullValueTracker::new();
        let filter = FieldFilter::new(&source, &nulls);
        let parent = person();

        use AfterGenerate::*;
        assert!(filter.should_skip(&nickname, DoNotModify, &parent));

        assert!(filter.should_skip(&name, PopulateNulls, &parent));
        assert!(!filter.should_skip(&nickname, PopulateNulls, &parent));
        // Zero is not null
        assert!(filter.should_skip(&age, PopulateNulls, &parent));

        assert!(filter.should_skip(&name, PopulateNullsAndDefaultPrimitives, &parent));
        assert!(!filter.should_skip(&age, PopulateNullsAndDefaultPrimitives, &parent));

        assert!(!filter.should_skip(&name, PopulateAll, &parent));

        assert!(filter.should_skip(&name, ApplySelectors, &parent));
        assert!(!filter.should_skip(&age, ApplySelectors, &parent));
    }

    #[test]
    fn test_field_filter_skips_ignored_and_emitted_nulls() {
        let ignored = Node::ignored(TypeRef::named("String")).in_slot("nickname");
        let emitted = Node::leaf(TypeRef::named("String")).in_slot("nickname");

        let source = Targeting(None);
        let mut nulls = NullValueTracker::new();
        nulls.object_created(&emitted, &NodeResult::emitted_null());
        let filter = FieldFilter::new(&source, &nulls);

        assert!(filter.should_skip(&ignored, AfterGenerate::PopulateAll, &person()));
        assert!(filter.should_skip(&emitted, AfterGenerate::PopulateAll, &person()));
    }

    #[test]
    fn test_array_element_filter() {
        let ints = Node::leaf(TypeRef::primitive(Primitive::Int));
        let strings = Node::leaf(TypeRef::named("String"));
        let source = Targeting(None);
        let filter = ArrayElementFilter::new(&source);

        use AfterGenerate::*;
        assert!(!filter.should_skip(&ints, PopulateNullsAndDefaultPrimitives, &Value::Int(0)));
        assert!(filter.should_skip(&ints, PopulateNullsAndDefaultPrimitives, &Value::Int(4)));
        assert!(!filter.should_skip(&strings, PopulateNulls, &Value::Null));
        assert!(filter.should_skip(&strings, PopulateNulls, &Value::from("x")));
        assert!(filter.should_skip(&strings, DoNotModify, &Value::Null));
        assert!(!filter.should_skip(&strings, PopulateAll, &Value::from("x")));
    }
}
