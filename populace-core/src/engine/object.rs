use super::Engine;
use crate::error::Result;
use crate::node::Node;
use crate::result::NodeResult;

impl Engine<'_> {
    pub(super) fn generate_object(&mut self, node: &Node, fields: &[Node]) -> Result<NodeResult> {
        let mut result = self.generate_value(node);
        if result.contains_null() || result.is_ignored() {
            return Ok(result);
        }

        let action = self.action(result.hints());
        self.populate_children(fields, result.value_mut(), action)?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::generate;
    use crate::data::Settings;
    use crate::hints::{AfterGenerate, Hints};
    use crate::node::Node;
    use crate::result::NodeResult;
    use crate::source::GeneratorRegistry;
    use crate::value::{Object, Primitive, TypeRef, Value};

    fn address() -> Node {
        Node::object(
            TypeRef::named("Address"),
            vec![
                Node::leaf(TypeRef::named("String")).in_slot("city"),
                Node::leaf(TypeRef::primitive(Primitive::Int)).in_slot("number"),
            ],
        )
    }

    #[test]
    fn test_nested_objects_are_populated() {
        let root = Node::object(
            TypeRef::named("Person"),
            vec![
                Node::leaf(TypeRef::named("String")).in_slot("name"),
                address().in_slot("address"),
            ],
        );
        let mut source = GeneratorRegistry::new();
        let generated = generate(&root, &mut source, Settings::default().with_seed(3)).expect("generated");

        let address = generated
            .value
            .as_object()
            .and_then(|person| person.get("address"))
            .and_then(Value::as_object)
            .expect("address");
        assert!(address.get("city").and_then(Value::as_str).is_some());
        assert!(address.get("number").and_then(Value::as_int).is_some());
    }

    #[test]
    fn test_populate_nulls_keeps_primitive_zero() {
        let root = address();
        let root_id = root.id();
        let mut source = GeneratorRegistry::new().with_node_generator(
            move |node| node.id() == root_id,
            |_, _| {
                NodeResult::create(
                    Object::new("Address")
                        .with_field("city", Value::Null)
                        .with_field("number", Value::Int(0))
                        .into(),
                    Hints::new().with_after_generate(AfterGenerate::PopulateNulls),
                )
            },
        );

        let generated = generate(&root, &mut source, Settings::default().with_seed(3)).expect("generated");
        let object = generated.value.as_object().expect("object");
        assert!(object.get("city").and_then(Value::as_str).is_some());
        assert_eq!(object.get("number"), Some(&Value::Int(0)));
    }

    #[test]
    fn test_apply_selectors_only_touches_targeted_fields() {
        let root = address();
        let root_id = root.id();
        let mut source = GeneratorRegistry::new()
            .with_node_generator(
                move |node| node.id() == root_id,
                |_, _| {
                    NodeResult::create(
                        Object::new("Address").into(),
                        Hints::new().with_after_generate(AfterGenerate::ApplySelectors),
                    )
                },
            )
            .with_generator("int", |_, _| NodeResult::create(Value::Int(7), Hints::new()));

        let generated = generate(&root, &mut source, Settings::default().with_seed(3)).expect("generated");
        let object = generated.value.as_object().expect("object");
        assert!(!object.has_field("city"));
        assert_eq!(object.get("number"), Some(&Value::Int(7)));
    }
}
