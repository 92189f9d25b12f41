use super::Engine;
use crate::error::{BoxError, EngineError, Result};
use crate::node::Node;
use crate::result::NodeResult;
use crate::value::Value;

impl Engine<'_> {
    /// Containers without in-place mutation are filled through the
    /// create/add/build functions of their [`ContainerHint`](crate::hints::ContainerHint).
    pub(super) fn generate_container(&mut self, node: &Node, children: &[Node]) -> Result<NodeResult> {
        let mut result = self.generate_value(node);
        if result.is_empty() || result.is_ignored() {
            return Ok(result);
        }

        let Some(hint) = result.hints().container().cloned() else {
            return Ok(self.substitute(node, result));
        };

        if result.contains_null() {
            if let Some(create) = hint.create_fn() {
                let args = self.container_args(children)?;
                match create(args) {
                    Ok(value) => result = result.replace_value(value),
                    Err(source) => return self.container_failed(node, source),
                }
            }
        }
        if result.contains_null() {
            return Ok(result);
        }

        if let Some(add) = hint.add_fn() {
            for _ in 0..hint.generate_entries() {
                let args = self.container_args(children)?;
                if let Err(source) = add(result.value_mut(), args) {
                    return self.container_failed(node, source);
                }
            }
        }

        if let Some(build) = hint.build_fn() {
            let hints = result.hints().clone();
            return match build(result.into_value()) {
                Ok(built) => Ok(NodeResult::create(built, hints)),
                Err(source) => self.container_failed(node, source),
            };
        }

        Ok(self.substitute(node, result))
    }

    /// One generated value per child node, in order.
    fn container_args(&mut self, children: &[Node]) -> Result<Vec<Value>> {
        let mut args = Vec::with_capacity(children.len());
        for child in children {
            args.push(self.create_object(child)?.into_value());
        }
        Ok(args)
    }

    fn container_failed(&mut self, node: &Node, source: BoxError) -> Result<NodeResult> {
        self.conditional_fail(EngineError::Construction {
            node: node.to_string(),
            source,
        })?;
        Ok(NodeResult::empty())
    }
}

#[cfg(test)]
mod tests {
    use crate::container::ContainerFactories;
    use crate::data::Settings;
    use crate::engine::{generate, Engine};
    use crate::error::EngineError;
    use crate::hints::{ContainerHint, Hints};
    use crate::node::Node;
    use crate::result::NodeResult;
    use crate::source::GeneratorRegistry;
    use crate::value::{MapValue, Object, TypeRef, Value};

    fn multimap() -> Node {
        Node::container(
            TypeRef::named("Multimap"),
            vec![Node::leaf(TypeRef::named("String")), Node::leaf(TypeRef::named("Integer"))],
        )
    }

    fn builder_hint(entries: usize) -> ContainerHint {
        ContainerHint::new()
            .with_create(|_| Ok(Value::Map(MapValue::new())))
            .with_add(|builder, args| {
                let Value::Map(map) = builder else {
                    return Err("builder is not a map".into());
                };
                let mut args = args.into_iter();
                let key = args.next().ok_or("missing key")?;
                let value = args.next().ok_or("missing value")?;
                map.insert(key, value);
                Ok(())
            })
            .with_generate_entries(entries)
    }

    fn with_hint(root: &Node, hint: ContainerHint) -> GeneratorRegistry {
        let root_id = root.id();
        GeneratorRegistry::new().with_node_generator(
            move |node| node.id() == root_id,
            move |_, _| NodeResult::create(Value::Null, Hints::new().with_container(hint.clone())),
        )
    }

    #[test]
    fn test_create_then_add() {
        let root = multimap();
        let mut source = with_hint(&root, builder_hint(3));
        let generated = generate(&root, &mut source, Settings::default().with_seed(6)).expect("generated");

        let map = generated.value.as_map().expect("map");
        assert!(!map.is_empty() && map.len() <= 3);
        assert!(map.iter().all(|(key, value)| key.as_str().is_some() && value.as_int().is_some()));
    }

    #[test]
    fn test_build_finishes_container() {
        let root = multimap();
        let hint = builder_hint(2).with_build(|builder| Ok(Object::new("Multimap").with_field("entries", builder).into()));
        let mut source = with_hint(&root, hint);
        let generated = generate(&root, &mut source, Settings::default().with_seed(6)).expect("generated");

        let object = generated.value.as_object().expect("built");
        assert_eq!(object.type_name(), "Multimap");
        assert!(object.get("entries").and_then(Value::as_map).is_some());
    }

    #[test]
    fn test_too_few_children_fail_gracefully() {
        let root = Node::container(TypeRef::named("Multimap"), vec![Node::leaf(TypeRef::named("String"))]);
        let mut source = with_hint(&root, builder_hint(2));
        let generated = generate(&root, &mut source, Settings::default().with_seed(6)).expect("generated");
        assert!(generated.value.is_null());
        assert!(matches!(
            generated.warnings.as_slice(),
            [EngineError::Construction { .. }]
        ));
    }

    #[test]
    fn test_null_without_create_stays_null() {
        let root = multimap();
        let hint = ContainerHint::new().with_add(|_, _| Err("never called".into())).with_generate_entries(2);
        let mut source = with_hint(&root, hint);
        let generated = generate(&root, &mut source, Settings::default().with_seed(6)).expect("generated");
        assert!(generated.value.is_null());
        assert!(generated.warnings.is_empty());
    }

    #[test]
    fn test_substitution_without_build() {
        let root = multimap();
        let mut source = with_hint(&root, builder_hint(1));
        let factories = ContainerFactories::new().register_with_args("Multimap", &["String", "Integer"], |value| {
            Object::new("ImmutableMultimap").with_field("map", value).into()
        });

        let generated = Engine::new(&mut source, Settings::default().with_seed(6))
            .expect("engine")
            .with_container_factories(factories)
            .create_root_object(&root)
            .expect("generated");
        let object = generated.value.as_object().expect("substituted");
        assert_eq!(object.type_name(), "ImmutableMultimap");
    }
}
