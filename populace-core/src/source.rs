//! Value generation for individual nodes.
//!
//! The engine does not decide how a node's own value is produced; it asks a
//! [`ValueSource`]. [`GeneratorRegistry`] is a ready-made source with
//! default-by-shape values and user generators keyed by type name or by node.

use crate::data::Random;
use crate::hints::{ArrayHint, CollectionHint, Hints, MapHint};
use crate::node::{Node, NodeKind};
use crate::result::NodeResult;
use crate::value::{Collection, CollectionKind, MapValue, Object, Primitive, Value};
use std::collections::HashMap;

/// Produces a value plus hints for any node.
pub trait ValueSource {
    fn generate(&mut self, node: &Node, random: &mut Random) -> NodeResult;

    /// Whether a user generator is registered for `node`. Records with a
    /// generator are not built through their constructor.
    fn has_generator(&self, _node: &Node) -> bool {
        false
    }

    /// Whether a user selector targets `node`.
    fn is_targeted(&self, node: &Node) -> bool {
        self.has_generator(node)
    }
}

type NodeMatcher = Box<dyn Fn(&Node) -> bool>;
type GeneratorFn = Box<dyn FnMut(&Node, &mut Random) -> NodeResult>;

/// Size bounds for default strings, arrays, collections and maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sizes {
    pub min_size: usize,
    pub max_size: usize,
    pub min_string_length: usize,
    pub max_string_length: usize,
}

impl Default for Sizes {
    fn default() -> Self {
        Sizes {
            min_size: 2,
            max_size: 6,
            min_string_length: 2,
            max_string_length: 10,
        }
    }
}

/// Value source with user generators and default values by shape.
#[derive(Default)]
pub struct GeneratorRegistry {
    by_node: Vec<(NodeMatcher, GeneratorFn)>,
    by_type: HashMap<String, GeneratorFn>,
    nullable: Vec<NodeMatcher>,
    sizes: Sizes,
}

impl GeneratorRegistry {
    /// Create a registry producing default values only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate every node of the named type with `generator`.
    pub fn with_generator<F>(mut self, type_name: impl Into<String>, generator: F) -> Self
    where
        F: FnMut(&Node, &mut Random) -> NodeResult + 'static,
    {
        self.by_type.insert(type_name.into(), Box::new(generator));
        self
    }

    /// Generate nodes matching `matcher` with `generator`. Takes precedence
    /// over type generators.
    pub fn with_node_generator<M, F>(mut self, matcher: M, generator: F) -> Self
    where
        M: Fn(&Node) -> bool + 'static,
        F: FnMut(&Node, &mut Random) -> NodeResult + 'static,
    {
        self.by_node.push((Box::new(matcher), Box::new(generator)));
        self
    }

    /// Let nodes matching `matcher` randomly resolve to null.
    pub fn with_nullable<M>(mut self, matcher: M) -> Self
    where
        M: Fn(&Node) -> bool + 'static,
    {
        self.nullable.push(Box::new(matcher));
        self
    }

    /// Override the default size bounds.
    pub fn with_sizes(mut self, sizes: Sizes) -> Self {
        self.sizes = sizes;
        self
    }

    fn default_value(&self, node: &Node, random: &mut Random) -> NodeResult {
        let sizes = self.sizes;
        match node.kind() {
            NodeKind::Leaf => NodeResult::create(leaf_value(node, random, sizes), Hints::new()),
            NodeKind::Array { element } => {
                let length = random.size_range(sizes.min_size, sizes.max_size);
                NodeResult::create(
                    Value::Array(vec![element.target().default_value(); length]),
                    Hints::new().with_array(ArrayHint::default()),
                )
            }
            NodeKind::Collection { .. } => {
                let kind = if node.target().name().contains("Set") {
                    CollectionKind::Set
                } else {
                    CollectionKind::List
                };
                let hint = CollectionHint {
                    generate_elements: random.size_range(sizes.min_size, sizes.max_size),
                    ..CollectionHint::default()
                };
                NodeResult::create(
                    Value::Collection(Collection::new(kind)),
                    Hints::new().with_collection(hint),
                )
            }
            NodeKind::Map { .. } => {
                let hint = MapHint {
                    generate_entries: random.size_range(sizes.min_size, sizes.max_size),
                    ..MapHint::default()
                };
                NodeResult::create(Value::Map(MapValue::new()), Hints::new().with_map(hint))
            }
            NodeKind::PlainObject { fields } => {
                let mut object = Object::new(node.target().name());
                for field in fields {
                    if let Some(slot) = field.slot() {
                        object.set(slot.name(), field.target().default_value());
                    }
                }
                NodeResult::create(Value::Object(object), Hints::new())
            }
            NodeKind::Ignored => NodeResult::ignored(),
            NodeKind::Record { .. } | NodeKind::Container { .. } | NodeKind::Truncated => {
                NodeResult::null()
            }
        }
    }
}

fn leaf_value(node: &Node, random: &mut Random, sizes: Sizes) -> Value {
    let ty = node.target();
    match ty.as_primitive() {
        Some(Primitive::Bool) => return Value::Bool(random.bool()),
        Some(Primitive::Int) => return Value::Int(random.int_range(1, 10_000)),
        Some(Primitive::Float) => return Value::Float(random.float() * 10_000.0),
        Some(Primitive::Char) => return Value::Char(random_char(random)),
        None => {}
    }
    match ty.name() {
        "String" | "str" => {
            let len = random.size_range(sizes.min_string_length, sizes.max_string_length);
            Value::Str(random.alphabetic(len))
        }
        "Boolean" => Value::Bool(random.bool()),
        "Integer" | "Long" | "i32" | "i64" => Value::Int(random.int_range(1, 10_000)),
        "Double" | "Float" | "f64" => Value::Float(random.float() * 10_000.0),
        "Character" => Value::Char(random_char(random)),
        _ => Value::Null,
    }
}

fn random_char(random: &mut Random) -> char {
    random.alphabetic(1).chars().next().unwrap_or('A')
}

impl ValueSource for GeneratorRegistry {
    fn generate(&mut self, node: &Node, random: &mut Random) -> NodeResult {
        if self.nullable.iter().any(|matcher| matcher(node)) && random.dice_roll(true) {
            return NodeResult::null();
        }
        if let Some(entry) = self.by_node.iter_mut().find(|entry| (entry.0)(node)) {
            return (entry.1)(node, random);
        }
        if let Some(generator) = self.by_type.get_mut(node.target().name()) {
            return generator(node, random);
        }
        self.default_value(node, random)
    }

    fn has_generator(&self, node: &Node) -> bool {
        self.by_node.iter().any(|(matcher, _)| matcher(node))
            || self.by_type.contains_key(node.target().name())
    }
}
