//! The generation engine.
//!
//! [`Engine`] walks a [`Node`] tree depth first. Each node's own value comes
//! from a [`ValueSource`]; the engine then fills in whatever the value holds
//! (array slots, collection elements, map entries, object fields, record
//! arguments, container entries) by recursing into the child nodes, guided by
//! the [`Hints`] attached to the node's result.
//!
//! Non-fatal failures are recorded as warnings on the [`Generated`] output,
//! or raised when [`Settings::fail_on_error`] is set.

use crate::assign::{assigner_for, Assigner};
use crate::container::ContainerFactories;
use crate::data::{Random, Settings};
use crate::error::{EngineError, Result};
use crate::filter::{FieldFilter, PopulationFilter};
use crate::hints::{AfterGenerate, Hints};
use crate::listener::{CallbackHandler, GenerationListener, NullValueTracker};
use crate::node::{Node, NodeKind};
use crate::result::NodeResult;
use crate::source::ValueSource;
use crate::value::{TypeRef, Value};
use tracing::{debug, trace, warn};

mod array;
mod collection;
mod container;
mod map;
mod object;
mod record;

/// Output of a generation run.
#[derive(Debug)]
pub struct Generated {
    pub value: Value,
    /// Errors suppressed because `fail_on_error` was off.
    pub warnings: Vec<EngineError>,
}

/// Populates a node tree into a [`Value`].
pub struct Engine<'a> {
    source: &'a mut dyn ValueSource,
    settings: Settings,
    random: Random,
    assigner: Box<dyn Assigner>,
    factories: ContainerFactories,
    callbacks: CallbackHandler,
    nulls: NullValueTracker,
    listeners: Vec<Box<dyn GenerationListener + 'a>>,
    warnings: Vec<EngineError>,
}

impl<'a> Engine<'a> {
    /// Create an engine for one run. Fails if `settings` are invalid.
    pub fn new(source: &'a mut dyn ValueSource, settings: Settings) -> Result<Self> {
        settings.validate()?;
        let random = Random::new(settings.seed).with_null_probability(settings.null_probability);
        let assigner = assigner_for(&settings);
        Ok(Engine {
            source,
            settings,
            random,
            assigner,
            factories: ContainerFactories::new(),
            callbacks: CallbackHandler::new(),
            nulls: NullValueTracker::new(),
            listeners: Vec::new(),
            warnings: Vec::new(),
        })
    }

    /// Use `factories` to substitute populated containers.
    pub fn with_container_factories(mut self, factories: ContainerFactories) -> Self {
        self.factories = factories;
        self
    }

    /// Callbacks run once, after the whole tree has been generated.
    pub fn with_callbacks(mut self, callbacks: CallbackHandler) -> Self {
        self.callbacks = callbacks;
        self
    }

    /// Notify `listener` of every resolved node.
    pub fn with_listener(mut self, listener: impl GenerationListener + 'a) -> Self {
        self.listeners.push(Box::new(listener));
        self
    }

    /// Generate the value for `root` and run the completion callbacks.
    pub fn create_root_object(mut self, root: &Node) -> Result<Generated> {
        let result = self.create_object(root)?;
        self.callbacks.invoke_callbacks();

        for warning in &self.warnings {
            warn!("{}", warning);
        }

        Ok(Generated {
            value: result.into_value(),
            warnings: self.warnings,
        })
    }

    /// Resolve a single node, dispatching on its kind.
    pub fn create_object(&mut self, node: &Node) -> Result<NodeResult> {
        trace!("Processing: {}", node);

        let result = self.resolve(node)?;
        // Callbacks get the value once its children are in place
        self.callbacks.object_created(node, &result);
        Ok(result)
    }

    fn resolve(&mut self, node: &Node) -> Result<NodeResult> {
        match node.kind() {
            NodeKind::Ignored => {
                let result = NodeResult::ignored();
                self.notify(node, &result);
                Ok(result)
            }
            NodeKind::Truncated => {
                let result = NodeResult::null();
                self.notify(node, &result);
                Ok(result)
            }
            // Zero-argument records still go through their constructor
            NodeKind::Record {
                constructor,
                params,
            } => self.generate_record(node, constructor, params),
            _ if !node.has_children() => Ok(self.generate_value(node)),
            NodeKind::Leaf => Ok(self.generate_value(node)),
            NodeKind::Array { element } => self.generate_array(node, element),
            NodeKind::Collection { element } => self.generate_collection(node, element),
            NodeKind::Map { key, value } => self.generate_map(node, key, value),
            NodeKind::Container { children } => self.generate_container(node, children),
            NodeKind::PlainObject { fields } => self.generate_object(node, fields),
        }
    }

    /// Like [`create_object`](Self::create_object), but may resolve to null
    /// when `nullable` is set.
    fn create_nullable(&mut self, node: &Node, nullable: bool) -> Result<NodeResult> {
        if self.random.dice_roll(nullable) {
            let result = NodeResult::null();
            self.notify(node, &result);
            return Ok(result);
        }
        self.create_object(node)
    }

    fn generate_value(&mut self, node: &Node) -> NodeResult {
        let result = self.source.generate(node, &mut self.random);
        self.notify(node, &result);
        result
    }

    /// Tell the listeners a node's value is known. Completion callbacks are
    /// fed separately from [`create_object`](Self::create_object).
    fn notify(&mut self, node: &Node, result: &NodeResult) {
        self.nulls.object_created(node, result);
        for listener in &mut self.listeners {
            listener.object_created(node, result);
        }
    }

    /// Raise `error` in strict mode, otherwise keep it as a warning.
    fn conditional_fail(&mut self, error: EngineError) -> Result<()> {
        if error.is_fatal() || self.settings.fail_on_error {
            return Err(error);
        }
        debug!("Suppressed error: {}", error);
        self.warnings.push(error);
        Ok(())
    }

    fn action(&self, hints: &Hints) -> AfterGenerate {
        hints.after_generate().unwrap_or(self.settings.after_generate)
    }

    /// Swap a populated container for a registered replacement type.
    fn substitute(&self, node: &Node, result: NodeResult) -> NodeResult {
        if result.contains_null() || self.factories.is_empty() {
            return result;
        }
        let children = node.children();
        let types: Vec<&TypeRef> = children.iter().map(|child| child.target()).collect();
        match self.factories.lookup(node.target(), &types) {
            Some(convert) => result.map_value(|value| convert(value)),
            None => result,
        }
    }

    /// Populate the fields of `parent` from `fields`.
    fn populate_children(
        &mut self,
        fields: &[Node],
        parent: &mut Value,
        action: AfterGenerate,
    ) -> Result<()> {
        if parent.is_null() {
            return Ok(());
        }

        for field in fields {
            if FieldFilter::new(&*self.source, &self.nulls).should_skip(field, action, parent) {
                continue;
            }

            let result = self.create_object(field)?;
            if result.is_empty() || result.is_ignored() {
                continue;
            }

            if self.settings.overwrite_existing_values || !holds_value(field, parent) {
                if let Err(error) = self.assigner.assign(field, parent, result.into_value()) {
                    self.conditional_fail(error)?;
                }
            }
        }
        Ok(())
    }

    /// Populate a value that already exists inside a container, such as a
    /// pre-filled collection element.
    fn populate_existing(&mut self, node: &Node, value: &mut Value, action: AfterGenerate) -> Result<()> {
        if let NodeKind::PlainObject { fields } = node.kind() {
            self.populate_children(fields, value, action)?;
        }
        Ok(())
    }
}

fn holds_value(field: &Node, parent: &Value) -> bool {
    field
        .slot()
        .and_then(|slot| parent.as_object().and_then(|object| object.get(slot.name())))
        .map_or(false, |value| value.neither_null_nor_primitive_default(field.target()))
}

/// Generate a value for `root` with the given source and settings.
pub fn generate(root: &Node, source: &mut dyn ValueSource, settings: Settings) -> Result<Generated> {
    Engine::new(source, settings)?.create_root_object(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::AssignmentType;
    use crate::source::GeneratorRegistry;
    use crate::value::{Object, Primitive};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn person() -> Node {
        Node::object(
            TypeRef::named("Person"),
            vec![
                Node::leaf(TypeRef::named("String")).in_slot("name"),
                Node::leaf(TypeRef::primitive(Primitive::Int)).in_slot("age"),
                Node::ignored(TypeRef::named("String")).in_slot("secret"),
            ],
        )
    }

    fn settings() -> Settings {
        Settings::default().with_seed(42)
    }

    #[test]
    fn test_populates_plain_object_fields() {
        let mut source = GeneratorRegistry::new();
        let generated = generate(&person(), &mut source, settings()).expect("generated");

        let object = generated.value.as_object().expect("object");
        assert!(object.get("name").and_then(Value::as_str).is_some());
        assert!(object.get("age").and_then(Value::as_int).map_or(false, |age| age > 0));
        assert_eq!(object.get("secret"), Some(&Value::Null));
        assert!(generated.warnings.is_empty());
    }

    #[test]
    fn test_null_object_is_not_populated() {
        let root = person();
        let root_id = root.id();
        let mut source =
            GeneratorRegistry::new().with_node_generator(move |node| node.id() == root_id, |_, _| NodeResult::null());

        let seen = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&seen);
        let mut callbacks = CallbackHandler::new();
        callbacks.on_complete(|_| true, move |_| *counter.borrow_mut() += 1);

        let generated = Engine::new(&mut source, settings())
            .expect("engine")
            .with_callbacks(callbacks)
            .create_root_object(&root)
            .expect("generated");

        assert!(generated.value.is_null());
        assert_eq!(*seen.borrow(), 0);
    }

    #[test]
    fn test_callbacks_receive_populated_values() {
        let root = Node::object(
            TypeRef::named("Person"),
            vec![
                Node::leaf(TypeRef::named("String")).in_slot("name"),
                Node::collection(TypeRef::named("List<String>"), Node::leaf(TypeRef::named("String")))
                    .in_slot("tags"),
            ],
        );
        let people = Rc::new(RefCell::new(Vec::new()));
        let lists = Rc::new(RefCell::new(Vec::new()));

        let mut callbacks = CallbackHandler::new();
        let sink = Rc::clone(&people);
        callbacks.on_complete(
            |node| node.target().name() == "Person",
            move |value| sink.borrow_mut().push(value.clone()),
        );
        let sink = Rc::clone(&lists);
        callbacks.on_complete(
            |node| node.target().name() == "List<String>",
            move |value| sink.borrow_mut().push(value.clone()),
        );

        let mut source = GeneratorRegistry::new();
        let generated = Engine::new(&mut source, settings())
            .expect("engine")
            .with_callbacks(callbacks)
            .create_root_object(&root)
            .expect("generated");

        let tags = generated
            .value
            .as_object()
            .and_then(|person| person.get("tags"))
            .expect("tags");
        assert!(tags.as_collection().map_or(false, |tags| !tags.is_empty()));
        assert_eq!(*people.borrow(), vec![generated.value.clone()]);
        assert_eq!(*lists.borrow(), vec![tags.clone()]);
    }

    #[test]
    fn test_do_not_modify_leaves_value_untouched() {
        let root = person();
        let root_id = root.id();
        let mut source = GeneratorRegistry::new().with_node_generator(
            move |node| node.id() == root_id,
            |_, _| {
                NodeResult::create(
                    Object::new("Person").with_field("name", "fixed").into(),
                    Hints::new().with_after_generate(AfterGenerate::DoNotModify),
                )
            },
        );

        let generated = generate(&root, &mut source, settings()).expect("generated");
        let object = generated.value.as_object().expect("object");
        assert_eq!(object.get("name"), Some(&Value::from("fixed")));
        assert!(!object.has_field("age"));
    }

    #[test]
    fn test_existing_values_kept_without_overwrite() {
        let root = person();
        let root_id = root.id();
        let mut source = GeneratorRegistry::new().with_node_generator(
            move |node| node.id() == root_id,
            |_, _| {
                NodeResult::create(
                    Object::new("Person").with_field("name", "fixed").into(),
                    Hints::new().with_after_generate(AfterGenerate::PopulateAll),
                )
            },
        );

        let generated = generate(
            &root,
            &mut source,
            settings().with_overwrite_existing_values(false),
        )
        .expect("generated");
        let object = generated.value.as_object().expect("object");
        assert_eq!(object.get("name"), Some(&Value::from("fixed")));
        assert!(object.get("age").and_then(Value::as_int).is_some());
    }

    #[test]
    fn test_listeners_see_every_node() {
        struct Recorder(Rc<RefCell<Vec<String>>>);

        impl GenerationListener for Recorder {
            fn object_created(&mut self, node: &Node, _result: &NodeResult) {
                self.0.borrow_mut().push(node.target().name().to_string());
            }
        }

        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut source = GeneratorRegistry::new();
        Engine::new(&mut source, settings())
            .expect("engine")
            .with_listener(Recorder(Rc::clone(&seen)))
            .create_root_object(&person())
            .expect("generated");

        assert_eq!(*seen.borrow(), vec!["Person", "String", "int"]);
    }

    #[test]
    fn test_truncated_node_resolves_to_null() {
        let root = Node::object(
            TypeRef::named("Tree"),
            vec![Node::truncated(TypeRef::named("Tree")).in_slot("parent")],
        );
        let mut source = GeneratorRegistry::new();
        let generated = generate(&root, &mut source, settings()).expect("generated");
        let object = generated.value.as_object().expect("object");
        assert_eq!(object.get("parent"), Some(&Value::Null));
    }

    #[test]
    fn test_assignment_failure_is_a_warning_unless_strict() {
        let root = Node::object(
            TypeRef::named("Person"),
            vec![Node::leaf(TypeRef::named("String"))
                .in_slot("name")
                .with_setter(|_, _| Err("rejected".into()))],
        );
        let strict = settings()
            .with_assignment_type(AssignmentType::Method)
            .with_on_set_method_error(crate::data::OnSetMethodError::Fail);

        let mut source = GeneratorRegistry::new();
        let generated = generate(&root, &mut source, strict.clone()).expect("generated");
        assert_eq!(generated.warnings.len(), 1);
        assert!(matches!(generated.warnings[0], EngineError::Assignment { .. }));

        let mut source = GeneratorRegistry::new();
        let result = generate(&root, &mut source, strict.with_fail_on_error(true));
        assert!(matches!(result, Err(EngineError::Assignment { .. })));
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let mut source = GeneratorRegistry::new();
        let result = Engine::new(&mut source, Settings::default().with_null_probability(2.0));
        assert!(matches!(result, Err(EngineError::InvalidConfig { .. })));
    }
}
