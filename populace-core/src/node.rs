//! The node tree the engine walks.
//!
//! A node is a position in the object graph: a field, an array or collection
//! element, a map key or value, or a constructor parameter. Trees are built
//! once per generation request by an external builder and are read-only to
//! the engine.

use crate::error::BoxError;
use crate::value::{Object, TypeRef, Value};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(0);

/// Identifies a node for listeners and trackers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Writes a field through its accessor rather than directly.
pub type Setter = Arc<dyn Fn(&mut Object, Value) -> Result<(), BoxError> + Send + Sync>;

/// Builds an immutable value from its constructor arguments.
pub type ConstructFn = Arc<dyn Fn(Vec<Value>) -> Result<Value, BoxError> + Send + Sync>;

/// Back-reference to the field a node fills.
#[derive(Clone)]
pub struct Slot {
    name: String,
    setter: Option<Setter>,
}

impl Slot {
    /// Create a slot for the named field, without a setter.
    pub fn new(name: impl Into<String>) -> Self {
        Slot {
            name: name.into(),
            setter: None,
        }
    }

    /// Name of the field.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The setter used by method assignment, if any.
    pub fn setter(&self) -> Option<&Setter> {
        self.setter.as_ref()
    }
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot")
            .field("name", &self.name)
            .field("setter", &self.setter.is_some())
            .finish()
    }
}

/// Constructor of a record: declared parameter types plus the function
/// that instantiates it.
#[derive(Clone)]
pub struct Constructor {
    params: Vec<TypeRef>,
    build: ConstructFn,
}

impl Constructor {
    /// Create a constructor taking arguments of the given types.
    pub fn new<F>(params: Vec<TypeRef>, build: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        Constructor {
            params,
            build: Arc::new(build),
        }
    }

    /// Number of arguments.
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Declared argument types, in order.
    pub fn params(&self) -> &[TypeRef] {
        &self.params
    }

    /// Build a value from the arguments.
    pub fn invoke(&self, args: Vec<Value>) -> Result<Value, BoxError> {
        (self.build)(args)
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// The shape of a node, with the children that shape requires.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// A value produced entirely by value generation.
    Leaf,
    Array {
        element: Box<Node>,
    },
    Collection {
        element: Box<Node>,
    },
    Map {
        key: Box<Node>,
        value: Box<Node>,
    },
    /// Immutable type populated through its constructor.
    Record {
        constructor: Constructor,
        params: Vec<Node>,
    },
    /// Third-party type built through create/add/build functions.
    Container {
        children: Vec<Node>,
    },
    /// Mutable object populated field by field.
    PlainObject {
        fields: Vec<Node>,
    },
    /// Excluded from generation.
    Ignored,
    /// A cyclic branch cut off by the tree builder.
    Truncated,
}

impl NodeKind {
    /// Short name used in messages.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Leaf => "leaf",
            NodeKind::Array { .. } => "array",
            NodeKind::Collection { .. } => "collection",
            NodeKind::Map { .. } => "map",
            NodeKind::Record { .. } => "record",
            NodeKind::Container { .. } => "container",
            NodeKind::PlainObject { .. } => "object",
            NodeKind::Ignored => "ignored",
            NodeKind::Truncated => "truncated",
        }
    }
}

/// A position in the object graph.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    target: TypeRef,
    slot: Option<Slot>,
    kind: NodeKind,
}

impl Node {
    /// Create a node with a fresh id.
    pub fn new(target: TypeRef, kind: NodeKind) -> Self {
        Node {
            id: NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed)),
            target,
            slot: None,
            kind,
        }
    }

    /// A node without children.
    pub fn leaf(target: TypeRef) -> Self {
        Self::new(target, NodeKind::Leaf)
    }

    /// An array of `element`.
    pub fn array(target: TypeRef, element: Node) -> Self {
        Self::new(
            target,
            NodeKind::Array {
                element: Box::new(element),
            },
        )
    }

    /// A collection of `element`.
    pub fn collection(target: TypeRef, element: Node) -> Self {
        Self::new(
            target,
            NodeKind::Collection {
                element: Box::new(element),
            },
        )
    }

    /// A map from `key` to `value`.
    pub fn map(target: TypeRef, key: Node, value: Node) -> Self {
        Self::new(
            target,
            NodeKind::Map {
                key: Box::new(key),
                value: Box::new(value),
            },
        )
    }

    /// A record built by `constructor` from `params`.
    pub fn record(target: TypeRef, constructor: Constructor, params: Vec<Node>) -> Self {
        Self::new(
            target,
            NodeKind::Record {
                constructor,
                params,
            },
        )
    }

    /// A container built through the create/add/build protocol.
    pub fn container(target: TypeRef, children: Vec<Node>) -> Self {
        Self::new(target, NodeKind::Container { children })
    }

    /// A plain object whose `fields` are assigned after creation.
    pub fn object(target: TypeRef, fields: Vec<Node>) -> Self {
        Self::new(target, NodeKind::PlainObject { fields })
    }

    /// A node excluded from generation.
    pub fn ignored(target: TypeRef) -> Self {
        Self::new(target, NodeKind::Ignored)
    }

    /// A cut cyclic branch; always resolves to null.
    pub fn truncated(target: TypeRef) -> Self {
        Self::new(target, NodeKind::Truncated)
    }

    /// Bind this node to the named field of its parent.
    pub fn in_slot(mut self, name: impl Into<String>) -> Self {
        self.slot = Some(Slot::new(name));
        self
    }

    /// Attach an accessor used by method assignment.
    pub fn with_setter<F>(mut self, setter: F) -> Self
    where
        F: Fn(&mut Object, Value) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        let slot = self.slot.get_or_insert_with(|| Slot::new(""));
        slot.setter = Some(Arc::new(setter));
        self
    }

    /// Process-unique id.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Type the node is populated with.
    pub fn target(&self) -> &TypeRef {
        &self.target
    }

    /// The field this node fills, if any.
    pub fn slot(&self) -> Option<&Slot> {
        self.slot.as_ref()
    }

    /// Shape of the node.
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Whether the node is excluded from generation.
    pub fn is_ignored(&self) -> bool {
        matches!(self.kind, NodeKind::Ignored)
    }

    /// Children in population order.
    pub fn children(&self) -> Vec<&Node> {
        match &self.kind {
            NodeKind::Array { element } | NodeKind::Collection { element } => vec![&**element],
            NodeKind::Map { key, value } => vec![&**key, &**value],
            NodeKind::Record { params, .. } => params.iter().collect(),
            NodeKind::Container { children } => children.iter().collect(),
            NodeKind::PlainObject { fields } => fields.iter().collect(),
            NodeKind::Leaf | NodeKind::Ignored | NodeKind::Truncated => Vec::new(),
        }
    }

    /// Whether the node has at least one child.
    pub fn has_children(&self) -> bool {
        match &self.kind {
            NodeKind::Array { .. } | NodeKind::Collection { .. } | NodeKind::Map { .. } => true,
            NodeKind::Record { params, .. } => !params.is_empty(),
            NodeKind::Container { children } => !children.is_empty(),
            NodeKind::PlainObject { fields } => !fields.is_empty(),
            NodeKind::Leaf | NodeKind::Ignored | NodeKind::Truncated => false,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node[{} {}", self.kind.name(), self.target)?;
        if let Some(slot) = &self.slot {
            write!(f, ", field '{}'", slot.name)?;
        }
        write!(f, "]")
    }
}
