//! Dynamic values produced by the engine and the type descriptors they are
//! checked against.

use std::fmt;
use std::hash::{Hash, Hasher};

/// Primitive types. These cannot hold null and have a zero value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Bool,
    Int,
    Float,
    Char,
}

impl Primitive {
    /// The zero value a slot of this type starts with.
    pub fn default_value(self) -> Value {
        match self {
            Primitive::Bool => Value::Bool(false),
            Primitive::Int => Value::Int(0),
            Primitive::Float => Value::Float(0.0),
            Primitive::Char => Value::Char('\0'),
        }
    }

    /// Type name as written in node targets.
    pub fn name(self) -> &'static str {
        match self {
            Primitive::Bool => "bool",
            Primitive::Int => "int",
            Primitive::Float => "float",
            Primitive::Char => "char",
        }
    }
}

/// Describes the type a node is populated with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef {
    name: String,
    primitive: Option<Primitive>,
}

impl TypeRef {
    /// A reference (nullable) type.
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef {
            name: name.into(),
            primitive: None,
        }
    }

    /// A primitive (non-nullable) type.
    pub fn primitive(primitive: Primitive) -> Self {
        TypeRef {
            name: primitive.name().to_string(),
            primitive: Some(primitive),
        }
    }

    /// Name of the type.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The primitive this type denotes, if any.
    pub fn as_primitive(&self) -> Option<Primitive> {
        self.primitive
    }

    /// Whether the type is primitive and cannot hold null.
    pub fn is_primitive(&self) -> bool {
        self.primitive.is_some()
    }

    /// Zero value for primitives, `Null` for everything else.
    pub fn default_value(&self) -> Value {
        self.primitive
            .map(Primitive::default_value)
            .unwrap_or(Value::Null)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A generated value.
///
/// Floats compare and hash by bit pattern so that every value can be used
/// for uniqueness checks and as a map key.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Char(char),
    Str(String),
    /// Fixed-length array.
    Array(Vec<Value>),
    Collection(Collection),
    Map(MapValue),
    Object(Object),
}

impl Value {
    /// Whether the value is `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// True if the value is what a fresh slot of type `ty` would hold.
    pub fn is_default_for(&self, ty: &TypeRef) -> bool {
        *self == ty.default_value()
    }

    /// True if the value is set: not null, and not a primitive zero value.
    pub fn neither_null_nor_primitive_default(&self, ty: &TypeRef) -> bool {
        match self {
            Value::Null => false,
            value => !(ty.is_primitive() && value.is_default_for(ty)),
        }
    }

    /// The string, if this is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The integer, if this is an `Int`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// The slots, if this is an `Array`.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// The collection, if this is a `Collection`.
    pub fn as_collection(&self) -> Option<&Collection> {
        match self {
            Value::Collection(collection) => Some(collection),
            _ => None,
        }
    }

    /// The map, if this is a `Map`.
    pub fn as_map(&self) -> Option<&MapValue> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// The object, if this is an `Object`.
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Mutable object access, if this is an `Object`.
    pub fn as_object_mut(&mut self) -> Option<&mut Object> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) => 2,
            Value::Float(_) => 3,
            Value::Char(_) => 4,
            Value::Str(_) => 5,
            Value::Array(_) => 6,
            Value::Collection(_) => 7,
            Value::Map(_) => 8,
            Value::Object(_) => 9,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Collection(a), Value::Collection(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Int(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Char(c) => c.hash(state),
            Value::Str(s) => s.hash(state),
            Value::Array(items) => items.hash(state),
            Value::Collection(collection) => collection.hash(state),
            Value::Map(map) => map.hash(state),
            Value::Object(object) => object.hash(state),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<char> for Value {
    fn from(value: char) -> Self {
        Value::Char(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Char(c) => write!(f, "{c:?}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Array(items) => write_seq(f, "[", items.iter(), "]"),
            Value::Collection(collection) => write_seq(f, "[", collection.iter(), "]"),
            Value::Map(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
            Value::Object(object) => {
                write!(f, "{} {{", object.type_name)?;
                for (i, (name, value)) in object.fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, " {name}: {value}")?;
                }
                write!(f, " }}")
            }
        }
    }
}

fn write_seq<'a>(
    f: &mut fmt::Formatter<'_>,
    open: &str,
    items: impl Iterator<Item = &'a Value>,
    close: &str,
) -> fmt::Result {
    write!(f, "{open}")?;
    for (i, item) in items.enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    write!(f, "{close}")
}

/// Whether a collection accepts duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    List,
    /// Rejects values it already contains.
    Set,
}

/// A growable collection of values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Collection {
    kind: CollectionKind,
    items: Vec<Value>,
}

impl Collection {
    /// Create an empty collection of the given kind.
    pub fn new(kind: CollectionKind) -> Self {
        Collection {
            kind,
            items: Vec::new(),
        }
    }

    /// Create an empty list.
    pub fn list() -> Self {
        Self::new(CollectionKind::List)
    }

    /// Create an empty set.
    pub fn set() -> Self {
        Self::new(CollectionKind::Set)
    }

    /// Whether this is a list or a set.
    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    /// Add a value, returning whether the collection accepted it.
    pub fn add(&mut self, value: Value) -> bool {
        if self.kind == CollectionKind::Set && self.items.contains(&value) {
            return false;
        }
        self.items.push(value);
        true
    }

    /// Whether `value` is present.
    pub fn contains(&self, value: &Value) -> bool {
        self.items.contains(value)
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there are no elements.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Elements in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    pub(crate) fn items_mut(&mut self) -> &mut [Value] {
        &mut self.items
    }
}

impl FromIterator<Value> for Collection {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let mut collection = Collection::list();
        for value in iter {
            collection.add(value);
        }
        collection
    }
}

/// An insertion-ordered map of values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MapValue {
    entries: Vec<(Value, Value)>,
}

impl MapValue {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: &Value) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// The value stored for `key`.
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Insert an entry, replacing and returning the previous value for the key.
    pub fn insert(&mut self, key: Value, value: Value) -> Option<Value> {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub(crate) fn entries_mut(&mut self) -> std::slice::IterMut<'_, (Value, Value)> {
        self.entries.iter_mut()
    }
}

impl Extend<(Value, Value)> for MapValue {
    fn extend<I: IntoIterator<Item = (Value, Value)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl FromIterator<(Value, Value)> for MapValue {
    fn from_iter<I: IntoIterator<Item = (Value, Value)>>(iter: I) -> Self {
        let mut map = MapValue::new();
        map.extend(iter);
        map
    }
}

/// A plain object with named fields in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Object {
    type_name: String,
    fields: Vec<(String, Value)>,
}

impl Object {
    /// Create an object without fields.
    pub fn new(type_name: impl Into<String>) -> Self {
        Object {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// Builder form of [`set`](Self::set).
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value.into());
        self
    }

    /// Name of the object's type.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The value of the named field.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Whether the named field exists.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|(n, _)| n == name)
    }

    /// Write the named field, adding it if missing.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Value::Object(object)
    }
}
