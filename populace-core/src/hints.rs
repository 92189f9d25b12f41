//! Hints attached to generated values.
//!
//! A hint tells the engine how a value returned by value generation should
//! be treated: whether its children get populated, how many elements to add
//! to it, which literal values to place in it and so on.

use crate::error::BoxError;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Policy for populating the children of a generated value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AfterGenerate {
    /// Leave the value exactly as generated.
    DoNotModify,
    /// Only populate children targeted by a user generator or selector.
    ApplySelectors,
    /// Populate children that are null.
    PopulateNulls,
    /// Populate children that are null or hold a primitive zero value.
    #[default]
    PopulateNullsAndDefaultPrimitives,
    /// Populate every child, overwriting whatever it holds.
    PopulateAll,
}

/// How to fill a generated array.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArrayHint {
    pub nullable_elements: bool,
    /// Placed into the first unset slots, in order.
    pub with_elements: Vec<Value>,
    pub shuffle: bool,
}

/// How to fill a generated collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionHint {
    pub generate_elements: usize,
    pub nullable_elements: bool,
    pub unique: bool,
    /// Appended verbatim after generation.
    pub with_elements: Vec<Value>,
    pub shuffle: bool,
}

/// How to fill a generated map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapHint {
    pub generate_entries: usize,
    pub nullable_keys: bool,
    pub nullable_values: bool,
    /// Keys consumed in order before any key is generated.
    pub with_keys: Vec<Value>,
    /// Merged in after generation, overwriting generated entries.
    pub with_entries: Vec<(Value, Value)>,
}

pub type CreateFn = Arc<dyn Fn(Vec<Value>) -> Result<Value, BoxError> + Send + Sync>;
pub type AddFn = Arc<dyn Fn(&mut Value, Vec<Value>) -> Result<(), BoxError> + Send + Sync>;
pub type BuildFn = Arc<dyn Fn(Value) -> Result<Value, BoxError> + Send + Sync>;

/// Construction protocol for container types that cannot be mutated in place.
#[derive(Clone, Default)]
pub struct ContainerHint {
    create: Option<CreateFn>,
    add: Option<AddFn>,
    build: Option<BuildFn>,
    generate_entries: usize,
}

impl ContainerHint {
    /// Create a hint without any functions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the container from one generated value per child node, used
    /// when value generation returned null.
    pub fn with_create<F>(mut self, create: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        self.create = Some(Arc::new(create));
        self
    }

    /// Add one entry, given one generated value per child node.
    pub fn with_add<F>(mut self, add: F) -> Self
    where
        F: Fn(&mut Value, Vec<Value>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.add = Some(Arc::new(add));
        self
    }

    /// Turn the accumulated builder into the final value.
    pub fn with_build<F>(mut self, build: F) -> Self
    where
        F: Fn(Value) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        self.build = Some(Arc::new(build));
        self
    }

    /// Set how many times the add function runs.
    pub fn with_generate_entries(mut self, entries: usize) -> Self {
        self.generate_entries = entries;
        self
    }

    /// The function creating the container, if any.
    pub fn create_fn(&self) -> Option<&CreateFn> {
        self.create.as_ref()
    }

    /// The function adding one entry, if any.
    pub fn add_fn(&self) -> Option<&AddFn> {
        self.add.as_ref()
    }

    /// The function finishing the container, if any.
    pub fn build_fn(&self) -> Option<&BuildFn> {
        self.build.as_ref()
    }

    /// Number of entries to add.
    pub fn generate_entries(&self) -> usize {
        self.generate_entries
    }
}

impl fmt::Debug for ContainerHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerHint")
            .field("create", &self.create.is_some())
            .field("add", &self.add.is_some())
            .field("build", &self.build.is_some())
            .field("generate_entries", &self.generate_entries)
            .finish()
    }
}

/// The hints bundle carried by a [`crate::NodeResult`].
#[derive(Debug, Clone, Default)]
pub struct Hints {
    after_generate: Option<AfterGenerate>,
    emit_null: bool,
    array: Option<ArrayHint>,
    collection: Option<CollectionHint>,
    map: Option<MapHint>,
    container: Option<ContainerHint>,
}

impl Hints {
    /// Create hints with nothing set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the run's default action for this value.
    pub fn with_after_generate(mut self, action: AfterGenerate) -> Self {
        self.after_generate = Some(action);
        self
    }

    /// Mark a null value as intentionally emitted rather than missing.
    pub fn with_emit_null(mut self) -> Self {
        self.emit_null = true;
        self
    }

    /// Attach an array hint.
    pub fn with_array(mut self, hint: ArrayHint) -> Self {
        self.array = Some(hint);
        self
    }

    /// Attach a collection hint.
    pub fn with_collection(mut self, hint: CollectionHint) -> Self {
        self.collection = Some(hint);
        self
    }

    /// Attach a map hint.
    pub fn with_map(mut self, hint: MapHint) -> Self {
        self.map = Some(hint);
        self
    }

    /// Attach a container hint.
    pub fn with_container(mut self, hint: ContainerHint) -> Self {
        self.container = Some(hint);
        self
    }

    /// The action for this value, if overridden.
    pub fn after_generate(&self) -> Option<AfterGenerate> {
        self.after_generate
    }

    /// Whether a null value was emitted on purpose.
    pub fn emit_null(&self) -> bool {
        self.emit_null
    }

    /// The array hint, if any.
    pub fn array(&self) -> Option<&ArrayHint> {
        self.array.as_ref()
    }

    /// The collection hint, if any.
    pub fn collection(&self) -> Option<&CollectionHint> {
        self.collection.as_ref()
    }

    /// The map hint, if any.
    pub fn map(&self) -> Option<&MapHint> {
        self.map.as_ref()
    }

    /// The container hint, if any.
    pub fn container(&self) -> Option<&ContainerHint> {
        self.container.as_ref()
    }
}
