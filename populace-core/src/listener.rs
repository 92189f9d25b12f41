//! Listeners notified every time a node is resolved.

use crate::node::{Node, NodeId};
use crate::result::NodeResult;
use crate::value::Value;
use std::collections::HashSet;

/// Observes node resolution during a generation run.
pub trait GenerationListener {
    /// Called right after the result for `node` is known.
    fn object_created(&mut self, node: &Node, result: &NodeResult);
}

type NodeMatcher = Box<dyn Fn(&Node) -> bool>;
type Callback = Box<dyn FnMut(&Value)>;

/// Collects values for user callbacks and runs the callbacks once the root
/// object is complete.
#[derive(Default)]
pub struct CallbackHandler {
    callbacks: Vec<(NodeMatcher, Callback)>,
    pending: Vec<(usize, Value)>,
}

impl CallbackHandler {
    /// Create a handler without callbacks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for every non-null value generated for a node
    /// matching `matcher`.
    pub fn on_complete<M, F>(&mut self, matcher: M, callback: F)
    where
        M: Fn(&Node) -> bool + 'static,
        F: FnMut(&Value) + 'static,
    {
        self.callbacks.push((Box::new(matcher), Box::new(callback)));
    }

    /// Whether no callback is registered.
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Run the callbacks in generation order, draining the pending values.
    pub fn invoke_callbacks(&mut self) {
        for (index, value) in std::mem::take(&mut self.pending) {
            if let Some((_, callback)) = self.callbacks.get_mut(index) {
                callback(&value);
            }
        }
    }
}

impl GenerationListener for CallbackHandler {
    fn object_created(&mut self, node: &Node, result: &NodeResult) {
        if result.contains_null() {
            return;
        }
        for (index, (matcher, _)) in self.callbacks.iter().enumerate() {
            if matcher(node) {
                self.pending.push((index, result.value().clone()));
            }
        }
    }
}

/// Remembers nodes that were deliberately resolved to null so that they are
/// not populated again.
#[derive(Debug, Default)]
pub struct NullValueTracker {
    nodes: HashSet<NodeId>,
}

impl NullValueTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `node` was resolved to an intentional null.
    pub fn is_null_value(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }
}

impl GenerationListener for NullValueTracker {
    fn object_created(&mut self, node: &Node, result: &NodeResult) {
        if result.contains_null() && result.has_emit_null_hint() {
            self.nodes.insert(node.id());
        }
    }
}
