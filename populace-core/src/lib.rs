//! Core functionality for populace object-graph generation.
//!
//! This crate provides the building blocks for populating a tree of typed
//! nodes with random values: the node model, hints, filters, assigners and
//! the engine that walks the tree.

pub mod assign;
pub mod container;
pub mod data;
pub mod engine;
pub mod error;
pub mod filter;
pub mod hints;
pub mod listener;
pub mod node;
pub mod result;
pub mod source;
pub mod value;

// Re-export the main types
pub use assign::*;
pub use container::*;
pub use data::*;
pub use engine::*;
pub use error::*;
pub use filter::*;
pub use hints::*;
pub use listener::*;
pub use node::*;
pub use result::*;
pub use source::*;
pub use value::*;
