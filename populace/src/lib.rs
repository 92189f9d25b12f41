//! Populace object-graph generation library.
//!
//! This is the main entry point for populace, providing a convenient API
//! for filling typed node trees with random but valid values.

pub use populace_core::*;
