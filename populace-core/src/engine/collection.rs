use super::Engine;
use crate::error::{EngineError, Populated, Result};
use crate::hints::{AfterGenerate, CollectionHint};
use crate::node::Node;
use crate::result::NodeResult;
use crate::value::{Collection, Value};
use std::collections::HashSet;
use tracing::debug;

impl Engine<'_> {
    pub(super) fn generate_collection(&mut self, node: &Node, element: &Node) -> Result<NodeResult> {
        let mut result = self.generate_value(node);
        if result.contains_null() {
            return Ok(result);
        }

        let action = self.action(result.hints());
        let hint = result.hints().collection().cloned().unwrap_or_default();
        let filled = match result.value_mut() {
            Value::Collection(collection) => self.fill_collection(node, element, collection, hint, action)?,
            other => {
                debug!("Expected a collection for {}, got {}", node, other);
                false
            }
        };

        if !filled {
            return Ok(result);
        }
        Ok(self.substitute(node, result))
    }

    /// Returns false when the elements are excluded from generation.
    fn fill_collection(
        &mut self,
        node: &Node,
        element: &Node,
        collection: &mut Collection,
        hint: CollectionHint,
        action: AfterGenerate,
    ) -> Result<bool> {
        for item in collection.items_mut() {
            self.populate_existing(element, item, action)?;
        }
        if element.is_ignored() {
            return Ok(false);
        }

        let threshold = self.settings.failed_add_threshold;
        let mut generated: HashSet<Value> = HashSet::new();
        let mut remaining = hint.generate_elements;
        let mut failed = 0;

        while remaining > 0 {
            let element_result = self.create_nullable(element, hint.nullable_elements)?;
            let emit_null = element_result.has_emit_null_hint();
            let value = element_result.into_value();

            let accepted = if !value.is_null() || hint.nullable_elements || emit_null {
                let fresh = !hint.unique || generated.insert(value.clone());
                fresh && collection.add(value)
            } else {
                false
            };

            if accepted {
                remaining -= 1;
            } else {
                failed += 1;
                if failed > threshold {
                    debug!(
                        "Giving up on {} after {} failed attempts, {} of {} elements missing",
                        node, failed, remaining, hint.generate_elements
                    );
                    self.conditional_fail(EngineError::Unsatisfiable {
                        type_name: node.target().name().to_string(),
                        what: Populated::Elements,
                        requested: hint.generate_elements,
                    })?;
                    break;
                }
            }
        }

        for value in hint.with_elements {
            collection.add(value);
        }
        if hint.shuffle {
            self.random.shuffle(collection.items_mut());
        }
        Ok(true)
    }
}
