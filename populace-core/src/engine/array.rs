use super::Engine;
use crate::error::Result;
use crate::filter::{ArrayElementFilter, PopulationFilter};
use crate::hints::{AfterGenerate, ArrayHint};
use crate::node::Node;
use crate::result::NodeResult;
use crate::value::Value;
use tracing::debug;

impl Engine<'_> {
    pub(super) fn generate_array(&mut self, node: &Node, element: &Node) -> Result<NodeResult> {
        let mut result = self.generate_value(node);
        if result.contains_null() {
            return Ok(result);
        }

        let action = self.action(result.hints());
        let hint = result.hints().array().cloned().unwrap_or_default();
        match result.value_mut() {
            Value::Array(items) => self.fill_array(element, items, hint, action)?,
            other => debug!("Expected an array for {}, got {}", node, other),
        }
        Ok(result)
    }

    fn fill_array(
        &mut self,
        element: &Node,
        items: &mut [Value],
        hint: ArrayHint,
        action: AfterGenerate,
    ) -> Result<()> {
        let element_type = element.target().clone();
        let mut literals = hint.with_elements.into_iter();
        let mut next_literal = literals.next();
        let mut index = 0;

        // User-supplied elements fill the leading slots that hold no value
        while index < items.len() {
            let Some(literal) = next_literal.take() else {
                break;
            };
            let slot = &mut items[index];
            if !slot.is_null() {
                self.populate_existing(element, slot, action)?;
            }
            if slot.neither_null_nor_primitive_default(&element_type) {
                next_literal = Some(literal);
            } else {
                *slot = literal;
                next_literal = literals.next();
            }
            index += 1;
        }

        let threshold = self.settings.failed_add_threshold;
        let mut failed = 0;
        for slot in items.iter_mut().skip(index) {
            if !slot.is_null() {
                self.populate_existing(element, slot, action)?;
            }
            if ArrayElementFilter::new(&*self.source).should_skip(element, action, slot) {
                continue;
            }

            let mut element_result = self.create_nullable(element, hint.nullable_elements)?;
            while element_result.contains_null()
                && !hint.nullable_elements
                && !element_result.has_emit_null_hint()
                && failed < threshold
            {
                failed += 1;
                element_result = self.create_object(element)?;
            }

            if element_result.is_empty() || element_result.is_ignored() {
                continue;
            }
            let value = element_result.into_value();
            // Primitive slots cannot hold null
            if !(value.is_null() && element_type.is_primitive()) {
                *slot = value;
            }
        }

        if hint.shuffle {
            self.random.shuffle(items);
        }
        Ok(())
    }
}
