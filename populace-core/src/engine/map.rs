use super::Engine;
use crate::error::{EngineError, Populated, Result};
use crate::hints::{AfterGenerate, MapHint};
use crate::node::Node;
use crate::result::NodeResult;
use crate::value::{MapValue, Value};
use tracing::debug;

impl Engine<'_> {
    pub(super) fn generate_map(&mut self, node: &Node, key: &Node, value: &Node) -> Result<NodeResult> {
        let mut result = self.generate_value(node);
        if result.contains_null() {
            return Ok(result);
        }

        let action = self.action(result.hints());
        let hint = result.hints().map().cloned().unwrap_or_default();
        let filled = match result.value_mut() {
            Value::Map(map) => self.fill_map(node, key, value, map, hint, action)?,
            other => {
                debug!("Expected a map for {}, got {}", node, other);
                false
            }
        };

        if !filled {
            return Ok(result);
        }
        Ok(self.substitute(node, result))
    }

    /// Returns false when keys or values are excluded from generation.
    fn fill_map(
        &mut self,
        node: &Node,
        key_node: &Node,
        value_node: &Node,
        map: &mut MapValue,
        hint: MapHint,
        action: AfterGenerate,
    ) -> Result<bool> {
        for (key, value) in map.entries_mut() {
            self.populate_existing(key_node, key, action)?;
            self.populate_existing(value_node, value, action)?;
        }
        if key_node.is_ignored() || value_node.is_ignored() {
            return Ok(false);
        }

        let threshold = self.settings.failed_add_threshold;
        let mut with_keys = hint.with_keys.into_iter();
        let mut remaining = hint.generate_entries;
        let mut failed = 0;

        while remaining > 0 {
            let value_result = self.create_nullable(value_node, hint.nullable_values)?;
            let emit_null = value_result.has_emit_null_hint();
            let map_value = value_result.into_value();

            // Keys never honor emit-null
            let map_key = match with_keys.next() {
                Some(key) => key,
                None => self.create_nullable(key_node, hint.nullable_keys)?.into_value(),
            };

            let acceptable = (!map_key.is_null() || hint.nullable_keys)
                && (!map_value.is_null() || hint.nullable_values || emit_null);

            if acceptable && !map.contains_key(&map_key) {
                map.insert(map_key, map_value);
                remaining -= 1;
            } else {
                failed += 1;
                if failed > threshold {
                    debug!(
                        "Giving up on {} after {} failed attempts, {} of {} entries missing",
                        node, failed, remaining, hint.generate_entries
                    );
                    self.conditional_fail(EngineError::Unsatisfiable {
                        type_name: node.target().name().to_string(),
                        what: Populated::Entries,
                        requested: hint.generate_entries,
                    })?;
                    break;
                }
            }
        }

        map.extend(hint.with_entries);
        Ok(true)
    }
}
