use super::Engine;
use crate::error::{EngineError, Result};
use crate::hints::Hints;
use crate::node::{Constructor, Node};
use crate::result::NodeResult;
use tracing::debug;

impl Engine<'_> {
    /// Records are built in one step from their generated arguments.
    pub(super) fn generate_record(
        &mut self,
        node: &Node,
        constructor: &Constructor,
        params: &[Node],
    ) -> Result<NodeResult> {
        if self.source.has_generator(node) {
            return Ok(self.generate_value(node));
        }

        if params.len() != constructor.arity() {
            debug!(
                "Record {} has {} constructor arguments, but got {} nodes",
                node,
                constructor.arity(),
                params.len()
            );
            return Ok(NodeResult::null());
        }

        let mut args = Vec::with_capacity(params.len());
        for (param, ty) in params.iter().zip(constructor.params()) {
            let result = self.create_object(param)?;
            // Absent arguments fall back to the type's zero value
            args.push(if result.contains_null() {
                ty.default_value()
            } else {
                result.into_value()
            });
        }

        match constructor.invoke(args) {
            Ok(value) => {
                let hints = Hints::new().with_after_generate(self.settings.after_generate);
                let result = NodeResult::create(value, hints);
                self.notify(node, &result);
                Ok(result)
            }
            Err(source) => {
                self.conditional_fail(EngineError::Construction {
                    node: node.to_string(),
                    source,
                })?;
                Ok(NodeResult::empty())
            }
        }
    }
}
