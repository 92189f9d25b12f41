//! Writing generated values into their parent objects.

use crate::data::{AssignmentType, OnSetMethodError, OnSetMethodNotFound, Settings};
use crate::error::{EngineError, Result};
use crate::node::{Node, Slot};
use crate::value::{Object, Value};
use tracing::debug;

/// Strategy for assigning a generated child value to its parent.
pub trait Assigner {
    fn assign(&self, node: &Node, target: &mut Value, value: Value) -> Result<()>;
}

/// Select the assigner for a run.
pub fn assigner_for(settings: &Settings) -> Box<dyn Assigner> {
    match settings.assignment_type {
        AssignmentType::Field => Box::new(FieldAssigner),
        AssignmentType::Method => Box::new(MethodAssigner::new(
            settings.on_set_method_not_found,
            settings.on_set_method_error,
        )),
    }
}

/// Writes the field slot directly, bypassing setters.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldAssigner;

impl Assigner for FieldAssigner {
    fn assign(&self, node: &Node, target: &mut Value, value: Value) -> Result<()> {
        let (slot, object) = resolve(node, target)?;
        object.set(slot.name(), value);
        Ok(())
    }
}

/// Writes through the field's setter.
#[derive(Debug, Clone, Copy, Default)]
pub struct MethodAssigner {
    on_not_found: OnSetMethodNotFound,
    on_error: OnSetMethodError,
}

impl MethodAssigner {
    /// Create a setter-based assigner with the given fallback policies.
    pub fn new(on_not_found: OnSetMethodNotFound, on_error: OnSetMethodError) -> Self {
        MethodAssigner {
            on_not_found,
            on_error,
        }
    }
}

impl Assigner for MethodAssigner {
    fn assign(&self, node: &Node, target: &mut Value, value: Value) -> Result<()> {
        let (slot, object) = resolve(node, target)?;

        let Some(setter) = slot.setter() else {
            return match self.on_not_found {
                OnSetMethodNotFound::AssignField => {
                    object.set(slot.name(), value);
                    Ok(())
                }
                OnSetMethodNotFound::Ignore => {
                    debug!("No setter for field '{}', leaving it unset", slot.name());
                    Ok(())
                }
                OnSetMethodNotFound::Fail => Err(EngineError::Assignment {
                    field: slot.name().to_string(),
                    message: "no setter found".to_string(),
                }),
            };
        };

        let fallback = (self.on_error == OnSetMethodError::AssignField).then(|| value.clone());

        match setter(&mut *object, value) {
            Ok(()) => Ok(()),
            Err(error) => match (self.on_error, fallback) {
                (OnSetMethodError::AssignField, Some(value)) => {
                    object.set(slot.name(), value);
                    Ok(())
                }
                (OnSetMethodError::Fail, _) => Err(EngineError::Assignment {
                    field: slot.name().to_string(),
                    message: error.to_string(),
                }),
                _ => {
                    debug!("Setter for field '{}' failed: {}", slot.name(), error);
                    Ok(())
                }
            },
        }
    }
}

fn resolve<'n, 'v>(node: &'n Node, target: &'v mut Value) -> Result<(&'n Slot, &'v mut Object)> {
    let slot = node.slot().ok_or_else(|| EngineError::Assignment {
        field: node.to_string(),
        message: "node is not bound to a field".to_string(),
    })?;
    let object = target
        .as_object_mut()
        .ok_or_else(|| EngineError::Assignment {
            field: slot.name().to_string(),
            message: "parent is not an object".to_string(),
        })?;
    Ok((slot, object))
}
