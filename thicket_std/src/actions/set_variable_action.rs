use serde::{Deserialize, Serialize};
use thicket_core::node_prelude::*;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SetVariableActionConfig {
    /// Name of the variable to write, local or global.
    pub variable: String,
    pub value: Value,
}
impl IsActionConfig for SetVariableActionConfig {}

impl Default for SetVariableActionConfig {
    fn default() -> Self {
        SetVariableActionConfig {
            variable: String::new(),
            value: Value::Bool(false),
        }
    }
}

/// Writes a constant to a variable of any type and succeeds.
///
/// The value must have the type of the variable, this is checked once when
/// the instance is created and the node is disabled otherwise.
#[derive(Debug, Default, Clone)]
pub struct SetVariableAction {
    target: AnyVar,
    pub config: SetVariableActionConfig,
}

impl SetVariableAction {
    pub fn new(variable: &str, value: Value) -> Self {
        SetVariableAction {
            config: SetVariableActionConfig {
                variable: variable.to_owned(),
                value,
            },
            ..Default::default()
        }
    }
}

/// Bind `name` and check that `value` fits in it.
pub(crate) fn bind_for_value(
    ctx: &ActionContext,
    name: &str,
    value: &Value,
) -> Result<AnyVar, ActionError> {
    let var = ctx.bind_any(name)?;
    if let Some(expected) = var.variable_type() {
        if !value.conforms_to(expected) {
            return Err(VariableError::TypeMismatch {
                name: name.to_owned(),
                expected: expected.clone(),
                found: value.variable_type(),
            }
            .into());
        }
    }
    Ok(var)
}

impl Action for SetVariableAction {
    fn on_initialize(&mut self, ctx: &mut ActionContext) -> Result<(), ActionError> {
        self.target = bind_for_value(ctx, &self.config.variable, &self.config.value)?;
        Ok(())
    }

    fn on_update(&mut self, ctx: &mut ActionContext) -> Result<NodeStatus, ActionError> {
        ctx.set_any(&self.target, self.config.value.clone())?;
        Ok(NodeStatus::Success)
    }

    fn get_config(&self) -> Option<Box<dyn ActionConfig>> {
        Some(Box::new(self.config.clone()))
    }

    fn set_config(&mut self, config: &dyn ActionConfig) -> Result<(), ActionError> {
        self.config.load_action_config(config)
    }

    fn static_type() -> ActionType {
        "set_variable".into()
    }

    fn action_type(&self) -> ActionType {
        Self::static_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;
    use thicket_core::variable::Vec3;
    use thicket_core::StructuralError;

    #[test]
    fn writes_value() -> Result<(), Box<dyn std::error::Error>> {
        let target = Value::Vector3(Vec3::new(1.0, 2.0, 3.0));
        let mut h = Harness::new(SetVariableAction::new("goal", target), |b| {
            b.declare_as("goal", Vec3::ZERO)
        })?;
        assert_eq!(h.tick(), NodeStatus::Success);
        assert_eq!(h.local::<Vec3>("goal")?, Vec3::new(1.0, 2.0, 3.0));
        Ok(())
    }

    #[test]
    fn wrong_type_disables() -> Result<(), StructuralError> {
        let mut h = Harness::new(SetVariableAction::new("count", Value::Bool(true)), |b| {
            b.declare_as("count", 0i32)
        })?;
        assert!(h.disabled());
        assert_eq!(h.tick(), NodeStatus::Failure);
        assert_eq!(h.local::<i32>("count"), Ok(0));

        let mut missing = Harness::new(SetVariableAction::new("nope", Value::Int(1)), |b| {
            b.declare_as("count", 0i32)
        })?;
        assert_eq!(missing.tick(), NodeStatus::Failure);
        Ok(())
    }
}
