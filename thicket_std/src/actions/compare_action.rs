use serde::{Deserialize, Serialize};
use thicket_core::node_prelude::*;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    #[default]
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl Comparison {
    fn holds(self, lhs: &Value, rhs: &Value) -> Result<bool, ActionError> {
        match self {
            Comparison::Equal => return Ok(lhs == rhs),
            Comparison::NotEqual => return Ok(lhs != rhs),
            _ => {}
        }
        let ordering = match (lhs, rhs) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ => {
                return Err(ActionError::Config(format!(
                    "cannot order {}",
                    lhs.variable_type()
                )))
            }
        };
        // NaN compares false for everything.
        Ok(ordering.is_some_and(|o| match self {
            Comparison::Equal => o.is_eq(),
            Comparison::NotEqual => o.is_ne(),
            Comparison::Less => o.is_lt(),
            Comparison::LessEqual => o.is_le(),
            Comparison::Greater => o.is_gt(),
            Comparison::GreaterEqual => o.is_ge(),
        }))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompareActionConfig {
    pub variable: String,
    pub comparison: Comparison,
    pub value: Value,
}
impl IsActionConfig for CompareActionConfig {}

impl Default for CompareActionConfig {
    fn default() -> Self {
        CompareActionConfig {
            variable: String::new(),
            comparison: Comparison::Equal,
            value: Value::Bool(true),
        }
    }
}

/// Condition leaf, [`NodeStatus::Success`] when `variable <comparison> value`
/// holds and [`NodeStatus::Failure`] otherwise.
///
/// Ordering comparisons work on int, float and string variables.
#[derive(Debug, Default, Clone)]
pub struct CompareAction {
    lhs: AnyVar,
    pub config: CompareActionConfig,
}

impl CompareAction {
    pub fn new(variable: &str, comparison: Comparison, value: Value) -> Self {
        CompareAction {
            config: CompareActionConfig {
                variable: variable.to_owned(),
                comparison,
                value,
            },
            ..Default::default()
        }
    }
}

impl Action for CompareAction {
    fn on_initialize(&mut self, ctx: &mut ActionContext) -> Result<(), ActionError> {
        self.lhs = super::set_variable_action::bind_for_value(
            ctx,
            &self.config.variable,
            &self.config.value,
        )?;
        Ok(())
    }

    fn on_update(&mut self, ctx: &mut ActionContext) -> Result<NodeStatus, ActionError> {
        let lhs = ctx.get_any(&self.lhs)?;
        if self.config.comparison.holds(&lhs, &self.config.value)? {
            Ok(NodeStatus::Success)
        } else {
            Ok(NodeStatus::Failure)
        }
    }

    fn get_config(&self) -> Option<Box<dyn ActionConfig>> {
        Some(Box::new(self.config.clone()))
    }

    fn set_config(&mut self, config: &dyn ActionConfig) -> Result<(), ActionError> {
        self.config.load_action_config(config)
    }

    fn static_type() -> ActionType {
        "compare".into()
    }

    fn action_type(&self) -> ActionType {
        Self::static_type()
    }
}
