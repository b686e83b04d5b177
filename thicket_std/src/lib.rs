pub mod actions;
pub mod capability;
pub mod sim;

#[cfg(test)]
mod testing;

/// Register the standard actions and their configs.
#[cfg(feature = "thicket_common")]
pub fn add_tree_support(support: &mut thicket_common::TreeSupport) {
    use actions::*;
    support.add_action_default::<SuccessAction>();
    support.add_action_default::<FailureAction>();
    support.add_action_default::<RunningAction>();
    support.add_action_default_with_config::<WaitAction, WaitActionConfig>();
    support.add_action_default_with_config::<LogAction, LogActionConfig>();
    support.add_action_default_with_config::<SetVariableAction, SetVariableActionConfig>();
    support.add_action_default_with_config::<CompareAction, CompareActionConfig>();
    support.add_action_default_with_config::<IncrementAction, IncrementActionConfig>();
    support.add_action_default_with_config::<MoveToAction, MoveToActionConfig>();
    support.add_action_default_with_config::<AttackAction, AttackActionConfig>();
    support.add_action_default_with_config::<FindTargetAction, FindTargetActionConfig>();
    support.add_action_default_with_config::<CanSeeAction, CanSeeActionConfig>();
    support.add_action_default_with_config::<HealthBelowAction, HealthBelowActionConfig>();
}
