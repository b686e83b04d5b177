//! The leaf actions, one per file.
//!
//! Actions that need something from the agent fetch it as a capability in
//! `on_initialize`, a missing capability disables the node.

mod success_action;
pub use success_action::SuccessAction;

mod failure_action;
pub use failure_action::FailureAction;

mod running_action;
pub use running_action::RunningAction;

mod wait_action;
pub use wait_action::{WaitAction, WaitActionConfig};

mod log_action;
pub use log_action::{LogAction, LogActionConfig};

mod set_variable_action;
pub use set_variable_action::{SetVariableAction, SetVariableActionConfig};
mod compare_action;
pub use compare_action::{CompareAction, CompareActionConfig, Comparison};
mod increment_action;
pub use increment_action::{IncrementAction, IncrementActionConfig};

mod move_to_action;
pub use move_to_action::{MoveToAction, MoveToActionConfig};
mod attack_action;
pub use attack_action::{AttackAction, AttackActionConfig};

mod find_target_action;
pub use find_target_action::{FindTargetAction, FindTargetActionConfig};
mod can_see_action;
pub use can_see_action::{CanSeeAction, CanSeeActionConfig};
mod health_below_action;
pub use health_below_action::{HealthBelowAction, HealthBelowActionConfig};
