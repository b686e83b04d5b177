use thicket_core::node_prelude::*;

/// Action that always returns [`NodeStatus::Failure`].
#[derive(Debug, Copy, Clone, Default)]
pub struct FailureAction;

impl Action for FailureAction {
    fn on_update(&mut self, _ctx: &mut ActionContext) -> Result<NodeStatus, ActionError> {
        Ok(NodeStatus::Failure)
    }

    fn static_type() -> ActionType
    where
        Self: Sized,
    {
        "failure".into()
    }

    fn action_type(&self) -> ActionType {
        Self::static_type()
    }
}
