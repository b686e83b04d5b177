use thicket_core::node_prelude::*;

/// Action that always returns [`NodeStatus::Success`].
#[derive(Debug, Copy, Clone, Default)]
pub struct SuccessAction;

impl Action for SuccessAction {
    fn on_update(&mut self, _ctx: &mut ActionContext) -> Result<NodeStatus, ActionError> {
        Ok(NodeStatus::Success)
    }

    fn static_type() -> ActionType
    where
        Self: Sized,
    {
        "success".into()
    }

    fn action_type(&self) -> ActionType {
        Self::static_type()
    }
}
