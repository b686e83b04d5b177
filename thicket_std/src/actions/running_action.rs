use thicket_core::node_prelude::*;

/// Action that never finishes, it only stops when interrupted.
#[derive(Debug, Copy, Clone, Default)]
pub struct RunningAction;

impl Action for RunningAction {
    fn on_update(&mut self, _ctx: &mut ActionContext) -> Result<NodeStatus, ActionError> {
        Ok(NodeStatus::Running)
    }

    fn static_type() -> ActionType
    where
        Self: Sized,
    {
        "running".into()
    }

    fn action_type(&self) -> ActionType {
        Self::static_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{FailureAction, SuccessAction};
    use crate::testing::{no_variables, Harness};
    use thicket_core::StructuralError;

    #[test]
    fn constant_results() -> Result<(), StructuralError> {
        assert_eq!(Harness::new(SuccessAction, no_variables)?.tick(), NodeStatus::Success);
        assert_eq!(Harness::new(FailureAction, no_variables)?.tick(), NodeStatus::Failure);
        let mut h = Harness::new(RunningAction, no_variables)?;
        assert_eq!(h.tick(), NodeStatus::Running);
        assert_eq!(h.tick(), NodeStatus::Running);
        assert!(h.instance.is_running(h.action));
        h.instance.halt();
        assert!(!h.instance.is_running(h.action));
        Ok(())
    }
}
