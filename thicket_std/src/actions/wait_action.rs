use serde::{Deserialize, Serialize};
use thicket_core::node_prelude::*;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaitActionConfig {
    /// Seconds to wait after entry.
    pub duration: f64,
}
impl IsActionConfig for WaitActionConfig {}

impl Default for WaitActionConfig {
    fn default() -> Self {
        WaitActionConfig { duration: 1.0 }
    }
}

/// Reports [`NodeStatus::Running`] until `duration` seconds passed since
/// entry, then [`NodeStatus::Success`].
///
/// Time is read from the clock of the instance, the action never sleeps.
#[derive(Debug, Default, Clone)]
pub struct WaitAction {
    entered_at: f64,
    pub config: WaitActionConfig,
}

impl WaitAction {
    pub fn new(duration: f64) -> Self {
        WaitAction {
            config: WaitActionConfig { duration },
            ..Default::default()
        }
    }
}

impl Action for WaitAction {
    fn on_entry(&mut self, ctx: &mut ActionContext) -> Result<(), ActionError> {
        self.entered_at = ctx.now();
        Ok(())
    }

    fn on_update(&mut self, ctx: &mut ActionContext) -> Result<NodeStatus, ActionError> {
        if ctx.now() - self.entered_at >= self.config.duration {
            Ok(NodeStatus::Success)
        } else {
            Ok(NodeStatus::Running)
        }
    }

    fn get_config(&self) -> Option<Box<dyn ActionConfig>> {
        Some(Box::new(self.config.clone()))
    }

    fn set_config(&mut self, config: &dyn ActionConfig) -> Result<(), ActionError> {
        self.config.load_action_config(config)
    }

    fn static_type() -> ActionType {
        "wait".into()
    }

    fn action_type(&self) -> ActionType {
        Self::static_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{no_variables, Harness};
    use thicket_core::StructuralError;
    use NodeStatus::{Running, Success};

    #[test]
    fn waits_for_duration() -> Result<(), StructuralError> {
        let mut h = Harness::new(WaitAction::new(2.0), no_variables)?;
        assert_eq!(h.tick_at(0.0), Running);
        let seen: Vec<_> = [0.5, 1.0, 1.5, 2.0].iter().map(|t| h.tick_at(*t)).collect();
        assert_eq!(seen, vec![Running, Running, Running, Success]);

        // Entry again restarts the timer.
        assert_eq!(h.tick_at(10.0), Running);
        assert_eq!(h.tick_at(11.9), Running);
        assert_eq!(h.tick_at(12.0), Success);
        Ok(())
    }

    #[test]
    fn parallel_of_waits_succeeds_once_both_elapsed() -> Result<(), StructuralError> {
        use std::sync::Arc;
        use thicket_core::prelude::*;

        let mut b = TreeBuilder::new("waits");
        let root = b.add_root("root");
        let both = b.add_node("both", NodeKind::Parallel(ParallelPolicy::require_all()));
        let short = b.add_action("short", WaitAction::new(1.0));
        let long = b.add_action("long", WaitAction::new(2.0));
        b.add_relation(root, both)?;
        b.set_children(both, &[short, long])?;

        let clock = Arc::new(ManualClock::new(0.0));
        let env = Environment::new(
            Arc::new(Agent::new("waiter")),
            GlobalStore::default(),
            clock.clone(),
        );
        let mut instance = TreeInstance::new(Arc::new(b.build()?), env)?;
        let mut seen = vec![];
        for step in 0..=10 {
            clock.set(step as f64 * 0.25);
            seen.push(instance.tick());
        }
        assert_eq!(seen[..8], [Running; 8]);
        assert_eq!(seen[8], Success);
        assert_eq!(instance.node_state(short), Some(NodeState::Success));

        // A new activation starts both timers again.
        assert_eq!(seen[9], Running);
        Ok(())
    }

    #[test]
    fn config_replaces_duration() -> Result<(), ActionError> {
        let mut wait = WaitAction::default();
        wait.set_config(&WaitActionConfig { duration: 3.5 })?;
        assert_eq!(wait.config.duration, 3.5);
        Ok(())
    }
}
