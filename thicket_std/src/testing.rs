//! Single action trees running against a simulated agent.

use crate::sim::SimAgent;
use std::sync::Arc;
use thicket_core::node_prelude::*;
use thicket_core::prelude::*;
use thicket_core::variable::Vec3;
use thicket_core::StructuralError;

pub struct Harness {
    pub instance: TreeInstance,
    pub clock: Arc<ManualClock>,
    pub sim: Arc<SimAgent>,
    pub action: NodeId,
}

impl Harness {
    /// Root with `action` as its only child, `declare` adds local variables.
    pub fn new<A: Action + 'static>(
        action: A,
        declare: impl FnOnce(&mut TreeBuilder) -> Result<(), StructuralError>,
    ) -> Result<Self, StructuralError> {
        let mut b = TreeBuilder::new("harness");
        let root = b.add_root("root");
        let id = b.add_action("action", action);
        b.add_relation(root, id)?;
        declare(&mut b)?;
        let asset = Arc::new(b.build()?);

        let sim = Arc::new(SimAgent::new(Vec3::ZERO));
        let clock = Arc::new(ManualClock::new(0.0));
        let env = Environment::new(
            Arc::new(SimAgent::agent("sim", &sim)),
            GlobalStore::default(),
            clock.clone(),
        );
        Ok(Harness {
            instance: TreeInstance::new(asset, env)?,
            clock,
            sim,
            action: id,
        })
    }

    pub fn tick(&mut self) -> NodeStatus {
        self.instance.tick()
    }

    /// Set the clock to `time` and tick.
    pub fn tick_at(&mut self, time: f64) -> NodeStatus {
        self.clock.set(time);
        self.instance.tick()
    }

    pub fn local<T: VariableValue>(&self, name: &str) -> Result<T, VariableError> {
        self.instance.locals().try_get(name)
    }

    pub fn disabled(&self) -> bool {
        self.instance.is_disabled(self.action)
    }
}

pub fn no_variables(_: &mut TreeBuilder) -> Result<(), StructuralError> {
    Ok(())
}
