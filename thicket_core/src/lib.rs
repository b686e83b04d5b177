/*
    All behaviour tree execution is single threaded, the host decides when
    to call tick on an instance.

    Classical:
        Control flow (internal nodes):
            root, sequence, selector, parallel, decorator
        Execution (leafs):
            action, subtree

    An asset is the immutable description, nodes live in an arena and refer
    to their children by index. An instance duplicates the arena into
    runtime slots, so every agent running the same asset has its own
    cursors, timers and action state.

    Actions bind their variables once when the instance is created, after
    that every read and write goes through a handle that holds the scope and
    index, never the name.

    Errors inside the tick are turned into Failure at the node that raised
    them, only structural problems abort the creation of an instance.
*/

pub mod action;
pub mod as_any;
pub mod asset;
pub mod clock;
pub mod error;
pub mod instance;
pub mod node;
pub mod owner;
pub mod store;
pub mod variable;

#[cfg(test)]
mod testing;

pub use as_any::AsAny;
pub use error::{ActionError, StructuralError, VariableError};

/// Everything needed to build and run trees.
pub mod prelude {
    pub use crate::{
        asset::{TreeAsset, TreeBuilder},
        clock::{Clock, ManualClock, SystemClock},
        instance::{Environment, TreeInstance},
        node::{DecoratorPolicy, NodeKind, ParallelPolicy, Threshold},
        owner::{Agent, Capabilities, Owner},
        store::{GlobalStore, VariableStore},
        NodeId, NodeState, NodeStatus,
    };
}

/// Everything needed to write actions.
pub mod node_prelude {
    pub use crate::{
        action::{Action, ActionConfig, ActionContext, ActionType, IsActionConfig},
        as_any::AsAnyHelper,
        error::{ActionError, VariableError},
        owner::Capabilities,
        store::{AnyVar, Var},
        variable::{Value, VariableType, VariableValue},
        NodeStatus,
    };
}

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The result states returned by a node when it is ticked.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum NodeStatus {
    Running,
    Failure,
    Success,
}

impl NodeStatus {
    /// Success or Failure.
    pub fn is_terminal(self) -> bool {
        self != NodeStatus::Running
    }

    /// Swap Success and Failure, Running is unchanged.
    pub fn invert(self) -> NodeStatus {
        match self {
            NodeStatus::Success => NodeStatus::Failure,
            NodeStatus::Failure => NodeStatus::Success,
            NodeStatus::Running => NodeStatus::Running,
        }
    }
}

/// The last observed state of a node in an instance.
///
/// `Invalid` means the node was not ticked since the instance was created,
/// or it was halted.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeState {
    #[default]
    Invalid,
    Running,
    Success,
    Failure,
}

impl From<NodeStatus> for NodeState {
    fn from(status: NodeStatus) -> Self {
        match status {
            NodeStatus::Running => NodeState::Running,
            NodeStatus::Success => NodeState::Success,
            NodeStatus::Failure => NodeState::Failure,
        }
    }
}

/// Index of a node in the arena of a tree asset.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// Stable identity of a tree asset.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AssetId(pub Uuid);

impl AssetId {
    pub fn new() -> Self {
        AssetId(Uuid::new_v4())
    }
}

impl Default for AssetId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a running instance, used to tell agents apart in the logs.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct InstanceId(pub Uuid);

impl InstanceId {
    pub fn new() -> Self {
        InstanceId(Uuid::new_v4())
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_invert() {
        assert_eq!(NodeStatus::Success.invert(), NodeStatus::Failure);
        assert_eq!(NodeStatus::Failure.invert(), NodeStatus::Success);
        assert_eq!(NodeStatus::Running.invert(), NodeStatus::Running);
        assert!(!NodeStatus::Running.is_terminal());
        assert_eq!(NodeState::from(NodeStatus::Failure), NodeState::Failure);
        assert_eq!(NodeState::default(), NodeState::Invalid);
    }
}
