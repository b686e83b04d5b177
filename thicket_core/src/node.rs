use crate::action::Action;
use crate::asset::TreeAsset;
use crate::NodeId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How a decorator changes its single child.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DecoratorPolicy {
    /// Swap Success and Failure, Running passes through.
    Invert,
    /// Any terminal status becomes Success.
    ForceSuccess,
    /// Any terminal status becomes Failure.
    ForceFailure,
    /// Run the child until it succeeded `count` times, reporting Running in
    /// between. A failure ends the repetition. Zero repeats forever.
    Repeat { count: u32 },
    /// Run the child again when it fails, up to `attempts` extra times.
    Retry { attempts: u32 },
    /// After the child finished, refuse to start it again for `duration`
    /// seconds, reporting Failure meanwhile.
    Cooldown { duration: f64 },
    /// Interrupt the child if it runs longer than `duration` seconds.
    TimeLimit { duration: f64 },
    /// Only run the child while the bool `variable` is true.
    Conditional { variable: String },
}

/// Number of children a parallel node needs for a decision.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Threshold {
    All,
    One,
    Count(usize),
}

impl Threshold {
    /// The count for `n` children, never more than `n`.
    pub fn resolve(self, n: usize) -> usize {
        match self {
            Threshold::All => n,
            Threshold::One => 1.min(n),
            Threshold::Count(c) => c.min(n),
        }
    }
}

/// Decision rule of a parallel node.
///
/// Succeeds once `success` children succeeded. Fails once `failure`
/// children failed, or, without a failure threshold, as soon as the success
/// threshold can no longer be reached.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallelPolicy {
    pub success: Threshold,
    #[serde(default)]
    pub failure: Option<Threshold>,
}

impl ParallelPolicy {
    pub fn new(success: Threshold, failure: Option<Threshold>) -> Self {
        ParallelPolicy { success, failure }
    }

    pub fn require_all() -> Self {
        ParallelPolicy::new(Threshold::All, None)
    }

    pub fn require_one() -> Self {
        ParallelPolicy::new(Threshold::One, None)
    }

    /// Success and failure counts required for `n` children.
    pub fn limits(&self, n: usize) -> (usize, usize) {
        let success = self.success.resolve(n);
        let failure = match self.failure {
            Some(t) => t.resolve(n).max(1),
            None => n - success + 1,
        };
        (success, failure)
    }
}

impl Default for ParallelPolicy {
    fn default() -> Self {
        ParallelPolicy::require_all()
    }
}

/// The closed set of node kinds.
#[derive(Clone, Debug)]
pub enum NodeKind {
    Root,
    Sequence,
    Selector,
    Parallel(ParallelPolicy),
    Decorator(DecoratorPolicy),
    Action(Box<dyn Action>),
    /// Another asset used as a leaf, every instance gets its own copy.
    Subtree(Arc<TreeAsset>),
}

impl NodeKind {
    /// The most children this kind accepts, `None` for unbounded.
    pub fn max_children(&self) -> Option<usize> {
        match self {
            NodeKind::Root | NodeKind::Decorator(_) => Some(1),
            NodeKind::Action(_) | NodeKind::Subtree(_) => Some(0),
            NodeKind::Sequence | NodeKind::Selector | NodeKind::Parallel(_) => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.max_children() == Some(0)
    }

    /// Short name for logs and snapshots.
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Root => "root",
            NodeKind::Sequence => "sequence",
            NodeKind::Selector => "selector",
            NodeKind::Parallel(_) => "parallel",
            NodeKind::Decorator(_) => "decorator",
            NodeKind::Action(_) => "action",
            NodeKind::Subtree(_) => "subtree",
        }
    }
}

/// A node as stored in an asset.
#[derive(Clone, Debug)]
pub struct NodeDef {
    pub(crate) name: String,
    pub(crate) kind: NodeKind,
    pub(crate) children: Vec<NodeId>,
    pub(crate) mute: bool,
}

impl NodeDef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn mute(&self) -> bool {
        self.mute
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parallel_limits() {
        // Three children, two must succeed, failing two makes that impossible.
        let p = ParallelPolicy::new(Threshold::Count(2), None);
        assert_eq!(p.limits(3), (2, 2));
        assert_eq!(ParallelPolicy::require_all().limits(3), (3, 1));
        assert_eq!(ParallelPolicy::require_one().limits(3), (1, 3));
        assert_eq!(ParallelPolicy::require_all().limits(0), (0, 1));
        let p = ParallelPolicy::new(Threshold::All, Some(Threshold::Count(0)));
        assert_eq!(p.limits(2), (2, 1));
    }
}
