use crate::variable::VariableType;
use crate::NodeId;
use thiserror::Error;

/// Problems accessing the blackboard, all of them recoverable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VariableError {
    #[error("variable '{0}' not found")]
    NotFound(String),
    #[error("variable '{name}' holds {found}, accessed as {expected}")]
    TypeMismatch {
        name: String,
        expected: VariableType,
        found: VariableType,
    },
    #[error("variable '{0}' is already declared")]
    DuplicateName(String),
    #[error("variable handle '{0}' was never bound")]
    Unbound(String),
}

/// Errors raised by action hooks, they end up as [`crate::NodeStatus::Failure`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error(transparent)]
    Variable(#[from] VariableError),
    #[error("owner '{owner}' does not provide {capability}")]
    MissingCapability {
        owner: String,
        capability: &'static str,
    },
    #[error("invalid config: {0}")]
    Config(String),
    #[error("{0}")]
    Failed(String),
}

/// Arity and shape violations, fatal to building an asset or creating an instance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("tree has no root node")]
    MissingRoot,
    #[error("node {0:?} is used as root but is not a root node")]
    NotARoot(NodeId),
    #[error("root {0:?} must have exactly one child, has {1}")]
    RootArity(NodeId, usize),
    #[error("decorator {0:?} may have at most one child, has {1}")]
    DecoratorArity(NodeId, usize),
    #[error("leaf {0:?} cannot have children")]
    LeafHasChildren(NodeId),
    #[error("node {0:?} has more than one parent")]
    SharedChild(NodeId),
    #[error("node {0:?} is part of a cycle")]
    Cycle(NodeId),
    #[error("root node {0:?} cannot be a child")]
    RootAsChild(NodeId),
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),
    #[error("variable '{name}' is declared locally as {local} but globally as {global}")]
    ScopeConflict {
        name: String,
        local: VariableType,
        global: VariableType,
    },
    #[error(transparent)]
    Variable(#[from] VariableError),
}
