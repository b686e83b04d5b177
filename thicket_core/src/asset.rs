use crate::action::Action;
use crate::error::StructuralError;
use crate::node::{NodeDef, NodeKind};
use crate::store::VariableStore;
use crate::variable::{Value, VariableDecl, VariableType, VariableValue};
use crate::{AssetId, NodeId};

/// Immutable tree definition, shared by every instance that runs it.
///
/// Only a [`TreeBuilder`] makes these, so an asset is always structurally
/// valid: one root with one child, decorators with at most one child,
/// leaves without children, every node with at most one parent and no
/// cycles.
#[derive(Debug)]
pub struct TreeAsset {
    id: AssetId,
    name: String,
    nodes: Vec<NodeDef>,
    root: NodeId,
    variables: Vec<VariableDecl>,
}

impl TreeAsset {
    pub fn id(&self) -> AssetId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn nodes(&self) -> &[NodeDef] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeDef> {
        self.nodes.get(id.0)
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// First node with this name.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.name == name).map(NodeId)
    }

    /// The declared local variables, in order.
    pub fn variables(&self) -> &[VariableDecl] {
        &self.variables
    }

    pub(crate) fn def(&self, id: NodeId) -> &NodeDef {
        &self.nodes[id.0]
    }
}

/// Assembles and validates a [`TreeAsset`].
#[derive(Debug)]
pub struct TreeBuilder {
    id: AssetId,
    name: String,
    nodes: Vec<NodeDef>,
    root: Option<NodeId>,
    variables: VariableStore,
}

impl TreeBuilder {
    pub fn new(name: &str) -> Self {
        TreeBuilder {
            id: AssetId::new(),
            name: name.to_owned(),
            nodes: vec![],
            root: None,
            variables: VariableStore::new(),
        }
    }

    /// Keep a known asset id, used when loading a stored tree.
    pub fn with_id(mut self, id: AssetId) -> Self {
        self.id = id;
        self
    }

    pub fn add_node(&mut self, name: &str, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeDef {
            name: name.to_owned(),
            kind,
            children: vec![],
            mute: false,
        });
        id
    }

    /// Add a root node and make it the entry point.
    pub fn add_root(&mut self, name: &str) -> NodeId {
        let id = self.add_node(name, NodeKind::Root);
        self.root = Some(id);
        id
    }

    pub fn add_action<A: Action + 'static>(&mut self, name: &str, action: A) -> NodeId {
        self.add_node(name, NodeKind::Action(Box::new(action)))
    }

    fn check(&self, id: NodeId) -> Result<(), StructuralError> {
        if id.0 < self.nodes.len() {
            Ok(())
        } else {
            Err(StructuralError::UnknownNode(id))
        }
    }

    /// Append `child` to the children of `parent`.
    pub fn add_relation(&mut self, parent: NodeId, child: NodeId) -> Result<(), StructuralError> {
        self.check(parent)?;
        self.check(child)?;
        self.nodes[parent.0].children.push(child);
        Ok(())
    }

    pub fn set_children(
        &mut self,
        parent: NodeId,
        children: &[NodeId],
    ) -> Result<(), StructuralError> {
        self.check(parent)?;
        for c in children {
            self.check(*c)?;
        }
        self.nodes[parent.0].children = children.to_vec();
        Ok(())
    }

    pub fn set_root(&mut self, id: NodeId) -> Result<(), StructuralError> {
        self.check(id)?;
        self.root = Some(id);
        Ok(())
    }

    pub fn set_mute(&mut self, id: NodeId, mute: bool) -> Result<(), StructuralError> {
        self.check(id)?;
        self.nodes[id.0].mute = mute;
        Ok(())
    }

    /// Declare a local variable, every instance starts with `default`.
    pub fn declare(
        &mut self,
        name: &str,
        variable_type: VariableType,
        default: Value,
    ) -> Result<(), StructuralError> {
        self.variables.declare(name, variable_type, default)?;
        Ok(())
    }

    pub fn declare_as<T: VariableValue>(
        &mut self,
        name: &str,
        default: T,
    ) -> Result<(), StructuralError> {
        self.variables.declare_as(name, default)?;
        Ok(())
    }

    pub fn build(self) -> Result<TreeAsset, StructuralError> {
        let root = self.root.ok_or(StructuralError::MissingRoot)?;
        if !matches!(self.nodes[root.0].kind, NodeKind::Root) {
            return Err(StructuralError::NotARoot(root));
        }

        let mut parents: Vec<Option<NodeId>> = vec![None; self.nodes.len()];
        for (index, node) in self.nodes.iter().enumerate() {
            let id = NodeId(index);
            let count = node.children.len();
            match &node.kind {
                NodeKind::Root if count != 1 => return Err(StructuralError::RootArity(id, count)),
                NodeKind::Decorator(_) if count > 1 => {
                    return Err(StructuralError::DecoratorArity(id, count))
                }
                kind if kind.is_leaf() && count > 0 => {
                    return Err(StructuralError::LeafHasChildren(id))
                }
                _ => {}
            }
            for child in node.children.iter() {
                if matches!(self.nodes[child.0].kind, NodeKind::Root) {
                    return Err(StructuralError::RootAsChild(*child));
                }
                if parents[child.0].replace(id).is_some() {
                    return Err(StructuralError::SharedChild(*child));
                }
            }
        }

        // With a single parent per node a cycle shows up as a parent chain
        // longer than the number of nodes.
        for start in 0..self.nodes.len() {
            let mut current = NodeId(start);
            let mut steps = 0;
            while let Some(parent) = parents[current.0] {
                steps += 1;
                if steps > self.nodes.len() {
                    return Err(StructuralError::Cycle(NodeId(start)));
                }
                current = parent;
            }
        }

        let detached = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != root.0 && parents[*i].is_none())
            .count();
        if detached > 0 {
            tracing::debug!(tree = %self.name, detached, "nodes not reachable from the root");
        }

        Ok(TreeAsset {
            id: self.id,
            name: self.name,
            nodes: self.nodes,
            root,
            variables: self.variables.to_decls(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::DecoratorPolicy;
    use crate::testing::Scripted;
    use crate::NodeStatus;

    #[test]
    fn builds_valid_tree() -> Result<(), StructuralError> {
        let mut b = TreeBuilder::new("valid");
        let root = b.add_root("root");
        let seq = b.add_node("seq", NodeKind::Sequence);
        let a = b.add_action("a", Scripted::always(NodeStatus::Success));
        b.add_relation(root, seq)?;
        b.add_relation(seq, a)?;
        b.declare_as("speed", 1.0f32)?;
        let asset = b.build()?;
        assert_eq!(asset.root(), root);
        assert_eq!(asset.find("a"), Some(a));
        assert_eq!(asset.node(seq).map(|n| n.children().to_vec()), Some(vec![a]));
        assert_eq!(asset.variables().len(), 1);
        Ok(())
    }

    #[test]
    fn structural_errors() -> Result<(), StructuralError> {
        let b = TreeBuilder::new("no root");
        assert_eq!(b.build().err(), Some(StructuralError::MissingRoot));

        let mut b = TreeBuilder::new("empty root");
        let root = b.add_root("root");
        assert_eq!(b.build().err(), Some(StructuralError::RootArity(root, 0)));

        let mut b = TreeBuilder::new("wide decorator");
        let root = b.add_root("root");
        let d = b.add_node("d", NodeKind::Decorator(DecoratorPolicy::Invert));
        let x = b.add_action("x", Scripted::always(NodeStatus::Success));
        let y = b.add_action("y", Scripted::always(NodeStatus::Success));
        b.add_relation(root, d)?;
        b.set_children(d, &[x, y])?;
        assert_eq!(b.build().err(), Some(StructuralError::DecoratorArity(d, 2)));

        let mut b = TreeBuilder::new("leaf with child");
        let root = b.add_root("root");
        let x = b.add_action("x", Scripted::always(NodeStatus::Success));
        let y = b.add_action("y", Scripted::always(NodeStatus::Success));
        b.add_relation(root, x)?;
        b.add_relation(x, y)?;
        assert_eq!(b.build().err(), Some(StructuralError::LeafHasChildren(x)));

        let mut b = TreeBuilder::new("shared");
        let root = b.add_root("root");
        let s = b.add_node("s", NodeKind::Sequence);
        let x = b.add_action("x", Scripted::always(NodeStatus::Success));
        b.add_relation(root, s)?;
        b.set_children(s, &[x, x])?;
        assert_eq!(b.build().err(), Some(StructuralError::SharedChild(x)));

        let mut b = TreeBuilder::new("cycle");
        let root = b.add_root("root");
        let leaf = b.add_action("leaf", Scripted::always(NodeStatus::Success));
        let s1 = b.add_node("s1", NodeKind::Sequence);
        let s2 = b.add_node("s2", NodeKind::Sequence);
        b.add_relation(root, leaf)?;
        b.add_relation(s1, s2)?;
        b.add_relation(s2, s1)?;
        assert!(matches!(b.build(), Err(StructuralError::Cycle(_))));

        let mut b = TreeBuilder::new("root as child");
        let root = b.add_root("root");
        let s = b.add_node("s", NodeKind::Sequence);
        b.add_relation(root, s)?;
        b.add_relation(s, root)?;
        assert_eq!(b.build().err(), Some(StructuralError::RootAsChild(root)));

        let mut b = TreeBuilder::new("not a root");
        let s = b.add_node("s", NodeKind::Sequence);
        b.set_root(s)?;
        assert_eq!(b.build().err(), Some(StructuralError::NotARoot(s)));

        let mut b = TreeBuilder::new("unknown");
        let root = b.add_root("root");
        assert_eq!(
            b.add_relation(root, NodeId(7)),
            Err(StructuralError::UnknownNode(NodeId(7)))
        );
        b.declare_as("x", 1i32)?;
        assert!(matches!(
            b.declare_as("x", 2i32),
            Err(StructuralError::Variable(_))
        ));
        Ok(())
    }

    #[test]
    fn empty_decorator_is_allowed() -> Result<(), StructuralError> {
        let mut b = TreeBuilder::new("bare decorator");
        let root = b.add_root("root");
        let d = b.add_node("d", NodeKind::Decorator(DecoratorPolicy::Invert));
        b.add_relation(root, d)?;
        assert!(b.build().is_ok());
        Ok(())
    }
}
