//! Registry of action types and the JSON format for tree assets.

use crate::type_support::{
    ActionFactory, ConfigConverter, DefaultActionFactory, DefaultActionFactoryRequirements,
    DefaultConfigConverter, DefaultConfigRequirements,
};
use crate::ThicketError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thicket_core::action::{Action, ActionConfig, ActionType};
use thicket_core::asset::{TreeAsset, TreeBuilder};
use thicket_core::node::NodeKind;
use thicket_core::{AssetId, NodeId};
use uuid::Uuid;

type SerializableHolder = serde_json::Value;

/// An action config in serialized form, tagged with its action type.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SerializedConfig {
    pub action_type: ActionType,
    pub data: SerializableHolder,
}

pub mod v1 {
    use super::SerializableHolder;
    use serde::{Deserialize, Serialize};
    use thicket_core::action::ActionType;
    use thicket_core::node::{DecoratorPolicy, ParallelPolicy};
    use thicket_core::variable::VariableDecl;
    use thicket_core::AssetId;
    use uuid::Uuid;

    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
    #[serde(tag = "type", rename_all = "snake_case")]
    pub enum Kind {
        Root,
        Sequence,
        Selector,
        Parallel {
            policy: ParallelPolicy,
        },
        Decorator {
            policy: DecoratorPolicy,
        },
        Action {
            action_type: ActionType,
            #[serde(default)]
            config: Option<SerializableHolder>,
        },
        Subtree {
            tree: AssetId,
        },
    }

    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
    pub struct TreeNode {
        pub id: Uuid,
        pub name: String,
        pub kind: Kind,
        #[serde(default)]
        pub mute: bool,
        #[serde(default)]
        pub children: Vec<Uuid>,
    }

    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
    pub struct Tree {
        pub id: AssetId,
        pub name: String,
        #[serde(default)]
        pub variables: Vec<VariableDecl>,
        pub nodes: Vec<TreeNode>,
        pub root: Uuid,
    }

    /// A tree plus every tree it embeds, dependencies before dependents.
    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
    pub struct Root {
        pub tree: Tree,
        #[serde(default)]
        pub subtrees: Vec<Tree>,
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum TreeConfig {
    V1(v1::Root),
}

#[derive(Debug)]
struct ActionTypeSupport {
    factory: Box<dyn ActionFactory>,
    config_converter: Option<Box<dyn ConfigConverter>>,
}

/// Knows how to create and (de)serialize every registered action type.
#[derive(Debug, Default)]
pub struct TreeSupport {
    action_support: HashMap<ActionType, ActionTypeSupport>,
}

/// Stable id of a node in the serialized form, derived from the asset id.
fn node_uuid(asset: AssetId, id: NodeId) -> Uuid {
    let (high, _) = asset.0.as_u64_pair();
    Uuid::from_u64_pair(high, id.0 as u64)
}

impl TreeSupport {
    pub fn new() -> Self {
        TreeSupport::default()
    }

    /// Registered action types, sorted.
    pub fn action_types(&self) -> Vec<ActionType> {
        let mut types: Vec<ActionType> = self.action_support.keys().cloned().collect();
        types.sort();
        types
    }

    fn get_action_support(&self, action_type: &ActionType) -> Result<&ActionTypeSupport, ThicketError> {
        self.action_support
            .get(action_type)
            .ok_or_else(|| ThicketError::UnknownActionType(action_type.clone()))
    }

    fn get_config_converter(
        &self,
        action_type: &ActionType,
    ) -> Result<&dyn ConfigConverter, ThicketError> {
        self.get_action_support(action_type)?
            .config_converter
            .as_deref()
            .ok_or_else(|| ThicketError::MissingConfigConverter(action_type.clone()))
    }

    pub fn create_action(&self, action_type: &ActionType) -> Result<Box<dyn Action>, ThicketError> {
        Ok(self.get_action_support(action_type)?.factory.create())
    }

    pub fn add_action_factory(&mut self, action_type: ActionType, factory: Box<dyn ActionFactory>) {
        let previous = self.action_support.remove(&action_type);
        self.action_support.insert(
            action_type,
            ActionTypeSupport {
                factory,
                config_converter: previous.and_then(|p| p.config_converter),
            },
        );
    }

    pub fn add_config_converter(
        &mut self,
        action_type: &ActionType,
        config_converter: Box<dyn ConfigConverter>,
    ) -> Result<(), ThicketError> {
        let support = self
            .action_support
            .get_mut(action_type)
            .ok_or_else(|| ThicketError::UnknownActionType(action_type.clone()))?;
        support.config_converter = Some(config_converter);
        Ok(())
    }

    pub fn add_action_default<A: DefaultActionFactoryRequirements>(&mut self) {
        self.add_action_factory(A::static_type(), Box::new(DefaultActionFactory::<A>::new()))
    }

    pub fn add_action_default_with_config<
        A: DefaultActionFactoryRequirements,
        C: DefaultConfigRequirements,
    >(
        &mut self,
    ) {
        self.action_support.insert(
            A::static_type(),
            ActionTypeSupport {
                factory: Box::new(DefaultActionFactory::<A>::new()),
                config_converter: Some(Box::new(DefaultConfigConverter::<C>::new())),
            },
        );
    }

    pub fn config_serialize(
        &self,
        action_type: ActionType,
        config: &dyn ActionConfig,
    ) -> Result<SerializedConfig, ThicketError> {
        let converter = self.get_config_converter(&action_type)?;
        let serialize_erased = converter.config_serialize(config)?;
        Ok(SerializedConfig {
            action_type,
            data: serde_json::to_value(serialize_erased)?,
        })
    }

    pub fn config_deserialize(
        &self,
        config: SerializedConfig,
    ) -> Result<Box<dyn ActionConfig>, ThicketError> {
        let converter = self.get_config_converter(&config.action_type)?;
        let mut erased = <dyn erased_serde::Deserializer>::erase(config.data);
        converter.config_deserialize(&mut erased)
    }

    fn export_tree(&self, asset: &TreeAsset) -> Result<v1::Tree, ThicketError> {
        let mut nodes = vec![];
        for id in asset.ids() {
            let def = asset.node(id).ok_or(ThicketError::UnknownNode(node_uuid(asset.id(), id)))?;
            let kind = match def.kind() {
                NodeKind::Root => v1::Kind::Root,
                NodeKind::Sequence => v1::Kind::Sequence,
                NodeKind::Selector => v1::Kind::Selector,
                NodeKind::Parallel(policy) => v1::Kind::Parallel { policy: *policy },
                NodeKind::Decorator(policy) => v1::Kind::Decorator {
                    policy: policy.clone(),
                },
                NodeKind::Action(action) => {
                    let action_type = action.action_type();
                    let config = match action.get_config() {
                        Some(config) => {
                            let converter = self.get_config_converter(&action_type)?;
                            Some(serde_json::to_value(converter.config_serialize(&*config)?)?)
                        }
                        None => None,
                    };
                    v1::Kind::Action {
                        action_type,
                        config,
                    }
                }
                NodeKind::Subtree(sub) => v1::Kind::Subtree { tree: sub.id() },
            };
            nodes.push(v1::TreeNode {
                id: node_uuid(asset.id(), id),
                name: def.name().to_owned(),
                kind,
                mute: def.mute(),
                children: def
                    .children()
                    .iter()
                    .map(|c| node_uuid(asset.id(), *c))
                    .collect(),
            });
        }
        Ok(v1::Tree {
            id: asset.id(),
            name: asset.name().to_owned(),
            variables: asset.variables().to_vec(),
            nodes,
            root: node_uuid(asset.id(), asset.root()),
        })
    }

    /// Add the subtrees of `asset` to `out`, embedded trees first.
    fn export_subtrees(
        &self,
        asset: &TreeAsset,
        seen: &mut HashSet<AssetId>,
        out: &mut Vec<v1::Tree>,
    ) -> Result<(), ThicketError> {
        for def in asset.nodes() {
            if let NodeKind::Subtree(sub) = def.kind() {
                if seen.insert(sub.id()) {
                    self.export_subtrees(sub, seen, out)?;
                    out.push(self.export_tree(sub)?);
                }
            }
        }
        Ok(())
    }

    pub fn export_tree_config(&self, asset: &TreeAsset) -> Result<TreeConfig, ThicketError> {
        let mut subtrees = vec![];
        let mut seen = HashSet::new();
        seen.insert(asset.id());
        self.export_subtrees(asset, &mut seen, &mut subtrees)?;
        Ok(TreeConfig::V1(v1::Root {
            tree: self.export_tree(asset)?,
            subtrees,
        }))
    }

    fn import_tree(
        &self,
        tree: &v1::Tree,
        subtrees: &HashMap<AssetId, Arc<TreeAsset>>,
    ) -> Result<TreeAsset, ThicketError> {
        let mut builder = TreeBuilder::new(&tree.name).with_id(tree.id);
        let mut ids: HashMap<Uuid, NodeId> = HashMap::new();

        for node in tree.nodes.iter() {
            let kind = match &node.kind {
                v1::Kind::Root => NodeKind::Root,
                v1::Kind::Sequence => NodeKind::Sequence,
                v1::Kind::Selector => NodeKind::Selector,
                v1::Kind::Parallel { policy } => NodeKind::Parallel(*policy),
                v1::Kind::Decorator { policy } => NodeKind::Decorator(policy.clone()),
                v1::Kind::Action {
                    action_type,
                    config,
                } => {
                    let mut action = self.create_action(action_type)?;
                    if let Some(config) = config {
                        let converter = self.get_config_converter(action_type)?;
                        let mut erased = <dyn erased_serde::Deserializer>::erase(config);
                        let config = converter.config_deserialize(&mut erased)?;
                        action.set_config(&*config)?;
                    }
                    NodeKind::Action(action)
                }
                v1::Kind::Subtree { tree } => NodeKind::Subtree(
                    subtrees
                        .get(tree)
                        .cloned()
                        .ok_or(ThicketError::MissingSubtree(*tree))?,
                ),
            };
            let id = builder.add_node(&node.name, kind);
            builder.set_mute(id, node.mute)?;
            if ids.insert(node.id, id).is_some() {
                return Err(ThicketError::DuplicateNode(node.id));
            }
        }

        let lookup = |uuid: &Uuid| ids.get(uuid).copied().ok_or(ThicketError::UnknownNode(*uuid));
        for node in tree.nodes.iter() {
            let parent = lookup(&node.id)?;
            let children = node
                .children
                .iter()
                .map(lookup)
                .collect::<Result<Vec<NodeId>, ThicketError>>()?;
            builder.set_children(parent, &children)?;
        }
        builder.set_root(lookup(&tree.root)?)?;

        for decl in tree.variables.iter() {
            builder.declare(&decl.name, decl.variable_type.clone(), decl.default.clone())?;
        }
        Ok(builder.build()?)
    }

    pub fn import_tree_config(&self, config: &TreeConfig) -> Result<Arc<TreeAsset>, ThicketError> {
        match config {
            TreeConfig::V1(root) => {
                let mut subtrees: HashMap<AssetId, Arc<TreeAsset>> = HashMap::new();
                for tree in root.subtrees.iter() {
                    if subtrees.contains_key(&tree.id) {
                        return Err(ThicketError::DuplicateSubtree(tree.id));
                    }
                    let asset = self.import_tree(tree, &subtrees)?;
                    subtrees.insert(tree.id, Arc::new(asset));
                }
                let asset = Arc::new(self.import_tree(&root.tree, &subtrees)?);
                tracing::debug!(
                    tree = asset.name(),
                    nodes = asset.len(),
                    subtrees = subtrees.len(),
                    "loaded tree"
                );
                Ok(asset)
            }
        }
    }

    pub fn tree_serialize<S: serde::Serializer>(
        &self,
        asset: &TreeAsset,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        use serde::ser::Error;
        let config = self
            .export_tree_config(asset)
            .map_err(|e| S::Error::custom(format!("serialize failed with {e}")))?;
        config.serialize(serializer)
    }

    pub fn tree_deserialize<'de, D: serde::Deserializer<'de>>(
        &self,
        deserializer: D,
    ) -> Result<Arc<TreeAsset>, D::Error> {
        use serde::de::Error;
        let config = TreeConfig::deserialize(deserializer)?;
        self.import_tree_config(&config)
            .map_err(|e| D::Error::custom(format!("failed to load tree: {e}")))
    }

    pub fn load_json(&self, json: &str) -> Result<Arc<TreeAsset>, ThicketError> {
        let config: TreeConfig = serde_json::from_str(json)?;
        self.import_tree_config(&config)
    }

    pub fn to_json(&self, asset: &TreeAsset) -> Result<String, ThicketError> {
        let config = self.export_tree_config(asset)?;
        Ok(serde_json::to_string_pretty(&config)?)
    }
}

/// Serializes a tree asset through a [`TreeSupport`].
pub struct TreeSerializer<'a, 'b> {
    support: &'b TreeSupport,
    asset: &'a TreeAsset,
}

impl<'a, 'b> TreeSerializer<'a, 'b> {
    pub fn new(support: &'b TreeSupport, asset: &'a TreeAsset) -> Self {
        Self { support, asset }
    }
}

impl<'a, 'b> serde::Serialize for TreeSerializer<'a, 'b> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.support.tree_serialize(self.asset, serializer)
    }
}
