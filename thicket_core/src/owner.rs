//! The agent a tree runs for, seen only through the capabilities it offers.
//!
//! The tree does not know about movement, weapons or animation. Actions ask
//! the owner for a capability by type, usually an `Arc<dyn Trait>`, and
//! report failure when it is absent.

use std::any::{Any, TypeId};
use std::collections::HashMap;

pub trait Owner: std::fmt::Debug + Send + Sync {
    /// Name used in log messages.
    fn name(&self) -> &str;

    /// Look up a capability by the type id it was registered under.
    fn capability_by_id(&self, id: TypeId) -> Option<&(dyn Any + Send + Sync)>;
}

/// Typed capability lookup for every owner.
pub trait Capabilities {
    fn capability<C: Any + Clone>(&self) -> Option<C>;
}

impl<O: Owner + ?Sized> Capabilities for O {
    fn capability<C: Any + Clone>(&self) -> Option<C> {
        self.capability_by_id(TypeId::of::<C>())?
            .downcast_ref::<C>()
            .cloned()
    }
}

/// Owner backed by a map from type to capability.
#[derive(Default)]
pub struct Agent {
    name: String,
    capabilities: HashMap<TypeId, (&'static str, Box<dyn Any + Send + Sync>)>,
}

impl Agent {
    pub fn new(name: &str) -> Self {
        Agent {
            name: name.to_owned(),
            capabilities: HashMap::new(),
        }
    }

    /// Builder style [`Agent::insert`].
    pub fn with<C: Any + Send + Sync>(mut self, capability: C) -> Self {
        self.insert(capability);
        self
    }

    /// Register a capability, replacing one of the same type.
    pub fn insert<C: Any + Send + Sync>(&mut self, capability: C) {
        self.capabilities.insert(
            TypeId::of::<C>(),
            (std::any::type_name::<C>(), Box::new(capability)),
        );
    }

    pub fn remove<C: Any + Send + Sync>(&mut self) -> bool {
        self.capabilities.remove(&TypeId::of::<C>()).is_some()
    }
}

impl Owner for Agent {
    fn name(&self) -> &str {
        &self.name
    }

    fn capability_by_id(&self, id: TypeId) -> Option<&(dyn Any + Send + Sync)> {
        self.capabilities.get(&id).map(|(_, c)| &**c)
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.capabilities.values().map(|(n, _)| *n).collect();
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("capabilities", &names)
            .finish()
    }
}
