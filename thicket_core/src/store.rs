//! Variable stores and the blackboard view the nodes use.
//!
//! There are two stores for every running tree. The local store belongs to
//! the instance and is built fresh from the asset's declarations, the
//! global store is shared by every instance that was handed the same
//! [`GlobalStore`]. Names are resolved local first, then global.

use crate::error::VariableError;
use crate::variable::{Value, Variable, VariableDecl, VariableType, VariableValue};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

/// Ordered collection of uniquely named variables.
///
/// Variables are only ever appended, so the index returned by
/// [`VariableStore::declare`] stays valid for the life of the store.
#[derive(Clone, Debug, Default)]
pub struct VariableStore {
    variables: Vec<Variable>,
    by_name: HashMap<String, usize>,
}

impl VariableStore {
    pub fn new() -> Self {
        VariableStore::default()
    }

    /// Build a store from declarations, in order.
    pub fn from_decls(decls: &[VariableDecl]) -> Result<Self, VariableError> {
        let mut store = VariableStore::new();
        for decl in decls {
            store.declare(&decl.name, decl.variable_type.clone(), decl.default.clone())?;
        }
        Ok(store)
    }

    /// Register a new variable, returns its index.
    pub fn declare(
        &mut self,
        name: &str,
        variable_type: VariableType,
        initial: Value,
    ) -> Result<usize, VariableError> {
        if self.by_name.contains_key(name) {
            return Err(VariableError::DuplicateName(name.to_owned()));
        }
        let variable = Variable::new(name, variable_type, initial)?;
        let index = self.variables.len();
        self.variables.push(variable);
        self.by_name.insert(name.to_owned(), index);
        Ok(index)
    }

    pub fn declare_as<T: VariableValue>(
        &mut self,
        name: &str,
        initial: T,
    ) -> Result<usize, VariableError> {
        self.declare(name, T::variable_type(), initial.into_value())
    }

    pub fn try_get<T: VariableValue>(&self, name: &str) -> Result<T, VariableError> {
        self.variable(name)
            .ok_or_else(|| VariableError::NotFound(name.to_owned()))?
            .get()
    }

    pub fn set<T: VariableValue>(&mut self, name: &str, value: T) -> Result<(), VariableError> {
        self.variable_mut(name)
            .ok_or_else(|| VariableError::NotFound(name.to_owned()))?
            .set(value)
    }

    pub fn get_value(&self, name: &str) -> Result<&Value, VariableError> {
        self.variable(name)
            .map(Variable::value)
            .ok_or_else(|| VariableError::NotFound(name.to_owned()))
    }

    pub fn set_value(&mut self, name: &str, value: Value) -> Result<(), VariableError> {
        self.variable_mut(name)
            .ok_or_else(|| VariableError::NotFound(name.to_owned()))?
            .set_value(value)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.index_of(name).map(|i| &self.variables[i])
    }

    fn variable_mut(&mut self, name: &str) -> Option<&mut Variable> {
        let index = self.index_of(name)?;
        self.variables.get_mut(index)
    }

    pub fn at(&self, index: usize) -> Option<&Variable> {
        self.variables.get(index)
    }

    pub fn at_mut(&mut self, index: usize) -> Option<&mut Variable> {
        self.variables.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.variables.iter()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// The current values as declarations, in declaration order.
    pub fn to_decls(&self) -> Vec<VariableDecl> {
        self.variables
            .iter()
            .map(|v| VariableDecl {
                name: v.name().to_owned(),
                variable_type: v.variable_type().clone(),
                default: v.value().clone(),
            })
            .collect()
    }
}

/// Handle to the process wide store, cloning shares the same store.
///
/// Tests create one per case, there is no implicit singleton.
#[derive(Clone, Default)]
pub struct GlobalStore {
    inner: Arc<RwLock<VariableStore>>,
}

impl GlobalStore {
    pub fn new(store: VariableStore) -> Self {
        GlobalStore {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, VariableStore> {
        self.inner.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, VariableStore> {
        self.inner.write()
    }

    pub fn ptr_eq(&self, other: &GlobalStore) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for GlobalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalStore")
            .field("variables", &self.inner.read().len())
            .finish()
    }
}

/// Which store a bound handle points into.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Scope {
    Local,
    Global,
}

/// Typed handle to a variable, obtained by binding a name once.
///
/// The default handle is unbound and fails every access with
/// [`VariableError::Unbound`].
pub struct Var<T> {
    name: String,
    slot: Option<(Scope, usize)>,
    _z: PhantomData<fn() -> T>,
}

impl<T> Var<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scope(&self) -> Option<Scope> {
        self.slot.map(|(s, _)| s)
    }

    pub fn is_bound(&self) -> bool {
        self.slot.is_some()
    }

    fn slot(&self) -> Result<(Scope, usize), VariableError> {
        self.slot
            .ok_or_else(|| VariableError::Unbound(self.name.clone()))
    }
}

impl<T> Default for Var<T> {
    fn default() -> Self {
        Var {
            name: String::new(),
            slot: None,
            _z: PhantomData,
        }
    }
}

impl<T> Clone for Var<T> {
    fn clone(&self) -> Self {
        Var {
            name: self.name.clone(),
            slot: self.slot,
            _z: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for Var<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Var::<{}>(\"{}\", {:?})",
            std::any::type_name::<T>(),
            self.name,
            self.slot
        )
    }
}

/// Handle to a variable whose type is only known at runtime.
#[derive(Clone, Debug, Default)]
pub struct AnyVar {
    name: String,
    slot: Option<(Scope, usize, VariableType)>,
}

impl AnyVar {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variable_type(&self) -> Option<&VariableType> {
        self.slot.as_ref().map(|(_, _, t)| t)
    }

    pub fn is_bound(&self) -> bool {
        self.slot.is_some()
    }
}

/// The view of both stores a node gets while it runs.
pub struct Blackboard<'a> {
    locals: &'a mut VariableStore,
    globals: &'a GlobalStore,
}

impl<'a> Blackboard<'a> {
    pub fn new(locals: &'a mut VariableStore, globals: &'a GlobalStore) -> Self {
        Blackboard { locals, globals }
    }

    /// Where an unqualified name resolves to, local wins.
    pub fn resolve(&self, name: &str) -> Option<(Scope, usize, VariableType)> {
        if let Some(v) = self.locals.index_of(name) {
            let t = self.locals.variables[v].variable_type().clone();
            return Some((Scope::Local, v, t));
        }
        let globals = self.globals.read();
        globals
            .index_of(name)
            .map(|v| (Scope::Global, v, globals.variables[v].variable_type().clone()))
    }

    pub fn bind<T: VariableValue>(&self, name: &str) -> Result<Var<T>, VariableError> {
        let (scope, index, found) = self
            .resolve(name)
            .ok_or_else(|| VariableError::NotFound(name.to_owned()))?;
        let expected = T::variable_type();
        if found != expected {
            return Err(VariableError::TypeMismatch {
                name: name.to_owned(),
                expected,
                found,
            });
        }
        Ok(Var {
            name: name.to_owned(),
            slot: Some((scope, index)),
            _z: PhantomData,
        })
    }

    pub fn bind_any(&self, name: &str) -> Result<AnyVar, VariableError> {
        let slot = self
            .resolve(name)
            .ok_or_else(|| VariableError::NotFound(name.to_owned()))?;
        Ok(AnyVar {
            name: name.to_owned(),
            slot: Some(slot),
        })
    }

    fn with_variable<R>(
        &self,
        scope: Scope,
        index: usize,
        name: &str,
        f: impl FnOnce(&Variable) -> R,
    ) -> Result<R, VariableError> {
        let missing = || VariableError::NotFound(name.to_owned());
        match scope {
            Scope::Local => self.locals.at(index).map(f).ok_or_else(missing),
            Scope::Global => self.globals.read().at(index).map(f).ok_or_else(missing),
        }
    }

    fn with_variable_mut<R>(
        &mut self,
        scope: Scope,
        index: usize,
        name: &str,
        f: impl FnOnce(&mut Variable) -> R,
    ) -> Result<R, VariableError> {
        let missing = || VariableError::NotFound(name.to_owned());
        match scope {
            Scope::Local => self.locals.at_mut(index).map(f).ok_or_else(missing),
            Scope::Global => self
                .globals
                .write()
                .at_mut(index)
                .map(f)
                .ok_or_else(missing),
        }
    }

    pub fn get<T: VariableValue>(&self, var: &Var<T>) -> Result<T, VariableError> {
        let (scope, index) = var.slot()?;
        self.with_variable(scope, index, &var.name, |v| v.get::<T>())?
    }

    pub fn set<T: VariableValue>(&mut self, var: &Var<T>, value: T) -> Result<(), VariableError> {
        let (scope, index) = var.slot()?;
        self.with_variable_mut(scope, index, &var.name, |v| v.set(value))?
    }

    pub fn get_any(&self, var: &AnyVar) -> Result<Value, VariableError> {
        let (scope, index, _) = var
            .slot
            .as_ref()
            .ok_or_else(|| VariableError::Unbound(var.name.clone()))?;
        self.with_variable(*scope, *index, &var.name, |v| v.value().clone())
    }

    pub fn set_any(&mut self, var: &AnyVar, value: Value) -> Result<(), VariableError> {
        let (scope, index, _) = var
            .slot
            .clone()
            .ok_or_else(|| VariableError::Unbound(var.name.clone()))?;
        self.with_variable_mut(scope, index, &var.name, |v| v.set_value(value))?
    }

    /// Read by name, local then global.
    pub fn try_get<T: VariableValue>(&self, name: &str) -> Result<T, VariableError> {
        match self.locals.variable(name) {
            Some(v) => v.get(),
            None => self.globals.read().try_get(name),
        }
    }

    /// Write by name, local then global.
    pub fn set_named<T: VariableValue>(&mut self, name: &str, value: T) -> Result<(), VariableError> {
        if self.locals.contains(name) {
            self.locals.set(name, value)
        } else {
            self.globals.write().set(name, value)
        }
    }

    pub fn locals(&self) -> &VariableStore {
        self.locals
    }

    pub fn globals(&self) -> &GlobalStore {
        self.globals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variable::{GameObjectRef, EntityId, Quat, TransformRef, Vec2, Vec3};

    fn round_trip<T: VariableValue + PartialEq>(initial: T, updated: T) -> Result<(), VariableError> {
        let mut store = VariableStore::new();
        store.declare("x", T::variable_type(), initial.into_value())?;
        store.set("x", updated.clone())?;
        assert_eq!(store.try_get::<T>("x")?, updated);
        Ok(())
    }

    #[test]
    fn type_safety_round_trip() -> Result<(), VariableError> {
        round_trip(false, true)?;
        round_trip(1i32, -7i32)?;
        round_trip(0.5f32, 3.25f32)?;
        round_trip(Vec2::ZERO, Vec2::new(1.0, 2.0))?;
        round_trip(Vec3::ZERO, Vec3::new(1.0, 2.0, 3.0))?;
        round_trip(Quat::IDENTITY, Quat::from_yaw(1.0))?;
        round_trip("a".to_owned(), "b".to_owned())?;
        round_trip(TransformRef(None), TransformRef(Some(EntityId(4))))?;
        round_trip(GameObjectRef(None), GameObjectRef(Some(EntityId(9))))?;
        round_trip(vec![1i32], vec![2i32, 3])?;
        round_trip::<Vec<Vec3>>(vec![], vec![Vec3::new(0.0, 1.0, 0.0)])?;
        Ok(())
    }

    #[test]
    fn mismatch_is_not_not_found() -> Result<(), VariableError> {
        let mut store = VariableStore::new();
        store.declare_as("speed", 3.0f32)?;
        assert!(matches!(
            store.try_get::<i32>("speed"),
            Err(VariableError::TypeMismatch { .. })
        ));
        assert_eq!(
            store.try_get::<f32>("missing"),
            Err(VariableError::NotFound("missing".to_owned()))
        );
        assert!(matches!(
            store.set("speed", 1i32),
            Err(VariableError::TypeMismatch { .. })
        ));
        assert_eq!(
            store.set("missing", 1i32),
            Err(VariableError::NotFound("missing".to_owned()))
        );
        // Failed write left the value alone.
        assert_eq!(store.try_get::<f32>("speed")?, 3.0);
        Ok(())
    }

    #[test]
    fn duplicate_declaration() -> Result<(), VariableError> {
        let mut store = VariableStore::new();
        store.declare_as("alert", false)?;
        assert_eq!(
            store.declare_as("alert", 1i32),
            Err(VariableError::DuplicateName("alert".to_owned()))
        );
        assert!(store
            .declare("wrong", VariableType::Int, Value::Bool(true))
            .is_err());
        assert_eq!(store.len(), 1);
        Ok(())
    }

    #[test]
    fn scope_resolution() -> Result<(), VariableError> {
        let globals = GlobalStore::default();
        globals.write().declare_as("speed", 2.0f32)?;
        let mut locals = VariableStore::new();

        {
            let bb = Blackboard::new(&mut locals, &globals);
            assert_eq!(bb.try_get::<f32>("speed")?, 2.0);
            let v = bb.bind::<f32>("speed")?;
            assert_eq!(v.scope(), Some(Scope::Global));
            assert_eq!(bb.get(&v)?, 2.0);
        }

        locals.declare_as("speed", 5.0f32)?;
        let mut bb = Blackboard::new(&mut locals, &globals);
        assert_eq!(bb.try_get::<f32>("speed")?, 5.0);
        let v = bb.bind::<f32>("speed")?;
        assert_eq!(v.scope(), Some(Scope::Local));
        bb.set(&v, 6.0)?;
        assert_eq!(bb.get(&v)?, 6.0);
        assert_eq!(globals.read().try_get::<f32>("speed")?, 2.0);
        Ok(())
    }

    #[test]
    fn handles() -> Result<(), VariableError> {
        let globals = GlobalStore::default();
        let mut locals = VariableStore::new();
        locals.declare_as("count", 1i32)?;
        let mut bb = Blackboard::new(&mut locals, &globals);
        assert!(matches!(
            bb.bind::<bool>("count"),
            Err(VariableError::TypeMismatch { .. })
        ));
        assert!(matches!(bb.bind::<bool>("nope"), Err(VariableError::NotFound(_))));

        let unbound: Var<i32> = Var::default();
        assert!(matches!(bb.get(&unbound), Err(VariableError::Unbound(_))));

        let any = bb.bind_any("count")?;
        assert_eq!(any.variable_type(), Some(&VariableType::Int));
        bb.set_any(&any, Value::Int(4))?;
        assert!(bb.set_any(&any, Value::Float(4.0)).is_err());
        assert_eq!(bb.get_any(&any)?, Value::Int(4));
        Ok(())
    }
}
