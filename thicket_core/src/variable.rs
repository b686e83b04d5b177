//! Typed values that live on the blackboard.
//!
//! A [`Variable`] has a fixed [`VariableType`] for its whole life, reads and
//! writes through the [`VariableValue`] trait are checked against it and a
//! mismatch is reported, never coerced.

use crate::error::VariableError;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };
    pub fn new(x: f32, y: f32) -> Self {
        Vec2 { x, y }
    }
    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Vec3 { x, y, z }
    }
    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
    pub fn distance(&self, other: &Vec3) -> f32 {
        (*other - *self).length()
    }

    /// Unit vector in the same direction, zero stays zero.
    pub fn normalized(&self) -> Vec3 {
        let l = self.length();
        if l <= f32::EPSILON {
            Vec3::ZERO
        } else {
            *self * (1.0 / l)
        }
    }
}

impl std::ops::Add for Vec3 {
    type Output = Vec3;
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl std::ops::Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quat {
    pub const IDENTITY: Quat = Quat {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    /// Rotation around the vertical axis.
    pub fn from_yaw(radians: f32) -> Self {
        let half = radians * 0.5;
        Quat {
            x: 0.0,
            y: half.sin(),
            z: 0.0,
            w: half.cos(),
        }
    }
}

impl Default for Quat {
    fn default() -> Self {
        Quat::IDENTITY
    }
}

/// Opaque identity of a host entity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

/// Reference to a transform owned by the host, may be empty.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransformRef(pub Option<EntityId>);

/// Reference to a game object owned by the host, may be empty.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameObjectRef(pub Option<EntityId>);

/// The type tag of a variable.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariableType {
    Bool,
    Int,
    Float,
    Vector2,
    Vector3,
    Quaternion,
    String,
    Transform,
    GameObject,
    List(Box<VariableType>),
}

impl std::fmt::Display for VariableType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VariableType::Bool => write!(f, "bool"),
            VariableType::Int => write!(f, "int"),
            VariableType::Float => write!(f, "float"),
            VariableType::Vector2 => write!(f, "vector2"),
            VariableType::Vector3 => write!(f, "vector3"),
            VariableType::Quaternion => write!(f, "quaternion"),
            VariableType::String => write!(f, "string"),
            VariableType::Transform => write!(f, "transform"),
            VariableType::GameObject => write!(f, "game_object"),
            VariableType::List(element) => write!(f, "list<{element}>"),
        }
    }
}

/// Homogeneous list, the element type is kept so empty lists stay typed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct List {
    element: VariableType,
    items: Vec<Value>,
}

impl List {
    pub fn new(element: VariableType) -> Self {
        List {
            element,
            items: vec![],
        }
    }

    pub fn from_values(element: VariableType, items: Vec<Value>) -> Result<Self, VariableError> {
        if let Some(bad) = items.iter().find(|v| !v.conforms_to(&element)) {
            return Err(VariableError::TypeMismatch {
                name: "list item".to_owned(),
                expected: element,
                found: bad.variable_type(),
            });
        }
        Ok(List { element, items })
    }

    pub fn element(&self) -> &VariableType {
        &self.element
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A value held by a variable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    Bool(bool),
    Int(i32),
    Float(f32),
    Vector2(Vec2),
    Vector3(Vec3),
    Quaternion(Quat),
    String(String),
    Transform(TransformRef),
    GameObject(GameObjectRef),
    List(List),
}

impl Value {
    pub fn variable_type(&self) -> VariableType {
        match self {
            Value::Bool(_) => VariableType::Bool,
            Value::Int(_) => VariableType::Int,
            Value::Float(_) => VariableType::Float,
            Value::Vector2(_) => VariableType::Vector2,
            Value::Vector3(_) => VariableType::Vector3,
            Value::Quaternion(_) => VariableType::Quaternion,
            Value::String(_) => VariableType::String,
            Value::Transform(_) => VariableType::Transform,
            Value::GameObject(_) => VariableType::GameObject,
            Value::List(list) => VariableType::List(Box::new(list.element.clone())),
        }
    }

    /// Whether this value, including every list item, has the given type.
    pub fn conforms_to(&self, variable_type: &VariableType) -> bool {
        match (self, variable_type) {
            (Value::List(list), VariableType::List(element)) => {
                list.element == **element && list.items.iter().all(|v| v.conforms_to(element))
            }
            (value, t) => value.variable_type() == *t,
        }
    }

    /// The zero value for a type.
    pub fn default_for(variable_type: &VariableType) -> Value {
        match variable_type {
            VariableType::Bool => Value::Bool(false),
            VariableType::Int => Value::Int(0),
            VariableType::Float => Value::Float(0.0),
            VariableType::Vector2 => Value::Vector2(Vec2::ZERO),
            VariableType::Vector3 => Value::Vector3(Vec3::ZERO),
            VariableType::Quaternion => Value::Quaternion(Quat::IDENTITY),
            VariableType::String => Value::String(String::new()),
            VariableType::Transform => Value::Transform(TransformRef::default()),
            VariableType::GameObject => Value::GameObject(GameObjectRef::default()),
            VariableType::List(element) => Value::List(List::new((**element).clone())),
        }
    }
}

/// Rust types that map onto exactly one [`VariableType`].
pub trait VariableValue: Clone + std::fmt::Debug + 'static {
    fn variable_type() -> VariableType;
    fn from_value(value: &Value) -> Option<Self>;
    fn into_value(self) -> Value;
}

macro_rules! impl_variable_value {
    ($t:ty, $variant:ident) => {
        impl VariableValue for $t {
            fn variable_type() -> VariableType {
                VariableType::$variant
            }
            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }
            fn into_value(self) -> Value {
                Value::$variant(self)
            }
        }
    };
}

impl_variable_value!(bool, Bool);
impl_variable_value!(i32, Int);
impl_variable_value!(f32, Float);
impl_variable_value!(Vec2, Vector2);
impl_variable_value!(Vec3, Vector3);
impl_variable_value!(Quat, Quaternion);
impl_variable_value!(String, String);
impl_variable_value!(TransformRef, Transform);
impl_variable_value!(GameObjectRef, GameObject);

impl<T: VariableValue> VariableValue for Vec<T> {
    fn variable_type() -> VariableType {
        VariableType::List(Box::new(T::variable_type()))
    }
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::List(list) if list.element == T::variable_type() => {
                list.items.iter().map(T::from_value).collect()
            }
            _ => None,
        }
    }
    fn into_value(self) -> Value {
        Value::List(List {
            element: T::variable_type(),
            items: self.into_iter().map(VariableValue::into_value).collect(),
        })
    }
}

/// A named, typed value.
#[derive(Clone, Debug, PartialEq)]
pub struct Variable {
    name: String,
    variable_type: VariableType,
    value: Value,
}

impl Variable {
    pub fn new(name: &str, variable_type: VariableType, value: Value) -> Result<Self, VariableError> {
        if !value.conforms_to(&variable_type) {
            return Err(VariableError::TypeMismatch {
                name: name.to_owned(),
                expected: variable_type,
                found: value.variable_type(),
            });
        }
        Ok(Variable {
            name: name.to_owned(),
            variable_type,
            value,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variable_type(&self) -> &VariableType {
        &self.variable_type
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    fn mismatch(&self, expected: VariableType) -> VariableError {
        VariableError::TypeMismatch {
            name: self.name.clone(),
            expected,
            found: self.variable_type.clone(),
        }
    }

    pub fn get<T: VariableValue>(&self) -> Result<T, VariableError> {
        let expected = T::variable_type();
        if expected != self.variable_type {
            return Err(self.mismatch(expected));
        }
        T::from_value(&self.value).ok_or_else(|| self.mismatch(T::variable_type()))
    }

    pub fn set<T: VariableValue>(&mut self, value: T) -> Result<(), VariableError> {
        self.set_value(value.into_value())
    }

    pub fn set_value(&mut self, value: Value) -> Result<(), VariableError> {
        if !value.conforms_to(&self.variable_type) {
            return Err(self.mismatch(value.variable_type()));
        }
        self.value = value;
        Ok(())
    }
}

/// Declaration of a variable as stored with a tree asset: name, type and default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariableDecl {
    pub name: String,
    pub variable_type: VariableType,
    pub default: Value,
}

impl VariableDecl {
    pub fn new<T: VariableValue>(name: &str, default: T) -> Self {
        VariableDecl {
            name: name.to_owned(),
            variable_type: T::variable_type(),
            default: default.into_value(),
        }
    }

    /// Declaration whose type is taken from the value.
    pub fn from_value(name: &str, default: Value) -> Self {
        VariableDecl {
            name: name.to_owned(),
            variable_type: default.variable_type(),
            default,
        }
    }
}
