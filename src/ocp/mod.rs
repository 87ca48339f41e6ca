//! Device object model: addressable objects, method commands and
//! property-changed events

mod object;

pub use object::{ObjectAddress, ObjectClass, ObjectRole, BLOCK_ROLE};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// `level.index` identifier shared by methods and properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemberId {
    pub level: u16,
    pub index: u16,
}

pub type MethodId = MemberId;
pub type PropertyId = MemberId;

impl MemberId {
    pub const fn new(level: u16, index: u16) -> Self {
        Self { level, index }
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.level, self.index)
    }
}

impl FromStr for MemberId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (level, index) = s.split_once('.').ok_or(Error::InvalidRequest)?;
        Ok(Self {
            level: level.parse().map_err(|_| Error::InvalidRequest)?,
            index: index.parse().map_err(|_| Error::InvalidRequest)?,
        })
    }
}

impl Serialize for MemberId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MemberId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Methods understood by panel objects
pub mod methods {
    use super::MethodId;

    pub const GET_ENABLED: MethodId = MethodId::new(2, 1);
    pub const SET_ENABLED: MethodId = MethodId::new(2, 2);
    pub const GET_LABEL: MethodId = MethodId::new(2, 8);
    pub const SET_LABEL: MethodId = MethodId::new(2, 9);
    pub const GET_GAIN: MethodId = MethodId::new(4, 1);
    pub const SET_GAIN: MethodId = MethodId::new(4, 2);
    pub const GET_READING: MethodId = MethodId::new(4, 1);
    pub const GET_SETTING: MethodId = MethodId::new(5, 1);
    pub const SET_SETTING: MethodId = MethodId::new(5, 2);
}

/// Properties reported in change events
pub mod properties {
    use super::PropertyId;

    pub const ENABLED: PropertyId = PropertyId::new(2, 1);
    pub const LABEL: PropertyId = PropertyId::new(2, 3);
    pub const GAIN: PropertyId = PropertyId::new(4, 1);
    pub const READING: PropertyId = PropertyId::new(4, 1);
    pub const SETTING: PropertyId = PropertyId::new(5, 1);
    /// Identification sensor event, raised with `true`
    pub const IDENTIFY: PropertyId = PropertyId::new(4, 1);
}

/// Command argument or response value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl Value {
    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            _ => Err(Error::InvalidParameter),
        }
    }

    pub fn as_f32(&self) -> Result<f32> {
        match self {
            Value::Float(f) => Ok(*f as f32),
            Value::Int(i) => Ok(*i as f32),
            _ => Err(Error::InvalidParameter),
        }
    }

    pub fn as_string(&self) -> Result<&str> {
        match self {
            Value::String(s) => Ok(s),
            _ => Err(Error::InvalidParameter),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value as f64)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::Int(value as i64)
    }
}

/// Method invocation on an object
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub role: ObjectRole,
    pub method: MethodId,
    pub args: Vec<Value>,
}

impl Command {
    pub fn new(role: ObjectRole, method: MethodId, args: Vec<Value>) -> Self {
        Self { role, method, args }
    }

    /// The single argument of a setter
    pub fn arg(&self) -> Result<&Value> {
        match self.args.as_slice() {
            [value] => Ok(value),
            _ => Err(Error::InvalidRequest),
        }
    }
}

/// Property-changed event delivered to subscribers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyChanged {
    pub role: ObjectRole,
    pub property: PropertyId,
    pub value: Value,
}

impl PropertyChanged {
    pub fn new(role: ObjectRole, property: PropertyId, value: impl Into<Value>) -> Self {
        Self {
            role,
            property,
            value: value.into(),
        }
    }
}
