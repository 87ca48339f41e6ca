//! Object addressing by class and role

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};
use crate::panel::KeyId;

/// Role of the block containing all panel objects
pub const BLOCK_ROLE: &str = "MOM";

/// Object class, selecting which methods an object answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectClass {
    BooleanActuator,
    /// Boolean actuator without a readable setting
    ExternalKey,
    SteppedGain,
    LayerIndicator,
    IdentificationSensor,
}

/// Instance role within the block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectRole {
    Key(KeyId),
    Gain,
    Layer,
    Identify,
}

impl ObjectRole {
    /// Every object in the block, in block order
    pub fn all() -> Vec<ObjectRole> {
        let mut roles: Vec<ObjectRole> = KeyId::ALL
            .iter()
            .filter(|key| **key != KeyId::External)
            .map(|key| ObjectRole::Key(*key))
            .collect();
        roles.push(ObjectRole::Key(KeyId::External));
        roles.push(ObjectRole::Gain);
        roles.push(ObjectRole::Layer);
        roles.push(ObjectRole::Identify);
        roles
    }

    pub fn class(self) -> ObjectClass {
        match self {
            ObjectRole::Key(KeyId::External) => ObjectClass::ExternalKey,
            ObjectRole::Key(_) => ObjectClass::BooleanActuator,
            ObjectRole::Gain => ObjectClass::SteppedGain,
            ObjectRole::Layer => ObjectClass::LayerIndicator,
            ObjectRole::Identify => ObjectClass::IdentificationSensor,
        }
    }

    pub fn address(self) -> ObjectAddress {
        ObjectAddress {
            class: self.class(),
            role: self.to_string(),
        }
    }

    /// Resolve a role path such as `MOM/Gain` or `Source A`
    pub fn from_path(path: &str) -> Result<Self> {
        let mut components: Vec<&str> = path.split('/').filter(|c| !c.is_empty()).collect();
        if components.first() == Some(&BLOCK_ROLE) {
            components.remove(0);
        }

        match components.as_slice() {
            [role] => Self::all()
                .into_iter()
                .find(|candidate| candidate.to_string() == *role)
                .ok_or(Error::InvalidParameter),
            _ => Err(Error::InvalidRequest),
        }
    }
}

impl fmt::Display for ObjectRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectRole::Key(key) => write!(f, "{}", key),
            ObjectRole::Gain => f.write_str("Gain"),
            ObjectRole::Layer => f.write_str("Selected Layer"),
            ObjectRole::Identify => f.write_str("Identify"),
        }
    }
}

/// Two-level object address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectAddress {
    pub class: ObjectClass,
    pub role: String,
}
