//! Persisted preferences
//!
//! Only device identity, LED intensity and label overrides survive restarts.
//! The core reaches them through an injected [`PreferenceStore`].

mod store;

pub use store::{FileStore, MemoryStore, PreferenceStore};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::{Error, Result};

pub const DEVICE_ID_KEY: &str = "deviceID";
pub const DEVICE_NAME_KEY: &str = "deviceName";
pub const LED_INTENSITY_KEY: &str = "ledIntensity";
pub const USER_LABEL_PREFIX: &str = "userLabel.";

/// Panel display brightness
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedIntensity {
    Dim = 0,
    #[default]
    Normal = 1,
    Bright = 2,
}

impl LedIntensity {
    pub fn raw(self) -> i64 {
        self as i64
    }
}

impl TryFrom<i64> for LedIntensity {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        match value {
            0 => Ok(LedIntensity::Dim),
            1 => Ok(LedIntensity::Normal),
            2 => Ok(LedIntensity::Bright),
            _ => Err(Error::InvalidParameter),
        }
    }
}

/// Remove every label override from a preference snapshot, returning how
/// many were removed
pub fn clear_labels(values: &mut BTreeMap<String, Value>) -> usize {
    let before = values.len();
    values.retain(|key, _| !key.starts_with(USER_LABEL_PREFIX));
    before - values.len()
}

/// Typed access to a preference store
pub struct Preferences {
    store: Box<dyn PreferenceStore>,
}

impl Preferences {
    pub fn new(store: impl PreferenceStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    /// In-memory preferences, nothing persisted
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::default())
    }

    pub fn string(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Some(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Store a string, or remove the key when `value` is `None`
    pub fn set_string(&mut self, key: &str, value: Option<&str>) {
        match value {
            Some(value) => self.store.set(key, Value::String(value.to_string())),
            None => self.store.remove(key),
        }
    }

    pub fn device_id(&self) -> Option<i64> {
        self.store.get(DEVICE_ID_KEY).and_then(|v| v.as_i64())
    }

    pub fn set_device_id(&mut self, device_id: i64) {
        self.store.set(DEVICE_ID_KEY, Value::from(device_id));
    }

    pub fn device_name(&self) -> Option<String> {
        self.string(DEVICE_NAME_KEY)
    }

    pub fn set_device_name(&mut self, name: &str) {
        self.set_string(DEVICE_NAME_KEY, Some(name));
    }

    pub fn led_intensity(&self) -> Option<LedIntensity> {
        self.store
            .get(LED_INTENSITY_KEY)
            .and_then(|v| v.as_i64())
            .and_then(|raw| LedIntensity::try_from(raw).ok())
    }

    pub fn set_led_intensity(&mut self, intensity: LedIntensity) {
        self.store.set(LED_INTENSITY_KEY, Value::from(intensity.raw()));
    }

    pub fn keys(&self) -> Vec<String> {
        self.store.keys()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.store.get(key)
    }
}
