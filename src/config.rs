use anyhow::Result;
use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::bridge::{BridgeOptions, DeviceIdentity};
use crate::panel::RotationResetPolicy;

const MACHINE_ID_PATH: &str = "/etc/machine-id";
const SERIAL_PREFIX: &str = "710";
const FALLBACK_SERIAL: &str = "710000000000";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub device: DeviceConfig,
    pub listener: ListenerConfig,
    pub preferences: PreferencesConfig,
}

impl Config {
    /// Load configuration from the default path, creating it if missing
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, creating it if missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Get config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(config_dir()?.join("config.toml"))
    }

    /// Preferences file, from the config or next to it
    pub fn preferences_path(&self) -> Result<PathBuf> {
        match &self.preferences.path {
            Some(path) => Ok(path.clone()),
            None => Ok(config_dir()?.join("preferences.json")),
        }
    }

    pub fn bridge_options(&self) -> BridgeOptions {
        BridgeOptions {
            identity: DeviceIdentity {
                device_id: self.device.device_id,
                name: self.device.device_name.clone(),
                serial_number: self.device.serial_number(),
            },
            rotation_reset: self.device.rotation_reset,
        }
    }
}

fn config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME")?;
    Ok(PathBuf::from(home).join(".config/mom-bridge"))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Device id used until one is set from the panel
    pub device_id: i64,
    /// Device name used until one is set from the panel
    pub device_name: String,
    /// Serial number; derived from the machine id when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    /// Whether closing the port also zeroes the rotation count
    pub rotation_reset: RotationResetPolicy,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            device_id: 50,
            device_name: "MOM Bridge".to_string(),
            serial_number: None,
            rotation_reset: RotationResetPolicy::Preserve,
        }
    }
}

impl DeviceConfig {
    pub fn serial_number(&self) -> String {
        if let Some(serial) = &self.serial_number {
            return serial.clone();
        }

        std::fs::read_to_string(MACHINE_ID_PATH)
            .ok()
            .and_then(|id| serial_from_machine_id(&id))
            .unwrap_or_else(|| FALLBACK_SERIAL.to_string())
    }
}

/// Serial number from a 128-bit hex machine id: the prefix followed by the
/// tail of its unpadded base64 form
fn serial_from_machine_id(id: &str) -> Option<String> {
    let id = id.trim();
    if id.len() != 32 {
        return None;
    }

    let bytes = (0..id.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(id.get(i..i + 2)?, 16).ok())
        .collect::<Option<Vec<u8>>>()?;

    let encoded = STANDARD_NO_PAD.encode(bytes);
    Some(format!("{}{}", SERIAL_PREFIX, encoded.get(14..)?))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Serve the HTTP surface
    pub enabled: bool,
    pub port: u16,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 65000,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferencesConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config() {
        let config: Config = toml::from_str(
            r#"
            [device]
            device_name = "Studio B"
            rotation_reset = "reset"

            [listener]
            port = 8080
            "#,
        )
        .unwrap();

        assert_eq!(config.device.device_id, 50);
        assert_eq!(config.device.device_name, "Studio B");
        assert_eq!(config.device.rotation_reset, RotationResetPolicy::Reset);
        assert_eq!(config.listener.port, 8080);
        assert!(config.listener.enabled);
        assert!(config.preferences.path.is_none());
    }

    #[test]
    fn test_default_config_round_trips() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let config: Config = toml::from_str(&text).unwrap();
        assert_eq!(config.listener.port, 65000);
        assert_eq!(config.device.device_name, "MOM Bridge");
    }

    #[test]
    fn test_serial_from_machine_id() {
        // 16 bytes encode to 22 base64 characters, leaving 8 after the cut
        let serial = serial_from_machine_id("0123456789abcdef0123456789abcdef\n").unwrap();
        assert!(serial.starts_with(SERIAL_PREFIX));
        assert_eq!(serial.len(), SERIAL_PREFIX.len() + 8);

        assert_eq!(serial_from_machine_id("not-a-machine-id"), None);
        assert_eq!(serial_from_machine_id("zz23456789abcdef0123456789abcdef"), None);
    }

    #[test]
    fn test_configured_serial_wins() {
        let device = DeviceConfig {
            serial_number: Some("710TEST".to_string()),
            ..DeviceConfig::default()
        };
        assert_eq!(device.serial_number(), "710TEST");
        assert_eq!(
            Config::default().bridge_options().identity.device_id,
            50
        );
    }
}
