//! Testbed configuration.
//!
//! A [`TestbedConfig`] is loaded once at startup and handed by reference to
//! every device object. It replaces per-driver address tables and global
//! registries.
//!
//! ```yaml
//! devices:
//!   roadm_1: { host: 10.10.10.38, port: 830, username: superuser }
//! ports:
//!   roadm_1_p1: "alice,bob"
//!   roadm_1_line: ""
//! settle_delay_ms: 500
//! telemetry_retries: 10
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{WdmError, WdmResult};

/// Default values for testbed configuration.
pub mod defaults {
    /// NETCONF over SSH.
    pub const NETCONF_PORT: u16 = 830;

    /// Delay between taking an amplifier out of service and re-enabling it.
    pub const SETTLE_DELAY_MS: u64 = 500;

    /// Attempts for amplifier telemetry reads.
    pub const TELEMETRY_RETRIES: u32 = 10;

    pub(crate) fn netconf_port() -> u16 {
        NETCONF_PORT
    }

    pub(crate) fn settle_delay_ms() -> u64 {
        SETTLE_DELAY_MS
    }

    pub(crate) fn telemetry_retries() -> u32 {
        TELEMETRY_RETRIES
    }
}

/// Management endpoint of one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceEndpoint {
    pub host: String,
    #[serde(default = "defaults::netconf_port")]
    pub port: u16,
    #[serde(default)]
    pub username: Option<String>,
}

/// Read-only testbed snapshot: device endpoints and port ownership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestbedConfig {
    /// Device name -> management endpoint.
    #[serde(default)]
    pub devices: BTreeMap<String, DeviceEndpoint>,

    /// Patch endpoint name -> comma-separated owner list (empty = unowned).
    #[serde(default)]
    pub ports: BTreeMap<String, String>,

    #[serde(default = "defaults::settle_delay_ms")]
    pub settle_delay_ms: u64,

    #[serde(default = "defaults::telemetry_retries")]
    pub telemetry_retries: u32,
}

impl Default for TestbedConfig {
    fn default() -> Self {
        Self {
            devices: BTreeMap::new(),
            ports: BTreeMap::new(),
            settle_delay_ms: defaults::SETTLE_DELAY_MS,
            telemetry_retries: defaults::TELEMETRY_RETRIES,
        }
    }
}

impl TestbedConfig {
    /// Loads and validates a YAML configuration file.
    pub fn load(path: impl AsRef<Path>) -> WdmResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| WdmError::config(path, format!("failed to read: {}", e)))?;
        let config = Self::from_yaml(&contents).map_err(|msg| WdmError::config(path, msg))?;

        info!(
            "Loaded testbed config {}: {} devices, {} ports",
            path.display(),
            config.devices.len(),
            config.ports.len()
        );
        Ok(config)
    }

    /// Parses and validates YAML text.
    pub fn from_yaml(yaml: &str) -> Result<Self, String> {
        let config: TestbedConfig =
            serde_yaml::from_str(yaml).map_err(|e| format!("invalid YAML: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks field-level invariants.
    pub fn validate(&self) -> Result<(), String> {
        for (name, endpoint) in &self.devices {
            if name.trim().is_empty() {
                return Err("device name must not be empty".to_string());
            }
            if endpoint.host.trim().is_empty() {
                return Err(format!("device {} has an empty host", name));
            }
            if endpoint.port == 0 {
                return Err(format!("device {} has port 0", name));
            }
        }
        if self.telemetry_retries == 0 {
            return Err("telemetry_retries must be at least 1".to_string());
        }
        Ok(())
    }

    /// Looks up a device endpoint.
    pub fn device(&self, name: &str) -> WdmResult<&DeviceEndpoint> {
        self.devices
            .get(name)
            .ok_or_else(|| WdmError::UnknownDevice(name.to_string()))
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// The fiber patch that must be owned to open `device`:
    /// its first add/drop pair and its line port.
    pub fn patch_for(device: &str) -> Vec<(String, String)> {
        vec![(format!("{}_p1", device), format!("{}_line", device))]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
devices:
  roadm_1: { host: 10.10.10.38, port: 830, username: superuser }
  roadm_2: { host: 10.10.10.37 }
ports:
  roadm_1_p1: "alice,bob"
  roadm_1_line: ""
settle_delay_ms: 0
"#;

    #[test]
    fn test_load_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", SAMPLE).unwrap();
        file.flush().unwrap();

        let config = TestbedConfig::load(file.path()).unwrap();
        assert_eq!(config.devices.len(), 2);
        assert_eq!(config.device("roadm_2").unwrap().port, 830);
        assert_eq!(config.device("roadm_2").unwrap().username, None);
        assert_eq!(config.ports["roadm_1_p1"], "alice,bob");
        assert_eq!(config.settle_delay(), Duration::ZERO);
        assert_eq!(config.telemetry_retries, defaults::TELEMETRY_RETRIES);
    }

    #[test]
    fn test_load_missing_file() {
        let err = TestbedConfig::load("/nonexistent/testbed.yaml").unwrap_err();
        assert!(matches!(err, WdmError::Config { .. }));
    }

    #[test]
    fn test_invalid_yaml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "devices: [unterminated").unwrap();
        file.flush().unwrap();

        let err = TestbedConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("invalid YAML"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(TestbedConfig::from_yaml("passwords: {}\n").is_err());
    }

    #[test]
    fn test_validation() {
        assert!(TestbedConfig::from_yaml("telemetry_retries: 0\n").is_err());
        assert!(TestbedConfig::from_yaml("devices:\n  r: { host: '' }\n").is_err());
        assert!(TestbedConfig::from_yaml("devices:\n  r: { host: h, port: 0 }\n").is_err());
    }

    #[test]
    fn test_unknown_device() {
        let config = TestbedConfig::default();
        assert!(matches!(
            config.device("roadm_9"),
            Err(WdmError::UnknownDevice(_))
        ));
    }

    #[test]
    fn test_patch_for() {
        assert_eq!(
            TestbedConfig::patch_for("roadm_3"),
            vec![("roadm_3_p1".to_string(), "roadm_3_line".to_string())]
        );
    }
}
