//! Device registry and defaults read from a YAML file
//!
//! ```yaml
//! action: on
//! devices:
//!   kitchen: 192.168.10.44
//!   lamp: 192.168.10.45:9999
//! ```
use std::{collections::BTreeMap, fs, path::Path};

use tracing::debug;

use crate::{
    devices::Device,
    error::{ConfigSource, Error, Result},
};

pub const DEFAULT_ACTION: &str = "on";

/// Configuration file read when `--config` isn't given
pub const DEFAULT_PATH: &str = "config.yaml";

/// Device name that selects every configured device.
pub const ALL_DEVICES: &str = "all";

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Action used when none is given on the command line
    pub action: Option<String>,
    /// Device name to `host[:port]`
    pub devices: BTreeMap<String, String>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Config> {
        let config_error = |source: ConfigSource| Error::Config {
            path: path.to_owned(),
            source,
        };

        let text = fs::read_to_string(path).map_err(|err| config_error(err.into()))?;
        let config = Config::parse(&text).map_err(|err| config_error(err.into()))?;
        debug!(path = %path.display(), devices = config.devices.len(), "configuration loaded");

        Ok(config)
    }

    pub fn parse(text: &str) -> std::result::Result<Config, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    pub fn default_action(&self) -> &str {
        self.action.as_deref().unwrap_or(DEFAULT_ACTION)
    }

    /// Every configured device, ordered by name
    pub fn devices(&self) -> Vec<Device> {
        self.devices
            .iter()
            .map(|(name, addr)| Device::new(name, addr))
            .collect()
    }

    /// Pick the devices a command should be sent to.
    ///
    /// A named device wins over `all`. The name `all` (any case) and the
    /// absence of a name both select every device.
    pub fn resolve(&self, device: Option<&str>, all: bool) -> Result<Vec<Device>> {
        let devices = match device {
            Some(name) if !name.eq_ignore_ascii_case(ALL_DEVICES) => {
                let addr = self
                    .devices
                    .get(name)
                    .ok_or_else(|| Error::UnknownDevice(name.to_owned()))?;
                return Ok(vec![Device::new(name, addr)]);
            }
            _ => {
                debug!(all, "selecting every configured device");
                self.devices()
            }
        };

        if devices.is_empty() {
            return Err(Error::NoDevices);
        }

        Ok(devices)
    }

    /// Every setting as `CONFIG: key : value`, sorted by key
    pub fn display(&self) -> Vec<String> {
        let mut lines = vec![format!("CONFIG: action : {}", self.default_action())];
        lines.extend(
            self.devices
                .iter()
                .map(|(name, addr)| format!("CONFIG: devices.{} : {}", name, addr)),
        );
        lines
    }
}
