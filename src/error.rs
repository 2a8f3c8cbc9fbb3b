//! Error types
use std::{io, path::PathBuf, result};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid action: {0}")]
    UnknownAction(String),
    #[error("Device not found in configuration: {0}")]
    UnknownDevice(String),
    #[error("No devices configured")]
    NoDevices,
    #[error("Could not load configuration from {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: ConfigSource,
    },
    #[error("Cannot connect to device at {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("Error talking to the device: {0}")]
    IO(#[from] io::Error),
    #[error("Could not parse the response received from the device: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigSource {
    #[error(transparent)]
    Read(#[from] io::Error),
    #[error(transparent)]
    Parse(#[from] serde_yaml::Error),
}

impl Error {
    /// Configuration errors stop the whole run, everything else is per device.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::UnknownAction(_) | Error::UnknownDevice(_) | Error::NoDevices | Error::Config { .. }
        )
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_fatal() {
            2
        } else {
            1
        }
    }
}

pub type Result<T> = result::Result<T, Error>;
