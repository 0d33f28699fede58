//! Test stand configuration


use std::{
    fs::File,
    io::prelude::*,
    path::Path,
    time::Duration,
};

use serde::Deserialize;

use crate::Error;


/// The file that `Config::read` loads, relative to the working directory
pub const CONFIG_FILE: &str = "test-stand.toml";


/// The configuration options for the test stand
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Path to the serial device connected to the test jig
    pub jig: Option<String>,

    /// Path to the serial device connected to the test target
    pub target: Option<String>,

    /// Baud rate used for all serial connections
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// How long to wait for a node to reply, in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Config {
    /// Read configuration from the `test-stand.toml` file
    pub fn read() -> Result<Self, ConfigReadError> {
        Self::read_from(CONFIG_FILE)
    }

    /// Read configuration from the given file
    pub fn read_from(path: impl AsRef<Path>) -> Result<Self, ConfigReadError> {
        Self::read_inner(path.as_ref())
            .map_err(|err| ConfigReadError(err))
    }

    /// Parse configuration from a string in TOML format
    pub fn parse(config: &str) -> Result<Self, ConfigReadError> {
        toml::from_str(config)
            .map_err(|err| ConfigReadError(err.into()))
    }

    /// The reply timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    fn read_inner(path: &Path) -> Result<Self, Error> {
        // Read configuration file
        let mut config = Vec::new();
        File::open(path)?
            .read_to_end(&mut config)?;

        // Parse configuration file
        let config = toml::from_slice(&config)?;

        Ok(config)
    }
}


fn default_baud_rate() -> u32 {
    115200
}

fn default_timeout_ms() -> u64 {
    100
}


/// Error reading the configuration file
#[derive(Debug)]
pub struct ConfigReadError(pub Error);
