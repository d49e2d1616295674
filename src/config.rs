//! Connection settings for the management platform.

use std::fs;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VcConfig {
    /// vCenter hostname or IP.
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Accept self-signed certificates (lab vCenters).
    #[serde(default)]
    pub insecure: bool,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_port() -> u16 {
    443
}

fn default_timeout() -> u64 {
    30
}

impl VcConfig {
    /// Read settings from the environment. `VC_HOST`, `VC_USERNAME` and
    /// `VC_PASSWORD_FILE` are required; the password is the trimmed
    /// content of the named file. `VC_PORT`, `VC_INSECURE` and
    /// `VC_TIMEOUT_SECS` are optional.
    pub fn from_env() -> Result<Self> {
        let host = require("VC_HOST")?;
        let username = require("VC_USERNAME")?;
        let password_file = require("VC_PASSWORD_FILE")?;
        let password = fs::read_to_string(&password_file)
            .map_err(|e| Error::Config(format!("failed to read {password_file}: {e}")))?
            .trim()
            .to_string();

        Ok(Self {
            host,
            port: parse_var("VC_PORT", default_port())?,
            username,
            password,
            insecure: std::env::var("VC_INSECURE")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            timeout_secs: parse_var("VC_TIMEOUT_SECS", default_timeout())?,
        })
    }
}

fn require(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| Error::Config(format!("{name} must be set")))
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match std::env::var(name) {
        Ok(v) => v
            .parse()
            .map_err(|_| Error::Config(format!("invalid {name}: {v}"))),
        Err(_) => Ok(default),
    }
}
