//! Adapter configuration
//!
//! Options arrive as [`AdapterOptions`], where every field is optional, and
//! are resolved once into an immutable [`AdapterConfig`] by layering them
//! over the defaults. `ftp.host` and `http.host` have no default.

use crate::{Error, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default FTP control port
pub const DEFAULT_FTP_PORT: u16 = 21;

/// Default public HTTP port; omitted from rendered locators
pub const DEFAULT_HTTP_PORT: u16 = 80;

/// Caller-supplied options, merged over defaults by [`AdapterConfig::from_options`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterOptions {
    /// Transfer-side options
    pub ftp: FtpOptions,
    /// Public-side options
    pub http: HttpOptions,
    /// Emit session lifecycle events to the diagnostic sink
    pub debug: Option<bool>,
    /// Give up waiting for the session after this many milliseconds
    pub connect_timeout_ms: Option<u64>,
}

/// Transfer-side options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FtpOptions {
    /// Remote server address
    pub host: Option<String>,
    /// Remote server port
    pub port: Option<u16>,
    /// Base remote directory all filenames are scoped under
    pub path: Option<String>,
    /// Login user
    pub user: Option<String>,
    /// Login password
    pub password: Option<String>,
}

/// Public-side options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpOptions {
    /// Externally reachable host for locator URLs
    pub host: Option<String>,
    /// Public port
    pub port: Option<u16>,
    /// Base path prefix for locator URLs
    pub path: Option<String>,
}

/// Resolved adapter configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterConfig {
    /// Transfer-side settings
    pub ftp: FtpSettings,
    /// Public-side settings
    pub http: HttpSettings,
    /// Whether session lifecycle events are emitted
    pub debug: bool,
    /// Upper bound on waiting for readiness; `None` waits forever
    pub connect_timeout_ms: Option<u64>,
}

/// Resolved transfer-side settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FtpSettings {
    /// Remote server address
    pub host: String,
    /// Remote server port
    pub port: u16,
    /// Base remote directory
    pub path: String,
    /// Login user
    pub user: String,
    /// Login password
    pub password: String,
}

/// Resolved public-side settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSettings {
    /// Public host, optionally with a scheme
    pub host: String,
    /// Public port
    pub port: u16,
    /// Base path prefix
    pub path: String,
}

impl AdapterConfig {
    /// Merge caller options over defaults and validate required keys
    ///
    /// # Errors
    /// Returns [`Error::MissingOption`] naming the first absent required key
    pub fn from_options(options: AdapterOptions) -> Result<Self> {
        let ftp_host = required(options.ftp.host, "ftp.host")?;
        let http_host = required(options.http.host, "http.host")?;

        Ok(Self {
            ftp: FtpSettings {
                host: ftp_host,
                port: options.ftp.port.unwrap_or(DEFAULT_FTP_PORT),
                path: options.ftp.path.unwrap_or_else(|| "/".to_string()),
                user: options.ftp.user.unwrap_or_else(|| "anonymous".to_string()),
                password: options
                    .ftp
                    .password
                    .unwrap_or_else(|| "anonymous@".to_string()),
            },
            http: HttpSettings {
                host: http_host,
                port: options.http.port.unwrap_or(DEFAULT_HTTP_PORT),
                path: options.http.path.unwrap_or_else(|| "/".to_string()),
            },
            debug: options.debug.unwrap_or(false),
            connect_timeout_ms: options.connect_timeout_ms,
        })
    }

    /// Parse options from TOML and resolve them
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let options: AdapterOptions = toml::from_str(contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        Self::from_options(options)
    }

    /// Load and resolve a TOML configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = config_dir().ok_or_else(|| {
            Error::Config("Unable to determine config directory".to_string())
        })?;

        Ok(config_dir.join("ferry").join("adapter.toml"))
    }

    /// Load the configuration file at [`AdapterConfig::default_config_path`]
    pub fn load_default() -> Result<Self> {
        Self::load(Self::default_config_path()?)
    }

    /// Readiness bound, if one is configured
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }
}

fn required(value: Option<String>, key: &'static str) -> Result<String> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::MissingOption { key }),
    }
}
