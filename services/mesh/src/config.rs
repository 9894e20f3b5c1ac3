//! Configuration handling for the mesh keyring.
//!
//! This module reads the local node identity and its keys from a YAML or
//! TOML file, applies environment overrides and validates the result.

use anyhow::{bail, ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Largest key index (12 bits)
pub const MAX_KEY_INDEX: u16 = 0x0fff;

/// Largest TTL a message may be sent with
pub const MAX_TTL: u8 = 0x7f;

/// Environment variable naming the configuration file
pub const KEYRING_ENV: &str = "MESH_KEYRING";

/// Hex encoded 128-bit key, wiped on drop and never printed
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct KeySecret(String);

impl KeySecret {
    /// Wrap a hex string
    pub fn new(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    /// Hex representation
    pub fn expose(&self) -> &str {
        self.0.trim()
    }

    fn validate(&self, what: &str) -> Result<()> {
        let mut raw =
            hex::decode(self.expose()).with_context(|| format!("{what} is not valid hex"))?;
        let len = raw.len();
        raw.zeroize();
        ensure!(len == 16, "{what} must be 16 bytes, got {len}");
        Ok(())
    }
}

impl fmt::Debug for KeySecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeySecret(..)")
    }
}

/// Network key entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetKeyConfig {
    /// Global key index
    pub index: u16,
    /// Key material
    pub key: KeySecret,
}

/// Application key entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppKeyConfig {
    /// Global key index
    pub index: u16,
    /// Index of the network key this key is bound to
    pub net_key_index: u16,
    /// Key material
    pub key: KeySecret,
}

/// Device key entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevKeyConfig {
    /// Primary element address of the node owning the key
    pub address: u16,
    /// Key material
    pub key: KeySecret,
}

/// Mesh keyring configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    /// Unicast address messages are sent from
    pub unicast_address: u16,
    /// Current IV index
    pub iv_index: u32,
    /// TTL used when the caller does not pick one
    pub default_ttl: u8,
    /// Network keys
    pub net_keys: Vec<NetKeyConfig>,
    /// Application keys
    pub app_keys: Vec<AppKeyConfig>,
    /// Device keys of known nodes
    pub dev_keys: Vec<DevKeyConfig>,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            unicast_address: 0x0001,
            iv_index: 0,
            default_ttl: 5,
            net_keys: Vec::new(),
            app_keys: Vec::new(),
            dev_keys: Vec::new(),
        }
    }
}

impl MeshConfig {
    /// Load configuration from file and environment variables.
    ///
    /// The format follows the extension: `.toml` for TOML, `.yaml` or
    /// `.yml` for YAML. A missing file yields the defaults.
    pub fn load_from_file<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let path = config_path.as_ref();

        let mut config = match std::fs::read_to_string(path) {
            Ok(content) => {
                let config = Self::parse(path, &content)
                    .with_context(|| format!("failed to parse config file {path:?}"))?;
                info!("Loaded configuration from {:?}", path);
                config
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                warn!("Config file {:?} not found, using defaults", path);
                Self::default()
            }
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read config file {path:?}"));
            }
        };

        // Override with environment variables
        config.apply_environment_overrides()?;
        config.validate()?;

        info!(
            unicast_address = %format!("{:#06x}", config.unicast_address),
            iv_index = %format!("{:#x}", config.iv_index),
            default_ttl = config.default_ttl,
            net_keys = config.net_keys.len(),
            app_keys = config.app_keys.len(),
            dev_keys = config.dev_keys.len(),
            "Final mesh configuration"
        );

        Ok(config)
    }

    /// Load configuration from the file named by `MESH_KEYRING`, or
    /// `default_path` when the variable is unset
    pub fn load<P: AsRef<Path>>(default_path: P) -> Result<Self> {
        let path = config_path(|name| std::env::var(name).ok(), default_path.as_ref());
        Self::load_from_file(path)
    }

    fn parse(path: &Path, content: &str) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(toml::from_str(content)?),
            Some("yaml") | Some("yml") => Ok(serde_yaml::from_str(content)?),
            other => bail!("unsupported config format {:?}", other.unwrap_or("")),
        }
    }

    /// Apply environment variable overrides
    fn apply_environment_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(iv_index) = lookup("MESH_IV_INDEX") {
            self.iv_index = parse_number(&iv_index).context("MESH_IV_INDEX")?;
            info!("IV index overridden by environment: {:#x}", self.iv_index);
        }

        if let Some(address) = lookup("MESH_UNICAST_ADDRESS") {
            self.unicast_address = parse_number(&address).context("MESH_UNICAST_ADDRESS")?;
            info!("Unicast address overridden by environment: {:#06x}", self.unicast_address);
        }

        if let Some(ttl) = lookup("MESH_DEFAULT_TTL") {
            self.default_ttl = parse_number(&ttl).context("MESH_DEFAULT_TTL")?;
            info!("Default TTL overridden by environment: {}", self.default_ttl);
        }

        Ok(())
    }

    /// Check addresses, TTL, key indexes and key material
    pub fn validate(&self) -> Result<()> {
        ensure!(
            (0x0001..=0x7fff).contains(&self.unicast_address),
            "unicast address {:#06x} is not a unicast address",
            self.unicast_address
        );
        ensure!(
            self.default_ttl <= MAX_TTL,
            "default ttl {:#04x} exceeds {:#04x}",
            self.default_ttl,
            MAX_TTL
        );

        let mut net_indexes = BTreeSet::new();
        for entry in &self.net_keys {
            ensure!(
                entry.index <= MAX_KEY_INDEX,
                "network key index {:#x} exceeds 12 bits",
                entry.index
            );
            ensure!(net_indexes.insert(entry.index), "duplicate network key {:#05x}", entry.index);
            entry.key.validate(&format!("network key {:#05x}", entry.index))?;
        }

        let mut app_indexes = BTreeSet::new();
        for entry in &self.app_keys {
            ensure!(
                entry.index <= MAX_KEY_INDEX,
                "application key index {:#x} exceeds 12 bits",
                entry.index
            );
            ensure!(
                app_indexes.insert(entry.index),
                "duplicate application key {:#05x}",
                entry.index
            );
            ensure!(
                net_indexes.contains(&entry.net_key_index),
                "application key {:#05x} is bound to unknown network key {:#05x}",
                entry.index,
                entry.net_key_index
            );
            entry.key.validate(&format!("application key {:#05x}", entry.index))?;
        }

        let mut addresses = BTreeSet::new();
        for entry in &self.dev_keys {
            ensure!(
                (0x0001..=0x7fff).contains(&entry.address),
                "device key owner {:#06x} is not a unicast address",
                entry.address
            );
            ensure!(
                addresses.insert(entry.address),
                "duplicate device key for {:#06x}",
                entry.address
            );
            entry.key.validate(&format!("device key {:#06x}", entry.address))?;
        }

        if self.net_keys.is_empty() {
            warn!("No network keys configured");
        }

        Ok(())
    }
}

fn config_path<F>(lookup: F, default_path: &Path) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(KEYRING_ENV) {
        Some(path) if !path.is_empty() => {
            info!("Config path overridden by environment: {}", path);
            PathBuf::from(path)
        }
        _ => default_path.to_path_buf(),
    }
}

/// Parse a decimal or `0x` prefixed hexadecimal number
fn parse_number<T>(value: &str) -> Result<T>
where
    T: TryFrom<u64>,
{
    let value = value.trim();
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(digits) => u64::from_str_radix(digits, 16),
        None => value.parse::<u64>(),
    }
    .with_context(|| format!("invalid number {value:?}"))?;

    T::try_from(parsed).map_err(|_| anyhow::anyhow!("{value} is out of range"))
}
