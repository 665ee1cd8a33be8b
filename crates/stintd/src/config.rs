//! Configuration for the stint node.
//!
//! Resolution order: environment variables → config file → defaults.
//!
//! Config file location:
//!   1. $STINT_CONFIG (explicit override)
//!   2. $XDG_CONFIG_HOME/stint/config.toml
//!   3. ~/.config/stint/config.toml
//!
//! Wire-format sizes are deliberately absent here: key, IV, block and
//! frame widths are compile-time constants shared with the receiver
//! population and must not be runtime-configurable.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StintConfig {
    pub key: KeyConfig,
    pub link: LinkConfig,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyConfig {
    /// The provisioned AES-192 key, 48 hex chars. Empty = not
    /// provisioned; the node refuses to start. Prefer the STINT_KEY__HEX
    /// environment override so the secret stays out of the file.
    pub hex: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Local bind address for the outbound socket. Port 0 = OS-assigned.
    pub bind: String,
    /// The receiving end of the point-to-point channel.
    pub peer: String,
    /// Logical channel identifier shared with the receiver.
    pub channel: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Telemetry period in milliseconds. One frame per period.
    pub period_ms: u64,
}

// ── Defaults ──────────────────────────────────────────────────────────────────

impl Default for StintConfig {
    fn default() -> Self {
        Self {
            key: KeyConfig::default(),
            link: LinkConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self { hex: String::new() }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:0".to_string(),
            peer: "127.0.0.1:9300".to_string(),
            channel: 0xE8E8_F0F0_E1,
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self { period_ms: 100 }
    }
}

// ── Path helpers ──────────────────────────────────────────────────────────────

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_or_tmp().join(".config"))
        .join("stint")
}

fn home_or_tmp() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
    #[error("failed to write {0}: {1}")]
    WriteFailed(PathBuf, std::io::Error),
    #[error("failed to serialize: {0}")]
    SerializeFailed(toml::ser::Error),
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl StintConfig {
    /// Load config: env vars → file → defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::file_path();
        let mut config = if path.exists() {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadFailed(path.clone(), e))?;
            toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(path.clone(), e))?
        } else {
            StintConfig::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Config file path.
    pub fn file_path() -> PathBuf {
        std::env::var("STINT_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir().join("config.toml"))
    }

    /// Write default config if none exists. Returns the path.
    pub fn write_default_if_missing() -> Result<PathBuf, ConfigError> {
        let path = Self::file_path();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
            }
            let text = toml::to_string_pretty(&StintConfig::default())
                .map_err(ConfigError::SerializeFailed)?;
            std::fs::write(&path, text).map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
        }
        Ok(path)
    }

    /// Apply STINT_* env var overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("STINT_KEY__HEX") {
            self.key.hex = v;
        }
        if let Ok(v) = std::env::var("STINT_LINK__BIND") {
            self.link.bind = v;
        }
        if let Ok(v) = std::env::var("STINT_LINK__PEER") {
            self.link.peer = v;
        }
        if let Ok(v) = std::env::var("STINT_LINK__CHANNEL") {
            if let Some(c) = parse_channel(&v) {
                self.link.channel = c;
            }
        }
        if let Ok(v) = std::env::var("STINT_TELEMETRY__PERIOD_MS") {
            if let Ok(p) = v.parse() {
                self.telemetry.period_ms = p;
            }
        }
    }
}

/// Channel ids are conventionally written in hex ("0xE8E8F0F0E1"), but a
/// plain decimal value is accepted too.
fn parse_channel(v: &str) -> Option<u64> {
    if let Some(hex_digits) = v.strip_prefix("0x").or_else(|| v.strip_prefix("0X")) {
        u64::from_str_radix(hex_digits, 16).ok()
    } else {
        v.parse().ok()
    }
}
