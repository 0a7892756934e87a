use crate::defaults;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub audio: AudioConfig,
    pub transcribe: TranscribeConfig,
    /// Asset catalog: opaque asset id → local media file path.
    pub assets: HashMap<String, PathBuf>,
}

/// WebSocket server configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
}

/// Audio decoding configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub ffmpeg_path: String,
    pub sample_rate: u32,
    pub chunk_size: usize,
}

/// Transcription backend configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TranscribeConfig {
    /// WebSocket endpoint of the streaming transcription service.
    pub endpoint: String,
    /// Fallback language code when the client's source locale is empty.
    pub default_language: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: defaults::BIND_ADDR.to_string(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: defaults::FFMPEG_BIN.to_string(),
            sample_rate: defaults::SAMPLE_RATE,
            chunk_size: defaults::CHUNK_SIZE,
        }
    }
}

impl Default for TranscribeConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            default_language: defaults::LANGUAGE_CODE.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if the file
    /// doesn't exist.
    ///
    /// Only returns defaults if the file is missing; invalid TOML is an
    /// error.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Ok(Self::default())
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - SUBWIRE_BIND_ADDR → server.bind_addr
    /// - SUBWIRE_FFMPEG → audio.ffmpeg_path
    /// - SUBWIRE_TRANSCRIBE_ENDPOINT → transcribe.endpoint
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(addr) = std::env::var("SUBWIRE_BIND_ADDR")
            && !addr.is_empty()
        {
            self.server.bind_addr = addr;
        }

        if let Ok(ffmpeg) = std::env::var("SUBWIRE_FFMPEG")
            && !ffmpeg.is_empty()
        {
            self.audio.ffmpeg_path = ffmpeg;
        }

        if let Ok(endpoint) = std::env::var("SUBWIRE_TRANSCRIBE_ENDPOINT")
            && !endpoint.is_empty()
        {
            self.transcribe.endpoint = endpoint;
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/subwire/config.toml on Linux
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("subwire").join("config.toml"))
    }
}
