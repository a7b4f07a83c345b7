//! Service configuration. Settings are layered: built-in defaults, then an
//! optional TOML file, then `BMI_FACE_<SECTION>__<KEY>` environment variables,
//! then `PORT` for hosting platforms that assign one.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "bmi-face.toml";

/// Prefix of the environment overrides
pub const ENV_PREFIX: &str = "BMI_FACE";

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub model: ModelSettings,
    pub preprocess: PreprocessSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Number of actix workers, 0 means one per physical core
    pub workers: usize,
    /// Largest request body the framework will buffer
    pub max_payload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelSettings {
    /// Path to the TorchScript weights
    pub path: PathBuf,
    pub device: DeviceSetting,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeviceSetting {
    Cpu,
    /// Use CUDA when it is available, CPU otherwise
    Cuda,
}

/// Input geometry and per-channel normalization the model was trained with
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PreprocessSettings {
    pub width: u32,
    pub height: u32,
    pub mean: [f32; 3],
    pub std: [f32; 3],
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogSettings {
    /// `tracing_subscriber::EnvFilter` directives
    pub filter: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8000,
            workers: 0,
            max_payload_bytes: 20 * 1024 * 1024,
        }
    }
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("models/bmi_face.pt"),
            device: DeviceSetting::Cpu,
        }
    }
}

impl Default for PreprocessSettings {
    fn default() -> Self {
        Self {
            width: 224,
            height: 224,
            mean: [0.485, 0.456, 0.406],
            std: [0.229, 0.224, 0.225],
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: "info".into(),
        }
    }
}

impl ServerSettings {
    pub fn bind_addr(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

impl Settings {
    /// Load settings from `file` (or the default file, if present) and the
    /// process environment
    pub fn load(file: Option<PathBuf>) -> Result<Self, ConfigError> {
        let source = match file {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        Config::builder()
            .add_source(source)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_override_option("server.port", std::env::var("PORT").ok())?
            .build()?
            .try_deserialize()
    }
}
