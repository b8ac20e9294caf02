//! Configuration file handling for thng-scan.
//!
//! Loads configuration from `<config-dir>/thng-scan/config.toml` or a custom path.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::camera::{CameraSettings, Resolution};

/// Configuration file structure for thng-scan.
/// Loaded from the platform config directory (or a custom path).
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub camera: CameraConfig,
}

#[derive(Debug, Deserialize, Default)]
pub struct ApiConfig {
    /// Override for the API base URL.
    #[serde(default)]
    pub base_url: Option<String>,
    /// API key attached to read requests.
    #[serde(default)]
    pub key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CameraConfig {
    #[serde(default)]
    pub device: u32,
    #[serde(default)]
    pub mirror: bool,
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Requested resolution as `WIDTHxHEIGHT`, e.g. `640x480`.
    #[serde(default)]
    pub resolution: Option<String>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device: 0,
            mirror: false,
            fps: default_fps(),
            resolution: None,
        }
    }
}

fn default_fps() -> u32 {
    30
}

impl CameraConfig {
    /// Build `CameraSettings` from this configuration.
    ///
    /// An unparseable resolution string falls back to the default
    /// resolution rather than failing the whole config load.
    pub fn to_settings(&self) -> CameraSettings {
        let resolution = self
            .resolution
            .as_deref()
            .and_then(parse_resolution)
            .unwrap_or_default();

        CameraSettings {
            device_index: self.device,
            resolution,
            fps: self.fps,
            mirror: self.mirror,
        }
    }
}

fn parse_resolution(s: &str) -> Option<Resolution> {
    let (w, h) = s.split_once('x')?;
    Some(Resolution {
        width: w.trim().parse().ok()?,
        height: h.trim().parse().ok()?,
    })
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
                path: path.clone(),
                source: e,
            })?;
            let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.clone(),
                source: e,
            })?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }
}

/// Default config file location: `<config-dir>/thng-scan/config.toml`.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config")
        })
        .join("thng-scan")
        .join("config.toml")
}

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError { path, source } => {
                write!(
                    f,
                    "Failed to read config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::ParseError { path, source } => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let config = Config::load(Some(Path::new("/nonexistent/config.toml"))).unwrap();
        assert!(config.api.base_url.is_none());
        assert!(config.api.key.is_none());
        assert_eq!(config.camera.device, 0);
        assert_eq!(config.camera.fps, 30);
        assert!(!config.camera.mirror);
    }

    #[test]
    fn test_load_parses_both_tables() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[api]
base_url = "https://api.example.com"
key = "key-abc"

[camera]
device = 1
mirror = true
fps = 15
resolution = "1280x720"
"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(
            config.api.base_url.as_deref(),
            Some("https://api.example.com")
        );
        assert_eq!(config.api.key.as_deref(), Some("key-abc"));
        assert_eq!(config.camera.device, 1);
        assert!(config.camera.mirror);
        assert_eq!(config.camera.fps, 15);

        let settings = config.camera.to_settings();
        assert_eq!(settings.device_index, 1);
        assert_eq!(settings.resolution, Resolution::HIGH);
        assert_eq!(settings.fps, 15);
        assert!(settings.mirror);
    }

    #[test]
    fn test_load_partial_tables_use_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api]\nkey = \"only-a-key\"").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.api.key.as_deref(), Some("only-a-key"));
        assert!(config.api.base_url.is_none());
        assert_eq!(config.camera.fps, 30);
    }

    #[test]
    fn test_load_invalid_toml_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not = [valid").unwrap();

        let result = Config::load(Some(file.path()));
        match result {
            Err(ConfigError::ParseError { path, .. }) => assert_eq!(path, file.path()),
            other => panic!("Expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_to_settings_bad_resolution_falls_back() {
        let config = CameraConfig {
            resolution: Some("garbage".to_string()),
            ..CameraConfig::default()
        };
        assert_eq!(config.to_settings().resolution, Resolution::default());
    }

    #[test]
    fn test_parse_resolution() {
        assert_eq!(
            parse_resolution("640x480"),
            Some(Resolution {
                width: 640,
                height: 480
            })
        );
        assert_eq!(
            parse_resolution("1920 x 1080"),
            Some(Resolution {
                width: 1920,
                height: 1080
            })
        );
        assert_eq!(parse_resolution("640"), None);
        assert_eq!(parse_resolution("ax b"), None);
    }

    #[test]
    fn test_default_path_ends_with_crate_config() {
        let path = default_path();
        assert!(path.ends_with("thng-scan/config.toml"));
    }

    #[test]
    fn test_config_error_display() {
        let error = ConfigError::IoError {
            path: PathBuf::from("/tmp/config.toml"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = format!("{}", error);
        assert!(msg.contains("Failed to read config file"));
        assert!(msg.contains("/tmp/config.toml"));
    }
}
