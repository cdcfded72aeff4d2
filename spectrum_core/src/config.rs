//! Tool configuration via TOML files.
//!
//! Every key is optional; missing sections fall back to the defaults below.
//!
//! ```toml
//! [pipeline]
//! scaling = "min_max"        # or "preserve"
//! output_prefix = "output/"
//! attach_metadata = true
//!
//! [storage]
//! root = "."
//!
//! [logging]
//! level = "info"
//! format = "compact"         # "pretty" | "json"
//! journal = "logs/runs.jsonl"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::logging::LogFormat;
use crate::pipeline::DisplayScaling;

/// Complete configuration loaded from a TOML file.
///
/// # Examples
///
/// ```
/// use spectrum_core::SpectrumConfig;
///
/// let config = SpectrumConfig::from_str("[pipeline]\nscaling = \"preserve\"").unwrap();
/// assert_eq!(config.pipeline.output_prefix, "output/");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpectrumConfig {
    pub pipeline: PipelineConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

impl SpectrumConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(&path)?;
        Self::from_str(&contents)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(toml_str: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig =
            toml::from_str(toml_str).map_err(|err| ConfigError::Parse(err.to_string()))?;

        Ok(Self {
            pipeline: PipelineConfig::try_from(raw.pipeline)?,
            storage: StorageConfig::try_from(raw.storage)?,
            logging: LoggingConfig::try_from(raw.logging)?,
        })
    }
}

/// Orchestrator behavior.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineConfig {
    /// How reconstructed samples are mapped to 8-bit output
    pub scaling: DisplayScaling,
    /// Prefix for derived spectrum keys (`<prefix><stem>_magnitude.png`)
    pub output_prefix: String,
    /// Attach mag_min/mag_max as key-value metadata on both spectrum objects
    pub attach_metadata: bool,
}

impl PipelineConfig {
    fn try_from(raw: RawPipeline) -> Result<Self, ConfigError> {
        let scaling = raw
            .scaling
            .parse::<DisplayScaling>()
            .map_err(ConfigError::Parse)?;
        if raw.output_prefix.starts_with('/') {
            return Err(ConfigError::Parse(
                "pipeline.output_prefix must be relative to the storage root".into(),
            ));
        }

        Ok(Self {
            scaling,
            output_prefix: raw.output_prefix,
            attach_metadata: raw.attach_metadata,
        })
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            scaling: DisplayScaling::default(),
            output_prefix: default_output_prefix(),
            attach_metadata: true,
        }
    }
}

/// Location of the filesystem storage root.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageConfig {
    pub root: PathBuf,
}

impl StorageConfig {
    fn try_from(raw: RawStorage) -> Result<Self, ConfigError> {
        if raw.root.as_os_str().is_empty() {
            return Err(ConfigError::Parse("storage.root must not be empty".into()));
        }
        Ok(Self { root: raw.root })
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
        }
    }
}

/// Diagnostic output settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    pub format: LogFormat,
    /// Optional JSONL file receiving one entry per completed run
    pub journal: Option<PathBuf>,
}

impl LoggingConfig {
    fn try_from(raw: RawLogging) -> Result<Self, ConfigError> {
        let level = raw.level.to_ascii_lowercase();
        if !matches!(
            level.as_str(),
            "trace" | "debug" | "info" | "warn" | "error" | "off"
        ) {
            return Err(ConfigError::Parse(format!(
                "logging.level '{}' is not one of trace, debug, info, warn, error, off",
                raw.level
            )));
        }

        Ok(Self {
            level,
            format: raw.format,
            journal: raw.journal,
        })
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
            journal: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    pipeline: RawPipeline,
    #[serde(default)]
    storage: RawStorage,
    #[serde(default)]
    logging: RawLogging,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPipeline {
    #[serde(default = "default_scaling")]
    scaling: String,
    #[serde(default = "default_output_prefix")]
    output_prefix: String,
    #[serde(default = "default_attach_metadata")]
    attach_metadata: bool,
}

impl Default for RawPipeline {
    fn default() -> Self {
        Self {
            scaling: default_scaling(),
            output_prefix: default_output_prefix(),
            attach_metadata: default_attach_metadata(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawStorage {
    #[serde(default = "default_root")]
    root: PathBuf,
}

impl Default for RawStorage {
    fn default() -> Self {
        Self {
            root: default_root(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawLogging {
    #[serde(default = "default_level")]
    level: String,
    #[serde(default)]
    format: LogFormat,
    #[serde(default)]
    journal: Option<PathBuf>,
}

impl Default for RawLogging {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
            journal: None,
        }
    }
}

fn default_scaling() -> String {
    "min_max".to_string()
}

fn default_output_prefix() -> String {
    "output/".to_string()
}

fn default_attach_metadata() -> bool {
    true
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "IO error: {}", err),
            ConfigError::Parse(err) => write!(f, "Parse error: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        ConfigError::Io(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_sections_missing() {
        let config = SpectrumConfig::from_str("").unwrap();
        assert_eq!(config, SpectrumConfig::default());
        assert_eq!(config.pipeline.scaling, DisplayScaling::MinMax);
        assert!(config.pipeline.attach_metadata);
        assert_eq!(config.storage.root, PathBuf::from("."));
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.journal.is_none());
    }

    #[test]
    fn parses_custom_values() {
        let toml = r#"
[pipeline]
scaling = "preserve"
output_prefix = "spectra/"
attach_metadata = false

[storage]
root = "/srv/images"

[logging]
level = "DEBUG"
format = "json"
journal = "logs/runs.jsonl"
"#;
        let config = SpectrumConfig::from_str(toml).unwrap();
        assert_eq!(config.pipeline.scaling, DisplayScaling::Preserve);
        assert_eq!(config.pipeline.output_prefix, "spectra/");
        assert!(!config.pipeline.attach_metadata);
        assert_eq!(config.storage.root, PathBuf::from("/srv/images"));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(
            config.logging.journal,
            Some(PathBuf::from("logs/runs.jsonl"))
        );
    }

    #[test]
    fn rejects_unknown_scaling() {
        let err = SpectrumConfig::from_str("[pipeline]\nscaling = \"log\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn rejects_absolute_prefix() {
        assert!(SpectrumConfig::from_str("[pipeline]\noutput_prefix = \"/out/\"").is_err());
    }

    #[test]
    fn rejects_unknown_level() {
        assert!(SpectrumConfig::from_str("[logging]\nlevel = \"chatty\"").is_err());
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(SpectrumConfig::from_str("[pipeline]\nscale = \"preserve\"").is_err());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = SpectrumConfig::load_from_file("does/not/exist.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn shipped_sample_matches_defaults() {
        let config = SpectrumConfig::from_str(include_str!("../../config/fft_tool.toml")).unwrap();
        assert_eq!(config, SpectrumConfig::default());
    }
}
