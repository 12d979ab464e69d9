//! Configuration management for coursekit.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::cipher::Shifts;
use crate::error::{Error, Result};
use crate::pattern::{Canvas, PatternLimits, PatternSpec};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Directory name under the platform config dir.
const CONFIG_DIR_NAME: &str = "coursekit";

/// Environment variable prefix. Nested keys use `__`,
/// e.g. `COURSEKIT_PATTERN__DEPTH=4`.
const ENV_PREFIX: &str = "COURSEKIT_";

/// Hard ceiling for `pattern.max_depth`; `4^10` segments per side is already
/// several million.
const DEPTH_CEILING: u32 = 10;

/// Hard ceiling for `pattern.max_segments`.
const SEGMENT_CEILING: u64 = 10_000_000;

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `COURSEKIT_`)
/// 2. TOML config file at `~/.config/coursekit/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Cipher configuration.
    pub cipher: CipherConfig,
    /// Weather analysis configuration.
    pub weather: WeatherConfig,
    /// Pattern drawing configuration.
    pub pattern: PatternConfig,
}

/// Cipher keys and file locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CipherConfig {
    /// First key. Must be given here or on the command line.
    pub shift1: Option<i64>,
    /// Second key. Must be given here or on the command line.
    pub shift2: Option<i64>,
    /// Plaintext input.
    pub raw_file: PathBuf,
    /// Ciphertext output.
    pub encrypted_file: PathBuf,
    /// Per-character class metadata (JSON).
    pub meta_file: PathBuf,
    /// Decrypted output.
    pub decrypted_file: PathBuf,
}

/// Weather analysis inputs and outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Folder holding the station CSV files.
    pub data_dir: PathBuf,
    /// Folder the three reports are written to.
    pub output_dir: PathBuf,
    /// Seasonal averages report.
    pub averages_file: String,
    /// Global range report.
    pub range_file: String,
    /// Station stability report.
    pub stability_file: String,
}

/// Pattern drawing parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Sides of the base polygon.
    pub sides: u32,
    /// Length of each polygon side in canvas units.
    pub side_length: f64,
    /// Koch recursion depth.
    pub depth: u32,
    /// Largest depth accepted from the command line.
    pub max_depth: u32,
    /// Most segments a single drawing may record.
    pub max_segments: u64,
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Multiplier lifting the polygon above the canvas center.
    pub vertical_offset: f64,
    /// SVG output path.
    pub output: PathBuf,
}

impl Default for CipherConfig {
    fn default() -> Self {
        Self {
            shift1: None,
            shift2: None,
            raw_file: PathBuf::from("raw_text.txt"),
            encrypted_file: PathBuf::from("encrypted_text.txt"),
            meta_file: PathBuf::from("encrypted_text_meta.json"),
            decrypted_file: PathBuf::from("decrypted_text.txt"),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("temperatures"),
            output_dir: PathBuf::from("."),
            averages_file: "average_temp.txt".to_string(),
            range_file: "largest_temp_range_station.txt".to_string(),
            stability_file: "temperature_stability_stations.txt".to_string(),
        }
    }
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            sides: 6,
            side_length: 150.0,
            depth: 3,
            max_depth: 7,
            max_segments: 1_000_000,
            width: 800,
            height: 600,
            vertical_offset: 2.5,
            output: PathBuf::from("pattern.svg"),
        }
    }
}

impl CipherConfig {
    /// Resolve the keys, preferring explicit overrides over configured values.
    ///
    /// # Errors
    ///
    /// Returns an error if a key is set in neither place.
    pub fn shifts(&self, shift1: Option<i64>, shift2: Option<i64>) -> Result<Shifts> {
        let missing = |name: &str| {
            Error::config_validation(format!(
                "{name} is not set; pass --{name} or set cipher.{name}"
            ))
        };
        let s1 = shift1.or(self.shift1).ok_or_else(|| missing("shift1"))?;
        let s2 = shift2.or(self.shift2).ok_or_else(|| missing("shift2"))?;
        Ok(Shifts::new(s1, s2))
    }
}

impl PatternConfig {
    /// The configured canvas.
    #[must_use]
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
            vertical_offset: self.vertical_offset,
        }
    }

    /// Bounds applied to every drawing.
    #[must_use]
    pub fn limits(&self) -> PatternLimits {
        PatternLimits {
            max_depth: self.max_depth,
            max_segments: self.max_segments,
        }
    }

    /// The configured pattern, with optional per-run overrides.
    #[must_use]
    pub fn spec(
        &self,
        sides: Option<u32>,
        side_length: Option<f64>,
        depth: Option<u32>,
    ) -> PatternSpec {
        PatternSpec {
            sides: sides.unwrap_or(self.sides),
            side_length: side_length.unwrap_or(self.side_length),
            depth: depth.unwrap_or(self.depth),
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file that must exist.
    ///
    /// [`Config::load_from`] quietly skips a missing file; this does not.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `path` does not exist, or any error
    /// [`Config::load_from`] returns.
    pub fn load_existing(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::not_found(path));
        }
        Self::load_from(Some(path.to_path_buf()))
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// Only checks what a run can never recover from. Pattern parameters are
    /// validated again per run, since the command line may override them.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let pattern = &self.pattern;

        if pattern.width == 0 || pattern.height == 0 {
            return Err(Error::config_validation(format!(
                "canvas must be non-empty, got {}x{}",
                pattern.width, pattern.height
            )));
        }

        if pattern.max_depth > DEPTH_CEILING {
            return Err(Error::config_validation(format!(
                "max_depth ({}) cannot exceed {DEPTH_CEILING}",
                pattern.max_depth
            )));
        }

        if pattern.max_segments == 0 || pattern.max_segments > SEGMENT_CEILING {
            return Err(Error::config_validation(format!(
                "max_segments ({}) must be between 1 and {SEGMENT_CEILING}",
                pattern.max_segments
            )));
        }

        if !(pattern.side_length.is_finite() && pattern.side_length > 0.0) {
            return Err(Error::config_validation(format!(
                "side_length must be positive, got {}",
                pattern.side_length
            )));
        }

        if !pattern.vertical_offset.is_finite() {
            return Err(Error::config_validation(
                "vertical_offset must be a finite number",
            ));
        }

        Ok(())
    }

    /// Paths of the three weather reports.
    #[must_use]
    pub fn weather_outputs(&self) -> [PathBuf; 3] {
        let w = &self.weather;
        [
            w.output_dir.join(&w.averages_file),
            w.output_dir.join(&w.range_file),
            w.output_dir.join(&w.stability_file),
        ]
    }
}
