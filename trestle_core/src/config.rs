//! # Engine Configuration
//!
//! Tolerances and conventions the engine needs but the caller's data does not
//! carry. Every field has a default, so an empty TOML file (or none at all) is
//! a valid configuration.
//!
//! ## Example
//!
//! ```rust
//! use trestle_core::config::EngineConfig;
//!
//! let config = EngineConfig::from_toml_str(r#"
//!     connection_tolerance = 0.005
//!
//!     [spectrum]
//!     precision = 4
//! "#).unwrap();
//!
//! assert_eq!(config.connection_tolerance, 0.005);
//! assert_eq!(config.spectrum.max_period, 4.0);
//! ```

use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::{EngineError, EngineResult};

/// Default column naming convention
pub const DEFAULT_COLUMN_PATTERN: &str = r"^C\d+$";

/// Engine-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Distance (m) within which two points are considered coincident
    pub connection_tolerance: f64,

    /// Extra clearance (m) added to clash envelopes
    pub clash_tolerance: f64,

    /// Regex that identifies column names during relocation
    pub column_pattern: String,

    /// When set, an element end with no column does not narrow the
    /// relocation band. Off by default: a free end pins the band to the
    /// element's current elevation.
    pub free_ends_unconstrained: bool,

    /// Seismic spectrum sampling settings
    pub spectrum: SpectrumConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            connection_tolerance: 0.001,
            clash_tolerance: 0.0,
            column_pattern: DEFAULT_COLUMN_PATTERN.to_string(),
            free_ends_unconstrained: false,
            spectrum: SpectrumConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML configuration.
    pub fn from_toml_str(text: &str) -> EngineResult<Self> {
        let config: EngineConfig =
            toml::from_str(text).map_err(|e| EngineError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML configuration file.
    pub fn load(path: &Path) -> EngineResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            EngineError::file_error("read config", path.display().to_string(), e.to_string())
        })?;
        Self::from_toml_str(&text)
    }

    /// Check that values are usable.
    pub fn validate(&self) -> EngineResult<()> {
        if !(self.connection_tolerance >= 0.0) {
            return Err(EngineError::config(format!(
                "connection_tolerance must be non-negative, got {}",
                self.connection_tolerance
            )));
        }
        if !(self.clash_tolerance >= 0.0) {
            return Err(EngineError::config(format!(
                "clash_tolerance must be non-negative, got {}",
                self.clash_tolerance
            )));
        }
        self.column_matcher()?;
        self.spectrum.validate()
    }

    /// Compile the column naming pattern.
    pub fn column_matcher(&self) -> EngineResult<ColumnMatcher> {
        ColumnMatcher::new(&self.column_pattern)
    }
}

/// Sampling grid and rounding for generated spectra.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectrumConfig {
    /// Last sampled time period in seconds
    pub max_period: f64,

    /// Sampling step in seconds
    pub step: f64,

    /// Decimal places kept on generated accelerations
    pub precision: u32,
}

impl Default for SpectrumConfig {
    fn default() -> Self {
        SpectrumConfig {
            max_period: 4.0,
            step: 0.1,
            precision: 3,
        }
    }
}

impl SpectrumConfig {
    fn validate(&self) -> EngineResult<()> {
        if !(self.step > 0.0) {
            return Err(EngineError::config(format!(
                "spectrum.step must be positive, got {}",
                self.step
            )));
        }
        if !(self.max_period >= 0.0) {
            return Err(EngineError::config(format!(
                "spectrum.max_period must be non-negative, got {}",
                self.max_period
            )));
        }
        if self.precision > 12 {
            return Err(EngineError::config(format!(
                "spectrum.precision must be at most 12, got {}",
                self.precision
            )));
        }
        Ok(())
    }

    /// Time periods sampled from 0 to `max_period` inclusive.
    ///
    /// Periods are rounded to six decimals so repeated addition of `step`
    /// never produces values like 0.30000000000000004.
    pub fn time_periods(&self) -> Vec<f64> {
        let count = (self.max_period / self.step + 1e-9).floor() as usize;
        (0..=count)
            .map(|i| round_to(i as f64 * self.step, 6))
            .collect()
    }
}

/// Compiled column naming convention.
#[derive(Debug, Clone)]
pub struct ColumnMatcher(Regex);

impl ColumnMatcher {
    pub fn new(pattern: &str) -> EngineResult<Self> {
        Regex::new(pattern)
            .map(ColumnMatcher)
            .map_err(|e| {
                EngineError::config(format!("invalid column_pattern '{}': {}", pattern, e))
            })
    }

    pub fn is_column(&self, name: &str) -> bool {
        self.0.is_match(name)
    }
}

impl Default for ColumnMatcher {
    fn default() -> Self {
        ColumnMatcher(Regex::new(DEFAULT_COLUMN_PATTERN).expect("default column pattern is valid"))
    }
}

/// Round half away from zero to `places` decimals.
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}
