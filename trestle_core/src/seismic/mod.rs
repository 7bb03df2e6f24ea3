//! # Seismic Response Spectrum
//!
//! Builds design response-spectrum curves from a design code and its site
//! parameters, and keeps the point table the user edits.
//!
//! ## Modes
//!
//! [`SeismicSpectrum`] is either in `Code` mode, where the points are derived
//! from [`SpectrumParams`] and regenerated on every parameter change, or in
//! `Manual` mode, where the user owns them. Editing any point while in `Code`
//! mode turns the curve into user data and switches to `Manual`.
//!
//! ## Example
//!
//! ```rust
//! use trestle_core::config::SpectrumConfig;
//! use trestle_core::seismic::{generate_spectrum, IsParams, SoilType, SpectrumParams};
//!
//! let params = SpectrumParams::Is(IsParams::new(5.0, SoilType::Medium));
//! let points = generate_spectrum(&params, &SpectrumConfig::default()).unwrap();
//!
//! assert_eq!(points.len(), 41);
//! assert_eq!(points[0].acceleration, 1.0);
//! assert_eq!(points[3].acceleration, 2.5);
//! ```

pub mod is_code;
pub mod us_code;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{round_to, SpectrumConfig};
use crate::errors::{EngineError, EngineResult};
use crate::warnings::Warning;

pub use is_code::{IsParams, SoilType};
pub use us_code::{DesignValues, SiteClass, UsParams};

/// Decimal places time periods are compared at.
const PERIOD_PLACES: u32 = 6;

/// One sample of a response curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectralPoint {
    pub id: u32,

    /// Period in seconds
    pub time_period: f64,

    /// Spectral acceleration (g)
    pub acceleration: f64,
}

/// Design code and its site parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum SpectrumParams {
    #[serde(rename = "IS")]
    Is(IsParams),
    #[serde(rename = "US")]
    Us(UsParams),
}

impl SpectrumParams {
    pub fn code(&self) -> &'static str {
        match self {
            SpectrumParams::Is(_) => "IS",
            SpectrumParams::Us(_) => "US",
        }
    }
}

/// Generate the full point set for `params` over the configured period grid.
pub fn generate_spectrum(
    params: &SpectrumParams,
    config: &SpectrumConfig,
) -> EngineResult<Vec<SpectralPoint>> {
    let curve: Box<dyn Fn(f64) -> f64> = match params {
        SpectrumParams::Is(is) => {
            is.validate()?;
            let is = is.clone();
            Box::new(move |t| is_code::acceleration(&is, t))
        }
        SpectrumParams::Us(us) => {
            let design = us.design()?;
            debug!(
                sds = design.sds,
                sd1 = design.sd1,
                t0 = design.t0,
                ts = design.ts,
                tl = design.tl,
                "US design values"
            );
            Box::new(move |t| design.acceleration(t))
        }
    };

    let points: Vec<SpectralPoint> = config
        .time_periods()
        .into_iter()
        .enumerate()
        .map(|(i, t)| SpectralPoint {
            id: i as u32 + 1,
            time_period: t,
            acceleration: round_to(curve(t), config.precision),
        })
        .collect();

    info!(code = params.code(), points = points.len(), "generated response spectrum");
    Ok(points)
}

/// Who owns the point list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpectrumMode {
    #[default]
    Manual,
    Code,
}

/// Result of a point edit.
#[derive(Debug, Clone, PartialEq)]
pub enum PointEdit {
    /// The edit was applied to the point with this id
    Applied(u32),
    /// The edit was refused and the list is unchanged
    Rejected(Warning),
}

impl PointEdit {
    pub fn is_applied(&self) -> bool {
        matches!(self, PointEdit::Applied(_))
    }

    pub fn warning(&self) -> Option<&Warning> {
        match self {
            PointEdit::Rejected(w) => Some(w),
            PointEdit::Applied(_) => None,
        }
    }
}

/// Spectrum point table with its Code/Manual mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeismicSpectrum {
    mode: SpectrumMode,
    params: Option<SpectrumParams>,
    points: Vec<SpectralPoint>,
    #[serde(default)]
    config: SpectrumConfig,
}

impl SeismicSpectrum {
    pub fn new(config: SpectrumConfig) -> Self {
        SeismicSpectrum {
            config,
            ..Default::default()
        }
    }

    pub fn mode(&self) -> SpectrumMode {
        self.mode
    }

    pub fn params(&self) -> Option<&SpectrumParams> {
        self.params.as_ref()
    }

    /// Points in insertion order
    pub fn points(&self) -> &[SpectralPoint] {
        &self.points
    }

    /// Points ordered by time period, for charting
    pub fn sorted_points(&self) -> Vec<SpectralPoint> {
        let mut sorted = self.points.clone();
        sorted.sort_by(|a, b| a.time_period.total_cmp(&b.time_period));
        sorted
    }

    /// Switch to `Code` mode and regenerate every point from `params`.
    ///
    /// On invalid parameters nothing changes.
    pub fn switch_to_code(&mut self, params: SpectrumParams) -> EngineResult<()> {
        self.points = generate_spectrum(&params, &self.config)?;
        self.params = Some(params);
        self.mode = SpectrumMode::Code;
        Ok(())
    }

    /// Store new parameters; regenerates when in `Code` mode.
    pub fn update_params(&mut self, params: SpectrumParams) -> EngineResult<()> {
        if self.mode == SpectrumMode::Code {
            self.points = generate_spectrum(&params, &self.config)?;
        }
        self.params = Some(params);
        Ok(())
    }

    /// Keep the current points as user data.
    pub fn switch_to_manual(&mut self) {
        self.mode = SpectrumMode::Manual;
    }

    pub fn add_point(&mut self, time_period: f64, acceleration: f64) -> EngineResult<PointEdit> {
        let time_period = checked_period(time_period, acceleration)?;
        if self.has_period(time_period, None) {
            return Ok(self.reject(time_period));
        }

        let id = self.points.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        self.points.push(SpectralPoint {
            id,
            time_period,
            acceleration,
        });
        self.take_ownership();
        Ok(PointEdit::Applied(id))
    }

    pub fn edit_point(
        &mut self,
        id: u32,
        time_period: f64,
        acceleration: f64,
    ) -> EngineResult<PointEdit> {
        let time_period = checked_period(time_period, acceleration)?;
        let index = self.index_of(id)?;
        if self.has_period(time_period, Some(id)) {
            return Ok(self.reject(time_period));
        }

        let point = &mut self.points[index];
        point.time_period = time_period;
        point.acceleration = acceleration;
        self.take_ownership();
        Ok(PointEdit::Applied(id))
    }

    pub fn remove_point(&mut self, id: u32) -> EngineResult<SpectralPoint> {
        let index = self.index_of(id)?;
        let removed = self.points.remove(index);
        self.take_ownership();
        Ok(removed)
    }

    fn index_of(&self, id: u32) -> EngineResult<usize> {
        self.points
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| {
                EngineError::invalid_input("id", id.to_string(), "No spectral point with this id")
            })
    }

    fn has_period(&self, time_period: f64, except: Option<u32>) -> bool {
        self.points
            .iter()
            .any(|p| Some(p.id) != except && round_to(p.time_period, PERIOD_PLACES) == time_period)
    }

    fn reject(&self, time_period: f64) -> PointEdit {
        let warning = Warning::DuplicateTimePeriod { time_period };
        debug!(%warning, "spectral point edit rejected");
        PointEdit::Rejected(warning)
    }

    fn take_ownership(&mut self) {
        if self.mode == SpectrumMode::Code {
            debug!("point edited in code mode, switching to manual");
            self.mode = SpectrumMode::Manual;
        }
    }
}

fn checked_period(time_period: f64, acceleration: f64) -> EngineResult<f64> {
    if !time_period.is_finite() || time_period < 0.0 {
        return Err(EngineError::invalid_input(
            "time_period",
            time_period.to_string(),
            "Time period must be a finite, non-negative number of seconds",
        ));
    }
    if !acceleration.is_finite() {
        return Err(EngineError::invalid_input(
            "acceleration",
            acceleration.to_string(),
            "Acceleration must be finite",
        ));
    }
    Ok(round_to(time_period, PERIOD_PLACES))
}
