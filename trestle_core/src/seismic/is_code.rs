//! Indian-code design spectrum.
//!
//! Spectral acceleration coefficient as a function of period, scaled by a
//! damping multiplier and shaped by the soil coefficient:
//!
//! ```text
//! T < 0.2          d · (1 + 7.5 T)
//! 0.2 ≤ T < 0.5    d · 2.5
//! 0.5 ≤ T < 0.7    d · min(2.5, 1.25 s / T)
//! T ≥ 0.7          d · min(2.5, 1.25 s / 0.7) · (0.7 / T)²
//! ```
//!
//! `d` is the damping multiplier, `s` the soil coefficient.

use serde::{Deserialize, Serialize};

use crate::errors::{EngineError, EngineResult};

/// Damping ratio (% of critical) to spectral multiplier.
const DAMPING_TABLE: [(f64, f64); 9] = [
    (0.0, 3.2),
    (2.0, 1.4),
    (5.0, 1.0),
    (7.0, 0.9),
    (10.0, 0.8),
    (15.0, 0.7),
    (20.0, 0.6),
    (25.0, 0.55),
    (30.0, 0.5),
];

const PLATEAU: f64 = 2.5;
const RISE_END: f64 = 0.2;
const PLATEAU_END: f64 = 0.5;
const DECAY_START: f64 = 0.7;

/// Soil category of the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SoilType {
    Hard,
    #[default]
    Medium,
    Soft,
}

impl SoilType {
    pub fn coefficient(&self) -> f64 {
        match self {
            SoilType::Hard => 1.0,
            SoilType::Medium => 1.36,
            SoilType::Soft => 1.67,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SoilType::Hard => "Hard (Type I)",
            SoilType::Medium => "Medium (Type II)",
            SoilType::Soft => "Soft (Type III)",
        }
    }
}

/// Site parameters for the IS branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsParams {
    /// Damping ratio in percent of critical
    #[serde(default = "default_damping")]
    pub damping_ratio: f64,

    #[serde(default)]
    pub soil: SoilType,
}

fn default_damping() -> f64 {
    5.0
}

impl Default for IsParams {
    fn default() -> Self {
        IsParams {
            damping_ratio: default_damping(),
            soil: SoilType::default(),
        }
    }
}

impl IsParams {
    pub fn new(damping_ratio: f64, soil: SoilType) -> Self {
        IsParams { damping_ratio, soil }
    }

    pub(crate) fn validate(&self) -> EngineResult<()> {
        if !self.damping_ratio.is_finite() || self.damping_ratio < 0.0 {
            return Err(EngineError::invalid_input(
                "damping_ratio",
                self.damping_ratio.to_string(),
                "Damping ratio must be a finite, non-negative percentage",
            ));
        }
        Ok(())
    }

    /// Multiplier from the damping table.
    pub fn damping_multiplier(&self) -> f64 {
        damping_multiplier(self.damping_ratio)
    }
}

/// Linear interpolation in the damping table, clamped at both ends.
pub fn damping_multiplier(ratio: f64) -> f64 {
    let (first_key, first_value) = DAMPING_TABLE[0];
    if ratio <= first_key {
        return first_value;
    }
    for pair in DAMPING_TABLE.windows(2) {
        let (k0, v0) = pair[0];
        let (k1, v1) = pair[1];
        if ratio == k1 {
            return v1;
        }
        if ratio < k1 {
            return v0 + (v1 - v0) * (ratio - k0) / (k1 - k0);
        }
    }
    DAMPING_TABLE[DAMPING_TABLE.len() - 1].1
}

/// Unrounded acceleration coefficient at `period`.
pub fn acceleration(params: &IsParams, period: f64) -> f64 {
    let d = params.damping_multiplier();
    let s = params.soil.coefficient();

    let shape = if period < RISE_END {
        1.0 + 7.5 * period
    } else if period < PLATEAU_END {
        PLATEAU
    } else if period < DECAY_START {
        PLATEAU.min(1.25 * s / period)
    } else {
        PLATEAU.min(1.25 * s / DECAY_START) * (DECAY_START / period).powi(2)
    };
    d * shape
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_damping_table_keys_and_interpolation() {
        assert_relative_eq!(damping_multiplier(5.0), 1.0);
        assert_relative_eq!(damping_multiplier(0.0), 3.2);
        assert_relative_eq!(damping_multiplier(6.0), 0.95);
        assert_relative_eq!(damping_multiplier(12.5), 0.75);
        assert_relative_eq!(damping_multiplier(50.0), 0.5);
    }

    #[test]
    fn test_base_coefficient_at_zero_period() {
        let params = IsParams::new(5.0, SoilType::Hard);
        assert_eq!(acceleration(&params, 0.0), 1.0);
    }

    #[test]
    fn test_pieces() {
        let params = IsParams::new(5.0, SoilType::Hard);
        assert_relative_eq!(acceleration(&params, 0.1), 1.75);
        assert_relative_eq!(acceleration(&params, 0.3), 2.5);
        assert_relative_eq!(acceleration(&params, 0.6), 1.25 / 0.6);
        assert_relative_eq!(acceleration(&params, 1.4), (1.25 / 0.7) * 0.25);
    }

    #[test]
    fn test_soft_soil_stays_on_plateau_longer() {
        let hard = IsParams::new(5.0, SoilType::Hard);
        let soft = IsParams::new(5.0, SoilType::Soft);
        assert_relative_eq!(acceleration(&soft, 0.6), 2.5);
        assert!(acceleration(&soft, 1.0) > acceleration(&hard, 1.0));
    }

    #[test]
    fn test_continuous_at_thresholds() {
        for soil in [SoilType::Hard, SoilType::Medium, SoilType::Soft] {
            let params = IsParams::new(5.0, soil);
            for t in [RISE_END, PLATEAU_END, DECAY_START] {
                assert_relative_eq!(
                    acceleration(&params, t - 1e-12),
                    acceleration(&params, t),
                    epsilon = 1e-9
                );
            }
        }
    }

    #[test]
    fn test_negative_damping_rejected() {
        assert!(IsParams::new(-1.0, SoilType::Hard).validate().is_err());
        assert!(IsParams::new(f64::NAN, SoilType::Hard).validate().is_err());
    }
}
