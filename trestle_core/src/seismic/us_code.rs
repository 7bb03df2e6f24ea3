//! US-code design spectrum.
//!
//! Site coefficients come from the site-class tables. An input exactly on a
//! table key takes that key's value; an input strictly between two keys takes
//! the mean of the two bracketing values; inputs beyond the table clamp to the
//! nearest end.

use serde::{Deserialize, Serialize};

use crate::errors::{EngineError, EngineResult};

const FA_KEYS: [f64; 5] = [0.25, 0.5, 0.75, 1.0, 1.25];
const FV_KEYS: [f64; 5] = [0.1, 0.2, 0.3, 0.4, 0.5];

/// Site class per soil profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SiteClass {
    A,
    B,
    C,
    #[default]
    D,
    E,
}

impl SiteClass {
    fn fa_row(&self) -> [f64; 5] {
        match self {
            SiteClass::A => [0.8; 5],
            SiteClass::B => [1.0; 5],
            SiteClass::C => [1.2, 1.2, 1.1, 1.0, 1.0],
            SiteClass::D => [1.6, 1.4, 1.2, 1.1, 1.0],
            SiteClass::E => [2.5, 1.7, 1.2, 0.9, 0.9],
        }
    }

    fn fv_row(&self) -> [f64; 5] {
        match self {
            SiteClass::A => [0.8; 5],
            SiteClass::B => [1.0; 5],
            SiteClass::C => [1.7, 1.6, 1.5, 1.4, 1.3],
            SiteClass::D => [2.4, 2.0, 1.8, 1.6, 1.5],
            SiteClass::E => [3.5, 3.2, 2.8, 2.4, 2.4],
        }
    }

    /// Short-period site coefficient for mapped acceleration `ss`
    pub fn fa(&self, ss: f64) -> f64 {
        table_lookup(&FA_KEYS, &self.fa_row(), ss)
    }

    /// Long-period site coefficient for mapped acceleration `s1`
    pub fn fv(&self, s1: f64) -> f64 {
        table_lookup(&FV_KEYS, &self.fv_row(), s1)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SiteClass::A => "A - Hard rock",
            SiteClass::B => "B - Rock",
            SiteClass::C => "C - Very dense soil",
            SiteClass::D => "D - Stiff soil",
            SiteClass::E => "E - Soft clay",
        }
    }
}

fn table_lookup(keys: &[f64; 5], values: &[f64; 5], x: f64) -> f64 {
    if x <= keys[0] {
        return values[0];
    }
    for i in 1..keys.len() {
        if x == keys[i] {
            return values[i];
        }
        if x < keys[i] {
            return (values[i - 1] + values[i]) / 2.0;
        }
    }
    values[values.len() - 1]
}

/// Site parameters for the US branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsParams {
    /// Mapped short-period spectral acceleration (g)
    pub ss: f64,

    /// Mapped 1-second spectral acceleration (g)
    pub s1: f64,

    #[serde(default)]
    pub site_class: SiteClass,

    /// Long-period transition period (s)
    pub tl: f64,
}

impl UsParams {
    pub fn new(ss: f64, s1: f64, site_class: SiteClass, tl: f64) -> Self {
        UsParams { ss, s1, site_class, tl }
    }

    /// Design values; fails on parameters that cannot produce a spectrum.
    ///
    /// A `tl` shorter than `T_S` is raised to `T_S`, so the long-period
    /// decay starts where the plateau ends.
    pub fn design(&self) -> EngineResult<DesignValues> {
        for (field, value) in [("ss", self.ss), ("s1", self.s1)] {
            if !value.is_finite() || value < 0.0 {
                return Err(EngineError::invalid_input(
                    field,
                    value.to_string(),
                    "Mapped acceleration must be a finite, non-negative number",
                ));
            }
        }
        if !self.tl.is_finite() || self.tl <= 0.0 {
            return Err(EngineError::invalid_input(
                "tl",
                self.tl.to_string(),
                "Long-period transition must be positive",
            ));
        }

        let sms = self.site_class.fa(self.ss) * self.ss;
        let sm1 = self.site_class.fv(self.s1) * self.s1;
        let sds = 2.0 / 3.0 * sms;
        let sd1 = 2.0 / 3.0 * sm1;
        if sds <= 0.0 || sd1 <= 0.0 {
            return Err(EngineError::invalid_input(
                if sds <= 0.0 { "ss" } else { "s1" },
                if sds <= 0.0 { self.ss.to_string() } else { self.s1.to_string() },
                "Design spectral acceleration is zero",
            ));
        }

        let ts = sd1 / sds;
        Ok(DesignValues {
            sms,
            sm1,
            sds,
            sd1,
            t0: 0.2 * ts,
            ts,
            tl: self.tl.max(ts),
        })
    }
}

/// Design accelerations and period breakpoints derived from [`UsParams`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DesignValues {
    pub sms: f64,
    pub sm1: f64,
    pub sds: f64,
    pub sd1: f64,
    pub t0: f64,
    pub ts: f64,
    pub tl: f64,
}

impl DesignValues {
    /// Unrounded spectral acceleration at `period`.
    pub fn acceleration(&self, period: f64) -> f64 {
        if period < self.t0 {
            self.sds * (0.4 + 0.6 * period / self.t0)
        } else if period < self.ts {
            self.sds
        } else if period < self.tl {
            self.sd1 / period
        } else {
            self.sd1 * self.tl / (period * period)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_exact_key_uses_table_value() {
        assert_relative_eq!(SiteClass::D.fa(0.5), 1.4);
        assert_relative_eq!(SiteClass::E.fv(0.3), 2.8);
        assert_relative_eq!(SiteClass::C.fa(1.25), 1.0);
    }

    #[test]
    fn test_between_keys_averages_bracketing_values() {
        // 0.3 sits much closer to 0.25, the mean is still taken
        assert_relative_eq!(SiteClass::D.fa(0.3), 1.5);
        assert_relative_eq!(SiteClass::E.fv(0.15), 3.35);
    }

    #[test]
    fn test_outside_table_clamps() {
        assert_relative_eq!(SiteClass::D.fa(0.1), 1.6);
        assert_relative_eq!(SiteClass::D.fa(2.0), 1.0);
        assert_relative_eq!(SiteClass::E.fv(0.9), 2.4);
        assert_relative_eq!(SiteClass::A.fv(0.0), 0.8);
    }

    #[test]
    fn test_design_values() {
        let design = UsParams::new(1.0, 0.4, SiteClass::D, 8.0).design().unwrap();
        assert_relative_eq!(design.sms, 1.1);
        assert_relative_eq!(design.sm1, 0.64);
        assert_relative_eq!(design.sds, 2.2 / 3.0);
        assert_relative_eq!(design.sd1, 1.28 / 3.0);
        assert_relative_eq!(design.ts, 1.28 / 2.2);
        assert_relative_eq!(design.t0, 0.2 * 1.28 / 2.2);
    }

    #[test]
    fn test_pieces() {
        let design = UsParams::new(1.0, 0.4, SiteClass::D, 2.0).design().unwrap();
        assert_relative_eq!(design.acceleration(0.0), 0.4 * design.sds);
        assert_relative_eq!(design.acceleration((design.t0 + design.ts) / 2.0), design.sds);
        assert_relative_eq!(design.acceleration(1.0), design.sd1);
        assert_relative_eq!(design.acceleration(4.0), design.sd1 * 2.0 / 16.0);
    }

    #[test]
    fn test_short_tl_is_raised_to_ts() {
        let design = UsParams::new(0.25, 0.5, SiteClass::E, 0.5).design().unwrap();
        assert!(design.ts > 0.5);
        assert_relative_eq!(design.tl, design.ts);
        assert_relative_eq!(design.acceleration(design.ts - 1e-9), design.sds, epsilon = 1e-6);
        assert_relative_eq!(design.acceleration(design.ts), design.sds, epsilon = 1e-12);
        let doubled = design.acceleration(2.0 * design.ts);
        assert_relative_eq!(doubled, design.sds / 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(UsParams::new(-0.1, 0.4, SiteClass::D, 8.0).design().is_err());
        assert!(UsParams::new(1.0, 0.4, SiteClass::D, 0.0).design().is_err());
        assert!(UsParams::new(0.0, 0.4, SiteClass::D, 8.0).design().is_err());
        assert!(UsParams::new(1.0, 0.0, SiteClass::D, 8.0).design().is_err());
        assert!(UsParams::new(f64::NAN, 0.4, SiteClass::D, 8.0).design().is_err());
    }

    fn site_class() -> impl Strategy<Value = SiteClass> {
        prop_oneof![
            Just(SiteClass::A),
            Just(SiteClass::B),
            Just(SiteClass::C),
            Just(SiteClass::D),
            Just(SiteClass::E),
        ]
    }

    proptest! {
        #[test]
        fn prop_continuous_at_breakpoints(
            ss in 0.05f64..2.0,
            s1 in 0.02f64..1.0,
            class in site_class(),
            tl in 0.1f64..16.0,
        ) {
            let design = UsParams::new(ss, s1, class, tl).design().unwrap();
            let eps = 1e-9;
            for t in [design.t0, design.ts, design.tl] {
                let below = design.acceleration(t - eps);
                let at = design.acceleration(t);
                prop_assert!(
                    (below - at).abs() <= 1e-6 * design.sds.max(1.0),
                    "jump at {}: {} vs {}",
                    t,
                    below,
                    at
                );
            }
        }
    }
}
