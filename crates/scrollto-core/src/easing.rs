//! Pure easing functions for scroll animations
//!
//! Each function maps a linear progress value in [0, 1] to an eased progress
//! value. All curves except `easeOutElastic` map 0 to 0 and 1 to 1; the
//! elastic curve overshoots and settles just short of 1.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Named easing curve used by a scroll animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Easing {
    EaseInQuad,
    EaseOutQuad,
    #[default]
    EaseInOutQuad,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
    EaseInQuart,
    EaseOutQuart,
    EaseInOutQuart,
    EaseInQuint,
    EaseOutQuint,
    EaseInOutQuint,
    EaseOutElastic,
}

impl Easing {
    /// Every supported easing, in declaration order
    pub const ALL: [Easing; 13] = [
        Easing::EaseInQuad,
        Easing::EaseOutQuad,
        Easing::EaseInOutQuad,
        Easing::EaseInCubic,
        Easing::EaseOutCubic,
        Easing::EaseInOutCubic,
        Easing::EaseInQuart,
        Easing::EaseOutQuart,
        Easing::EaseInOutQuart,
        Easing::EaseInQuint,
        Easing::EaseOutQuint,
        Easing::EaseInOutQuint,
        Easing::EaseOutElastic,
    ];

    /// The name used in configuration files and on the command line
    pub fn name(self) -> &'static str {
        match self {
            Easing::EaseInQuad => "easeInQuad",
            Easing::EaseOutQuad => "easeOutQuad",
            Easing::EaseInOutQuad => "easeInOutQuad",
            Easing::EaseInCubic => "easeInCubic",
            Easing::EaseOutCubic => "easeOutCubic",
            Easing::EaseInOutCubic => "easeInOutCubic",
            Easing::EaseInQuart => "easeInQuart",
            Easing::EaseOutQuart => "easeOutQuart",
            Easing::EaseInOutQuart => "easeInOutQuart",
            Easing::EaseInQuint => "easeInQuint",
            Easing::EaseOutQuint => "easeOutQuint",
            Easing::EaseInOutQuint => "easeInOutQuint",
            Easing::EaseOutElastic => "easeOutElastic",
        }
    }

    /// Apply the easing function to a progress value
    ///
    /// # Arguments
    /// * `t` - Progress value in range [0, 1]
    ///
    /// # Returns
    /// Eased progress value
    #[inline]
    pub fn apply(self, t: f64) -> f64 {
        match self {
            Easing::EaseInQuad => t * t,
            Easing::EaseOutQuad => t * (2.0 - t),
            Easing::EaseInOutQuad => ease_in_out_quad(t),
            Easing::EaseInCubic => t * t * t,
            Easing::EaseOutCubic => {
                let u = t - 1.0;
                u * u * u + 1.0
            }
            Easing::EaseInOutCubic => ease_in_out_cubic(t),
            Easing::EaseInQuart => t * t * t * t,
            Easing::EaseOutQuart => {
                let u = t - 1.0;
                1.0 - u * u * u * u
            }
            Easing::EaseInOutQuart => ease_in_out_quart(t),
            Easing::EaseInQuint => t * t * t * t * t,
            Easing::EaseOutQuint => {
                let u = t - 1.0;
                1.0 + u * u * u * u * u
            }
            Easing::EaseInOutQuint => ease_in_out_quint(t),
            Easing::EaseOutElastic => ease_out_elastic(t),
        }
    }
}

/// Quadratic ease-in-out: 2t² below the midpoint, mirrored above
#[inline]
fn ease_in_out_quad(t: f64) -> f64 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        -1.0 + (4.0 - 2.0 * t) * t
    }
}

#[inline]
fn ease_in_out_cubic(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        (t - 1.0) * (2.0 * t - 2.0) * (2.0 * t - 2.0) + 1.0
    }
}

#[inline]
fn ease_in_out_quart(t: f64) -> f64 {
    if t < 0.5 {
        8.0 * t * t * t * t
    } else {
        let u = t - 1.0;
        1.0 - 8.0 * u * u * u * u
    }
}

#[inline]
fn ease_in_out_quint(t: f64) -> f64 {
    if t < 0.5 {
        16.0 * t * t * t * t * t
    } else {
        let u = t - 1.0;
        1.0 + 16.0 * u * u * u * u * u
    }
}

/// Elastic ease-out: f(t) = 2^(-10t) · sin((t - ¼) · 2π) + 1
#[inline]
fn ease_out_elastic(t: f64) -> f64 {
    2.0_f64.powf(-10.0 * t) * ((t - 0.25) * 2.0 * PI).sin() + 1.0
}

impl FromStr for Easing {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Easing::ALL
            .into_iter()
            .find(|easing| easing.name() == s)
            .ok_or_else(|| Error::UnknownEasing(s.to_string()))
    }
}

impl TryFrom<String> for Easing {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Easing> for String {
    fn from(easing: Easing) -> Self {
        easing.name().to_string()
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easing_boundaries() {
        for easing in Easing::ALL {
            if easing == Easing::EaseOutElastic {
                continue;
            }
            assert!(easing.apply(0.0).abs() < 1e-12, "{:?} at t=0", easing);
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-12, "{:?} at t=1", easing);
        }
    }

    #[test]
    fn test_exact_completion() {
        // Completion is detected by comparing positions, so t=1 must land exactly
        for easing in Easing::ALL {
            if easing != Easing::EaseOutElastic {
                assert_eq!(easing.apply(1.0), 1.0, "{:?}", easing);
            }
        }
    }

    #[test]
    fn test_easing_monotonic() {
        for easing in Easing::ALL {
            if easing == Easing::EaseOutElastic {
                continue;
            }
            let mut prev = 0.0;
            for i in 0..=20 {
                let t = i as f64 / 20.0;
                let v = easing.apply(t);
                assert!(v >= prev - 1e-12, "{:?} not monotonic at t={}", easing, t);
                prev = v;
            }
        }
    }

    #[test]
    fn test_in_out_midpoint() {
        for easing in [
            Easing::EaseInOutQuad,
            Easing::EaseInOutCubic,
            Easing::EaseInOutQuart,
            Easing::EaseInOutQuint,
        ] {
            assert!((easing.apply(0.5) - 0.5).abs() < 1e-12, "{:?}", easing);
        }
    }

    #[test]
    fn test_elastic_overshoots_and_settles() {
        let e = Easing::EaseOutElastic;
        assert!(e.apply(0.0).abs() < 1e-12);
        assert!(e.apply(0.4) > 1.0);
        assert!((e.apply(1.0) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_parse_names() {
        for easing in Easing::ALL {
            assert_eq!(easing.name().parse::<Easing>().unwrap(), easing);
        }
        assert_eq!(Easing::default(), Easing::EaseInOutQuad);
    }

    #[test]
    fn test_unknown_name_fails() {
        let err = "easeInOutBounce".parse::<Easing>().unwrap_err();
        assert!(matches!(err, Error::UnknownEasing(name) if name == "easeInOutBounce"));
        assert!("easeinoutquad".parse::<Easing>().is_err());
    }
}
