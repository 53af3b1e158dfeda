// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Timing curves for the settle transition.
//!
//! Accepts the same spellings a stylesheet would: the keywords `linear`,
//! `ease`, `ease-in`, `ease-out`, `ease-in-out`, and
//! `cubic-bezier(x1, y1, x2, y2)`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

const NEWTON_ITERATIONS: usize = 8;
const BISECTION_ITERATIONS: usize = 32;
const EPSILON: f64 = 1e-7;

/// A timing function mapping linear progress to eased progress.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Easing {
    Linear,
    CubicBezier { x1: f64, y1: f64, x2: f64, y2: f64 },
}

impl Default for Easing {
    fn default() -> Self {
        Self::settle()
    }
}

impl Easing {
    /// Strong ease-out used for the wheel spin-down.
    pub fn settle() -> Self {
        Self::CubicBezier {
            x1: 0.15,
            y1: 0.85,
            x2: 0.2,
            y2: 1.0,
        }
    }

    pub fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64) -> Result<Self, String> {
        if ![x1, y1, x2, y2].iter().all(|v| v.is_finite()) {
            return Err("cubic-bezier control points must be finite".to_string());
        }
        if !(0.0..=1.0).contains(&x1) || !(0.0..=1.0).contains(&x2) {
            return Err("cubic-bezier x values must be within 0..=1".to_string());
        }
        // y outside 0..=1 overshoots and would turn the wheel backwards
        if !(0.0..=1.0).contains(&y1) || !(0.0..=1.0).contains(&y2) {
            return Err("cubic-bezier y values must be within 0..=1".to_string());
        }
        Ok(Self::CubicBezier { x1, y1, x2, y2 })
    }

    /// Eased progress for linear progress `t`, clamped to `[0, 1]`.
    pub fn sample(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match *self {
            Self::Linear => t,
            Self::CubicBezier { x1, y1, x2, y2 } => {
                if t <= 0.0 || t >= 1.0 {
                    return t;
                }
                let s = solve_curve_x(x1, x2, t);
                bezier(y1, y2, s)
            }
        }
    }
}

/// One axis of a cubic bezier anchored at 0 and 1.
fn bezier(p1: f64, p2: f64, s: f64) -> f64 {
    let inv = 1.0 - s;
    3.0 * inv * inv * s * p1 + 3.0 * inv * s * s * p2 + s * s * s
}

fn bezier_derivative(p1: f64, p2: f64, s: f64) -> f64 {
    let inv = 1.0 - s;
    3.0 * inv * inv * p1 + 6.0 * inv * s * (p2 - p1) + 3.0 * s * s * (1.0 - p2)
}

/// Find the curve parameter whose x equals `x`.
fn solve_curve_x(x1: f64, x2: f64, x: f64) -> f64 {
    let mut s = x;
    for _ in 0..NEWTON_ITERATIONS {
        let err = bezier(x1, x2, s) - x;
        if err.abs() < EPSILON {
            return s;
        }
        let slope = bezier_derivative(x1, x2, s);
        if slope.abs() < EPSILON {
            break;
        }
        s -= err / slope;
    }

    let (mut lo, mut hi) = (0.0, 1.0);
    s = x;
    for _ in 0..BISECTION_ITERATIONS {
        let value = bezier(x1, x2, s);
        if (value - x).abs() < EPSILON {
            break;
        }
        if value < x {
            lo = s;
        } else {
            hi = s;
        }
        s = (lo + hi) / 2.0;
    }
    s
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => write!(f, "linear"),
            Self::CubicBezier { x1, y1, x2, y2 } => {
                write!(f, "cubic-bezier({}, {}, {}, {})", x1, y1, x2, y2)
            }
        }
    }
}

impl FromStr for Easing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "linear" => return Ok(Self::Linear),
            "ease" => return Self::cubic_bezier(0.25, 0.1, 0.25, 1.0),
            "ease-in" => return Self::cubic_bezier(0.42, 0.0, 1.0, 1.0),
            "ease-out" => return Self::cubic_bezier(0.0, 0.0, 0.58, 1.0),
            "ease-in-out" => return Self::cubic_bezier(0.42, 0.0, 0.58, 1.0),
            _ => {}
        }

        let args = s
            .strip_prefix("cubic-bezier(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| format!("unknown easing '{}'", s))?;
        let values = args
            .split(',')
            .map(|v| {
                v.trim()
                    .parse::<f64>()
                    .map_err(|e| format!("invalid cubic-bezier value '{}': {}", v.trim(), e))
            })
            .collect::<Result<Vec<_>, _>>()?;
        match values[..] {
            [x1, y1, x2, y2] => Self::cubic_bezier(x1, y1, x2, y2),
            _ => Err(format!(
                "cubic-bezier takes 4 values, got {}",
                values.len()
            )),
        }
    }
}

impl From<Easing> for String {
    fn from(value: Easing) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for Easing {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
