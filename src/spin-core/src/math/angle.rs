// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Degree helpers for an unbounded wheel angle.

/// One full turn of the wheel, in degrees.
pub const FULL_TURN_DEG: f64 = 360.0;

/// Reduce an angle to `[0, 360)`.
pub fn normalize_deg(deg: f64) -> f64 {
    let r = deg.rem_euclid(FULL_TURN_DEG);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0
    if r >= FULL_TURN_DEG {
        0.0
    } else {
        r
    }
}

/// Shortest distance between two angles on the circle, in `[0, 180]`.
pub fn angular_distance(a: f64, b: f64) -> f64 {
    let d = normalize_deg(a - b);
    d.min(FULL_TURN_DEG - d)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_deg() {
        assert_eq!(normalize_deg(0.0), 0.0);
        assert_eq!(normalize_deg(360.0), 0.0);
        assert_eq!(normalize_deg(725.0), 5.0);
        assert_eq!(normalize_deg(-90.0), 270.0);
        assert_eq!(normalize_deg(-1e-15), 0.0);
    }

    #[test]
    fn test_angular_distance_wraps() {
        assert_eq!(angular_distance(350.0, 10.0), 20.0);
        assert_eq!(angular_distance(10.0, 350.0), 20.0);
        assert_eq!(angular_distance(90.0, 270.0), 180.0);
        assert_eq!(angular_distance(45.0, 45.0 + 720.0), 0.0);
    }
}
