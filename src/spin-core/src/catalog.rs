// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Reward catalog: which point values sit on the wheel face and where.

use serde::{Deserialize, Serialize};

use crate::math::angle::{normalize_deg, FULL_TURN_DEG};

/// One wedge of the wheel face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Reward amount shown on the wedge.
    pub points: u32,
    /// Explicit center angle on the wheel face. When absent the center is
    /// derived from the segment's position in the catalog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center_deg: Option<f64>,
}

impl Segment {
    pub fn new(points: u32, center_deg: Option<f64>) -> Self {
        Self { points, center_deg }
    }
}

/// Ordered set of reward amounts with their wheel-face center angles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardCatalog {
    pub segments: Vec<Segment>,
}

impl Default for RewardCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl RewardCatalog {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// The four-wedge wheel artwork. Wedges are not laid out in catalog
    /// order, so every center is listed explicitly.
    pub fn standard() -> Self {
        Self::new(vec![
            Segment::new(300, Some(225.0)),
            Segment::new(1000, Some(315.0)),
            Segment::new(500, Some(45.0)),
            Segment::new(3000, Some(135.0)),
        ])
    }

    /// Build a catalog of evenly spaced wedges with computed centers.
    pub fn evenly_spaced(points: &[u32]) -> Self {
        Self::new(points.iter().map(|&p| Segment::new(p, None)).collect())
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = u32> + '_ {
        self.segments.iter().map(|s| s.points)
    }

    pub fn contains(&self, points: u32) -> bool {
        self.position(points).is_some()
    }

    /// Index of `points` in the canonical segment ordering.
    pub fn position(&self, points: u32) -> Option<usize> {
        self.segments.iter().position(|s| s.points == points)
    }

    /// Angular width of one wedge.
    pub fn segment_width(&self) -> f64 {
        FULL_TURN_DEG / self.segments.len().max(1) as f64
    }

    /// Center angle of the wedge for `points`, in `[0, 360)`.
    ///
    /// Uses the explicit center when the catalog lists one. Otherwise the
    /// center is `360 - index * width - width / 2`, where values missing from
    /// the catalog take index 0.
    pub fn center_angle(&self, points: u32) -> f64 {
        let index = self.position(points);
        if let Some(center) = index.and_then(|i| self.segments[i].center_deg) {
            return normalize_deg(center);
        }
        let width = self.segment_width();
        let index = index.unwrap_or(0) as f64;
        normalize_deg(FULL_TURN_DEG - index * width - width / 2.0)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.segments.is_empty() {
            return Err("reward catalog must contain at least one segment".to_string());
        }
        for (i, segment) in self.segments.iter().enumerate() {
            if self.segments[..i].iter().any(|s| s.points == segment.points) {
                return Err(format!(
                    "reward catalog lists {} points more than once",
                    segment.points
                ));
            }
            if let Some(center) = segment.center_deg {
                if !center.is_finite() {
                    return Err(format!(
                        "center_deg for {} points must be a finite number",
                        segment.points
                    ));
                }
            }
        }
        Ok(())
    }
}
