// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Single-line terminal rendering of the wheel.

use std::io::Write;
use std::sync::Arc;

use spin_core::math::angle::{angular_distance, normalize_deg};
use spin_core::wheel::controller::SpinListener;
use spin_core::{RewardCatalog, RewardOutcome, SpinPhase, SpinSnapshot};

/// Wedge currently under the pointer for a wheel drawn at `angle`.
///
/// A wedge centered at `c` on the wheel face appears at `c + angle` on
/// screen.
pub fn wedge_under_pointer(catalog: &RewardCatalog, angle: f64, pointer_angle: f64) -> Option<u32> {
    catalog
        .points()
        .map(|points| {
            let on_screen = normalize_deg(catalog.center_angle(points) + angle);
            (points, angular_distance(on_screen, pointer_angle))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(points, _)| points)
}

/// Status line for one frame.
pub fn render_line(
    snapshot: &SpinSnapshot,
    catalog: &RewardCatalog,
    visual_angle: f64,
    pointer_angle: f64,
) -> String {
    let wedge = wedge_under_pointer(catalog, visual_angle, pointer_angle)
        .map(|p| p.to_string())
        .unwrap_or_else(|| "-".to_string());
    let mut line = format!(
        "[{:>8}] {:>6.1}° ▼ {:>5}",
        snapshot.phase, visual_angle, wedge
    );

    if let Some(status) = &snapshot.status_text {
        line.push_str("  ");
        line.push_str(status);
    } else if let Some(error) = &snapshot.error_text {
        line.push_str("  ! ");
        line.push_str(error);
    } else if snapshot.has_result_ready() {
        line.push_str("  [a] collect");
    } else if snapshot.phase == SpinPhase::Idle {
        line.push_str("  [s] spin");
    } else if snapshot.phase == SpinPhase::Spinning {
        line.push_str("  [s] stop");
    }
    line
}

/// Overwrite the current terminal line.
pub fn draw(line: &str) {
    let mut out = std::io::stdout().lock();
    let _ = write!(out, "\r\x1b[2K{}", line);
    let _ = out.flush();
}

/// Prints the reward once the wheel has come to rest.
pub struct RewardPrinter;

impl RewardPrinter {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self)
    }
}

impl SpinListener for RewardPrinter {
    fn on_spin_complete(&self, outcome: &RewardOutcome) {
        println!(
            "\r\x1b[2K+{} points! You now have {} points.",
            outcome.points_gained, outcome.total_points_after
        );
    }

    fn on_spin_failed(&self, message: &str) {
        println!("\r\x1b[2K{}", message);
    }
}
