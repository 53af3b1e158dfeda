// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Presentation adapter: turns spin snapshots into a continuous on-screen
//! wheel angle.

pub mod animation;
pub mod easing;
pub mod view;

pub use animation::SettleAnimation;
pub use easing::Easing;
pub use view::WheelView;
