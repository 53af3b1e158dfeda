// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Configuration file support for spinwheel.
//!
//! Supports loading the `[spinwheel]` section with the following search order:
//! 1. Path specified via `--config` CLI argument
//! 2. `./spinwheel.toml` (current directory)
//! 3. `~/.config/spinwheel/spinwheel.toml` (XDG config)
//! 4. `/etc/spinwheel/spinwheel.toml` (system-wide)

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use spin_app::{ConfigError, ConfigFile};
use spin_core::math::angle::FULL_TURN_DEG;
use spin_core::presentation::Easing;
use spin_core::wheel::controller::{SettleParams, SpinMachineConfig, DEFAULT_SPEED_PER_FRAME};
use spin_core::{RewardCatalog, SpinTaskConfig};

/// Top-level configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinwheelConfig {
    /// General settings
    pub general: GeneralConfig,
    /// Free spin and settle geometry
    pub wheel: WheelConfig,
    /// Settle animation timing
    pub settle: SettleConfig,
    /// Wedges on the wheel face
    pub catalog: RewardCatalog,
    /// Reward backend
    pub api: ApiConfig,
    /// Offline reward source
    pub simulation: SimulationConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: Option<String>,
    /// Player the rewards are credited to. A random id is used when unset.
    pub player_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelConfig {
    /// Degrees advanced per frame while spinning freely
    pub speed_per_frame: f64,
    /// Frame period in milliseconds
    pub frame_interval_ms: u64,
    /// Full turns added to every settle
    pub extra_rotations: u32,
    /// Screen angle of the pointer
    pub pointer_angle: f64,
    /// Largest landing offset from a wedge center
    pub jitter_max_angle: f64,
    /// Exponent applied to the jitter draw; below 1 favors wedge edges
    pub jitter_edge_bias: f64,
}

impl Default for WheelConfig {
    fn default() -> Self {
        let params = SettleParams::default();
        Self {
            speed_per_frame: DEFAULT_SPEED_PER_FRAME,
            frame_interval_ms: 16,
            extra_rotations: params.extra_rotations,
            pointer_angle: params.pointer_angle,
            jitter_max_angle: params.jitter_max_angle,
            jitter_edge_bias: params.jitter_edge_bias,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SettleConfig {
    pub duration_ms: u64,
    pub easing: Easing,
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            duration_ms: 2200,
            easing: Easing::settle(),
        }
    }
}

/// Reward backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL; the spin endpoint is `{url}/game/spin`
    pub url: Option<String>,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_ms: 10_000,
        }
    }
}

/// Offline reward source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Play without a backend
    pub enabled: bool,
    pub min_latency_ms: u64,
    pub max_latency_ms: u64,
    /// Share of spins that fail, 0.0 to 1.0
    pub failure_rate: f64,
    /// Fixed seed for reproducible rewards
    pub seed: Option<u64>,
    /// Points the simulated player starts with
    pub starting_points: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            min_latency_ms: 150,
            max_latency_ms: 900,
            failure_rate: 0.0,
            seed: None,
            starting_points: 0,
        }
    }
}

impl SpinwheelConfig {
    pub fn check(&self) -> Result<(), String> {
        validate_log_level(self.general.log_level.as_deref())?;

        let wheel = &self.wheel;
        if !wheel.speed_per_frame.is_finite() || wheel.speed_per_frame <= 0.0 {
            return Err("[wheel].speed_per_frame must be > 0".to_string());
        }
        if wheel.frame_interval_ms == 0 {
            return Err("[wheel].frame_interval_ms must be > 0".to_string());
        }
        if !(0.0..FULL_TURN_DEG).contains(&wheel.pointer_angle) {
            return Err("[wheel].pointer_angle must be within 0..360".to_string());
        }
        self.catalog
            .validate()
            .map_err(|e| format!("[catalog]: {}", e))?;
        let half_wedge = self.catalog.segment_width() / 2.0;
        if !(0.0..half_wedge).contains(&wheel.jitter_max_angle) {
            return Err(format!(
                "[wheel].jitter_max_angle must be within 0..{} for {} wedges",
                half_wedge,
                self.catalog.len()
            ));
        }
        if !wheel.jitter_edge_bias.is_finite() || wheel.jitter_edge_bias <= 0.0 {
            return Err("[wheel].jitter_edge_bias must be > 0".to_string());
        }

        if self.settle.duration_ms == 0 {
            return Err("[settle].duration_ms must be > 0".to_string());
        }

        if let Some(url) = &self.api.url {
            if url.trim().is_empty() {
                return Err("[api].url must not be empty when set".to_string());
            }
        }
        if self.api.timeout_ms == 0 {
            return Err("[api].timeout_ms must be > 0".to_string());
        }

        let sim = &self.simulation;
        if sim.min_latency_ms > sim.max_latency_ms {
            return Err("[simulation].min_latency_ms must not exceed max_latency_ms".to_string());
        }
        if !(0.0..=1.0).contains(&sim.failure_rate) {
            return Err("[simulation].failure_rate must be within 0.0..=1.0".to_string());
        }

        Ok(())
    }

    pub fn machine_config(&self) -> SpinMachineConfig {
        SpinMachineConfig {
            catalog: self.catalog.clone(),
            speed_per_frame: self.wheel.speed_per_frame,
            settle: SettleParams {
                extra_rotations: self.wheel.extra_rotations,
                pointer_angle: self.wheel.pointer_angle,
                jitter_max_angle: self.wheel.jitter_max_angle,
                jitter_edge_bias: self.wheel.jitter_edge_bias,
            },
            settle_duration: Duration::from_millis(self.settle.duration_ms),
            easing: self.settle.easing,
        }
    }

    pub fn task_config(&self, player_id: Uuid) -> SpinTaskConfig {
        SpinTaskConfig {
            player_id,
            frame_interval: self.frame_interval(),
            request_timeout: self.request_timeout(),
        }
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.wheel.frame_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.api.timeout_ms)
    }

    /// Generate an example configuration as a TOML string.
    pub fn example_toml() -> String {
        let example = SpinwheelConfig {
            general: GeneralConfig {
                log_level: Some("info".to_string()),
                player_id: Some(Uuid::nil()),
            },
            api: ApiConfig {
                url: Some("http://127.0.0.1:8000".to_string()),
                ..ApiConfig::default()
            },
            ..SpinwheelConfig::default()
        };

        let mut root = toml::Table::new();
        match toml::Value::try_from(&example) {
            Ok(section) => {
                root.insert(Self::section_key().to_string(), section);
            }
            Err(_) => return String::new(),
        }
        toml::to_string_pretty(&root).unwrap_or_default()
    }
}

fn validate_log_level(level: Option<&str>) -> Result<(), String> {
    if let Some(level) = level {
        match level {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(format!(
                    "[general].log_level '{}' is invalid (expected one of: trace, debug, info, warn, error)",
                    level
                ))
            }
        }
    }
    Ok(())
}

impl ConfigFile for SpinwheelConfig {
    fn section_key() -> &'static str {
        "spinwheel"
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.check().map_err(ConfigError::Invalid)
    }
}
