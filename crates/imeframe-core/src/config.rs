// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Engine configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ImeframeError, Result};

/// What happens when one keyboard listener fails during fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FanOutPolicy {
    /// Log the failure and keep notifying later listeners.
    #[default]
    BestEffort,
    /// Stop at the first failure and surface it to the caller.
    Strict,
}

/// Tunables for one keyboard session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Listener failure isolation.
    pub fan_out: FanOutPolicy,
    /// Re-run navigation-bar classification when the host reports an
    /// orientation change. When false the first classification holds for the
    /// whole session.
    pub reclassify_on_orientation_change: bool,
    /// Rounded-corner inset used for rounded-corner devices whose resources do
    /// not publish one.
    pub rounded_corner_inset_dp: f32,
    /// Minimum distance between the visible bottom and the screen bottom for
    /// the keyboard to be considered open by the quick status check.
    pub min_keyboard_height_dp: f32,
    /// Also push an absolute top/height for the content view, not just its size.
    pub push_positions: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fan_out: FanOutPolicy::BestEffort,
            reclassify_on_orientation_change: false,
            rounded_corner_inset_dp: 24.0,
            min_keyboard_height_dp: 60.0,
            push_positions: true,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON configuration. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    fn validate(&self) -> Result<()> {
        if !self.rounded_corner_inset_dp.is_finite() || self.rounded_corner_inset_dp < 0.0 {
            return Err(ImeframeError::Config(format!(
                "rounded_corner_inset_dp must be a non-negative number, got {}",
                self.rounded_corner_inset_dp
            )));
        }
        if !self.min_keyboard_height_dp.is_finite() || self.min_keyboard_height_dp < 0.0 {
            return Err(ImeframeError::Config(format!(
                "min_keyboard_height_dp must be a non-negative number, got {}",
                self.min_keyboard_height_dp
            )));
        }
        Ok(())
    }
}
