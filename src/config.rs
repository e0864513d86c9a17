use serde::Deserialize;

use crate::constants::*;
use crate::error::ShowreelError;

/// Timing and threshold tunables of one showreel.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ShowreelConfig {
    pub debounce_seconds: f32,
    pub viewport_threshold: f32,
    pub fade_seconds: f32,
    pub swap_delay_seconds: f32,
}

impl Default for ShowreelConfig {
    fn default() -> Self {
        Self {
            debounce_seconds: ROTATION_DEBOUNCE,
            viewport_threshold: VIEWPORT_THRESHOLD,
            fade_seconds: FADE_DURATION,
            swap_delay_seconds: SWAP_DELAY,
        }
    }
}

impl ShowreelConfig {
    pub fn validate(&self) -> Result<(), ShowreelError> {
        let durations = [
            ("debounce_seconds", self.debounce_seconds),
            ("fade_seconds", self.fade_seconds),
            ("swap_delay_seconds", self.swap_delay_seconds),
        ];
        for (name, value) in durations {
            if !value.is_finite() || value < 0.0 {
                return Err(ShowreelError::InvalidConfig(format!(
                    "{name} must be a non-negative number of seconds, got {value}"
                )));
            }
        }
        // A zero threshold would count an element that is entirely off screen
        if !(self.viewport_threshold > 0.0 && self.viewport_threshold <= 1.0) {
            return Err(ShowreelError::InvalidConfig(format!(
                "viewport_threshold must be in (0, 1], got {}",
                self.viewport_threshold
            )));
        }
        Ok(())
    }
}
