//! Panel configuration
//!
//! Layout is expressed as fractions of the drawing surface so the same
//! configuration works for any canvas size. The configuration serializes with
//! postcard so a host can keep it next to its other settings.

extern crate alloc;

use alloc::vec::Vec;
use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

/// Errors raised while loading a configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The blob is not a postcard-encoded configuration
    #[error("Configuration blob could not be decoded")]
    Decode,

    /// The blob could not be encoded
    #[error("Configuration could not be encoded")]
    Encode,

    /// A value is outside what the panel can work with
    #[error("Invalid configuration: {reason}")]
    Invalid {
        /// Which constraint failed
        reason: &'static str,
    },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Chart geometry as fractions of the canvas
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ChartLayout {
    /// Distance from the left edge to midnight, fraction of width
    pub left: f32,
    /// Distance from the bottom edge to the lowest temperature tick, fraction of height
    pub bottom: f32,
    /// Width of one hour, fraction of width
    pub hour_step: f32,
    /// Height from the lowest to the highest tick, fraction of height
    pub vertical_range: f32,
    /// Height of the top and bottom wheel bands, fraction of height
    pub wheel_band: f32,
}

impl Default for ChartLayout {
    fn default() -> Self {
        Self {
            left: 0.025,
            bottom: 0.152,
            hour_step: 0.03905,
            vertical_range: 0.692,
            wheel_band: 0.2,
        }
    }
}

/// Visible temperature range and the wheel limits around it, in decitemp
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewLimits {
    /// Lower bound shown at start-up
    pub initial_min: i16,
    /// Upper bound shown at start-up
    pub initial_max: i16,
    /// Change per wheel notch
    pub wheel_step: i16,
    /// Smallest range the wheel may zoom into
    pub min_span: i16,
    /// Lowest lower bound
    pub floor: i16,
    /// Highest upper bound
    pub ceiling: i16,
}

impl Default for ViewLimits {
    fn default() -> Self {
        Self {
            initial_min: 120,
            initial_max: 220,
            wheel_step: 10,
            min_span: 40,
            floor: 0,
            ceiling: 250,
        }
    }
}

/// Complete panel configuration
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct PanelConfig {
    pub layout: ChartLayout,
    pub view: ViewLimits,
    /// Manual setpoint change per button press, in decitemp
    pub manual_step: u8,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            layout: ChartLayout::default(),
            view: ViewLimits::default(),
            manual_step: 5,
        }
    }
}

impl PanelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode and validate a postcard blob
    pub fn from_bytes(bytes: &[u8]) -> ConfigResult<Self> {
        let config: Self = postcard::from_bytes(bytes).map_err(|_| ConfigError::Decode)?;
        config.validate()?;
        Ok(config)
    }

    /// Encode as a postcard blob
    pub fn to_bytes(&self) -> ConfigResult<Vec<u8>> {
        postcard::to_allocvec(self).map_err(|_| ConfigError::Encode)
    }

    /// Check the constraints the editor relies on
    pub fn validate(&self) -> ConfigResult<()> {
        let view = &self.view;
        if view.wheel_step <= 0 {
            return Err(ConfigError::Invalid {
                reason: "wheel step must be positive",
            });
        }
        if view.floor < 0 || view.ceiling > i16::from(u8::MAX) || view.floor >= view.ceiling {
            return Err(ConfigError::Invalid {
                reason: "floor and ceiling must lie in 0..=255",
            });
        }
        if view.initial_min < view.floor
            || view.initial_max > view.ceiling
            || view.initial_max - view.initial_min < view.min_span
        {
            return Err(ConfigError::Invalid {
                reason: "initial view must fit the limits",
            });
        }

        let layout = &self.layout;
        let fractions = [
            layout.left,
            layout.bottom,
            layout.hour_step,
            layout.vertical_range,
            layout.wheel_band,
        ];
        if fractions.iter().any(|f| !(*f > 0.0 && *f < 1.0)) {
            return Err(ConfigError::Invalid {
                reason: "layout fractions must lie in (0, 1)",
            });
        }
        if layout.left + 24.0 * layout.hour_step > 1.0 {
            return Err(ConfigError::Invalid {
                reason: "day does not fit the canvas width",
            });
        }
        Ok(())
    }
}
