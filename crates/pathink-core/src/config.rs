//! Engine configuration.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use crate::geometry::DEFAULT_BEZIER_SAMPLES;

/// Default snap tolerance in screen pixels.
pub const DEFAULT_SNAP_THRESHOLD_PX: f64 = 10.0;
/// Default grid spacing in canvas units.
pub const DEFAULT_GRID_SIZE: f64 = 20.0;
/// Default minimum interval between geometry updates during a drag.
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 16;

/// Settings for snap resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    /// Snap tolerance in screen pixels (divided by zoom at query time).
    pub threshold_px: f64,
    /// Uniform samples used before Newton refinement on curves.
    pub bezier_samples: usize,
    /// Grid spacing used by the grid snap source.
    pub grid_size: f64,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            threshold_px: DEFAULT_SNAP_THRESHOLD_PX,
            bezier_samples: DEFAULT_BEZIER_SAMPLES,
            grid_size: DEFAULT_GRID_SIZE,
        }
    }
}

/// Settings for drag sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragConfig {
    /// Minimum time between geometry updates, in milliseconds.
    pub frame_interval_ms: u64,
    /// Restore the captured original geometry when a drag is cancelled.
    pub revert_on_cancel: bool,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
            revert_on_cancel: false,
        }
    }
}

impl DragConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub snap: SnapConfig,
    pub drag: DragConfig,
}

impl EngineConfig {
    /// Parse and validate a JSON configuration. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that all values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.snap.threshold_px.is_finite() && self.snap.threshold_px > 0.0) {
            return Err(ConfigError::Invalid {
                field: "snap.threshold_px",
                reason: format!("must be a positive number, got {}", self.snap.threshold_px),
            });
        }
        if self.snap.bezier_samples == 0 {
            return Err(ConfigError::Invalid {
                field: "snap.bezier_samples",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(self.snap.grid_size.is_finite() && self.snap.grid_size > 0.0) {
            return Err(ConfigError::Invalid {
                field: "snap.grid_size",
                reason: format!("must be a positive number, got {}", self.snap.grid_size),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert!((config.snap.threshold_px - 10.0).abs() < f64::EPSILON);
        assert_eq!(config.snap.bezier_samples, 50);
        assert_eq!(config.drag.frame_interval(), Duration::from_millis(16));
        assert!(!config.drag.revert_on_cancel);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EngineConfig::from_json(r#"{ "snap": { "threshold_px": 6.5 } }"#).unwrap();
        assert!((config.snap.threshold_px - 6.5).abs() < f64::EPSILON);
        assert_eq!(config.snap.bezier_samples, DEFAULT_BEZIER_SAMPLES);
        assert_eq!(config.drag, DragConfig::default());
    }

    #[test]
    fn test_rejects_invalid_threshold() {
        let err = EngineConfig::from_json(r#"{ "snap": { "threshold_px": 0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "snap.threshold_px", .. }));
    }

    #[test]
    fn test_rejects_zero_samples() {
        let err = EngineConfig::from_json(r#"{ "snap": { "bezier_samples": 0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "snap.bezier_samples", .. }));
    }

    #[test]
    fn test_malformed_json() {
        let err = EngineConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_json_roundtrip() {
        let mut config = EngineConfig::default();
        config.drag.revert_on_cancel = true;
        let json = config.to_json().unwrap();
        assert_eq!(EngineConfig::from_json(&json).unwrap(), config);
    }
}
