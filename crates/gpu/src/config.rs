use serde::{Deserialize, Serialize};

use formats::ConfigError;

/// Renderer tunables. Every field has a default, so `{}` is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub point_size: f64,
    pub fov_y_deg: f64,
    pub near: f64,
    pub far: f64,
    /// Camera distance along +Z before anything has been framed.
    pub initial_camera_distance: f64,
    pub framing_duration_s: f64,
    /// Framing distance as a multiple of the largest bounding-box side.
    pub framing_distance_factor: f64,
    pub resize_quiescence_s: f64,
    /// Override altitude ranges must stay within `±altitude_limit`.
    pub altitude_limit: f64,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            point_size: 0.05,
            fov_y_deg: 75.0,
            near: 0.1,
            far: 1000.0,
            initial_camera_distance: 5.0,
            framing_duration_s: 1.5,
            framing_distance_factor: 2.0,
            resize_quiescence_s: 0.25,
            altitude_limit: 150.0,
        }
    }
}

impl RendererConfig {
    pub fn from_json_str(payload: &str) -> Result<Self, ConfigError> {
        let config: RendererConfig = serde_json::from_str(payload)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.point_size.is_nan() || self.point_size <= 0.0 {
            return Err(ConfigError::Invalid("point_size must be positive".to_string()));
        }
        if !(0.0..180.0).contains(&self.fov_y_deg) || self.fov_y_deg == 0.0 {
            return Err(ConfigError::Invalid(
                "fov_y_deg must be within (0, 180)".to_string(),
            ));
        }
        if self.near.is_nan() || self.near <= 0.0 || self.far.is_nan() || self.far <= self.near {
            return Err(ConfigError::Invalid(
                "clip planes must satisfy 0 < near < far".to_string(),
            ));
        }
        if self.framing_duration_s < 0.0 || self.resize_quiescence_s < 0.0 {
            return Err(ConfigError::Invalid("durations must not be negative".to_string()));
        }
        Ok(())
    }

    pub fn fov_y_rad(&self) -> f64 {
        self.fov_y_deg.to_radians()
    }
}
