use std::time::Duration;

use formats::DEFAULT_BORDER_OBJECT;
use foundation::math::sphere::{EARTH_RADIUS_KM, GLOBE_RADIUS, MARKER_LIFT};
use layers::{PopulationScale, StarfieldSettings};
use scene::{CameraSettings, NearestOptions};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BORDERS_URL: &str = "https://unpkg.com/world-atlas@2/countries-50m.json";
pub const DEFAULT_CITIES_URL: &str = "worldcities.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("viewer config parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid viewer config: {0}")]
    Invalid(String),
    #[error("viewer config cannot change once datasets were requested")]
    Locked,
}

/// Everything the globe view can be tuned with. Every field has a default,
/// so a JSON override only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub borders_url: String,
    /// Object inside the border topology holding the country outlines.
    pub border_object: String,
    pub cities_url: String,
    /// Per-dataset fetch timeout; zero disables it.
    pub fetch_timeout_ms: u64,
    pub globe_radius: f64,
    pub marker_lift: f64,
    pub earth_radius_km: f64,
    pub search_radius_km: f64,
    /// Clamp populations into the reference range before scaling markers.
    pub clamp_population: bool,
    pub camera: CameraSettings,
    pub stars: StarfieldSettings,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            borders_url: DEFAULT_BORDERS_URL.to_string(),
            border_object: DEFAULT_BORDER_OBJECT.to_string(),
            cities_url: DEFAULT_CITIES_URL.to_string(),
            fetch_timeout_ms: 15_000,
            globe_radius: GLOBE_RADIUS,
            marker_lift: MARKER_LIFT,
            earth_radius_km: EARTH_RADIUS_KM,
            search_radius_km: 50.0,
            clamp_population: false,
            camera: CameraSettings::default(),
            stars: StarfieldSettings::default(),
        }
    }
}

impl ViewerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("globe_radius", self.globe_radius),
            ("earth_radius_km", self.earth_radius_km),
            ("search_radius_km", self.search_radius_km),
            ("camera.fov_y_deg", self.camera.fov_y_deg),
            ("camera.near", self.camera.near),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        if self.camera.min_distance <= self.globe_radius {
            return Err(ConfigError::Invalid(format!(
                "camera.min_distance {} must exceed globe_radius {}",
                self.camera.min_distance, self.globe_radius
            )));
        }
        if self.camera.max_distance < self.camera.min_distance {
            return Err(ConfigError::Invalid(
                "camera.max_distance must not be below camera.min_distance".to_string(),
            ));
        }
        if self.borders_url.trim().is_empty() || self.cities_url.trim().is_empty() {
            return Err(ConfigError::Invalid("dataset urls must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        (self.fetch_timeout_ms > 0).then(|| Duration::from_millis(self.fetch_timeout_ms))
    }

    pub fn nearest_options(&self) -> NearestOptions {
        NearestOptions {
            sphere_radius: self.globe_radius,
            earth_radius_km: self.earth_radius_km,
            search_radius_km: self.search_radius_km,
        }
    }

    pub fn population_scale(&self) -> PopulationScale {
        PopulationScale {
            clamp: self.clamp_population,
            ..PopulationScale::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ViewerConfig};
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    #[test]
    fn empty_object_gives_defaults() {
        let config = ViewerConfig::from_json_str("{}").expect("config");
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(config.fetch_timeout(), Some(Duration::from_secs(15)));
        assert_eq!(config.nearest_options().search_radius_km, 50.0);
        assert_eq!(config.camera.min_distance, 5.15);
        assert_eq!(config.stars.count, 2000);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = ViewerConfig::from_json_str(
            r#"{"cities_url":"/data/cities.json","fetch_timeout_ms":0,"camera":{"max_distance":30}}"#,
        )
        .expect("config");
        assert_eq!(config.cities_url, "/data/cities.json");
        assert_eq!(config.fetch_timeout(), None);
        assert_eq!(config.camera.max_distance, 30.0);
        assert_eq!(config.camera.fov_y_deg, 75.0);
        assert_eq!(config.borders_url, super::DEFAULT_BORDERS_URL);
    }

    #[test]
    fn rejects_bad_values() {
        let err = ViewerConfig::from_json_str(r#"{"search_radius_km":-1}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("search_radius_km")));

        let err = ViewerConfig::from_json_str(r#"{"camera":{"min_distance":4}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = ViewerConfig::from_json_str("[").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn clamp_flag_reaches_the_scale() {
        let config = ViewerConfig {
            clamp_population: true,
            ..ViewerConfig::default()
        };
        assert!(config.population_scale().clamp);
    }
}
