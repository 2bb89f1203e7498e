use flycube_camera::CameraSettings;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Errors from loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Wait for vertical sync when presenting.
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Cube app".into(),
            width: 1280,
            height: 720,
            vsync: true,
        }
    }
}

/// Locations of the WGSL sources, relative to the working directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderPaths {
    pub vertex: PathBuf,
    pub fragment: PathBuf,
}

impl Default for ShaderPaths {
    fn default() -> Self {
        Self {
            vertex: PathBuf::from("resources/shader/vert.wgsl"),
            fragment: PathBuf::from("resources/shader/frag.wgsl"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub light_position: Vec3,
    /// Uniform scale applied to the unit cube.
    pub model_scale: f32,
    pub clear_color: [f64; 4],
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            light_position: Vec3::new(0.0, 0.0, 5.0),
            model_scale: 2.0,
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub shaders: ShaderPaths,
    pub camera: CameraSettings,
    pub scene: SceneConfig,
}

impl AppConfig {
    /// Load and validate a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&text)?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate YAML. Missing sections keep their defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
            ConfigError::Invalid {
                field,
                reason: reason.into(),
            }
        }

        if self.window.width == 0 || self.window.height == 0 {
            return Err(invalid(
                "window size",
                format!("{}x{} has a zero dimension", self.window.width, self.window.height),
            ));
        }
        let camera = &self.camera;
        if !camera.position.is_finite() {
            return Err(invalid("camera.position", "must be finite"));
        }
        for (field, value) in [
            ("camera.yaw", camera.yaw),
            ("camera.pitch", camera.pitch),
            ("camera.zoom", camera.zoom),
        ] {
            if !value.is_finite() {
                return Err(invalid(field, format!("{value} is not a finite number")));
            }
        }
        if !camera.speed.is_finite() || camera.speed < 0.0 {
            return Err(invalid(
                "camera.speed",
                format!("{} is not a non-negative number", camera.speed),
            ));
        }
        if !camera.sensitivity.is_finite() {
            return Err(invalid("camera.sensitivity", "must be finite"));
        }
        if camera.near.is_nan() || camera.near <= 0.0 {
            return Err(invalid("camera.near", format!("{} must be positive", camera.near)));
        }
        if camera.far.is_nan() || camera.far <= camera.near {
            return Err(invalid(
                "camera.far",
                format!("{} must be greater than near ({})", camera.far, camera.near),
            ));
        }
        if self.scene.model_scale.is_nan() || self.scene.model_scale <= 0.0 {
            return Err(invalid(
                "scene.model_scale",
                format!("{} must be positive", self.scene.model_scale),
            ));
        }
        if !self.scene.light_position.is_finite() {
            return Err(invalid("scene.light_position", "must be finite"));
        }
        if !self.scene.clear_color.iter().all(|c| c.is_finite()) {
            return Err(invalid("scene.clear_color", "must be finite"));
        }
        Ok(())
    }

    /// Width over height of the configured window.
    pub fn aspect(&self) -> f32 {
        self.window.width as f32 / self.window.height.max(1) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        config.validate().unwrap();
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.window.height, 720);
        assert_eq!(config.scene.model_scale, 2.0);
        assert_eq!(config.camera, CameraSettings::default());
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = AppConfig::from_yaml_str(
            "
window:
  width: 800
camera:
  speed: 2.5
  position: [1.0, 2.0, 3.0]
",
        )
        .unwrap();
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 720);
        assert_eq!(config.camera.speed, 2.5);
        assert_eq!(config.camera.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(config.camera.sensitivity, CameraSettings::default().sensitivity);
        assert_eq!(config.shaders, ShaderPaths::default());
    }

    #[test]
    fn rejects_zero_window() {
        let err = AppConfig::from_yaml_str("window: { height: 0 }").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "window size", .. }));
    }

    #[test]
    fn rejects_inverted_clip_planes() {
        let err = AppConfig::from_yaml_str("camera: { near: 10.0, far: 1.0 }").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "camera.far", .. }));
    }

    #[test]
    fn rejects_negative_speed() {
        let mut config = AppConfig::default();
        config.camera.speed = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_non_finite_camera_angles() {
        let err = AppConfig::from_yaml_str("camera: { zoom: .nan }").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "camera.zoom", .. }));

        let err = AppConfig::from_yaml_str("camera: { yaw: .inf }").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "camera.yaw", .. }));

        let err = AppConfig::from_yaml_str("camera: { pitch: -.inf }").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "camera.pitch", .. }));
    }

    #[test]
    fn rejects_non_finite_scene_values() {
        let err = AppConfig::from_yaml_str("scene: { light_position: [0.0, .nan, 5.0] }")
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "scene.light_position",
                ..
            }
        ));

        let err = AppConfig::from_yaml_str("scene: { clear_color: [0.0, 0.0, .inf, 1.0] }")
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "scene.clear_color",
                ..
            }
        ));
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let err = AppConfig::from_yaml_str("window: [1, 2").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn load_from_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "scene:\n  model_scale: 0.5").unwrap();
        let config = AppConfig::load(tmp.path()).unwrap();
        assert_eq!(config.scene.model_scale, 0.5);
    }

    #[test]
    fn missing_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");
        let err = AppConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("absent.yaml"));
    }
}
