//! YAML scene configuration.
//!
//! Every field has a default, so a file only needs to name what it changes:
//!
//! ```yaml
//! background: "#202020"
//! split_planes: false
//! instances:
//!   - name: left
//!     color: pink
//!     rotation_y_degrees: 0
//!     texture: textures/left.png
//! ```

use crossplanes_common::Color;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::camera::PerspectiveCamera;

/// Errors from loading or validating a scene configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid scene config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov: f32,
    /// Initial aspect ratio; replaced on the first frame by the surface's own.
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    /// Orbit target the camera looks at.
    pub target: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 75.0,
            aspect: 2.0,
            near: 0.1,
            far: 25.0,
            position: Vec3::new(0.5, 1.0, 0.5),
            target: Vec3::ZERO,
        }
    }
}

impl CameraConfig {
    pub fn build(&self) -> PerspectiveCamera {
        let mut camera = PerspectiveCamera::new(self.fov, self.aspect, self.near, self.far);
        camera.position = self.position;
        camera.look_at(self.target);
        camera
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub color: Color,
    pub intensity: f32,
    pub position: Vec3,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            intensity: 1.0,
            position: Vec3::new(-1.0, 2.0, 4.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaneConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for PlaneConfig {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
        }
    }
}

/// One textured plane standing upright at the origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaneInstanceConfig {
    pub name: String,
    pub color: Color,
    #[serde(default)]
    pub rotation_y_degrees: f32,
    pub texture: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub background: Color,
    pub camera: CameraConfig,
    pub lights: Vec<LightConfig>,
    pub plane: PlaneConfig,
    /// Split each plane into two half-width meshes so crossed planes never
    /// intersect.
    pub split_planes: bool,
    pub opacity: f32,
    pub instances: Vec<PlaneInstanceConfig>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            background: Color::WHITE,
            camera: CameraConfig::default(),
            lights: vec![
                LightConfig {
                    position: Vec3::new(-1.0, 2.0, 4.0),
                    ..LightConfig::default()
                },
                LightConfig {
                    position: Vec3::new(1.0, -1.0, -2.0),
                    ..LightConfig::default()
                },
            ],
            plane: PlaneConfig::default(),
            split_planes: true,
            opacity: 0.5,
            instances: vec![
                PlaneInstanceConfig {
                    name: "happy".into(),
                    color: Color::from_hex(0xffc0cb),
                    rotation_y_degrees: 0.0,
                    texture: PathBuf::from("assets/happyface.png"),
                },
                PlaneInstanceConfig {
                    name: "hmmm".into(),
                    color: Color::from_hex(0xadd8e6),
                    rotation_y_degrees: 90.0,
                    texture: PathBuf::from("assets/hmmmface.png"),
                },
            ],
        }
    }
}

impl SceneConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Load and validate a config file. Relative texture paths written in
    /// the file are resolved against the directory containing it; built-in
    /// default instances keep their paths.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml_str(&yaml)?;

        let names_instances = serde_yaml::from_str::<serde_yaml::Value>(&yaml)?
            .get("instances")
            .is_some();
        if let (true, Some(dir)) = (names_instances, path.parent()) {
            for instance in &mut config.instances {
                if instance.texture.is_relative() {
                    instance.texture = dir.join(&instance.texture);
                }
            }
        }

        tracing::debug!(
            path = %path.display(),
            instances = config.instances.len(),
            "loaded scene config"
        );
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_yaml_string()?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let cam = &self.camera;
        if !(cam.fov > 0.0 && cam.fov < 180.0) {
            return Err(invalid(format!("camera fov {} outside (0, 180)", cam.fov)));
        }
        if !(cam.near > 0.0 && cam.near.is_finite()) {
            return Err(invalid(format!("camera near {} must be positive", cam.near)));
        }
        if !(cam.far > cam.near && cam.far.is_finite()) {
            return Err(invalid(format!(
                "camera far {} must exceed near {}",
                cam.far, cam.near
            )));
        }
        if !(cam.aspect > 0.0 && cam.aspect.is_finite()) {
            return Err(invalid(format!("camera aspect {} must be positive", cam.aspect)));
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(invalid(format!("opacity {} outside [0, 1]", self.opacity)));
        }
        if !(self.plane.width > 0.0 && self.plane.height > 0.0) {
            return Err(invalid(format!(
                "plane size {}x{} must be positive",
                self.plane.width, self.plane.height
            )));
        }
        Ok(())
    }
}

fn invalid(msg: String) -> ConfigError {
    ConfigError::Invalid(msg)
}
