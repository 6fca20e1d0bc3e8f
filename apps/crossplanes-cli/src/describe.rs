use crossplanes_scene::{PerspectiveCamera, Scene};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Serialize)]
pub struct MeshSummary {
    pub name: String,
    pub group: String,
    /// World-space position of the mesh origin.
    pub position: [f32; 3],
    pub width: f32,
    pub height: f32,
    pub color: String,
    pub opacity: f32,
    pub transparent: bool,
    pub texture: Option<String>,
    pub uv_offset: [f32; 2],
    pub uv_repeat: [f32; 2],
}

#[derive(Debug, Serialize)]
pub struct LightSummary {
    pub color: String,
    pub intensity: f32,
    pub direction: [f32; 3],
}

#[derive(Debug, Serialize)]
pub struct SceneSummary {
    pub background: String,
    pub camera_position: [f32; 3],
    pub camera_target: [f32; 3],
    pub fov: f32,
    pub lights: Vec<LightSummary>,
    pub meshes: Vec<MeshSummary>,
}

impl SceneSummary {
    pub fn new(scene: &Scene, camera: &PerspectiveCamera) -> Self {
        let meshes = scene
            .groups()
            .iter()
            .flat_map(|group| {
                let parent = group.transform.matrix();
                group.meshes.iter().map(move |mesh| {
                    let world = parent * mesh.transform.matrix();
                    let map = mesh.material.map;
                    MeshSummary {
                        name: mesh.name.clone(),
                        group: group.name.clone(),
                        position: world.w_axis.truncate().to_array(),
                        width: mesh.geometry.width,
                        height: mesh.geometry.height,
                        color: mesh.material.color.to_string(),
                        opacity: mesh.material.effective_opacity(),
                        transparent: mesh.material.transparent,
                        texture: map
                            .and_then(|m| scene.texture(m.texture))
                            .map(|t| t.path.display().to_string()),
                        uv_offset: map.map_or([0.0, 0.0], |m| m.offset.to_array()),
                        uv_repeat: map.map_or([1.0, 1.0], |m| m.repeat.to_array()),
                    }
                })
            })
            .collect();

        Self {
            background: scene.background.to_string(),
            camera_position: camera.position.to_array(),
            camera_target: camera.target().to_array(),
            fov: camera.fov,
            lights: scene
                .lights()
                .iter()
                .map(|light| LightSummary {
                    color: light.color.to_string(),
                    intensity: light.intensity,
                    direction: light.direction_to_light().to_array(),
                })
                .collect(),
            meshes,
        }
    }
}

impl fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [x, y, z] = self.camera_position;
        let [tx, ty, tz] = self.camera_target;
        writeln!(f, "background: {}", self.background)?;
        writeln!(
            f,
            "camera: fov={} pos=({x:.2}, {y:.2}, {z:.2}) target=({tx:.2}, {ty:.2}, {tz:.2})",
            self.fov
        )?;
        for light in &self.lights {
            let [dx, dy, dz] = light.direction;
            writeln!(
                f,
                "light: {} x{:.2} towards ({dx:.2}, {dy:.2}, {dz:.2})",
                light.color, light.intensity
            )?;
        }
        for mesh in &self.meshes {
            let [x, y, z] = mesh.position;
            writeln!(
                f,
                "mesh {:<12} group={:<8} {}x{} at ({x:.2}, {y:.2}, {z:.2}) color={} opacity={} uv offset={:?} repeat={:?} texture={}",
                mesh.name,
                mesh.group,
                mesh.width,
                mesh.height,
                mesh.color,
                mesh.opacity,
                mesh.uv_offset,
                mesh.uv_repeat,
                mesh.texture.as_deref().unwrap_or("-"),
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossplanes_scene::{SceneConfig, build_scene};

    #[test]
    fn summary_lists_split_halves() {
        let config = SceneConfig::default();
        let scene = build_scene(&config);
        let summary = SceneSummary::new(&scene, &config.camera.build());

        assert_eq!(summary.meshes.len(), 4);
        assert_eq!(summary.lights.len(), 2);
        let left = &summary.meshes[0];
        assert_eq!(left.name, "happy-left");
        assert_eq!(left.group, "happy");
        assert_eq!(left.width, 0.5);
        assert_eq!(left.uv_repeat, [0.5, 1.0]);
        assert_eq!(left.texture.as_deref(), Some("assets/happyface.png"));
        assert!((left.position[0] + 0.25).abs() < 1e-6);
    }

    #[test]
    fn summary_serializes_to_json() {
        let config = SceneConfig::default();
        let scene = build_scene(&config);
        let json = serde_json::to_value(SceneSummary::new(&scene, &config.camera.build())).unwrap();
        assert_eq!(json["meshes"][1]["uv_offset"][0], 0.5);
        assert_eq!(json["background"], "#ffffff");
    }

    #[test]
    fn text_form_mentions_every_mesh() {
        let config = SceneConfig::default();
        let scene = build_scene(&config);
        let text = SceneSummary::new(&scene, &config.camera.build()).to_string();
        for name in ["happy-left", "happy-right", "hmmm-left", "hmmm-right"] {
            assert!(text.contains(name), "missing {name}");
        }
    }
}
