use crossplanes_assets::TextureImage;
use crossplanes_common::{SurfaceSize, TextureId};
use crossplanes_scene::{PerspectiveCamera, Scene};
use std::collections::BTreeMap;

use crate::order::draw_order;

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads the scene and camera and produces output. It never
/// mutates the scene; texture pixels are handed over separately through
/// [`Renderer::set_texture`] as they finish loading.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame of `scene` as seen by `camera`.
    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Self::Output;

    /// Bind decoded pixels to a texture slot, replacing the placeholder.
    fn set_texture(&mut self, id: TextureId, image: &TextureImage);
}

/// Debug text renderer: a GPU-free stand-in for the wgpu backend.
///
/// Produces a human-readable description of what would be drawn, in draw
/// order. Useful for CLI output, logging, and testing the frame discipline.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    textures: BTreeMap<TextureId, SurfaceSize>,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of texture slots that have received pixels.
    pub fn loaded_textures(&self) -> usize {
        self.textures.len()
    }

    pub fn is_loaded(&self, id: TextureId) -> bool {
        self.textures.contains_key(&id)
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "=== Scene (meshes={}, lights={}, background={}) ===\n",
            scene.mesh_count(),
            scene.lights().len(),
            scene.background
        ));
        let (p, t) = (camera.position, camera.target());
        out.push_str(&format!(
            "Camera: pos=({:.2}, {:.2}, {:.2}) target=({:.2}, {:.2}, {:.2}) fov={:.0} aspect={:.3}\n",
            p.x, p.y, p.z, t.x, t.y, t.z, camera.fov, camera.aspect
        ));
        for light in scene.lights() {
            let d = light.direction_to_light();
            out.push_str(&format!(
                "Light: dir=({:.2}, {:.2}, {:.2}) color={} intensity={:.2}\n",
                d.x, d.y, d.z, light.color, light.intensity
            ));
        }

        for item in draw_order(scene, camera) {
            let c = item.world.w_axis;
            let material = &item.mesh.material;
            let texture = match material.map {
                Some(map) => match self.textures.get(&map.texture) {
                    Some(size) => format!(
                        "tex{}[{}x{}] offset=({:.2}, {:.2}) repeat=({:.2}, {:.2})",
                        map.texture.0,
                        size.width,
                        size.height,
                        map.offset.x,
                        map.offset.y,
                        map.repeat.x,
                        map.repeat.y
                    ),
                    None => format!("tex{}[pending]", map.texture.0),
                },
                None => "untextured".to_string(),
            };
            out.push_str(&format!(
                "  [{}] pos=({:.2}, {:.2}, {:.2}) depth={:.2} color={} opacity={:.2} {}\n",
                item.mesh.name,
                c.x,
                c.y,
                c.z,
                item.depth,
                material.color,
                material.effective_opacity(),
                texture
            ));
        }

        out
    }

    fn set_texture(&mut self, id: TextureId, image: &TextureImage) {
        self.textures
            .insert(id, SurfaceSize::new(image.width, image.height));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossplanes_scene::{SceneConfig, build_scene};

    #[test]
    fn debug_renderer_empty_scene() {
        let scene = Scene::default();
        let mut renderer = DebugTextRenderer::new();
        let output = renderer.render(&scene, &PerspectiveCamera::default());

        assert!(output.contains("meshes=0"));
        assert!(output.contains("fov=75"));
    }

    #[test]
    fn debug_renderer_lists_meshes_and_texture_state() {
        let scene = build_scene(&SceneConfig::default());
        let mut renderer = DebugTextRenderer::new();
        let camera = PerspectiveCamera::default();

        let output = renderer.render(&scene, &camera);
        assert!(output.contains("meshes=4"));
        assert_eq!(output.matches("[pending]").count(), 4);

        renderer.set_texture(
            TextureId(0),
            &TextureImage {
                width: 2,
                height: 2,
                pixels: vec![0; 16],
            },
        );
        let output = renderer.render(&scene, &camera);
        assert_eq!(output.matches("[pending]").count(), 2);
        assert_eq!(output.matches("tex0[2x2]").count(), 2);
        assert!(output.contains("opacity=0.50"));
        assert_eq!(renderer.loaded_textures(), 1);
        assert!(renderer.is_loaded(TextureId(0)));
    }
}
