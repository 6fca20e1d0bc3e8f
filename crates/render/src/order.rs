use crossplanes_scene::{Mesh, PerspectiveCamera, Scene};
use glam::{Mat4, Vec3};

/// A mesh ready to draw, with its world matrix and view depth.
#[derive(Debug, Clone, Copy)]
pub struct DrawItem<'a> {
    pub world: Mat4,
    pub mesh: &'a Mesh,
    /// Distance of the mesh origin along the camera's view direction.
    pub depth: f32,
}

/// Order meshes for drawing: opaque meshes front to back, then transparent
/// meshes back to front. Ties keep scene order.
///
/// Back-to-front blending is only correct for meshes that do not intersect,
/// which is why crossed planes are split into halves.
pub fn draw_order<'a>(scene: &'a Scene, camera: &PerspectiveCamera) -> Vec<DrawItem<'a>> {
    let forward = camera.forward();
    let (mut transparent, mut opaque): (Vec<_>, Vec<_>) = scene
        .meshes()
        .map(|(world, mesh)| DrawItem {
            world,
            mesh,
            depth: (world.transform_point3(Vec3::ZERO) - camera.position).dot(forward),
        })
        .partition(|item| item.mesh.material.transparent);

    opaque.sort_by(|a, b| a.depth.total_cmp(&b.depth));
    transparent.sort_by(|a, b| b.depth.total_cmp(&a.depth));
    opaque.extend(transparent);
    opaque
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossplanes_scene::{SceneConfig, build_scene};

    fn names<'a>(items: &[DrawItem<'a>]) -> Vec<&'a str> {
        items.iter().map(|i| i.mesh.name.as_str()).collect()
    }

    #[test]
    fn transparent_halves_draw_back_to_front() {
        let scene = build_scene(&SceneConfig::default());
        let mut camera = PerspectiveCamera::default();
        camera.position = Vec3::new(0.0, 0.0, 3.0);
        camera.look_at(Vec3::ZERO);

        let order = draw_order(&scene, &camera);
        assert_eq!(
            names(&order),
            vec!["hmmm-right", "happy-left", "happy-right", "hmmm-left"]
        );
        for pair in order.windows(2) {
            assert!(pair[0].depth >= pair[1].depth);
        }
    }

    #[test]
    fn opaque_meshes_come_first() {
        let config = SceneConfig {
            split_planes: false,
            ..SceneConfig::default()
        };
        let mut scene = build_scene(&config);
        let mut group = scene.groups()[0].clone();
        group.name = "solid".into();
        group.meshes[0].name = "solid".into();
        group.meshes[0].material.transparent = false;
        scene.add_group(group);

        let camera = PerspectiveCamera::default();
        let order = draw_order(&scene, &camera);
        assert_eq!(order.len(), 3);
        assert_eq!(order[0].mesh.name, "solid");
    }
}
