use crossplanes_common::{Color, TextureId, Transform};
use glam::Mat4;
use std::path::PathBuf;

use crate::geometry::PlaneGeometry;
use crate::light::DirectionalLight;
use crate::material::PhongMaterial;

/// Where a texture slot's image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureSource {
    pub path: PathBuf,
}

/// A plane mesh positioned relative to its parent group.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub geometry: PlaneGeometry,
    pub material: PhongMaterial,
    pub transform: Transform,
}

/// A parent node grouping meshes under one transform.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub name: String,
    pub transform: Transform,
    pub meshes: Vec<Mesh>,
}

impl Group {
    pub fn new(name: impl Into<String>, transform: Transform) -> Self {
        Self {
            name: name.into(),
            transform,
            meshes: Vec::new(),
        }
    }

    pub fn add(&mut self, mesh: Mesh) {
        self.meshes.push(mesh);
    }
}

/// Everything that gets drawn: background, lights, grouped meshes and the
/// texture slots those meshes sample from.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub background: Color,
    lights: Vec<DirectionalLight>,
    groups: Vec<Group>,
    textures: Vec<TextureSource>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(Color::BLACK)
    }
}

impl Scene {
    pub fn new(background: Color) -> Self {
        Self {
            background,
            lights: Vec::new(),
            groups: Vec::new(),
            textures: Vec::new(),
        }
    }

    pub fn add_light(&mut self, light: DirectionalLight) {
        self.lights.push(light);
    }

    pub fn add_group(&mut self, group: Group) {
        self.groups.push(group);
    }

    /// Register a texture slot and return its id.
    pub fn add_texture(&mut self, path: impl Into<PathBuf>) -> TextureId {
        self.textures.push(TextureSource { path: path.into() });
        TextureId(self.textures.len() - 1)
    }

    pub fn lights(&self) -> &[DirectionalLight] {
        &self.lights
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn textures(&self) -> &[TextureSource] {
        &self.textures
    }

    pub fn texture(&self, id: TextureId) -> Option<&TextureSource> {
        self.textures.get(id.0)
    }

    /// All meshes with their world matrices, in insertion order.
    pub fn meshes(&self) -> impl Iterator<Item = (Mat4, &Mesh)> + '_ {
        self.groups.iter().flat_map(|group| {
            let parent = group.transform.matrix();
            group
                .meshes
                .iter()
                .map(move |mesh| (parent * mesh.transform.matrix(), mesh))
        })
    }

    pub fn mesh_count(&self) -> usize {
        self.groups.iter().map(|g| g.meshes.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn plane(name: &str, x: f32) -> Mesh {
        Mesh {
            name: name.into(),
            geometry: PlaneGeometry::new(0.5, 1.0),
            material: PhongMaterial::default(),
            transform: Transform::from_translation(Vec3::new(x, 0.0, 0.0)),
        }
    }

    #[test]
    fn texture_ids_are_sequential() {
        let mut scene = Scene::default();
        assert_eq!(scene.add_texture("a.png"), TextureId(0));
        assert_eq!(scene.add_texture("b.png"), TextureId(1));
        assert_eq!(scene.texture(TextureId(1)).unwrap().path, PathBuf::from("b.png"));
        assert!(scene.texture(TextureId(2)).is_none());
    }

    #[test]
    fn mesh_world_matrix_includes_parent() {
        let mut scene = Scene::default();
        let mut group = Group::new("rotated", Transform::from_rotation_y(std::f32::consts::FRAC_PI_2));
        group.add(plane("right", 0.25));
        scene.add_group(group);

        let (world, mesh) = scene.meshes().next().unwrap();
        assert_eq!(mesh.name, "right");
        let center = world.transform_point3(Vec3::ZERO);
        assert!((center - Vec3::new(0.0, 0.0, -0.25)).length() < 1e-6);
        assert_eq!(scene.mesh_count(), 1);
    }
}
