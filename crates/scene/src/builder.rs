use crossplanes_common::{Transform, TextureId};
use glam::Vec3;

use crate::config::{PlaneInstanceConfig, SceneConfig};
use crate::geometry::PlaneGeometry;
use crate::light::DirectionalLight;
use crate::material::{PhongMaterial, Side, TextureMap};
use crate::scene::{Group, Mesh, Scene};

/// Build the scene described by `config`.
///
/// Each plane instance becomes a group rotated about Y. With
/// `split_planes`, the group holds two half-width meshes side by side, each
/// showing its half of the texture, so that two crossed instances meet
/// edge to edge instead of intersecting.
pub fn build_scene(config: &SceneConfig) -> Scene {
    let mut scene = Scene::new(config.background);

    for light in &config.lights {
        scene.add_light(
            DirectionalLight::new(light.color, light.intensity).with_position(light.position),
        );
    }

    for instance in &config.instances {
        let texture = scene.add_texture(instance.texture.clone());
        scene.add_group(build_instance(config, instance, texture));
    }

    tracing::debug!(
        meshes = scene.mesh_count(),
        textures = scene.textures().len(),
        split = config.split_planes,
        "built scene"
    );
    scene
}

fn build_instance(config: &SceneConfig, instance: &PlaneInstanceConfig, texture: TextureId) -> Group {
    let mut group = Group::new(
        instance.name.clone(),
        Transform::from_rotation_y(instance.rotation_y_degrees.to_radians()),
    );
    let material = PhongMaterial {
        color: instance.color,
        map: Some(TextureMap::new(texture)),
        transparent: true,
        opacity: config.opacity,
        side: Side::Double,
        ..PhongMaterial::default()
    };

    if !config.split_planes {
        group.add(Mesh {
            name: instance.name.clone(),
            geometry: PlaneGeometry::new(config.plane.width, config.plane.height),
            material,
            transform: Transform::default(),
        });
        return group;
    }

    let half = PlaneGeometry::new(config.plane.width * 0.5, config.plane.height);
    for (side, x) in [("left", -1.0_f32), ("right", 1.0_f32)] {
        let mut map = TextureMap::new(texture);
        map.offset.x = if x < 0.0 { 0.0 } else { 0.5 };
        map.repeat.x = 0.5;

        group.add(Mesh {
            name: format!("{}-{side}", instance.name),
            geometry: half,
            material: PhongMaterial {
                map: Some(map),
                ..material
            },
            transform: Transform::from_translation(Vec3::new(
                x * config.plane.width * 0.25,
                0.0,
                0.0,
            )),
        });
    }
    group
}
