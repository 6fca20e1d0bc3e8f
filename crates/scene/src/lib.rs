//! Scene description for the crossplanes viewer.
//!
//! A [`Scene`] is plain data: lights, grouped plane meshes and texture slots.
//! It is built once from a [`SceneConfig`] and then only read by renderers.
//!
//! # Invariants
//! - Renderers never mutate the scene; texture pixels live with the renderer.
//! - The camera caches its projection matrix. Changing `aspect`, `fov`,
//!   `near` or `far` has no effect until `update_projection_matrix` is called.

mod builder;
mod camera;
mod config;
mod geometry;
mod light;
mod material;
mod scene;

pub use builder::build_scene;
pub use camera::PerspectiveCamera;
pub use config::{
    CameraConfig, ConfigError, LightConfig, PlaneConfig, PlaneInstanceConfig, SceneConfig,
};
pub use geometry::{PlaneGeometry, PlaneVertex};
pub use light::DirectionalLight;
pub use material::{PhongMaterial, Side, TextureMap};
pub use scene::{Group, Mesh, Scene, TextureSource};

pub fn crate_info() -> &'static str {
    "crossplanes-scene v0.1.0"
}
