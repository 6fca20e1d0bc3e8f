//! wgpu render backend for the crossplanes viewer.
//!
//! Draws the scene's plane meshes with a Blinn-Phong shader, lit by the
//! scene's directional lights, onto a window surface. [`WgpuRenderer`] owns
//! the surface, so it is both the drawing surface and the renderer that the
//! frame loop in `crossplanes-render` drives.
//!
//! # Invariants
//! - Renderer never mutates the scene.
//! - Transparent meshes are drawn after opaque ones, back to front.
//! - Texture slots without pixels sample a 1×1 white placeholder.

mod error;
mod gpu;
mod mesh;
mod shaders;

pub use error::GpuError;
pub use gpu::WgpuRenderer;
