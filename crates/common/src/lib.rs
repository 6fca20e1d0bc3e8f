//! Shared value types used across the crossplanes crates.
//!
//! Nothing in here owns GPU or window resources; these are plain values that
//! the scene description, the input layer and the renderers pass around.

mod color;
mod types;

pub use color::{Color, ColorParseError};
pub use types::{SurfaceSize, TextureId, Transform};

pub fn crate_info() -> &'static str {
    "crossplanes-common v0.1.0"
}
