//! Input bridge: platform-neutral pointer events and orbit camera controls.
//!
//! # Invariants
//! - Controls only move the camera from inside `handle`/`update`; every call
//!   that moved it reports `true` so the caller can request a redraw.
//! - Nothing here depends on the windowing backend. Apps translate their
//!   native events into [`ControlInput`].

pub mod control;
pub mod orbit;

pub use control::{ControlInput, PointerButton};
pub use orbit::OrbitControls;

pub fn crate_info() -> &'static str {
    "crossplanes-input v0.1.0"
}
