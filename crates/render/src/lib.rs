//! Rendering core: renderer-agnostic interface plus the on-demand frame
//! discipline shared by every backend.
//!
//! # Invariants
//! - At most one frame callback is outstanding at a time; any number of
//!   requests between two frames collapse into one redraw.
//! - The pending flag is cleared before a frame does any work, so a request
//!   raised while drawing schedules a fresh frame instead of being lost.
//! - Renderers never mutate the scene.
//!
//! # Workaround
//! Provides a [`DebugTextRenderer`] and a [`HeadlessTarget`] so the frame
//! discipline can be exercised without a GPU. The wgpu backend implements
//! the same traits.

mod frame;
mod headless;
mod order;
mod renderer;
mod resize;
mod scheduler;

pub use frame::render_frame;
pub use headless::{FrameRecord, HeadlessTarget};
pub use order::{DrawItem, draw_order};
pub use renderer::{DebugTextRenderer, Renderer};
pub use resize::{DrawingSurface, resize_to_display_size};
pub use scheduler::{FrameHost, RenderScheduler, RenderState, RequestOutcome, SchedulerStats};

pub fn crate_info() -> &'static str {
    "crossplanes-render v0.1.0"
}
