//! The on-demand viewer.
//!
//! [`Viewer`] owns the scene, camera, orbit controls, render scheduler and a
//! render target, and is driven by three kinds of calls from the host:
//!
//! - [`Viewer::start`] once, which draws the first frame unconditionally;
//! - [`Viewer::handle`] for every input, resize or texture-load event, which
//!   at most requests a frame;
//! - [`Viewer::on_frame`] when the host runs a scheduled frame callback.
//!
//! # Invariants
//! - Events never draw directly; they only call `request`.
//! - Every frame clears the pending flag before drawing.

use crossplanes_assets::TextureImage;
use crossplanes_common::TextureId;
use crossplanes_input::{ControlInput, OrbitControls};
use crossplanes_render::{
    DrawingSurface, FrameHost, RenderScheduler, Renderer, RequestOutcome, render_frame,
};
use crossplanes_scene::{PerspectiveCamera, Scene, SceneConfig, build_scene};

/// Something the host observed that may need a redraw.
#[derive(Debug, Clone)]
pub enum ViewerEvent {
    /// Pointer input for the orbit controls.
    Input(ControlInput),
    /// The window was resized. The target's layout size is already current;
    /// the backing buffer catches up on the next frame.
    Resized,
    /// A texture finished decoding.
    TextureLoaded { id: TextureId, image: TextureImage },
    /// Put the camera back where it started.
    ResetView,
}

/// Why a frame was drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameReason {
    /// The unconditional first frame.
    Startup,
    /// A scheduled callback answering one or more requests.
    Requested,
    /// The host needed the contents redrawn (e.g. the window was exposed).
    System,
}

pub struct Viewer<T>
where
    T: DrawingSurface + Renderer,
{
    scene: Scene,
    camera: PerspectiveCamera,
    controls: OrbitControls,
    scheduler: RenderScheduler,
    target: T,
    frames_drawn: u64,
}

impl<T> Viewer<T>
where
    T: DrawingSurface + Renderer,
{
    /// Build the scene and camera from `config` and aim the controls at the
    /// configured target.
    pub fn new(config: &SceneConfig, target: T) -> Self {
        let scene = build_scene(config);
        let mut camera = config.camera.build();
        let mut controls = OrbitControls::new(&camera);
        controls.set_target(config.camera.target);
        controls.update(&mut camera);
        controls.save_state(&camera);

        Self {
            scene,
            camera,
            controls,
            scheduler: RenderScheduler::new(),
            target,
            frames_drawn: 0,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    pub fn controls_mut(&mut self) -> &mut OrbitControls {
        &mut self.controls
    }

    pub fn scheduler(&self) -> &RenderScheduler {
        &self.scheduler
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    /// Draw the first frame without waiting for a request, so something is
    /// on screen before any texture has loaded.
    pub fn start(&mut self) -> T::Output {
        self.draw(FrameReason::Startup)
    }

    /// Route one event. Returns the scheduler outcome if the event asked
    /// for a frame.
    pub fn handle<H>(&mut self, event: ViewerEvent, host: &H) -> Option<RequestOutcome>
    where
        H: FrameHost + ?Sized,
    {
        let needs_frame = match event {
            ViewerEvent::Input(input) => {
                let viewport = self.target.layout_size();
                self.controls.handle(input, &mut self.camera, viewport)
            }
            ViewerEvent::Resized => true,
            ViewerEvent::TextureLoaded { id, .. } if self.scene.texture(id).is_none() => {
                tracing::warn!(texture = id.0, "texture loaded for an unknown slot, ignoring");
                false
            }
            ViewerEvent::TextureLoaded { id, image } => {
                tracing::info!(
                    texture = id.0,
                    width = image.width,
                    height = image.height,
                    "texture ready"
                );
                self.target.set_texture(id, &image);
                true
            }
            ViewerEvent::ResetView => self.controls.reset(&mut self.camera),
        };

        needs_frame.then(|| self.scheduler.request(host))
    }

    /// Ask for a frame directly, e.g. after the surface was lost and
    /// reconfigured.
    pub fn request_frame<H: FrameHost + ?Sized>(&mut self, host: &H) -> RequestOutcome {
        self.scheduler.request(host)
    }

    /// Scheduled frame callback. Draws only if a frame was requested.
    pub fn on_frame(&mut self) -> Option<T::Output> {
        if !self.scheduler.run_if_pending() {
            return None;
        }
        Some(self.render(FrameReason::Requested))
    }

    /// Draw now regardless of pending requests, clearing any that are pending.
    pub fn redraw(&mut self) -> T::Output {
        self.draw(FrameReason::System)
    }

    fn draw(&mut self, reason: FrameReason) -> T::Output {
        self.scheduler.run_if_pending();
        self.render(reason)
    }

    fn render(&mut self, reason: FrameReason) -> T::Output {
        self.frames_drawn += 1;
        let _span = tracing::debug_span!("frame", number = self.frames_drawn).entered();
        tracing::debug!(?reason, "drawing frame");
        render_frame(&mut self.target, &self.scene, &mut self.camera)
    }
}

pub fn crate_info() -> &'static str {
    "crossplanes-viewer v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossplanes_common::SurfaceSize;
    use crossplanes_render::HeadlessTarget;
    use glam::Vec3;

    #[test]
    fn new_viewer_looks_at_configured_target() {
        let mut config = SceneConfig::default();
        config.camera.target = Vec3::new(0.0, 0.25, 0.0);
        let viewer = Viewer::new(&config, HeadlessTarget::new(SurfaceSize::new(640, 480)));

        assert_eq!(viewer.camera().target(), Vec3::new(0.0, 0.25, 0.0));
        assert_eq!(viewer.controls().target(), Vec3::new(0.0, 0.25, 0.0));
        assert_eq!(viewer.scene().mesh_count(), 4);
        assert_eq!(viewer.frames_drawn(), 0);
        assert!(!viewer.scheduler().is_pending());
    }

    #[test]
    fn redraw_clears_pending_request() {
        let mut viewer = Viewer::new(
            &SceneConfig::default(),
            HeadlessTarget::new(SurfaceSize::new(640, 480)),
        );
        let host = || {};
        viewer.handle(ViewerEvent::Resized, &host);
        assert!(viewer.scheduler().is_pending());

        viewer.redraw();
        assert!(!viewer.scheduler().is_pending());
        assert!(viewer.on_frame().is_none());
        assert_eq!(viewer.frames_drawn(), 1);
    }
}
