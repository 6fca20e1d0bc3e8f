use crossplanes_assets::TextureImage;
use crossplanes_common::{SurfaceSize, TextureId};
use crossplanes_scene::{PerspectiveCamera, Scene};
use glam::Mat4;

use crate::renderer::{DebugTextRenderer, Renderer};
use crate::resize::DrawingSurface;

/// Backing size of a freshly created surface, before the first resize.
const INITIAL_BACKING: SurfaceSize = SurfaceSize::new(300, 150);

/// What one headless frame saw.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    /// 1-based frame counter.
    pub number: u64,
    pub backing: SurfaceSize,
    pub aspect: f32,
    pub projection: Mat4,
    pub textures_ready: usize,
    pub text: String,
}

/// An in-memory drawing surface wrapped around [`DebugTextRenderer`].
///
/// The layout size plays the role of the window size and is changed with
/// [`HeadlessTarget::set_layout_size`]; the backing size only changes through
/// the resize detector. Every rendered frame is recorded.
#[derive(Debug)]
pub struct HeadlessTarget {
    layout: SurfaceSize,
    backing: SurfaceSize,
    renderer: DebugTextRenderer,
    frames: Vec<FrameRecord>,
}

impl HeadlessTarget {
    pub fn new(layout: SurfaceSize) -> Self {
        Self {
            layout,
            backing: INITIAL_BACKING,
            renderer: DebugTextRenderer::new(),
            frames: Vec::new(),
        }
    }

    /// Simulate the window being laid out at a new size.
    pub fn set_layout_size(&mut self, size: SurfaceSize) {
        self.layout = size;
    }

    pub fn frames(&self) -> &[FrameRecord] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&FrameRecord> {
        self.frames.last()
    }

    pub fn textures_ready(&self) -> usize {
        self.renderer.loaded_textures()
    }
}

impl DrawingSurface for HeadlessTarget {
    fn layout_size(&self) -> SurfaceSize {
        self.layout
    }

    fn backing_size(&self) -> SurfaceSize {
        self.backing
    }

    fn resize_backing(&mut self, size: SurfaceSize) {
        self.backing = size;
    }
}

impl Renderer for HeadlessTarget {
    type Output = ();

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) {
        let text = self.renderer.render(scene, camera);
        self.frames.push(FrameRecord {
            number: self.frames.len() as u64 + 1,
            backing: self.backing,
            aspect: camera.aspect,
            projection: camera.projection_matrix(),
            textures_ready: self.renderer.loaded_textures(),
            text,
        });
    }

    fn set_texture(&mut self, id: TextureId, image: &TextureImage) {
        self.renderer.set_texture(id, image);
    }
}
