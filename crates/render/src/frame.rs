use crossplanes_scene::{PerspectiveCamera, Scene};

use crate::renderer::Renderer;
use crate::resize::{DrawingSurface, resize_to_display_size};

/// Draw one frame: fix up the backing buffer and camera aspect if the
/// surface was resized, then render.
///
/// This is the body of a frame callback. Clearing the scheduler's pending
/// flag is the caller's job and must happen before calling this.
pub fn render_frame<T>(target: &mut T, scene: &Scene, camera: &mut PerspectiveCamera) -> T::Output
where
    T: DrawingSurface + Renderer + ?Sized,
{
    if resize_to_display_size(target) {
        camera.aspect = target.layout_size().aspect();
        camera.update_projection_matrix();
        tracing::debug!(aspect = camera.aspect, "camera aspect updated");
    }
    target.render(scene, camera)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessTarget;
    use crossplanes_common::SurfaceSize;
    use crossplanes_scene::{SceneConfig, build_scene};

    #[test]
    fn resize_updates_aspect_before_drawing() {
        let scene = build_scene(&SceneConfig::default());
        let mut camera = PerspectiveCamera::default();
        let mut target = HeadlessTarget::new(SurfaceSize::new(300, 150));
        target.set_layout_size(SurfaceSize::new(1024, 512));

        render_frame(&mut target, &scene, &mut camera);

        assert_eq!(camera.aspect, 2.0);
        let frame = target.last_frame().unwrap();
        assert_eq!(frame.backing, SurfaceSize::new(1024, 512));
        assert_eq!(frame.projection, camera.projection_matrix());
    }

    #[test]
    fn no_resize_leaves_camera_alone() {
        let scene = build_scene(&SceneConfig::default());
        let mut camera = PerspectiveCamera::default();
        let projection = camera.projection_matrix();
        let mut target = HeadlessTarget::new(SurfaceSize::new(800, 600));
        target.set_layout_size(SurfaceSize::new(800, 600));
        target.resize_backing(SurfaceSize::new(800, 600));

        render_frame(&mut target, &scene, &mut camera);

        // Initial aspect of 2 survives because the surface never changed.
        assert_eq!(camera.aspect, 2.0);
        assert_eq!(camera.projection_matrix(), projection);
        assert_eq!(target.frames().len(), 1);
    }
}
