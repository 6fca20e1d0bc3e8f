use glam::{Mat4, Vec3};

/// Perspective camera looking at a target point.
///
/// The projection matrix is cached: after changing `fov`, `aspect`, `near`
/// or `far`, call [`PerspectiveCamera::update_projection_matrix`] for the
/// change to reach the renderer.
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    target: Vec3,
    projection: Mat4,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        let mut camera = Self::new(75.0, 2.0, 0.1, 25.0);
        camera.position = Vec3::new(0.5, 1.0, 0.5);
        camera
    }
}

impl PerspectiveCamera {
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            position: Vec3::ZERO,
            up: Vec3::Y,
            fov,
            aspect,
            near,
            far,
            target: Vec3::NEG_Z,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    /// Recompute the cached projection from the current parameters.
    pub fn update_projection_matrix(&mut self) {
        self.projection =
            Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far);
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    /// Point the camera at `target`.
    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Unit view direction. Falls back to -Z when the camera sits on its target.
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position)
            .try_normalize()
            .unwrap_or(Vec3::NEG_Z)
    }

    /// Screen-space right vector in world coordinates.
    pub fn right(&self) -> Vec3 {
        self.forward()
            .cross(self.up)
            .try_normalize()
            .unwrap_or(Vec3::X)
    }

    /// Screen-space up vector in world coordinates.
    pub fn screen_up(&self) -> Vec3 {
        self.right().cross(self.forward()).normalize()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward(), self.up)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera() {
        let cam = PerspectiveCamera::default();
        assert_eq!(cam.fov, 75.0);
        assert_eq!(cam.aspect, 2.0);
        assert_eq!(cam.position, Vec3::new(0.5, 1.0, 0.5));
        let vp = cam.view_projection();
        // Should produce a valid matrix (no NaN)
        assert!(!vp.col(0).x.is_nan());
    }

    #[test]
    fn projection_is_cached_until_update() {
        let mut cam = PerspectiveCamera::default();
        let before = cam.projection_matrix();

        cam.aspect = 1.0;
        assert_eq!(cam.projection_matrix(), before);

        cam.update_projection_matrix();
        assert_ne!(cam.projection_matrix(), before);
        let expected = Mat4::perspective_rh(75.0_f32.to_radians(), 1.0, 0.1, 25.0);
        assert_eq!(cam.projection_matrix(), expected);
    }

    #[test]
    fn look_at_origin() {
        let mut cam = PerspectiveCamera::default();
        cam.look_at(Vec3::ZERO);
        let fwd = cam.forward();
        assert!((fwd - (-cam.position).normalize()).length() < 1e-6);
        assert!(cam.right().dot(fwd).abs() < 1e-6);
        assert!(cam.screen_up().dot(fwd).abs() < 1e-6);
    }

    #[test]
    fn degenerate_look_at_does_not_produce_nan() {
        let mut cam = PerspectiveCamera::default();
        cam.look_at(cam.position);
        assert!(!cam.view_matrix().col(0).x.is_nan());
    }
}
