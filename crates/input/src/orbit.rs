use crossplanes_common::SurfaceSize;
use crossplanes_scene::PerspectiveCamera;
use glam::{Vec2, Vec3};
use std::f32::consts::{PI, TAU};

use crate::control::{ControlInput, PointerButton};

const EPS: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Drag {
    None,
    Rotate,
    Dolly,
    Pan,
}

/// A camera placement: where it sits and what it looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Placement {
    target: Vec3,
    position: Vec3,
}

impl Placement {
    /// Whether `next` differs visibly from `self`. Distances are measured
    /// relative to the orbit radius, so motion counts the same at any zoom.
    fn moved_to(&self, next: &Placement) -> bool {
        let before = self.position - self.target;
        let after = next.position - next.target;
        let radius = before.length().max(after.length()).max(f32::MIN_POSITIVE);
        let moved = |a: Vec3, b: Vec3| a.distance_squared(b) / (radius * radius) > EPS;

        let turned = match (before.try_normalize(), after.try_normalize()) {
            (Some(a), Some(b)) => 8.0 * (1.0 - a.dot(b)) > EPS,
            _ => false,
        };

        turned || moved(self.position, next.position) || moved(self.target, next.target)
    }
}

/// Orbit controls: the camera circles `target` on a sphere.
///
/// Primary drag rotates, middle drag or the wheel dollies, secondary drag
/// pans the target in screen space. The Y axis is up.
///
/// Input is accumulated as deltas and applied by [`OrbitControls::update`];
/// every method that moves the camera returns `true` when it did.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub enabled: bool,
    pub enable_rotate: bool,
    pub enable_zoom: bool,
    pub enable_pan: bool,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Polar angle limits in radians, measured from +Y.
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,

    target: Vec3,
    drag: Drag,
    pointer: Vec2,
    theta_delta: f32,
    phi_delta: f32,
    scale: f32,
    pan_offset: Vec3,
    saved: Placement,
    /// Placement as of the last update that reported a change. Comparing
    /// against it lets small steps add up instead of each being dropped.
    reported: Placement,
}

impl OrbitControls {
    pub fn new(camera: &PerspectiveCamera) -> Self {
        let placement = Placement {
            target: camera.target(),
            position: camera.position,
        };
        Self {
            enabled: true,
            enable_rotate: true,
            enable_zoom: true,
            enable_pan: true,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            target: camera.target(),
            drag: Drag::None,
            pointer: Vec2::ZERO,
            theta_delta: 0.0,
            phi_delta: 0.0,
            scale: 1.0,
            pan_offset: Vec3::ZERO,
            saved: placement,
            reported: placement,
        }
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Move the orbit center. Takes effect on the next [`OrbitControls::update`].
    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag != Drag::None
    }

    /// Remember the current camera placement for [`OrbitControls::reset`].
    pub fn save_state(&mut self, camera: &PerspectiveCamera) {
        self.saved = Placement {
            target: self.target,
            position: camera.position,
        };
    }

    /// Return to the saved placement and drop any drag in progress.
    pub fn reset(&mut self, camera: &mut PerspectiveCamera) -> bool {
        self.target = self.saved.target;
        camera.position = self.saved.position;
        self.drag = Drag::None;
        self.clear_deltas();
        self.update(camera);
        true
    }

    /// Apply accumulated deltas to the camera. Returns whether it moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let offset = camera.position - self.target;

        let mut radius = offset.length();
        let mut theta = offset.x.atan2(offset.z);
        let mut phi = if radius > 0.0 {
            (offset.y / radius).clamp(-1.0, 1.0).acos()
        } else {
            0.0
        };

        theta += self.theta_delta;
        phi += self.phi_delta;
        phi = phi
            .clamp(self.min_polar_angle, self.max_polar_angle)
            .clamp(EPS, PI - EPS);
        radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);

        self.target += self.pan_offset;

        let offset = Vec3::new(
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
            radius * phi.sin() * theta.cos(),
        );
        let next = Placement {
            target: self.target,
            position: self.target + offset,
        };

        camera.position = next.position;
        camera.look_at(self.target);
        self.clear_deltas();

        let changed = self.reported.moved_to(&next);
        if changed {
            self.reported = next;
            tracing::trace!(radius, theta, phi, "orbit camera moved");
        }
        changed
    }

    /// Feed one pointer event. Returns whether the camera moved.
    pub fn handle(
        &mut self,
        input: ControlInput,
        camera: &mut PerspectiveCamera,
        viewport: SurfaceSize,
    ) -> bool {
        if !self.enabled {
            return false;
        }

        match input {
            ControlInput::PointerDown { button, position } => {
                self.drag = match button {
                    PointerButton::Primary if self.enable_rotate => Drag::Rotate,
                    PointerButton::Middle if self.enable_zoom => Drag::Dolly,
                    PointerButton::Secondary if self.enable_pan => Drag::Pan,
                    _ => Drag::None,
                };
                self.pointer = position;
                false
            }
            ControlInput::PointerMove { position } => {
                let delta = position - self.pointer;
                self.pointer = position;
                let height = viewport.height.max(1) as f32;

                match self.drag {
                    Drag::None => return false,
                    Drag::Rotate => {
                        let delta = delta * self.rotate_speed;
                        self.theta_delta -= TAU * delta.x / height;
                        self.phi_delta -= TAU * delta.y / height;
                    }
                    Drag::Dolly => {
                        if delta.y > 0.0 {
                            self.dolly_out(self.zoom_scale());
                        } else if delta.y < 0.0 {
                            self.dolly_in(self.zoom_scale());
                        }
                    }
                    Drag::Pan => self.pan(delta * self.pan_speed, camera, height),
                }
                self.update(camera)
            }
            ControlInput::PointerUp { .. } | ControlInput::PointerLeave => {
                self.drag = Drag::None;
                false
            }
            ControlInput::Wheel { delta_y } => {
                if !self.enable_zoom || self.is_dragging() {
                    return false;
                }
                if delta_y < 0.0 {
                    self.dolly_in(self.zoom_scale());
                } else if delta_y > 0.0 {
                    self.dolly_out(self.zoom_scale());
                }
                self.update(camera)
            }
        }
    }

    fn zoom_scale(&self) -> f32 {
        0.95_f32.powf(self.zoom_speed)
    }

    fn dolly_in(&mut self, factor: f32) {
        self.scale *= factor;
    }

    fn dolly_out(&mut self, factor: f32) {
        self.scale /= factor;
    }

    /// Screen-space pan: one surface height of drag moves the target by the
    /// visible height at the target's distance.
    fn pan(&mut self, delta: Vec2, camera: &PerspectiveCamera, height: f32) {
        let distance = (camera.position - self.target).length();
        let visible = distance * (camera.fov.to_radians() * 0.5).tan();

        self.pan_offset -= camera.right() * (2.0 * delta.x * visible / height);
        self.pan_offset += camera.screen_up() * (2.0 * delta.y * visible / height);
    }

    fn clear_deltas(&mut self) {
        self.theta_delta = 0.0;
        self.phi_delta = 0.0;
        self.scale = 1.0;
        self.pan_offset = Vec3::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: SurfaceSize = SurfaceSize::new(800, 600);

    fn setup() -> (OrbitControls, PerspectiveCamera) {
        let mut camera = PerspectiveCamera::default();
        camera.look_at(Vec3::ZERO);
        let controls = OrbitControls::new(&camera);
        (controls, camera)
    }

    fn drag(
        controls: &mut OrbitControls,
        camera: &mut PerspectiveCamera,
        button: PointerButton,
        from: Vec2,
        to: Vec2,
    ) -> bool {
        controls.handle(
            ControlInput::PointerDown { button, position: from },
            camera,
            VIEWPORT,
        );
        let moved = controls.handle(ControlInput::PointerMove { position: to }, camera, VIEWPORT);
        controls.handle(ControlInput::PointerUp { button }, camera, VIEWPORT);
        moved
    }

    #[test]
    fn update_without_input_is_unchanged() {
        let (mut controls, mut camera) = setup();
        let start = camera.position;
        assert!(!controls.update(&mut camera));
        assert!((camera.position - start).length() < 1e-5);
    }

    #[test]
    fn new_target_requires_update() {
        let (mut controls, mut camera) = setup();
        controls.set_target(Vec3::new(0.0, 0.5, 0.0));
        assert_eq!(camera.target(), Vec3::ZERO);
        assert!(controls.update(&mut camera));
        assert_eq!(camera.target(), Vec3::new(0.0, 0.5, 0.0));
    }

    #[test]
    fn horizontal_drag_orbits_at_constant_distance() {
        let (mut controls, mut camera) = setup();
        let start = camera.position;
        let moved = drag(
            &mut controls,
            &mut camera,
            PointerButton::Primary,
            Vec2::new(400.0, 300.0),
            Vec2::new(500.0, 300.0),
        );
        assert!(moved);
        assert!((camera.position.length() - start.length()).abs() < 1e-4);
        assert!((camera.position.y - start.y).abs() < 1e-4);
        assert!((camera.position - start).length() > 1e-3);
    }

    #[test]
    fn move_without_button_does_nothing() {
        let (mut controls, mut camera) = setup();
        let moved = controls.handle(
            ControlInput::PointerMove {
                position: Vec2::new(10.0, 10.0),
            },
            &mut camera,
            VIEWPORT,
        );
        assert!(!moved);
    }

    #[test]
    fn vertical_drag_never_flips_over_the_pole() {
        let (mut controls, mut camera) = setup();
        drag(
            &mut controls,
            &mut camera,
            PointerButton::Primary,
            Vec2::new(400.0, 0.0),
            Vec2::new(400.0, 5000.0),
        );
        // Dragging down tilts the camera up to the pole, not past it.
        assert!(camera.position.y > 0.0);
        assert!((camera.position.length() - 1.5_f32.sqrt()).abs() < 1e-4);
        assert!(!camera.view_matrix().col(0).x.is_nan());
    }

    #[test]
    fn wheel_dollies() {
        let (mut controls, mut camera) = setup();
        let start = camera.position.length();

        assert!(controls.handle(ControlInput::Wheel { delta_y: -1.0 }, &mut camera, VIEWPORT));
        let closer = camera.position.length();
        assert!(closer < start);

        assert!(controls.handle(ControlInput::Wheel { delta_y: 1.0 }, &mut camera, VIEWPORT));
        assert!((camera.position.length() - start).abs() < 1e-4);
    }

    #[test]
    fn distance_is_clamped() {
        let (mut controls, mut camera) = setup();
        controls.max_distance = 1.6;
        for _ in 0..50 {
            controls.handle(ControlInput::Wheel { delta_y: 1.0 }, &mut camera, VIEWPORT);
        }
        assert!((camera.position.length() - 1.6).abs() < 1e-4);
    }

    #[test]
    fn pan_moves_camera_and_target_together() {
        let (mut controls, mut camera) = setup();
        let offset_before = camera.position - controls.target();
        let moved = drag(
            &mut controls,
            &mut camera,
            PointerButton::Secondary,
            Vec2::new(400.0, 300.0),
            Vec2::new(450.0, 320.0),
        );
        assert!(moved);
        assert!(controls.target().length() > 1e-3);
        let offset_after = camera.position - controls.target();
        assert!((offset_after - offset_before).length() < 1e-4);
    }

    #[test]
    fn disabled_controls_ignore_input() {
        let (mut controls, mut camera) = setup();
        controls.enabled = false;
        assert!(!controls.handle(ControlInput::Wheel { delta_y: -1.0 }, &mut camera, VIEWPORT));
    }

    #[test]
    fn small_moves_count_at_any_zoom() {
        let (mut controls, mut camera) = setup();
        for _ in 0..100 {
            assert!(controls.handle(ControlInput::Wheel { delta_y: -1.0 }, &mut camera, VIEWPORT));
        }
        let radius = (camera.position - controls.target()).length();
        assert!(radius < 0.01);

        let start = camera.position;
        let mut pointer = Vec2::new(400.0, 300.0);
        controls.handle(
            ControlInput::PointerDown {
                button: PointerButton::Primary,
                position: pointer,
            },
            &mut camera,
            VIEWPORT,
        );
        for _ in 0..20 {
            pointer.x += 1.0;
            let moved =
                controls.handle(ControlInput::PointerMove { position: pointer }, &mut camera, VIEWPORT);
            assert!(moved, "one-pixel rotation at radius {radius} was not reported");
        }
        let turned = (start - controls.target())
            .angle_between(camera.position - controls.target());
        assert!(turned > 0.1);
    }

    #[test]
    fn unreported_drift_is_compared_against_last_report() {
        let (mut controls, mut camera) = setup();
        let start = camera.position;
        // Each step is below the threshold on its own.
        controls.theta_delta = 1e-5;
        assert!(!controls.update(&mut camera));
        let mut reports = 0;
        for _ in 0..1000 {
            controls.theta_delta = 1e-5;
            if controls.update(&mut camera) {
                reports += 1;
            }
        }
        assert!((camera.position - start).length() > 1e-3);
        assert!(reports > 0);
        assert!(!controls.reported.moved_to(&Placement {
            target: controls.target(),
            position: camera.position,
        }));
    }

    #[test]
    fn reset_restores_saved_placement() {
        let (mut controls, mut camera) = setup();
        let start = camera.position;
        drag(
            &mut controls,
            &mut camera,
            PointerButton::Primary,
            Vec2::ZERO,
            Vec2::new(120.0, 40.0),
        );
        assert!(controls.reset(&mut camera));
        assert!((camera.position - start).length() < 1e-5);
        assert_eq!(controls.target(), Vec3::ZERO);
    }
}
