use crossplanes_common::Color;
use glam::Vec3;

/// Directional light shining from `position` towards `target`.
///
/// Only the direction matters for shading; the position is kept so the
/// light reads the same way it was placed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl DirectionalLight {
    pub fn new(color: Color, intensity: f32) -> Self {
        Self {
            color,
            intensity,
            position: Vec3::Y,
            target: Vec3::ZERO,
        }
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Unit vector pointing from the surface towards the light.
    pub fn direction_to_light(&self) -> Vec3 {
        (self.position - self.target)
            .try_normalize()
            .unwrap_or(Vec3::Y)
    }

    /// Color premultiplied by intensity.
    pub fn radiance(&self) -> Color {
        self.color.scaled(self.intensity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_points_at_light() {
        let light = DirectionalLight::new(Color::WHITE, 1.0).with_position(Vec3::new(-1.0, 2.0, 4.0));
        let dir = light.direction_to_light();
        assert!((dir.length() - 1.0).abs() < 1e-6);
        assert!(dir.z > 0.0 && dir.x < 0.0);
    }

    #[test]
    fn radiance_scales_color() {
        let light = DirectionalLight::new(Color::WHITE, 0.5);
        assert_eq!(light.radiance(), Color::rgb(0.5, 0.5, 0.5));
    }
}
