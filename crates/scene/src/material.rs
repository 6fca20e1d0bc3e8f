use crossplanes_common::{Color, TextureId};
use glam::Vec2;

/// Which faces of a mesh are rasterized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Side {
    #[default]
    Front,
    Back,
    Double,
}

/// A texture reference plus the UV transform applied before sampling:
/// `uv * repeat + offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureMap {
    pub texture: TextureId,
    pub offset: Vec2,
    pub repeat: Vec2,
}

impl TextureMap {
    pub fn new(texture: TextureId) -> Self {
        Self {
            texture,
            offset: Vec2::ZERO,
            repeat: Vec2::ONE,
        }
    }

    pub fn transform_uv(&self, uv: Vec2) -> Vec2 {
        uv * self.repeat + self.offset
    }
}

/// Blinn-Phong surface: `color` modulated by the optional texture map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhongMaterial {
    pub color: Color,
    pub map: Option<TextureMap>,
    pub transparent: bool,
    pub opacity: f32,
    pub side: Side,
    pub specular: Color,
    pub shininess: f32,
}

impl Default for PhongMaterial {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            map: None,
            transparent: false,
            opacity: 1.0,
            side: Side::Front,
            specular: Color::from_hex(0x111111),
            shininess: 30.0,
        }
    }
}

impl PhongMaterial {
    /// Opacity the renderer should blend with; opaque materials ignore `opacity`.
    pub fn effective_opacity(&self) -> f32 {
        if self.transparent { self.opacity } else { 1.0 }
    }
}
