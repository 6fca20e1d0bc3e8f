/// One vertex of a plane mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    /// Texture coordinate with `v = 1` at the top edge of the plane.
    pub uv: [f32; 2],
}

/// Flat rectangle in the XY plane, centered on the origin, facing +Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneGeometry {
    pub width: f32,
    pub height: f32,
}

impl PlaneGeometry {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Four corners: top-left, top-right, bottom-left, bottom-right.
    pub fn vertices(&self) -> [PlaneVertex; 4] {
        let (hw, hh) = (self.width * 0.5, self.height * 0.5);
        let normal = [0.0, 0.0, 1.0];
        #[rustfmt::skip]
        let vertices = [
            PlaneVertex { position: [-hw, hh, 0.0], normal, uv: [0.0, 1.0] },
            PlaneVertex { position: [hw, hh, 0.0], normal, uv: [1.0, 1.0] },
            PlaneVertex { position: [-hw, -hh, 0.0], normal, uv: [0.0, 0.0] },
            PlaneVertex { position: [hw, -hh, 0.0], normal, uv: [1.0, 0.0] },
        ];
        vertices
    }

    /// Two counter-clockwise triangles over [`PlaneGeometry::vertices`].
    pub fn indices(&self) -> [u16; 6] {
        [0, 2, 1, 2, 3, 1]
    }
}
