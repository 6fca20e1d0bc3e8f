use glam::Vec2;

/// Pointer buttons the controls care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// A pointer event in surface pixel coordinates, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlInput {
    PointerDown { button: PointerButton, position: Vec2 },
    PointerMove { position: Vec2 },
    PointerUp { button: PointerButton },
    /// Scroll amount; positive scrolls away from the user (zoom out).
    Wheel { delta_y: f32 },
    /// The pointer left the surface; any drag in progress ends.
    PointerLeave,
}
