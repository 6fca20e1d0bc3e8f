use crossplanes_common::SurfaceSize;

/// A drawing surface with a layout size (how big it is on screen) and a
/// backing-buffer size (how many pixels are rendered).
pub trait DrawingSurface {
    fn layout_size(&self) -> SurfaceSize;

    fn backing_size(&self) -> SurfaceSize;

    /// Resize only the backing buffer. Must not change the layout size.
    fn resize_backing(&mut self, size: SurfaceSize);
}

/// Bring the backing buffer in line with the layout size.
///
/// Returns `true` if the sizes differed and the backing buffer was resized.
pub fn resize_to_display_size<S: DrawingSurface + ?Sized>(surface: &mut S) -> bool {
    let layout = surface.layout_size();
    let backing = surface.backing_size();
    if layout == backing {
        return false;
    }

    tracing::debug!(
        from_width = backing.width,
        from_height = backing.height,
        to_width = layout.width,
        to_height = layout.height,
        "resizing backing buffer"
    );
    surface.resize_backing(layout);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeSurface {
        layout: SurfaceSize,
        backing: SurfaceSize,
        resizes: usize,
    }

    impl DrawingSurface for FakeSurface {
        fn layout_size(&self) -> SurfaceSize {
            self.layout
        }

        fn backing_size(&self) -> SurfaceSize {
            self.backing
        }

        fn resize_backing(&mut self, size: SurfaceSize) {
            self.backing = size;
            self.resizes += 1;
        }
    }

    fn surface(layout: (u32, u32), backing: (u32, u32)) -> FakeSurface {
        FakeSurface {
            layout: layout.into(),
            backing: backing.into(),
            resizes: 0,
        }
    }

    #[test]
    fn equal_sizes_need_no_resize() {
        let mut s = surface((800, 600), (800, 600));
        assert!(!resize_to_display_size(&mut s));
        assert_eq!(s.resizes, 0);
    }

    #[test]
    fn differing_sizes_resize_once() {
        let mut s = surface((1024, 768), (800, 600));
        assert!(resize_to_display_size(&mut s));
        assert_eq!(s.backing, SurfaceSize::new(1024, 768));
        assert_eq!(s.layout, SurfaceSize::new(1024, 768));
        assert_eq!(s.resizes, 1);

        assert!(!resize_to_display_size(&mut s));
        assert_eq!(s.resizes, 1);
    }

    #[test]
    fn height_only_change_is_a_resize() {
        let mut s = surface((800, 601), (800, 600));
        assert!(resize_to_display_size(&mut s));
    }
}
