//! Axis-aligned tracking regions in frame coordinates.

/// Rectangle with a top-left origin, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Region {
    /// Left edge (column).
    pub x: usize,
    /// Top edge (row).
    pub y: usize,
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
}

impl Region {
    /// Creates a region from its top-left corner and size.
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Number of cells covered by the region.
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Returns `true` when the region lies entirely inside a `frame_width x frame_height` frame.
    pub fn fits_within(&self, frame_width: usize, frame_height: usize) -> bool {
        let end_x = self.x.checked_add(self.width);
        let end_y = self.y.checked_add(self.height);
        matches!((end_x, end_y), (Some(ex), Some(ey)) if ex <= frame_width && ey <= frame_height)
    }

    /// Moves the region by `(dx, dy)` while keeping it inside the frame.
    ///
    /// Returns the moved region and whether clamping was needed. The frame
    /// must be at least as large as the region.
    pub fn translate_clamped(
        &self,
        dx: isize,
        dy: isize,
        frame_width: usize,
        frame_height: usize,
    ) -> (Region, bool) {
        let max_x = frame_width.saturating_sub(self.width) as isize;
        let max_y = frame_height.saturating_sub(self.height) as isize;
        let want_x = self.x as isize + dx;
        let want_y = self.y as isize + dy;
        let x = want_x.clamp(0, max_x);
        let y = want_y.clamp(0, max_y);
        let clamped = x != want_x || y != want_y;
        (
            Region {
                x: x as usize,
                y: y as usize,
                ..*self
            },
            clamped,
        )
    }
}
