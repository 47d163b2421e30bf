use euclid::{Point2D, Size2D, Vector2D};

/// Logical surface pixels.
///
/// The drawing surface owns this space; all layout output and all raster
/// work is expressed in it.
pub struct Px;

/// Normalized surface coordinates, 0..=100 on both axes with the origin at
/// the top-left. Element anchors are stored in this space so a composition
/// survives surface-size changes untouched.
pub struct Norm;

/// Pixels of the *displayed* surface, which may be scaled relative to the
/// logical surface (responsive layouts). Pointer input arrives in this
/// space.
pub struct DisplayPx;

pub type PxPoint = Point2D<f32, Px>;
pub type PxVector = Vector2D<f32, Px>;
pub type NormPoint = Point2D<f32, Norm>;
pub type NormVector = Vector2D<f32, Norm>;
pub type DisplayPoint = Point2D<f32, DisplayPx>;
pub type DisplaySize = Size2D<f32, DisplayPx>;

/// Converts a percentage of the surface width to pixels.
pub fn to_pixels_x(pct: f32, surface_width: f32) -> f32 {
    pct / 100.0 * surface_width
}

/// Converts a percentage of the surface height to pixels.
pub fn to_pixels_y(pct: f32, surface_height: f32) -> f32 {
    pct / 100.0 * surface_height
}

/// Converts a pixel offset back to a percentage of the surface width.
///
/// Exact inverse of [`to_pixels_x`] up to floating-point rounding; the
/// interaction code relies on the round trip staying within sub-pixel
/// tolerance.
pub fn to_percent_x(px: f32, surface_width: f32) -> f32 {
    px / surface_width * 100.0
}

/// Converts a pixel offset back to a percentage of the surface height.
pub fn to_percent_y(px: f32, surface_height: f32) -> f32 {
    px / surface_height * 100.0
}

/// Converts a font size expressed as a percentage of the surface *height*
/// into pixels.
///
/// Height is the single reference axis for type scale, so changing the
/// aspect ratio of the surface does not rescale text.
pub fn to_pixel_font_size(pct_of_height: f32, surface_height: f32) -> f32 {
    pct_of_height / 100.0 * surface_height
}

/// Integer dimensions of the logical drawing surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width / height. Callers must check [`Self::is_empty`] first.
    pub fn ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn size(&self) -> Size2D<f32, Px> {
        Size2D::new(self.width as f32, self.height as f32)
    }

    /// Pixel position of a normalized anchor.
    pub fn anchor_px(&self, x_pct: f32, y_pct: f32) -> PxPoint {
        Point2D::new(
            to_pixels_x(x_pct, self.width as f32),
            to_pixels_y(y_pct, self.height as f32),
        )
    }

    /// Normalized position of a pixel point.
    pub fn point_to_percent(&self, p: PxPoint) -> NormPoint {
        Point2D::new(
            to_percent_x(p.x, self.width as f32),
            to_percent_y(p.y, self.height as f32),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_pixel_round_trip() {
        let sizes = [(1080u32, 1920u32), (640, 480), (1, 1), (333, 777)];
        for (w, h) in sizes {
            for pct in [0.0f32, 12.5, 50.0, 99.9, 100.0] {
                let x = to_pixels_x(pct, w as f32);
                let y = to_pixels_y(pct, h as f32);
                assert!((to_percent_x(x, w as f32) - pct).abs() < 1e-4);
                assert!((to_percent_y(y, h as f32) - pct).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn font_size_tracks_height_only() {
        let px = to_pixel_font_size(8.0, 1920.0);
        assert!((px - 153.6).abs() < 1e-3);
        // Changing the width axis must not matter.
        let wide = SurfaceSize::new(4000, 1920);
        let narrow = SurfaceSize::new(200, 1920);
        assert_eq!(
            to_pixel_font_size(8.0, wide.height as f32),
            to_pixel_font_size(8.0, narrow.height as f32),
        );
    }

    #[test]
    fn anchor_and_back() {
        let surface = SurfaceSize::new(1080, 1920);
        let anchor = surface.anchor_px(50.0, 25.0);
        assert_eq!(anchor, PxPoint::new(540.0, 480.0));
        let pct = surface.point_to_percent(anchor);
        assert!((pct.x - 50.0).abs() < 1e-4);
        assert!((pct.y - 25.0).abs() < 1e-4);
    }
}
