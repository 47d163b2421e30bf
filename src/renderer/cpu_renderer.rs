mod glyph_cache;

pub use glyph_cache::{DEFAULT_GLYPH_CACHE_CAPACITY, GlyphCache, RasterGlyph};

use euclid::{Angle, Rotation2D, Vector2D};
use image::RgbaImage;

use crate::font_storage::FontStorage;
use crate::geometry::{Px, PxPoint};
use crate::text::element::Color;
use crate::text::layout::ElementLayout;

/// CPU rasterizer that blits cached glyph coverage onto an RGBA surface.
pub struct CpuRenderer {
    cache: GlyphCache,
}

impl Default for CpuRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuRenderer {
    pub fn new() -> Self {
        Self {
            cache: GlyphCache::default(),
        }
    }

    pub fn with_cache(cache: GlyphCache) -> Self {
        Self { cache }
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Draws one laid-out element onto the canvas.
    ///
    /// Color and opacity apply to the whole element as a single style
    /// context. A zero rotation takes the direct blend path; anything else
    /// goes through inverse-mapped bilinear sampling around the anchor.
    pub fn draw_element(
        &mut self,
        canvas: &mut RgbaImage,
        layout: &ElementLayout,
        color: Color,
        opacity: f32,
        fonts: &mut FontStorage,
    ) {
        if opacity <= 0.0 {
            return;
        }
        let opacity = opacity.min(1.0);

        let turns = layout.rotation_deg.rem_euclid(360.0);
        let rotation: Option<Rotation2D<f32, Px, Px>> =
            (turns != 0.0).then(|| Rotation2D::new(Angle::degrees(layout.rotation_deg)));

        for line in &layout.lines {
            for glyph in &line.glyphs {
                let Some(raster) = self.cache.get(&glyph.key, fonts) else {
                    continue;
                };
                if raster.width == 0 || raster.height == 0 {
                    continue;
                }

                let local = Vector2D::new(glyph.x, glyph.y);
                match &rotation {
                    None => {
                        let origin = layout.anchor + local;
                        blit_axis_aligned(canvas, raster, origin, color, opacity);
                    }
                    Some(rotation) => {
                        blit_rotated(
                            canvas,
                            raster,
                            local,
                            layout.anchor,
                            rotation,
                            color,
                            opacity,
                        );
                    }
                }
            }
        }
    }
}

/// Direct blend of an unrotated coverage bitmap whose top-left corner is at
/// `origin`.
fn blit_axis_aligned(
    canvas: &mut RgbaImage,
    raster: &RasterGlyph,
    origin: PxPoint,
    color: Color,
    opacity: f32,
) {
    for row in 0..raster.height {
        let y = (origin.y + row as f32).floor() as i64;
        for col in 0..raster.width {
            let coverage = raster.coverage[row * raster.width + col];
            if coverage == 0 {
                continue;
            }
            let x = (origin.x + col as f32).floor() as i64;
            blend_pixel(canvas, x, y, color, coverage as f32 / 255.0 * opacity);
        }
    }
}

/// Rotated blit: walk the destination bounding box of the transformed glyph
/// rectangle and sample the coverage bitmap through the inverse rotation.
fn blit_rotated(
    canvas: &mut RgbaImage,
    raster: &RasterGlyph,
    local_origin: Vector2D<f32, Px>,
    anchor: PxPoint,
    rotation: &Rotation2D<f32, Px, Px>,
    color: Color,
    opacity: f32,
) {
    let w = raster.width as f32;
    let h = raster.height as f32;

    let corners = [(0.0, 0.0), (w, 0.0), (0.0, h), (w, h)]
        .map(|(dx, dy)| anchor + rotation.transform_vector(local_origin + Vector2D::new(dx, dy)));

    let min_x = corners.iter().map(|p| p.x).fold(f32::MAX, f32::min).floor() as i64;
    let max_x = corners.iter().map(|p| p.x).fold(f32::MIN, f32::max).ceil() as i64;
    let min_y = corners.iter().map(|p| p.y).fold(f32::MAX, f32::min).floor() as i64;
    let max_y = corners.iter().map(|p| p.y).fold(f32::MIN, f32::max).ceil() as i64;

    let x0 = min_x.max(0);
    let y0 = min_y.max(0);
    let x1 = max_x.min(canvas.width() as i64 - 1);
    let y1 = max_y.min(canvas.height() as i64 - 1);

    let inverse = rotation.inverse();

    for py in y0..=y1 {
        for px in x0..=x1 {
            let dest_center = PxPoint::new(px as f32 + 0.5, py as f32 + 0.5);
            let local = inverse.transform_vector(dest_center - anchor) - local_origin;
            let alpha = sample_bilinear(raster, local.x - 0.5, local.y - 0.5);
            if alpha > 0.0 {
                blend_pixel(canvas, px, py, color, alpha * opacity);
            }
        }
    }
}

/// Bilinear sample of the coverage bitmap in texel-center space; positions
/// outside the bitmap read as zero coverage. Returns 0..=1.
fn sample_bilinear(raster: &RasterGlyph, x: f32, y: f32) -> f32 {
    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let tx = x - x0 as f32;
    let ty = y - y0 as f32;

    let fetch = |ix: i64, iy: i64| -> f32 {
        if ix < 0 || iy < 0 || ix >= raster.width as i64 || iy >= raster.height as i64 {
            return 0.0;
        }
        raster.coverage[iy as usize * raster.width + ix as usize] as f32 / 255.0
    };

    let top = fetch(x0, y0) * (1.0 - tx) + fetch(x0 + 1, y0) * tx;
    let bottom = fetch(x0, y0 + 1) * (1.0 - tx) + fetch(x0 + 1, y0 + 1) * tx;
    top * (1.0 - ty) + bottom * ty
}

/// Source-over blend of a single pixel. Out-of-bounds writes are dropped.
pub(crate) fn blend_pixel(canvas: &mut RgbaImage, x: i64, y: i64, color: Color, alpha: f32) {
    if alpha <= 0.0 {
        return;
    }
    if x < 0 || y < 0 || x >= canvas.width() as i64 || y >= canvas.height() as i64 {
        return;
    }
    let alpha = alpha.min(1.0);

    let pixel = canvas.get_pixel_mut(x as u32, y as u32);
    let src = [color.r, color.g, color.b];
    for (dst, src) in pixel.0.iter_mut().take(3).zip(src) {
        *dst = (src as f32 * alpha + *dst as f32 * (1.0 - alpha)).round() as u8;
    }
    pixel.0[3] = pixel.0[3].max((alpha * 255.0).round() as u8);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn black_canvas(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, image::Rgba([0, 0, 0, 255]))
    }

    #[test]
    fn full_alpha_replaces_the_pixel() {
        let mut canvas = black_canvas(4, 4);
        blend_pixel(&mut canvas, 1, 2, Color::rgb(10, 20, 30), 1.0);
        assert_eq!(canvas.get_pixel(1, 2).0, [10, 20, 30, 255]);
    }

    #[test]
    fn half_alpha_mixes_with_destination() {
        let mut canvas = black_canvas(2, 2);
        blend_pixel(&mut canvas, 0, 0, Color::rgb(200, 100, 50), 0.5);
        assert_eq!(canvas.get_pixel(0, 0).0, [100, 50, 25, 255]);
    }

    #[test]
    fn out_of_bounds_writes_are_dropped() {
        let mut canvas = black_canvas(2, 2);
        blend_pixel(&mut canvas, -1, 0, Color::WHITE, 1.0);
        blend_pixel(&mut canvas, 0, 5, Color::WHITE, 1.0);
        for pixel in canvas.pixels() {
            assert_eq!(pixel.0, [0, 0, 0, 255]);
        }
    }

    #[test]
    fn later_blend_wins_at_full_alpha() {
        // Paint order is list order: the second element must cover the
        // first wherever its coverage is full.
        let mut canvas = black_canvas(1, 1);
        blend_pixel(&mut canvas, 0, 0, Color::rgb(255, 0, 0), 1.0);
        blend_pixel(&mut canvas, 0, 0, Color::rgb(0, 0, 255), 1.0);
        assert_eq!(canvas.get_pixel(0, 0).0, [0, 0, 255, 255]);
    }

    #[test]
    fn quarter_turn_maps_a_bar_to_a_column() {
        let mut canvas = black_canvas(16, 16);
        // 6x2 opaque horizontal bar.
        let raster = RasterGlyph {
            width: 6,
            height: 2,
            coverage: vec![255; 12],
        };
        let anchor = PxPoint::new(8.0, 8.0);
        let rotation = Rotation2D::new(Angle::degrees(90.0));
        blit_rotated(
            &mut canvas,
            &raster,
            Vector2D::new(0.0, 0.0),
            anchor,
            &rotation,
            Color::WHITE,
            1.0,
        );

        // With a clockwise quarter turn (y-down), the bar extends downward
        // from the anchor: lit pixels sit below it, not to its right.
        let below = canvas.get_pixel(7, 10).0[0];
        let right = canvas.get_pixel(12, 7).0[0];
        assert!(below > 200, "expected lit pixel below anchor, got {below}");
        assert_eq!(right, 0, "no coverage should land to the right");
    }

    #[test]
    fn bilinear_sampling_is_bounded() {
        let raster = RasterGlyph {
            width: 2,
            height: 2,
            coverage: vec![0, 255, 255, 0],
        };
        assert_eq!(sample_bilinear(&raster, -5.0, -5.0), 0.0);
        let mid = sample_bilinear(&raster, 0.5, 0.5);
        assert!((mid - 0.5).abs() < 1e-4);
    }
}
