use std::path::Path;

use euclid::{Angle, Rotation2D};
use image::{DynamicImage, GenericImageView, RgbaImage};

use crate::{
    error::{CompositeError, ExportError},
    font_storage::FontStorage,
    geometry::{Px, PxPoint, SurfaceSize},
    renderer::CpuRenderer,
    renderer::cpu_renderer::blend_pixel,
    text::element::{Color, TextElement},
    text::layout::{ElementLayout, layout_element},
};

/// Padding between the measured text bounds and the selection outline.
const SELECTION_PADDING: f32 = 8.0;
/// On/off run length of the dashed outline, in surface pixels.
const SELECTION_DASH: f32 = 6.0;
const SELECTION_COLOR: Color = Color::WHITE;

/// Per-composite flags from the embedding application.
#[derive(Clone, Debug, Default)]
pub struct CompositeOptions {
    /// Interactive mode; enables the selection outline.
    pub editable: bool,
    /// Id of the element to outline. Ignored unless `editable`.
    pub selected: Option<String>,
}

/// Paints background plus elements into one finished frame and holds it for
/// export.
///
/// A composite pass is atomic: the frame is built in a scratch buffer and
/// swapped in whole, so export never observes a partially drawn surface,
/// and a failed pass leaves the previous frame intact.
pub struct Compositor {
    size: SurfaceSize,
    surface: Option<RgbaImage>,
}

impl Compositor {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: SurfaceSize::new(width, height),
            surface: None,
        }
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// Resizes the logical surface. The held frame is dropped; the next
    /// export requires a fresh composite pass.
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.size = SurfaceSize::new(width, height);
        self.surface = None;
    }

    /// Runs one full composite pass: decode the background, paint it with
    /// cover fitting, then draw every element in collection order (implicit
    /// z-order, later on top).
    ///
    /// A background that fails to decode fails the whole pass; element
    /// anomalies (missing fonts, out-of-domain geometry) are absorbed per
    /// element instead.
    pub fn composite(
        &mut self,
        background: &[u8],
        elements: &[TextElement],
        options: &CompositeOptions,
        fonts: &mut FontStorage,
        renderer: &mut CpuRenderer,
    ) -> Result<(), CompositeError> {
        if self.size.is_empty() {
            return Err(CompositeError::EmptySurface);
        }

        let decoded = image::load_from_memory(background)?;
        let mut canvas = cover_fit(&decoded, self.size);

        for element in elements {
            let Some(layout) = layout_element(element, self.size, fonts) else {
                continue;
            };
            let style = element.sanitized();
            renderer.draw_element(&mut canvas, &layout, style.color, style.opacity, fonts);

            if options.editable && options.selected.as_deref() == Some(element.id.as_str()) {
                draw_selection_outline(&mut canvas, &layout);
            }
        }

        self.surface = Some(canvas);
        Ok(())
    }

    /// Reads background bytes from a file and composites them.
    pub fn composite_file(
        &mut self,
        path: impl AsRef<Path>,
        elements: &[TextElement],
        options: &CompositeOptions,
        fonts: &mut FontStorage,
        renderer: &mut CpuRenderer,
    ) -> Result<(), CompositeError> {
        let bytes = std::fs::read(path)?;
        self.composite(&bytes, elements, options, fonts, renderer)
    }

    /// Encodes the current frame as PNG bytes.
    ///
    /// Pure read of the held surface; layout is not re-run. Fails with
    /// [`ExportError::NotComposited`] until one composite pass succeeded.
    pub fn export_png(&self) -> Result<Vec<u8>, ExportError> {
        let surface = self.surface.as_ref().ok_or(ExportError::NotComposited)?;
        let mut bytes = Vec::new();
        surface.write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )?;
        Ok(bytes)
    }

    /// The finished frame, if a composite pass has succeeded.
    pub fn surface(&self) -> Option<&RgbaImage> {
        self.surface.as_ref()
    }
}

/// Scales and center-crops the image so it fully covers the target surface.
///
/// A relatively wider image is scaled to match height and cropped on the
/// sides; a relatively taller one is scaled to match width and cropped top
/// and bottom. Never letterboxes.
fn cover_fit(image: &DynamicImage, target: SurfaceSize) -> RgbaImage {
    let (iw, ih) = image.dimensions();
    let img_ratio = iw as f32 / ih as f32;
    let surface_ratio = target.ratio();

    let (crop_w, crop_h) = if img_ratio > surface_ratio {
        (
            ((ih as f32 * surface_ratio).round() as u32).clamp(1, iw),
            ih,
        )
    } else {
        (
            iw,
            ((iw as f32 / surface_ratio).round() as u32).clamp(1, ih),
        )
    };
    let crop_x = (iw - crop_w) / 2;
    let crop_y = (ih - crop_h) / 2;

    image
        .crop_imm(crop_x, crop_y, crop_w, crop_h)
        .resize_exact(
            target.width,
            target.height,
            image::imageops::FilterType::Triangle,
        )
        .to_rgba8()
}

fn draw_selection_outline(canvas: &mut RgbaImage, layout: &ElementLayout) {
    let Some(bounds) = layout.bounds else {
        return;
    };
    let expanded = bounds.inflate(SELECTION_PADDING, SELECTION_PADDING);
    let rotation: Rotation2D<f32, Px, Px> =
        Rotation2D::new(Angle::degrees(layout.rotation_deg));

    let corners = [
        expanded.min,
        PxPoint::new(expanded.max.x, expanded.min.y),
        expanded.max,
        PxPoint::new(expanded.min.x, expanded.max.y),
    ]
    .map(|corner| layout.anchor + rotation.transform_vector(corner.to_vector()));

    for i in 0..corners.len() {
        draw_dashed_line(canvas, corners[i], corners[(i + 1) % corners.len()]);
    }
}

fn draw_dashed_line(canvas: &mut RgbaImage, from: PxPoint, to: PxPoint) {
    let delta = to - from;
    let length = delta.length();
    if length <= 0.0 {
        return;
    }
    let step = delta / length;

    let mut t = 0.0;
    while t < length {
        if (t / SELECTION_DASH) as i64 % 2 == 0 {
            let p = from + step * t;
            blend_pixel(
                canvas,
                p.x.floor() as i64,
                p.y.floor() as i64,
                SELECTION_COLOR,
                1.0,
            );
        }
        t += 1.0;
    }
}
