/// Font sizes are quantized to 1/256 px when used as cache keys, so two
/// layouts at visually identical sizes share rasterized coverage.
pub const SUB_PIXEL_QUANTIZE: f32 = 256f32;

/// Cache key of one rasterized glyph: face, glyph index, quantized size.
///
/// Keys are only meaningful within one process run; `fontdb::ID` values are
/// not stable across runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GlyphKey {
    font_id: fontdb::ID,
    glyph_index: u16,
    quantized_size: u32,
}

impl GlyphKey {
    pub fn new(font_id: fontdb::ID, glyph_index: u16, font_size: f32) -> Self {
        Self {
            font_id,
            glyph_index,
            quantized_size: (font_size * SUB_PIXEL_QUANTIZE).round() as u32,
        }
    }

    pub fn font_id(&self) -> fontdb::ID {
        self.font_id
    }

    pub fn glyph_index(&self) -> u16 {
        self.glyph_index
    }

    /// The size the glyph will be rasterized at.
    pub fn font_size(&self) -> f32 {
        self.quantized_size as f32 / SUB_PIXEL_QUANTIZE
    }
}
