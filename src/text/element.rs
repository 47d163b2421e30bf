/// Horizontal anchoring of each visual line relative to the element anchor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Opaque fill color. Transparency is carried separately by
/// [`TextElement::opacity`], so there is no alpha channel here.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#RGB` or `#RRGGBB` hex notation. The leading `#` is optional.
    ///
    /// Returns `None` for anything else; callers decide the fallback.
    pub fn from_hex(s: &str) -> Option<Self> {
        let digits = s.strip_prefix('#').unwrap_or(s);
        match digits.len() {
            3 => {
                let mut chans = digits.chars().map(|c| c.to_digit(16));
                let r = chans.next().flatten()? as u8;
                let g = chans.next().flatten()? as u8;
                let b = chans.next().flatten()? as u8;
                Some(Self::rgb(r * 17, g * 17, b * 17))
            }
            6 => {
                let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
                let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
                let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
                Some(Self::rgb(r, g, b))
            }
            _ => None,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// One styled block of text placed on the surface.
///
/// Positions are normalized: `x` and `y` are percentages of the surface
/// width and height, `font_size` is a percentage of the surface *height*,
/// and `max_width` is a percentage of the surface width. Paint order is the
/// position in the owning collection; there is no z-index field.
#[derive(Clone, Debug, PartialEq)]
pub struct TextElement {
    /// Stable identifier, unique within a composition.
    pub id: String,
    /// Content. `'\n'` is a hard line boundary preserved through wrapping.
    pub text: String,
    /// Anchor, percent of surface width, 0..=100, origin top-left.
    pub x: f32,
    /// Anchor, percent of surface height, 0..=100.
    pub y: f32,
    /// Percent of surface height.
    pub font_size: f32,
    /// Requested family name, resolved against the font database with a
    /// sans-serif fallback.
    pub font_family: String,
    /// CSS-style numeric weight (400 regular, 700 bold, ...).
    pub font_weight: u16,
    pub color: Color,
    pub text_align: TextAlign,
    /// Extra inter-character gap in em. Non-zero disables word wrapping.
    pub letter_spacing: f32,
    /// Baseline-to-baseline distance as a multiple of the font size.
    pub line_height: f32,
    /// Word-wrap boundary, percent of surface width. Ignored while
    /// `letter_spacing != 0`.
    pub max_width: f32,
    /// Uniform alpha for the whole element, 0..=1.
    pub opacity: f32,
    /// Clockwise degrees around the anchor.
    pub rotation: f32,
}

impl TextElement {
    /// A centered element with neutral styling; presets and tests override
    /// the fields they care about via struct update syntax.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            x: 50.0,
            y: 50.0,
            font_size: 5.0,
            font_family: "sans-serif".to_string(),
            font_weight: 400,
            color: Color::WHITE,
            text_align: TextAlign::Center,
            letter_spacing: 0.0,
            line_height: 1.2,
            max_width: 80.0,
            opacity: 1.0,
            rotation: 0.0,
        }
    }

    /// Returns a copy with every numeric field clamped into its declared
    /// domain.
    ///
    /// One malformed element must not abort a composite, so the renderer
    /// consumes elements through this instead of validating. A warning is
    /// logged when anything actually moved.
    pub fn sanitized(&self) -> TextElement {
        let mut el = self.clone();
        el.x = finite_clamp(el.x, 0.0, 100.0);
        el.y = finite_clamp(el.y, 0.0, 100.0);
        el.opacity = finite_clamp(el.opacity, 0.0, 1.0);
        el.font_size = finite_clamp(el.font_size, 0.0, f32::MAX);
        el.line_height = finite_clamp(el.line_height, 0.0, f32::MAX);
        el.max_width = finite_clamp(el.max_width, 0.0, f32::MAX);
        if !el.letter_spacing.is_finite() {
            el.letter_spacing = 0.0;
        }
        if !el.rotation.is_finite() {
            el.rotation = 0.0;
        }
        if el != *self {
            log::warn!(
                "text element '{}' had out-of-domain geometry, clamped",
                el.id
            );
        }
        el
    }
}

fn finite_clamp(v: f32, min: f32, max: f32) -> f32 {
    if v.is_finite() { v.clamp(min, max) } else { min }
}
