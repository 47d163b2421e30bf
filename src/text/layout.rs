use euclid::{Box2D, Point2D};

use crate::{
    font_storage::FontStorage,
    geometry::{self, Px, SurfaceSize},
    glyph_key::GlyphKey,
    text::element::{TextAlign, TextElement},
};

/// Concrete pixel geometry of one laid-out element.
///
/// Glyph positions are in the element's *local frame*: the anchor sits at
/// the origin, the first visual line's alphabetic baseline is at y = 0, and
/// the y axis points down. The renderer applies `rotation_deg` around the
/// anchor when blitting, so layout itself never deals with rotation.
#[derive(Clone, Debug, PartialEq)]
pub struct ElementLayout {
    pub anchor: Point2D<f32, Px>,
    /// Clockwise degrees around the anchor.
    pub rotation_deg: f32,
    pub lines: Vec<VisualLine>,
    /// Local-frame bounds of the placed glyphs, `None` when nothing was
    /// placed. Used for the selection outline.
    pub bounds: Option<Box2D<f32, Px>>,
}

impl ElementLayout {
    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|line| line.glyphs.is_empty())
    }
}

/// One rendered line after wrapping, with alignment already applied.
#[derive(Clone, Debug, PartialEq)]
pub struct VisualLine {
    /// Advance-based width of the line.
    pub width: f32,
    /// Local-frame x where the line starts: the alignment offset.
    pub start_x: f32,
    /// Baseline position in the local frame.
    pub baseline_y: f32,
    pub glyphs: Vec<PlacedGlyph>,
}

/// A glyph's cache key plus the top-left corner of its coverage bitmap in
/// the element's local frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacedGlyph {
    pub key: GlyphKey,
    pub x: f32,
    pub y: f32,
}

/// Lays out a single element against a surface.
///
/// The element is sanitized first, so out-of-domain geometry is clamped
/// here rather than rejected. Returns `None` only when no font at all can
/// be resolved (empty database); the caller skips the element in that case.
pub fn layout_element(
    element: &TextElement,
    surface: SurfaceSize,
    fonts: &mut FontStorage,
) -> Option<ElementLayout> {
    let el = element.sanitized();

    let font_px = geometry::to_pixel_font_size(el.font_size, surface.height as f32);
    let anchor = surface.anchor_px(el.x, el.y);

    let empty = ElementLayout {
        anchor,
        rotation_deg: el.rotation,
        lines: Vec::new(),
        bounds: None,
    };

    if el.text.is_empty() || font_px <= 0.0 {
        return Some(empty);
    }

    let (font_id, font) = fonts.resolve(&el.font_family, el.font_weight)?;
    let Some(line_metrics) = font.horizontal_line_metrics(font_px) else {
        return Some(empty);
    };

    let line_advance = font_px * el.line_height;
    let spacing_px = el.letter_spacing * font_px;
    let max_width_px = geometry::to_pixels_x(el.max_width, surface.width as f32);

    let mut lines = Vec::new();
    let mut baseline_y = 0.0;

    for hard_line in el.text.split('\n') {
        if el.letter_spacing == 0.0 {
            // Word path. Splitting on spaces and dropping empties collapses
            // runs of consecutive spaces.
            let words: Vec<&str> = hard_line.split(' ').filter(|w| !w.is_empty()).collect();
            if words.is_empty() {
                lines.push(VisualLine {
                    width: 0.0,
                    start_x: 0.0,
                    baseline_y,
                    glyphs: Vec::new(),
                });
                baseline_y += line_advance;
                continue;
            }

            let widths: Vec<f32> = words
                .iter()
                .map(|word| measure_run(&font, word.chars(), font_px, 0.0))
                .collect();
            let space_width = font
                .metrics(' ', font_px)
                .advance_width;

            for range in wrap::greedy_wrap(&widths, space_width, max_width_px) {
                let line_text = words[range].join(" ");
                lines.push(place_line(
                    &font,
                    font_id,
                    &line_text,
                    font_px,
                    0.0,
                    el.text_align,
                    baseline_y,
                ));
                baseline_y += line_advance;
            }
        } else {
            // Spaced path: the hard line is one visual line, no wrapping.
            lines.push(place_line(
                &font,
                font_id,
                hard_line,
                font_px,
                spacing_px,
                el.text_align,
                baseline_y,
            ));
            baseline_y += line_advance;
        }
    }

    let bounds = element_bounds(&lines, line_metrics);

    Some(ElementLayout {
        anchor,
        rotation_deg: el.rotation,
        lines,
        bounds,
    })
}

/// Places one visual line, applying the alignment offset to every glyph.
fn place_line(
    font: &fontdue::Font,
    font_id: fontdb::ID,
    text: &str,
    font_px: f32,
    spacing_px: f32,
    align: TextAlign,
    baseline_y: f32,
) -> VisualLine {
    let mut glyphs = Vec::new();
    let mut pen = 0.0;

    for ch in text.chars() {
        let glyph_index = font.lookup_glyph_index(ch);
        let metrics = font.metrics_indexed(glyph_index, font_px);
        glyphs.push(PlacedGlyph {
            key: GlyphKey::new(font_id, glyph_index, font_px),
            x: pen + metrics.xmin as f32,
            // Baseline-relative bitmap top, the same formula the coverage
            // blitter inverts.
            y: baseline_y - (metrics.ymin as f32 + metrics.height as f32),
        });
        pen += metrics.advance_width + spacing_px;
    }

    let width = pen;
    let offset = wrap::align_offset(align, width);
    if offset != 0.0 {
        for glyph in &mut glyphs {
            glyph.x += offset;
        }
    }

    VisualLine {
        width,
        start_x: offset,
        baseline_y,
        glyphs,
    }
}

/// Advance-based width of a character run, including the trailing spacing
/// gap when `spacing_px` is non-zero.
fn measure_run(
    font: &fontdue::Font,
    chars: impl Iterator<Item = char>,
    font_px: f32,
    spacing_px: f32,
) -> f32 {
    chars
        .map(|ch| font.metrics(ch, font_px).advance_width + spacing_px)
        .sum()
}

fn element_bounds(
    lines: &[VisualLine],
    line_metrics: fontdue::LineMetrics,
) -> Option<Box2D<f32, Px>> {
    let mut min_x = f32::MAX;
    let mut max_x = f32::MIN;
    let mut last_baseline = 0.0;
    let mut any = false;

    for line in lines {
        if line.glyphs.is_empty() {
            continue;
        }
        min_x = min_x.min(line.start_x.min(line.glyphs[0].x));
        max_x = max_x.max(line.start_x + line.width);
        last_baseline = line.baseline_y;
        any = true;
    }

    if !any {
        return None;
    }

    // descent is negative in fontdue's metrics.
    let top = -line_metrics.ascent;
    let bottom = last_baseline - line_metrics.descent;
    Some(Box2D::new(
        Point2D::new(min_x, top),
        Point2D::new(max_x, bottom),
    ))
}

pub(crate) mod wrap {
    //! Pure wrapping and alignment math, kept font-free so the wrapping
    //! policy is testable with synthetic widths.

    use std::ops::Range;

    use crate::text::element::TextAlign;

    /// Greedy word wrap over measured word widths.
    ///
    /// Words accumulate into a candidate line; a word that would push the
    /// candidate past `max_width` commits the candidate first, unless the
    /// candidate is empty, in which case the word is placed anyway (an
    /// oversized word occupies its own line, unsplit). `max_width <= 0`
    /// therefore degenerates to one word per line.
    pub(crate) fn greedy_wrap(
        word_widths: &[f32],
        space_width: f32,
        max_width: f32,
    ) -> Vec<Range<usize>> {
        let mut ranges = Vec::new();
        let mut start = 0;
        let mut current_width = 0.0;

        for (i, &width) in word_widths.iter().enumerate() {
            if i == start {
                current_width = width;
                continue;
            }
            let projected = current_width + space_width + width;
            if projected > max_width {
                ranges.push(start..i);
                start = i;
                current_width = width;
            } else {
                current_width = projected;
            }
        }

        if start < word_widths.len() {
            ranges.push(start..word_widths.len());
        }
        ranges
    }

    /// Horizontal offset that anchors a line of `width` per the alignment:
    /// centered lines straddle the anchor, right-aligned lines end at it.
    pub(crate) fn align_offset(align: TextAlign, width: f32) -> f32 {
        match align {
            TextAlign::Left => 0.0,
            TextAlign::Center => -width / 2.0,
            TextAlign::Right => -width,
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn everything_fits_on_one_line() {
            let ranges = greedy_wrap(&[30.0, 40.0, 20.0], 10.0, 200.0);
            assert_eq!(ranges, vec![0..3]);
        }

        #[test]
        fn wraps_when_projection_exceeds_limit() {
            // 30 | 30+10+40=80 > 60 -> break; 40 | 40+10+20=70 > 60 -> break
            let ranges = greedy_wrap(&[30.0, 40.0, 20.0], 10.0, 60.0);
            assert_eq!(ranges, vec![0..1, 1..2, 2..3]);
        }

        #[test]
        fn oversized_word_gets_its_own_line_unsplit() {
            let ranges = greedy_wrap(&[500.0, 20.0], 10.0, 100.0);
            assert_eq!(ranges, vec![0..1, 1..2]);
        }

        #[test]
        fn zero_or_negative_limit_degenerates_to_word_per_line() {
            for limit in [0.0, -50.0] {
                let ranges = greedy_wrap(&[10.0, 10.0, 10.0], 5.0, limit);
                assert_eq!(ranges.len(), 3);
            }
        }

        #[test]
        fn empty_input_produces_no_lines() {
            assert!(greedy_wrap(&[], 5.0, 100.0).is_empty());
        }

        #[test]
        fn exact_fit_does_not_wrap() {
            // Projection equals the limit: only strictly exceeding wraps.
            let ranges = greedy_wrap(&[45.0, 45.0], 10.0, 100.0);
            assert_eq!(ranges, vec![0..2]);
        }

        #[test]
        fn alignment_offsets() {
            assert_eq!(align_offset(TextAlign::Left, 80.0), 0.0);
            assert_eq!(align_offset(TextAlign::Center, 80.0), -40.0);
            assert_eq!(align_offset(TextAlign::Right, 80.0), -80.0);
        }
    }
}
