/// The element data model: normalized placement plus style.
pub mod element;
/// The layout engine: wrapping, letter spacing, glyph placement.
pub mod layout;

pub use element::{Color, TextAlign, TextElement};
pub use layout::{ElementLayout, PlacedGlyph, VisualLine, layout_element};
