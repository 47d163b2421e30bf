use std::sync::LazyLock;

use crate::text::element::{Color, TextElement};

/// Name of the preset returned for unknown style labels.
pub const DEFAULT_PRESET: &str = "minimal";

/// A named, read-only ordered list of element templates.
///
/// The slot ids (`headline`, `subheadline`, `body`) are stable across
/// presets so content can be bound without knowing which style was picked.
/// Consumers must clone before mutating; the registry instance itself is
/// never handed out mutably.
#[derive(Clone, Debug)]
pub struct PresetSet {
    name: &'static str,
    elements: Vec<TextElement>,
}

impl PresetSet {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn elements(&self) -> &[TextElement] {
        &self.elements
    }

    /// Owned copies of the templates, ready for per-composition mutation.
    pub fn clone_elements(&self) -> Vec<TextElement> {
        self.elements.clone()
    }

    pub fn slot(&self, id: &str) -> Option<&TextElement> {
        self.elements.iter().find(|el| el.id == id)
    }
}

/// Looks up a preset by name, case-insensitively.
///
/// Unknown names fall back to [`DEFAULT_PRESET`] instead of failing so that
/// whatever label an upstream classifier produces still composes something
/// reasonable. Total function.
pub fn get_preset(name: &str) -> &'static PresetSet {
    REGISTRY
        .iter()
        .find(|preset| preset.name.eq_ignore_ascii_case(name))
        .unwrap_or_else(|| {
            REGISTRY
                .iter()
                .find(|preset| preset.name == DEFAULT_PRESET)
                .expect("default preset is always registered")
        })
}

/// Names of all registered presets, in registry order.
pub fn preset_names() -> impl Iterator<Item = &'static str> {
    REGISTRY.iter().map(|preset| preset.name)
}

static REGISTRY: LazyLock<Vec<PresetSet>> = LazyLock::new(build_registry);

fn slot_base(id: &str) -> TextElement {
    TextElement::new(id, "")
}

fn build_registry() -> Vec<PresetSet> {
    vec![
        PresetSet {
            name: "minimal",
            elements: vec![
                TextElement {
                    y: 38.0,
                    font_size: 7.0,
                    font_weight: 700,
                    max_width: 84.0,
                    line_height: 1.1,
                    ..slot_base("headline")
                },
                TextElement {
                    y: 50.0,
                    font_size: 3.2,
                    color: Color::rgb(235, 235, 235),
                    ..slot_base("subheadline")
                },
                TextElement {
                    y: 82.0,
                    font_size: 2.2,
                    line_height: 1.5,
                    color: Color::rgb(220, 220, 220),
                    ..slot_base("body")
                },
            ],
        },
        PresetSet {
            name: "bold",
            elements: vec![
                TextElement {
                    y: 34.0,
                    font_size: 11.0,
                    font_weight: 900,
                    max_width: 92.0,
                    line_height: 1.0,
                    ..slot_base("headline")
                },
                TextElement {
                    y: 54.0,
                    font_size: 3.6,
                    font_weight: 700,
                    color: Color::rgb(255, 214, 0),
                    ..slot_base("subheadline")
                },
                TextElement {
                    y: 84.0,
                    font_size: 2.4,
                    line_height: 1.4,
                    ..slot_base("body")
                },
            ],
        },
        PresetSet {
            name: "classic",
            elements: vec![
                TextElement {
                    y: 40.0,
                    font_size: 6.5,
                    font_family: "Georgia".to_string(),
                    font_weight: 400,
                    max_width: 76.0,
                    line_height: 1.25,
                    ..slot_base("headline")
                },
                TextElement {
                    y: 52.0,
                    font_size: 2.8,
                    font_family: "Georgia".to_string(),
                    letter_spacing: 0.12,
                    ..slot_base("subheadline")
                },
                TextElement {
                    y: 80.0,
                    font_size: 2.0,
                    font_family: "Georgia".to_string(),
                    line_height: 1.6,
                    color: Color::rgb(230, 225, 214),
                    ..slot_base("body")
                },
            ],
        },
        PresetSet {
            name: "modern",
            elements: vec![
                TextElement {
                    y: 44.0,
                    font_size: 5.4,
                    font_weight: 300,
                    letter_spacing: 0.3,
                    ..slot_base("headline")
                },
                TextElement {
                    y: 54.0,
                    font_size: 2.4,
                    font_weight: 300,
                    letter_spacing: 0.45,
                    color: Color::rgb(200, 200, 200),
                    ..slot_base("subheadline")
                },
                TextElement {
                    y: 86.0,
                    font_size: 2.0,
                    line_height: 1.5,
                    ..slot_base("body")
                },
            ],
        },
        PresetSet {
            name: "japanese",
            elements: vec![
                TextElement {
                    y: 36.0,
                    font_size: 6.0,
                    font_family: "Noto Sans JP".to_string(),
                    font_weight: 700,
                    letter_spacing: 0.5,
                    ..slot_base("headline")
                },
                TextElement {
                    y: 48.0,
                    font_size: 2.6,
                    font_family: "Noto Sans JP".to_string(),
                    letter_spacing: 0.25,
                    ..slot_base("subheadline")
                },
                TextElement {
                    y: 82.0,
                    font_size: 2.0,
                    font_family: "Noto Sans JP".to_string(),
                    line_height: 1.7,
                    ..slot_base("body")
                },
            ],
        },
    ]
}
