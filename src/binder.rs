use crate::preset::get_preset;
use crate::text::element::TextElement;

/// Externally supplied copy for a poster, typically produced by an upstream
/// analysis service.
#[derive(Clone, Debug, PartialEq)]
pub struct AnalysisContent {
    pub title: String,
    pub subtitle: Option<String>,
    pub body_text: Vec<String>,
    /// Style label; unknown labels silently map to the default preset.
    pub style: String,
}

/// Binds analysis copy onto the slots of the preset named by `style`.
///
/// The preset's templates are cloned, never mutated in place. A missing
/// subtitle drops the subheadline slot entirely, and an empty body list
/// drops the body slot; body paragraphs are joined with `'\n'` so each one
/// becomes a hard line for the layout engine.
pub fn bind_content(content: &AnalysisContent) -> Vec<TextElement> {
    let preset = get_preset(&content.style);

    preset
        .elements()
        .iter()
        .filter_map(|template| {
            let mut element = template.clone();
            match element.id.as_str() {
                "headline" => element.text = content.title.clone(),
                "subheadline" => match &content.subtitle {
                    Some(subtitle) => element.text = subtitle.clone(),
                    None => return None,
                },
                "body" => {
                    if content.body_text.is_empty() {
                        return None;
                    }
                    element.text = content.body_text.join("\n");
                }
                _ => {}
            }
            Some(element)
        })
        .collect()
}
