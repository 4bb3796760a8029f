//! Instructions sent to the language model, and the deterministic template
//! prompt used when enhancement is unavailable.

use crate::types::StyleMode;

pub(crate) const SUGGEST_INSTRUCTIONS: &str = "You help people write prompts for an image \
generator. Continue the user's partial idea with short, vivid completions. Respond with only \
a JSON object of the form {\"suggestions\": [\"...\", \"...\", \"...\"]} holding at most three \
distinct completions, each under twelve words.";

pub(crate) const ENHANCE_STRUCTURED_INSTRUCTIONS: &str = "You expand an image idea into a \
detailed image-generation prompt. Write it as comma-separated keywords and short phrases: \
subject first, then setting, medium, style, lighting, color, mood, composition, camera and \
quality modifiers. Respond with only a JSON object of the form {\"prompt\": \"...\"}.";

pub(crate) const ENHANCE_PROSE_INSTRUCTIONS: &str = "You expand an image idea into a \
detailed image-generation prompt. Write one or two flowing descriptive sentences covering \
subject, setting, medium, style, lighting, color, mood and composition. Respond with only a \
JSON object of the form {\"prompt\": \"...\"}.";

pub(crate) const ALTERNATIVES_INSTRUCTIONS: &str = "You split an image-generation prompt into \
editable tokens. Pick the meaningful words and phrases exactly as they appear in the prompt. \
For each give a category (subject, style, medium, lighting, color, mood, composition, camera, \
setting, quality or detail) and three to five alternative phrases that could replace it. \
Respond with only a JSON object of the form {\"tokens\": [{\"text\": \"...\", \"category\": \
\"...\", \"alternatives\": [\"...\"]}]}.";

pub(crate) fn enhance_instructions(style: StyleMode) -> &'static str {
    match style {
        StyleMode::Structured => ENHANCE_STRUCTURED_INSTRUCTIONS,
        StyleMode::Prose => ENHANCE_PROSE_INSTRUCTIONS,
    }
}

/// Fixed prompt built from `selection` alone. Blank selections become "a scene".
///
/// ```
/// use provider::{template_prompt, StyleMode};
///
/// assert_eq!(
///     template_prompt("a red fox", StyleMode::Structured),
///     "a red fox, highly detailed, professional photography, dramatic lighting, sharp focus, high quality"
/// );
/// ```
pub fn template_prompt(selection: &str, style: StyleMode) -> String {
    let selection = match selection.trim() {
        "" => "a scene",
        trimmed => trimmed,
    };
    match style {
        StyleMode::Structured => format!(
            "{selection}, highly detailed, professional photography, dramatic lighting, sharp focus, high quality"
        ),
        StyleMode::Prose => format!(
            "A highly detailed image of {selection}, captured with dramatic lighting and sharp focus in high quality."
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prose_template() {
        assert_eq!(
            template_prompt("  an old lighthouse ", StyleMode::Prose),
            "A highly detailed image of an old lighthouse, captured with dramatic lighting and sharp focus in high quality."
        );
    }

    #[test]
    fn blank_selection_becomes_a_scene() {
        assert!(template_prompt("   ", StyleMode::Structured).starts_with("a scene, "));
        assert!(template_prompt("", StyleMode::Prose).contains("image of a scene,"));
    }

    #[test]
    fn instructions_differ_per_style() {
        assert_ne!(
            enhance_instructions(StyleMode::Structured),
            enhance_instructions(StyleMode::Prose)
        );
        assert!(SUGGEST_INSTRUCTIONS.contains("\"suggestions\""));
        assert!(ALTERNATIVES_INSTRUCTIONS.contains("\"tokens\""));
    }
}
