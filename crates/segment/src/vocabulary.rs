//! Fixed lookup tables for offline token extraction.
//!
//! All terms are lowercase. Within a category multi-word terms come first so
//! they are collected before the single words they contain.

use crate::role::RoleTag;

pub(crate) const VOCABULARY: &[(RoleTag, &[&str])] = &[
    (
        RoleTag::Quality,
        &[
            "high quality",
            "best quality",
            "highly detailed",
            "ultra detailed",
            "sharp focus",
            "award winning",
            "masterpiece",
            "intricate",
            "8k",
            "4k",
            "hdr",
        ],
    ),
    (
        RoleTag::Lighting,
        &[
            "golden hour",
            "blue hour",
            "soft lighting",
            "dramatic lighting",
            "cinematic lighting",
            "studio lighting",
            "natural light",
            "rim light",
            "volumetric light",
            "backlit",
            "neon",
            "sunlight",
            "moonlight",
        ],
    ),
    (
        RoleTag::Camera,
        &[
            "depth of field",
            "wide angle",
            "long exposure",
            "bokeh",
            "macro",
            "telephoto",
            "35mm",
            "85mm",
        ],
    ),
    (
        RoleTag::Composition,
        &[
            "close-up",
            "full body",
            "rule of thirds",
            "aerial view",
            "low angle",
            "portrait",
            "symmetrical",
            "centered",
        ],
    ),
    (
        RoleTag::Medium,
        &[
            "oil painting",
            "digital art",
            "digital painting",
            "concept art",
            "3d render",
            "pixel art",
            "watercolor",
            "illustration",
            "photograph",
            "sketch",
            "charcoal",
        ],
    ),
    (
        RoleTag::Style,
        &[
            "art nouveau",
            "art deco",
            "photorealistic",
            "hyperrealistic",
            "cinematic",
            "cyberpunk",
            "steampunk",
            "surreal",
            "minimalist",
            "impressionist",
            "anime",
            "fantasy",
            "vintage",
        ],
    ),
    (
        RoleTag::Mood,
        &[
            "serene",
            "dramatic",
            "moody",
            "mysterious",
            "ethereal",
            "whimsical",
            "melancholic",
            "peaceful",
            "eerie",
            "dreamy",
            "cozy",
        ],
    ),
    (
        RoleTag::Color,
        &[
            "vibrant colors",
            "muted colors",
            "pastel",
            "monochrome",
            "vibrant",
            "sepia",
        ],
    ),
];

const TERM_ALTERNATIVES: &[(&str, &[&str])] = &[
    ("high quality", &["best quality", "masterpiece", "premium quality", "ultra high quality"]),
    ("best quality", &["high quality", "masterpiece", "top quality"]),
    ("highly detailed", &["intricately detailed", "ultra detailed", "finely detailed", "richly detailed"]),
    ("ultra detailed", &["highly detailed", "hyper detailed", "intricate"]),
    ("sharp focus", &["crisp focus", "tack sharp", "soft focus"]),
    ("masterpiece", &["high quality", "award winning", "best quality"]),
    ("8k", &["4k", "16k", "ultra hd"]),
    ("4k", &["8k", "hd", "ultra hd"]),
    ("golden hour", &["blue hour", "sunset", "sunrise", "twilight"]),
    ("blue hour", &["golden hour", "twilight", "dusk"]),
    ("soft lighting", &["diffused lighting", "dramatic lighting", "natural light"]),
    ("dramatic lighting", &["soft lighting", "chiaroscuro", "cinematic lighting", "moody lighting"]),
    ("cinematic lighting", &["dramatic lighting", "studio lighting", "volumetric lighting"]),
    ("studio lighting", &["natural light", "softbox lighting", "rim light"]),
    ("natural light", &["studio lighting", "window light", "ambient light"]),
    ("neon", &["fluorescent", "bioluminescent", "candlelit"]),
    ("bokeh", &["shallow depth of field", "deep focus", "tilt-shift"]),
    ("wide angle", &["telephoto", "fisheye", "35mm"]),
    ("macro", &["close-up", "wide angle", "telephoto"]),
    ("portrait", &["close-up", "full body shot", "headshot", "profile view"]),
    ("close-up", &["portrait", "wide shot", "extreme close-up", "medium shot"]),
    ("full body", &["portrait", "close-up", "three-quarter view"]),
    ("oil painting", &["watercolor", "acrylic painting", "charcoal drawing", "digital painting"]),
    ("watercolor", &["oil painting", "gouache", "ink wash"]),
    ("digital art", &["oil painting", "3d render", "concept art", "matte painting"]),
    ("photograph", &["oil painting", "illustration", "3d render", "film photograph"]),
    ("illustration", &["photograph", "sketch", "comic art", "digital art"]),
    ("3d render", &["digital art", "clay render", "photograph"]),
    ("sketch", &["line drawing", "charcoal", "illustration"]),
    ("cyberpunk", &["steampunk", "solarpunk", "retro futurism", "dieselpunk"]),
    ("steampunk", &["cyberpunk", "victorian", "dieselpunk"]),
    ("photorealistic", &["hyperrealistic", "stylized", "painterly", "cel shaded"]),
    ("cinematic", &["documentary", "editorial", "film noir"]),
    ("surreal", &["dreamlike", "realistic", "abstract"]),
    ("anime", &["manga", "studio ghibli style", "cartoon"]),
    ("serene", &["tranquil", "peaceful", "calm", "dramatic"]),
    ("dramatic", &["serene", "intense", "epic", "subtle"]),
    ("moody", &["cheerful", "atmospheric", "brooding"]),
    ("mysterious", &["enigmatic", "eerie", "whimsical"]),
    ("ethereal", &["otherworldly", "dreamy", "grounded"]),
    ("whimsical", &["playful", "mysterious", "fantastical"]),
    ("pastel", &["vibrant", "muted", "neon"]),
    ("monochrome", &["full color", "sepia", "duotone"]),
    ("vibrant", &["muted", "pastel", "saturated"]),
];

const GENERIC_ALTERNATIVES: &[&str] = &["subtle", "vivid", "dramatic", "minimal"];

/// Words that are never promoted to tokens on their own.
pub(crate) const STOPWORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "of", "in", "on", "at", "to", "for", "with", "by",
    "from", "into", "onto", "over", "under", "this", "that", "these", "those", "there", "their",
    "its", "is", "are", "was", "were", "be", "been", "being", "has", "have", "had", "very",
    "some", "more", "most", "such", "while", "where", "which", "within", "without", "featuring",
    "showing", "image", "picture", "style",
];

fn category_alternatives(role: RoleTag) -> &'static [&'static str] {
    match role {
        RoleTag::Subject => &["figure", "character", "creature", "silhouette"],
        RoleTag::Style => &["photorealistic", "impressionist", "minimalist", "surreal"],
        RoleTag::Medium => &["oil painting", "watercolor", "digital art", "photograph"],
        RoleTag::Lighting => &["golden hour", "soft lighting", "dramatic lighting", "neon glow"],
        RoleTag::Color => &["vibrant", "muted", "pastel", "monochrome"],
        RoleTag::Mood => &["serene", "dramatic", "mysterious", "joyful"],
        RoleTag::Composition => &["close-up", "wide shot", "aerial view", "symmetrical"],
        RoleTag::Camera => &["35mm", "85mm", "wide angle", "macro"],
        RoleTag::Setting => &["forest", "city street", "beach", "mountain valley"],
        RoleTag::Quality => &["high quality", "highly detailed", "masterpiece", "8k"],
        RoleTag::Detail => &[],
    }
}

/// Replacement candidates for `text`: the per-term entry if one exists, else
/// the per-category list, else a generic set. Never contains `text` itself.
pub(crate) fn alternatives_for(text: &str, role: RoleTag) -> Vec<String> {
    let lowered = text.trim().to_lowercase();
    let table = TERM_ALTERNATIVES
        .iter()
        .find(|(term, _)| *term == lowered)
        .map(|(_, alts)| *alts)
        .filter(|alts| !alts.is_empty())
        .or_else(|| Some(category_alternatives(role)).filter(|alts| !alts.is_empty()))
        .unwrap_or(GENERIC_ALTERNATIVES);

    let mut alternatives: Vec<String> = table
        .iter()
        .filter(|alt| !alt.eq_ignore_ascii_case(&lowered))
        .map(|alt| alt.to_string())
        .collect();
    if alternatives.is_empty() {
        alternatives = GENERIC_ALTERNATIVES
            .iter()
            .filter(|alt| !alt.eq_ignore_ascii_case(&lowered))
            .map(|alt| alt.to_string())
            .collect();
    }
    alternatives
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocabulary_terms_are_lowercase_and_unique() {
        let mut seen = std::collections::HashSet::new();
        for (_, terms) in VOCABULARY {
            for term in *terms {
                assert_eq!(*term, term.to_lowercase());
                assert!(seen.insert(*term), "duplicate vocabulary term {term}");
            }
        }
    }

    #[test]
    fn term_entry_takes_precedence() {
        let alts = alternatives_for("Golden Hour", RoleTag::Lighting);
        assert_eq!(alts, vec!["blue hour", "sunset", "sunrise", "twilight"]);
    }

    #[test]
    fn category_entry_excludes_the_term_itself() {
        let alts = alternatives_for("forest", RoleTag::Setting);
        assert!(!alts.contains(&"forest".to_string()));
        assert!(alts.contains(&"beach".to_string()));
    }

    #[test]
    fn generic_set_covers_unknown_detail_words() {
        let alts = alternatives_for("lantern", RoleTag::Detail);
        assert_eq!(alts, vec!["subtle", "vivid", "dramatic", "minimal"]);
    }

    #[test]
    fn every_vocabulary_term_has_alternatives() {
        for (role, terms) in VOCABULARY {
            for term in *terms {
                assert!(!alternatives_for(term, *role).is_empty(), "{term}");
            }
        }
    }
}
