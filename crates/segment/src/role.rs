//! Heuristic role (category) assignment for tokens.
//!
//! The classifier is an ordered list of case-insensitive patterns plus a
//! default. Rules are evaluated top to bottom and the first match wins. There
//! is no correctness contract beyond determinism: the same text always maps to
//! the same [`RoleTag`].

use std::fmt;

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// Coarse semantic category of a token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleTag {
    Subject,
    Style,
    Medium,
    Lighting,
    Color,
    Mood,
    Composition,
    Camera,
    Setting,
    Quality,
    #[default]
    Detail,
}

impl RoleTag {
    pub const ALL: [RoleTag; 11] = [
        RoleTag::Subject,
        RoleTag::Style,
        RoleTag::Medium,
        RoleTag::Lighting,
        RoleTag::Color,
        RoleTag::Mood,
        RoleTag::Composition,
        RoleTag::Camera,
        RoleTag::Setting,
        RoleTag::Quality,
        RoleTag::Detail,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RoleTag::Subject => "subject",
            RoleTag::Style => "style",
            RoleTag::Medium => "medium",
            RoleTag::Lighting => "lighting",
            RoleTag::Color => "color",
            RoleTag::Mood => "mood",
            RoleTag::Composition => "composition",
            RoleTag::Camera => "camera",
            RoleTag::Setting => "setting",
            RoleTag::Quality => "quality",
            RoleTag::Detail => "detail",
        }
    }

    /// Parses a category label as returned by a language model.
    ///
    /// Matching is case-insensitive and accepts a handful of synonyms. Unknown
    /// labels return `None` so the caller can fall back to [`RoleClassifier`].
    pub fn from_category(category: &str) -> Option<Self> {
        let normalized = category.trim().to_ascii_lowercase();
        let tag = match normalized.as_str() {
            "subject" | "object" | "character" | "person" | "creature" => RoleTag::Subject,
            "style" | "artist" | "art style" | "aesthetic" | "genre" => RoleTag::Style,
            "medium" | "technique" | "material" => RoleTag::Medium,
            "lighting" | "light" => RoleTag::Lighting,
            "color" | "colour" | "colors" | "colours" | "palette" => RoleTag::Color,
            "mood" | "atmosphere" | "emotion" | "tone" | "feeling" => RoleTag::Mood,
            "composition" | "framing" | "layout" | "pose" => RoleTag::Composition,
            "camera" | "lens" | "angle" | "shot" | "photography" => RoleTag::Camera,
            "setting" | "environment" | "location" | "background" | "scene" | "place" => {
                RoleTag::Setting
            }
            "quality" | "resolution" => RoleTag::Quality,
            "detail" | "details" | "other" | "modifier" | "misc" => RoleTag::Detail,
            _ => return None,
        };
        Some(tag)
    }
}

impl fmt::Display for RoleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A single `(pattern, role)` pair of the classifier.
#[derive(Debug, Clone)]
pub struct RoleRule {
    pattern: Regex,
    role: RoleTag,
}

impl RoleRule {
    /// Compiles `pattern` case-insensitively.
    pub fn new(pattern: &str, role: RoleTag) -> Result<Self, regex::Error> {
        let pattern = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        Ok(Self { pattern, role })
    }

    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    pub fn role(&self) -> RoleTag {
        self.role
    }
}

// Order matters: quality and lighting phrases often contain color or mood words.
const BUILTIN_RULES: &[(&str, RoleTag)] = &[
    (
        r"\b(high quality|best quality|masterpiece|\d+k|uhd|hdr|highly detailed|ultra detailed|intricate|award[- ]winning|sharp focus|resolution|high definition)\b",
        RoleTag::Quality,
    ),
    (
        r"\b(light|lighting|lit|glow|glowing|sunlight|moonlight|candlelight|golden hour|blue hour|backlit|rim light|shadows?|neon|volumetric|sunset|sunrise|twilight)\b",
        RoleTag::Lighting,
    ),
    (
        r"\b(bokeh|depth of field|lens|\d+mm|f/\d+(\.\d+)?|aperture|macro|telephoto|wide[- ]angle|fisheye|dslr|long exposure|tilt[- ]shift)\b",
        RoleTag::Camera,
    ),
    (
        r"\b(portrait|close[- ]up|full body|headshot|wide shot|aerial view|bird'?s[- ]eye|low angle|high angle|symmetr\w*|rule of thirds|centered|profile view)\b",
        RoleTag::Composition,
    ),
    (
        r"\b(red|orange|yellow|green|blue|purple|violet|pink|black|white|gr[ae]y|golden|silver|pastel|monochrome|vibrant|muted|teal|crimson|azure|emerald|colou?rful|sepia)\b",
        RoleTag::Color,
    ),
    (
        r"\b(moody|serene|calm|peaceful|dramatic|dark|eerie|whimsical|melancholic|joyful|mysterious|ethereal|cozy|tense|nostalgic|dreamy|gloomy|epic)\b",
        RoleTag::Mood,
    ),
    (
        r"\b(oil painting|watercolou?r|photograph\w*|digital art|digital painting|sketch|illustration|3d render|render|charcoal|pencil|acrylic|vector art|pixel art|sculpture|concept art)\b",
        RoleTag::Medium,
    ),
    (
        r"\b(style|impressionis\w*|surreal\w*|cyberpunk|steampunk|art deco|art nouveau|baroque|minimalis\w*|anime|realistic|photorealistic|hyperrealistic|cinematic|noir|fantasy|sci[- ]fi|vintage|retro)\b",
        RoleTag::Style,
    ),
    (
        r"\b(forest|city|street|beach|ocean|sea|mountains?|desert|room|studio|sky|space|garden|castle|village|interior|landscape|background|field|river|lake|jungle|meadow)\b",
        RoleTag::Setting,
    ),
    (
        r"\b(man|woman|person|girl|boy|child|cat|dog|bird|horse|animal|robot|dragon|knight|warrior|wizard|car|ship|house|tree|flower)s?\b",
        RoleTag::Subject,
    ),
];

static BUILTIN_CLASSIFIER: Lazy<RoleClassifier> = Lazy::new(|| {
    let rules = BUILTIN_RULES
        .iter()
        .map(|(pattern, role)| RoleRule::new(pattern, *role).expect("built-in role pattern compiles"))
        .collect();
    RoleClassifier::with_rules(rules, RoleTag::Detail)
});

/// Ordered first-match-wins role classifier.
#[derive(Debug, Clone)]
pub struct RoleClassifier {
    rules: Vec<RoleRule>,
    default: RoleTag,
}

impl RoleClassifier {
    pub fn with_rules(rules: Vec<RoleRule>, default: RoleTag) -> Self {
        Self { rules, default }
    }

    /// Returns the role of the first rule matching `text`, or the default.
    pub fn role_of(&self, text: &str) -> RoleTag {
        self.rules
            .iter()
            .find(|rule| rule.matches(text))
            .map_or(self.default, RoleRule::role)
    }

    pub fn rules(&self) -> &[RoleRule] {
        &self.rules
    }

    pub fn default_role(&self) -> RoleTag {
        self.default
    }
}

impl Default for RoleClassifier {
    fn default() -> Self {
        BUILTIN_CLASSIFIER.clone()
    }
}
