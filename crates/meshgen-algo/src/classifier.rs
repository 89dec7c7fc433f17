use meshgen_core::model::Category;
use meshgen_core::report::Warning;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Keyword sets in priority order; the first set with a hit decides.
pub const KEYWORDS: [(Category, &[&str]); 5] = [
    (Category::Vehicle, &["car", "vehicle", "automobile"]),
    (Category::Seating, &["chair", "seat"]),
    (Category::Sphere, &["ball", "sphere", "round"]),
    (Category::Cube, &["box", "cube", "block"]),
    (Category::Cylinder, &["cylinder"]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchMode {
    /// Keyword anywhere in the text, so "scar" still hits "car".
    #[default]
    Substring,
    /// Keyword must be a whole alphanumeric token.
    WholeWord,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub match_mode: MatchMode,
}

pub struct Classifier {
    cfg: ClassifierConfig,
}

impl Classifier {
    pub fn new(cfg: ClassifierConfig) -> Self {
        Self { cfg }
    }

    pub fn classify(&self, text: &str) -> Category {
        let text = text.to_lowercase();
        let tokens: Vec<&str> = match self.cfg.match_mode {
            MatchMode::Substring => Vec::new(),
            MatchMode::WholeWord => text
                .split(|c: char| !c.is_alphanumeric())
                .filter(|t| !t.is_empty())
                .collect(),
        };

        for (category, words) in KEYWORDS {
            let hit = words.iter().any(|word| match self.cfg.match_mode {
                MatchMode::Substring => text.contains(word),
                MatchMode::WholeWord => tokens.contains(word),
            });
            if hit {
                return category;
            }
        }

        Category::Unknown
    }

    /// Like [`Classifier::classify`], also reporting the unknown-prompt warning.
    pub fn classify_with_warnings(&self, text: &str) -> (Category, Vec<Warning>) {
        let category = self.classify(text);
        let mut warnings = Vec::new();
        if category == Category::Unknown {
            warn!(prompt = text, "unknown object in prompt, defaulting to cube");
            warnings.push(Warning::new(
                "unknown_prompt",
                "Unknown object in prompt. Defaulting to cube.",
            ));
        }
        (category, warnings)
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(ClassifierConfig::default())
    }
}

pub fn classify(text: &str) -> Category {
    Classifier::default().classify(text)
}
