use serde::{Deserialize, Serialize};

/// Coarse sentiment polarity derived from the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mood {
    Positive,
    Negative,
    Neutral,
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Mood::Positive => "Positive",
            Mood::Negative => "Negative",
            Mood::Neutral => "Neutral",
        };
        f.write_str(label)
    }
}

/// Sentiment classification outcome: polarity plus 0-100 intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoodResult {
    pub mood: Mood,
    pub intensity: u8,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub prompt: Option<String>,
    pub city: Option<String>,
}

/// Basic-variant bundle: the exact JSON object the text-generation prompt
/// asks for, plain strings per category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicBundle {
    pub music: String,
    pub book: String,
    pub tv: String,
    pub podcast: String,
    pub food: String,
    pub mood_explanation: String,
}

/// One extended-variant category entry. `link` comes from the generated
/// JSON; `image_url` is attached afterwards by photo search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub value: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub value: String,
    pub author: String,
}

impl Default for Quote {
    fn default() -> Self {
        Self {
            value: "Every day is a new adventure.".to_string(),
            author: "Unknown".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalEvent {
    pub name: String,
    pub date: String,
    pub link: String,
}

/// Extended-variant bundle. A missing `quote` in the generated JSON takes
/// the fixed default; `localEvents` is capped at three entries after parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedBundle {
    pub music: Recommendation,
    pub book: Recommendation,
    pub movie: Recommendation,
    pub tv: Recommendation,
    pub podcast: Recommendation,
    pub food: Recommendation,
    pub activity: Recommendation,
    pub game: Recommendation,
    #[serde(default)]
    pub quote: Quote,
    pub mood_explanation: String,
    #[serde(default)]
    pub local_events: Vec<LocalEvent>,
}

/// Whichever bundle the configured variant produced.
#[derive(Debug, Clone, PartialEq)]
pub enum RecommendationBundle {
    Basic(BasicBundle),
    Extended(ExtendedBundle),
}

impl RecommendationBundle {
    /// Top-level soundtrack link for the response envelope.
    pub fn soundtrack_url(&self) -> String {
        match self {
            RecommendationBundle::Basic(b) => b.music.clone(),
            RecommendationBundle::Extended(b) => {
                b.music.link.clone().unwrap_or_else(|| b.music.value.clone())
            }
        }
    }

    pub fn mood_explanation(&self) -> &str {
        match self {
            RecommendationBundle::Basic(b) => &b.mood_explanation,
            RecommendationBundle::Extended(b) => &b.mood_explanation,
        }
    }
}
