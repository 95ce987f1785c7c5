use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    En,
    Ar,
    Ur,
    Fr,
    Unknown,
}

impl Language {
    pub fn from_optional_str(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()) {
            Some(v) if v == "en" || v == "en-us" || v == "en-gb" || v == "english" => Self::En,
            Some(v) if v == "ar" || v == "ar-sa" || v == "arabic" => Self::Ar,
            Some(v) if v == "ur" || v == "ur-pk" || v == "urdu" => Self::Ur,
            Some(v) if v == "fr" || v == "fr-fr" || v == "french" => Self::Fr,
            _ => Self::Unknown,
        }
    }

    pub fn as_code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ar => "ar",
            Self::Ur => "ur",
            Self::Fr => "fr",
            Self::Unknown => "unknown",
        }
    }

    pub fn is_known(self) -> bool {
        self != Self::Unknown
    }
}

/// Question type. Drives which fields of the primary block are mandatory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Quran,
    Hadith,
    Biography,
    LifeAdvice,
    Tajwid,
    Memorization,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Quran,
        Category::Hadith,
        Category::Biography,
        Category::LifeAdvice,
        Category::Tajwid,
        Category::Memorization,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "quran" | "qur'an" => Some(Self::Quran),
            "hadith" => Some(Self::Hadith),
            "biography" | "seerah" => Some(Self::Biography),
            "life_advice" | "advice" => Some(Self::LifeAdvice),
            "tajwid" | "tajweed" => Some(Self::Tajwid),
            "memorization" | "hifz" => Some(Self::Memorization),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quran => "quran",
            Self::Hadith => "hadith",
            Self::Biography => "biography",
            Self::LifeAdvice => "life_advice",
            Self::Tajwid => "tajwid",
            Self::Memorization => "memorization",
        }
    }
}

/// Question areas answered only with a pointer to qualified people.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CarefulTopic {
    FiqhRuling,
    Medical,
    Legal,
    Political,
    Sectarian,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub category: Category,
    pub careful_topic: Option<CarefulTopic>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub reference: String,
}

impl Source {
    pub fn new(title: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            reference: reference.into(),
        }
    }
}

/// One language-specific knowledge block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QaUnit {
    pub original_text: Option<String>,
    pub transliteration: Option<String>,
    pub translations: Vec<String>,
    pub sources: Vec<Source>,
    pub verification_path: Option<String>,
    pub highlights: Vec<String>,
    pub timeline: Vec<String>,
    pub examples: Vec<String>,
    pub drills: Vec<String>,
}

impl QaUnit {
    pub fn is_empty(&self) -> bool {
        self.original_text.is_none()
            && self.transliteration.is_none()
            && self.translations.is_empty()
            && self.sources.is_empty()
            && self.verification_path.is_none()
            && self.highlights.is_empty()
            && self.timeline.is_empty()
            && self.examples.is_empty()
            && self.drills.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voiceover {
    pub primary_script: String,
    pub secondary_script: Option<String>,
    pub background_suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub intro: String,
    pub category: Option<Category>,
    pub primary_language: Language,
    pub primary_block: QaUnit,
    pub secondary_language: Option<Language>,
    pub secondary_block: Option<QaUnit>,
    pub voiceover: Voiceover,
    pub advice: Option<String>,
    pub safety_notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskInput {
    pub question: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub preferred_language: Option<String>,
}

/// Raw study-plan inputs. Integers stay signed so range checks, not
/// deserialization, reject negative values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
    #[serde(default)]
    pub goal: Option<String>,
    pub days_per_week: i64,
    pub minutes_per_day: i64,
    pub review_ratio: f64,
    pub base_language: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanResponse {
    pub summary: String,
    pub daily_plan: Vec<String>,
    pub reminders: Vec<String>,
}

/// What the composer asks a knowledge backend for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentQuery {
    pub question: String,
    pub category: Category,
    pub primary_language: Language,
    pub secondary_language: Option<Language>,
}

/// Structured content returned by a knowledge backend, before composition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeFragments {
    pub intro: Option<String>,
    pub primary: QaUnit,
    pub secondary: Option<QaUnit>,
    pub advice: Option<String>,
    pub voiceover_primary: Option<String>,
    pub voiceover_secondary: Option<String>,
    pub background_suggestions: Vec<String>,
}
