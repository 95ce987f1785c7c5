use serde::Serialize;

use crate::error::SchemaViolation;
use crate::models::{Answer, Category, Language, PlanRequest, PlanResponse, QaUnit, Source};

pub const MIN_DAYS_PER_WEEK: i64 = 1;
pub const MAX_DAYS_PER_WEEK: i64 = 7;
pub const MAX_MINUTES_PER_DAY: i64 = 24 * 60;
pub const PLAN_REMINDER_COUNT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QaField {
    OriginalText,
    Transliteration,
    Translations,
    Sources,
    VerificationPath,
    Highlights,
    Timeline,
    Examples,
    Drills,
}

impl QaField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OriginalText => "original_text",
            Self::Transliteration => "transliteration",
            Self::Translations => "translations",
            Self::Sources => "sources",
            Self::VerificationPath => "verification_path",
            Self::Highlights => "highlights",
            Self::Timeline => "timeline",
            Self::Examples => "examples",
            Self::Drills => "drills",
        }
    }

    pub fn is_present(self, unit: &QaUnit) -> bool {
        match self {
            Self::OriginalText => has_text(&unit.original_text),
            Self::Transliteration => has_text(&unit.transliteration),
            Self::Translations => !unit.translations.is_empty(),
            Self::Sources => !unit.sources.is_empty(),
            Self::VerificationPath => has_text(&unit.verification_path),
            Self::Highlights => !unit.highlights.is_empty(),
            Self::Timeline => !unit.timeline.is_empty(),
            Self::Examples => !unit.examples.is_empty(),
            Self::Drills => !unit.drills.is_empty(),
        }
    }
}

const SCRIPTURE_FIELDS: &[QaField] = &[
    QaField::OriginalText,
    QaField::Transliteration,
    QaField::Translations,
    QaField::Sources,
];

/// Mandatory primary-block fields per category. The composer asks backends
/// for these and the validator enforces them.
pub fn required_fields(category: Category) -> &'static [QaField] {
    match category {
        Category::Quran | Category::Hadith => SCRIPTURE_FIELDS,
        Category::Biography => &[QaField::Highlights, QaField::Timeline, QaField::Sources],
        Category::LifeAdvice => &[QaField::Highlights, QaField::Examples],
        Category::Tajwid => &[QaField::Drills, QaField::Examples],
        Category::Memorization => &[QaField::Drills, QaField::Highlights],
    }
}

pub fn validate_answer(answer: &Answer) -> Result<(), SchemaViolation> {
    require_text("intro", &answer.intro)?;
    require_language("primary_language", answer.primary_language)?;

    match answer.category {
        Some(category) => {
            for field in required_fields(category) {
                if !field.is_present(&answer.primary_block) {
                    return Err(SchemaViolation::missing(format!(
                        "primary_block.{}",
                        field.as_str()
                    )));
                }
            }
        }
        None => {
            // Uncategorized answers are the degraded fallback: they must explain
            // themselves and must not carry citations or scripture.
            if answer.safety_notes.is_none() {
                return Err(SchemaViolation::missing("safety_notes"));
            }
            if !answer.primary_block.sources.is_empty() {
                return Err(SchemaViolation::out_of_range(
                    "primary_block.sources",
                    "uncategorized answers cannot cite sources",
                ));
            }
            if answer.primary_block.original_text.is_some() {
                return Err(SchemaViolation::out_of_range(
                    "primary_block.original_text",
                    "uncategorized answers cannot quote original text",
                ));
            }
        }
    }
    check_unit("primary_block", &answer.primary_block)?;

    match (answer.secondary_language, answer.secondary_block.as_ref()) {
        (None, None) => {}
        (Some(language), Some(block)) => {
            require_language("secondary_language", language)?;
            if language == answer.primary_language {
                return Err(SchemaViolation::out_of_range(
                    "secondary_language",
                    "secondary language repeats the primary language",
                ));
            }
            if block.is_empty() {
                return Err(SchemaViolation::missing("secondary_block"));
            }
            check_unit("secondary_block", block)?;
        }
        (Some(_), None) => return Err(SchemaViolation::missing("secondary_block")),
        (None, Some(_)) => return Err(SchemaViolation::missing("secondary_language")),
    }

    require_text("voiceover.primary_script", &answer.voiceover.primary_script)?;
    check_optional_text(
        "voiceover.secondary_script",
        &answer.voiceover.secondary_script,
    )?;
    if answer.voiceover.background_suggestions.is_empty() {
        return Err(SchemaViolation::missing("voiceover.background_suggestions"));
    }
    check_entries(
        "voiceover.background_suggestions",
        &answer.voiceover.background_suggestions,
    )?;

    check_optional_text("advice", &answer.advice)?;
    check_optional_text("safety_notes", &answer.safety_notes)?;
    Ok(())
}

pub fn validate_plan_request(request: &PlanRequest) -> Result<(), SchemaViolation> {
    if !(MIN_DAYS_PER_WEEK..=MAX_DAYS_PER_WEEK).contains(&request.days_per_week) {
        return Err(SchemaViolation::out_of_range(
            "days_per_week",
            format!(
                "must be between {MIN_DAYS_PER_WEEK} and {MAX_DAYS_PER_WEEK}, got {}",
                request.days_per_week
            ),
        ));
    }
    if !(1..=MAX_MINUTES_PER_DAY).contains(&request.minutes_per_day) {
        return Err(SchemaViolation::out_of_range(
            "minutes_per_day",
            format!(
                "must be between 1 and {MAX_MINUTES_PER_DAY}, got {}",
                request.minutes_per_day
            ),
        ));
    }
    if !request.review_ratio.is_finite() || !(0.0..=1.0).contains(&request.review_ratio) {
        return Err(SchemaViolation::out_of_range(
            "review_ratio",
            format!("must be between 0.0 and 1.0, got {}", request.review_ratio),
        ));
    }
    require_text("base_language", &request.base_language)?;
    Ok(())
}

pub fn validate_plan_response(
    response: &PlanResponse,
    days_per_week: usize,
) -> Result<(), SchemaViolation> {
    require_text("summary", &response.summary)?;
    if response.daily_plan.len() != days_per_week {
        return Err(SchemaViolation::out_of_range(
            "daily_plan",
            format!(
                "expected {days_per_week} entries, got {}",
                response.daily_plan.len()
            ),
        ));
    }
    check_entries("daily_plan", &response.daily_plan)?;
    if response.reminders.len() != PLAN_REMINDER_COUNT {
        return Err(SchemaViolation::out_of_range(
            "reminders",
            format!(
                "expected {PLAN_REMINDER_COUNT} reminders, got {}",
                response.reminders.len()
            ),
        ));
    }
    check_entries("reminders", &response.reminders)
}

/// Soft invariant: quoted original text should come with a transliteration
/// and at least one translation. Returns the missing companions.
pub fn soft_warnings(unit: &QaUnit) -> Vec<QaField> {
    if !QaField::OriginalText.is_present(unit) {
        return Vec::new();
    }
    [QaField::Transliteration, QaField::Translations]
        .into_iter()
        .filter(|field| !field.is_present(unit))
        .collect()
}

fn check_unit(prefix: &str, unit: &QaUnit) -> Result<(), SchemaViolation> {
    check_optional_text(&format!("{prefix}.original_text"), &unit.original_text)?;
    check_optional_text(&format!("{prefix}.transliteration"), &unit.transliteration)?;
    check_optional_text(
        &format!("{prefix}.verification_path"),
        &unit.verification_path,
    )?;
    check_entries(&format!("{prefix}.translations"), &unit.translations)?;
    check_sources(&format!("{prefix}.sources"), &unit.sources)?;
    check_entries(&format!("{prefix}.highlights"), &unit.highlights)?;
    check_entries(&format!("{prefix}.timeline"), &unit.timeline)?;
    check_entries(&format!("{prefix}.examples"), &unit.examples)?;
    check_entries(&format!("{prefix}.drills"), &unit.drills)
}

fn check_sources(field: &str, sources: &[Source]) -> Result<(), SchemaViolation> {
    for (idx, source) in sources.iter().enumerate() {
        require_text(&format!("{field}[{idx}].title"), &source.title)?;
        require_text(&format!("{field}[{idx}].reference"), &source.reference)?;
    }
    Ok(())
}

fn check_entries(field: &str, entries: &[String]) -> Result<(), SchemaViolation> {
    for (idx, entry) in entries.iter().enumerate() {
        require_text(&format!("{field}[{idx}]"), entry)?;
    }
    Ok(())
}

fn check_optional_text(field: &str, value: &Option<String>) -> Result<(), SchemaViolation> {
    match value {
        Some(text) => require_text(field, text),
        None => Ok(()),
    }
}

fn require_text(field: &str, value: &str) -> Result<(), SchemaViolation> {
    if value.trim().is_empty() {
        Err(SchemaViolation::missing(field))
    } else {
        Ok(())
    }
}

fn require_language(field: &str, language: Language) -> Result<(), SchemaViolation> {
    if language.is_known() {
        Ok(())
    } else {
        Err(SchemaViolation::invalid_enum(
            field,
            "language must be one of en, ar, ur, fr",
        ))
    }
}

fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|text| !text.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaRule;
    use crate::models::Voiceover;

    fn tajwid_answer() -> Answer {
        Answer {
            intro: "Qalqalah is an echoing bounce on five letters.".to_string(),
            category: Some(Category::Tajwid),
            primary_language: Language::En,
            primary_block: QaUnit {
                examples: vec!["Al-Falaq 113:1 when stopping".to_string()],
                drills: vec!["Recite 112:1-4 stopping on each verse".to_string()],
                ..QaUnit::default()
            },
            secondary_language: None,
            secondary_block: None,
            voiceover: Voiceover {
                primary_script: "Qalqalah is an echoing bounce.".to_string(),
                secondary_script: None,
                background_suggestions: vec!["soft ambient pad".to_string()],
            },
            advice: None,
            safety_notes: None,
        }
    }

    #[test]
    fn accepts_complete_answer_and_is_idempotent() {
        let answer = tajwid_answer();
        assert!(validate_answer(&answer).is_ok());
        assert!(validate_answer(&answer).is_ok());
    }

    #[test]
    fn reports_missing_category_field() {
        let mut answer = tajwid_answer();
        answer.primary_block.drills.clear();
        let violation = validate_answer(&answer).unwrap_err();
        assert_eq!(violation.field, "primary_block.drills");
        assert_eq!(violation.rule, SchemaRule::MissingRequired);
    }

    #[test]
    fn rejects_blank_source_reference() {
        let mut answer = tajwid_answer();
        answer
            .primary_block
            .sources
            .push(Source::new("Al-Muqaddimah al-Jazariyyah", " "));
        let violation = validate_answer(&answer).unwrap_err();
        assert_eq!(violation.field, "primary_block.sources[0].reference");
    }

    #[test]
    fn uncategorized_answer_needs_safety_notes_and_no_citations() {
        let mut answer = tajwid_answer();
        answer.category = None;
        assert_eq!(
            validate_answer(&answer).unwrap_err().field,
            "safety_notes"
        );

        answer.safety_notes = Some("Please consult a qualified teacher.".to_string());
        answer.primary_block.sources.push(Source::new("Sahih al-Bukhari", "1"));
        assert_eq!(
            validate_answer(&answer).unwrap_err().rule,
            SchemaRule::OutOfRange
        );
    }

    #[test]
    fn unknown_language_is_invalid_enum() {
        let mut answer = tajwid_answer();
        answer.primary_language = Language::Unknown;
        assert_eq!(
            validate_answer(&answer).unwrap_err().rule,
            SchemaRule::InvalidEnum
        );
    }

    #[test]
    fn secondary_language_and_block_travel_together() {
        let mut answer = tajwid_answer();
        answer.secondary_language = Some(Language::Ar);
        assert_eq!(
            validate_answer(&answer).unwrap_err().field,
            "secondary_block"
        );
    }

    #[test]
    fn plan_request_ranges() {
        let mut request = PlanRequest {
            goal: None,
            days_per_week: 8,
            minutes_per_day: 20,
            review_ratio: 0.3,
            base_language: "en".to_string(),
        };
        assert_eq!(
            validate_plan_request(&request).unwrap_err().field,
            "days_per_week"
        );

        request.days_per_week = 3;
        request.review_ratio = f64::NAN;
        assert_eq!(
            validate_plan_request(&request).unwrap_err().field,
            "review_ratio"
        );

        request.review_ratio = 1.0;
        assert!(validate_plan_request(&request).is_ok());
    }

    #[test]
    fn soft_warning_for_untranslated_original_text() {
        let unit = QaUnit {
            original_text: Some("إِنَّمَا الْأَعْمَالُ بِالنِّيَّاتِ".to_string()),
            transliteration: Some("Innamal-a'malu bin-niyyat".to_string()),
            ..QaUnit::default()
        };
        assert_eq!(soft_warnings(&unit), vec![QaField::Translations]);
    }
}
