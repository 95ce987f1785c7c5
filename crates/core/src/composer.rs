use unicode_segmentation::UnicodeSegmentation;

use crate::classifier::{detect_language, normalize_text};
use crate::error::TutorError;
use crate::models::{
    Answer, Category, Classification, KnowledgeFragments, Language, QaUnit, Voiceover,
};
use crate::policy::safety_note;
use crate::schema::validate_answer;

pub const MIN_QUESTION_GRAPHEMES: usize = 2;

const DEFAULT_BACKGROUND_SUGGESTIONS: [&str; 3] = [
    "soft natural ambience (light rain or wind), no instruments",
    "quiet room tone",
    "a brief pause of silence between sections",
];

/// Which language each answer block is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerLanguages {
    pub primary: Language,
    pub secondary: Option<Language>,
}

impl AnswerLanguages {
    /// Explicit preference first, then the question's script, then the
    /// configured default. The secondary block uses the first configured
    /// language that differs from the primary, unless disabled.
    pub fn resolve(
        preferred: Option<&str>,
        question: &str,
        default_primary: Language,
        default_secondary: Option<Language>,
    ) -> Self {
        let default_primary = if default_primary.is_known() {
            default_primary
        } else {
            Language::En
        };
        let explicit = Language::from_optional_str(preferred);
        let primary = match detect_language(Some(explicit), question) {
            Language::Unknown => default_primary,
            detected => detected,
        };

        let secondary = default_secondary.and_then(|configured| {
            [configured, default_primary]
                .into_iter()
                .find(|candidate| candidate.is_known() && *candidate != primary)
        });

        Self { primary, secondary }
    }
}

/// Trims and collapses whitespace; rejects anything shorter than
/// [`MIN_QUESTION_GRAPHEMES`] user-perceived characters.
pub fn validate_question(question: &str) -> Result<String, TutorError> {
    let normalized = normalize_text(question);
    let length = normalized.graphemes(true).count();
    if length < MIN_QUESTION_GRAPHEMES {
        return Err(TutorError::invalid(
            "question",
            format!("must be at least {MIN_QUESTION_GRAPHEMES} characters after trimming"),
        ));
    }
    Ok(normalized)
}

/// Assembles a backend's fragments into an answer and validates it.
///
/// Nothing is invented here: sources and original text come only from the
/// fragments, and a fragment set that misses a required field is rejected
/// rather than patched.
pub fn compose_answer(
    classification: Classification,
    languages: AnswerLanguages,
    fragments: KnowledgeFragments,
) -> Result<Answer, TutorError> {
    let KnowledgeFragments {
        intro,
        primary,
        secondary,
        advice,
        voiceover_primary,
        voiceover_secondary,
        background_suggestions,
    } = fragments;

    let intro = non_blank(intro)
        .unwrap_or_else(|| default_intro(classification.category, languages.primary).to_string());

    let (secondary_language, secondary_block) = match (languages.secondary, secondary) {
        (Some(language), Some(block)) if !block.is_empty() => (Some(language), Some(block)),
        _ => (None, None),
    };

    let primary_script =
        non_blank(voiceover_primary).unwrap_or_else(|| narration(&intro, &primary));
    let secondary_script = secondary_block.as_ref().and_then(|block| {
        non_blank(voiceover_secondary.clone()).or_else(|| block.translations.first().cloned())
    });

    let answer = Answer {
        intro,
        category: Some(classification.category),
        primary_language: languages.primary,
        primary_block: primary,
        secondary_language,
        secondary_block,
        voiceover: Voiceover {
            primary_script,
            secondary_script,
            background_suggestions: background_or_default(background_suggestions),
        },
        advice: non_blank(advice),
        safety_notes: classification
            .careful_topic
            .map(|topic| safety_note(topic, languages.primary)),
    };

    validate_answer(&answer).map_err(TutorError::Composition)?;
    Ok(answer)
}

/// The safe static answer used when the knowledge backend cannot be reached.
/// Carries no category, no sources and no scripture.
pub fn fallback_answer(classification: Option<Classification>, language: Language) -> Answer {
    let language = if language.is_known() {
        language
    } else {
        Language::En
    };
    let intro = fallback_intro(language).to_string();

    let mut notes = vec![fallback_note(language).to_string()];
    if let Some(topic) = classification.and_then(|c| c.careful_topic) {
        notes.push(safety_note(topic, language));
    }

    Answer {
        voiceover: Voiceover {
            primary_script: intro.clone(),
            secondary_script: None,
            background_suggestions: background_or_default(Vec::new()),
        },
        intro,
        category: None,
        primary_language: language,
        primary_block: QaUnit::default(),
        secondary_language: None,
        secondary_block: None,
        advice: None,
        safety_notes: Some(notes.join("\n\n")),
    }
}

pub fn default_intro(category: Category, language: Language) -> &'static str {
    match (category, language) {
        (Category::Quran, Language::Ar) => "إليك الآية مع نطقها ومعناها ومصدرها للتحقق.",
        (Category::Hadith, Language::Ar) => "إليك الحديث مع نطقه ومعناه ومصدره للتحقق.",
        (Category::Biography, Language::Ar) => "إليك أبرز المحطات في هذه السيرة مع مصادرها.",
        (Category::LifeAdvice, Language::Ar) => "إليك توجيهًا عمليًا مستمدًا من النصوص.",
        (Category::Tajwid, Language::Ar) => "إليك القاعدة التجويدية مع أمثلة وتمارين.",
        (Category::Memorization, Language::Ar) => "إليك طريقة عملية للحفظ والمراجعة.",
        (Category::Quran, Language::Ur) => "یہ آیت اس کے تلفظ، معنی اور قابلِ تصدیق حوالے کے ساتھ پیش ہے۔",
        (Category::Hadith, Language::Ur) => "یہ حدیث اس کے تلفظ، معنی اور قابلِ تصدیق حوالے کے ساتھ پیش ہے۔",
        (Category::Biography, Language::Ur) => "اس سیرت کے اہم مراحل حوالوں کے ساتھ پیش ہیں۔",
        (Category::LifeAdvice, Language::Ur) => "نصوص سے ماخوذ عملی رہنمائی پیش ہے۔",
        (Category::Tajwid, Language::Ur) => "تجوید کا قاعدہ مثالوں اور مشقوں کے ساتھ پیش ہے۔",
        (Category::Memorization, Language::Ur) => "حفظ اور دہرائی کا ایک عملی طریقہ پیش ہے۔",
        (Category::Quran, Language::Fr) => {
            "Voici le verset avec sa translittération, son sens et une source vérifiable."
        }
        (Category::Hadith, Language::Fr) => {
            "Voici le hadith avec sa translittération, son sens et une source vérifiable."
        }
        (Category::Biography, Language::Fr) => {
            "Voici les moments clés de cette vie, avec leurs sources."
        }
        (Category::LifeAdvice, Language::Fr) => "Voici un conseil pratique tiré des textes.",
        (Category::Tajwid, Language::Fr) => {
            "Voici la règle de récitation avec des exemples et des exercices."
        }
        (Category::Memorization, Language::Fr) => {
            "Voici une méthode pratique pour mémoriser et retenir."
        }
        (Category::Quran, _) => {
            "Here is the verse with its transliteration, meaning and a source you can verify."
        }
        (Category::Hadith, _) => {
            "Here is the hadith with its transliteration, meaning and a source you can verify."
        }
        (Category::Biography, _) => "Here are the key moments of this life, with sources.",
        (Category::LifeAdvice, _) => "Here is practical guidance drawn from the texts.",
        (Category::Tajwid, _) => "Here is the recitation rule with examples and practice drills.",
        (Category::Memorization, _) => "Here is a practical way to memorize and retain.",
    }
}

fn fallback_intro(language: Language) -> &'static str {
    match language {
        Language::Ar => "تعذّر الوصول إلى مصدر المعرفة الآن، لذلك لن نجيب من الذاكرة حتى لا ننسب إلى النصوص ما ليس فيها.",
        Language::Ur => "اس وقت علمی ماخذ تک رسائی ممکن نہیں، اس لیے ہم یادداشت سے جواب نہیں دیں گے تاکہ نصوص کی طرف غلط بات منسوب نہ ہو۔",
        Language::Fr => "La source de connaissances est indisponible pour le moment ; aucune réponse n'est donnée de mémoire afin de ne rien attribuer aux textes qu'ils ne disent pas.",
        _ => "The knowledge source is unavailable right now, so no answer is given from memory to avoid attributing anything to the texts that they do not say.",
    }
}

fn fallback_note(language: Language) -> &'static str {
    match language {
        Language::Ar => "يُرجى المحاولة لاحقًا، أو سؤال معلم أو عالم موثوق، والتحقق من النصوص في مصادرها الأصلية.",
        Language::Ur => "براہ کرم بعد میں دوبارہ کوشش کریں، یا کسی معتبر استاد یا عالم سے رجوع کریں اور نصوص کو ان کے اصل مآخذ میں دیکھیں۔",
        Language::Fr => "Veuillez réessayer plus tard, ou interroger un enseignant ou un savant de confiance, et vérifier tout texte dans sa source d'origine.",
        _ => "Please try again later, or ask a trusted teacher or scholar, and verify any text in its original source.",
    }
}

fn narration(intro: &str, unit: &QaUnit) -> String {
    match unit.translations.first() {
        Some(translation) => format!("{intro} {translation}"),
        None => intro.to_string(),
    }
}

fn background_or_default(suggestions: Vec<String>) -> Vec<String> {
    let suggestions = suggestions
        .into_iter()
        .filter(|s| !s.trim().is_empty())
        .collect::<Vec<_>>();
    if suggestions.is_empty() {
        DEFAULT_BACKGROUND_SUGGESTIONS
            .iter()
            .map(|s| s.to_string())
            .collect()
    } else {
        suggestions
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}
