use once_cell::sync::Lazy;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

use crate::models::{Category, Classification, Language};
use crate::policy::careful_topic;

const TAJWID_TERMS: &[&str] = &[
    "tajwid",
    "tajweed",
    "makhraj",
    "makharij",
    "qalqalah",
    "qalqala",
    "ikhfa",
    "ikhfaa",
    "idgham",
    "izhar",
    "iqlab",
    "ghunnah",
    "ghunna",
    "madd",
    "tafkhim",
    "tarqiq",
    "pronunciation",
    "pronounce",
    "articulation",
    "rules of recitation",
    "recitation rules",
    "تجويد",
    "مخارج",
    "قلقلة",
    "إخفاء",
    "إدغام",
];

const MEMORIZATION_TERMS: &[&str] = &[
    "hifz",
    "hifdh",
    "hafiz",
    "hafidh",
    "memorize",
    "memorise",
    "memorizing",
    "memorising",
    "memorization",
    "memorisation",
    "plan",
    "schedule",
    "revision",
    "muraja'ah",
    "murajaah",
    "sabaq",
    "حفظ",
    "مراجعة",
];

const BIOGRAPHY_TERMS: &[&str] = &[
    "history",
    "historical",
    "sahaba",
    "sahabah",
    "companion",
    "companions",
    "biography",
    "seerah",
    "sirah",
    "life of",
    "caliph",
    "khalifa",
    "battle",
    "hijrah",
    "hijra",
    "سيرة",
    "الصحابة",
];

const LIFE_ADVICE_TERMS: &[&str] = &[
    "advice",
    "advise",
    "anxiety",
    "anxious",
    "sad",
    "sadness",
    "grief",
    "stress",
    "stressed",
    "patience",
    "sabr",
    "motivation",
    "motivated",
    "lonely",
    "anger",
    "angry",
    "parents",
    "forgive",
    "forgiveness",
    "hope",
    "struggling",
    "hardship",
    "cope",
    "coping",
    "tawakkul",
    "how can i",
    "نصيحة",
    "صبر",
];

const HADITH_TERMS: &[&str] = &[
    "hadith",
    "ahadith",
    "sunnah",
    "bukhari",
    "sahih muslim",
    "tirmidhi",
    "abu dawud",
    "ibn majah",
    "nasa'i",
    "narrated",
    "narration",
    "prophet said",
    "messenger said",
    "حديث",
    "السنة",
];

static PROPER_NOUN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(abu\s+bakr|umar|omar|uthman|othman|ali|khadijah?|aishah?|a'ishah?|fatimah?|bilal|khalid\s+ibn\s+al-walid|salman|hamzah?|musa|moses|ibrahim|abraham|isa|jesus|yusuf|joseph|nuh|noah|maryam|mary|prophet\s+muhammad)\b",
    )
    .expect("valid proper noun regex")
});

// Surah names reuse prophets' names ("Surah Yusuf") and must not read as biography.
static SURAH_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bsurah?\s+[\w'-]+").expect("valid surah regex"));

/// Lowercased text plus its word segmentation, shared by the term tables.
pub(crate) struct TermView {
    lower: String,
    /// Words joined by single spaces and padded, so phrases match on word boundaries.
    joined: String,
}

impl TermView {
    pub(crate) fn new(text: &str) -> Self {
        let lower = text.to_lowercase();
        let joined = format!(" {} ", lower.unicode_words().collect::<Vec<_>>().join(" "));
        Self { lower, joined }
    }

    /// ASCII words and phrases match whole words; other scripts match as
    /// substrings so attached prefixes such as "ال" still hit.
    pub(crate) fn contains_any(&self, terms: &[&str]) -> bool {
        terms.iter().any(|term| {
            if term.is_ascii() {
                let phrase = term.unicode_words().collect::<Vec<_>>().join(" ");
                !phrase.is_empty() && self.joined.contains(&format!(" {phrase} "))
            } else {
                self.lower.contains(term)
            }
        })
    }

    fn lower(&self) -> &str {
        &self.lower
    }
}

pub fn normalize_text(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn detect_language(explicit: Option<Language>, text: &str) -> Language {
    if let Some(language) = explicit {
        if language.is_known() {
            return language;
        }
    }

    let mut arabic_script = 0usize;
    let mut urdu_letters = 0usize;
    let mut latin = 0usize;

    for ch in text.chars().filter(|ch| ch.is_alphabetic()) {
        let code = ch as u32;
        if matches!(ch, 'ٹ' | 'ڈ' | 'ڑ' | 'ں' | 'ے' | 'ۓ' | 'ہ' | 'ھ') {
            urdu_letters += 1;
            arabic_script += 1;
        } else if (0x0600..=0x06FF).contains(&code)
            || (0x0750..=0x077F).contains(&code)
            || (0xFB50..=0xFDFF).contains(&code)
            || (0xFE70..=0xFEFF).contains(&code)
        {
            arabic_script += 1;
        } else if ch.is_ascii_alphabetic() || ('\u{00C0}'..='\u{024F}').contains(&ch) {
            latin += 1;
        }
    }

    if arabic_script > latin && urdu_letters > 0 {
        Language::Ur
    } else if arabic_script > latin {
        Language::Ar
    } else if latin > 0 {
        Language::En
    } else {
        Language::Unknown
    }
}

/// Total: every input, including the empty string, maps to a category.
/// The first match in tajwid > memorization > biography > life_advice >
/// hadith wins; anything else is treated as a Qur'an question.
pub fn classify(question: &str) -> Category {
    let view = TermView::new(question);

    if view.contains_any(TAJWID_TERMS) {
        return Category::Tajwid;
    }
    if view.contains_any(MEMORIZATION_TERMS) {
        return Category::Memorization;
    }
    if view.contains_any(BIOGRAPHY_TERMS) || mentions_person(view.lower()) {
        return Category::Biography;
    }
    if view.contains_any(LIFE_ADVICE_TERMS) {
        return Category::LifeAdvice;
    }
    if view.contains_any(HADITH_TERMS) {
        return Category::Hadith;
    }
    Category::Quran
}

pub fn classify_question(question: &str) -> Classification {
    Classification {
        category: classify(question),
        careful_topic: careful_topic(question),
    }
}

fn mentions_person(lower: &str) -> bool {
    let without_surah_names = SURAH_NAME.replace_all(lower, " ");
    PROPER_NOUN_PATTERN.is_match(&without_surah_names)
}
