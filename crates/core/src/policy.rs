use crate::classifier::TermView;
use crate::models::{CarefulTopic, Language};

const FIQH_RULING_TERMS: &[&str] = &[
    "halal",
    "haram",
    "permissible",
    "impermissible",
    "forbidden",
    "ruling",
    "fatwa",
    "fiqh",
    "makruh",
    "wajib",
    "obligatory",
    "sinful",
    "divorce",
    "talaq",
    "inheritance",
    "حلال",
    "حرام",
    "فتوى",
];

const MEDICAL_TERMS: &[&str] = &[
    "medicine",
    "medication",
    "disease",
    "illness",
    "doctor",
    "treatment",
    "cure",
    "diagnosis",
    "depression",
    "suicide",
    "suicidal",
    "self-harm",
    "pregnant",
    "pregnancy",
    "surgery",
];

const LEGAL_TERMS: &[&str] = &[
    "lawyer",
    "court",
    "lawsuit",
    "legal",
    "illegal",
    "immigration",
    "visa",
    "custody",
    "contract",
    "police",
];

const POLITICAL_TERMS: &[&str] = &[
    "politics",
    "political",
    "election",
    "elections",
    "vote",
    "voting",
    "government",
    "president",
    "protest",
    "party",
];

const SECTARIAN_TERMS: &[&str] = &[
    "sunni",
    "shia",
    "shiite",
    "salafi",
    "wahhabi",
    "sufi",
    "deobandi",
    "barelvi",
    "ahmadi",
    "sect",
    "sects",
    "sectarian",
    "takfir",
    "kafir",
];

/// Detects questions that get safety notes instead of a confident verdict.
/// First match in declaration order of [`CarefulTopic`] wins.
pub fn careful_topic(question: &str) -> Option<CarefulTopic> {
    let view = TermView::new(question);

    [
        (CarefulTopic::FiqhRuling, FIQH_RULING_TERMS),
        (CarefulTopic::Medical, MEDICAL_TERMS),
        (CarefulTopic::Legal, LEGAL_TERMS),
        (CarefulTopic::Political, POLITICAL_TERMS),
        (CarefulTopic::Sectarian, SECTARIAN_TERMS),
    ]
    .into_iter()
    .find(|(_, terms)| view.contains_any(terms))
    .map(|(topic, _)| topic)
}

pub fn safety_note(topic: CarefulTopic, language: Language) -> String {
    match (topic, language) {
        (CarefulTopic::FiqhRuling, Language::Ar) => {
            "هذه مسألة فقهية تختلف فيها الأحكام باختلاف الأحوال والمذاهب؛ يُرجى سؤال عالم موثوق أو جهة إفتاء معتمدة.".to_string()
        }
        (CarefulTopic::Medical, Language::Ar) => {
            "هذا ليس استشارة طبية. يُرجى مراجعة طبيب مختص، وفي حالات الطوارئ تواصل مع خدمات الإسعاف فورًا.".to_string()
        }
        (CarefulTopic::Legal, Language::Ar) => {
            "هذا ليس استشارة قانونية. القوانين تختلف من بلد لآخر؛ يُرجى مراجعة محامٍ مختص.".to_string()
        }
        (CarefulTopic::Political, Language::Ar) => {
            "نتجنب المواقف السياسية. نعرض النصوص ومصادرها فقط دون ترجيح سياسي.".to_string()
        }
        (CarefulTopic::Sectarian, Language::Ar) => {
            "المسائل الخلافية بين المدارس تحتاج إلى علم وإنصاف؛ يُرجى الرجوع إلى أهل العلم الموثوقين.".to_string()
        }
        (CarefulTopic::FiqhRuling, Language::Ur) => {
            "یہ ایک فقہی مسئلہ ہے جس کا حکم حالات اور مسلک کے مطابق بدلتا ہے؛ عمل سے پہلے کسی معتبر عالم یا دارالافتاء سے رجوع کریں۔".to_string()
        }
        (CarefulTopic::Medical, Language::Ur) => {
            "یہ طبی مشورہ نہیں ہے۔ براہ کرم کسی مستند معالج سے رجوع کریں، اور خطرے کی صورت میں فوراً ہنگامی خدمات سے رابطہ کریں۔".to_string()
        }
        (CarefulTopic::Legal, Language::Ur) => {
            "یہ قانونی مشورہ نہیں ہے۔ قوانین ہر ملک میں مختلف ہوتے ہیں؛ براہ کرم کسی مستند وکیل سے رجوع کریں۔".to_string()
        }
        (CarefulTopic::Political, Language::Ur) => {
            "ہم سیاسی موقف اختیار نہیں کرتے۔ صرف نصوص اور ان کے حوالے بغیر سیاسی تشریح کے پیش کیے جاتے ہیں۔".to_string()
        }
        (CarefulTopic::Sectarian, Language::Ur) => {
            "مسالک کے درمیان اختلافی مسائل علم اور انصاف کا تقاضا کرتے ہیں؛ براہ کرم معتبر اہلِ علم سے رجوع کریں۔".to_string()
        }
        (CarefulTopic::FiqhRuling, Language::Fr) => {
            "Cette question relève d'un avis juridique (fiqh). Le statut dépend des circonstances et de l'école ; consultez un savant qualifié ou une instance de fatwa reconnue avant d'agir.".to_string()
        }
        (CarefulTopic::Medical, Language::Fr) => {
            "Ceci n'est pas un avis médical. Consultez un professionnel de santé qualifié, et contactez immédiatement les secours en cas de danger.".to_string()
        }
        (CarefulTopic::Legal, Language::Fr) => {
            "Ceci n'est pas un avis juridique. Les lois varient selon les pays ; consultez un avocat qualifié.".to_string()
        }
        (CarefulTopic::Political, Language::Fr) => {
            "Nous ne prenons pas de position politique. Seuls les textes et leurs sources sont présentés, sans interprétation politique.".to_string()
        }
        (CarefulTopic::Sectarian, Language::Fr) => {
            "Les questions qui divisent les écoles demandent science et équité ; référez-vous à des savants qualifiés et de confiance.".to_string()
        }
        (CarefulTopic::FiqhRuling, _) => {
            "This touches on a fiqh ruling. Rulings depend on circumstances and school of thought; please ask a qualified scholar or a recognized fatwa body before acting on it.".to_string()
        }
        (CarefulTopic::Medical, _) => {
            "This is not medical advice. Please consult a qualified medical professional, and contact emergency services right away if you or someone else is in danger.".to_string()
        }
        (CarefulTopic::Legal, _) => {
            "This is not legal advice. Laws differ between countries; please consult a qualified lawyer.".to_string()
        }
        (CarefulTopic::Political, _) => {
            "We do not take political positions. Only the texts and their sources are presented, without political interpretation.".to_string()
        }
        (CarefulTopic::Sectarian, _) => {
            "Questions that divide schools of thought deserve knowledge and fairness; please refer to trusted, qualified scholars.".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_fiqh_before_medical() {
        assert_eq!(
            careful_topic("Is it haram to take this medicine during Ramadan?"),
            Some(CarefulTopic::FiqhRuling)
        );
    }

    #[test]
    fn ordinary_questions_are_not_flagged() {
        assert_eq!(careful_topic("What is qalqalah?"), None);
        // "party" only matches as a whole word.
        assert_eq!(careful_topic("Explain the word particle ma"), None);
    }

    #[test]
    fn sectarian_and_medical_detection() {
        assert_eq!(
            careful_topic("Which is right, sunni or shia?"),
            Some(CarefulTopic::Sectarian)
        );
        assert_eq!(
            careful_topic("Can dua cure my illness?"),
            Some(CarefulTopic::Medical)
        );
    }

    #[test]
    fn notes_are_localized() {
        let note = safety_note(CarefulTopic::Legal, Language::Ar);
        assert!(note.contains("محامٍ"));
        let note = safety_note(CarefulTopic::Legal, Language::Ur);
        assert!(note.contains("وکیل"));
        let note = safety_note(CarefulTopic::Medical, Language::Fr);
        assert!(note.contains("avis médical"));
        let note = safety_note(CarefulTopic::Legal, Language::Unknown);
        assert!(note.contains("lawyer"));
    }
}
