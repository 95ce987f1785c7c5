use async_trait::async_trait;
use ilm_core::{
    BackendUnavailable, Category, FragmentQuery, KnowledgeFragments, Language, QaUnit, Source,
};

use crate::KnowledgeBackend;

const ASH_SHARH_5_6: &str = "فَإِنَّ مَعَ الْعُسْرِ يُسْرًا ۝ إِنَّ مَعَ الْعُسْرِ يُسْرًا";
const ASH_SHARH_5_6_TRANSLIT: &str = "Fa inna ma'al-'usri yusra. Inna ma'al-'usri yusra.";
const INTENTIONS: &str = "إِنَّمَا الْأَعْمَالُ بِالنِّيَّاتِ، وَإِنَّمَا لِكُلِّ امْرِئٍ مَا نَوَى";
const INTENTIONS_TRANSLIT: &str = "Innamal-a'malu bin-niyyat, wa innama li-kullim-ri'in ma nawa.";
const AL_BAQARAH_153: &str = "يَا أَيُّهَا الَّذِينَ آمَنُوا اسْتَعِينُوا بِالصَّبْرِ وَالصَّلَاةِ ۚ إِنَّ اللَّهَ مَعَ الصَّابِرِينَ";
const AL_BAQARAH_153_TRANSLIT: &str =
    "Ya ayyuhal-ladhina amanus-ta'inu bis-sabri was-salah. Innallaha ma'as-sabirin.";

/// Canned, verifiable content: one entry per category, in English and
/// Arabic. Other languages are reported as unavailable so the caller can
/// degrade instead of mislabelling English text.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticKnowledgeBackend;

#[async_trait]
impl KnowledgeBackend for StaticKnowledgeBackend {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn fetch_fragments(
        &self,
        query: &FragmentQuery,
    ) -> Result<KnowledgeFragments, BackendUnavailable> {
        let primary = unit_for(query.category, query.primary_language).ok_or_else(|| {
            BackendUnavailable::new(
                self.name(),
                format!(
                    "no static content pack for language `{}`",
                    query.primary_language.as_code()
                ),
            )
        })?;
        let secondary = query
            .secondary_language
            .and_then(|language| unit_for(query.category, language));

        Ok(KnowledgeFragments {
            intro: intro_for(query.category, query.primary_language),
            primary,
            secondary,
            advice: advice_for(query.category, query.primary_language),
            voiceover_primary: None,
            voiceover_secondary: None,
            background_suggestions: Vec::new(),
        })
    }
}

fn unit_for(category: Category, language: Language) -> Option<QaUnit> {
    match language {
        Language::En => Some(english(category)),
        Language::Ar => Some(arabic(category)),
        _ => None,
    }
}

/// The pack holds one biography only, so it says whose life it describes.
fn intro_for(category: Category, language: Language) -> Option<String> {
    match (category, language) {
        (Category::Biography, Language::Ar) => Some(
            "هذه سيرة نموذجية من المحتوى المدمج عن أبي بكر الصديق رضي الله عنه، وليست بالضرورة الشخصية التي سألت عنها."
                .to_string(),
        ),
        (Category::Biography, _) => Some(
            "Sample entry from the built-in pack: this covers Abu Bakr as-Siddiq and may not be the person you asked about."
                .to_string(),
        ),
        _ => None,
    }
}

fn advice_for(category: Category, language: Language) -> Option<String> {
    match (category, language) {
        (Category::LifeAdvice, Language::En) => Some(
            "Pair steady effort with prayer, and talk to someone you trust if the weight feels too heavy to carry alone."
                .to_string(),
        ),
        (Category::LifeAdvice, Language::Ar) => Some(
            "اجمع بين العمل الدؤوب والدعاء، وتحدّث إلى من تثق به إن ثقل عليك الحمل.".to_string(),
        ),
        _ => None,
    }
}

fn english(category: Category) -> QaUnit {
    match category {
        Category::Quran => QaUnit {
            original_text: Some(ASH_SHARH_5_6.to_string()),
            transliteration: Some(ASH_SHARH_5_6_TRANSLIT.to_string()),
            translations: lines(&[
                "For indeed, with hardship [will be] ease. Indeed, with hardship [will be] ease. (Sahih International)",
            ]),
            sources: vec![Source::new("Qur'an, Surah Ash-Sharh", "94:5-6")],
            verification_path: Some("https://quran.com/94/5-6".to_string()),
            highlights: lines(&[
                "The promise is repeated twice for emphasis.",
                "'Al-'usr' (hardship) is definite while 'yusr' (ease) is indefinite; commentators read this as one hardship met by more than one ease.",
            ]),
            examples: lines(&["Recite these verses when a difficult period feels endless."]),
            drills: lines(&[
                "Memorize 94:5-6 and recite them stopping at the end of each verse.",
            ]),
            ..QaUnit::default()
        },
        Category::Hadith => QaUnit {
            original_text: Some(INTENTIONS.to_string()),
            transliteration: Some(INTENTIONS_TRANSLIT.to_string()),
            translations: lines(&[
                "Actions are only by intentions, and every person will have only what they intended.",
            ]),
            sources: vec![
                Source::new("Sahih al-Bukhari", "Hadith 1"),
                Source::new("Sahih Muslim", "Hadith 1907"),
            ],
            verification_path: Some("https://sunnah.com/bukhari:1".to_string()),
            highlights: lines(&[
                "Narrated by 'Umar ibn al-Khattab.",
                "Scholars count it among the hadiths on which the religion turns.",
            ]),
            examples: lines(&[
                "The same hour of study becomes worship when done seeking Allah's pleasure.",
            ]),
            drills: lines(&["Before your next task, state your intention for it in one sentence."]),
            ..QaUnit::default()
        },
        Category::Biography => QaUnit {
            sources: vec![
                Source::new("Qur'an, Surah At-Tawbah", "9:40"),
                Source::new("Sahih al-Bukhari", "Hadith 3653"),
            ],
            verification_path: Some("https://quran.com/9/40".to_string()),
            highlights: lines(&[
                "Abu Bakr as-Siddiq was among the first to accept Islam and the Prophet's ﷺ closest companion.",
                "He accompanied the Prophet ﷺ in the cave of Thawr during the Hijrah, referred to in Qur'an 9:40.",
                "He became the first caliph after the Prophet's ﷺ death.",
            ]),
            timeline: lines(&[
                "c. 573 CE: born in Makkah",
                "610 CE onward: among the earliest Muslims",
                "622 CE: the Hijrah to Madinah with the Prophet ﷺ",
                "632 CE: becomes the first caliph",
                "634 CE: dies in Madinah and is buried beside the Prophet ﷺ",
            ]),
            ..QaUnit::default()
        },
        Category::LifeAdvice => QaUnit {
            original_text: Some(AL_BAQARAH_153.to_string()),
            transliteration: Some(AL_BAQARAH_153_TRANSLIT.to_string()),
            translations: lines(&[
                "O you who have believed, seek help through patience and prayer. Indeed, Allah is with the patient. (Sahih International)",
            ]),
            sources: vec![Source::new("Qur'an, Surah Al-Baqarah", "2:153")],
            verification_path: Some("https://quran.com/2/153".to_string()),
            highlights: lines(&[
                "Patience and prayer are named together as the means of seeking help.",
                "The verse closes with the promise that Allah is with the patient.",
            ]),
            examples: lines(&[
                "Pray two units of voluntary prayer before a hard conversation.",
                "Break a heavy task into small steps and keep to one step a day.",
            ]),
            ..QaUnit::default()
        },
        Category::Tajwid => QaUnit {
            sources: vec![Source::new(
                "Al-Muqaddimah al-Jazariyyah (Ibn al-Jazari)",
                "verse on the letters of qalqalah: قُطْبُ جَدٍّ",
            )],
            verification_path: Some("https://quran.com/113/1".to_string()),
            highlights: lines(&[
                "Qalqalah is an echoing bounce on a letter carrying sukun.",
                "Its five letters are gathered in the phrase قُطْبُ جَدٍّ (qutbu jad): ق ط ب ج د.",
                "It is strongest when stopping on the letter at the end of a verse.",
            ]),
            examples: lines(&[
                "الْفَلَقِ (Al-Falaq 113:1): stopping on the final qaf gives a strong qalqalah.",
                "أَحَدٌ (Al-Ikhlas 112:1): stopping on the final dal.",
                "يَجْعَلُونَ (Al-Baqarah 2:19): the jim with sukun inside the word gives a light qalqalah.",
            ]),
            drills: lines(&[
                "Recite Surah Al-Ikhlas stopping on every verse ending; listen for the bounce on the dal.",
                "Read Surah Al-Falaq slowly and mark each qalqalah letter that carries sukun.",
                "Record yourself and compare with a recognized reciter.",
            ]),
            ..QaUnit::default()
        },
        Category::Memorization => QaUnit {
            sources: vec![Source::new("Sahih al-Bukhari", "Hadith 5027")],
            verification_path: Some("https://sunnah.com/bukhari:5027".to_string()),
            highlights: lines(&[
                "The Prophet ﷺ said: the best of you are those who learn the Qur'an and teach it.",
                "Small daily portions with regular review outlast long, irregular sessions.",
            ]),
            examples: lines(&[
                "Memorize one line after Fajr and recite it in your voluntary prayers that day.",
            ]),
            drills: lines(&[
                "Read the new portion 10 times from the mushaf, then 10 times from memory.",
                "Recite yesterday's portion before starting today's.",
                "Once a week, recite everything memorized so far to a teacher or a friend.",
            ]),
            ..QaUnit::default()
        },
    }
}

fn arabic(category: Category) -> QaUnit {
    match category {
        Category::Quran => QaUnit {
            original_text: Some(ASH_SHARH_5_6.to_string()),
            transliteration: Some(ASH_SHARH_5_6_TRANSLIT.to_string()),
            translations: lines(&["المعنى: إنّ مع الشدة فرجًا، وتكرار الجملة للتأكيد."]),
            sources: vec![Source::new("القرآن الكريم، سورة الشرح", "94:5-6")],
            verification_path: Some("https://quran.com/94/5-6".to_string()),
            highlights: lines(&[
                "تكرار الوعد مرتين للتأكيد.",
                "«العسر» معرّف و«يسرًا» منكّر، فذكر المفسرون أن العسر الواحد لا يغلب يسرين.",
            ]),
            examples: lines(&["تلاوة الآيتين عند الشعور بأن الضيق لن ينتهي."]),
            drills: lines(&["احفظ الآيتين واقرأهما مع الوقف عند رأس كل آية."]),
            ..QaUnit::default()
        },
        Category::Hadith => QaUnit {
            original_text: Some(INTENTIONS.to_string()),
            transliteration: Some(INTENTIONS_TRANSLIT.to_string()),
            translations: lines(&["المعنى: صحة العمل وثوابه بحسب نية صاحبه."]),
            sources: vec![
                Source::new("صحيح البخاري", "حديث 1"),
                Source::new("صحيح مسلم", "حديث 1907"),
            ],
            verification_path: Some("https://sunnah.com/bukhari:1".to_string()),
            highlights: lines(&[
                "رواه عمر بن الخطاب رضي الله عنه.",
                "عدّه العلماء من الأحاديث التي يدور عليها الدين.",
            ]),
            examples: lines(&["طلب العلم نفسه يكون عبادة إذا قُصد به وجه الله."]),
            drills: lines(&["قبل عملك القادم، اكتب نيتك فيه في جملة واحدة."]),
            ..QaUnit::default()
        },
        Category::Biography => QaUnit {
            sources: vec![
                Source::new("القرآن الكريم، سورة التوبة", "9:40"),
                Source::new("صحيح البخاري", "حديث 3653"),
            ],
            verification_path: Some("https://quran.com/9/40".to_string()),
            highlights: lines(&[
                "أبو بكر الصديق من أوائل من أسلم، وأقرب الصحابة إلى النبي ﷺ.",
                "صحب النبي ﷺ في غار ثور أثناء الهجرة، وإليه الإشارة في سورة التوبة 9:40.",
                "أول الخلفاء بعد وفاة النبي ﷺ.",
            ]),
            timeline: lines(&[
                "نحو 573م: وُلد في مكة",
                "622م: الهجرة إلى المدينة مع النبي ﷺ",
                "632م: تولّى الخلافة",
                "634م: توفي في المدينة ودُفن بجوار النبي ﷺ",
            ]),
            ..QaUnit::default()
        },
        Category::LifeAdvice => QaUnit {
            original_text: Some(AL_BAQARAH_153.to_string()),
            transliteration: Some(AL_BAQARAH_153_TRANSLIT.to_string()),
            translations: lines(&[
                "المعنى: اطلبوا العون على أموركم بالصبر والصلاة، والله مع الصابرين بعونه وتأييده.",
            ]),
            sources: vec![Source::new("القرآن الكريم، سورة البقرة", "2:153")],
            verification_path: Some("https://quran.com/2/153".to_string()),
            highlights: lines(&[
                "قرنت الآية بين الصبر والصلاة وسيلتين للاستعانة.",
                "خُتمت الآية بوعد معية الله للصابرين.",
            ]),
            examples: lines(&[
                "صلِّ ركعتين قبل حديث صعب.",
                "قسّم المهمة الثقيلة خطوات صغيرة وداوم على خطوة كل يوم.",
            ]),
            ..QaUnit::default()
        },
        Category::Tajwid => QaUnit {
            sources: vec![Source::new(
                "المقدمة الجزرية (ابن الجزري)",
                "بيت حروف القلقلة: قُطْبُ جَدٍّ",
            )],
            verification_path: Some("https://quran.com/113/1".to_string()),
            highlights: lines(&[
                "القلقلة اضطراب الصوت عند النطق بالحرف الساكن حتى تُسمع له نبرة.",
                "حروفها مجموعة في «قُطْبُ جَدٍّ»: ق ط ب ج د.",
                "تكون أقوى عند الوقف على الحرف في آخر الآية.",
            ]),
            examples: lines(&[
                "الْفَلَقِ (الفلق 113:1): الوقف على القاف قلقلة كبرى.",
                "أَحَدٌ (الإخلاص 112:1): الوقف على الدال.",
                "يَجْعَلُونَ (البقرة 2:19): الجيم الساكنة وسط الكلمة قلقلة صغرى.",
            ]),
            drills: lines(&[
                "اقرأ سورة الإخلاص مع الوقف على رؤوس الآي وانتبه لقلقلة الدال.",
                "اقرأ سورة الفلق ببطء وحدّد كل حرف قلقلة ساكن.",
                "سجّل تلاوتك وقارنها بقارئ متقن.",
            ]),
            ..QaUnit::default()
        },
        Category::Memorization => QaUnit {
            sources: vec![Source::new("صحيح البخاري", "حديث 5027")],
            verification_path: Some("https://sunnah.com/bukhari:5027".to_string()),
            highlights: lines(&[
                "قال النبي ﷺ: «خيركم من تعلّم القرآن وعلّمه».",
                "المقدار اليومي القليل مع المراجعة المنتظمة أثبت من الجلسات الطويلة المتقطعة.",
            ]),
            examples: lines(&["احفظ سطرًا بعد الفجر وردّده في نوافلك خلال اليوم."]),
            drills: lines(&[
                "اقرأ المقطع الجديد عشر مرات من المصحف، ثم عشر مرات غيبًا.",
                "راجع مقطع الأمس قبل البدء بمقطع اليوم.",
                "مرة في الأسبوع، اعرض كل ما حفظته على معلم أو صديق.",
            ]),
            ..QaUnit::default()
        },
    }
}

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}
