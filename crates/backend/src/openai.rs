use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use ilm_core::{
    required_fields, BackendUnavailable, FragmentQuery, KnowledgeFragments, QaUnit, Source,
};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::KnowledgeBackend;

const DEFAULT_MODEL: &str = "gpt-4.1-mini";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 20;
const MAX_ERROR_BODY_CHARS: usize = 300;

const SYSTEM_PROMPT: &str = "You are a careful teacher of Qur'an, hadith, seerah and tajwid. \
Answer only with a single JSON object. Quote Arabic text and cite sources only when you are certain \
they are exact; if you are not certain, leave the field empty rather than guessing. Never invent a \
hadith number, verse reference or book title.";

#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub request_timeout: Duration,
}

impl OpenAiSettings {
    /// `None` when no API key is configured.
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("ILM_OPENAI_API_KEY")
            .ok()
            .filter(|value| !value.trim().is_empty())?;
        let model = env::var("ILM_OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let base_url =
            env::var("ILM_OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let request_timeout = Duration::from_secs(
            env::var("ILM_OPENAI_REQUEST_TIMEOUT_SECONDS")
                .ok()
                .and_then(|value| value.trim().parse::<u64>().ok())
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECONDS),
        );

        Some(Self {
            api_key,
            model,
            base_url,
            request_timeout,
        })
    }
}

/// Generation backend speaking the OpenAI Responses API.
#[derive(Debug, Clone)]
pub struct OpenAiKnowledgeBackend {
    settings: OpenAiSettings,
    http_client: Client,
}

impl OpenAiKnowledgeBackend {
    pub fn new(settings: OpenAiSettings) -> Result<Self> {
        let http_client = Client::builder()
            .connect_timeout(Duration::from_secs(6))
            .timeout(settings.request_timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            settings,
            http_client,
        })
    }

    fn unavailable(&self, reason: impl Into<String>) -> BackendUnavailable {
        BackendUnavailable::new(self.name(), reason)
    }
}

#[async_trait]
impl KnowledgeBackend for OpenAiKnowledgeBackend {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn fetch_fragments(
        &self,
        query: &FragmentQuery,
    ) -> Result<KnowledgeFragments, BackendUnavailable> {
        let payload = build_payload(&self.settings.model, query);
        let url = format!("{}/responses", self.settings.base_url.trim_end_matches('/'));

        let response = self
            .http_client
            .post(url)
            .bearer_auth(self.settings.api_key.as_str())
            .json(&payload)
            .send()
            .await
            .map_err(|error| self.unavailable(format!("request failed: {error}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body = body.chars().take(MAX_ERROR_BODY_CHARS).collect::<String>();
            return Err(self.unavailable(format!(
                "non-success status {}: {body}",
                status.as_u16()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|error| self.unavailable(format!("response parse failed: {error}")))?;
        let text = extract_output_text(&body)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| self.unavailable("output text missing"))?;
        debug!(chars = text.len(), "generation backend returned output");

        parse_fragments(&text).map_err(|error| self.unavailable(error))
    }
}

fn build_payload(model: &str, query: &FragmentQuery) -> Value {
    let required = required_fields(query.category)
        .iter()
        .map(|field| field.as_str())
        .collect::<Vec<_>>();
    let secondary = query
        .secondary_language
        .map(|language| language.as_code())
        .unwrap_or("none");

    let instructions = format!(
        "Question category: {category}. Write `primary` in language `{primary}` and `secondary` in \
language `{secondary}` (omit `secondary` when it is `none`). The `primary` object MUST populate: \
{required}. Return JSON with keys: intro (string), primary (object), secondary (object or null), \
advice (string or null), voiceover_primary (string or null), voiceover_secondary (string or null), \
background_suggestions (array of strings). Each block object has: original_text, transliteration, \
translations (array), sources (array of {{title, reference}}), verification_path, highlights \
(array), timeline (array of dated entries), examples (array), drills (array).",
        category = query.category.as_str(),
        primary = query.primary_language.as_code(),
        required = required.join(", "),
    );

    json!({
        "model": model,
        "input": [
            {
                "role": "system",
                "content": [
                    { "type": "input_text", "text": SYSTEM_PROMPT },
                    { "type": "input_text", "text": instructions }
                ]
            },
            {
                "role": "user",
                "content": [
                    { "type": "input_text", "text": query.question }
                ]
            }
        ],
        "text": {
            "format": { "type": "json_object" }
        }
    })
}

fn extract_output_text(payload: &Value) -> Option<String> {
    if let Some(value) = payload.get("output_text").and_then(|value| value.as_str()) {
        return Some(value.to_string());
    }
    let output = payload.get("output")?.as_array()?;
    let chunks = output
        .iter()
        .filter_map(|item| item.get("content").and_then(|value| value.as_array()))
        .flatten()
        .filter(|content| content.get("type").and_then(|value| value.as_str()) == Some("output_text"))
        .filter_map(|content| content.get("text").and_then(|value| value.as_str()))
        .collect::<Vec<_>>();

    if chunks.is_empty() {
        None
    } else {
        Some(chunks.join(""))
    }
}

/// Model output as it arrives: any field may be missing, `null` or blank.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireFragments {
    intro: Option<String>,
    primary: Option<WireUnit>,
    secondary: Option<WireUnit>,
    advice: Option<String>,
    voiceover_primary: Option<String>,
    voiceover_secondary: Option<String>,
    background_suggestions: Option<Vec<Option<String>>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireUnit {
    original_text: Option<String>,
    transliteration: Option<String>,
    translations: Option<Vec<Option<String>>>,
    sources: Option<Vec<Option<WireSource>>>,
    verification_path: Option<String>,
    highlights: Option<Vec<Option<String>>>,
    timeline: Option<Vec<Option<String>>>,
    examples: Option<Vec<Option<String>>>,
    drills: Option<Vec<Option<String>>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireSource {
    title: Option<String>,
    reference: Option<String>,
}

impl From<WireFragments> for KnowledgeFragments {
    fn from(wire: WireFragments) -> Self {
        Self {
            intro: non_blank(wire.intro),
            primary: wire.primary.map(QaUnit::from).unwrap_or_default(),
            secondary: wire
                .secondary
                .map(QaUnit::from)
                .filter(|unit| !unit.is_empty()),
            advice: non_blank(wire.advice),
            voiceover_primary: non_blank(wire.voiceover_primary),
            voiceover_secondary: non_blank(wire.voiceover_secondary),
            background_suggestions: entries(wire.background_suggestions),
        }
    }
}

impl From<WireUnit> for QaUnit {
    fn from(wire: WireUnit) -> Self {
        Self {
            original_text: non_blank(wire.original_text),
            transliteration: non_blank(wire.transliteration),
            translations: entries(wire.translations),
            // A citation missing either half is dropped, never completed.
            sources: wire
                .sources
                .unwrap_or_default()
                .into_iter()
                .flatten()
                .filter_map(|source| {
                    Some(Source::new(
                        non_blank(source.title)?,
                        non_blank(source.reference)?,
                    ))
                })
                .collect(),
            verification_path: non_blank(wire.verification_path),
            highlights: entries(wire.highlights),
            timeline: entries(wire.timeline),
            examples: entries(wire.examples),
            drills: entries(wire.drills),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn entries(values: Option<Vec<Option<String>>>) -> Vec<String> {
    values
        .unwrap_or_default()
        .into_iter()
        .filter_map(non_blank)
        .collect()
}

fn parse_fragments(text: &str) -> std::result::Result<KnowledgeFragments, String> {
    let trimmed = text.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);

    serde_json::from_str::<WireFragments>(unfenced.trim())
        .map(KnowledgeFragments::from)
        .map_err(|error| format!("output is not valid fragment JSON: {error}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ilm_core::{compose_answer, AnswerLanguages, Category, Classification, Language};

    fn query() -> FragmentQuery {
        FragmentQuery {
            question: "What is qalqalah?".to_string(),
            category: Category::Tajwid,
            primary_language: Language::En,
            secondary_language: Some(Language::Ar),
        }
    }

    #[test]
    fn payload_names_required_fields_and_languages() {
        let payload = build_payload("test-model", &query());
        assert_eq!(payload["model"], "test-model");
        let instructions = payload["input"][0]["content"][1]["text"].as_str().unwrap();
        assert!(instructions.contains("drills, examples"));
        assert!(instructions.contains("language `ar`"));
        assert_eq!(payload["input"][1]["content"][0]["text"], "What is qalqalah?");
    }

    #[test]
    fn extracts_output_text_from_message_items() {
        let body = json!({
            "output": [
                { "type": "reasoning", "summary": [] },
                { "type": "message", "content": [
                    { "type": "output_text", "text": "{\"intro\":" },
                    { "type": "output_text", "text": "\"hi\"}" }
                ]}
            ]
        });
        assert_eq!(
            extract_output_text(&body).as_deref(),
            Some("{\"intro\":\"hi\"}")
        );
        assert!(extract_output_text(&json!({ "output": [] })).is_none());
    }

    #[test]
    fn parses_fenced_fragment_json() {
        let text = "```json\n{\"intro\":\"Qalqalah\",\"primary\":{\"drills\":[\"Recite 112\"],\"examples\":[\"113:1\"]}}\n```";
        let fragments = parse_fragments(text).unwrap();
        assert_eq!(fragments.intro.as_deref(), Some("Qalqalah"));
        assert_eq!(fragments.primary.drills, vec!["Recite 112".to_string()]);
        assert!(fragments.secondary.is_none());

        assert!(parse_fragments("not json").is_err());
    }

    #[test]
    fn blank_fields_from_a_cautious_model_are_omitted() {
        let text = r#"{"intro":"  ","primary":{"original_text":"","transliteration":" ",
            "drills":["Recite 112", ""],"examples":["113:1"],
            "sources":[{"title":"Al-Jazariyyah","reference":""}]},
            "secondary":{"original_text":""}}"#;
        let fragments = parse_fragments(text).unwrap();
        assert!(fragments.intro.is_none());
        assert!(fragments.primary.original_text.is_none());
        assert!(fragments.primary.transliteration.is_none());
        assert_eq!(fragments.primary.drills, vec!["Recite 112".to_string()]);
        assert!(fragments.primary.sources.is_empty());
        assert!(fragments.secondary.is_none());

        let classification = Classification {
            category: Category::Tajwid,
            careful_topic: None,
        };
        let languages = AnswerLanguages {
            primary: Language::En,
            secondary: None,
        };
        let answer = compose_answer(classification, languages, fragments).unwrap();
        assert!(answer.primary_block.original_text.is_none());
    }

    #[test]
    fn null_fields_are_read_as_empty() {
        let text = r#"{"intro":null,"primary":{"original_text":null,"translations":null,
            "sources":[null],"drills":["Stop on a qalqalah letter"],"examples":[null,"112:1"]},
            "secondary":null,"advice":null,"background_suggestions":null}"#;
        let fragments = parse_fragments(text).unwrap();
        assert!(fragments.primary.translations.is_empty());
        assert!(fragments.primary.sources.is_empty());
        assert_eq!(fragments.primary.examples, vec!["112:1".to_string()]);
        assert!(fragments.background_suggestions.is_empty());

        let fragments = parse_fragments(r#"{"primary":null}"#).unwrap();
        assert!(fragments.primary.is_empty());
    }
}
