mod config;

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use ilm_backend::{load_backend, KnowledgeBackend};
use ilm_core::{
    classify_question, compose_answer, fallback_answer, generate_plan, soft_warnings,
    validate_question, Answer, AnswerLanguages, AskInput, BackendUnavailable, FragmentQuery,
    KnowledgeFragments, PlanRequest, PlanResponse, TutorError,
};
use ilm_observability::AppMetrics;
use tokio::time::timeout;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

pub use config::{
    parse_backend, parse_primary_language, parse_secondary_language, parse_timeout_ms,
    TutorConfig,
};

/// Answers questions and builds study plans. Holds no per-request state, so
/// one instance serves concurrent callers.
#[derive(Clone)]
pub struct TutorAgent {
    backend: Arc<dyn KnowledgeBackend>,
    config: TutorConfig,
    metrics: Arc<AppMetrics>,
}

impl TutorAgent {
    pub fn new(
        backend: Arc<dyn KnowledgeBackend>,
        config: TutorConfig,
        metrics: Arc<AppMetrics>,
    ) -> Self {
        Self {
            backend,
            config,
            metrics,
        }
    }

    /// Builds the backend the config selects.
    pub fn from_config(config: TutorConfig, metrics: Arc<AppMetrics>) -> Result<Self> {
        let backend = load_backend(config.backend, config.openai.clone())?;
        Ok(Self::new(backend, config, metrics))
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn config(&self) -> &TutorConfig {
        &self.config
    }

    #[instrument(skip(self, input), fields(request_id = %Uuid::new_v4()))]
    pub async fn ask(&self, input: AskInput) -> Result<Answer, TutorError> {
        let started = Instant::now();
        self.metrics.inc_ask();

        let question = validate_question(&input.question).inspect_err(|_| {
            self.metrics.inc_invalid_input();
        })?;
        let classification = classify_question(&question);
        let languages = AnswerLanguages::resolve(
            input.preferred_language.as_deref(),
            &question,
            self.config.primary_language,
            self.config.secondary_language,
        );

        let query = FragmentQuery {
            question,
            category: classification.category,
            primary_language: languages.primary,
            secondary_language: languages.secondary,
        };

        let fragments = match self.fetch_bounded(&query).await {
            Ok(fragments) => fragments,
            Err(unavailable) => {
                self.metrics.inc_fallback();
                self.metrics.observe_latency(started.elapsed());
                warn!(
                    backend = %unavailable.backend,
                    reason = %unavailable.reason,
                    category = classification.category.as_str(),
                    "knowledge backend unavailable; returning fallback answer"
                );
                return Ok(fallback_answer(Some(classification), languages.primary));
            }
        };

        let missing = soft_warnings(&fragments.primary);
        if !missing.is_empty() {
            warn!(
                backend = self.backend.name(),
                missing = ?missing,
                "original text returned without transliteration or translation"
            );
        }

        let answer = compose_answer(classification, languages, fragments).inspect_err(|err| {
            self.metrics.inc_composition_failure();
            error!(
                backend = self.backend.name(),
                category = classification.category.as_str(),
                error = %err,
                "composed answer failed validation"
            );
        })?;

        self.metrics.observe_latency(started.elapsed());
        info!(
            user_id = input.user_id.as_deref().unwrap_or("anonymous"),
            category = classification.category.as_str(),
            careful_topic = ?classification.careful_topic,
            primary_language = answer.primary_language.as_code(),
            secondary = answer.secondary_block.is_some(),
            "question answered"
        );

        Ok(answer)
    }

    #[instrument(skip(self, request), fields(days = request.days_per_week))]
    pub fn plan(&self, request: PlanRequest) -> Result<PlanResponse, TutorError> {
        self.metrics.inc_plan();
        let plan = generate_plan(&request).inspect_err(|err| {
            if err.is_client_error() {
                self.metrics.inc_invalid_input();
            }
        })?;
        info!(entries = plan.daily_plan.len(), "study plan generated");
        Ok(plan)
    }

    /// A single attempt, cut off after the configured timeout.
    async fn fetch_bounded(
        &self,
        query: &FragmentQuery,
    ) -> Result<KnowledgeFragments, BackendUnavailable> {
        self.metrics.inc_backend_call();
        let limit = self.config.backend_timeout;
        match timeout(limit, self.backend.fetch_fragments(query)).await {
            Ok(result) => result,
            Err(_) => Err(BackendUnavailable::new(
                self.backend.name(),
                format!("no response within {} ms", limit.as_millis()),
            )),
        }
    }
}
