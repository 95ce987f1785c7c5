mod openai;
mod static_pack;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use ilm_core::{BackendUnavailable, FragmentQuery, KnowledgeFragments};
use tracing::warn;

pub use openai::{OpenAiKnowledgeBackend, OpenAiSettings};
pub use static_pack::StaticKnowledgeBackend;

/// Source of answer content. The composer only ever sees this trait, so
/// swapping backends never touches composition logic.
#[async_trait]
pub trait KnowledgeBackend: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch_fragments(
        &self,
        query: &FragmentQuery,
    ) -> Result<KnowledgeFragments, BackendUnavailable>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    #[default]
    Static,
    OpenAi,
}

impl BackendKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "static" | "canned" | "offline" => Some(Self::Static),
            "openai" | "llm" | "generated" => Some(Self::OpenAi),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::OpenAi => "openai",
        }
    }
}

/// Builds the configured backend. Asking for the generation backend
/// without credentials degrades to the static pack.
pub fn load_backend(
    kind: BackendKind,
    openai: Option<OpenAiSettings>,
) -> Result<Arc<dyn KnowledgeBackend>> {
    match (kind, openai) {
        (BackendKind::Static, _) => Ok(Arc::new(StaticKnowledgeBackend)),
        (BackendKind::OpenAi, Some(settings)) => {
            Ok(Arc::new(OpenAiKnowledgeBackend::new(settings)?))
        }
        (BackendKind::OpenAi, None) => {
            warn!("openai backend selected without ILM_OPENAI_API_KEY; using static content");
            Ok(Arc::new(StaticKnowledgeBackend))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backend_kinds() {
        assert_eq!(BackendKind::parse(" OpenAI "), Some(BackendKind::OpenAi));
        assert_eq!(BackendKind::parse("static"), Some(BackendKind::Static));
        assert_eq!(BackendKind::parse("gpu"), None);
    }

    #[test]
    fn missing_credentials_fall_back_to_static() {
        let backend = load_backend(BackendKind::OpenAi, None).unwrap();
        assert_eq!(backend.name(), "static");
    }
}
