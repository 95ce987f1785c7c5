pub mod classifier;
pub mod composer;
pub mod error;
pub mod models;
pub mod planner;
pub mod policy;
pub mod schema;

pub use classifier::{classify, classify_question, detect_language, normalize_text};
pub use composer::{compose_answer, fallback_answer, validate_question, AnswerLanguages};
pub use error::{BackendUnavailable, SchemaRule, SchemaViolation, TutorError};
pub use models::*;
pub use planner::generate_plan;
pub use policy::{careful_topic, safety_note};
pub use schema::{
    required_fields, soft_warnings, validate_answer, validate_plan_request, validate_plan_response,
    QaField,
};
