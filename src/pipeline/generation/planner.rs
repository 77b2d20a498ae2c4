use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use super::prompt::build_plan_prompt;
use super::repair::repair_json_structure;
use super::selection::{select_model, ModelSelector};
use super::types::{Exercise, LlmClient, Plan, ResponseMode, Section, Subsection};
use super::validation::check_plan_shape;
use super::GenerationError;
use crate::config::ModelRole;
use crate::pipeline::storage::PlanStore;

/// Minimal plan used whenever the model's plan cannot be used.
/// Always passes shape validation, whatever the title.
pub fn fallback_plan(title: &str) -> Plan {
    Plan {
        introduction: format!("Introduction to {title}"),
        sections: vec![Section {
            title: "Basic Concepts".to_string(),
            description: None,
            subsections: vec![Subsection {
                title: "Core Features".to_string(),
                description: "Essential features and concepts".to_string(),
            }],
        }],
        exercises: vec![],
        conclusion: format!("Key takeaways about {title}"),
    }
}

/// Why the fallback plan was used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    EmptyResponse,
    Unparseable(String),
    InvalidShape(String),
    Provider(String),
    NoModel,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyResponse => write!(f, "empty model response"),
            Self::Unparseable(e) => write!(f, "unparseable plan: {e}"),
            Self::InvalidShape(e) => write!(f, "invalid plan shape: {e}"),
            Self::Provider(e) => write!(f, "provider failure: {e}"),
            Self::NoModel => write!(f, "no plan model configured"),
        }
    }
}

impl From<GenerationError> for FallbackReason {
    fn from(e: GenerationError) -> Self {
        match e {
            e if e.is_provider_failure() => Self::Provider(e.to_string()),
            GenerationError::EmptyResponse => Self::EmptyResponse,
            GenerationError::JsonParsing(msg) => Self::Unparseable(msg),
            GenerationError::InvalidPlan(msg) => Self::InvalidShape(msg),
            GenerationError::NoModelAvailable(_) => Self::NoModel,
            other => Self::Unparseable(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanSource {
    Model,
    Fallback(FallbackReason),
}

impl PlanSource {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanOutcome {
    pub plan: Plan,
    pub source: PlanSource,
}

/// Turns title/topic/language into a validated plan.
/// prompt → model → repair → parse → persist → validate, with the fallback
/// plan substituted on any failure.
pub struct ArticlePlanner {
    llm: Arc<dyn LlmClient + Send + Sync>,
    selector: Arc<dyn ModelSelector + Send + Sync>,
    models: Vec<String>,
    store: Option<PlanStore>,
}

impl ArticlePlanner {
    pub fn new(
        llm: Arc<dyn LlmClient + Send + Sync>,
        selector: Arc<dyn ModelSelector + Send + Sync>,
        models: Vec<String>,
    ) -> Self {
        Self {
            llm,
            selector,
            models,
            store: None,
        }
    }

    /// Persist every parsed plan (before validation) into `store`.
    pub fn with_store(mut self, store: PlanStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Never fails; see [`ArticlePlanner::acquire_with_outcome`] for the source.
    pub fn acquire(&self, title: &str, topic: &str, language: &str) -> Plan {
        self.acquire_with_outcome(title, topic, language).plan
    }

    pub fn acquire_with_outcome(&self, title: &str, topic: &str, language: &str) -> PlanOutcome {
        match self.try_acquire(title, topic, language) {
            Ok(plan) => {
                tracing::info!(
                    sections = plan.sections.len(),
                    exercises = plan.exercises.len(),
                    "Plan acquired from model"
                );
                PlanOutcome {
                    plan,
                    source: PlanSource::Model,
                }
            }
            Err(e) => {
                let reason = FallbackReason::from(e);
                tracing::warn!(reason = %reason, "Using fallback plan");
                PlanOutcome {
                    plan: fallback_plan(title),
                    source: PlanSource::Fallback(reason),
                }
            }
        }
    }

    /// One attempt, no retry. Every failure is returned to the caller.
    pub fn try_acquire(
        &self,
        title: &str,
        topic: &str,
        language: &str,
    ) -> Result<Plan, GenerationError> {
        let model = select_model(self.selector.as_ref(), &self.models, ModelRole::Plan)?;
        let prompt = build_plan_prompt(title, topic, language);

        tracing::debug!(model = %model, "Requesting article plan");
        let raw = self.llm.complete(model, &prompt, ResponseMode::JsonObject)?;
        if raw.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        let repaired = repair_json_structure(&raw);
        let value: Value = serde_json::from_str(&repaired).map_err(|e| {
            tracing::warn!(error = %e, raw = %raw, "Plan response is not valid JSON after repair");
            GenerationError::JsonParsing(e.to_string())
        })?;

        self.persist(title, &value);

        check_plan_shape(&value).map_err(GenerationError::InvalidPlan)?;
        Ok(plan_from_value(&value))
    }

    fn persist(&self, title: &str, value: &Value) {
        let Some(store) = &self.store else {
            return;
        };
        match store.save(title, value) {
            Ok(path) => tracing::debug!(path = %path.display(), "Plan saved"),
            Err(e) => tracing::warn!(error = %e, "Failed to save plan artifact"),
        }
    }
}

/// Build a Plan from an already shape-checked value. Text fields holding
/// other scalars are rendered as JSON text; `null` becomes empty.
fn plan_from_value(value: &Value) -> Plan {
    let sections = value["sections"]
        .as_array()
        .map(|items| items.iter().map(section_from_value).collect())
        .unwrap_or_default();

    let exercises = value
        .get("exercises")
        .or_else(|| value.get("exercices"))
        .and_then(Value::as_array);

    Plan {
        introduction: text_of(&value["introduction"]),
        sections,
        exercises: parse_array_lenient::<Exercise>(exercises.map(Vec::as_slice)),
        conclusion: text_of(&value["conclusion"]),
    }
}

fn section_from_value(value: &Value) -> Section {
    let description = value
        .get("description")
        .filter(|d| !d.is_null())
        .map(text_of);
    let subsections = value["subsections"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .map(|s| Subsection {
                    title: text_of(&s["title"]),
                    description: text_of(&s["description"]),
                })
                .collect()
        })
        .unwrap_or_default();

    Section {
        title: text_of(&value["title"]),
        description,
        subsections,
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Items that fail to deserialize are skipped.
fn parse_array_lenient<T: for<'de> Deserialize<'de>>(items: Option<&[Value]>) -> Vec<T> {
    match items {
        None => vec![],
        Some(arr) => arr
            .iter()
            .filter_map(|v| serde_json::from_value(v.clone()).ok())
            .collect(),
    }
}
