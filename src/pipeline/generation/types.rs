use serde::{Deserialize, Serialize};

use super::GenerationError;

/// Structured outline produced before any content is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub introduction: String,
    pub sections: Vec<Section>,
    #[serde(default, alias = "exercices")]
    pub exercises: Vec<Exercise>,
    pub conclusion: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    /// Optional body text some models add next to the title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub subsections: Vec<Subsection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subsection {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    pub title: String,
    pub description: String,
    pub solution: String,
}

/// The finished article, every content field already sanitized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleDocument {
    pub title: String,
    pub introduction: String,
    pub sections: Vec<ArticleSection>,
    pub conclusion: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSection {
    pub title: String,
    pub content: String,
    pub subsections: Vec<ArticleSubsection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSubsection {
    pub title: String,
    pub content: String,
}

/// What the caller asks the model to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    /// Free text (section content, reviews).
    Text,
    /// A single JSON object, when the provider supports it.
    JsonObject,
}

/// Black-box text generation capability (allows mocking).
pub trait LlmClient {
    fn complete(
        &self,
        model: &str,
        prompt: &str,
        mode: ResponseMode,
    ) -> Result<String, GenerationError>;
}

/// One node of the plan tree to be written.
#[derive(Debug, Clone, Copy)]
pub struct SectionRequest<'a> {
    pub title: &'a str,
    pub topic: &'a str,
    pub section_title: &'a str,
    pub description: &'a str,
    pub language: &'a str,
}
