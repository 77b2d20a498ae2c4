use std::sync::Arc;

use super::prompt::{build_review_prompt, build_section_prompt};
use super::sanitize::sanitize_content;
use super::selection::{select_model, ModelSelector};
use super::tracker::ExampleTracker;
use super::types::{LlmClient, ResponseMode, SectionRequest};
use super::GenerationError;
use crate::config::ModelRole;

/// Visible stand-in for a node whose generation failed.
pub fn placeholder_content(section_title: &str) -> String {
    format!("Content for {section_title} could not be generated due to an error.")
}

/// Second pass that corrects and improves already written content.
pub struct ContentReviewer {
    llm: Arc<dyn LlmClient + Send + Sync>,
    selector: Arc<dyn ModelSelector + Send + Sync>,
    models: Vec<String>,
}

impl ContentReviewer {
    pub fn new(
        llm: Arc<dyn LlmClient + Send + Sync>,
        selector: Arc<dyn ModelSelector + Send + Sync>,
        models: Vec<String>,
    ) -> Self {
        Self {
            llm,
            selector,
            models,
        }
    }

    /// Reviewed content, or `content` unchanged if the review fails or comes
    /// back empty.
    pub fn review(&self, request: &SectionRequest<'_>, content: &str) -> String {
        match self.try_review(request, content) {
            Ok(reviewed) if !reviewed.trim().is_empty() => reviewed,
            Ok(_) => {
                tracing::warn!(
                    section = %request.section_title,
                    "Review produced no content, keeping first draft"
                );
                content.to_string()
            }
            Err(e) => {
                tracing::warn!(
                    section = %request.section_title,
                    error = %e,
                    "Review failed, keeping first draft"
                );
                content.to_string()
            }
        }
    }

    pub fn try_review(
        &self,
        request: &SectionRequest<'_>,
        content: &str,
    ) -> Result<String, GenerationError> {
        let model = select_model(self.selector.as_ref(), &self.models, ModelRole::Review)?;
        let prompt = build_review_prompt(
            request.title,
            request.topic,
            request.section_title,
            content,
            request.language,
        );

        tracing::debug!(section = %request.section_title, model = %model, "Reviewing section");
        let raw = self.llm.complete(model, &prompt, ResponseMode::Text)?;
        if raw.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(sanitize_content(&raw, request.language))
    }
}

/// Writes one node of the plan tree.
pub struct SectionWriter {
    llm: Arc<dyn LlmClient + Send + Sync>,
    selector: Arc<dyn ModelSelector + Send + Sync>,
    models: Vec<String>,
    reviewer: Option<ContentReviewer>,
}

impl SectionWriter {
    pub fn new(
        llm: Arc<dyn LlmClient + Send + Sync>,
        selector: Arc<dyn ModelSelector + Send + Sync>,
        models: Vec<String>,
    ) -> Self {
        Self {
            llm,
            selector,
            models,
            reviewer: None,
        }
    }

    pub fn with_reviewer(mut self, reviewer: ContentReviewer) -> Self {
        self.reviewer = Some(reviewer);
        self
    }

    /// Sanitized content for the node. On any failure the placeholder
    /// sentence is returned and the tracker is left untouched.
    pub fn write_section(
        &self,
        request: &SectionRequest<'_>,
        tracker: &mut ExampleTracker,
    ) -> String {
        match self.try_write_section(request, tracker) {
            Ok(content) => content,
            Err(e) => {
                tracing::error!(
                    section = %request.section_title,
                    error = %e,
                    "Section generation failed, inserting placeholder"
                );
                placeholder_content(request.section_title)
            }
        }
    }

    pub fn try_write_section(
        &self,
        request: &SectionRequest<'_>,
        tracker: &mut ExampleTracker,
    ) -> Result<String, GenerationError> {
        let model = select_model(self.selector.as_ref(), &self.models, ModelRole::Write)?;
        let prompt = build_section_prompt(request, &tracker.render_avoidance_hint());

        tracing::info!(section = %request.section_title, model = %model, "Writing section");
        let raw = self.llm.complete(model, &prompt, ResponseMode::Text)?;
        if raw.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        let mut content = sanitize_content(&raw, request.language);
        if let Some(reviewer) = &self.reviewer {
            content = reviewer.review(request, &content);
        }

        tracker.record(&content);
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::generation::client::MockLlmClient;
    use crate::pipeline::generation::selection::FirstCandidateSelector;

    fn request<'a>() -> SectionRequest<'a> {
        SectionRequest {
            title: "Python Classes",
            topic: "object-oriented Python",
            section_title: "Inheritance",
            description: "Subclassing and super()",
            language: "Python",
        }
    }

    fn writer(llm: &Arc<MockLlmClient>) -> SectionWriter {
        SectionWriter::new(
            llm.clone(),
            Arc::new(FirstCandidateSelector),
            vec!["writer-model".to_string()],
        )
    }

    fn reviewer(llm: &Arc<MockLlmClient>) -> ContentReviewer {
        ContentReviewer::new(
            llm.clone(),
            Arc::new(FirstCandidateSelector),
            vec!["review-model".to_string()],
        )
    }

    #[test]
    fn writes_sanitized_content_and_records_examples() {
        let llm = Arc::new(MockLlmClient::new(
            "```python\nclass Animal:\n    pass\n```\n<p>Use <code>super()</code>.</p>",
        ));
        let mut tracker = ExampleTracker::new();

        let content = writer(&llm).write_section(&request(), &mut tracker);

        assert!(!content.contains("```"));
        assert!(content.contains(r#"<code class="language-python">super()</code>"#));
        assert_eq!(tracker.descriptors().collect::<Vec<_>>(), vec!["Class Animal"]);

        let calls = llm.calls();
        assert_eq!(calls[0].model, "writer-model");
        assert_eq!(calls[0].mode, ResponseMode::Text);
        assert!(calls[0].prompt.contains("\"Inheritance\""));
    }

    #[test]
    fn later_prompts_carry_avoidance_hint() {
        let llm = Arc::new(MockLlmClient::new("<p>class Vehicle: pass</p>"));
        let writer = writer(&llm);
        let mut tracker = ExampleTracker::new();

        writer.write_section(&request(), &mut tracker);
        writer.write_section(&request(), &mut tracker);

        let calls = llm.calls();
        assert!(!calls[0].prompt.contains("EXAMPLES ALREADY USED"));
        assert!(calls[1].prompt.contains("- Class Vehicle"));
    }

    #[test]
    fn provider_error_yields_placeholder() {
        let llm = Arc::new(MockLlmClient::new("<p>unused</p>").then_err(GenerationError::Timeout(300)));
        let mut tracker = ExampleTracker::new();

        let content = writer(&llm).write_section(&request(), &mut tracker);

        assert_eq!(
            content,
            "Content for Inheritance could not be generated due to an error."
        );
        assert!(tracker.is_empty());
    }

    #[test]
    fn empty_response_is_an_error() {
        let llm = Arc::new(MockLlmClient::new("  "));
        let mut tracker = ExampleTracker::new();
        let result = writer(&llm).try_write_section(&request(), &mut tracker);
        assert!(matches!(result, Err(GenerationError::EmptyResponse)));
    }

    #[test]
    fn missing_write_model_yields_placeholder() {
        let llm = Arc::new(MockLlmClient::new("<p>x</p>"));
        let writer = SectionWriter::new(llm.clone(), Arc::new(FirstCandidateSelector), vec![]);
        let mut tracker = ExampleTracker::new();
        let content = writer.write_section(&request(), &mut tracker);
        assert_eq!(content, placeholder_content("Inheritance"));
        assert_eq!(llm.call_count(), 0);
    }

    #[test]
    fn review_replaces_first_draft() {
        let llm = Arc::new(
            MockLlmClient::new("")
                .then_ok("<p>draft</p>")
                .then_ok("<p>reviewed `super()`</p>"),
        );
        let writer = writer(&llm).with_reviewer(reviewer(&llm));
        let mut tracker = ExampleTracker::new();

        let content = writer.write_section(&request(), &mut tracker);

        assert_eq!(content, "<p>reviewed <strong>super()</strong></p>");
        let calls = llm.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].model, "review-model");
        assert!(calls[1].prompt.contains("<p>draft</p>"));
    }

    #[test]
    fn review_failure_keeps_first_draft() {
        let llm = Arc::new(
            MockLlmClient::new("")
                .then_ok("<p>draft</p>")
                .then_err(GenerationError::Connection("https://openrouter.ai/api/v1".into())),
        );
        let writer = writer(&llm).with_reviewer(reviewer(&llm));
        let mut tracker = ExampleTracker::new();
        assert_eq!(writer.write_section(&request(), &mut tracker), "<p>draft</p>");
    }

    #[test]
    fn empty_review_keeps_first_draft() {
        let llm = Arc::new(MockLlmClient::new("").then_ok("<p>draft</p>").then_ok(" "));
        let writer = writer(&llm).with_reviewer(reviewer(&llm));
        let mut tracker = ExampleTracker::new();
        assert_eq!(writer.write_section(&request(), &mut tracker), "<p>draft</p>");
    }
}
