//! Command-line entry: plan → assemble → render, in that order.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use crate::config::{GenerationSettings, ModelCatalog, ModelRole, Provider, ProviderConfig};
use crate::pipeline::generation::{
    ArticleAssembler, ArticlePlanner, ArticleRequest, ChatCompletionsClient, ContentReviewer,
    LlmClient, ModelSelector, PlanSource, SectionWriter, UniformRandomSelector,
};
use crate::pipeline::storage::{save_article_html, save_article_json, PlanStore};
use crate::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "article-forge",
    version,
    about = "Generate a long-form technical article with a generative text model."
)]
pub struct Cli {
    /// Article title
    #[arg(long)]
    pub title: String,

    /// Subject the article covers
    #[arg(long)]
    pub topic: String,

    /// Programming language the article is about (e.g. Python, Rust)
    #[arg(long)]
    pub language: String,

    /// Model provider: openrouter or gemini (defaults to API_PROVIDER)
    #[arg(long)]
    pub provider: Option<Provider>,

    /// Directory for the plan, JSON and HTML artifacts
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Pause after every subsection call, in seconds
    #[arg(long)]
    pub delay_secs: Option<u64>,

    /// Per-request timeout, in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Skip the secondary review pass
    #[arg(long)]
    pub no_review: bool,
}

impl Cli {
    /// Run one article end to end. Returns the path of the rendered HTML.
    pub fn run(self) -> Result<PathBuf, AppError> {
        let provider = ProviderConfig::from_env(self.provider)?;
        let catalog = ModelCatalog::from_lookup(provider.provider, |var| std::env::var(var).ok());
        let mut settings = GenerationSettings::from_env()?;
        self.apply_overrides(&mut settings);

        tracing::info!(
            provider = %provider.provider,
            title = %self.title,
            language = %self.language,
            review = settings.review_enabled,
            "Starting article generation"
        );

        let llm: Arc<dyn LlmClient + Send + Sync> =
            Arc::new(ChatCompletionsClient::new(&provider, settings.request_timeout)?);
        let selector: Arc<dyn ModelSelector + Send + Sync> = Arc::new(UniformRandomSelector);

        let planner = ArticlePlanner::new(
            llm.clone(),
            selector.clone(),
            catalog.candidates(ModelRole::Plan).to_vec(),
        )
        .with_store(PlanStore::new(settings.output_dir.clone()));

        let mut writer = SectionWriter::new(
            llm.clone(),
            selector.clone(),
            catalog.candidates(ModelRole::Write).to_vec(),
        );
        if settings.review_enabled {
            writer = writer.with_reviewer(ContentReviewer::new(
                llm,
                selector,
                catalog.candidates(ModelRole::Review).to_vec(),
            ));
        }

        let assembler = ArticleAssembler::new(planner, writer).with_delay(settings.delay);
        let article = assembler.generate(&ArticleRequest {
            title: self.title,
            topic: self.topic,
            language: self.language,
        });

        if let PlanSource::Fallback(reason) = &article.plan_source {
            tracing::warn!(reason = %reason, "Article was written from the fallback plan");
        }

        let json_path = save_article_json(&settings.output_dir, &article.document)?;
        tracing::info!(path = %json_path.display(), "Article JSON saved");

        let html_path = save_article_html(&settings.output_dir, &article.document)?;
        tracing::info!(path = %html_path.display(), "Article HTML saved");

        Ok(html_path)
    }

    /// Command-line flags take precedence over environment settings.
    fn apply_overrides(&self, settings: &mut GenerationSettings) {
        if let Some(dir) = &self.output_dir {
            settings.output_dir = dir.clone();
        }
        if let Some(secs) = self.delay_secs {
            settings.delay = Duration::from_secs(secs);
        }
        if let Some(secs) = self.timeout_secs {
            settings.request_timeout = Duration::from_secs(secs);
        }
        if self.no_review {
            settings.review_enabled = false;
        }
    }
}
