use std::time::Duration;

use uuid::Uuid;

use super::planner::{ArticlePlanner, PlanSource};
use super::tracker::ExampleTracker;
use super::types::{
    ArticleDocument, ArticleSection, ArticleSubsection, Plan, SectionRequest,
};
use super::writer::SectionWriter;

/// Position of an assembly run in the plan tree.
///
/// Planning → WritingIntroduction → WritingSection{0, None} →
/// WritingSection{0, Some(0)} … → WritingConclusion → Done
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyStage {
    Planning,
    WritingIntroduction,
    WritingSection {
        section: usize,
        subsection: Option<usize>,
    },
    WritingConclusion,
    Done,
}

impl AssemblyStage {
    /// Pure transition. `Done` is absorbing.
    pub fn next(self, plan: &Plan) -> Self {
        match self {
            Self::Planning => Self::WritingIntroduction,
            Self::WritingIntroduction => Self::section_start(plan, 0),
            Self::WritingSection {
                section,
                subsection,
            } => {
                let next_sub = subsection.map_or(0, |j| j + 1);
                let count = plan
                    .sections
                    .get(section)
                    .map_or(0, |s| s.subsections.len());
                if next_sub < count {
                    Self::WritingSection {
                        section,
                        subsection: Some(next_sub),
                    }
                } else {
                    Self::section_start(plan, section + 1)
                }
            }
            Self::WritingConclusion | Self::Done => Self::Done,
        }
    }

    fn section_start(plan: &Plan, section: usize) -> Self {
        if section < plan.sections.len() {
            Self::WritingSection {
                section,
                subsection: None,
            }
        } else {
            Self::WritingConclusion
        }
    }
}

#[derive(Debug, Clone)]
pub struct ArticleRequest {
    pub title: String,
    pub topic: String,
    pub language: String,
}

#[derive(Debug, Clone)]
pub struct AssembledArticle {
    pub plan: Plan,
    pub plan_source: PlanSource,
    pub document: ArticleDocument,
}

/// Drives one article run: plan, introduction, sections and subsections in
/// plan order, conclusion. Strictly sequential.
pub struct ArticleAssembler {
    planner: ArticlePlanner,
    writer: SectionWriter,
    delay: Duration,
}

impl ArticleAssembler {
    pub fn new(planner: ArticlePlanner, writer: SectionWriter) -> Self {
        Self {
            planner,
            writer,
            delay: Duration::ZERO,
        }
    }

    /// Pause observed after every subsection call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Full run from planning to conclusion. Never fails: failed nodes carry
    /// the placeholder sentence.
    pub fn generate(&self, request: &ArticleRequest) -> AssembledArticle {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("article", run_id = %run_id, title = %request.title);
        let _enter = span.enter();

        let outcome = self.planner.acquire_with_outcome(
            &request.title,
            &request.topic,
            &request.language,
        );
        let document = self.write_document(
            &request.title,
            &request.topic,
            &outcome.plan,
            &request.language,
        );

        AssembledArticle {
            plan: outcome.plan,
            plan_source: outcome.source,
            document,
        }
    }

    /// Write an article for an already acquired plan.
    pub fn assemble(&self, title: &str, topic: &str, plan: &Plan, language: &str) -> ArticleDocument {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("article", run_id = %run_id, title = %title);
        let _enter = span.enter();

        self.write_document(title, topic, plan, language)
    }

    fn write_document(&self, title: &str, topic: &str, plan: &Plan, language: &str) -> ArticleDocument {
        let mut tracker = ExampleTracker::new();
        let mut document = ArticleDocument {
            title: title.to_string(),
            introduction: String::new(),
            sections: Vec::with_capacity(plan.sections.len()),
            conclusion: String::new(),
        };

        let write = |section_title: &str, description: &str, tracker: &mut ExampleTracker| {
            let request = SectionRequest {
                title,
                topic,
                section_title,
                description,
                language,
            };
            self.writer.write_section(&request, tracker)
        };

        let mut stage = AssemblyStage::Planning.next(plan);
        while stage != AssemblyStage::Done {
            tracing::debug!(stage = ?stage, "Assembly step");
            match stage {
                AssemblyStage::WritingIntroduction => {
                    document.introduction = write("introduction", plan.introduction.as_str(), &mut tracker);
                }
                AssemblyStage::WritingSection {
                    section,
                    subsection: None,
                } => {
                    let Some(section) = plan.sections.get(section) else {
                        break;
                    };
                    let description = match section.description.as_deref() {
                        Some(d) if !d.trim().is_empty() => d.to_string(),
                        _ => format!("Main content for section: {}", section.title),
                    };
                    let content = write(section.title.as_str(), description.as_str(), &mut tracker);
                    document.sections.push(ArticleSection {
                        title: section.title.clone(),
                        content,
                        subsections: Vec::with_capacity(section.subsections.len()),
                    });
                }
                AssemblyStage::WritingSection {
                    section,
                    subsection: Some(index),
                } => {
                    let Some(parent) = plan.sections.get(section) else {
                        break;
                    };
                    let Some(subsection) = parent.subsections.get(index) else {
                        break;
                    };
                    let section_title = format!("{} - {}", parent.title, subsection.title);
                    let description = if subsection.description.trim().is_empty() {
                        format!("Content for {}", subsection.title)
                    } else {
                        subsection.description.clone()
                    };
                    let content = write(section_title.as_str(), description.as_str(), &mut tracker);
                    if let Some(current) = document.sections.last_mut() {
                        current.subsections.push(ArticleSubsection {
                            title: subsection.title.clone(),
                            content,
                        });
                    }
                    self.pause();
                }
                AssemblyStage::WritingConclusion => {
                    document.conclusion = write("conclusion", plan.conclusion.as_str(), &mut tracker);
                }
                AssemblyStage::Planning | AssemblyStage::Done => {}
            }
            stage = stage.next(plan);
        }

        tracing::info!(
            sections = document.sections.len(),
            examples = tracker.len(),
            "Article assembled"
        );
        document
    }

    fn pause(&self) {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
    }
}
