//! Summary Agent
//!
//! Condenses paper abstracts with the completion endpoint. Abstracts that are
//! missing (`"N/A"`) or blank never reach the model; they get the fixed
//! placeholder instead.

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info, warn};

use crate::config::{LLMConfig, PipelineConfig};
use crate::llm::LLM;
use crate::models::{PaperRecord, SummaryResult, NOT_AVAILABLE};
use crate::types::{AppError, AppResult, LLMMessage, LLMRequest};

/// Summary used when there is no abstract to summarize.
pub const PLACEHOLDER_SUMMARY: &str = "no summary available";

/// Upper bound on summary length requested from the model, in characters.
pub const SUMMARY_CHAR_LIMIT: usize = 500;

#[derive(Clone)]
pub struct SummaryAgent {
    llm: LLM,
    model: String,
    max_tokens: u32,
    language: String,
    concurrency: usize,
}

impl SummaryAgent {
    pub fn new(llm: LLM, config: &LLMConfig, pipeline: &PipelineConfig) -> Self {
        Self {
            llm,
            model: config.summary_model.clone(),
            max_tokens: config.summary_max_tokens,
            language: config.output_language.clone(),
            concurrency: pipeline.concurrency.max(1),
        }
    }

    fn system_instruction(&self) -> String {
        format!(
            "Summarize the following text in {} in no more than {} characters.",
            self.language, SUMMARY_CHAR_LIMIT
        )
    }

    /// Summarize `text` with one model call. Errors propagate unchanged.
    pub async fn summarize(&self, text: &str) -> AppResult<String> {
        let request = LLMRequest {
            model: self.model.clone(),
            messages: vec![
                LLMMessage::system(self.system_instruction()),
                LLMMessage::user(text),
            ],
            max_tokens: Some(self.max_tokens),
        };

        let response = self.llm.create_chat_completion(&request).await?;
        debug!(
            model = %self.model,
            completion_tokens = response.usage.completion_tokens,
            "Summary received"
        );
        if response.is_truncated() {
            warn!(model = %self.model, max_tokens = self.max_tokens, "Summary cut off at the token limit");
        }
        Ok(response.content.trim().to_string())
    }

    /// Summarize an abstract, substituting the placeholder when there is none.
    pub async fn summarize_abstract(&self, abstract_text: &str) -> AppResult<String> {
        if has_no_abstract(abstract_text) {
            return Ok(PLACEHOLDER_SUMMARY.to_string());
        }
        self.summarize(abstract_text).await
    }

    /// One summary per paper, in input order. The first failure aborts the stage.
    pub async fn summarize_papers(&self, papers: &[PaperRecord]) -> AppResult<Vec<SummaryResult>> {
        info!(count = papers.len(), concurrency = self.concurrency, "Summarizing papers");

        stream::iter(papers.iter().cloned())
            .map(|paper| async move {
                let summary = self.summarize_abstract(&paper.abstract_text).await?;
                Ok::<_, AppError>(SummaryResult { paper, summary })
            })
            .buffered(self.concurrency)
            .try_collect()
            .await
    }
}

pub fn has_no_abstract(abstract_text: &str) -> bool {
    let trimmed = abstract_text.trim();
    trimmed.is_empty() || trimmed == NOT_AVAILABLE
}
