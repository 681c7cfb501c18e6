//! Proposal Agent
//!
//! Drafts patent proposals for the top papers of a search. Only the body is
//! written by the model; name, novelty, inventive step, competitors and claims
//! are fixed templates around the paper title.

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{info, warn};

use crate::agents::summarizer::SummaryAgent;
use crate::config::{LLMConfig, PipelineConfig};
use crate::llm::LLM;
use crate::models::{PaperRecord, ProposalRecord};
use crate::types::{AppResult, LLMMessage, LLMRequest};

/// Proposals are only drafted for this many leading papers.
pub const MAX_PROPOSALS: usize = 3;

const PROPOSAL_SYSTEM_INSTRUCTION: &str = "Generate a patent proposal.";
const COMPETITORS_PLACEHOLDER: &str = "List the relevant competitors here.";

#[derive(Clone)]
pub struct ProposalAgent {
    llm: LLM,
    summarizer: SummaryAgent,
    model: String,
    max_tokens: u32,
    language: String,
    concurrency: usize,
}

impl ProposalAgent {
    pub fn new(
        llm: LLM,
        summarizer: SummaryAgent,
        config: &LLMConfig,
        pipeline: &PipelineConfig,
    ) -> Self {
        Self {
            llm,
            summarizer,
            model: config.proposal_model.clone(),
            max_tokens: config.proposal_max_tokens,
            language: config.output_language.clone(),
            concurrency: pipeline.concurrency.max(1),
        }
    }

    /// Proposals for the first three papers, in input order.
    ///
    /// A failed model call aborts the whole stage; there is no partial output.
    pub async fn generate_proposals(&self, papers: &[PaperRecord]) -> AppResult<Vec<ProposalRecord>> {
        let count = papers.len().min(MAX_PROPOSALS);
        info!(count, "Generating patent proposals");

        stream::iter(papers.iter().take(MAX_PROPOSALS).cloned().enumerate())
            .map(|(i, paper)| self.generate_proposal(i + 1, paper))
            .buffered(self.concurrency)
            .try_collect()
            .await
    }

    async fn generate_proposal(&self, number: usize, paper: PaperRecord) -> AppResult<ProposalRecord> {
        let title = &paper.title;
        let summary = self.summarizer.summarize_abstract(&paper.abstract_text).await?;

        let request = LLMRequest {
            model: self.model.clone(),
            messages: vec![
                LLMMessage::system(PROPOSAL_SYSTEM_INSTRUCTION),
                LLMMessage::user(Self::create_proposal_prompt(title, &summary, &self.language)),
            ],
            max_tokens: Some(self.max_tokens),
        };

        let response = self.llm.create_chat_completion(&request).await?;
        info!(number, title = %title, "Proposal drafted");
        if response.is_truncated() {
            warn!(number, max_tokens = self.max_tokens, "Proposal body cut off at the token limit");
        }

        Ok(ProposalRecord {
            name: format!("Patent Proposal {}: {}", number, title),
            novelty: format!("The present invention relates to {} and is novel.", title),
            inventive_step: format!(
                "Compared with conventional techniques, {} involves an inventive step.",
                title
            ),
            competitors: COMPETITORS_PLACEHOLDER.to_string(),
            claims: [
                format!("1. A system relating to {}, comprising ...", title),
                format!("2. A method relating to {}, comprising ...", title),
                format!("3. An apparatus relating to {}, comprising ...", title),
            ],
            summary,
            body: response.content.trim().to_string(),
        })
    }

    fn create_proposal_prompt(title: &str, summary: &str, language: &str) -> String {
        format!(
            r#"You are an accomplished researcher. Based on the paper below, devise a patent proposal that has novelty and an inventive step.
Paper title: {title}
Summary: {summary}
The patent proposal must include a proposal name, novelty, inventive step, competitors, and claims.
Write the proposal in {language}."#
        )
    }
}
