//! Research Pipeline
//!
//! Runs the three stages of a search request strictly in order:
//! search -> summarize -> propose. Each run is independent; nothing is kept
//! between requests. Any stage error aborts the run and drops the work done
//! so far.

use std::time::Instant;

use anyhow::Context;
use tracing::{info, warn};
use uuid::Uuid;

use crate::agents::{ProposalAgent, SummaryAgent};
use crate::config::Config;
use crate::llm::{LLMProviderConfig, LLM};
use crate::models::SearchReport;
use crate::search::ScholarSearch;
use crate::types::AppResult;

pub struct ResearchPipeline {
    search: ScholarSearch,
    summarizer: SummaryAgent,
    proposer: ProposalAgent,
}

impl ResearchPipeline {
    pub fn new(search: ScholarSearch, summarizer: SummaryAgent, proposer: ProposalAgent) -> Self {
        Self {
            search,
            summarizer,
            proposer,
        }
    }

    /// Wire the production collaborators from configuration.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let llm = LLM::new(LLMProviderConfig {
            name: "openai".to_string(),
            api_key: config.llm.openai_api_key.clone(),
            base_url: config.llm.openai_base_url.clone(),
        })
        .context("Failed to create LLM client")?;

        Ok(Self::with_llm(ScholarSearch::from_config(&config.search), llm, config))
    }

    pub fn with_llm(search: ScholarSearch, llm: LLM, config: &Config) -> Self {
        let summarizer = SummaryAgent::new(llm.clone(), &config.llm, &config.pipeline);
        let proposer = ProposalAgent::new(llm, summarizer.clone(), &config.llm, &config.pipeline);
        Self::new(search, summarizer, proposer)
    }

    pub async fn run(&self, query: &str, num_results: usize) -> AppResult<SearchReport> {
        let request_id = Uuid::new_v4();
        let started = Instant::now();
        info!(%request_id, query = %query, num_results, "Starting search pipeline");

        let papers = self.search.search(query, num_results).await?;

        if papers.is_empty() {
            warn!(%request_id, query = %query, "No papers found");
            return Ok(SearchReport::not_found(request_id, query));
        }

        let results = self.summarizer.summarize_papers(&papers).await?;
        let proposals = self.proposer.generate_proposals(&papers).await?;

        info!(
            %request_id,
            papers = results.len(),
            proposals = proposals.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Search pipeline completed"
        );

        Ok(SearchReport::success(request_id, query, results, proposals))
    }
}
