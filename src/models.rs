use std::sync::Arc;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::config::Config;
use crate::pipeline::ResearchPipeline;

/// Literal used for any bibliographic field the provider did not supply.
pub const NOT_AVAILABLE: &str = "N/A";

pub const DEFAULT_NUM_RESULTS: usize = 10;
pub const MIN_NUM_RESULTS: usize = 1;
pub const MAX_NUM_RESULTS: usize = 100;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pipeline: Arc<ResearchPipeline>,
}

/// One paper as returned by the search stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRecord {
    pub title: String,
    /// Comma-and-space joined author names, provider order
    pub author: String,
    pub year: String,
    pub journal: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResult {
    pub paper: PaperRecord,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalRecord {
    pub name: String,
    pub novelty: String,
    pub inventive_step: String,
    pub competitors: String,
    pub claims: [String; 3],
    pub summary: String,
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Success,
    NotFound,
}

/// Everything produced by one search request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchReport {
    pub request_id: Uuid,
    pub query: String,
    pub status: ReportStatus,
    pub message: String,
    pub results: Vec<SummaryResult>,
    pub proposals: Vec<ProposalRecord>,
    pub generated_at: DateTime<Utc>,
}

impl SearchReport {
    pub fn success(
        request_id: Uuid,
        query: &str,
        results: Vec<SummaryResult>,
        proposals: Vec<ProposalRecord>,
    ) -> Self {
        Self {
            request_id,
            query: query.to_string(),
            status: ReportStatus::Success,
            message: "Search complete".to_string(),
            results,
            proposals,
            generated_at: Utc::now(),
        }
    }

    pub fn not_found(request_id: Uuid, query: &str) -> Self {
        Self {
            request_id,
            query: query.to_string(),
            status: ReportStatus::NotFound,
            message: "No search results were found.".to_string(),
            results: Vec::new(),
            proposals: Vec::new(),
            generated_at: Utc::now(),
        }
    }

    /// Plain-text rendering used by the CLI, in the same order as the browser UI.
    pub fn render_text(&self) -> String {
        if self.status == ReportStatus::NotFound {
            return format!("{}\n", self.message);
        }

        let mut output = String::new();
        output.push_str(&format!("{} ({} papers)\n", self.message, self.results.len()));

        for (i, result) in self.results.iter().enumerate() {
            let paper = &result.paper;
            output.push_str(&format!("\n[{}] {}\n", i + 1, paper.title));
            output.push_str(&format!("    Authors: {}\n", paper.author));
            output.push_str(&format!("    Year: {}\n", paper.year));
            output.push_str(&format!("    Journal: {}\n", paper.journal));
            output.push_str(&format!("    Summary: {}\n", result.summary));
        }

        for proposal in &self.proposals {
            output.push_str(&format!("\n## {}\n", proposal.name));
            output.push_str(&format!("Novelty: {}\n", proposal.novelty));
            output.push_str(&format!("Inventive step: {}\n", proposal.inventive_step));
            output.push_str(&format!("Competitors: {}\n", proposal.competitors));
            output.push_str("Claims:\n");
            for claim in &proposal.claims {
                output.push_str(&format!("  {}\n", claim));
            }
            output.push_str(&format!("Summary: {}\n", proposal.summary));
            output.push_str(&format!("Proposal:\n{}\n", proposal.body));
        }

        output
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SearchRequest {
    #[validate(custom(function = "not_blank"))]
    pub query: String,
    pub num_results: Option<usize>,
}

/// The query is trimmed before it reaches the pipeline, so whitespace alone counts as empty.
fn not_blank(query: &str) -> Result<(), ValidationError> {
    if query.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("query must not be empty".into()));
    }
    Ok(())
}

impl SearchRequest {
    /// Result count after applying the default and the [1, 100] bounds.
    pub fn clamped_num_results(&self) -> usize {
        self.num_results
            .unwrap_or(DEFAULT_NUM_RESULTS)
            .clamp(MIN_NUM_RESULTS, MAX_NUM_RESULTS)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub llm_configured: bool,
    pub proxy_configured: bool,
}
