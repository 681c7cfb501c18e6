// Pipeline agents: abstract summarization and patent proposal drafting

pub mod proposal;
pub mod summarizer;

pub use proposal::ProposalAgent;
pub use summarizer::SummaryAgent;
