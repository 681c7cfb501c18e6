use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LLMConfig,
    pub search: SearchConfig,
    pub pipeline: PipelineConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LLMConfig {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub summary_model: String,
    pub summary_max_tokens: u32,
    pub proposal_model: String,
    pub proposal_max_tokens: u32,
    /// Language the summaries and proposals are written in
    pub output_language: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    pub scraperapi_key: String,
    pub scraperapi_account_url: String,
    pub scraperapi_proxy_host: String,
    pub scholar_base_url: String,
    /// Read from the environment but not used by any stage.
    pub developer_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Per-paper calls in flight during summarization and proposal generation.
    pub concurrency: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub log_dir: Option<PathBuf>,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            openai_base_url: "https://api.openai.com/v1".to_string(),
            summary_model: "gpt-4".to_string(),
            summary_max_tokens: 500,
            proposal_model: "gpt-4o-mini".to_string(),
            proposal_max_tokens: 500,
            output_language: "English".to_string(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            scraperapi_key: String::new(),
            scraperapi_account_url: "http://api.scraperapi.com/account".to_string(),
            scraperapi_proxy_host: "proxy-server.scraperapi.com:8001".to_string(),
            scholar_base_url: "https://scholar.google.com".to_string(),
            developer_key: None,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { concurrency: 1 }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let llm_defaults = LLMConfig::default();
        let search_defaults = SearchConfig::default();

        Ok(Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .context("PORT must be a valid port number")?,
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                cors_allowed_origins: env::var("ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| "http://localhost:3000".to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            },
            llm: LLMConfig {
                openai_api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
                openai_base_url: env::var("OPENAI_BASE_URL")
                    .unwrap_or(llm_defaults.openai_base_url),
                summary_model: env::var("SUMMARY_MODEL").unwrap_or(llm_defaults.summary_model),
                summary_max_tokens: env::var("SUMMARY_MAX_TOKENS")
                    .unwrap_or_else(|_| "500".to_string())
                    .parse()
                    .context("SUMMARY_MAX_TOKENS must be a positive integer")?,
                proposal_model: env::var("PROPOSAL_MODEL")
                    .unwrap_or(llm_defaults.proposal_model),
                proposal_max_tokens: env::var("PROPOSAL_MAX_TOKENS")
                    .unwrap_or_else(|_| "500".to_string())
                    .parse()
                    .context("PROPOSAL_MAX_TOKENS must be a positive integer")?,
                output_language: env::var("OUTPUT_LANGUAGE")
                    .unwrap_or(llm_defaults.output_language),
            },
            search: SearchConfig {
                scraperapi_key: env::var("SCRAPERAPI_KEY").unwrap_or_default(),
                scraperapi_account_url: env::var("SCRAPERAPI_ACCOUNT_URL")
                    .unwrap_or(search_defaults.scraperapi_account_url),
                scraperapi_proxy_host: env::var("SCRAPERAPI_PROXY_HOST")
                    .unwrap_or(search_defaults.scraperapi_proxy_host),
                scholar_base_url: env::var("SCHOLAR_BASE_URL")
                    .unwrap_or(search_defaults.scholar_base_url),
                developer_key: env::var("DEVELOPER_KEY").ok().filter(|k| !k.is_empty()),
            },
            pipeline: PipelineConfig {
                concurrency: env::var("PIPELINE_CONCURRENCY")
                    .unwrap_or_else(|_| "1".to_string())
                    .parse::<usize>()
                    .context("PIPELINE_CONCURRENCY must be a positive integer")?
                    .max(1),
            },
            logging: LoggingConfig {
                log_dir: env::var("LOG_DIR").ok().map(PathBuf::from),
            },
        })
    }
}
