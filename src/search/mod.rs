//! Search Module
//!
//! The first pipeline stage: activate the scraping proxy, open a lazy
//! publication sequence for the query and pull at most `num_results`
//! records from it.
//!
//! - [`proxy`]: ScraperAPI activation, yields the proxied HTTP client
//! - [`scholar`]: Google Scholar pages as a lazy publication sequence
//! - [`record`]: permissive mapping of raw publications to `PaperRecord`

pub mod proxy;
pub mod record;
pub mod scholar;

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::SearchConfig;
use crate::models::PaperRecord;
use crate::types::AppResult;

pub use proxy::{ProxyActivator, ScraperApiProxy};
pub use scholar::{PublicationSource, ScholarBackend, SearchBackend};

pub struct ScholarSearch {
    proxy: Arc<dyn ProxyActivator>,
    backend: Arc<dyn SearchBackend>,
}

impl ScholarSearch {
    pub fn new(proxy: Arc<dyn ProxyActivator>, backend: Arc<dyn SearchBackend>) -> Self {
        Self { proxy, backend }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(
            Arc::new(ScraperApiProxy::from_config(config)),
            Arc::new(ScholarBackend::new(config.scholar_base_url.clone())),
        )
    }

    pub fn proxy_configured(config: &SearchConfig) -> bool {
        !config.scraperapi_key.is_empty()
    }

    /// Search for `query` and collect up to `num_results` papers.
    ///
    /// Fails with `AppError::Configuration` when the proxy cannot be activated;
    /// no query is issued in that case. Running out of results early is not an
    /// error.
    pub async fn search(&self, query: &str, num_results: usize) -> AppResult<Vec<PaperRecord>> {
        let client = self.proxy.activate().await.map_err(|e| {
            warn!(error = %e, "Proxy activation failed");
            e
        })?;

        info!(query = %query, num_results, "Searching publications");

        let mut publications = self.backend.search_pubs(client, query).await?;
        let mut papers = Vec::with_capacity(num_results.min(scholar::RESULTS_PER_PAGE));

        while papers.len() < num_results {
            match publications.next_publication().await? {
                Some(publication) => papers.push(PaperRecord::from_publication(&publication)),
                None => {
                    info!(found = papers.len(), "Publication sequence exhausted");
                    break;
                }
            }
        }

        info!(count = papers.len(), "Search completed");
        Ok(papers)
    }
}
