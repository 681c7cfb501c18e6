//! Google Scholar Backend
//!
//! Fetches Scholar result pages through the proxied client and yields one
//! publication at a time. Pages are requested lazily: a new page is fetched
//! only after every publication of the previous one has been consumed, and an
//! empty page ends the sequence.
//!
//! Each result is turned into a loosely typed publication:
//!
//! ```json
//! { "bib": { "title": "...", "author": ["..."], "pub_year": "...", "venue": "...", "abstract": "..." } }
//! ```
//!
//! Fields that cannot be found on the page are omitted; see
//! [`PaperRecord::from_publication`](crate::models::PaperRecord::from_publication)
//! for how absences are mapped.

use std::collections::VecDeque;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::types::{AppError, AppResult};

/// Scholar serves ten results per page.
pub const RESULTS_PER_PAGE: usize = 10;

/// A lazily produced sequence of raw publications.
#[async_trait]
pub trait PublicationSource: Send {
    /// Next publication, or `None` once the provider has nothing more.
    async fn next_publication(&mut self) -> AppResult<Option<Value>>;
}

#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search_pubs(&self, client: Client, query: &str) -> AppResult<Box<dyn PublicationSource>>;
}

pub struct ScholarBackend {
    base_url: String,
}

impl ScholarBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl SearchBackend for ScholarBackend {
    async fn search_pubs(&self, client: Client, query: &str) -> AppResult<Box<dyn PublicationSource>> {
        Ok(Box::new(ScholarPublications {
            client,
            search_url: format!("{}/scholar", self.base_url),
            query: query.to_string(),
            next_start: 0,
            buffer: VecDeque::new(),
            exhausted: false,
        }))
    }
}

pub struct ScholarPublications {
    client: Client,
    search_url: String,
    query: String,
    next_start: usize,
    buffer: VecDeque<Value>,
    exhausted: bool,
}

impl ScholarPublications {
    async fn fetch_next_page(&mut self) -> AppResult<()> {
        let start = self.next_start.to_string();
        info!(query = %self.query, start = %start, "Fetching Google Scholar page");

        let response = self
            .client
            .get(&self.search_url)
            .query(&[("hl", "en"), ("q", self.query.as_str()), ("start", start.as_str())])
            .send()
            .await
            .map_err(|e| AppError::Search(format!("Scholar request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Search(format!("Scholar returned {}", status)));
        }

        let html = response
            .text()
            .await
            .map_err(|e| AppError::Search(format!("Failed to read Scholar page: {}", e)))?;

        let publications = parse_results_page(&html)?;
        debug!(count = publications.len(), "Parsed Scholar page");

        if publications.is_empty() {
            debug!("Scholar page had no results, sequence exhausted");
            self.exhausted = true;
        }
        self.next_start += RESULTS_PER_PAGE;
        self.buffer.extend(publications);
        Ok(())
    }
}

#[async_trait]
impl PublicationSource for ScholarPublications {
    async fn next_publication(&mut self) -> AppResult<Option<Value>> {
        if self.buffer.is_empty() && !self.exhausted {
            self.fetch_next_page().await?;
        }
        Ok(self.buffer.pop_front())
    }
}

fn selector(css: &str) -> AppResult<Selector> {
    Selector::parse(css).map_err(|e| AppError::Internal(format!("Bad selector {}: {:?}", css, e)))
}

/// Collapse runs of whitespace (including non-breaking spaces) into single spaces.
fn clean_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Markers Scholar prefixes to titles for the format of the linked document.
const TITLE_TAGS: &[&str] = &["[PDF]", "[HTML]", "[BOOK]", "[B]", "[CITATION]", "[C]"];

/// Drop the leading Scholar format markers; other bracketed text is part of the title.
fn strip_title_tags(title: &str) -> String {
    let mut rest = title.trim();
    while let Some(tag) = TITLE_TAGS.iter().find(|tag| rest.starts_with(**tag)) {
        rest = rest[tag.len()..].trim_start();
    }
    rest.to_string()
}

/// Title of one result: the link text when the result links out, otherwise
/// the heading text without its format markers.
fn result_title(heading: ElementRef<'_>, link_sel: &Selector) -> String {
    match heading.select(link_sel).next() {
        Some(link) => clean_text(link),
        None => strip_title_tags(&clean_text(heading)),
    }
}

/// Split the Scholar byline, e.g. `"J Smith, A Doe - Nature, 2020 - nature.com"`,
/// into authors, venue and year.
fn parse_byline(byline: &str) -> (Vec<String>, Option<String>, Option<String>) {
    let mut parts = byline.split(" - ");

    let authors: Vec<String> = parts
        .next()
        .unwrap_or_default()
        .split(',')
        .map(|a| a.trim().trim_end_matches('…').trim())
        .filter(|a| !a.is_empty())
        .map(String::from)
        .collect();

    let publication = parts.next().map(str::trim).unwrap_or_default();
    // A lone source part ("nature.com") without a publication segment carries no venue
    if byline.split(" - ").count() < 3 && publication.contains('.') && !publication.contains(' ') {
        return (authors, None, None);
    }

    let is_year = |s: &str| s.len() == 4 && s.chars().all(|c| c.is_ascii_digit());

    let (venue, year) = match publication.rsplit_once(',') {
        Some((venue, year)) if is_year(year.trim()) => {
            (Some(venue.trim().to_string()), Some(year.trim().to_string()))
        }
        _ if is_year(publication) => (None, Some(publication.to_string())),
        _ => (Some(publication.to_string()), None),
    };

    let venue = venue
        .map(|v| v.trim_end_matches('…').trim().to_string())
        .filter(|v| !v.is_empty());

    (authors, venue, year)
}

/// Parse one Scholar results page into raw publications.
///
/// A CAPTCHA interstitial is an error, not an empty page.
pub fn parse_results_page(html: &str) -> AppResult<Vec<Value>> {
    let document = Html::parse_document(html);

    let captcha_sel = selector("#gs_captcha_ccl, #gs_captcha_f, .g-recaptcha, #recaptcha")?;
    if document.select(&captcha_sel).next().is_some() {
        return Err(AppError::Search("Scholar served a CAPTCHA page".to_string()));
    }

    let result_sel = selector("div.gs_ri")?;
    let title_sel = selector("h3.gs_rt")?;
    let link_sel = selector("a")?;
    let byline_sel = selector("div.gs_a")?;
    let snippet_sel = selector("div.gs_rs")?;

    let mut publications = Vec::new();

    for result in document.select(&result_sel) {
        let mut bib = Map::new();

        if let Some(title) = result.select(&title_sel).next() {
            let title = result_title(title, &link_sel);
            if !title.is_empty() {
                bib.insert("title".to_string(), json!(title));
            }
        }

        if let Some(byline) = result.select(&byline_sel).next() {
            let (authors, venue, year) = parse_byline(&clean_text(byline));
            if !authors.is_empty() {
                bib.insert("author".to_string(), json!(authors));
            }
            if let Some(venue) = venue {
                bib.insert("venue".to_string(), json!(venue));
            }
            if let Some(year) = year {
                bib.insert("pub_year".to_string(), json!(year));
            }
        }

        if let Some(snippet) = result.select(&snippet_sel).next() {
            let snippet = clean_text(snippet);
            if !snippet.is_empty() {
                bib.insert("abstract".to_string(), json!(snippet));
            }
        }

        publications.push(json!({ "bib": Value::Object(bib) }));
    }

    Ok(publications)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaperRecord;
    use mockito::Matcher;

    const PAGE_TWO_RESULTS: &str = r#"
        <html><body><div id="gs_res_ccl_mid">
          <div class="gs_r gs_or gs_scl">
            <div class="gs_ri">
              <h3 class="gs_rt"><span class="gs_ctg2">[PDF]</span> <a href="https://example.org/a">Quantum computing in the NISQ era and beyond</a></h3>
              <div class="gs_a">J Preskill - Quantum, 2018 - quantum-journal.org</div>
              <div class="gs_rs">Noisy Intermediate-Scale Quantum (NISQ) technology will be available
                in the near future.</div>
            </div>
          </div>
          <div class="gs_r gs_or gs_scl">
            <div class="gs_ri">
              <h3 class="gs_rt"><a href="https://example.org/b">Quantum supremacy using a programmable superconducting processor</a></h3>
              <div class="gs_a">F Arute, K Arya, R Babbush&hellip; - Nature, 2019 - nature.com</div>
            </div>
          </div>
        </div></body></html>
    "#;

    const EMPTY_PAGE: &str = "<html><body><div id=\"gs_res_ccl_mid\"></div></body></html>";

    const CAPTCHA_PAGE: &str = r#"
        <html><body>
          <div id="gs_captcha_ccl">
            <h1>Please show you're not a robot</h1>
            <form id="gs_captcha_f" method="post">
              <div class="g-recaptcha" data-sitekey="abc"></div>
            </form>
          </div>
        </body></html>
    "#;

    const BRACKETED_TITLES: &str = r#"
        <html><body>
          <div class="gs_ri">
            <h3 class="gs_rt"><a href="https://example.org/fdg">[18F]FDG PET imaging of tumours</a></h3>
            <div class="gs_a">A Author - Journal of Nuclear Medicine, 2004 - jnm.org</div>
          </div>
          <div class="gs_ri">
            <h3 class="gs_rt"><span class="gs_ctg2">[HTML]</span> <a href="https://example.org/ru">[Ru(bpy)3]2+ photoredox catalysis</a></h3>
          </div>
          <div class="gs_ri">
            <h3 class="gs_rt"><span class="gs_ct1">[CITATION]</span><span class="gs_ct2">[C]</span> [11C]Raclopride binding in the striatum</h3>
          </div>
        </body></html>
    "#;

    #[test]
    fn test_parse_results_page() {
        let publications = parse_results_page(PAGE_TWO_RESULTS).unwrap();
        assert_eq!(publications.len(), 2);

        let first = PaperRecord::from_publication(&publications[0]);
        assert_eq!(first.title, "Quantum computing in the NISQ era and beyond");
        assert_eq!(first.author, "J Preskill");
        assert_eq!(first.journal, "Quantum");
        assert_eq!(first.year, "2018");
        assert!(first.abstract_text.starts_with("Noisy Intermediate-Scale Quantum"));
        assert!(!first.abstract_text.contains('\n'));

        let second = PaperRecord::from_publication(&publications[1]);
        assert_eq!(second.author, "F Arute, K Arya, R Babbush");
        assert_eq!(second.journal, "Nature");
        assert_eq!(second.abstract_text, "N/A");
    }

    #[test]
    fn test_parse_byline_variants() {
        let (authors, venue, year) = parse_byline("A Author, B Author - Some Journal, 2020 - site.com");
        assert_eq!(authors, vec!["A Author", "B Author"]);
        assert_eq!(venue.as_deref(), Some("Some Journal"));
        assert_eq!(year.as_deref(), Some("2020"));

        let (_, venue, year) = parse_byline("A Author - 2011 - site.com");
        assert_eq!(venue, None);
        assert_eq!(year.as_deref(), Some("2011"));

        let (_, venue, year) = parse_byline("A Author - Proceedings of Something - site.com");
        assert_eq!(venue.as_deref(), Some("Proceedings of Something"));
        assert_eq!(year, None);

        let (authors, venue, year) = parse_byline("A Author - books.google.com");
        assert_eq!(authors, vec!["A Author"]);
        assert_eq!(venue, None);
        assert_eq!(year, None);
    }

    #[test]
    fn test_strip_title_tags() {
        assert_eq!(strip_title_tags("[PDF] [HTML] Title"), "Title");
        assert_eq!(strip_title_tags("Plain title"), "Plain title");
        assert_eq!(strip_title_tags("[unterminated"), "[unterminated");
        assert_eq!(strip_title_tags("[CITATION][C] [18F]FDG uptake"), "[18F]FDG uptake");
        assert_eq!(strip_title_tags("[Ru(bpy)3]2+ complexes"), "[Ru(bpy)3]2+ complexes");
    }

    #[test]
    fn test_bracketed_titles_are_preserved() {
        let titles: Vec<String> = parse_results_page(BRACKETED_TITLES)
            .unwrap()
            .iter()
            .map(|p| PaperRecord::from_publication(p).title)
            .collect();

        assert_eq!(
            titles,
            vec![
                "[18F]FDG PET imaging of tumours",
                "[Ru(bpy)3]2+ photoredox catalysis",
                "[11C]Raclopride binding in the striatum",
            ]
        );
    }

    #[test]
    fn test_captcha_page_is_search_error() {
        let err = parse_results_page(CAPTCHA_PAGE).unwrap_err();
        assert!(matches!(err, AppError::Search(_)));
    }

    #[test]
    fn test_page_without_results() {
        assert!(parse_results_page(EMPTY_PAGE).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pages_are_fetched_lazily_until_empty() {
        let mut server = mockito::Server::new_async().await;
        let first_page = server
            .mock("GET", "/scholar")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "quantum computing".into()),
                Matcher::UrlEncoded("start".into(), "0".into()),
            ]))
            .with_status(200)
            .with_body(PAGE_TWO_RESULTS)
            .expect(1)
            .create_async()
            .await;
        let second_page = server
            .mock("GET", "/scholar")
            .match_query(Matcher::UrlEncoded("start".into(), "10".into()))
            .with_status(200)
            .with_body(EMPTY_PAGE)
            .expect(1)
            .create_async()
            .await;

        let backend = ScholarBackend::new(server.url());
        let mut source = backend
            .search_pubs(Client::new(), "quantum computing")
            .await
            .unwrap();

        assert!(source.next_publication().await.unwrap().is_some());
        assert!(source.next_publication().await.unwrap().is_some());
        assert!(source.next_publication().await.unwrap().is_none());
        // Exhaustion is sticky; no further pages are requested
        assert!(source.next_publication().await.unwrap().is_none());

        first_page.assert_async().await;
        second_page.assert_async().await;
    }

    #[tokio::test]
    async fn test_blocked_page_is_search_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/scholar")
            .match_query(Matcher::Any)
            .with_status(429)
            .create_async()
            .await;

        let backend = ScholarBackend::new(server.url());
        let mut source = backend.search_pubs(Client::new(), "q").await.unwrap();
        let err = source.next_publication().await.unwrap_err();
        assert!(matches!(err, AppError::Search(_)));
    }

    #[tokio::test]
    async fn test_captcha_response_is_not_exhaustion() {
        let mut server = mockito::Server::new_async().await;
        let captcha = server
            .mock("GET", "/scholar")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(CAPTCHA_PAGE)
            .expect(1)
            .create_async()
            .await;

        let backend = ScholarBackend::new(server.url());
        let mut source = backend.search_pubs(Client::new(), "q").await.unwrap();
        let err = source.next_publication().await.unwrap_err();
        assert!(matches!(err, AppError::Search(_)));

        captcha.assert_async().await;
    }
}
