// Fakes for the proxy, search backend and LLM seams, shared by unit tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::llm::{LLMAdapter, LLM};
use crate::models::PaperRecord;
use crate::search::{ProxyActivator, PublicationSource, SearchBackend};
use crate::types::{AppError, AppResult, LLMRequest, LLMResponse, TokenUsage};

pub fn publication(title: &str, authors: &[&str]) -> Value {
    json!({
        "bib": {
            "title": title,
            "author": authors,
            "pub_year": "2020",
            "venue": "Journal of Tests",
            "abstract": format!("Abstract of {title}")
        }
    })
}

pub fn paper(title: &str, abstract_text: &str) -> PaperRecord {
    PaperRecord {
        title: title.to_string(),
        author: "A Author".to_string(),
        year: "2020".to_string(),
        journal: "Journal of Tests".to_string(),
        abstract_text: abstract_text.to_string(),
    }
}

pub struct FakeProxy {
    fail: bool,
}

impl FakeProxy {
    pub fn working() -> Self {
        Self { fail: false }
    }

    pub fn failing() -> Self {
        Self { fail: true }
    }
}

#[async_trait]
impl ProxyActivator for FakeProxy {
    async fn activate(&self) -> AppResult<Client> {
        if self.fail {
            Err(AppError::Configuration("proxy refused".to_string()))
        } else {
            Ok(Client::new())
        }
    }
}

#[derive(Clone)]
pub struct FakeBackend {
    publications: Vec<Value>,
    queries: Arc<AtomicUsize>,
    pulled: Arc<AtomicUsize>,
}

impl FakeBackend {
    pub fn new(publications: Vec<Value>) -> Self {
        Self {
            publications,
            queries: Arc::new(AtomicUsize::new(0)),
            pulled: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn pulled(&self) -> usize {
        self.pulled.load(Ordering::SeqCst)
    }
}

struct FakeSource {
    remaining: VecDeque<Value>,
    pulled: Arc<AtomicUsize>,
}

#[async_trait]
impl PublicationSource for FakeSource {
    async fn next_publication(&mut self) -> AppResult<Option<Value>> {
        let next = self.remaining.pop_front();
        if next.is_some() {
            self.pulled.fetch_add(1, Ordering::SeqCst);
        }
        Ok(next)
    }
}

#[async_trait]
impl SearchBackend for FakeBackend {
    async fn search_pubs(&self, _client: Client, _query: &str) -> AppResult<Box<dyn PublicationSource>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSource {
            remaining: self.publications.iter().cloned().collect(),
            pulled: self.pulled.clone(),
        }))
    }
}

/// Answers every completion with `reply: <last user message>` and records requests.
#[derive(Clone, Default)]
pub struct FakeLLM {
    requests: Arc<Mutex<Vec<LLMRequest>>>,
    fail_after: Option<usize>,
    truncated: bool,
}

impl FakeLLM {
    pub fn new() -> Self {
        Self::default()
    }

    /// Succeeds for the first `n` calls, then fails with an upstream error.
    pub fn failing_after(n: usize) -> Self {
        Self {
            fail_after: Some(n),
            ..Self::default()
        }
    }

    /// Replies as if every answer hit the token limit.
    pub fn truncating() -> Self {
        Self {
            truncated: true,
            ..Self::default()
        }
    }

    pub fn handle(&self) -> LLM {
        LLM::from_adapter("fake", Arc::new(self.clone()))
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<LLMRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LLMAdapter for FakeLLM {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len()
        };

        if self.fail_after.is_some_and(|n| call > n) {
            return Err(AppError::Upstream("model unavailable".to_string()));
        }

        let user = request
            .messages
            .iter()
            .rev()
            .find(|m| m.role == "user")
            .map(|m| m.content.clone())
            .unwrap_or_default();

        Ok(LLMResponse {
            content: format!("  reply: {}  ", user),
            finish_reason: if self.truncated { "length" } else { "stop" }.to_string(),
            usage: TokenUsage::default(),
        })
    }
}
