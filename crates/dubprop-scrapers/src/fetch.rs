use crate::config::REFERER;
use crate::user_agent::UserAgentPool;
use async_trait::async_trait;
use dubprop_core::Result;
use reqwest::header;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, warn};
use url::Url;

/// Source of raw result pages.
///
/// A page that cannot be retrieved yields `None`; callers skip it.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Option<String>;
}

/// Fetches pages over HTTP with a rotating user agent.
#[derive(Debug)]
pub struct HttpFetcher {
    client: Client,
    user_agents: UserAgentPool,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        Self::with_user_agents(UserAgentPool::default())
    }

    pub fn with_user_agents(user_agents: UserAgentPool) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self { client, user_agents })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Option<String> {
        let mut request = self.client
            .get(url.clone())
            .header(header::REFERER, REFERER);
        if let Some(agent) = self.user_agents.pick() {
            request = request.header(header::USER_AGENT, agent);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Request failed for {}: {}", url, e);
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!("Bad response {} for {}", status, url);
            return None;
        }

        match response.text().await {
            Ok(body) => {
                debug!("Fetched {} bytes from {}", body.len(), url);
                Some(body)
            }
            Err(e) => {
                warn!("Failed to read body of {}: {}", url, e);
                None
            }
        }
    }
}

/// Serves pages from memory, for offline runs and tests.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    pages: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), html.into());
        self
    }

    /// URLs requested so far, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl PageFetcher for MemoryFetcher {
    async fn fetch(&self, url: &Url) -> Option<String> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }
        let page = self.pages.get(url.as_str()).cloned();
        if page.is_none() {
            warn!("Bad response 404 Not Found for {}", url);
        }
        page
    }
}
