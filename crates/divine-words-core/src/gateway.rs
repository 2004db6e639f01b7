use crate::error::FetchError;
use crate::reference::CanonicalReference;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_UPSTREAM_URL: &str = "https://bible-api.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassageVerse {
    #[serde(default)]
    pub book_id: Option<String>,
    #[serde(default)]
    pub book_name: String,
    pub chapter: u16,
    pub verse: u16,
    pub text: String,
}

/// Passage payload as returned by the upstream provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    #[serde(default)]
    pub reference: Option<String>,
    pub text: String,
    #[serde(default)]
    pub verses: Vec<PassageVerse>,
    #[serde(default)]
    pub translation_id: Option<String>,
    #[serde(default)]
    pub translation_name: Option<String>,
}

impl Passage {
    /// Human-readable reference, e.g. "John 3:16"
    pub fn label(&self) -> String {
        if let Some(reference) = self.reference.as_deref().filter(|r| !r.is_empty()) {
            return reference.to_string();
        }
        match (self.verses.first(), self.verses.last()) {
            (Some(first), Some(last)) if first.verse != last.verse => format!(
                "{} {}:{}-{}",
                first.book_name, first.chapter, first.verse, last.verse
            ),
            (Some(first), _) => format!("{} {}:{}", first.book_name, first.chapter, first.verse),
            _ => String::new(),
        }
    }
}

#[derive(Deserialize)]
struct UpstreamError {
    error: Option<String>,
}

/// Stateless client for the upstream passage provider.
///
/// Cloning is cheap and clones share the connection pool; every call is independent,
/// bounded by its own timeout and never retried.
#[derive(Clone)]
pub struct ProxyGateway {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl ProxyGateway {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn fetch_passage(
        &self,
        reference: &CanonicalReference,
        translation: &str,
    ) -> Result<Passage, FetchError> {
        let value = self.fetch_raw(&reference.to_path(), Some(translation)).await?;
        serde_json::from_value(value)
            .map_err(|e| FetchError::NetworkFailure(format!("unexpected passage payload: {}", e)))
    }

    /// Forward an arbitrary reference path segment and return the upstream JSON untouched
    pub async fn fetch_raw(
        &self,
        reference: &str,
        translation: Option<&str>,
    ) -> Result<serde_json::Value, FetchError> {
        let url = format!("{}/{}", self.base_url, reference);
        debug!(%url, translation, "requesting passage");

        let mut request = self.client.get(&url).timeout(self.timeout);
        if let Some(code) = translation {
            request = request.query(&[("translation", code)]);
        }

        let response = request.send().await.map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            // A body that stalls past the deadline is a timeout, not a rejection
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) if e.is_timeout() => return Err(self.classify(e)),
                Err(_) => String::new(),
            };
            let message = serde_json::from_str::<UpstreamError>(&body)
                .ok()
                .and_then(|e| e.error)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "API error".to_string());
            warn!(reference, status = status.as_u16(), %message, "upstream rejected reference");
            return Err(FetchError::UpstreamRejected {
                status: status.as_u16(),
                message,
            });
        }

        response.json().await.map_err(|e| {
            if e.is_timeout() {
                self.classify(e)
            } else {
                FetchError::NetworkFailure(format!("invalid response body: {}", e))
            }
        })
    }

    fn classify(&self, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            warn!(timeout = ?self.timeout, "upstream request timed out");
            FetchError::Timeout(self.timeout)
        } else {
            warn!(%error, "upstream unreachable");
            FetchError::NetworkFailure(error.to_string())
        }
    }
}

impl Default for ProxyGateway {
    fn default() -> Self {
        Self::new(DEFAULT_UPSTREAM_URL, DEFAULT_TIMEOUT)
    }
}
