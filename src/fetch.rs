//! Playlist fetching.
//!
//! A playlist source is either an `http(s)://` URL or a local file that a
//! recorder keeps rewriting. Both are read in full on every refresh.

use crate::config::FetchConfig;
use reqwest::Client;
use std::path::PathBuf;
use std::sync::Arc;
use timeshift_common::{Error, Result};

/// Reads the current playlist text from its source
#[async_trait::async_trait]
pub trait PlaylistFetcher: Send + Sync {
    /// Fetch the full playlist text
    async fn fetch(&self) -> Result<String>;

    /// Where the playlist is read from, for logging
    fn source(&self) -> &str;
}

/// Pick a fetcher for `source` based on its scheme
pub fn fetcher_for(source: &str, config: &FetchConfig) -> Result<Arc<dyn PlaylistFetcher>> {
    if source.starts_with("http://") || source.starts_with("https://") {
        Ok(Arc::new(HttpFetcher::new(source, config)?))
    } else if source.trim().is_empty() {
        Err(Error::invalid_input("empty playlist source"))
    } else {
        let path = source.strip_prefix("file://").unwrap_or(source);
        Ok(Arc::new(FileFetcher::new(path)))
    }
}

pub struct HttpFetcher {
    client: Client,
    url: String,
}

impl HttpFetcher {
    pub fn new(url: &str, config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl PlaylistFetcher for HttpFetcher {
    async fn fetch(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::fetch(format!("GET {}: {}", self.url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::fetch(format!("GET {}: HTTP {}", self.url, status)));
        }

        response
            .text()
            .await
            .map_err(|e| Error::fetch(format!("GET {}: {}", self.url, e)))
    }

    fn source(&self) -> &str {
        &self.url
    }
}

pub struct FileFetcher {
    path: PathBuf,
    display: String,
}

impl FileFetcher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let display = path.display().to_string();
        Self { path, display }
    }
}

#[async_trait::async_trait]
impl PlaylistFetcher for FileFetcher {
    async fn fetch(&self) -> Result<String> {
        Ok(tokio::fs::read_to_string(&self.path).await?)
    }

    fn source(&self) -> &str {
        &self.display
    }
}
