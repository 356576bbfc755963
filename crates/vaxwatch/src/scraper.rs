use crate::parser::{ParseError, parse_appointments};
use crate::types::Snapshot;

use reqwest::Client;

#[derive(Debug, thiserror::Error)]
pub enum ScraperError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),
}

/// Something that can produce the current appointment snapshot.
#[allow(async_fn_in_trait)]
pub trait AppointmentSource {
    async fn fetch(&self) -> Result<Snapshot, ScraperError>;
}

#[derive(Debug, Clone)]
pub struct WebScraper {
    client: Client,
    url: String,
}

impl WebScraper {
    pub fn new() -> Result<Self, ScraperError> {
        Self::with_url(crate::DEFAULT_URL)
    }

    pub fn with_url(url: impl Into<String>) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .user_agent(format!(
                "{}/{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetches the page body. A non-success status is logged and its body
    /// returned like any other page, so an error page parses as empty.
    pub async fn fetch_page(&self) -> Result<String, ScraperError> {
        log::debug!("Fetching appointment page: {}", self.url);
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .inspect_err(|e| log::error!("HTTP error: {e:?}"))?;

        let status = response.status();
        if !status.is_success() {
            log::warn!("Appointment page returned {}", status);
        }

        Ok(response
            .text()
            .await
            .inspect_err(|e| log::error!("Decode error: {e:?}"))?)
    }

    pub async fn fetch_appointments(&self) -> Result<Snapshot, ScraperError> {
        let html = self.fetch_page().await?;
        let snapshot = parse_appointments(&html)?;
        log::debug!("Parsed {} location(s) with open dates", snapshot.len());
        Ok(snapshot)
    }
}

impl AppointmentSource for WebScraper {
    async fn fetch(&self) -> Result<Snapshot, ScraperError> {
        self.fetch_appointments().await
    }
}
