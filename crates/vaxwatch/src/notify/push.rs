use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

pub(crate) const PUSHBULLET_URL: &str = "https://api.pushbullet.com";

#[derive(Debug, thiserror::Error)]
pub enum PushError {
    #[error("Invalid Pushbullet key")]
    InvalidKey,
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Push rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
}

/// Delivers a titled note to the user's devices.
#[allow(async_fn_in_trait)]
pub trait PushService {
    async fn push_note(&self, key: &str, title: &str, body: &str) -> Result<(), PushError>;
}

#[derive(Serialize)]
struct NotePush<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    title: &'a str,
    body: &'a str,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

#[derive(Debug, Clone)]
pub struct Pushbullet {
    client: Client,
    base_url: String,
}

impl Pushbullet {
    pub fn new() -> Result<Self, PushError> {
        Self::with_base_url(PUSHBULLET_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, PushError> {
        let client = Client::builder()
            .user_agent(format!(
                "{}/{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

impl PushService for Pushbullet {
    async fn push_note(&self, key: &str, title: &str, body: &str) -> Result<(), PushError> {
        let url = format!("{}/v2/pushes", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .header("Access-Token", key)
            .json(&NotePush {
                kind: "note",
                title,
                body,
            })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            log::info!("Push notification sent");
            return Ok(());
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(PushError::InvalidKey);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&text)
            .map(|e| e.error.message)
            .unwrap_or(text);
        Err(PushError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}
