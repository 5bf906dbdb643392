use std::time::Duration;

use axum::body::Bytes;
use tracing::debug;

use crate::config::Config;

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("not an http(s) url: {0}")]
    InvalidUrl(String),
    #[error("remote answered {0}")]
    Status(reqwest::StatusCode),
    #[error("remote body exceeds {limit} bytes")]
    TooLarge { limit: u64 },
    #[error(transparent)]
    Network(#[from] reqwest::Error),
}

/// Template and logo downloads. Single attempt, bounded by timeouts and a body size cap.
#[derive(Clone, Debug)]
pub struct Fetcher {
    client: reqwest::Client,
    max_bytes: u64,
}

impl Fetcher {
    pub fn new(config: &Config) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;
        Ok(Self { client, max_bytes: config.max_download_bytes })
    }

    /// GETs `raw_url`; anything but 200 is an error, as is a body over the cap.
    pub async fn fetch_bytes(&self, raw_url: &str) -> Result<Bytes, FetchError> {
        let url = parse_http_url(raw_url)?;
        let mut resp = self.client.get(url).send().await?;
        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            return Err(FetchError::Status(status));
        }
        let limit = self.max_bytes;
        if resp.content_length().is_some_and(|len| len > limit) {
            return Err(FetchError::TooLarge { limit });
        }
        // Content-Length may be absent or wrong, so the cap is enforced while reading too.
        let mut body = Vec::new();
        while let Some(chunk) = resp.chunk().await? {
            if (body.len() + chunk.len()) as u64 > limit {
                return Err(FetchError::TooLarge { limit });
            }
            body.extend_from_slice(&chunk);
        }
        debug!(url = raw_url, len = body.len(), "fetched");
        Ok(Bytes::from(body))
    }
}

fn parse_http_url(raw: &str) -> Result<url::Url, FetchError> {
    let url = url::Url::parse(raw).map_err(|_| FetchError::InvalidUrl(raw.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(FetchError::InvalidUrl(raw.to_string())),
    }
}
