// Xen Orchestra REST client (host stats only)

use std::time::Duration;

use reqwest::StatusCode;

use crate::config::{Granularity, XoConfig};
use crate::models::{HostStatsResponse, WindowError};
use crate::version;

/// Why a fetch produced no window. None of these are fatal.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("XO request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("XO API returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("XO API returned an empty body")]
    EmptyBody,
    #[error("XO response has no stats")]
    MissingStats,
    #[error("XO response is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("XO response produced a malformed window: {0}")]
    Window(#[from] WindowError),
}

pub struct XoClient {
    http: reqwest::Client,
    stats_url: String,
    token: String,
}

impl XoClient {
    pub fn new(config: &XoConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(version::user_agent())
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()?;
        if !config.verify_tls {
            tracing::warn!("TLS certificate verification disabled for XO");
        }
        Ok(Self {
            http,
            stats_url: stats_url(&config.url, &config.host_uuid, config.granularity),
            token: config.token.clone(),
        })
    }

    pub fn stats_url(&self) -> &str {
        &self.stats_url
    }

    /// One GET of the host's latest RRD window.
    pub async fn fetch_host_stats(&self) -> Result<HostStatsResponse, FetchError> {
        let response = self
            .http
            .get(&self.stats_url)
            .header(
                reqwest::header::COOKIE,
                format!("authenticationToken={}", self.token),
            )
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(FetchError::Status { status, body });
        }
        parse_body(&body)
    }
}

/// `{url}/rest/v0/hosts/{uuid}/stats?granularity=...`; a trailing slash on `url` is dropped.
pub fn stats_url(base: &str, host_uuid: &str, granularity: Granularity) -> String {
    format!(
        "{}/rest/v0/hosts/{}/stats?granularity={}",
        base.trim_end_matches('/'),
        host_uuid,
        granularity.as_str()
    )
}

/// Decodes a success body. Blank bodies and `null` are rejected as empty.
pub fn parse_body(body: &str) -> Result<HostStatsResponse, FetchError> {
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(FetchError::EmptyBody);
    }
    Ok(serde_json::from_str(trimmed)?)
}
