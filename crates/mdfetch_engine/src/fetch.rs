use std::time::{Duration, Instant};

use futures_util::StreamExt;
use mdfetch_logging::mdfetch_debug;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::redirect::Policy;
use serde::{Deserialize, Serialize};

use crate::{FetchError, RawContent};

/// Limits for the built-in HTTP transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    /// Bodies larger than this are rejected, whether announced or streamed.
    pub max_bytes: u64,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            max_bytes: 5 * 1024 * 1024,
            user_agent: concat!("md-fetch/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Built-in direct-protocol transport: issues the GET itself and returns the
/// body as served, without running any script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpFetcher {
    settings: FetchSettings,
}

impl HttpFetcher {
    pub fn new(settings: FetchSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    fn client(&self) -> Result<reqwest::Client, FetchError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .user_agent(self.settings.user_agent.as_str())
            .redirect(Policy::limited(self.settings.redirect_limit))
            .build()
            .map_err(|err| FetchError::fetch_failed(format!("http client error: {err}")))
    }

    pub async fn fetch(&self, url: &str) -> Result<RawContent, FetchError> {
        let started = Instant::now();
        let request_url =
            reqwest::Url::parse(url).map_err(|err| FetchError::invalid_url(url, err.to_string()))?;

        let response = self
            .client()?
            .get(request_url)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status().as_u16();
        if status >= 400 {
            return Err(FetchError::fetch_failed(format!("http status {status}")));
        }
        let limit = self.settings.max_bytes;
        if let Some(announced) = response.content_length().filter(|len| *len > limit) {
            return Err(too_large(limit, announced));
        }

        let content_type = content_type(response.headers());
        let mut body = Vec::new();
        let mut chunks = response.bytes_stream();
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk.map_err(transport_error)?;
            let received = (body.len() + chunk.len()) as u64;
            if received > limit {
                return Err(too_large(limit, received));
            }
            body.extend_from_slice(&chunk);
        }

        mdfetch_debug!(
            "http GET {} status={} bytes={} elapsed={:?}",
            url,
            status,
            body.len(),
            started.elapsed()
        );
        Ok(RawContent::new(url, body).with_content_type(content_type))
    }
}

fn content_type(headers: &HeaderMap) -> Option<String> {
    headers
        .get(CONTENT_TYPE)?
        .to_str()
        .ok()
        .map(str::to_string)
}

fn too_large(limit: u64, actual: u64) -> FetchError {
    FetchError::fetch_failed(format!("response too large (max {limit}, actual {actual})"))
}

fn transport_error(err: reqwest::Error) -> FetchError {
    let kind = if err.is_timeout() {
        "timeout"
    } else if err.is_redirect() {
        "redirect limit exceeded"
    } else {
        "network error"
    };
    FetchError::fetch_failed(format!("{kind}: {err}"))
}
