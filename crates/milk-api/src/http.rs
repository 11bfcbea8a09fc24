use async_trait::async_trait;
use milk_core::{HttpResponse, RtmError, Transport};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CACHE_CONTROL, USER_AGENT};
use tracing::{debug, instrument};
use url::Url;

const USER_AGENT_VALUE: &str = concat!("milk-cli/", env!("CARGO_PKG_VERSION"));

/// reqwest-backed transport. Owns one HTTP client with the API's default
/// headers; construct it explicitly and hand it to the [`crate::ApiClient`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, RtmError> {
        let client = reqwest::Client::builder()
            .default_headers(default_headers())
            .build()
            .map_err(transport_err)?;
        Ok(Self { client })
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache, max-age=0"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
    headers
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[instrument(skip_all, fields(path = %url.path()))]
    async fn get(&self, url: &Url) -> Result<HttpResponse, RtmError> {
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(transport_err)?;
        let status = resp.status();
        debug!(status = status.as_u16(), "response received");
        let body = resp.text().await.map_err(transport_err)?;
        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }
}

fn transport_err(err: reqwest::Error) -> RtmError {
    RtmError::Transport {
        reason: err.to_string(),
    }
}
