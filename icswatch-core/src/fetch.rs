//! Retrieving the feed payload.

use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use url::Url;

use crate::error::FetchError;

/// Anything that can produce the current feed bytes.
pub trait FeedSource {
    fn fetch(&self) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send;
}

/// HTTP GET against a fixed URL.
pub struct HttpFeed {
    client: reqwest::Client,
    url: Url,
    timeout: Duration,
}

impl HttpFeed {
    pub fn new(
        url: Url,
        user_agent: &str,
        headers: &BTreeMap<String, String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let mut default_headers = HeaderMap::new();
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| FetchError::Client(format!("Invalid header name '{name}': {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| FetchError::Client(format!("Invalid value for header {name}: {e}")))?;
            default_headers.insert(name, value);
        }

        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .default_headers(default_headers)
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(HttpFeed {
            client,
            url,
            timeout,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl FeedSource for HttpFeed {
    async fn fetch(&self) -> Result<Vec<u8>, FetchError> {
        let url = self.url.to_string();
        tracing::debug!(%url, "Fetching feed");

        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|source| {
                if source.is_timeout() {
                    FetchError::Timeout {
                        url: url.clone(),
                        secs: self.timeout.as_secs(),
                    }
                } else {
                    FetchError::Request {
                        url: url.clone(),
                        source,
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| FetchError::Body {
                url: url.clone(),
                source,
            })?;

        tracing::debug!(bytes = body.len(), "Feed fetched");
        Ok(body.to_vec())
    }
}
