pub mod export;

use std::time::Duration;

use reqwest::Url;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::payload::{ResultPayload, StatsPayload};
use crate::request::Endpoint;
use crate::state::QueryState;

const USER_AGENT: &str = concat!("qpanel/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to build HTTP client: {source}")]
    HttpClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to setup proxy: {proxy}: {source}")]
    ProxySetup {
        proxy: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with HTTP status {status}")]
    Status { url: String, status: u16 },

    #[error("malformed response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write export: {source}")]
    ExportWrite {
        #[source]
        source: std::io::Error,
    },
}

impl ClientError {
    /// Whether the service could not be reached at all (as opposed to
    /// answering with something unusable).
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

/// Result of one query dispatch.
pub type QueryOutcome = Result<ResultPayload, ClientError>;

#[derive(Clone, Debug, Default)]
pub struct ClientOptions {
    /// Seconds; 0 means no timeout.
    pub timeout_seconds: u64,
    pub proxy: Option<String>,
    /// Honour `HTTP_PROXY`/`HTTPS_PROXY` from the environment when no
    /// explicit proxy is set.
    pub system_proxy: bool,
}

fn build_http_client(options: &ClientOptions) -> Result<reqwest::Client, ClientError> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::USER_AGENT,
        reqwest::header::HeaderValue::from_static(USER_AGENT),
    );
    headers.insert(
        reqwest::header::ACCEPT,
        reqwest::header::HeaderValue::from_static("application/qlever-results+json, application/json"),
    );

    let mut builder = reqwest::Client::builder().default_headers(headers);
    if options.timeout_seconds > 0 {
        builder = builder.timeout(Duration::from_secs(options.timeout_seconds));
    }
    if let Some(proxy) = options.proxy.as_deref().filter(|p| !p.trim().is_empty()) {
        let proxy = reqwest::Proxy::all(proxy).map_err(|e| ClientError::ProxySetup {
            proxy: proxy.to_string(),
            source: e,
        })?;
        builder = builder.proxy(proxy);
    } else if !options.system_proxy {
        builder = builder.no_proxy();
    }

    builder
        .build()
        .map_err(|e| ClientError::HttpClientBuild { source: e })
}

/// Async client for the query service.
#[derive(Clone, Debug)]
pub struct QueryClient {
    http: reqwest::Client,
    endpoint: Endpoint,
}

impl QueryClient {
    pub fn new(endpoint: Endpoint, options: &ClientOptions) -> Result<Self, ClientError> {
        Ok(Self {
            http: build_http_client(options)?,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub async fn fetch_result(&self, state: &QueryState) -> QueryOutcome {
        self.get_json(self.endpoint.query_url(state)).await
    }

    pub async fn fetch_stats(&self) -> Result<StatsPayload, ClientError> {
        self.get_json(self.endpoint.stats_url()).await
    }

    // The service reports query errors with a 4xx status and a regular JSON
    // body, so the body is decoded first and the status only matters when it
    // is not JSON.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ClientError> {
        let url_text = url.to_string();
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ClientError::Transport {
                url: url_text.clone(),
                source: e,
            })?;
        let status = resp.status();
        let body = resp.bytes().await.map_err(|e| ClientError::Transport {
            url: url_text.clone(),
            source: e,
        })?;
        decode_body(&url_text, status.as_u16(), &body)
    }
}

pub(crate) fn decode_body<T: DeserializeOwned>(
    url: &str,
    status: u16,
    body: &[u8],
) -> Result<T, ClientError> {
    match serde_json::from_slice::<T>(body) {
        Ok(value) => Ok(value),
        Err(_) if !(200..300).contains(&status) => Err(ClientError::Status {
            url: url.to_string(),
            status,
        }),
        Err(e) => Err(ClientError::Decode {
            url: url.to_string(),
            source: e,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_with_bad_status_still_decodes() {
        let body = br#"{"status":"ERROR","query":"x","exception":"boom"}"#;
        let p: ResultPayload = decode_body("http://h/", 400, body).unwrap();
        assert!(p.is_error());
        assert_eq!(p.exception, "boom");
    }

    #[test]
    fn html_error_page_maps_to_status_error() {
        let err = decode_body::<ResultPayload>("http://h/", 502, b"<html>bad gateway</html>")
            .unwrap_err();
        assert!(matches!(err, ClientError::Status { status: 502, .. }));
        assert!(!err.is_transport());
    }

    #[test]
    fn garbage_with_ok_status_is_a_decode_error() {
        let err = decode_body::<ResultPayload>("http://h/", 200, b"not json").unwrap_err();
        assert!(matches!(err, ClientError::Decode { .. }));
    }
}
