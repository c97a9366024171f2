//! API-Football v3 client
//!
//! This module provides the upstream fetcher boundary. The cache-aside service
//! only sees [`UpstreamFetcher`]: an endpoint plus query in, an HTTP status and
//! JSON body out. [`ApiFootballClient`] is the reqwest-backed implementation.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Base URL for the API-Football v3 API
pub const API_FOOTBALL_BASE_URL: &str = "https://v3.football.api-sports.io";

/// Header carrying the API key on direct api-sports.io access
pub const API_KEY_HEADER: &str = "x-apisports-key";

/// Errors that can occur when reaching the upstream provider
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed before a response was read
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Upstream answered 200 with a body that is not JSON
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Raw upstream answer: status code plus decoded JSON body
///
/// The body is only decoded for 200 responses; any other status carries
/// `Value::Null`.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: Value,
}

impl UpstreamResponse {
    /// Whether the provider answered with HTTP 200
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// Something that can issue requests against the statistics provider
pub trait UpstreamFetcher: Send + Sync {
    /// Fetch `endpoint` (e.g. `"fixtures/events"`) with the given query
    fn fetch(
        &self,
        endpoint: &str,
        query: &[(&'static str, String)],
    ) -> impl Future<Output = Result<UpstreamResponse, FetchError>> + Send;
}

/// Client for the API-Football v3 REST API
#[derive(Debug, Clone)]
pub struct ApiFootballClient {
    client: Client,
    base_url: String,
    api_key: String,
    key_header: String,
}

impl ApiFootballClient {
    /// Create a new client with default settings
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_client(Client::new(), api_key)
    }

    /// Create a new client whose requests time out after `timeout`
    pub fn with_timeout(api_key: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, api_key))
    }

    /// Create a new client with a custom HTTP client
    pub fn with_client(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: API_FOOTBALL_BASE_URL.to_string(),
            api_key: api_key.into(),
            key_header: API_KEY_HEADER.to_string(),
        }
    }

    /// Point the client at a different host (RapidAPI proxy, test server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Send the key in a different header (e.g. `x-rapidapi-key`)
    pub fn with_key_header(mut self, key_header: impl Into<String>) -> Self {
        self.key_header = key_header.into();
        self
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }
}

impl UpstreamFetcher for ApiFootballClient {
    async fn fetch(
        &self,
        endpoint: &str,
        query: &[(&'static str, String)],
    ) -> Result<UpstreamResponse, FetchError> {
        let url = self.endpoint_url(endpoint);
        debug!(url = %url, ?query, "Upstream request");

        let response = self
            .client
            .get(&url)
            .header(self.key_header.as_str(), self.api_key.as_str())
            .query(query)
            .send()
            .await?;

        let status = response.status().as_u16();
        if status != 200 {
            warn!(url = %url, status, "Upstream returned non-success status");
            return Ok(UpstreamResponse {
                status,
                body: Value::Null,
            });
        }

        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text)?;

        Ok(UpstreamResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Serves a single canned HTTP response and hands back the raw request
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind");
        let addr = listener.local_addr().expect("Should have address");
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("Should accept");
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.expect("Should read");
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                concat!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\n",
                    "Content-Length: {}\r\nConnection: close\r\n\r\n{}"
                ),
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.expect("Should write");
            let _ = tx.send(String::from_utf8_lossy(&request).to_string());
        });

        (format!("http://{}", addr), rx)
    }

    #[test]
    fn test_endpoint_url_joins_cleanly() {
        let client = ApiFootballClient::new("key").with_base_url("http://localhost:8080/");
        assert_eq!(
            client.endpoint_url("/fixtures/events"),
            "http://localhost:8080/fixtures/events"
        );
        assert_eq!(client.endpoint_url("standings"), "http://localhost:8080/standings");
    }

    #[test]
    fn test_client_defaults() {
        let client = ApiFootballClient::new("secret");
        assert_eq!(client.base_url, API_FOOTBALL_BASE_URL);
        assert_eq!(client.key_header, API_KEY_HEADER);
        assert_eq!(client.api_key, "secret");
    }

    #[tokio::test]
    async fn test_fetch_success_sends_key_and_query() {
        let (base_url, request_rx) = serve_once("200 OK", r#"{"errors":[],"response":[]}"#).await;
        let client = ApiFootballClient::new("secret-key")
            .with_base_url(base_url)
            .with_key_header("x-rapidapi-key");

        let response = client
            .fetch("standings", &[("league", "39".to_string()), ("season", "2023".to_string())])
            .await
            .expect("Fetch should succeed");

        assert!(response.is_success());
        assert_eq!(response.body["response"], serde_json::json!([]));

        let request = request_rx.await.expect("Should capture request").to_lowercase();
        assert!(request.starts_with("get /standings?league=39&season=2023 "));
        assert!(request.contains("x-rapidapi-key: secret-key"));
    }

    #[tokio::test]
    async fn test_fetch_non_success_status_is_not_decoded() {
        let (base_url, _request_rx) = serve_once("429 Too Many Requests", "slow down").await;
        let client = ApiFootballClient::new("key").with_base_url(base_url);

        let response = client.fetch("fixtures", &[]).await.expect("Fetch should complete");

        assert_eq!(response.status, 429);
        assert!(!response.is_success());
        assert_eq!(response.body, Value::Null);
    }

    #[tokio::test]
    async fn test_fetch_non_json_body_is_parse_error() {
        let (base_url, _request_rx) = serve_once("200 OK", "<html>oops</html>").await;
        let client = ApiFootballClient::new("key").with_base_url(base_url);

        let result = client.fetch("fixtures", &[]).await;
        assert!(matches!(result, Err(FetchError::ParseError(_))));
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host_is_request_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind");
        let addr = listener.local_addr().expect("Should have address");
        drop(listener);

        let client = ApiFootballClient::new("key").with_base_url(format!("http://{}", addr));
        let result = client.fetch("fixtures", &[]).await;
        assert!(matches!(result, Err(FetchError::RequestFailed(_))));
    }
}
