//! Read-only client for the console backend HTTP API.
//!
//! Every endpoint answers with a `{ success, message?, ... }` envelope.
//! Backends report failures either with a non-2xx status or with
//! `success: false` and a message; both surface as an [`AdapterError`].

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use quotawatch_types::{
    AccountsResponse, Envelope, PoliciesResponse, QuotasResponse, ServicesResponse,
    StorageResponse, SystemResponse,
};

use crate::AdapterError;

/// Default API root of a locally running console.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/api";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the console backend.
#[derive(Debug, Clone)]
pub struct ConsoleClient {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl ConsoleClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> ConsoleClientBuilder {
        ConsoleClientBuilder::default()
    }

    /// The API root requests are issued against.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `GET /accounts`
    pub async fn accounts(&self) -> Result<AccountsResponse, AdapterError> {
        self.get("/accounts").await
    }

    /// `GET /quota-policies`
    pub async fn policies(&self) -> Result<PoliciesResponse, AdapterError> {
        self.get("/quota-policies").await
    }

    /// `GET /quotas`
    pub async fn quotas(&self) -> Result<QuotasResponse, AdapterError> {
        self.get("/quotas").await
    }

    /// `GET /monitoring/storage`
    pub async fn storage(&self) -> Result<StorageResponse, AdapterError> {
        self.get("/monitoring/storage").await
    }

    /// `GET /monitoring/system`
    pub async fn system(&self) -> Result<SystemResponse, AdapterError> {
        self.get("/monitoring/system").await
    }

    /// `GET /monitoring/services`
    pub async fn services(&self) -> Result<ServicesResponse, AdapterError> {
        self.get("/monitoring/services").await
    }

    /// Fetch `path` and decode its envelope.
    ///
    /// Returns [`AdapterError::Backend`] when the backend answers with
    /// `success: false`, whatever the HTTP status.
    pub async fn get<T>(&self, path: &str) -> Result<T, AdapterError>
    where
        T: DeserializeOwned + Envelope,
    {
        let url = self.url(path);
        debug!(%url, "fetching");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        decode(status.as_u16(), status.is_success(), &body)
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.endpoint.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

fn decode<T>(status: u16, ok: bool, body: &str) -> Result<T, AdapterError>
where
    T: DeserializeOwned + Envelope,
{
    match serde_json::from_str::<T>(body) {
        Ok(parsed) if parsed.success() && ok => Ok(parsed),
        Ok(parsed) if !parsed.success() => Err(AdapterError::Backend(
            parsed
                .message()
                .unwrap_or("backend reported failure")
                .to_string(),
        )),
        Ok(_) => Err(AdapterError::Http(format!("API returned status {}", status))),
        Err(_) if !ok => Err(AdapterError::Http(format!("API returned status {}", status))),
        Err(e) => Err(e.into()),
    }
}

/// Builder for [`ConsoleClient`].
#[derive(Debug, Default)]
pub struct ConsoleClientBuilder {
    endpoint: Option<String>,
    timeout: Option<Duration>,
}

impl ConsoleClientBuilder {
    /// Set the API root (e.g., "http://127.0.0.1:5000/api").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<ConsoleClient, AdapterError> {
        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AdapterError::Connection(e.to_string()))?;

        Ok(ConsoleClient {
            client,
            endpoint: self
                .endpoint
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve a single canned HTTP response and return the address.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let mut read = 0;
            loop {
                let n = socket.read(&mut buf[read..]).await.unwrap();
                read += n;
                if n == 0 || buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            let response = format!(
                "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        format!("http://{}/api", addr)
    }

    #[test]
    fn test_builder_defaults() {
        let client = ConsoleClient::builder().build().unwrap();
        assert_eq!(client.endpoint(), DEFAULT_ENDPOINT);
        assert_eq!(client.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_builder_custom() {
        let client = ConsoleClient::builder()
            .endpoint("http://nas.local:8080/api/")
            .timeout(Duration::from_secs(3))
            .build()
            .unwrap();

        assert_eq!(client.endpoint(), "http://nas.local:8080/api/");
        assert_eq!(client.timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_url_join() {
        let client = ConsoleClient::builder()
            .endpoint("http://nas.local/api/")
            .build()
            .unwrap();
        assert_eq!(client.url("/quotas"), "http://nas.local/api/quotas");
        assert_eq!(
            client.url("monitoring/system"),
            "http://nas.local/api/monitoring/system"
        );
    }

    #[test]
    fn test_decode_backend_failure() {
        let result: Result<QuotasResponse, _> =
            decode(500, false, r#"{"success": false, "message": "boom"}"#);
        match result {
            Err(AdapterError::Backend(msg)) => assert_eq!(msg, "boom"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_decode_status_without_envelope() {
        let result: Result<QuotasResponse, _> = decode(502, false, "<html>bad gateway</html>");
        assert!(matches!(result, Err(AdapterError::Http(_))));
    }

    #[test]
    fn test_decode_malformed_body() {
        let result: Result<QuotasResponse, _> = decode(200, true, "{\"quotas\": 7");
        assert!(matches!(result, Err(AdapterError::Parse(_))));
    }

    #[tokio::test]
    async fn test_fetch_quotas() {
        let endpoint = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"success": true, "quotas": [{"identity": "alice", "usedMB": 850, "softLimitMB": 500, "hardLimitMB": 1000}]}"#,
        )
        .await;

        let client = ConsoleClient::builder().endpoint(endpoint).build().unwrap();
        let response = client.quotas().await.unwrap();

        assert_eq!(response.quotas.len(), 1);
        assert_eq!(response.quotas[0].used_mb, 850.0);
    }

    #[tokio::test]
    async fn test_fetch_reports_backend_message() {
        let endpoint = serve_once(
            "HTTP/1.1 500 Internal Server Error",
            r#"{"success": false, "message": "psutil unavailable"}"#,
        )
        .await;

        let client = ConsoleClient::builder().endpoint(endpoint).build().unwrap();
        let err = client.system().await.unwrap_err();

        assert!(matches!(err, AdapterError::Backend(ref m) if m == "psutil unavailable"));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ConsoleClient::builder()
            .endpoint(format!("http://{}/api", addr))
            .build()
            .unwrap();
        let err = client.services().await.unwrap_err();

        assert!(matches!(err, AdapterError::Connection(_)));
    }
}
