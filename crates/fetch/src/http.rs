//! HTTP client wrapper with retry logic.

use crate::error::{FetchError, Result};
use reqwest::{Client, StatusCode, Url};
use std::time::Duration;
use tracing::warn;

/// HTTP client for downloading whole response bodies.
pub struct HttpClient {
    client: Client,
    max_retries: u32,
}

impl HttpClient {
    /// Create a new HTTP client.
    pub fn new(request_timeout: Duration, max_retries: u32) -> Result<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .user_agent(concat!("bestplace/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            max_retries,
        })
    }

    /// GET a URL and return its body.
    ///
    /// Timeouts, connection failures and 5xx responses are retried with
    /// exponential backoff; any other non-success status is an error.
    pub async fn get(&self, url: &Url) -> Result<Vec<u8>> {
        let mut attempt = 0;
        loop {
            if attempt > 0 {
                let backoff_ms = 200u64 * 2u64.pow(attempt - 1);
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            }

            let outcome = match self.client.get(url.clone()).send().await {
                Ok(resp) if resp.status().is_success() => return Ok(resp.bytes().await?.to_vec()),
                Ok(resp) => Err(FetchError::Status {
                    url: url.to_string(),
                    status: resp.status().as_u16(),
                }),
                Err(e) => Err(FetchError::Http(e)),
            };

            let err = match outcome {
                Err(err) if attempt < self.max_retries && is_transient(&err) => err,
                other => return other,
            };
            attempt += 1;
            warn!(url = %url, attempt, error = %err, "request failed, retrying");
        }
    }
}

fn is_transient(err: &FetchError) -> bool {
    match err {
        FetchError::Http(e) => e.is_timeout() || e.is_connect(),
        FetchError::Status { status, .. } => StatusCode::from_u16(*status)
            .map(|s| s.is_server_error())
            .unwrap_or(false),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_errors_are_transient() {
        let err = |status| FetchError::Status { url: "http://x".into(), status };
        assert!(is_transient(&err(503)));
        assert!(is_transient(&err(500)));
        assert!(!is_transient(&err(404)));
        assert!(!is_transient(&FetchError::Runtime("x".into())));
    }

    #[tokio::test]
    async fn test_unreachable_host_fails_after_retries() {
        let client = HttpClient::new(Duration::from_secs(2), 1).unwrap();
        // Port 9 (discard) on loopback: nothing listens there
        let url = Url::parse("http://127.0.0.1:9/wfs").unwrap();
        let err = client.get(&url).await.unwrap_err();
        assert!(matches!(err, FetchError::Http(_)));
    }
}
