use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Blocking GET transport. `Err` means no HTTP response was obtained at all.
pub trait HttpGet: Send + Sync {
    fn get(&self, url: &str) -> anyhow::Result<HttpResponse>;
}

pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new(timeout_ms: u64) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()?;
        Ok(Self { client })
    }
}

impl HttpGet for ReqwestTransport {
    fn get(&self, url: &str) -> anyhow::Result<HttpResponse> {
        let resp = self.client.get(url).send()?;
        let status = resp.status().as_u16();
        Ok(HttpResponse {
            status,
            body: resp.text()?,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Extra attempts after the first one.
    pub retries: u32,
    pub backoff: Duration,
}

fn is_retryable_status(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

/// Wraps a transport with bounded retry and exponential backoff. Only transport
/// errors, 429 and 5xx are retried; the last response or error is returned on
/// exhaustion.
pub struct RetryingClient<T: HttpGet> {
    inner: T,
    policy: RetryPolicy,
}

impl<T: HttpGet> RetryingClient<T> {
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

impl<T: HttpGet> HttpGet for RetryingClient<T> {
    fn get(&self, url: &str) -> anyhow::Result<HttpResponse> {
        let mut attempt = 0u32;
        loop {
            let result = self.inner.get(url);
            let retry = match &result {
                Ok(resp) => is_retryable_status(resp.status),
                Err(_) => true,
            };
            if !retry || attempt >= self.policy.retries {
                return result;
            }
            let delay = self.policy.backoff * 2u32.saturating_pow(attempt);
            match &result {
                Ok(resp) => warn!(url, status = resp.status, attempt, "retrying profile request"),
                Err(e) => warn!(url, error = %e, attempt, "retrying profile request"),
            }
            debug!(delay_ms = delay.as_millis() as u64, "backing off");
            std::thread::sleep(delay);
            attempt += 1;
        }
    }
}
