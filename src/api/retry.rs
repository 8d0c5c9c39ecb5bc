use std::future::Future;
use std::time::Duration;

use http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use reqwest::Client;

use crate::error::{Error, Result};

// ── policy ────────────────────────────────────────────────────────────────────

/// Bounded exponential backoff: `min(base_delay * 2^attempt, max_delay)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; `max_retries + 1` attempts in total.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt + 1`, where `attempt` is zero-based.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// How a single attempt ended.
#[derive(Debug)]
pub enum Attempt<T> {
    Success(T),
    /// Transient failure (429, timeout, redirect loop); worth another try.
    Retry(String),
    Fatal(Error),
}

/// Waits out a backoff delay. Swapped out in tests to record delays instead.
pub trait Sleeper {
    fn sleep(&self, delay: Duration) -> impl Future<Output = ()> + Send;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, delay: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(delay)
    }
}

/// Runs `attempt` until it succeeds, fails fatally, or the retry budget is
/// spent. Sleeps `policy.delay_for(n)` between attempt `n` and `n + 1`.
pub async fn with_backoff<T, F, Fut, S>(
    policy: &RetryPolicy,
    sleeper: &S,
    url: &str,
    mut attempt: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Attempt<T>>,
    S: Sleeper,
{
    let mut n = 0u32;
    loop {
        match attempt().await {
            Attempt::Success(value) => return Ok(value),
            Attempt::Fatal(err) => return Err(err),
            Attempt::Retry(reason) => {
                if n >= policy.max_retries {
                    return Err(Error::MaxRetriesExceeded {
                        url: url.to_string(),
                        attempts: n + 1,
                    });
                }
                let delay = policy.delay_for(n);
                log::warn!(
                    "http: {reason} from {url}, retrying in {}s ({}/{})",
                    delay.as_secs(),
                    n + 1,
                    policy.max_retries
                );
                sleeper.sleep(delay).await;
                n += 1;
            }
        }
    }
}

// ── client ────────────────────────────────────────────────────────────────────

/// JSON API client: bearer auth on every call, per-call timeout, and the
/// backoff loop above around every request.
#[derive(Debug, Clone)]
pub struct ApiClient<S = TokioSleeper> {
    http: Client,
    base_url: String,
    policy: RetryPolicy,
    sleeper: S,
}

impl ApiClient<TokioSleeper> {
    pub fn new(base_url: &str, token: &str, timeout: Duration, policy: RetryPolicy) -> Result<Self> {
        Self::with_sleeper(base_url, token, timeout, policy, TokioSleeper)
    }
}

impl<S: Sleeper> ApiClient<S> {
    pub fn with_sleeper(
        base_url: &str,
        token: &str,
        timeout: Duration,
        policy: RetryPolicy,
        sleeper: S,
    ) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| Error::Config("API token contains invalid header characters".to_string()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|source| Error::Request {
                url: base_url.to_string(),
                source,
            })?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            policy,
            sleeper,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Sends `method url` with an optional JSON body. Returns the first 2xx
    /// response; 429s, timeouts and redirect loops are retried.
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response> {
        with_backoff(&self.policy, &self.sleeper, url, || {
            let mut req = self.http.request(method.clone(), url);
            if let Some(body) = body {
                req = req.json(body);
            }
            let url = url.to_string();
            async move { classify(req.send().await, url).await }
        })
        .await
    }
}

async fn classify(
    result: std::result::Result<reqwest::Response, reqwest::Error>,
    url: String,
) -> Attempt<reqwest::Response> {
    match result {
        Ok(resp) if resp.status().is_success() => Attempt::Success(resp),
        Ok(resp) if resp.status() == StatusCode::TOO_MANY_REQUESTS => {
            Attempt::Retry("HTTP 429".to_string())
        }
        Ok(resp) => {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            Attempt::Fatal(Error::Api { url, status, body })
        }
        Err(e) if e.is_timeout() => Attempt::Retry(format!("timeout ({e})")),
        Err(e) if e.is_redirect() => Attempt::Retry(format!("redirect loop ({e})")),
        Err(source) => Attempt::Fatal(Error::Request { url, source }),
    }
}
