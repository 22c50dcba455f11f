//! Cloudflare Workers KV implementation of [`CursorStore`].
//!
//! `KvStore` wraps a `reqwest::Client` and maps `get`/`set` onto the
//! namespace `values/{key}` endpoint, with automatic retry + exponential
//! back-off on transient (5xx / timeout / connection) failures.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dp_domain::config::KvConfig;
use dp_domain::error::{Error, Result};
use dp_domain::trace::TraceEvent;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use uuid::Uuid;

use crate::provider::CursorStore;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Client
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone)]
pub struct KvStore {
    http: Client,
    base_url: Url,
    account_id: String,
    namespace_id: String,
    token: String,
    max_retries: u32,
}

/// Outcome of a request that may legitimately find nothing.
enum Fetched {
    Found(Response),
    Missing,
}

impl KvStore {
    /// Build a new client from the `[store.kv]` config and a bearer token.
    pub fn new(cfg: &KvConfig, token: String) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        let base_url = Url::parse(&cfg.base_url)
            .map_err(|e| Error::Config(format!("store.kv.base_url: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "store.kv.base_url: {} is not a base URL",
                cfg.base_url
            )));
        }

        Ok(Self {
            http,
            base_url,
            account_id: cfg.account_id.clone(),
            namespace_id: cfg.namespace_id.clone(),
            token,
            max_retries: cfg.max_retries,
        })
    }

    /// `{base}/accounts/{account}/storage/kv/namespaces/{ns}/values/{key}`,
    /// each segment percent-encoded.
    fn value_url(&self, key: &str) -> Url {
        let mut url = self.base_url.clone();
        // `new` rejects cannot-be-a-base URLs.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend([
                "accounts",
                self.account_id.as_str(),
                "storage",
                "kv",
                "namespaces",
                self.namespace_id.as_str(),
                "values",
                key,
            ]);
        }
        url
    }

    fn decorate(&self, rb: RequestBuilder) -> RequestBuilder {
        rb.bearer_auth(&self.token)
            .header("X-Trace-Id", Uuid::new_v4().to_string())
    }

    // ── retry engine ─────────────────────────────────────────────────

    /// Execute a request with retry + exponential back-off on transient errors.
    ///
    /// * Retries on 5xx status codes and on transport errors.
    /// * Does **not** retry on 4xx; 404 is reported as [`Fetched::Missing`].
    /// * Emits a `TraceEvent::StoreCall` after every attempt.
    async fn execute_with_retry(
        &self,
        op: &str,
        key: &str,
        build_request: impl Fn() -> RequestBuilder,
    ) -> Result<Fetched> {
        let mut last_err: Option<Error> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let backoff = Duration::from_millis(100 * 2u64.pow(attempt - 1));
                tokio::time::sleep(backoff).await;
            }

            let start = Instant::now();
            let result = self.decorate(build_request()).send().await;
            let duration_ms = start.elapsed().as_millis() as u64;

            let status = match &result {
                Ok(resp) => resp.status().as_u16(),
                Err(e) => e.status().map(|s| s.as_u16()).unwrap_or(0),
            };
            TraceEvent::StoreCall {
                backend: "kv".into(),
                op: op.into(),
                key: key.into(),
                status,
                duration_ms,
            }
            .emit();

            match result {
                Ok(resp) if resp.status() == StatusCode::NOT_FOUND => {
                    return Ok(Fetched::Missing);
                }
                Ok(resp) if resp.status().is_server_error() => {
                    let body = resp.text().await.unwrap_or_default();
                    last_err = Some(Error::Store(format!("kv {op} {key} returned {status}: {body}")));
                    continue;
                }
                Ok(resp) if resp.status().is_client_error() => {
                    let resp_status = resp.status();
                    let body = resp.text().await.unwrap_or_default();
                    if resp_status == StatusCode::UNAUTHORIZED
                        || resp_status == StatusCode::FORBIDDEN
                    {
                        return Err(Error::Auth(format!("kv {op} auth failed ({status}): {body}")));
                    }
                    return Err(Error::Store(format!("kv {op} {key} returned {status}: {body}")));
                }
                Ok(resp) => return Ok(Fetched::Found(resp)),
                Err(e) => {
                    tracing::debug!(attempt, error = %e, "kv request failed, will retry");
                    last_err = Some(from_reqwest(e));
                }
            }
        }

        Err(last_err.unwrap_or_else(|| Error::Store(format!("kv {op} {key}: all retries exhausted"))))
    }
}

/// Convert a `reqwest::Error` into the shared error type.
pub fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait]
impl CursorStore for KvStore {
    async fn get(&self, key: &str) -> Result<String> {
        let url = self.value_url(key);
        match self
            .execute_with_retry("get", key, || self.http.get(url.clone()))
            .await?
        {
            Fetched::Missing => Ok(String::new()),
            Fetched::Found(resp) => resp.text().await.map_err(from_reqwest),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let url = self.value_url(key);
        let fetched = self
            .execute_with_retry("set", key, || {
                let form = reqwest::multipart::Form::new()
                    .text("metadata", "{}")
                    .text("value", value.to_owned());
                self.http.put(url.clone()).multipart(form)
            })
            .await?;
        match fetched {
            Fetched::Found(_) => Ok(()),
            Fetched::Missing => Err(Error::Store(format!(
                "kv set {key}: namespace {} not found",
                self.namespace_id
            ))),
        }
    }

    fn backend(&self) -> &'static str {
        "kv"
    }
}
