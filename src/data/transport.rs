//! Network and timer seams used by [`DataClient`](super::DataClient).
//!
//! In the browser both are backed by `gloo`; tests substitute scripted
//! implementations so retry and de-duplication can run without a network.

use std::time::Duration;

use futures::future::{select, Either, LocalBoxFuture};
use gloo_net::http::Request;
use serde_json::Value;
use web_sys::{AbortController, RequestCache};

use crate::config::CacheMode;
use crate::error::FetchError;

/// Performs one attempt at retrieving a JSON document.
pub trait Transport {
    fn get_json(
        &self,
        url: &str,
        cache_mode: CacheMode,
        timeout: Duration,
    ) -> LocalBoxFuture<'static, Result<Value, FetchError>>;
}

/// Waits between retry attempts.
pub trait Sleeper {
    fn sleep(&self, delay: Duration) -> LocalBoxFuture<'static, ()>;
}

impl From<CacheMode> for RequestCache {
    fn from(mode: CacheMode) -> Self {
        match mode {
            CacheMode::Default => RequestCache::Default,
            CacheMode::NoStore => RequestCache::NoStore,
            CacheMode::Reload => RequestCache::Reload,
            CacheMode::NoCache => RequestCache::NoCache,
            CacheMode::ForceCache => RequestCache::ForceCache,
        }
    }
}

/// `fetch`-based transport with an abort-on-timeout per attempt.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserTransport;

impl Transport for BrowserTransport {
    fn get_json(
        &self,
        url: &str,
        cache_mode: CacheMode,
        timeout: Duration,
    ) -> LocalBoxFuture<'static, Result<Value, FetchError>> {
        let url = url.to_string();
        Box::pin(async move {
            let controller = AbortController::new()
                .map_err(|_| FetchError::Network("AbortController unavailable".to_string()))?;
            let signal = controller.signal();

            let attempt = Box::pin(fetch_once(&url, cache_mode, &signal));
            let timer = Box::pin(gloo_timers::future::sleep(timeout));

            let outcome = select(attempt, timer).await;
            match outcome {
                Either::Left((result, _)) => result,
                Either::Right(((), _)) => {
                    controller.abort();
                    Err(FetchError::Timeout(timeout))
                }
            }
        })
    }
}

async fn fetch_once(
    url: &str,
    cache_mode: CacheMode,
    signal: &web_sys::AbortSignal,
) -> Result<Value, FetchError> {
    let cache_control = if cache_mode == CacheMode::NoStore {
        "no-cache"
    } else {
        "default"
    };

    let response = Request::get(url)
        .cache(cache_mode.into())
        .abort_signal(Some(signal))
        .header("Accept", "application/json")
        .header("Cache-Control", cache_control)
        .send()
        .await
        .map_err(|e| FetchError::Network(e.to_string()))?;

    if !response.ok() {
        return Err(FetchError::Status {
            status: response.status(),
            status_text: response.status_text(),
        });
    }

    let content_type = response.headers().get("content-type").unwrap_or_default();
    if !content_type.contains("application/json") {
        let shown = if content_type.is_empty() {
            "unknown".to_string()
        } else {
            content_type
        };
        return Err(FetchError::ContentType(shown));
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| FetchError::Parse(e.to_string()))
}

/// `setTimeout`-backed sleeper.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimerSleeper;

impl Sleeper for TimerSleeper {
    fn sleep(&self, delay: Duration) -> LocalBoxFuture<'static, ()> {
        Box::pin(gloo_timers::future::sleep(delay))
    }
}
