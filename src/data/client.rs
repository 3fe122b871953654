use std::cell::RefCell;
use std::rc::Rc;

use futures::FutureExt;
use log::{debug, warn};
use serde_json::Value;

use super::cache::RequestCache;
use super::content::ContentUrls;
use super::transport::{BrowserTransport, Sleeper, TimerSleeper, Transport};
use crate::config::{FetchOptions, RetryPolicy, SiteDefaults};

/// Entry point for all JSON retrieval on a page.
///
/// Cloning is cheap and every clone shares the same [`RequestCache`], so one
/// client per page gives one cache per session.
#[derive(Clone)]
pub struct DataClient {
    transport: Rc<dyn Transport>,
    sleeper: Rc<dyn Sleeper>,
    cache: Rc<RefCell<RequestCache>>,
    policy: RetryPolicy,
    pub(super) urls: Rc<ContentUrls>,
    pub(super) site_defaults: SiteDefaults,
}

impl DataClient {
    pub fn new(
        transport: Rc<dyn Transport>,
        sleeper: Rc<dyn Sleeper>,
        urls: ContentUrls,
        site_defaults: SiteDefaults,
    ) -> Self {
        Self {
            transport,
            sleeper,
            cache: Rc::new(RefCell::new(RequestCache::new())),
            policy: RetryPolicy::default(),
            urls: Rc::new(urls),
            site_defaults,
        }
    }

    /// Client backed by `fetch` and `setTimeout`.
    pub fn browser(urls: ContentUrls, site_defaults: SiteDefaults) -> Self {
        Self::new(
            Rc::new(BrowserTransport),
            Rc::new(TimerSleeper),
            urls,
            site_defaults,
        )
    }

    /// Fetch and parse a JSON document. Never fails: a document that could not
    /// be retrieved after all attempts comes back as `None`.
    ///
    /// Callers asking for a URL that is already in flight share that
    /// retrieval instead of starting another one.
    pub async fn fetch_json(&self, url: &str, options: FetchOptions) -> Option<Value> {
        let pending = {
            let mut cache = self.cache.borrow_mut();
            if options.use_cache {
                if let Some(hit) = cache.get(url) {
                    debug!("Cache hit for {}", url);
                    return Some(hit.clone());
                }
            }
            match cache.pending(url) {
                Some(inflight) => {
                    debug!("Joining in-flight request for {}", url);
                    inflight
                }
                None => {
                    let fetch = self
                        .clone()
                        .retrieve(url.to_string(), options)
                        .boxed_local()
                        .shared();
                    cache.start(url, fetch.clone());
                    fetch
                }
            }
        };
        pending.await
    }

    async fn retrieve(self, url: String, options: FetchOptions) -> Option<Value> {
        let result = self.attempt_all(&url, options).await;

        let mut cache = self.cache.borrow_mut();
        cache.finish(&url);
        if options.use_cache {
            if let Some(value) = &result {
                cache.insert(&url, value.clone());
            }
        }
        result
    }

    async fn attempt_all(&self, url: &str, options: FetchOptions) -> Option<Value> {
        let mut attempts = 0;
        let mut last_error = None;

        for attempt in 0..=options.retries {
            attempts += 1;
            match self
                .transport
                .get_json(url, options.cache_mode, options.timeout)
                .await
            {
                Ok(Value::Null) => return None,
                Ok(value) => return Some(value),
                Err(err) => {
                    let retry = err.is_retryable() && attempt < options.retries;
                    if retry {
                        let delay = self.policy.delay_for(attempt);
                        debug!(
                            "Attempt {} for {} failed ({}), retrying in {}ms",
                            attempts,
                            url,
                            err,
                            delay.as_millis()
                        );
                        last_error = Some(err);
                        self.sleeper.sleep(delay).await;
                    } else {
                        last_error = Some(err);
                        break;
                    }
                }
            }
        }

        if let Some(err) = last_error {
            warn!(
                "Failed to fetch JSON from {} after {} attempt(s): {}",
                url, attempts, err
            );
        }
        None
    }

    pub fn clear_memory_cache(&self) {
        self.cache.borrow_mut().clear();
        debug!("Memory cache cleared");
    }

    /// Remove the listed URLs from the cache, or everything when `urls` is `None`.
    pub fn invalidate_cache(&self, urls: Option<&[&str]>) {
        self.cache.borrow_mut().invalidate(urls);
    }

    pub fn cache_size(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn in_flight(&self) -> usize {
        self.cache.borrow().in_flight()
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
pub(crate) mod tests {
    use std::cell::Cell;
    use std::collections::VecDeque;
    use std::time::Duration;

    use futures::future::LocalBoxFuture;
    use serde_json::json;

    use super::*;
    use crate::config::CacheMode;
    use crate::error::FetchError;

    const URL: &str = "./data/pages.json";

    /// Replays canned results, one per attempt.
    #[derive(Default)]
    pub(crate) struct ScriptedTransport {
        responses: RefCell<VecDeque<Result<Value, FetchError>>>,
        calls: Cell<usize>,
    }

    impl ScriptedTransport {
        pub(crate) fn new(responses: Vec<Result<Value, FetchError>>) -> Rc<Self> {
            Rc::new(Self {
                responses: RefCell::new(responses.into()),
                calls: Cell::new(0),
            })
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.get()
        }
    }

    impl Transport for ScriptedTransport {
        fn get_json(
            &self,
            _url: &str,
            _cache_mode: CacheMode,
            _timeout: Duration,
        ) -> LocalBoxFuture<'static, Result<Value, FetchError>> {
            self.calls.set(self.calls.get() + 1);
            let next = self
                .responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(FetchError::Network("script exhausted".to_string())));
            Box::pin(async move {
                tokio::task::yield_now().await;
                next
            })
        }
    }

    /// Records requested delays and returns immediately.
    #[derive(Default)]
    pub(crate) struct RecordingSleeper {
        delays: RefCell<Vec<Duration>>,
    }

    impl RecordingSleeper {
        pub(crate) fn delays(&self) -> Vec<Duration> {
            self.delays.borrow().clone()
        }
    }

    impl Sleeper for RecordingSleeper {
        fn sleep(&self, delay: Duration) -> LocalBoxFuture<'static, ()> {
            self.delays.borrow_mut().push(delay);
            Box::pin(async {})
        }
    }

    pub(crate) fn client_with(
        transport: &Rc<ScriptedTransport>,
        sleeper: &Rc<RecordingSleeper>,
    ) -> DataClient {
        DataClient::new(
            transport.clone(),
            sleeper.clone(),
            ContentUrls {
                site: "./data/site.json".to_string(),
                pages: "./data/pages.json".to_string(),
                clients: "./data/neuro-ftp-clients.json".to_string(),
            },
            SiteDefaults::default(),
        )
    }

    fn server_error() -> FetchError {
        FetchError::Status {
            status: 500,
            status_text: "Internal Server Error".to_string(),
        }
    }

    #[tokio::test]
    async fn test_concurrent_requests_share_one_fetch() {
        let transport = ScriptedTransport::new(vec![Ok(json!({ "pages": [] }))]);
        let sleeper = Rc::new(RecordingSleeper::default());
        let client = client_with(&transport, &sleeper);

        let (a, b) = futures::join!(
            client.fetch_json(URL, FetchOptions::default()),
            client.fetch_json(URL, FetchOptions::default())
        );

        assert_eq!(transport.calls(), 1);
        assert_eq!(a, Some(json!({ "pages": [] })));
        assert_eq!(a, b);
        assert_eq!(client.in_flight(), 0);
        assert_eq!(client.cache_size(), 1);
    }

    #[tokio::test]
    async fn test_in_flight_sharing_without_memory_cache() {
        let transport = ScriptedTransport::new(vec![Ok(json!(1)), Ok(json!(2))]);
        let sleeper = Rc::new(RecordingSleeper::default());
        let client = client_with(&transport, &sleeper);
        let opts = FetchOptions::default().without_cache();

        let (a, b) = futures::join!(client.fetch_json(URL, opts), client.fetch_json(URL, opts));
        assert_eq!(transport.calls(), 1);
        assert_eq!(a, Some(json!(1)));
        assert_eq!(b, Some(json!(1)));
        assert_eq!(client.cache_size(), 0);

        // Once settled, the next call goes back to the network.
        let c = client.fetch_json(URL, opts).await;
        assert_eq!(transport.calls(), 2);
        assert_eq!(c, Some(json!(2)));
    }

    #[tokio::test]
    async fn test_retries_until_success_with_backoff() {
        let transport = ScriptedTransport::new(vec![
            Err(FetchError::Network("offline".to_string())),
            Err(server_error()),
            Err(FetchError::ContentType("text/html".to_string())),
            Ok(json!({ "title": "neuros.click" })),
        ]);
        let sleeper = Rc::new(RecordingSleeper::default());
        let client = client_with(&transport, &sleeper);

        let result = client
            .fetch_json(URL, FetchOptions::default().with_retries(4))
            .await;

        assert_eq!(result, Some(json!({ "title": "neuros.click" })));
        assert_eq!(transport.calls(), 4);
        let total: Duration = sleeper.delays().iter().sum();
        assert_eq!(
            sleeper.delays(),
            vec![
                Duration::from_millis(1000),
                Duration::from_millis(2000),
                Duration::from_millis(4000)
            ]
        );
        assert_eq!(total, Duration::from_millis(7000));
    }

    #[tokio::test]
    async fn test_backoff_is_capped() {
        let mut script: Vec<Result<Value, FetchError>> = (0..4)
            .map(|_| Err(FetchError::Parse("eof".to_string())))
            .collect();
        script.push(Ok(json!(true)));
        let transport = ScriptedTransport::new(script);
        let sleeper = Rc::new(RecordingSleeper::default());
        let client = client_with(&transport, &sleeper);

        let result = client
            .fetch_json(URL, FetchOptions::default().with_retries(5))
            .await;

        assert_eq!(result, Some(json!(true)));
        assert_eq!(
            sleeper.delays().last().copied(),
            Some(Duration::from_millis(5000))
        );
        let total: Duration = sleeper.delays().iter().sum();
        assert_eq!(total, Duration::from_millis(12_000));
    }

    #[tokio::test]
    async fn test_not_found_is_attempted_once() {
        let transport = ScriptedTransport::new(vec![
            Err(FetchError::Status {
                status: 404,
                status_text: "Not Found".to_string(),
            }),
            Ok(json!({})),
        ]);
        let sleeper = Rc::new(RecordingSleeper::default());
        let client = client_with(&transport, &sleeper);

        let result = client
            .fetch_json(URL, FetchOptions::default().with_retries(3))
            .await;

        assert_eq!(result, None);
        assert_eq!(transport.calls(), 1);
        assert!(sleeper.delays().is_empty());
    }

    #[tokio::test]
    async fn test_timeout_is_attempted_once() {
        let transport = ScriptedTransport::new(vec![
            Err(FetchError::Timeout(Duration::from_millis(8000))),
            Ok(json!({})),
        ]);
        let sleeper = Rc::new(RecordingSleeper::default());
        let client = client_with(&transport, &sleeper);

        let result = client
            .fetch_json(URL, FetchOptions::default().with_retries(2))
            .await;

        assert_eq!(result, None);
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_gives_up_after_all_attempts() {
        let transport = ScriptedTransport::new(vec![Err(server_error()), Err(server_error())]);
        let sleeper = Rc::new(RecordingSleeper::default());
        let client = client_with(&transport, &sleeper);

        let result = client
            .fetch_json(URL, FetchOptions::default().with_retries(1))
            .await;

        assert_eq!(result, None);
        assert_eq!(transport.calls(), 2);
        assert_eq!(sleeper.delays(), vec![Duration::from_millis(1000)]);
        assert_eq!(client.cache_size(), 0);
    }

    #[tokio::test]
    async fn test_cached_result_skips_network() {
        let transport = ScriptedTransport::new(vec![Ok(json!({ "a": 1 })), Ok(json!({ "a": 2 }))]);
        let sleeper = Rc::new(RecordingSleeper::default());
        let client = client_with(&transport, &sleeper);

        client.fetch_json(URL, FetchOptions::default()).await;
        let cached = client.fetch_json(URL, FetchOptions::default()).await;
        assert_eq!(cached, Some(json!({ "a": 1 })));
        assert_eq!(transport.calls(), 1);

        let fresh = client
            .fetch_json(URL, FetchOptions::default().without_cache())
            .await;
        assert_eq!(fresh, Some(json!({ "a": 2 })));
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_null_body_is_not_cached() {
        let transport = ScriptedTransport::new(vec![Ok(Value::Null)]);
        let sleeper = Rc::new(RecordingSleeper::default());
        let client = client_with(&transport, &sleeper);

        assert_eq!(client.fetch_json(URL, FetchOptions::default()).await, None);
        assert_eq!(client.cache_size(), 0);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let transport = ScriptedTransport::new(vec![Ok(json!(1)), Ok(json!(2))]);
        let sleeper = Rc::new(RecordingSleeper::default());
        let client = client_with(&transport, &sleeper);

        client.fetch_json(URL, FetchOptions::default()).await;
        client.invalidate_cache(Some(&[URL]));
        assert_eq!(client.cache_size(), 0);

        let again = client.fetch_json(URL, FetchOptions::default()).await;
        assert_eq!(again, Some(json!(2)));
        assert_eq!(transport.calls(), 2);

        client.clear_memory_cache();
        assert_eq!(client.cache_size(), 0);
    }
}
