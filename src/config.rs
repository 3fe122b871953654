//! Compile-time configuration for the site front end.
//!
//! Everything here has a `Default` matching the deployed site. There is no
//! runtime configuration source: no env vars, no query parameters.

use std::time::Duration;

/// Ids of the anchor elements the page is expected to provide.
/// Any of them may be missing; the matching feature is then skipped.
#[derive(Debug, Clone)]
pub struct ElementIds {
    pub page_title: &'static str,
    pub page_desc: &'static str,
    pub primary_cta: &'static str,
    pub footer: &'static str,
    pub grid: &'static str,
    pub client_expanders: &'static str,
    pub theme_button: &'static str,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            page_title: "page-title",
            page_desc: "page-desc",
            primary_cta: "primary-cta",
            footer: "foot",
            grid: "grid",
            client_expanders: "client-expanders",
            theme_button: "theme-btn",
        }
    }
}

/// Values used when `site.json` leaves a field out.
#[derive(Debug, Clone)]
pub struct SiteDefaults {
    pub title: &'static str,
    pub description: &'static str,
    pub cta_label: &'static str,
    pub cta_href: &'static str,
}

impl Default for SiteDefaults {
    fn default() -> Self {
        Self {
            title: "neuros.click",
            description:
                "A collection of sites created or maintained by Superbox for the Neuro-sama Community",
            cta_label: "Neuro Discord",
            cta_href: "https://discord.com/invite/neurosama",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub ids: ElementIds,
    pub site: SiteDefaults,
    /// Directory holding the JSON content, relative to the base path.
    pub data_dir: &'static str,
    pub site_file: &'static str,
    pub pages_file: &'static str,
    pub clients_file: &'static str,
    /// Repository name when served as a `*.github.io` project page.
    pub project_slug: Option<&'static str>,
    pub card_skeletons: usize,
    pub expander_skeletons: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ids: ElementIds::default(),
            site: SiteDefaults::default(),
            data_dir: "data/",
            site_file: "site.json",
            pages_file: "pages.json",
            clients_file: "neuro-ftp-clients.json",
            project_slug: Some("neuros-click"),
            card_skeletons: 4,
            expander_skeletons: 2,
        }
    }
}

/// HTTP cache mode for a fetch, mirroring the Fetch API's `RequestCache`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    Default,
    #[default]
    NoStore,
    Reload,
    NoCache,
    ForceCache,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    pub cache_mode: CacheMode,
    /// Upper bound for a single attempt, body included.
    pub timeout: Duration,
    /// Consult and populate the in-memory request cache.
    pub use_cache: bool,
    /// Additional attempts after the first failure.
    pub retries: u32,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            cache_mode: CacheMode::NoStore,
            timeout: Duration::from_millis(8000),
            use_cache: true,
            retries: 0,
        }
    }
}

impl FetchOptions {
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn without_cache(mut self) -> Self {
        self.use_cache = false;
        self
    }
}

/// Exponential backoff: `min(base * 2^attempt, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub base: Duration,
    pub max: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(1000),
            max: Duration::from_millis(5000),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after failed attempt number `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base.saturating_mul(factor).min(self.max)
    }
}
