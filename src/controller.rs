//! Startup orchestration.
//!
//! The critical tier (site configuration and footer) runs first and must
//! succeed, falling back to built-in values once. The remaining modules run
//! concurrently and may fail independently.

use std::cell::Cell;
use std::rc::Rc;

use futures::future::{join_all, LocalBoxFuture};
use futures::FutureExt;
use gloo_timers::callback::Timeout;
use log::{debug, error, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;

use crate::config::AppConfig;
use crate::data::{BasePath, ContentUrls, DataClient, SiteConfig};
use crate::dom;
use crate::error::AppError;
use crate::render::{self, status::FATAL_MESSAGE};
use crate::site;
use crate::theme;

const CARDS_FAILED: &str = "Failed to load content. This might be a temporary issue.";
const CLIENTS_UNAVAILABLE: &str = "FTP client information temporarily unavailable";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitState {
    #[default]
    Idle,
    Running,
    Ready,
    Failed,
}

impl InitState {
    /// A failed startup may be attempted again; a running or finished one may
    /// not.
    pub fn can_start(self) -> bool {
        matches!(self, InitState::Idle | InitState::Failed)
    }
}

/// Outcome counts of the non-critical tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModuleSummary {
    pub succeeded: usize,
    pub total: usize,
}

impl ModuleSummary {
    pub fn record(&mut self, name: &str, result: Result<(), AppError>) {
        self.total += 1;
        match result {
            Ok(()) => self.succeeded += 1,
            Err(e) => warn!("Module '{}' failed: {}", name, e),
        }
    }
}

/// A named non-critical task.
pub type Module<'a> = (&'static str, LocalBoxFuture<'a, Result<(), AppError>>);

/// The work done at startup, split by tier.
pub trait StartupTasks {
    /// Site configuration, already defaulted when the document is missing.
    fn site_config(&self) -> LocalBoxFuture<'_, SiteConfig>;

    fn fallback_site_config(&self) -> SiteConfig;

    /// Title, description, CTA and footer.
    fn apply_site(&self, site: &SiteConfig) -> Result<(), AppError>;

    fn non_critical(&self) -> Vec<Module<'_>>;

    /// Surface a critical failure to the user.
    fn report_fatal(&self, err: &AppError);

    fn now_ms(&self) -> f64;
}

/// Runs the two tiers once, guarding against overlapping or repeated starts.
pub struct AppController<T = PageTasks> {
    tasks: T,
    state: Cell<InitState>,
}

impl<T: StartupTasks> AppController<T> {
    pub fn new(tasks: T) -> Self {
        Self {
            tasks,
            state: Cell::new(InitState::Idle),
        }
    }

    pub fn state(&self) -> InitState {
        self.state.get()
    }

    /// Returns the non-critical summary, or `None` when the call was ignored
    /// by the init guard.
    pub async fn init(&self) -> Result<Option<ModuleSummary>, AppError> {
        let state = self.state();
        if !state.can_start() {
            warn!("Application already initialized or initializing ({:?})", state);
            return Ok(None);
        }
        self.state.set(InitState::Running);
        let started = self.tasks.now_ms();

        if let Err(e) = self.run_critical().await {
            self.state.set(InitState::Failed);
            error!("Critical initialization failed: {}", e);
            self.tasks.report_fatal(&e);
            return Err(e);
        }

        let summary = self.run_non_critical().await;
        info!(
            "Application initialized in {}ms ({}/{} modules successful)",
            (self.tasks.now_ms() - started).round(),
            summary.succeeded,
            summary.total
        );
        self.state.set(InitState::Ready);
        Ok(Some(summary))
    }

    async fn run_critical(&self) -> Result<(), AppError> {
        let fetched = self.tasks.site_config().await;
        if let Err(e) = self.tasks.apply_site(&fetched) {
            warn!("Site configuration failed, using fallback: {}", e);
            let fallback = self.tasks.fallback_site_config();
            self.tasks
                .apply_site(&fallback)
                .map_err(|e| AppError::Critical(e.to_string()))?;
        }
        Ok(())
    }

    async fn run_non_critical(&self) -> ModuleSummary {
        let (names, tasks): (Vec<_>, Vec<_>) = self.tasks.non_critical().into_iter().unzip();
        let results = join_all(tasks).await;

        let mut summary = ModuleSummary::default();
        for (name, result) in names.into_iter().zip(results) {
            summary.record(name, result);
        }
        summary
    }
}

struct PageContext {
    config: AppConfig,
    base: BasePath,
    data: DataClient,
}

/// Startup work against the live page. Cloning shares the same data client.
#[derive(Clone)]
pub struct PageTasks {
    inner: Rc<PageContext>,
}

impl PageTasks {
    pub fn new(config: AppConfig) -> Self {
        let base = BasePath::current(config.project_slug);
        debug!("Base path: {}", base.as_str());
        let urls = ContentUrls::new(&base, &config);
        let data = DataClient::browser(urls, config.site.clone());
        Self {
            inner: Rc::new(PageContext { config, base, data }),
        }
    }

    /// Boxed so the retry button can start the same task again.
    fn load_page_cards(self) -> LocalBoxFuture<'static, Result<(), AppError>> {
        async move {
            let config = &self.inner.config;
            let Some(grid) = dom::element_by_id(config.ids.grid) else {
                warn!("Page grid not found: {}", config.ids.grid);
                return Ok(());
            };

            render::show_skeletons(Some(&grid), config.card_skeletons);
            dom::toggle_class(Some(&*grid), "loading", true);

            let pages = self.inner.data.pages().await;
            let rendered = render::render_cards(Some(&grid), &pages.pages, &self.inner.base);
            dom::toggle_class(Some(&*grid), "loading", false);

            match rendered {
                Ok(count) => {
                    debug!("Rendered {} page card(s)", count);
                    Ok(())
                }
                Err(e) => {
                    // The grid may have been swapped out while pages loaded.
                    let target = dom::element_by_id(config.ids.grid).unwrap_or(grid);
                    let retry = self.clone();
                    render::show_error_state(
                        Some(&target),
                        CARDS_FAILED,
                        Some(Box::new(move || {
                            spawn_local(async move {
                                if let Err(e) = retry.load_page_cards().await {
                                    warn!("Retry failed: {}", e);
                                }
                            });
                        })),
                    );
                    Err(e)
                }
            }
        }
        .boxed_local()
    }

    async fn load_expanders(&self) -> Result<(), AppError> {
        let config = &self.inner.config;
        let Some(host) = dom::element_by_id(config.ids.client_expanders) else {
            debug!("No FTP client host on this page");
            return Ok(());
        };

        render::show_skeletons(Some(&host), config.expander_skeletons);
        match self.inner.data.ftp_clients().await {
            Some(list) => {
                let count = render::mount_expanders(Some(&host), &list.clients, &self.inner.base)?;
                debug!("Mounted {} FTP client panel(s)", count);
                Ok(())
            }
            None => {
                render::show_info_state(Some(&host), CLIENTS_UNAVAILABLE);
                Err(AppError::Unavailable("FTP client list"))
            }
        }
    }
}

impl StartupTasks for PageTasks {
    fn site_config(&self) -> LocalBoxFuture<'_, SiteConfig> {
        self.inner.data.site_config().boxed_local()
    }

    fn fallback_site_config(&self) -> SiteConfig {
        SiteConfig::fallback(&self.inner.config.site)
    }

    fn apply_site(&self, site_config: &SiteConfig) -> Result<(), AppError> {
        let config = &self.inner.config;
        site::apply_site_configuration(site_config, &config.ids, &config.site)?;
        site::init_footer(site_config, &config.ids, site::current_year());
        Ok(())
    }

    fn non_critical(&self) -> Vec<Module<'_>> {
        let theme_button = self.inner.config.ids.theme_button;
        vec![
            ("theme", async move { theme::init_theme_control(theme_button) }.boxed_local()),
            ("page cards", self.clone().load_page_cards()),
            ("ftp expanders", self.load_expanders().boxed_local()),
        ]
    }

    fn report_fatal(&self, _err: &AppError) {
        if let Err(e) = render::show_fatal_banner(FATAL_MESSAGE) {
            error!("Could not show error banner: {}", e);
        }
    }

    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }
}

fn run(controller: Rc<AppController>) {
    spawn_local(async move {
        // Failures are already logged and reported by the controller.
        let _ = controller.init().await;
    });
}

/// Start the application once the DOM is ready.
pub fn start(config: AppConfig) {
    let controller = Rc::new(AppController::new(PageTasks::new(config)));

    match dom::document() {
        Some(doc) if doc.ready_state() == "loading" => {
            let on_ready = Closure::once(move || run(controller));
            if let Err(e) = doc
                .add_event_listener_with_callback("DOMContentLoaded", on_ready.as_ref().unchecked_ref())
            {
                error!("Could not wait for DOMContentLoaded: {:?}", e);
                return;
            }
            on_ready.forget();
        }
        _ => {
            Timeout::new(0, move || run(controller)).forget();
        }
    }
}
