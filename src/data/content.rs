use log::warn;
use serde_json::Value;

use super::client::DataClient;
use super::paths::BasePath;
use super::types::{ClientList, PageList, SiteConfig};
use super::validation::{validate_clients, validate_pages, validate_site_config, Validated};
use crate::config::{AppConfig, FetchOptions};

/// Resolved locations of the three content documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentUrls {
    pub site: String,
    pub pages: String,
    pub clients: String,
}

impl ContentUrls {
    pub fn new(base: &BasePath, config: &AppConfig) -> Self {
        Self {
            site: base.data_url(config.data_dir, config.site_file),
            pages: base.data_url(config.data_dir, config.pages_file),
            clients: base.data_url(config.data_dir, config.clients_file),
        }
    }
}

impl DataClient {
    /// `site.json`, or the built-in fallback when it is missing or malformed.
    pub async fn site_config(&self) -> SiteConfig {
        match self.load(&self.urls.site, validate_site_config).await {
            Some(site) => site,
            None => SiteConfig::fallback(&self.site_defaults),
        }
    }

    /// `pages.json`, or a single placeholder card.
    pub async fn pages(&self) -> PageList {
        self.load(&self.urls.pages, validate_pages)
            .await
            .unwrap_or_else(PageList::fallback)
    }

    /// `neuro-ftp-clients.json`. `None` means the page has nothing to show.
    pub async fn ftp_clients(&self) -> Option<ClientList> {
        self.load(&self.urls.clients, validate_clients).await
    }

    async fn load<T>(&self, url: &str, validate: fn(&Value) -> Validated<T>) -> Option<T> {
        let value = self
            .fetch_json(url, FetchOptions::default().with_retries(1))
            .await?;
        match validate(&value) {
            Validated::Valid(doc) => Some(doc),
            Validated::Invalid(reason) => {
                warn!("Ignoring {}: {}", url, reason);
                None
            }
        }
    }
}
