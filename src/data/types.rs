use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::config::SiteDefaults;

/// Primary call-to-action link.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Cta {
    pub label: String,
    pub href: String,
}

/// Contents of `site.json`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SiteConfig {
    #[serde(default, deserialize_with = "opt_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "opt_cta")]
    pub cta: Option<Cta>,
    #[serde(default, deserialize_with = "opt_string")]
    pub footer: Option<String>,
}

impl SiteConfig {
    /// Used when `site.json` is missing or malformed.
    pub fn fallback(defaults: &SiteDefaults) -> Self {
        Self {
            title: Some(defaults.title.to_string()),
            description: Some(defaults.description.to_string()),
            cta: Some(Cta {
                label: "Open".to_string(),
                href: "#".to_string(),
            }),
            footer: None,
        }
    }
}

/// One card in the page grid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEntry {
    pub name: String,
    #[serde(default, deserialize_with = "opt_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub hover_image: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub href: Option<String>,
}

/// Contents of `pages.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PageList {
    pub pages: Vec<PageEntry>,
}

impl PageList {
    /// Placeholder shown when `pages.json` can't be loaded.
    pub fn fallback() -> Self {
        Self {
            pages: vec![PageEntry {
                name: "Content Loading".to_string(),
                description: Some("Please wait while we load the available pages...".to_string()),
                image: Some(String::new()),
                hover_image: None,
                href: Some("#".to_string()),
            }],
        }
    }
}

/// An FTP client with setup instructions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientEntry {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "opt_string")]
    pub icon: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub short: Option<String>,
    /// Newline-delimited steps.
    #[serde(default, deserialize_with = "opt_string")]
    pub instructions: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub download_url: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub import_href: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub import_label: Option<String>,
}

/// Contents of `neuro-ftp-clients.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClientList {
    pub clients: Vec<ClientEntry>,
}

/// Optional fields of the wrong JSON type read as absent instead of failing
/// the whole document.
fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn opt_cta<'de, D>(deserializer: D) -> Result<Option<Cta>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}
