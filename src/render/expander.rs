//! Collapsible FTP client panels.
//!
//! Markup is rendered with leptos; expanding and collapsing is handled by one
//! delegated click listener and one keydown listener on the host, attached the
//! first time a host is seen.

use std::cell::RefCell;

use leptos::ev::MouseEvent;
use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement, KeyboardEvent};

use super::mount;
use crate::data::paths::is_absolute_url;
use crate::data::{BasePath, ClientEntry};
use crate::dom;
use crate::error::AppError;

pub const EXPAND_LABEL: &str = "> Expand";
pub const COLLAPSE_LABEL: &str = "< Collapse";
pub const NO_ACTIONS_HINT: &str = "No download or import available";

thread_local! {
    /// Hosts that already carry the delegated listeners.
    static DELEGATED_HOSTS: RefCell<Option<js_sys::WeakSet>> = const { RefCell::new(None) };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLink {
    pub href: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportLink {
    pub href: String,
    pub label: String,
    /// Local files are offered as downloads; anything with its own scheme is
    /// left for the browser to hand off.
    pub download: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpanderView {
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
    pub short: String,
    pub steps: Vec<String>,
    pub download: Option<DownloadLink>,
    pub import: Option<ImportLink>,
}

impl ExpanderView {
    pub fn from_client(client: &ClientEntry, base: &BasePath) -> Self {
        let present = |s: &Option<String>| s.as_deref().filter(|v| !v.trim().is_empty()).map(str::to_string);

        let download = present(&client.download_url).map(|href| DownloadLink {
            href,
            label: format!("Get {}", client.name),
        });

        let import = present(&client.import_href).map(|href| {
            let download = !is_absolute_url(&href);
            ImportLink {
                href: if download { base.resolve(&href) } else { href },
                label: present(&client.import_label).unwrap_or_else(|| "Connect".to_string()),
                download,
            }
        });

        Self {
            id: client.id.clone(),
            name: client.name.clone(),
            icon: present(&client.icon).map(|src| base.resolve(&src)),
            short: client.short.clone().unwrap_or_default(),
            steps: parse_instructions(client.instructions.as_deref().unwrap_or_default()),
            download,
            import,
        }
    }
}

/// One step per non-empty line, trimmed.
pub fn parse_instructions(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// State a header moves to when toggled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub expanded: bool,
}

impl ToggleOutcome {
    pub fn aria_value(self) -> &'static str {
        if self.expanded {
            "true"
        } else {
            "false"
        }
    }

    pub fn indicator(self) -> &'static str {
        if self.expanded {
            COLLAPSE_LABEL
        } else {
            EXPAND_LABEL
        }
    }

    /// Header actions are hidden while the panel shows its own copy.
    pub fn header_actions_hidden(self) -> bool {
        self.expanded
    }
}

/// Anything other than `"true"` counts as collapsed.
pub fn toggled(aria_expanded: Option<&str>) -> ToggleOutcome {
    ToggleOutcome {
        expanded: aria_expanded != Some("true"),
    }
}

pub fn is_activation_key(key: &str) -> bool {
    matches!(key, "Enter" | " " | "Spacebar")
}

#[component]
fn ClientActions(
    download: Option<DownloadLink>,
    import: Option<ImportLink>,
    #[prop(optional)] show_hint: bool,
) -> impl IntoView {
    let empty = download.is_none() && import.is_none();

    view! {
        <div class="actions" on:click=|ev: MouseEvent| ev.stop_propagation()>
            {download.map(|link| view! {
                <a class="btn primary" href=link.href target="_blank" rel="noopener noreferrer">
                    {link.label}
                </a>
            })}
            {import.map(|link| view! {
                <a class="btn neutral" href=link.href download=link.download.then_some("")>
                    {link.label}
                </a>
            })}
            {(empty && show_hint).then(|| view! { <div class="hint">{NO_ACTIONS_HINT}</div> })}
        </div>
    }
}

#[component]
fn ClientExpander(client: ExpanderView) -> impl IntoView {
    let ExpanderView {
        id,
        name,
        icon,
        short,
        steps,
        download,
        import,
    } = client;

    let thumb = match icon {
        Some(src) => view! {
            <img src=src alt="" loading="lazy" decoding="async" width="120" height="120" />
        }
        .into_any(),
        None => view! { <span>"image"</span> }.into_any(),
    };

    view! {
        <div class="expander" data-id=id>
            <div class="card expander-head" role="button" tabindex="0" aria-expanded="false">
                <div class="thumb">{thumb}</div>
                <div class="body">
                    <div class="title">{name}</div>
                    <div class="desc">{short}</div>
                    <ClientActions download=download.clone() import=import.clone() />
                    <div class="expand-indicator">{EXPAND_LABEL}</div>
                </div>
            </div>
            <div class="expander-panel card" hidden=true>
                <div class="body">
                    <div class="instructions">
                        {steps
                            .into_iter()
                            .map(|step| view! { <div class="step">{step}</div> })
                            .collect_view()}
                    </div>
                    <ClientActions download=download import=import show_hint=true />
                </div>
            </div>
        </div>
    }
}

/// Flip one expander open or closed, starting from its header.
fn toggle_expander(head: &Element) {
    let Some(container) = head.closest(".expander").ok().flatten() else {
        return;
    };
    let outcome = toggled(head.get_attribute("aria-expanded").as_deref());

    dom::set_attributes_if(Some(head), &[("aria-expanded", outcome.aria_value())]);
    dom::toggle_class(Some(&container), "expanded", outcome.expanded);

    let panel = dom::query_selector(".expander-panel", &container)
        .and_then(|el| el.dyn_into::<HtmlElement>().ok());
    dom::set_hidden(panel.as_ref(), !outcome.expanded);

    let indicator = dom::query_selector(".expand-indicator", head);
    dom::set_text_if(indicator.as_ref(), outcome.indicator());

    let head_actions = dom::query_selector(".actions", head)
        .and_then(|el| el.dyn_into::<HtmlElement>().ok());
    dom::set_displayed(head_actions.as_ref(), !outcome.header_actions_hidden());
}

/// Header the event landed on, unless it landed inside an actions area.
fn target_head(target: Option<web_sys::EventTarget>, host: &Element) -> Option<Element> {
    let target = target?.dyn_into::<Element>().ok()?;
    if target.closest(".actions").ok().flatten().is_some() {
        return None;
    }
    let head = target.closest(".expander-head").ok().flatten()?;
    host.contains(Some(&*head)).then_some(head)
}

fn attach_delegates(host: &HtmlElement) -> Result<(), AppError> {
    let first_time = DELEGATED_HOSTS.with(|cell| {
        let mut slot = cell.borrow_mut();
        let set = slot.get_or_insert_with(js_sys::WeakSet::new);
        let key = host.unchecked_ref::<js_sys::Object>();
        if set.has(key) {
            false
        } else {
            set.add(key);
            true
        }
    });
    if !first_time {
        return Ok(());
    }

    let click_host: Element = host.clone().into();
    let on_click = Closure::<dyn Fn(web_sys::MouseEvent)>::new(move |ev: web_sys::MouseEvent| {
        if let Some(head) = target_head(ev.target(), &click_host) {
            toggle_expander(&head);
        }
    });
    host.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
    on_click.forget();

    let key_host: Element = host.clone().into();
    let on_key = Closure::<dyn Fn(KeyboardEvent)>::new(move |ev: KeyboardEvent| {
        if !is_activation_key(&ev.key()) {
            return;
        }
        if let Some(head) = target_head(ev.target(), &key_host) {
            ev.prevent_default();
            toggle_expander(&head);
        }
    });
    host.add_event_listener_with_callback("keydown", on_key.as_ref().unchecked_ref())?;
    on_key.forget();

    debug!("Expander handlers attached");
    Ok(())
}

/// Replace the children of `host` with one panel per client.
///
/// Returns the number of panels rendered.
pub fn mount_expanders(
    host: Option<&HtmlElement>,
    clients: &[ClientEntry],
    base: &BasePath,
) -> Result<usize, AppError> {
    let Some(host) = host else {
        warn!("Cannot mount expanders: host element not found");
        return Ok(0);
    };

    let views: Vec<ExpanderView> = clients
        .iter()
        .map(|client| ExpanderView::from_client(client, base))
        .collect();
    let count = views.len();

    mount::replace_view(host, move || {
        views
            .into_iter()
            .map(|client| view! { <ClientExpander client=client /> })
            .collect_view()
            .into_any()
    });

    attach_delegates(host)?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> BasePath {
        BasePath::from_location("neuros.click", "/neuro-ftp/", None)
    }

    fn client() -> ClientEntry {
        ClientEntry {
            id: "winscp".to_string(),
            name: "WinSCP".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_instructions_drop_blank_lines() {
        let steps = parse_instructions("  Open WinSCP \n\n   \nClick New Site\r\nConnect");
        assert_eq!(steps, vec!["Open WinSCP", "Click New Site", "Connect"]);
        assert!(parse_instructions("").is_empty());
    }

    #[test]
    fn test_download_link_label() {
        let view = ExpanderView::from_client(
            &ClientEntry {
                download_url: Some("https://winscp.net/eng/download.php".to_string()),
                ..client()
            },
            &base(),
        );
        let link = view.download.unwrap();
        assert_eq!(link.label, "Get WinSCP");
        assert_eq!(link.href, "https://winscp.net/eng/download.php");
        assert!(view.import.is_none());
    }

    #[test]
    fn test_local_import_is_a_download() {
        let view = ExpanderView::from_client(
            &ClientEntry {
                import_href: Some("./data/share/neuros-click.ini".to_string()),
                ..client()
            },
            &base(),
        );
        let import = view.import.unwrap();
        assert!(import.download);
        assert_eq!(import.label, "Connect");
        assert_eq!(import.href, "../data/share/neuros-click.ini");
    }

    #[test]
    fn test_scheme_import_is_not_a_download() {
        for href in ["winscp-sftp://neuro@ftp.example/", "//ftp.example/site.xml"] {
            let view = ExpanderView::from_client(
                &ClientEntry {
                    import_href: Some(href.to_string()),
                    import_label: Some("Open in WinSCP".to_string()),
                    ..client()
                },
                &base(),
            );
            let import = view.import.unwrap();
            assert!(!import.download);
            assert_eq!(import.href, href);
            assert_eq!(import.label, "Open in WinSCP");
        }
    }

    #[test]
    fn test_no_actions() {
        let view = ExpanderView::from_client(&client(), &base());
        assert!(view.download.is_none());
        assert!(view.import.is_none());
        assert_eq!(view.short, "");
        assert!(view.icon.is_none());
    }

    #[test]
    fn test_toggle_outcomes() {
        let open = toggled(Some("false"));
        assert!(open.expanded);
        assert_eq!(open.aria_value(), "true");
        assert_eq!(open.indicator(), "< Collapse");
        assert!(open.header_actions_hidden());

        let closed = toggled(Some("true"));
        assert!(!closed.expanded);
        assert_eq!(closed.indicator(), "> Expand");
        assert!(!closed.header_actions_hidden());

        assert!(toggled(None).expanded);
    }

    #[test]
    fn test_activation_keys() {
        assert!(is_activation_key("Enter"));
        assert!(is_activation_key(" "));
        assert!(is_activation_key("Spacebar"));
        assert!(!is_activation_key("Tab"));
        assert!(!is_activation_key("a"));
    }
}
