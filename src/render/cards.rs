use leptos::prelude::*;
use leptos::ev::MouseEvent;
use log::warn;
use web_sys::HtmlElement;

use super::mount;
use crate::data::{BasePath, PageEntry};
use crate::error::AppError;

/// Everything a page card displays, with defaults applied and asset paths
/// resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub href: String,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub hover_image: Option<String>,
}

impl CardView {
    pub fn from_entry(entry: &PageEntry, base: &BasePath) -> Self {
        let non_empty = |s: &Option<String>| s.as_deref().filter(|v| !v.is_empty()).map(str::to_string);

        let image = non_empty(&entry.image).map(|src| base.resolve(&src));
        // A hover image only makes sense on top of a regular one.
        let hover_image = image
            .as_ref()
            .and(non_empty(&entry.hover_image))
            .map(|src| base.resolve(&src));

        Self {
            href: non_empty(&entry.href).unwrap_or_else(|| "#".to_string()),
            title: if entry.name.is_empty() {
                "Untitled".to_string()
            } else {
                entry.name.clone()
            },
            description: entry.description.clone().unwrap_or_default(),
            image,
            hover_image,
        }
    }
}

pub fn card_views(items: &[PageEntry], base: &BasePath) -> Vec<CardView> {
    items.iter().map(|item| CardView::from_entry(item, base)).collect()
}

#[component]
pub fn PageCard(card: CardView) -> impl IntoView {
    let CardView {
        href,
        title,
        description,
        image,
        hover_image,
    } = card;

    let (src, set_src) = signal(image.clone().unwrap_or_default());
    let (failed, set_failed) = signal(false);

    let original = image.clone();
    let on_enter = move |_: MouseEvent| {
        if let Some(hover) = &hover_image {
            set_src.set(hover.clone());
        }
    };
    let on_leave = move |_: MouseEvent| {
        if let Some(original) = &original {
            set_src.set(original.clone());
        }
    };

    view! {
        <a
            href=href
            class="card stretch"
            role="listitem"
            on:mouseenter=on_enter
            on:mouseleave=on_leave
        >
            <div class="thumb">
                {if image.is_some() {
                    view! {
                        <img
                            src=move || src.get()
                            alt=move || if failed.get() { "Image failed to load" } else { "" }
                            decoding="async"
                            loading="lazy"
                            width="120"
                            height="120"
                            style:opacity=move || if failed.get() { "0.5" } else { "1" }
                            on:error=move |_| set_failed.set(true)
                        />
                    }.into_any()
                } else {
                    view! { <span>"image"</span> }.into_any()
                }}
            </div>
            <div class="body">
                <div class="title">{title}</div>
                <div class="desc">{description}</div>
            </div>
        </a>
    }
}

/// Replace the children of `container` with one card per item.
///
/// Always a full replace, so calling it twice with the same items leaves the
/// same content. Returns the number of cards rendered. A container that has
/// been detached from the document is an error.
pub fn render_cards(
    container: Option<&HtmlElement>,
    items: &[PageEntry],
    base: &BasePath,
) -> Result<usize, AppError> {
    let Some(container) = container else {
        warn!("Cannot render cards: container element not found");
        return Ok(0);
    };
    if !container.is_connected() {
        return Err(AppError::Dom("card container is no longer in the document".to_string()));
    }

    let cards = card_views(items, base);
    let count = cards.len();

    mount::replace_view(container, move || {
        cards
            .into_iter()
            .map(|card| view! { <PageCard card=card /> })
            .collect_view()
            .into_any()
    });

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> BasePath {
        BasePath::from_location("neuros.click", "/", None)
    }

    fn entry(name: &str, href: Option<&str>) -> PageEntry {
        PageEntry {
            name: name.to_string(),
            href: href.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_cards_keep_order_and_default_href() {
        let cards = card_views(&[entry("X", Some("/x")), entry("Y", None)], &root());
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].href, "/x");
        assert_eq!(cards[0].title, "X");
        assert_eq!(cards[1].href, "#");
        assert_eq!(cards[1].title, "Y");
    }

    #[test]
    fn test_empty_fields_use_defaults() {
        let card = CardView::from_entry(&entry("", Some("")), &root());
        assert_eq!(card.title, "Untitled");
        assert_eq!(card.href, "#");
        assert_eq!(card.description, "");
        assert!(card.image.is_none());
    }

    #[test]
    fn test_images_resolve_against_base() {
        let base = BasePath::from_location("neuros.click", "/neuro-ftp/", None);
        let page = PageEntry {
            name: "Neuro FTP".to_string(),
            image: Some("./data/images/ftp.png".to_string()),
            hover_image: Some("./data/images/ftp-hover.png".to_string()),
            ..Default::default()
        };
        let card = CardView::from_entry(&page, &base);
        assert_eq!(card.image.as_deref(), Some("../data/images/ftp.png"));
        assert_eq!(card.hover_image.as_deref(), Some("../data/images/ftp-hover.png"));
    }

    #[test]
    fn test_hover_without_image_is_dropped() {
        let page = PageEntry {
            name: "A".to_string(),
            image: Some(String::new()),
            hover_image: Some("./hover.png".to_string()),
            ..Default::default()
        };
        let card = CardView::from_entry(&page, &root());
        assert!(card.image.is_none());
        assert!(card.hover_image.is_none());
    }

    #[test]
    fn test_rendering_twice_gives_same_views() {
        let items = [entry("A", Some("/a")), entry("B", None)];
        assert_eq!(card_views(&items, &root()), card_views(&items, &root()));
    }
}
