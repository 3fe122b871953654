//! Thin wrappers over `web_sys` element access.
//!
//! Every helper takes an `Option` and does nothing when the element is
//! missing, so callers can chain lookups without checking each anchor.
//! Setters only touch the DOM when the value actually changes.

use log::warn;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

pub fn document() -> Option<Document> {
    web_sys::window().and_then(|w| w.document())
}

pub fn element_by_id(id: &str) -> Option<HtmlElement> {
    if id.is_empty() {
        return None;
    }
    document()?
        .get_element_by_id(id)?
        .dyn_into::<HtmlElement>()
        .ok()
}

pub fn set_text_if(el: Option<&Element>, text: &str) {
    let Some(el) = el else { return };
    if el.text_content().as_deref() != Some(text) {
        el.set_text_content(Some(text));
    }
}

pub fn text_of(el: &Element) -> String {
    el.text_content().unwrap_or_default()
}

pub fn set_attributes_if(el: Option<&Element>, attrs: &[(&str, &str)]) {
    let Some(el) = el else { return };
    for (key, value) in attrs {
        if el.get_attribute(key).as_deref() != Some(*value) {
            let _ = el.set_attribute(key, value);
        }
    }
}

pub fn set_hidden(el: Option<&HtmlElement>, hidden: bool) {
    let Some(el) = el else { return };
    if el.hidden() != hidden {
        el.set_hidden(hidden);
    }
}

/// Show or hide through inline `display`, which wins over stylesheet rules
/// that the `hidden` attribute would lose to.
pub fn set_displayed(el: Option<&HtmlElement>, shown: bool) {
    let Some(el) = el else { return };
    let style = el.style();
    let _ = if shown {
        style.remove_property("display").map(|_| ())
    } else {
        style.set_property("display", "none")
    };
}

pub fn toggle_class(el: Option<&Element>, class: &str, on: bool) {
    let Some(el) = el else { return };
    let _ = el.class_list().toggle_with_force(class, on);
}

/// Remove every child of `el`.
pub fn clear(el: &Element) {
    el.set_inner_html("");
}

/// `querySelector` that logs and returns `None` on an invalid selector.
pub fn query_selector(selector: &str, parent: &Element) -> Option<Element> {
    if selector.is_empty() {
        return None;
    }
    match parent.query_selector(selector) {
        Ok(found) => found,
        Err(_) => {
            warn!("Invalid selector: {}", selector);
            None
        }
    }
}

/// Create an element with attributes and optional text.
pub fn create_element(
    doc: &Document,
    tag: &str,
    attrs: &[(&str, &str)],
    text: Option<&str>,
) -> Option<HtmlElement> {
    let el = doc.create_element(tag).ok()?.dyn_into::<HtmlElement>().ok()?;
    set_attributes_if(Some(&*el), attrs);
    if let Some(text) = text {
        set_text_if(Some(&*el), text);
    }
    Some(el)
}
