//! Applies `site.json` to the page: title, description, call-to-action and
//! the year-stamped footer.

use log::warn;
use web_sys::Element;

use crate::config::{ElementIds, SiteDefaults};
use crate::data::{Cta, SiteConfig};
use crate::dom;
use crate::error::AppError;

/// What the primary call-to-action anchor should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CtaPlan {
    pub label: String,
    pub href: String,
    /// Opens in a new tab with `rel="noopener noreferrer"`.
    pub external: bool,
}

impl CtaPlan {
    pub fn from_config(cta: Option<&Cta>, defaults: &SiteDefaults) -> Self {
        match cta {
            Some(cta) if !cta.label.is_empty() && !cta.href.is_empty() => Self {
                label: cta.label.clone(),
                href: cta.href.clone(),
                external: cta.href.starts_with("http"),
            },
            _ => Self {
                label: defaults.cta_label.to_string(),
                href: defaults.cta_href.to_string(),
                external: true,
            },
        }
    }
}

/// Stamp the current year into the footer text.
///
/// `© 2020 Example` becomes `© <year> Example`; `© Example` gains the year;
/// text without a leading `©` is prefixed with `© <year> `.
pub fn footer_text(footer: Option<&str>, year: u32) -> String {
    let stamp = format!("© {year}");
    let Some(text) = footer.filter(|t| !t.trim().is_empty()) else {
        return stamp;
    };

    if let Some((start, end)) = find_year_token(text) {
        return format!("{}{}{}", &text[..start], stamp, &text[end..]);
    }

    match text.strip_prefix('©') {
        Some(rest) => format!("{} {}", stamp, rest.trim_start()).trim_end().to_string(),
        None => format!("{stamp} {text}"),
    }
}

/// Byte range of the first `©` followed by optional whitespace and exactly
/// four digits.
fn find_year_token(text: &str) -> Option<(usize, usize)> {
    for (start, _) in text.match_indices('©') {
        let after = start + '©'.len_utf8();
        let rest = &text[after..];
        let digits_at = after + (rest.len() - rest.trim_start().len());
        let digits: String = text[digits_at..]
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();
        if digits.len() == 4 {
            return Some((start, digits_at + 4));
        }
    }
    None
}

/// The description anchor is only overwritten while it still shows nothing
/// or a placeholder.
pub fn description_replaceable(current: &str) -> bool {
    let current = current.trim();
    current.is_empty() || current.contains("placeholder") || current.contains("loading")
}

pub fn current_year() -> u32 {
    js_sys::Date::new_0().get_full_year()
}

pub fn apply_title(site: &SiteConfig, ids: &ElementIds, defaults: &SiteDefaults) {
    let title = site
        .title
        .as_deref()
        .filter(|t| !t.is_empty())
        .unwrap_or(defaults.title);
    let el = dom::element_by_id(ids.page_title);
    dom::set_text_if(el.as_deref(), title);

    if let Some(doc) = dom::document() {
        if doc.title() != title {
            doc.set_title(title);
        }
    }
}

pub fn apply_description(site: &SiteConfig, ids: &ElementIds) {
    let Some(el) = dom::element_by_id(ids.page_desc) else {
        return;
    };
    let Some(description) = site.description.as_deref() else {
        return;
    };
    if description_replaceable(&dom::text_of(&el)) {
        dom::set_text_if(Some(&*el), description);
    }
}

pub fn apply_cta(site: &SiteConfig, ids: &ElementIds, defaults: &SiteDefaults) {
    let Some(el) = dom::element_by_id(ids.primary_cta) else {
        return;
    };
    let plan = CtaPlan::from_config(site.cta.as_ref(), defaults);
    let anchor: &Element = &el;

    dom::set_text_if(Some(anchor), &plan.label);
    dom::set_attributes_if(Some(anchor), &[("href", plan.href.as_str())]);
    if plan.external {
        dom::set_attributes_if(
            Some(anchor),
            &[("rel", "noopener noreferrer"), ("target", "_blank")],
        );
    }
    dom::set_hidden(Some(&el), false);
}

/// Title, description and CTA. A missing anchor skips only its own part.
pub fn apply_site_configuration(
    site: &SiteConfig,
    ids: &ElementIds,
    defaults: &SiteDefaults,
) -> Result<(), AppError> {
    if dom::document().is_none() {
        return Err(AppError::NoDocument);
    }
    apply_title(site, ids, defaults);
    apply_description(site, ids);
    apply_cta(site, ids, defaults);
    Ok(())
}

pub fn init_footer(site: &SiteConfig, ids: &ElementIds, year: u32) {
    let Some(el) = dom::element_by_id(ids.footer) else {
        warn!("Footer element not found: {}", ids.footer);
        return;
    };
    dom::set_text_if(Some(&*el), &footer_text(site.footer.as_deref(), year));
}
