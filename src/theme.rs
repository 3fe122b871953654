use std::fmt;

use log::error;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlElement, MediaQueryListEvent, Storage};

use crate::dom;
use crate::error::AppError;

const STORAGE_KEY: &str = "theme";
const DARK_QUERY: &str = "(prefers-color-scheme: dark)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Auto,
    Light,
    Dark,
}

impl Theme {
    /// Unknown or missing stored values read as `Auto`.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("light") => Theme::Light,
            Some("dark") => Theme::Dark,
            _ => Theme::Auto,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Auto => "auto",
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Toggle order: dark → light → auto → dark.
    pub fn next(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Auto,
            Theme::Auto => Theme::Dark,
        }
    }

    /// Value for the `data-theme` attribute.
    pub fn resolve(self, system_dark: bool) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::Auto if system_dark => "dark",
            Theme::Auto => "light",
        }
    }

    pub fn button_label(self) -> String {
        format!("Theme: {self}")
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn storage() -> Option<Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

fn system_prefers_dark() -> bool {
    web_sys::window()
        .and_then(|w| w.match_media(DARK_QUERY).ok().flatten())
        .map_or(false, |mq| mq.matches())
}

/// Stored preference, `Auto` when nothing valid is stored.
pub fn stored_theme() -> Theme {
    let saved = storage().and_then(|s| s.get_item(STORAGE_KEY).ok().flatten());
    Theme::parse(saved.as_deref())
}

fn set_data_theme(value: &str) -> Result<(), AppError> {
    let html = dom::document()
        .and_then(|d| d.document_element())
        .ok_or(AppError::NoDocument)?;
    html.set_attribute("data-theme", value)?;
    Ok(())
}

/// Apply `theme` to `<html>` and persist it.
pub fn set_theme(theme: Theme) -> Result<(), AppError> {
    set_data_theme(theme.resolve(system_prefers_dark()))?;
    if let Some(storage) = storage() {
        storage.set_item(STORAGE_KEY, theme.as_str())?;
    }
    Ok(())
}

fn update_button(button: Option<&HtmlElement>) {
    dom::set_text_if(button.map(|b| &**b), &stored_theme().button_label());
}

/// Apply the stored theme, wire the toggle button and follow system changes
/// while in `Auto`.
pub fn init_theme_control(button_id: &str) -> Result<(), AppError> {
    let button = dom::element_by_id(button_id);

    set_theme(stored_theme())?;
    update_button(button.as_ref());

    if let Some(btn) = button {
        let target = btn.clone();
        let on_click = Closure::<dyn Fn()>::new(move || {
            let next = stored_theme().next();
            if let Err(e) = set_theme(next) {
                error!("Failed to change theme: {}", e);
            }
            update_button(Some(&target));
        });
        btn.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
        on_click.forget();
    }

    let media = web_sys::window().and_then(|w| w.match_media(DARK_QUERY).ok().flatten());
    if let Some(media) = media {
        let on_change =
            Closure::<dyn Fn(MediaQueryListEvent)>::new(move |ev: MediaQueryListEvent| {
                if stored_theme() == Theme::Auto {
                    let _ = set_data_theme(Theme::Auto.resolve(ev.matches()));
                }
            });
        media.add_event_listener_with_callback("change", on_change.as_ref().unchecked_ref())?;
        on_change.forget();
    }

    Ok(())
}
