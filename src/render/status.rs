use leptos::ev::MouseEvent;
use leptos::prelude::*;
use log::warn;
use web_sys::HtmlElement;

use super::mount;
use crate::dom;
use crate::error::AppError;

pub const FATAL_MESSAGE: &str =
    "Site initialization failed. Please refresh the page or try again later.";

/// Action behind an error state's button. Runs at most once.
pub type RetryAction = Box<dyn FnOnce()>;

/// Placeholder cards shown while content loads.
pub fn show_skeletons(container: Option<&HtmlElement>, count: usize) {
    let Some(container) = container else { return };
    if count == 0 {
        warn!("Skeleton count must be positive");
        mount::unmount(container);
        dom::clear(container);
        return;
    }

    mount::replace_view(container, move || {
        (0..count)
            .map(|_| {
                view! {
                    <div class="card skeleton" aria-hidden="true">
                        <div class="thumb"></div>
                        <div class="body">
                            <div class="title"></div>
                            <div class="desc"></div>
                        </div>
                    </div>
                }
            })
            .collect_view()
            .into_any()
    });
}

pub fn show_error_state(container: Option<&HtmlElement>, message: &str, action: Option<RetryAction>) {
    let Some(container) = container else {
        warn!("Cannot show error state: container not found");
        return;
    };
    let message = message.to_string();

    mount::replace_view(container, move || {
        let button = action.map(|action| {
            let pending = StoredValue::new_local(Some(action));
            let (used, set_used) = signal(false);
            view! {
                <button
                    class="error-action"
                    type="button"
                    disabled=move || used.get()
                    on:click=move |_: MouseEvent| {
                        if let Some(action) = pending.try_update_value(Option::take).flatten() {
                            set_used.set(true);
                            action();
                        }
                    }
                >
                    "Retry"
                </button>
            }
        });

        view! {
            <div class="error-state" role="alert">
                <p>{message}</p>
                {button}
            </div>
        }
        .into_any()
    });
}

pub fn show_info_state(container: Option<&HtmlElement>, message: &str) {
    let Some(container) = container else { return };
    let message = message.to_string();

    mount::replace_view(container, move || {
        view! {
            <div class="info-state">
                <p>{message}</p>
            </div>
        }
        .into_any()
    });
}

/// Prepend the fatal banner to `<body>`. A second call leaves the first
/// banner in place.
pub fn show_fatal_banner(message: &str) -> Result<(), AppError> {
    let doc = dom::document().ok_or(AppError::NoDocument)?;
    let body = doc.body().ok_or(AppError::NoDocument)?;
    if dom::query_selector(".bootstrap-error", &body).is_some() {
        return Ok(());
    }

    let banner = dom::create_element(&doc, "div", &[("class", "bootstrap-error"), ("role", "alert")], Some(message))
        .ok_or_else(|| AppError::Dom("could not create error banner".to_string()))?;
    body.insert_before(&banner, body.first_child().as_ref())?;
    Ok(())
}
