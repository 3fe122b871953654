//! Leptos views mounted into containers that the page itself owns.
//!
//! Each container holds at most one live view. Replacing it drops the previous
//! [`UnmountHandle`], which removes its nodes and disposes its reactive owner.

use std::cell::RefCell;

use leptos::mount::{mount_to, UnmountHandle};
use leptos::prelude::*;
use leptos::tachys::view::any_view::AnyViewState;
use web_sys::HtmlElement;

use crate::dom;

thread_local! {
    static MOUNTED: RefCell<Vec<(HtmlElement, UnmountHandle<AnyViewState>)>> =
        const { RefCell::new(Vec::new()) };
}

/// Replace everything inside `container` with the view built by `view`.
pub fn replace_view<F>(container: &HtmlElement, view: F)
where
    F: FnOnce() -> AnyView + 'static,
{
    unmount(container);
    // Static markup shipped with the page is not tracked.
    dom::clear(container);

    let handle = mount_to(container.clone(), view);
    MOUNTED.with(|mounted| mounted.borrow_mut().push((container.clone(), handle)));
}

/// Tear down the view mounted in `container`. Returns whether one existed.
pub fn unmount(container: &HtmlElement) -> bool {
    let previous = MOUNTED.with(|mounted| {
        let mut mounted = mounted.borrow_mut();
        let index = mounted.iter().position(|(el, _)| el == container)?;
        Some(mounted.swap_remove(index))
    });
    // Dropped here, outside the borrow, since cleanups may mount again.
    previous.is_some()
}

#[cfg(all(test, target_arch = "wasm32"))]
pub(crate) fn mounted_count(container: &HtmlElement) -> usize {
    MOUNTED.with(|mounted| mounted.borrow().iter().filter(|(el, _)| el == container).count())
}
