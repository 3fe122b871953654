mod config;
mod controller;
mod data;
mod dom;
mod error;
mod render;
mod site;
mod theme;

use config::AppConfig;

fn main() {
    console_error_panic_hook::set_once();

    let level = if cfg!(debug_assertions) {
        log::Level::Debug
    } else {
        log::Level::Info
    };
    if let Err(e) = console_log::init_with_level(level) {
        web_sys::console::error_1(&format!("Logger already initialized: {e}").into());
    }

    controller::start(AppConfig::default());
}
