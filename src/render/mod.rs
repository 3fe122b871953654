//! DOM rendering: page cards, FTP client expanders and loading/error states.

pub mod cards;
pub mod expander;
pub mod mount;
pub mod status;

pub use cards::render_cards;
pub use expander::mount_expanders;
pub use status::{show_error_state, show_fatal_banner, show_info_state, show_skeletons};
