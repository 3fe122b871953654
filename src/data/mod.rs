//! Data access: path resolution, resilient JSON retrieval, validation and the
//! typed content documents.

pub mod cache;
pub mod client;
pub mod content;
pub mod paths;
pub mod transport;
pub mod types;
pub mod validation;

pub use client::DataClient;
pub use content::ContentUrls;
pub use paths::BasePath;
pub use types::{ClientEntry, Cta, PageEntry, SiteConfig};
