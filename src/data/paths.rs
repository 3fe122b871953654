use url::Url;

/// URL path prefix under which the site is served.
///
/// Pages may live at the domain root or in sub-directories, and the whole site
/// may be deployed as a GitHub project page under `/<repo>/`. Asset and data
/// paths are rewritten against this prefix so they resolve the same from every
/// page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasePath(String);

impl BasePath {
    pub fn from_location(hostname: &str, pathname: &str, project_slug: Option<&str>) -> Self {
        let segments: Vec<&str> = pathname.split('/').filter(|s| !s.is_empty()).collect();

        if let Some(slug) = project_slug {
            if hostname.ends_with(".github.io") && segments.first() == Some(&slug) {
                return Self(format!("/{slug}/"));
            }
        }

        // The last segment names a document unless the path ends in a slash.
        let depth = if pathname.ends_with('/') {
            segments.len()
        } else {
            segments.len().saturating_sub(1)
        };

        if depth == 0 {
            Self("./".to_string())
        } else {
            Self("../".repeat(depth))
        }
    }

    /// Base path of the page currently loaded in the browser.
    pub fn current(project_slug: Option<&str>) -> Self {
        let location = web_sys::window().map(|w| w.location());
        let hostname = location
            .as_ref()
            .and_then(|l| l.hostname().ok())
            .unwrap_or_default();
        let pathname = location
            .as_ref()
            .and_then(|l| l.pathname().ok())
            .unwrap_or_else(|| "/".to_string());
        Self::from_location(&hostname, &pathname, project_slug)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Rewrite a site-relative asset path against the base.
    ///
    /// Absolute URLs, protocol-relative URLs and root-absolute paths pass
    /// through untouched.
    pub fn resolve(&self, path: &str) -> String {
        if path.is_empty() || is_absolute_url(path) || path.starts_with('/') {
            return path.to_string();
        }
        let relative = path.strip_prefix("./").unwrap_or(path);
        format!("{}{}", self.0, relative)
    }

    /// URL of a JSON document inside the data directory.
    pub fn data_url(&self, data_dir: &str, file: &str) -> String {
        self.resolve(&format!("{data_dir}{file}"))
    }
}

/// True for anything carrying its own scheme (`https:`, `winscp-sftp:`, …) or
/// a protocol-relative `//host` prefix.
pub fn is_absolute_url(href: &str) -> bool {
    href.starts_with("//") || Url::parse(href).is_ok()
}
