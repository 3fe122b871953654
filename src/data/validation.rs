//! Structural checks for the fetched content documents.
//!
//! Each validator accepts the raw JSON value and either hands back the typed
//! document or the reason it was rejected. Rejected documents are treated the
//! same as a failed fetch by the callers.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::types::{ClientList, PageList, SiteConfig};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validated<T> {
    Valid(T),
    Invalid(String),
}

#[cfg(test)]
impl<T> Validated<T> {
    fn ok(self) -> Option<T> {
        match self {
            Validated::Valid(value) => Some(value),
            Validated::Invalid(_) => None,
        }
    }

    fn is_valid(&self) -> bool {
        matches!(self, Validated::Valid(_))
    }
}

/// `site.json`: an object whose `title` and `description`, when present, are strings.
pub fn validate_site_config(value: &Value) -> Validated<SiteConfig> {
    let Some(obj) = value.as_object() else {
        return Validated::Invalid("site config is not an object".to_string());
    };
    for key in ["title", "description"] {
        if let Some(field) = obj.get(key) {
            if !field.is_string() {
                return Validated::Invalid(format!("site config `{key}` is not a string"));
            }
        }
    }
    typed(value)
}

/// `pages.json`: `pages` is an array of objects, each with a string `name`.
pub fn validate_pages(value: &Value) -> Validated<PageList> {
    let Some(pages) = value.get("pages").and_then(Value::as_array) else {
        return Validated::Invalid("`pages` is missing or not an array".to_string());
    };
    for (index, page) in pages.iter().enumerate() {
        if let Err(reason) = require_strings(page, &["name"]) {
            return Validated::Invalid(format!("page {index}: {reason}"));
        }
    }
    typed(value)
}

/// `neuro-ftp-clients.json`: `clients` is an array of objects with string `id` and `name`.
pub fn validate_clients(value: &Value) -> Validated<ClientList> {
    let Some(clients) = value.get("clients").and_then(Value::as_array) else {
        return Validated::Invalid("`clients` is missing or not an array".to_string());
    };
    for (index, client) in clients.iter().enumerate() {
        if let Err(reason) = require_strings(client, &["id", "name"]) {
            return Validated::Invalid(format!("client {index}: {reason}"));
        }
    }
    typed(value)
}

fn require_strings(value: &Value, keys: &[&str]) -> Result<(), String> {
    let obj: &Map<String, Value> = value.as_object().ok_or("not an object")?;
    for key in keys {
        match obj.get(*key) {
            Some(Value::String(_)) => {}
            Some(_) => return Err(format!("`{key}` is not a string")),
            None => return Err(format!("`{key}` is missing")),
        }
    }
    Ok(())
}

fn typed<T: DeserializeOwned>(value: &Value) -> Validated<T> {
    match serde_json::from_value(value.clone()) {
        Ok(doc) => Validated::Valid(doc),
        Err(e) => Validated::Invalid(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_site_config_accepts_partial_object() {
        let result = validate_site_config(&json!({ "footer": "© 2020 Example" }));
        let site = result.ok().unwrap();
        assert_eq!(site.footer.as_deref(), Some("© 2020 Example"));
        assert!(site.title.is_none());
    }

    #[test]
    fn test_site_config_rejects_non_string_title() {
        assert!(!validate_site_config(&json!({ "title": 5 })).is_valid());
        assert!(!validate_site_config(&json!({ "description": null })).is_valid());
        assert!(!validate_site_config(&json!(["not", "an", "object"])).is_valid());
    }

    #[test]
    fn test_pages_valid_collection_is_unchanged() {
        let pages = validate_pages(&json!({ "pages": [{ "name": "A" }, { "name": "B" }] }))
            .ok()
            .unwrap();
        let names: Vec<&str> = pages.pages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_pages_one_bad_entry_rejects_all() {
        let result = validate_pages(&json!({
            "pages": [{ "name": "A" }, { "description": "no name" }]
        }));
        assert_eq!(
            result,
            Validated::Invalid("page 1: `name` is missing".to_string())
        );
        assert!(!validate_pages(&json!({ "pages": [null] })).is_valid());
        assert!(!validate_pages(&json!({ "pages": {} })).is_valid());
        assert!(!validate_pages(&json!([{ "name": "A" }])).is_valid());
    }

    #[test]
    fn test_clients_require_id_and_name() {
        let ok = validate_clients(&json!({
            "clients": [{ "id": "filezilla", "name": "FileZilla", "downloadUrl": null }]
        }));
        assert!(ok.is_valid());

        let missing_id = validate_clients(&json!({ "clients": [{ "name": "FileZilla" }] }));
        assert!(!missing_id.is_valid());

        let numeric_id = validate_clients(&json!({ "clients": [{ "id": 1, "name": "x" }] }));
        assert!(!numeric_id.is_valid());
    }
}
