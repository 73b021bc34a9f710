//! Folio test utilities.
//!
//! Helpers for integration testing: page and snippet fixtures, a stub
//! archive server, and assertion utilities for API responses.

mod archive;

pub use archive::ArchiveStub;

use serde_json::{Map, Value as JsonValue, json};
use uuid::Uuid;

/// Create a page creation request with default values.
pub fn test_page(page_type: &str, title: &str) -> TestPage {
    TestPage {
        page_type: page_type.to_string(),
        title: title.to_string(),
        parent_id: None,
        slug: None,
        fields: Map::new(),
        children: Map::new(),
    }
}

/// A builder for `POST /api/v2/pages/` bodies.
#[derive(Debug, Clone)]
pub struct TestPage {
    pub page_type: String,
    pub title: String,
    pub parent_id: Option<Uuid>,
    pub slug: Option<String>,
    pub fields: Map<String, JsonValue>,
    pub children: Map<String, JsonValue>,
}

impl TestPage {
    /// Place under a parent page.
    pub fn under(mut self, parent_id: Uuid) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Set an explicit slug.
    pub fn with_slug(mut self, slug: &str) -> Self {
        self.slug = Some(slug.to_string());
        self
    }

    /// Add a single field.
    pub fn with_field(mut self, name: &str, value: JsonValue) -> Self {
        self.fields.insert(name.to_string(), value);
        self
    }

    /// Set a child collection from a list of records.
    pub fn with_children(mut self, name: &str, records: JsonValue) -> Self {
        self.children.insert(name.to_string(), records);
        self
    }

    /// Request body for the create endpoint.
    pub fn to_json(&self) -> JsonValue {
        let mut body = json!({
            "type": self.page_type,
            "parent_id": self.parent_id,
            "title": self.title,
            "fields": self.fields,
            "children": self.children,
        });
        if let Some(slug) = &self.slug {
            body["slug"] = json!(slug);
        }
        body
    }
}

/// Snippet fixtures in the shape `POST /api/v0/snippets` accepts.
pub mod snippets {
    use serde_json::{Value, json};
    use uuid::Uuid;

    pub fn document(title: &str, url: &str) -> (Uuid, Value) {
        let id = Uuid::now_v7();
        (id, json!({"kind": "document", "id": id, "title": title, "url": url}))
    }

    pub fn image(title: &str, file: &str) -> (Uuid, Value) {
        let id = Uuid::now_v7();
        (id, json!({"kind": "image", "id": id, "title": title, "file": file}))
    }

    pub fn subject(name: &str) -> (Uuid, Value) {
        let id = Uuid::now_v7();
        (id, json!({"kind": "subject", "id": id, "name": name}))
    }
}

/// Column-row stream with one column, the minimum a home page row needs.
pub fn column_row(heading: &str) -> JsonValue {
    json!([{"type": "column", "value": {"heading": heading}}])
}

/// Archive metadata document as served by `{archive}/contents/{id}.json`.
pub fn archive_metadata(license_version: &str, chapters: &[&str]) -> JsonValue {
    let contents: Vec<JsonValue> = chapters
        .iter()
        .enumerate()
        .map(|(i, title)| json!({"id": format!("ch{}", i + 1), "title": title}))
        .collect();
    json!({
        "license": {
            "name": "Creative Commons Attribution License",
            "version": license_version,
            "url": format!("https://creativecommons.org/licenses/by/{license_version}/"),
        },
        "tree": {"id": "root", "contents": contents},
    })
}

/// Assertion helpers for JSON content.
pub mod assert {
    use serde_json::Value;

    /// Assert that a JSON value has a specific key.
    pub fn has_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_some(),
            "Expected JSON to have key '{key}', got: {value}"
        );
    }

    /// Assert that a JSON value equals expected.
    pub fn json_eq(actual: &Value, expected: &Value) {
        assert_eq!(
            actual,
            expected,
            "JSON mismatch:\nactual: {}\nexpected: {}",
            serde_json::to_string_pretty(actual).unwrap_or_default(),
            serde_json::to_string_pretty(expected).unwrap_or_default()
        );
    }

    /// Assert that a validation response reports `field`.
    pub fn field_error(body: &Value, field: &str) {
        assert!(
            body["errors"][field].as_array().is_some_and(|m| !m.is_empty()),
            "Expected a validation error on '{field}', got: {body}"
        );
    }

    /// Assert that a string contains a substring.
    pub fn contains(haystack: &str, needle: &str) {
        assert!(
            haystack.contains(needle),
            "Expected string to contain '{needle}'\nActual: {haystack}"
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_page_builder() {
        let parent = Uuid::now_v7();
        let body = test_page("books.Book", "Physics")
            .under(parent)
            .with_slug("physics")
            .with_field("cnx_id", json!("031da8d3"))
            .with_children("book_quotes", json!([]))
            .to_json();

        assert_eq!(body["type"], "books.Book");
        assert_eq!(body["parent_id"], json!(parent));
        assert_eq!(body["slug"], "physics");
        assert_eq!(body["fields"]["cnx_id"], "031da8d3");
        assert!(body["children"]["book_quotes"].is_array());
    }

    #[test]
    fn slug_is_omitted_unless_set() {
        let body = test_page("pages.HomePage", "Home").to_json();
        assert!(body.get("slug").is_none());
        assert_eq!(body["parent_id"], JsonValue::Null);
    }

    #[test]
    fn archive_metadata_shape() {
        let meta = archive_metadata("4.0", &["Kinematics", "Dynamics"]);
        assert_eq!(meta["license"]["version"], "4.0");
        assert_eq!(meta["tree"]["contents"][1]["id"], "ch2");
    }

    #[test]
    fn test_assertions() {
        let body = json!({"errors": {"cnx_id": ["HTTP Error 404: Not Found"]}});
        assert::has_key(&body, "errors");
        assert::field_error(&body, "cnx_id");
        assert::contains("hello world", "world");
    }
}
