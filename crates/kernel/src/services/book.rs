//! Book save and validation hooks.

use std::collections::BTreeMap;

use folio_sdk::types::Orderable;

use crate::archive::ArchiveMetadata;
use crate::content::{BlockValue, FieldValue, StreamValue};
use crate::models::Page;
use crate::models::children::{Author, ChildCollection};

/// Field holding the derived author stream.
pub const AUTHORS_FIELD: &str = "authors";

/// Child collection the author stream is derived from.
pub const CONTRIBUTING_AUTHORS: &str = "book_contributing_authors";

/// Copy license and table of contents from archive metadata. No other field
/// is touched.
pub fn apply_archive_metadata(page: &mut Page, metadata: ArchiveMetadata) {
    let ArchiveMetadata { license, tree } = metadata;
    page.fields
        .insert("license_name".into(), FieldValue::Text(license.name));
    page.fields
        .insert("license_version".into(), FieldValue::Text(license.version));
    page.fields
        .insert("license_url".into(), FieldValue::Text(license.url));
    page.fields
        .insert("table_of_contents".into(), FieldValue::Json(tree));
}

/// Render contributing authors as `author` stream blocks.
pub fn authors_stream(authors: &[Orderable<Author>]) -> StreamValue {
    let mut stream = StreamValue::new();
    for author in authors {
        let author = &author.record;
        let value = BTreeMap::from([
            ("name".to_string(), BlockValue::Text(author.name.clone())),
            (
                "university".to_string(),
                BlockValue::Text(author.university.clone().unwrap_or_default()),
            ),
            (
                "country".to_string(),
                BlockValue::Text(author.country.clone().unwrap_or_default()),
            ),
            (
                "senior_author".to_string(),
                BlockValue::Bool(author.senior_author),
            ),
            (
                "display_at_top".to_string(),
                BlockValue::Bool(author.display_at_top),
            ),
        ]);
        stream.push("author", BlockValue::Struct(value));
    }
    stream
}

/// Recompute the `authors` stream from the contributing authors.
///
/// The field is replaced only when its serialized form changes; returns
/// whether it did.
pub fn sync_authors(page: &mut Page) -> bool {
    let derived = page
        .child_collection(CONTRIBUTING_AUTHORS)
        .and_then(ChildCollection::as_authors)
        .map(authors_stream)
        .unwrap_or_default();
    let derived = FieldValue::Stream(derived);

    let unchanged = page
        .field(AUTHORS_FIELD)
        .is_some_and(|current| current.to_json() == derived.to_json());
    if unchanged {
        return false;
    }
    page.fields.insert(AUTHORS_FIELD.to_string(), derived);
    true
}

/// Point `webview_link` at the book's archive id. Returns whether it changed.
pub fn sync_webview_link(page: &mut Page, webview_base: &str) -> bool {
    let Some(cnx_id) = page.text("cnx_id") else {
        return false;
    };
    let link = format!("{webview_base}{cnx_id}");
    if page.text("webview_link") == Some(link.as_str()) {
        return false;
    }
    page.fields
        .insert("webview_link".to_string(), FieldValue::Url(link));
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, PageKind};
    use crate::content::schemas::stream_schema;
    use crate::models::StoredPage;
    use serde_json::json;
    use uuid::Uuid;

    fn book(fields: serde_json::Value, children: serde_json::Value) -> Page {
        let stored = StoredPage {
            id: Uuid::now_v7(),
            page_type: PageKind::Book.as_str().to_string(),
            parent_id: None,
            path: "000100010001".into(),
            title: "Chemistry".into(),
            slug: "chemistry".into(),
            seo_title: String::new(),
            search_description: String::new(),
            created: 0,
            updated: 0,
            fields,
            children,
        };
        Page::from_stored(stored, &Catalog::standard()).unwrap()
    }

    #[test]
    fn authors_follow_children_and_are_idempotent() {
        let mut page = book(
            json!({}),
            json!({CONTRIBUTING_AUTHORS: [
                {"sort_order": 1, "name": "Second", "university": "Rice"},
                {"sort_order": 0, "name": "First", "senior_author": true},
            ]}),
        );
        assert!(sync_authors(&mut page));
        let json = page.field(AUTHORS_FIELD).unwrap().to_json();
        assert_eq!(json[0]["type"], "author");
        assert_eq!(json[0]["value"]["name"], "First");
        assert_eq!(json[0]["value"]["senior_author"], true);
        assert_eq!(json[1]["value"]["university"], "Rice");

        assert!(!sync_authors(&mut page));
    }

    #[test]
    fn derived_authors_decode_against_author_schema() {
        let mut page = book(json!({}), json!({CONTRIBUTING_AUTHORS: [{"name": "Ada"}]}));
        sync_authors(&mut page);
        let json = page.field(AUTHORS_FIELD).unwrap().to_json();
        let schema = stream_schema("authors").unwrap();
        let decoded = schema.decode(&json).unwrap();
        assert_eq!(FieldValue::Stream(decoded).to_json(), json);
    }

    #[test]
    fn webview_link_requires_cnx_id() {
        let mut page = book(json!({}), json!({}));
        assert!(!sync_webview_link(&mut page, "https://cnx.org/contents/"));

        let mut page = book(json!({"cnx_id": "185cbf87"}), json!({}));
        assert!(sync_webview_link(&mut page, "https://cnx.org/contents/"));
        assert_eq!(
            page.text("webview_link"),
            Some("https://cnx.org/contents/185cbf87")
        );
        assert!(!sync_webview_link(&mut page, "https://cnx.org/contents/"));
    }
}
