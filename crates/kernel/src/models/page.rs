//! Page records.
//!
//! A [`Page`] is a node in the content tree. Its typed fields and child
//! collections are decoded against the page type's catalog entry; the
//! [`StoredPage`] form carries them as JSON for persistence.

use std::collections::BTreeMap;

use folio_sdk::types::ReferenceTarget;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::catalog::{Catalog, PageKind, UnknownPageKind};
use crate::content::fields::FieldValue;
use crate::models::children::ChildCollection;

/// Width of one tree path segment.
pub const PATH_STEP: usize = 4;

/// Largest child position one path segment can hold.
pub const MAX_CHILD_POSITION: usize = 10usize.pow(PATH_STEP as u32) - 1;

/// A stored page could not be decoded against the catalog.
#[derive(Debug, Error)]
pub enum PageDecodeError {
    #[error(transparent)]
    UnknownKind(#[from] UnknownPageKind),

    #[error("{0} is not registered in the catalog")]
    Unregistered(PageKind),

    #[error("field '{field}': {message}")]
    Field { field: String, message: String },

    #[error("child collection '{field}': {message}")]
    Children { field: String, message: String },
}

/// A page in the content tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Unique identifier (UUIDv7).
    pub id: Uuid,
    pub kind: PageKind,
    /// Parent page; `None` at the tree root.
    pub parent_id: Option<Uuid>,
    /// Materialized tree position, one fixed-width segment per level.
    pub path: String,
    pub title: String,
    pub slug: String,
    pub seo_title: String,
    pub search_description: String,
    /// Unix timestamp when created.
    pub created: i64,
    /// Unix timestamp when last saved.
    pub updated: i64,
    pub fields: BTreeMap<String, FieldValue>,
    pub children: BTreeMap<String, ChildCollection>,
}

/// Persistence form of a [`Page`].
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StoredPage {
    pub id: Uuid,
    pub page_type: String,
    pub parent_id: Option<Uuid>,
    pub path: String,
    pub title: String,
    pub slug: String,
    pub seo_title: String,
    pub search_description: String,
    pub created: i64,
    pub updated: i64,
    /// Field values keyed by name (JSONB).
    pub fields: Value,
    /// Child collections keyed by relation name (JSONB).
    pub children: Value,
}

/// Path of the `position`-th child under `parent_path`.
pub fn child_path(parent_path: &str, position: usize) -> String {
    format!("{parent_path}{position:0width$}", width = PATH_STEP)
}

/// Path for a new child placed after `siblings`, or `None` once the last
/// segment value is taken.
pub fn next_child_path<'a>(
    parent_path: &str,
    siblings: impl IntoIterator<Item = &'a str>,
) -> Option<String> {
    let last = siblings
        .into_iter()
        .filter_map(|path| {
            let start = path.len().checked_sub(PATH_STEP)?;
            path.get(start..)?.parse::<usize>().ok()
        })
        .max()
        .unwrap_or(0);
    (last < MAX_CHILD_POSITION).then(|| child_path(parent_path, last + 1))
}

impl Page {
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Non-blank text value of a field.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.field(name)
            .and_then(FieldValue::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    /// Boolean field value; absent or null reads as false.
    pub fn flag(&self, name: &str) -> bool {
        self.field(name)
            .and_then(FieldValue::as_bool)
            .unwrap_or(false)
    }

    pub fn reference(&self, name: &str) -> Option<Uuid> {
        self.field(name).and_then(FieldValue::as_reference)
    }

    pub fn child_collection(&self, name: &str) -> Option<&ChildCollection> {
        self.children.get(name)
    }

    /// Tree depth; the root is 1.
    pub fn depth(&self) -> usize {
        self.path.len() / PATH_STEP
    }

    /// Null every field, child record, and block reference to `id`.
    /// Returns whether anything changed.
    pub fn clear_reference(&mut self, target: ReferenceTarget, id: Uuid) -> bool {
        let mut changed = false;
        for value in self.fields.values_mut() {
            match value {
                FieldValue::Reference {
                    target: field_target,
                    id: field_id,
                } if *field_target == target && *field_id == id => {
                    *value = FieldValue::Null;
                    changed = true;
                }
                FieldValue::Stream(stream) => changed |= stream.clear_reference(target, id),
                _ => {}
            }
        }
        for collection in self.children.values_mut() {
            changed |= collection.clear_reference(target, id);
        }
        changed
    }

    /// Every set reference in fields, block streams, and child records,
    /// keyed by the path validation errors use.
    pub fn references(&self) -> Vec<(String, ReferenceTarget, Uuid)> {
        let mut out = Vec::new();
        for (name, value) in &self.fields {
            match value {
                FieldValue::Reference { target, id } => out.push((name.clone(), *target, *id)),
                FieldValue::Stream(stream) => stream.collect_references(name, &mut out),
                _ => {}
            }
        }
        for (name, collection) in &self.children {
            collection.collect_references(name, &mut out);
        }
        out
    }

    pub fn to_stored(&self) -> StoredPage {
        let fields: Map<String, Value> = self
            .fields
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect();
        let children: Map<String, Value> = self
            .children
            .iter()
            .map(|(name, collection)| (name.clone(), collection.to_json()))
            .collect();
        StoredPage {
            id: self.id,
            page_type: self.kind.as_str().to_string(),
            parent_id: self.parent_id,
            path: self.path.clone(),
            title: self.title.clone(),
            slug: self.slug.clone(),
            seo_title: self.seo_title.clone(),
            search_description: self.search_description.clone(),
            created: self.created,
            updated: self.updated,
            fields: Value::Object(fields),
            children: Value::Object(children),
        }
    }

    /// Decode a stored page. Fields the page type no longer declares are dropped.
    pub fn from_stored(stored: StoredPage, catalog: &Catalog) -> Result<Page, PageDecodeError> {
        let kind: PageKind = stored.page_type.parse()?;
        let def = catalog
            .get(kind)
            .ok_or(PageDecodeError::Unregistered(kind))?;

        let mut fields = BTreeMap::new();
        for field in &def.fields {
            let value = FieldValue::decode(field, stored.fields.get(&field.field_name)).map_err(
                |message| PageDecodeError::Field {
                    field: field.field_name.clone(),
                    message,
                },
            )?;
            fields.insert(field.field_name.clone(), value);
        }

        let mut children = BTreeMap::new();
        for (name, child_kind) in &def.children {
            let collection = match stored.children.get(*name) {
                Some(raw) => child_kind
                    .decode(raw)
                    .map_err(|message| PageDecodeError::Children {
                        field: (*name).to_string(),
                        message,
                    })?,
                None => child_kind.empty(),
            };
            children.insert((*name).to_string(), collection);
        }

        Ok(Page {
            id: stored.id,
            kind,
            parent_id: stored.parent_id,
            path: stored.path,
            title: stored.title,
            slug: stored.slug,
            seo_title: stored.seo_title,
            search_description: stored.search_description,
            created: stored.created,
            updated: stored.updated,
            fields,
            children,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stored_book(fields: Value, children: Value) -> StoredPage {
        StoredPage {
            id: Uuid::now_v7(),
            page_type: "books.Book".to_string(),
            parent_id: None,
            path: "000100010001".to_string(),
            title: "College Physics".to_string(),
            slug: "college-physics".to_string(),
            seo_title: String::new(),
            search_description: String::new(),
            created: 1,
            updated: 2,
            fields,
            children,
        }
    }

    #[test]
    fn next_child_path_follows_the_highest_sibling() {
        assert_eq!(next_child_path("0001", []), Some("00010001".to_string()));
        assert_eq!(
            next_child_path("0001", ["00010003", "00010001"]),
            Some("00010004".to_string())
        );
    }

    #[test]
    fn next_child_path_refuses_a_fifth_digit() {
        assert_eq!(next_child_path("", ["9998"]), Some("9999".to_string()));
        assert_eq!(next_child_path("", ["0001", "9999"]), None);
    }

    #[test]
    fn child_path_appends_fixed_width_segment() {
        assert_eq!(child_path("", 1), "0001");
        assert_eq!(child_path("0001", 12), "00010012");
    }

    #[test]
    fn stored_round_trip() {
        let catalog = Catalog::standard();
        let cover = Uuid::now_v7();
        let stored = stored_book(
            json!({"cnx_id": "abc", "cover": cover.to_string(), "is_ap": true}),
            json!({"book_contributing_authors": [{"sort_order": 0, "name": "Ada"}]}),
        );
        let page = Page::from_stored(stored, &catalog).unwrap();
        assert_eq!(page.kind, PageKind::Book);
        assert_eq!(page.depth(), 3);
        assert_eq!(page.text("cnx_id"), Some("abc"));
        assert_eq!(page.reference("cover"), Some(cover));
        assert!(page.flag("is_ap"));
        assert!(page.flag("comp_copy_available"));
        assert_eq!(page.text("amazon_price"), Some("0.00"));
        assert_eq!(page.child_collection("book_quotes").unwrap().len(), 0);

        let again = Page::from_stored(page.to_stored(), &catalog).unwrap();
        assert_eq!(again, page);
    }

    #[test]
    fn unknown_type_is_rejected() {
        let mut stored = stored_book(json!({}), json!({}));
        stored.page_type = "news.NewsIndex".to_string();
        assert!(matches!(
            Page::from_stored(stored, &Catalog::standard()),
            Err(PageDecodeError::UnknownKind(_))
        ));
    }

    #[test]
    fn clear_reference_nulls_fields_and_children() {
        let catalog = Catalog::standard();
        let doc = Uuid::now_v7();
        let stored = stored_book(
            json!({"cover": doc.to_string(), "high_resolution_pdf": doc.to_string()}),
            json!({"book_student_resources": [{"link_document": doc.to_string(), "link_text": "Go"}]}),
        );
        let mut page = Page::from_stored(stored, &catalog).unwrap();
        assert!(!page.clear_reference(ReferenceTarget::Image, doc));
        assert!(page.clear_reference(ReferenceTarget::Document, doc));
        assert_eq!(page.reference("cover"), None);
        assert_eq!(page.reference("high_resolution_pdf"), None);
        let records = page
            .child_collection("book_student_resources")
            .unwrap()
            .records_json();
        assert_eq!(records[0]["link_document"], Value::Null);
    }

    #[test]
    fn references_list_fields_and_children() {
        let catalog = Catalog::standard();
        let cover = Uuid::now_v7();
        let link = Uuid::now_v7();
        let stored = stored_book(
            json!({"cover": cover.to_string()}),
            json!({"book_student_resources": [{"link_document": link.to_string(), "link_text": "Go"}]}),
        );
        let page = Page::from_stored(stored, &catalog).unwrap();
        let refs = page.references();
        assert!(refs.contains(&("cover".to_string(), ReferenceTarget::Document, cover)));
        assert!(refs.contains(&(
            "book_student_resources[0].link_document".to_string(),
            ReferenceTarget::Document,
            link
        )));
        assert_eq!(refs.len(), 2);
    }
}
