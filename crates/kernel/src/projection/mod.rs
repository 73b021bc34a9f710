//! Read-side JSON projections.
//!
//! A page projects to `{id, meta, ...api_fields}` with the fields in the
//! order its type declares them. Stored fields serialize as stored, child
//! collections are inlined with their computed properties, and computed
//! page properties are resolved against the store at read time.

mod aggregate;
mod children;

use std::sync::Arc;

use folio_sdk::types::ReferenceTarget;
use serde_json::{Map, Value, json};
use thiserror::Error;
use uuid::Uuid;

use crate::catalog::{Catalog, PageKind, PageTypeDefinition};
use crate::content::UrlCollector;
use crate::media::MediaUrls;
use crate::models::{ChildCollection, Document, Image, Page, Snippet, Subject};
use crate::store::{PageStore, StoreError};

#[derive(Debug, Error)]
pub enum ProjectionError {
    /// A reference the property cannot do without is unset or dangling.
    #[error("required reference '{field}' is not set")]
    MissingReference { field: &'static str },

    #[error("page type {0} is not registered")]
    Unregistered(PageKind),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Builds read-API JSON for pages.
#[derive(Clone)]
pub struct Projector {
    catalog: Arc<Catalog>,
    store: Arc<dyn PageStore>,
    media: MediaUrls,
}

impl Projector {
    pub fn new(catalog: Arc<Catalog>, store: Arc<dyn PageStore>, media: MediaUrls) -> Self {
        Self {
            catalog,
            store,
            media,
        }
    }

    pub fn media(&self) -> &MediaUrls {
        &self.media
    }

    /// Full detail projection of `page`.
    pub async fn project(&self, page: &Page) -> Result<Value, ProjectionError> {
        let def = self
            .catalog
            .get(page.kind)
            .ok_or(ProjectionError::Unregistered(page.kind))?;

        let mut out = Map::new();
        out.insert("id".into(), json!(page.id));
        out.insert("meta".into(), meta(page));
        for name in &def.api_fields {
            let value = self.api_field(def, page, name).await?;
            out.insert((*name).to_string(), value);
        }
        Ok(Value::Object(out))
    }

    /// Listing entry: `{id, meta, title}`.
    pub fn summarize(&self, page: &Page) -> Value {
        json!({
            "id": page.id,
            "meta": meta(page),
            "title": page.title,
        })
    }

    async fn api_field(
        &self,
        def: &PageTypeDefinition,
        page: &Page,
        name: &str,
    ) -> Result<Value, ProjectionError> {
        if let Some(value) = base_attribute(page, name) {
            return Ok(value);
        }
        if def.is_computed(name) {
            return self.computed(page, name).await;
        }
        if let Some(collection) = page.child_collection(name) {
            return self.project_collection(collection).await;
        }
        Ok(field_json(page, name))
    }

    async fn computed(&self, page: &Page, name: &str) -> Result<Value, ProjectionError> {
        let value = match (page.kind, name) {
            (PageKind::Book, "subject_name") => json!(
                self.subject(page.reference("subject"))
                    .await?
                    .map(|s| s.name)
            ),
            (PageKind::Book, "cover_url") => json!(self.document_url(page, "cover").await?),
            (PageKind::Book, "high_resolution_pdf_url") => {
                json!(self.document_url(page, "high_resolution_pdf").await?)
            }
            (PageKind::Book, "low_resolution_pdf_url") => {
                json!(self.document_url(page, "low_resolution_pdf").await?)
            }
            (PageKind::Book, "student_handbook_url") => {
                json!(self.student_handbook_url(page).await?)
            }
            (PageKind::Book, "urls") => json!(self.book_urls(page).await?),
            (PageKind::Ally, "ally_color_logo") => json!(self.image_url(page, "logo_color").await?),
            (PageKind::Ally, "ally_bw_logo") => json!(self.image_url(page, "logo_bw").await?),
            (PageKind::Ally, "subjects") => json!(self.ally_subjects(page).await?),
            (PageKind::BookIndex, "books") => self.books().await?,
            (PageKind::Marketing, "marketing_books") => self.marketing_books().await?,
            (PageKind::EcosystemAllies, "allies") => self.allies().await?,
            _ => Value::Null,
        };
        Ok(value)
    }

    /// Public URL of the document a page field refers to, if any.
    async fn document_url(
        &self,
        page: &Page,
        field: &str,
    ) -> Result<Option<String>, ProjectionError> {
        let document = self.document(page.reference(field)).await?;
        Ok(self.media.document(document.as_ref().map(|d| d.url.as_str())))
    }

    async fn image_url(&self, page: &Page, field: &str) -> Result<Option<String>, ProjectionError> {
        let image = self.image(page.reference(field)).await?;
        Ok(self.media.image(image.as_ref()))
    }

    /// Unlike the other document URLs, a book's handbook is expected to be set.
    async fn student_handbook_url(&self, page: &Page) -> Result<String, ProjectionError> {
        let missing = ProjectionError::MissingReference {
            field: "student_handbook",
        };
        let Some(document) = self.document(page.reference("student_handbook")).await? else {
            return Err(missing);
        };
        self.media.document(Some(&document.url)).ok_or(missing)
    }

    /// Absolute URLs found in a book's exposed fields and media links.
    async fn book_urls(&self, page: &Page) -> Result<Vec<String>, ProjectionError> {
        let mut collector = UrlCollector::new();
        if let Some(def) = self.catalog.get(page.kind) {
            for name in &def.api_fields {
                if let Some(value) = page.field(name) {
                    value.accept(name, &mut collector);
                }
            }
        }
        for field in ["cover", "high_resolution_pdf", "low_resolution_pdf"] {
            if let Some(url) = self.document_url(page, field).await? {
                collector.scan(&url);
            }
        }
        if let Ok(url) = self.student_handbook_url(page).await {
            collector.scan(&url);
        }
        Ok(collector.into_urls())
    }

    async fn ally_subjects(&self, page: &Page) -> Result<Vec<String>, ProjectionError> {
        let Some(ChildCollection::AllySubjects(items)) = page.child_collection("ally_subjects") else {
            return Ok(Vec::new());
        };
        let mut names = Vec::with_capacity(items.len());
        for item in items {
            if let Some(subject) = self.subject(item.record.subject).await? {
                names.push(subject.name);
            }
        }
        Ok(names)
    }

    async fn snippet(
        &self,
        target: ReferenceTarget,
        id: Option<Uuid>,
    ) -> Result<Option<Snippet>, ProjectionError> {
        match id {
            Some(id) => Ok(self.store.get_snippet(target, id).await?),
            None => Ok(None),
        }
    }

    async fn document(&self, id: Option<Uuid>) -> Result<Option<Document>, ProjectionError> {
        Ok(match self.snippet(ReferenceTarget::Document, id).await? {
            Some(Snippet::Document(document)) => Some(document),
            _ => None,
        })
    }

    async fn image(&self, id: Option<Uuid>) -> Result<Option<Image>, ProjectionError> {
        Ok(match self.snippet(ReferenceTarget::Image, id).await? {
            Some(Snippet::Image(image)) => Some(image),
            _ => None,
        })
    }

    async fn subject(&self, id: Option<Uuid>) -> Result<Option<Subject>, ProjectionError> {
        Ok(match self.snippet(ReferenceTarget::Subject, id).await? {
            Some(Snippet::Subject(subject)) => Some(subject),
            _ => None,
        })
    }

    async fn page(&self, id: Option<Uuid>) -> Result<Option<Page>, ProjectionError> {
        match id {
            Some(id) => Ok(self.store.get_page(id).await?),
            None => Ok(None),
        }
    }
}

fn meta(page: &Page) -> Value {
    json!({
        "type": page.kind.as_str(),
        "slug": page.slug,
        "parent_id": page.parent_id,
    })
}

fn base_attribute(page: &Page, name: &str) -> Option<Value> {
    let value = match name {
        "title" => json!(page.title),
        "slug" => json!(page.slug),
        "seo_title" => json!(page.seo_title),
        "search_description" => json!(page.search_description),
        "created" => json!(timestamp(page.created)),
        "updated" => json!(timestamp(page.updated)),
        _ => return None,
    };
    Some(value)
}

fn timestamp(secs: i64) -> Option<String> {
    chrono::DateTime::from_timestamp(secs, 0).map(|t| t.to_rfc3339())
}

fn field_json(page: &Page, name: &str) -> Value {
    page.field(name).map(|v| v.to_json()).unwrap_or(Value::Null)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
pub(crate) mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::content::FieldValue;
    use crate::media::SiteConfig;
    use crate::models::page::child_path;
    use crate::store::MemoryStore;

    pub(crate) fn projector(store: Arc<MemoryStore>) -> Projector {
        Projector::new(
            Arc::new(Catalog::standard()),
            store,
            MediaUrls::new(SiteConfig::new("localhost", 80), "/media/"),
        )
    }

    pub(crate) fn page(kind: PageKind, title: &str, position: usize) -> Page {
        Page {
            id: Uuid::now_v7(),
            kind,
            parent_id: None,
            path: child_path("00010001", position),
            title: title.to_string(),
            slug: crate::services::page_service::slugify(title),
            seo_title: String::new(),
            search_description: String::new(),
            created: 1_700_000_000,
            updated: 1_700_000_000,
            fields: BTreeMap::new(),
            children: BTreeMap::new(),
        }
    }

    pub(crate) fn reference(target: ReferenceTarget, id: Uuid) -> FieldValue {
        FieldValue::Reference { target, id }
    }

    pub(crate) async fn document(store: &MemoryStore, url: &str) -> Uuid {
        let id = Uuid::now_v7();
        store
            .save_snippet(&Snippet::Document(Document {
                id,
                title: url.to_string(),
                url: url.to_string(),
            }))
            .await
            .unwrap();
        id
    }

    #[tokio::test]
    async fn projection_follows_declared_field_order() {
        let store = Arc::new(MemoryStore::new());
        let projector = projector(store.clone());
        let mut book = page(PageKind::Book, "College Physics", 1);
        book.fields
            .insert("cnx_id".into(), FieldValue::Text("031da8d3".into()));
        let cover = document(&store, "/documents/12/physics.pdf").await;
        book.fields
            .insert("cover".into(), reference(ReferenceTarget::Document, cover));
        let handbook = document(&store, "/documents/13/handbook.pdf").await;
        book.fields.insert(
            "student_handbook".into(),
            reference(ReferenceTarget::Document, handbook),
        );

        let json = projector.project(&book).await.unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(&keys[..6], ["id", "meta", "created", "updated", "slug", "title"]);
        assert_eq!(json["meta"]["type"], "books.Book");
        assert_eq!(json["cnx_id"], "031da8d3");
        assert_eq!(json["cover_url"], "/media/documents/physics.pdf");
        assert_eq!(json["high_resolution_pdf_url"], Value::Null);
        assert_eq!(json["student_handbook_url"], "/media/documents/handbook.pdf");
        assert_eq!(json["created"], "2023-11-14T22:13:20+00:00");
        assert!(json.get("urls").is_none());
    }

    #[tokio::test]
    async fn missing_student_handbook_is_an_error() {
        let store = Arc::new(MemoryStore::new());
        let projector = projector(store);
        let book = page(PageKind::Book, "Biology", 1);
        let err = projector.project(&book).await.unwrap_err();
        assert!(matches!(
            err,
            ProjectionError::MissingReference {
                field: "student_handbook"
            }
        ));
    }

    #[tokio::test]
    async fn book_urls_come_from_text_fields_and_media() {
        let store = Arc::new(MemoryStore::new());
        let projector = projector(store.clone());
        let mut book = page(PageKind::Book, "Sociology", 1);
        book.fields.insert(
            "amazon_link".into(),
            FieldValue::Url("https://amazon.com/dp/123".into()),
        );
        book.fields.insert(
            "description".into(),
            FieldValue::RichText(r#"<p>See <a href="https://openstax.org/details">it</a></p>"#.into()),
        );
        book.fields.insert("is_ap".into(), FieldValue::Bool(true));

        let urls = projector.book_urls(&book).await.unwrap();
        assert!(urls.contains(&"https://amazon.com/dp/123".to_string()));
        assert!(urls.contains(&"https://openstax.org/details".to_string()));
        assert!(!urls.iter().any(|u| u.contains("handbook")));
    }

    #[tokio::test]
    async fn image_urls_switch_on_site_port() {
        let store = Arc::new(MemoryStore::new());
        let image = Image {
            id: Uuid::now_v7(),
            title: "Logo".into(),
            file: "original_images/logo.png".into(),
        };
        store.save_snippet(&Snippet::Image(image.clone())).await.unwrap();
        let mut ally = page(PageKind::Ally, "Ally", 1);
        ally.fields.insert(
            "logo_color".into(),
            reference(ReferenceTarget::Image, image.id),
        );

        let default_port = projector(store.clone());
        let json = default_port.project(&ally).await.unwrap();
        assert_eq!(json["ally_color_logo"], "/media/original_images/logo.png");
        assert_eq!(json["ally_bw_logo"], Value::Null);

        let dev = Projector::new(
            Arc::new(Catalog::standard()),
            store,
            MediaUrls::new(SiteConfig::new("example.org", 8080), "/media/"),
        );
        let json = dev.project(&ally).await.unwrap();
        assert_eq!(
            json["ally_color_logo"],
            format!("http://example.org:8080/api/v0/images/{}", image.id)
        );
    }
}
