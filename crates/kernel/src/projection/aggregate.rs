//! Properties that list every page of another type.
//!
//! Each entry is built independently; an entry that fails is logged and left
//! out so one bad page cannot break the listing.

use serde_json::{Map, Value, json};
use tracing::warn;

use super::{Projector, ProjectionError, field_json};
use crate::catalog::PageKind;
use crate::models::Page;

impl Projector {
    /// `BookIndex.books`: every book in tree order.
    pub(super) async fn books(&self) -> Result<Value, ProjectionError> {
        let mut entries = Vec::new();
        for book in self.store.list_pages(Some(PageKind::Book), None).await? {
            match self.book_summary(&book).await {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!(page_id = %book.id, error = %e, "skipping book in listing"),
            }
        }
        Ok(Value::Array(entries))
    }

    /// `Marketing.marketing_books`: books flagged for tutor marketing.
    pub(super) async fn marketing_books(&self) -> Result<Value, ProjectionError> {
        let mut entries = Vec::new();
        for book in self.store.list_pages(Some(PageKind::Book), None).await? {
            if !book.flag("tutor_marketing_book") {
                continue;
            }
            match self.document_url(&book, "cover").await {
                Ok(cover_url) => entries.push(json!({
                    "id": book.id,
                    "slug": listing_slug(&book),
                    "title": book.title,
                    "cover_url": cover_url,
                })),
                Err(e) => warn!(page_id = %book.id, error = %e, "skipping marketing book"),
            }
        }
        Ok(Value::Array(entries))
    }

    /// `EcosystemAllies.allies`: allies keyed by slug.
    pub(super) async fn allies(&self) -> Result<Value, ProjectionError> {
        let mut entries = Map::new();
        for ally in self.store.list_pages(Some(PageKind::Ally), None).await? {
            match self.ally_summary(&ally).await {
                Ok(entry) => {
                    entries.insert(ally.slug.clone(), entry);
                }
                Err(e) => warn!(page_id = %ally.id, error = %e, "skipping ally in listing"),
            }
        }
        Ok(Value::Object(entries))
    }

    async fn book_summary(&self, book: &Page) -> Result<Value, ProjectionError> {
        let subject = self
            .subject(book.reference("subject"))
            .await?
            .ok_or(ProjectionError::MissingReference { field: "subject" })?;

        let mut entry = json!({
            "id": book.id,
            "slug": listing_slug(book),
            "title": book.title,
            "subject": subject.name,
            "is_ap": book.flag("is_ap"),
            "coming_soon": book.flag("coming_soon"),
            "cover_url": self.document_url(book, "cover").await?,
            "high_resolution_pdf_url": self.document_url(book, "high_resolution_pdf").await?,
            "low_resolution_pdf_url": self.document_url(book, "low_resolution_pdf").await?,
        });
        for name in [
            "ibook_link",
            "ibook_link_volume_2",
            "webview_link",
            "concept_coach_link",
            "bookshare_link",
            "amazon_coming_soon",
            "amazon_link",
            "amazon_price",
            "amazon_blurb",
            "bookstore_coming_soon",
            "bookstore_link",
            "bookstore_blurb",
            "comp_copy_available",
            "salesforce_abbreviation",
            "salesforce_name",
        ] {
            entry[name] = field_json(book, name);
        }
        entry["urls"] = json!(self.book_urls(book).await?);
        Ok(entry)
    }

    async fn ally_summary(&self, ally: &Page) -> Result<Value, ProjectionError> {
        Ok(json!({
            "title": ally.title,
            "subjects": self.ally_subjects(ally).await?,
            "short_description": field_json(ally, "short_description"),
            "long_description": field_json(ally, "long_description"),
            "heading": field_json(ally, "heading"),
            "is_ap": ally.flag("is_ap"),
            "do_not_display": ally.flag("do_not_display"),
            "ally_bw_logo": self.image_url(ally, "logo_bw").await?,
        }))
    }
}

/// Books are addressed under `books/` in listings.
fn listing_slug(book: &Page) -> String {
    format!("books/{}", book.slug)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::sync::Arc;

    use folio_sdk::types::ReferenceTarget;
    use uuid::Uuid;

    use super::*;
    use crate::content::FieldValue;
    use crate::models::{ChildKind, Snippet, Subject};
    use crate::projection::tests::{document, page, projector, reference};
    use crate::store::{MemoryStore, PageStore};

    async fn subject(store: &MemoryStore, name: &str) -> Uuid {
        let id = Uuid::now_v7();
        store
            .save_snippet(&Snippet::Subject(Subject {
                id,
                name: name.to_string(),
            }))
            .await
            .unwrap();
        id
    }

    #[tokio::test]
    async fn failing_book_is_skipped() {
        let store = Arc::new(MemoryStore::new());
        let math = subject(&store, "Math").await;
        for n in 1..=5 {
            let mut book = page(PageKind::Book, &format!("Book {n}"), n);
            if n != 3 {
                book.fields
                    .insert("subject".into(), reference(ReferenceTarget::Subject, math));
            }
            store.save_page(&book).await.unwrap();
        }

        let books = projector(store).books().await.unwrap();
        let titles: Vec<&str> = books
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, ["Book 1", "Book 2", "Book 4", "Book 5"]);
    }

    #[tokio::test]
    async fn book_entries_carry_listing_fields() {
        let store = Arc::new(MemoryStore::new());
        let physics = subject(&store, "Science").await;
        let cover = document(&store, "/documents/3/cover.png").await;
        let mut book = page(PageKind::Book, "College Physics", 1);
        book.fields
            .insert("subject".into(), reference(ReferenceTarget::Subject, physics));
        book.fields
            .insert("cover".into(), reference(ReferenceTarget::Document, cover));
        book.fields
            .insert("amazon_price".into(), FieldValue::Decimal("38.50".into()));
        book.fields.insert(
            "webview_link".into(),
            FieldValue::Text("https://cnx.org/contents/abc".into()),
        );
        store.save_page(&book).await.unwrap();

        let books = projector(store).books().await.unwrap();
        let entry = &books[0];
        assert_eq!(entry["slug"], "books/college-physics");
        assert_eq!(entry["subject"], "Science");
        assert_eq!(entry["cover_url"], "/media/documents/cover.png");
        assert_eq!(entry["amazon_price"], "38.50");
        assert_eq!(entry["bookshare_link"], Value::Null);
        assert_eq!(entry["urls"], json!(["https://cnx.org/contents/abc"]));
    }

    #[tokio::test]
    async fn marketing_books_are_filtered_by_flag() {
        let store = Arc::new(MemoryStore::new());
        let mut flagged = page(PageKind::Book, "Biology", 1);
        flagged
            .fields
            .insert("tutor_marketing_book".into(), FieldValue::Bool(true));
        store.save_page(&flagged).await.unwrap();
        store
            .save_page(&page(PageKind::Book, "Chemistry", 2))
            .await
            .unwrap();

        let books = projector(store).marketing_books().await.unwrap();
        assert_eq!(
            books,
            json!([{
                "id": flagged.id,
                "slug": "books/biology",
                "title": "Biology",
                "cover_url": null,
            }])
        );
    }

    #[tokio::test]
    async fn allies_are_keyed_by_slug() {
        let store = Arc::new(MemoryStore::new());
        let math = subject(&store, "Math").await;
        let mut ally = page(PageKind::Ally, "Knewton", 1);
        ally.fields.insert("is_ap".into(), FieldValue::Bool(true));
        ally.children.insert(
            "ally_subjects".into(),
            ChildKind::AllySubjects
                .decode(&json!([{"subject": math}, {"subject": Uuid::now_v7()}]))
                .unwrap(),
        );
        store.save_page(&ally).await.unwrap();

        let allies = projector(store).allies().await.unwrap();
        assert_eq!(allies["knewton"]["title"], "Knewton");
        assert_eq!(allies["knewton"]["subjects"], json!(["Math"]));
        assert_eq!(allies["knewton"]["is_ap"], true);
        assert_eq!(allies["knewton"]["ally_bw_logo"], Value::Null);
    }
}
