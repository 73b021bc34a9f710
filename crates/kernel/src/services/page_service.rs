//! Page write path: placement, validation, archive import, and save hooks.
//!
//! Every write validates a working copy first; nothing reaches the store
//! while [`ValidationErrors`] are outstanding. Book pages import archive
//! metadata during validation and derive `authors` and `webview_link` on save.

use std::collections::VecDeque;
use std::sync::{Arc, LazyLock};

use folio_sdk::types::{FieldType, ReferenceTarget};
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::archive::ArchiveClient;
use crate::catalog::{Catalog, PageKind, PageTypeDefinition, PlacementError};
use crate::content::{FieldValue, sanitize_html, stream_schema};
use crate::error::ValidationErrors;
use crate::models::page::{MAX_CHILD_POSITION, next_child_path};
use crate::models::{Page, Snippet};
use crate::services::book;
use crate::store::{PageStore, StoreError};

const REQUIRED: &str = "This field is required.";
const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";

#[allow(clippy::expect_used)]
static SLUG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("valid regex literal"));

#[derive(Debug, Error)]
pub enum PageServiceError {
    #[error("{0}")]
    Validation(ValidationErrors),

    #[error(transparent)]
    Placement(#[from] PlacementError),

    #[error("page not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ValidationErrors> for PageServiceError {
    fn from(errors: ValidationErrors) -> Self {
        PageServiceError::Validation(errors)
    }
}

/// Editable page content. Absent members keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub seo_title: Option<String>,
    #[serde(default)]
    pub search_description: Option<String>,
    #[serde(default)]
    pub fields: Map<String, Value>,
    #[serde(default)]
    pub children: Map<String, Value>,
}

/// Request to create a page under `parent_id`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePage {
    #[serde(rename = "type")]
    pub kind: PageKind,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    #[serde(flatten)]
    pub input: PageInput,
}

/// Outcome of a successful save.
#[derive(Debug, Clone)]
pub struct SaveReport {
    pub page: Page,
    /// Derived fields the save hooks rewrote.
    pub dirty_fields: Vec<String>,
}

/// Creates, updates, and deletes pages and snippets.
#[derive(Clone)]
pub struct PageService {
    inner: Arc<PageServiceInner>,
}

struct PageServiceInner {
    catalog: Arc<Catalog>,
    store: Arc<dyn PageStore>,
    archive: Arc<dyn ArchiveClient>,
    webview_base: String,
}

impl PageService {
    pub fn new(
        catalog: Arc<Catalog>,
        store: Arc<dyn PageStore>,
        archive: Arc<dyn ArchiveClient>,
        webview_base: impl Into<String>,
    ) -> Self {
        Self {
            inner: Arc::new(PageServiceInner {
                catalog,
                store,
                archive,
                webview_base: webview_base.into(),
            }),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    pub fn store(&self) -> &Arc<dyn PageStore> {
        &self.inner.store
    }

    pub async fn get(&self, id: Uuid) -> Result<Page, PageServiceError> {
        self.inner
            .store
            .get_page(id)
            .await?
            .ok_or(PageServiceError::NotFound)
    }

    /// Create a page after checking placement and validating its content.
    pub async fn create(&self, request: CreatePage) -> Result<SaveReport, PageServiceError> {
        let store = &self.inner.store;

        let parent = match request.parent_id {
            Some(parent_id) => match store.get_page(parent_id).await? {
                Some(parent) => Some(parent),
                None => {
                    let mut errors = ValidationErrors::new();
                    errors.add("parent_id", "Parent page does not exist.");
                    return Err(errors.into());
                }
            },
            None => None,
        };

        self.inner
            .catalog
            .check_placement(request.kind, parent.as_ref().map(|p| p.kind))?;

        let def = self.definition(request.kind)?;
        let now = chrono::Utc::now().timestamp();
        let mut page = Page {
            id: Uuid::now_v7(),
            kind: request.kind,
            parent_id: parent.as_ref().map(|p| p.id),
            path: self.next_child_path(parent.as_ref()).await?,
            title: String::new(),
            slug: String::new(),
            seo_title: String::new(),
            search_description: String::new(),
            created: now,
            updated: now,
            fields: Default::default(),
            children: Default::default(),
        };

        let mut errors = ValidationErrors::new();
        apply_input(def, &mut page, request.input, &mut errors);
        self.validate(def, &mut page, &mut errors).await?;
        errors.into_result()?;

        let report = self.save(page).await?;
        info!(page_id = %report.page.id, kind = %report.page.kind, "page created");
        Ok(report)
    }

    /// Apply `input` to an existing page, validate, and save.
    ///
    /// On failure the stored page is left as it was.
    pub async fn update(&self, id: Uuid, input: PageInput) -> Result<SaveReport, PageServiceError> {
        let mut page = self.get(id).await?;
        let def = self.definition(page.kind)?;

        let mut errors = ValidationErrors::new();
        apply_input(def, &mut page, input, &mut errors);
        self.validate(def, &mut page, &mut errors).await?;
        errors.into_result()?;

        page.updated = chrono::Utc::now().timestamp();
        let report = self.save(page).await?;
        info!(page_id = %report.page.id, "page updated");
        Ok(report)
    }

    /// Delete a page and every page below it. References to the deleted pages
    /// are nulled. Returns the deleted ids.
    pub async fn delete(&self, id: Uuid) -> Result<Vec<Uuid>, PageServiceError> {
        let store = &self.inner.store;
        let root = self.get(id).await?;

        let mut doomed = Vec::new();
        let mut queue = VecDeque::from([root.id]);
        while let Some(next) = queue.pop_front() {
            doomed.push(next);
            for child in store.children_of(Some(next)).await? {
                queue.push_back(child.id);
            }
        }

        store.delete_pages(&doomed).await?;
        for deleted in &doomed {
            self.clear_references(ReferenceTarget::Page, *deleted).await?;
        }

        info!(page_id = %id, deleted = doomed.len(), "page deleted");
        Ok(doomed)
    }

    pub async fn get_snippet(
        &self,
        target: ReferenceTarget,
        id: Uuid,
    ) -> Result<Snippet, PageServiceError> {
        self.inner
            .store
            .get_snippet(target, id)
            .await?
            .ok_or(PageServiceError::NotFound)
    }

    pub async fn put_snippet(&self, snippet: &Snippet) -> Result<(), PageServiceError> {
        self.inner.store.save_snippet(snippet).await?;
        debug!(snippet_id = %snippet.id(), kind = snippet.target().as_str(), "snippet saved");
        Ok(())
    }

    /// Remove a snippet and null every reference to it. Returns how many pages
    /// were updated.
    pub async fn delete_snippet(
        &self,
        target: ReferenceTarget,
        id: Uuid,
    ) -> Result<usize, PageServiceError> {
        if !self.inner.store.delete_snippet(target, id).await? {
            return Err(PageServiceError::NotFound);
        }
        let updated = self.clear_references(target, id).await?;
        info!(snippet_id = %id, kind = target.as_str(), pages = updated, "snippet deleted");
        Ok(updated)
    }

    fn definition(&self, kind: PageKind) -> Result<&PageTypeDefinition, PageServiceError> {
        self.inner
            .catalog
            .get(kind)
            .ok_or(PageServiceError::Placement(PlacementError::Unregistered(kind)))
    }

    async fn next_child_path(&self, parent: Option<&Page>) -> Result<String, PageServiceError> {
        let siblings = self
            .inner
            .store
            .children_of(parent.map(|p| p.id))
            .await?;
        let base = parent.map(|p| p.path.as_str()).unwrap_or("");
        next_child_path(base, siblings.iter().map(|s| s.path.as_str())).ok_or_else(|| {
            let mut errors = ValidationErrors::new();
            errors.add(
                "parent_id",
                format!("A page can have at most {MAX_CHILD_POSITION} children."),
            );
            errors.into()
        })
    }

    /// Check required fields, block trees, child records, and the slug; for
    /// books, import archive metadata.
    async fn validate(
        &self,
        def: &PageTypeDefinition,
        page: &mut Page,
        errors: &mut ValidationErrors,
    ) -> Result<(), PageServiceError> {
        if page.title.trim().is_empty() {
            errors.add("title", REQUIRED);
        }
        if page.slug.is_empty() {
            page.slug = slugify(&page.title);
        }
        if page.slug.is_empty() {
            errors.add("slug", REQUIRED);
        } else if !SLUG_PATTERN.is_match(&page.slug) {
            errors.add(
                "slug",
                "Enter a valid slug consisting of letters, numbers, underscores or hyphens.",
            );
        } else {
            let siblings = self.inner.store.children_of(page.parent_id).await?;
            if siblings
                .iter()
                .any(|s| s.id != page.id && s.slug == page.slug)
            {
                errors.add(
                    "slug",
                    format!("The slug '{}' is already in use at this level.", page.slug),
                );
            }
        }

        for field in &def.fields {
            let Some(value) = page.fields.get(&field.field_name) else {
                continue;
            };
            if field.required && value.is_blank() {
                errors.add(field.field_name.as_str(), REQUIRED);
            }
            if let (FieldType::Stream(schema), FieldValue::Stream(stream)) =
                (&field.field_type, value)
                && let Some(schema) = stream_schema(schema)
            {
                let mut issues = Vec::new();
                schema.validate(stream, &field.field_name, &mut issues);
                for issue in issues {
                    if issue.path == field.field_name && errors.contains(&issue.path) {
                        continue;
                    }
                    errors.add(issue.path, issue.message);
                }
            }
        }

        let mut child_issues = Vec::new();
        for (name, collection) in &page.children {
            collection.validate(name, &mut child_issues);
        }
        for (path, message) in child_issues {
            errors.add(path, message);
        }

        for (path, target, id) in page.references() {
            if !self.reference_exists(target, id).await? {
                errors.add(path, INVALID_CHOICE);
            }
        }

        if page.kind == PageKind::Book {
            self.import_archive(page, errors).await;
        }
        Ok(())
    }

    async fn reference_exists(&self, target: ReferenceTarget, id: Uuid) -> Result<bool, StoreError> {
        let store = &self.inner.store;
        Ok(match target {
            ReferenceTarget::Page => store.get_page(id).await?.is_some(),
            _ => store.get_snippet(target, id).await?.is_some(),
        })
    }

    /// Copy archive metadata into a book with a `cnx_id`. Failures become a
    /// validation error on `cnx_id` and leave the page untouched.
    async fn import_archive(&self, page: &mut Page, errors: &mut ValidationErrors) {
        let Some(cnx_id) = page.text("cnx_id").map(str::to_string) else {
            return;
        };
        match self.inner.archive.fetch_metadata(&cnx_id).await {
            Ok(metadata) => {
                debug!(page_id = %page.id, cnx_id = %cnx_id, "archive metadata imported");
                book::apply_archive_metadata(page, metadata);
            }
            Err(e) => {
                warn!(page_id = %page.id, cnx_id = %cnx_id, error = %e, "archive import failed");
                errors.add("cnx_id", e.to_string());
            }
        }
    }

    /// Run save hooks and persist.
    async fn save(&self, mut page: Page) -> Result<SaveReport, PageServiceError> {
        let mut dirty_fields = Vec::new();
        if page.kind == PageKind::Book {
            if book::sync_authors(&mut page) {
                dirty_fields.push(book::AUTHORS_FIELD.to_string());
            }
            if book::sync_webview_link(&mut page, &self.inner.webview_base) {
                dirty_fields.push("webview_link".to_string());
            }
        }
        self.inner.store.save_page(&page).await?;
        Ok(SaveReport { page, dirty_fields })
    }

    async fn clear_references(
        &self,
        target: ReferenceTarget,
        id: Uuid,
    ) -> Result<usize, PageServiceError> {
        let store = &self.inner.store;
        let mut updated = 0;
        for mut page in store.list_pages(None, None).await? {
            if page.clear_reference(target, id) {
                store.save_page(&page).await?;
                updated += 1;
            }
        }
        Ok(updated)
    }
}

/// Decode editable input onto `page`. Read-only fields in the input are
/// ignored; unknown names are errors.
fn apply_input(
    def: &PageTypeDefinition,
    page: &mut Page,
    input: PageInput,
    errors: &mut ValidationErrors,
) {
    if let Some(title) = input.title {
        page.title = title.trim().to_string();
    }
    if let Some(slug) = input.slug {
        page.slug = slug.trim().to_string();
    }
    if let Some(seo_title) = input.seo_title {
        page.seo_title = seo_title;
    }
    if let Some(search_description) = input.search_description {
        page.search_description = search_description;
    }

    for name in input.fields.keys() {
        if def.field(name).is_none() {
            errors.add(name.as_str(), "Unknown field.");
        }
    }
    for name in input.children.keys() {
        if def.child_kind(name).is_none() {
            errors.add(name.as_str(), "Unknown child collection.");
        }
    }

    for field in &def.fields {
        let name = &field.field_name;
        let raw = if field.editable {
            input.fields.get(name)
        } else {
            None
        };
        if raw.is_none() && page.fields.contains_key(name) {
            continue;
        }
        match FieldValue::decode(field, raw) {
            Ok(mut value) => {
                sanitize(&field.field_type, &mut value);
                page.fields.insert(name.clone(), value);
            }
            Err(message) => errors.add(name.as_str(), message),
        }
    }

    for (name, kind) in &def.children {
        match input.children.get(*name) {
            Some(raw) => match kind.decode(raw) {
                Ok(collection) => {
                    page.children.insert((*name).to_string(), collection);
                }
                Err(message) => errors.add(*name, message),
            },
            None => {
                page.children
                    .entry((*name).to_string())
                    .or_insert_with(|| kind.empty());
            }
        }
    }
}

fn sanitize(field_type: &FieldType, value: &mut FieldValue) {
    match (field_type, value) {
        (FieldType::RichText, FieldValue::RichText(html)) => *html = sanitize_html(html),
        (FieldType::Stream(schema), FieldValue::Stream(stream)) => {
            if let Some(schema) = stream_schema(schema) {
                schema.sanitize(stream);
            }
        }
        _ => {}
    }
}

/// Lowercase, hyphen-separated slug derived from a title.
pub fn slugify(title: &str) -> String {
    let mut slug = String::new();
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if (c.is_whitespace() || c == '-' || c == '_') && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}
