//! Postgres store. Page bodies are JSONB columns decoded through the catalog.

use std::sync::Arc;

use async_trait::async_trait;
use folio_sdk::types::ReferenceTarget;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use super::{PageStore, StoreError};
use crate::catalog::{Catalog, PageKind};
use crate::models::{Page, Snippet, StoredPage};

const PAGE_COLUMNS: &str = "id, page_type, parent_id, path, title, slug, seo_title, \
     search_description, created, updated, fields, children";

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS page (
        id UUID PRIMARY KEY,
        page_type TEXT NOT NULL,
        parent_id UUID REFERENCES page (id) ON DELETE CASCADE,
        path TEXT NOT NULL UNIQUE,
        title TEXT NOT NULL,
        slug TEXT NOT NULL,
        seo_title TEXT NOT NULL DEFAULT '',
        search_description TEXT NOT NULL DEFAULT '',
        created BIGINT NOT NULL,
        updated BIGINT NOT NULL,
        fields JSONB NOT NULL DEFAULT '{}',
        children JSONB NOT NULL DEFAULT '{}'
    )",
    "CREATE INDEX IF NOT EXISTS page_type_idx ON page (page_type)",
    "CREATE INDEX IF NOT EXISTS page_slug_idx ON page (slug)",
    "CREATE TABLE IF NOT EXISTS snippet (
        id UUID PRIMARY KEY,
        kind TEXT NOT NULL,
        body JSONB NOT NULL
    )",
];

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    catalog: Arc<Catalog>,
}

impl PgStore {
    pub fn new(pool: PgPool, catalog: Arc<Catalog>) -> Self {
        Self { pool, catalog }
    }

    /// Create tables and indexes that do not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("page store schema ready");
        Ok(())
    }

    /// Decode rows, skipping any that no longer match the catalog.
    fn decode_rows(&self, rows: Vec<StoredPage>) -> Vec<Page> {
        rows.into_iter()
            .filter_map(|row| {
                let id = row.id;
                match Page::from_stored(row, &self.catalog) {
                    Ok(page) => Some(page),
                    Err(e) => {
                        warn!(page_id = %id, error = %e, "skipping undecodable page");
                        None
                    }
                }
            })
            .collect()
    }
}

#[async_trait]
impl PageStore for PgStore {
    async fn get_page(&self, id: Uuid) -> Result<Option<Page>, StoreError> {
        let row = sqlx::query_as::<_, StoredPage>(&format!(
            "SELECT {PAGE_COLUMNS} FROM page WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| Page::from_stored(row, &self.catalog))
            .transpose()
            .map_err(StoreError::from)
    }

    async fn list_pages(
        &self,
        kind: Option<PageKind>,
        slug: Option<&str>,
    ) -> Result<Vec<Page>, StoreError> {
        let rows = sqlx::query_as::<_, StoredPage>(&format!(
            "SELECT {PAGE_COLUMNS} FROM page \
             WHERE ($1::TEXT IS NULL OR page_type = $1) AND ($2::TEXT IS NULL OR slug = $2) \
             ORDER BY path"
        ))
        .bind(kind.map(PageKind::as_str))
        .bind(slug)
        .fetch_all(&self.pool)
        .await?;

        Ok(self.decode_rows(rows))
    }

    async fn children_of(&self, parent: Option<Uuid>) -> Result<Vec<Page>, StoreError> {
        let rows = sqlx::query_as::<_, StoredPage>(&format!(
            "SELECT {PAGE_COLUMNS} FROM page WHERE parent_id IS NOT DISTINCT FROM $1 ORDER BY path"
        ))
        .bind(parent)
        .fetch_all(&self.pool)
        .await?;

        Ok(self.decode_rows(rows))
    }

    async fn save_page(&self, page: &Page) -> Result<(), StoreError> {
        let stored = page.to_stored();
        sqlx::query(
            "INSERT INTO page (id, page_type, parent_id, path, title, slug, seo_title, \
             search_description, created, updated, fields, children) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             ON CONFLICT (id) DO UPDATE SET \
             title = EXCLUDED.title, slug = EXCLUDED.slug, seo_title = EXCLUDED.seo_title, \
             search_description = EXCLUDED.search_description, updated = EXCLUDED.updated, \
             fields = EXCLUDED.fields, children = EXCLUDED.children",
        )
        .bind(stored.id)
        .bind(&stored.page_type)
        .bind(stored.parent_id)
        .bind(&stored.path)
        .bind(&stored.title)
        .bind(&stored.slug)
        .bind(&stored.seo_title)
        .bind(&stored.search_description)
        .bind(stored.created)
        .bind(stored.updated)
        .bind(&stored.fields)
        .bind(&stored.children)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_pages(&self, ids: &[Uuid]) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM page WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_snippet(
        &self,
        target: ReferenceTarget,
        id: Uuid,
    ) -> Result<Option<Snippet>, StoreError> {
        let body: Option<serde_json::Value> =
            sqlx::query_scalar("SELECT body FROM snippet WHERE id = $1 AND kind = $2")
                .bind(id)
                .bind(target.as_str())
                .fetch_optional(&self.pool)
                .await?;

        Ok(body.map(serde_json::from_value).transpose()?)
    }

    async fn save_snippet(&self, snippet: &Snippet) -> Result<(), StoreError> {
        let body = serde_json::to_value(snippet)?;
        sqlx::query(
            "INSERT INTO snippet (id, kind, body) VALUES ($1, $2, $3) \
             ON CONFLICT (id) DO UPDATE SET kind = EXCLUDED.kind, body = EXCLUDED.body",
        )
        .bind(snippet.id())
        .bind(snippet.target().as_str())
        .bind(body)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_snippet(&self, target: ReferenceTarget, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM snippet WHERE id = $1 AND kind = $2")
            .bind(id)
            .bind(target.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
