//! Page and snippet persistence.
//!
//! [`PageStore`] is implemented by [`MemoryStore`] for development and tests
//! and by [`PgStore`] for Postgres. Writes are last-writer-wins.

mod memory;
mod postgres;

use async_trait::async_trait;
use folio_sdk::types::ReferenceTarget;
use thiserror::Error;
use uuid::Uuid;

use crate::catalog::PageKind;
use crate::models::{Page, PageDecodeError, Snippet};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("stored page is invalid: {0}")]
    Decode(#[from] PageDecodeError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Storage for the page tree and the snippet library.
#[async_trait]
pub trait PageStore: Send + Sync {
    async fn get_page(&self, id: Uuid) -> Result<Option<Page>, StoreError>;

    /// Pages in tree order, optionally filtered by kind and slug.
    async fn list_pages(
        &self,
        kind: Option<PageKind>,
        slug: Option<&str>,
    ) -> Result<Vec<Page>, StoreError>;

    /// Direct children of `parent` (`None` for tree roots), in tree order.
    async fn children_of(&self, parent: Option<Uuid>) -> Result<Vec<Page>, StoreError>;

    /// Insert or replace a page.
    async fn save_page(&self, page: &Page) -> Result<(), StoreError>;

    /// Delete pages by id. Missing ids are ignored.
    async fn delete_pages(&self, ids: &[Uuid]) -> Result<(), StoreError>;

    async fn get_snippet(
        &self,
        target: ReferenceTarget,
        id: Uuid,
    ) -> Result<Option<Snippet>, StoreError>;

    async fn save_snippet(&self, snippet: &Snippet) -> Result<(), StoreError>;

    /// Remove a snippet. Returns whether it existed.
    async fn delete_snippet(&self, target: ReferenceTarget, id: Uuid) -> Result<bool, StoreError>;
}
