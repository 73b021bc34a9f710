//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::info;

use crate::archive::{ArchiveClient, HttpArchiveClient};
use crate::catalog::Catalog;
use crate::config::Config;
use crate::db;
use crate::media::MediaUrls;
use crate::projection::Projector;
use crate::services::PageService;
use crate::store::{MemoryStore, PageStore, PgStore};

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    catalog: Arc<Catalog>,

    /// Page and snippet storage.
    store: Arc<dyn PageStore>,

    /// PostgreSQL pool, when pages are stored in Postgres.
    db: Option<PgPool>,

    pages: PageService,

    projector: Projector,
}

impl AppState {
    /// Build state from configuration, connecting to Postgres when configured.
    pub async fn new(config: &Config, catalog: Arc<Catalog>) -> Result<Self> {
        let (store, db): (Arc<dyn PageStore>, Option<PgPool>) = match &config.database_url {
            Some(url) => {
                let pool = db::create_pool(url, config.database_max_connections).await?;
                let store = PgStore::new(pool.clone(), catalog.clone());
                store
                    .ensure_schema()
                    .await
                    .context("failed to create page tables")?;
                info!("using PostgreSQL page store");
                (Arc::new(store), Some(pool))
            }
            None => {
                info!("DATABASE_URL not set, using in-memory page store");
                (Arc::new(MemoryStore::new()), None)
            }
        };

        let archive = Arc::new(HttpArchiveClient::new(
            config.archive_url.clone(),
            config.archive_timeout,
        ));

        Ok(Self::assemble(
            catalog,
            store,
            db,
            archive,
            config.media_urls(),
            config.webview_base_url.clone(),
        ))
    }

    /// Assemble state from explicit collaborators.
    pub fn from_parts(
        catalog: Arc<Catalog>,
        store: Arc<dyn PageStore>,
        archive: Arc<dyn ArchiveClient>,
        media: MediaUrls,
        webview_base_url: String,
    ) -> Self {
        Self::assemble(catalog, store, None, archive, media, webview_base_url)
    }

    fn assemble(
        catalog: Arc<Catalog>,
        store: Arc<dyn PageStore>,
        db: Option<PgPool>,
        archive: Arc<dyn ArchiveClient>,
        media: MediaUrls,
        webview_base_url: String,
    ) -> Self {
        let pages = PageService::new(catalog.clone(), store.clone(), archive, webview_base_url);
        let projector = Projector::new(catalog.clone(), store.clone(), media);
        Self {
            inner: Arc::new(AppStateInner {
                catalog,
                store,
                db,
                pages,
                projector,
            }),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    pub fn store(&self) -> &Arc<dyn PageStore> {
        &self.inner.store
    }

    pub fn pages(&self) -> &PageService {
        &self.inner.pages
    }

    pub fn projector(&self) -> &Projector {
        &self.inner.projector
    }

    /// Which store backs this instance.
    pub fn storage_backend(&self) -> &'static str {
        if self.inner.db.is_some() {
            "postgres"
        } else {
            "memory"
        }
    }

    /// Check PostgreSQL connectivity. Always healthy for the in-memory store.
    pub async fn postgres_healthy(&self) -> bool {
        match &self.inner.db {
            Some(pool) => db::check_health(pool).await,
            None => true,
        }
    }
}
