//! In-memory store backed by `DashMap`.

use async_trait::async_trait;
use dashmap::DashMap;
use folio_sdk::types::ReferenceTarget;
use uuid::Uuid;

use super::{PageStore, StoreError};
use crate::catalog::PageKind;
use crate::models::{Page, Snippet};

/// Process-local store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pages: DashMap<Uuid, Page>,
    snippets: DashMap<Uuid, Snippet>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn collect(&self, keep: impl Fn(&Page) -> bool) -> Vec<Page> {
        let mut pages: Vec<Page> = self
            .pages
            .iter()
            .filter(|entry| keep(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        pages.sort_by(|a, b| a.path.cmp(&b.path));
        pages
    }
}

#[async_trait]
impl PageStore for MemoryStore {
    async fn get_page(&self, id: Uuid) -> Result<Option<Page>, StoreError> {
        Ok(self.pages.get(&id).map(|entry| entry.value().clone()))
    }

    async fn list_pages(
        &self,
        kind: Option<PageKind>,
        slug: Option<&str>,
    ) -> Result<Vec<Page>, StoreError> {
        Ok(self.collect(|page| {
            kind.is_none_or(|k| page.kind == k) && slug.is_none_or(|s| page.slug == s)
        }))
    }

    async fn children_of(&self, parent: Option<Uuid>) -> Result<Vec<Page>, StoreError> {
        Ok(self.collect(|page| page.parent_id == parent))
    }

    async fn save_page(&self, page: &Page) -> Result<(), StoreError> {
        self.pages.insert(page.id, page.clone());
        Ok(())
    }

    async fn delete_pages(&self, ids: &[Uuid]) -> Result<(), StoreError> {
        for id in ids {
            self.pages.remove(id);
        }
        Ok(())
    }

    async fn get_snippet(
        &self,
        target: ReferenceTarget,
        id: Uuid,
    ) -> Result<Option<Snippet>, StoreError> {
        Ok(self
            .snippets
            .get(&id)
            .filter(|entry| entry.value().target() == target)
            .map(|entry| entry.value().clone()))
    }

    async fn save_snippet(&self, snippet: &Snippet) -> Result<(), StoreError> {
        self.snippets.insert(snippet.id(), snippet.clone());
        Ok(())
    }

    async fn delete_snippet(&self, target: ReferenceTarget, id: Uuid) -> Result<bool, StoreError> {
        Ok(self
            .snippets
            .remove_if(&id, |_, snippet| snippet.target() == target)
            .is_some())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::models::Subject;

    fn page(kind: PageKind, path: &str, slug: &str, parent_id: Option<Uuid>) -> Page {
        Page {
            id: Uuid::now_v7(),
            kind,
            parent_id,
            path: path.to_string(),
            title: slug.to_string(),
            slug: slug.to_string(),
            seo_title: String::new(),
            search_description: String::new(),
            created: 0,
            updated: 0,
            fields: BTreeMap::new(),
            children: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn lists_in_tree_order_with_filters() {
        let store = MemoryStore::new();
        let home = page(PageKind::HomePage, "0001", "home", None);
        let index = page(PageKind::BookIndex, "00010001", "books", Some(home.id));
        let b2 = page(PageKind::Book, "000100010002", "biology", Some(index.id));
        let b1 = page(PageKind::Book, "000100010001", "physics", Some(index.id));
        for p in [&b2, &home, &b1, &index] {
            store.save_page(p).await.unwrap();
        }

        let books = store.list_pages(Some(PageKind::Book), None).await.unwrap();
        let slugs: Vec<_> = books.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["physics", "biology"]);

        let found = store.list_pages(None, Some("books")).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, index.id);

        let roots = store.children_of(None).await.unwrap();
        assert_eq!(roots.len(), 1);
        assert_eq!(store.children_of(Some(index.id)).await.unwrap().len(), 2);

        store.delete_pages(&[b1.id, b2.id]).await.unwrap();
        assert_eq!(store.page_count(), 2);
    }

    #[tokio::test]
    async fn snippets_are_scoped_by_target() {
        let store = MemoryStore::new();
        let subject = Snippet::Subject(Subject {
            id: Uuid::now_v7(),
            name: "Math".into(),
        });
        store.save_snippet(&subject).await.unwrap();

        let id = subject.id();
        assert!(store
            .get_snippet(ReferenceTarget::Image, id)
            .await
            .unwrap()
            .is_none());
        assert_eq!(
            store.get_snippet(ReferenceTarget::Subject, id).await.unwrap(),
            Some(subject)
        );
        assert!(!store.delete_snippet(ReferenceTarget::Document, id).await.unwrap());
        assert!(store.delete_snippet(ReferenceTarget::Subject, id).await.unwrap());
    }
}
