//! In-memory link store used by service and route tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};

use super::LinkRepositoryTrait;
use crate::errors::RepositoryError;
use crate::models::{Link, NewLink};

type Result<T> = std::result::Result<T, RepositoryError>;

/// Keyed by short key, so the map itself enforces key uniqueness the way the
/// primary key does in Postgres.
#[derive(Debug, Default)]
pub struct InMemoryLinkRepository {
    links: DashMap<String, (usize, Link)>,
    sequence: AtomicUsize,
    inserts: AtomicUsize,
}

impl InMemoryLinkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful inserts so far.
    pub fn insert_count(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn rows_for_url(&self, url: &str) -> usize {
        self.links.iter().filter(|e| e.value().1.url == url).count()
    }
}

#[async_trait]
impl LinkRepositoryTrait for InMemoryLinkRepository {
    async fn insert(&self, link: &NewLink) -> Result<Link> {
        match self.links.entry(link.key.clone()) {
            Entry::Occupied(_) => Err(RepositoryError::Conflict(format!(
                "Key '{}' already exists",
                link.key
            ))),
            Entry::Vacant(slot) => {
                let stored = Link {
                    key: link.key.clone(),
                    url: link.url.clone(),
                    created_at: link.created_at,
                    clicks: 0,
                };
                let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
                slot.insert((seq, stored.clone()));
                self.inserts.fetch_add(1, Ordering::SeqCst);
                Ok(stored)
            }
        }
    }

    async fn find_by_url(&self, url: &str) -> Result<Option<Link>> {
        Ok(self
            .links
            .iter()
            .filter(|e| e.value().1.url == url)
            .min_by_key(|e| e.value().0)
            .map(|e| e.value().1.clone()))
    }

    async fn find_by_url_excluding(&self, url: &str, key: &str) -> Result<Option<Link>> {
        Ok(self
            .links
            .iter()
            .filter(|e| e.value().1.url == url && e.key().as_str() != key)
            .min_by_key(|e| e.value().0)
            .map(|e| e.value().1.clone()))
    }

        async fn find_by_key(&self, key: &str) -> Result<Option<Link>> {
        Ok(self.links.get(key).map(|e| e.value().1.clone()))
    }

    async fn find_all(&self, limit: i64, offset: i64) -> Result<Vec<Link>> {
        let mut all: Vec<(usize, Link)> = self.links.iter().map(|e| e.value().clone()).collect();
        all.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(all
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .map(|(_, link)| link)
            .collect())
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.links.len() as i64)
    }

    async fn update_url(&self, key: &str, url: &str) -> Result<u64> {
        match self.links.get_mut(key) {
            Some(mut entry) => {
                entry.value_mut().1.url = url.to_string();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn increment_clicks(&self, key: &str) -> Result<Option<Link>> {
        Ok(self.links.get_mut(key).map(|mut entry| {
            entry.value_mut().1.clicks += 1;
            entry.value().1.clone()
        }))
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.links.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_duplicate_keys() {
        let repo = InMemoryLinkRepository::new();
        repo.insert(&NewLink::new("abc", "https://a.com")).await.unwrap();

        let err = repo
            .insert(&NewLink::new("abc", "https://b.com"))
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());
        assert_eq!(repo.insert_count(), 1);
    }

    #[tokio::test]
    async fn oldest_row_is_canonical_for_url() {
        let repo = InMemoryLinkRepository::new();
        repo.insert(&NewLink::new("first", "https://a.com")).await.unwrap();
        repo.insert(&NewLink::new("second", "https://a.com")).await.unwrap();

        let found = repo.find_by_url("https://a.com").await.unwrap().unwrap();
        assert_eq!(found.key, "first");
        assert_eq!(repo.rows_for_url("https://a.com"), 2);
    }

    #[tokio::test]
    async fn url_lookup_can_skip_one_key() {
        let repo = InMemoryLinkRepository::new();
        repo.insert(&NewLink::new("first", "https://a.com")).await.unwrap();
        repo.insert(&NewLink::new("second", "https://a.com")).await.unwrap();

        let other = repo
            .find_by_url_excluding("https://a.com", "first")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(other.key, "second");
        assert!(repo
            .find_by_url_excluding("https://b.com", "first")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn lists_newest_first_with_paging() {
        let repo = InMemoryLinkRepository::new();
        for i in 0..5 {
            repo.insert(&NewLink::new(format!("k{}", i), format!("https://{}.com", i)))
                .await
                .unwrap();
        }

        let page = repo.find_all(2, 1).await.unwrap();
        let keys: Vec<_> = page.iter().map(|l| l.key.as_str()).collect();
        assert_eq!(keys, vec!["k3", "k2"]);
        assert_eq!(repo.count().await.unwrap(), 5);
    }
}
