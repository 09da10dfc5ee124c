//! In-memory relic repository, used by tests and as the default seedable
//! store for embedded deployments.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use relic_core::{Relic, RelicId};

use super::error::{RepositoryError, Result};
use super::traits::{RelicFilter, RelicRepository};

/// `BTreeMap`-backed store; iteration order gives deterministic listings.
#[derive(Default)]
pub struct InMemoryRelicRepo {
    relics: RwLock<BTreeMap<RelicId, Relic>>,
}

impl InMemoryRelicRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_relics(relics: impl IntoIterator<Item = Relic>) -> Self {
        Self {
            relics: RwLock::new(
                relics
                    .into_iter()
                    .map(|relic| (relic.id.clone(), relic))
                    .collect(),
            ),
        }
    }

    /// Inserts or replaces a relic.
    pub fn upsert(&self, relic: Relic) -> Result<()> {
        let mut relics = self.relics.write().map_err(|_| RepositoryError::LockPoisoned)?;
        relics.insert(relic.id.clone(), relic);
        Ok(())
    }

    pub fn remove(&self, id: &RelicId) -> Result<Option<Relic>> {
        let mut relics = self.relics.write().map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(relics.remove(id))
    }

    pub fn len(&self) -> usize {
        self.relics.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RelicRepository for InMemoryRelicRepo {
    async fn get_relics_by_ids(&self, ids: &[RelicId]) -> Result<Vec<Relic>> {
        let relics = self.relics.read().map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(ids.iter().filter_map(|id| relics.get(id).cloned()).collect())
    }

    async fn list_relics(&self, filter: &RelicFilter) -> Result<Vec<Relic>> {
        let relics = self.relics.read().map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(relics
            .values()
            .filter(|relic| filter.matches(relic))
            .cloned()
            .collect())
    }

    async fn get_relic(&self, id: &RelicId) -> Result<Option<Relic>> {
        let relics = self.relics.read().map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(relics.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relic_core::{Quality, Rarity, RelicCategory};

    fn relic(id: &str) -> Relic {
        Relic::new(
            id,
            format!("Relic {id}"),
            RelicCategory::Utility,
            Rarity::Common,
            Quality::Delicate,
            1,
        )
    }

    #[tokio::test]
    async fn batch_lookup_preserves_request_order_and_skips_missing() {
        let repo = InMemoryRelicRepo::with_relics([relic("a"), relic("b"), relic("c")]);
        let found = repo
            .get_relics_by_ids(&[
                RelicId::from("c"),
                RelicId::from("ghost"),
                RelicId::from("a"),
            ])
            .await
            .unwrap();
        let ids: Vec<&str> = found.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a"]);
    }

    #[tokio::test]
    async fn listing_is_ordered_by_id() {
        let repo = InMemoryRelicRepo::with_relics([relic("z"), relic("a"), relic("m")]);
        let listed = repo.list_relics(&RelicFilter::default()).await.unwrap();
        let ids: Vec<&str> = listed.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "m", "z"]);
    }

    #[tokio::test]
    async fn upsert_replaces_existing() {
        let repo = InMemoryRelicRepo::new();
        repo.upsert(relic("a")).unwrap();
        let mut updated = relic("a");
        updated.name = "Renamed".to_owned();
        repo.upsert(updated).unwrap();

        let found = repo.get_relic(&RelicId::from("a")).await.unwrap().unwrap();
        assert_eq!(found.name, "Renamed");
        assert_eq!(repo.len(), 1);
    }
}
