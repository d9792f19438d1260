use crate::api::{Page, PageQuery, PortalApi};
use crate::error::PortalError;
use crate::model::resource::ResourceKind;
use moka::future::Cache;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Per-domain read cache for the plain display resources.
///
/// Each domain is cached independently with a TTL equal to the accepted
/// staleness window, and is invalidated explicitly after a mutation touching
/// it. This replaces the old single flat store that was overwritten
/// wholesale on every fetch. Only the first page travels through the cache;
/// deep pagination goes straight to the API.
pub struct ReadCache {
    cache: Cache<ResourceKind, Arc<Page<Value>>>,
}

impl ReadCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(32)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Cached first page for `kind`, fetching through `api` on a miss.
    pub async fn resource(
        &self,
        api: &dyn PortalApi,
        kind: ResourceKind,
    ) -> Result<Arc<Page<Value>>, PortalError> {
        if let Some(hit) = self.cache.get(&kind).await {
            return Ok(hit);
        }
        let fresh = Arc::new(api.resource_list(kind, PageQuery::default()).await?);
        self.cache.insert(kind, fresh.clone()).await;
        Ok(fresh)
    }

    /// Drop the cached copy of one domain after a mutation touching it.
    pub async fn invalidate(&self, kind: ResourceKind) {
        self.cache.invalidate(&kind).await;
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fixtures::FixtureApi;

    #[tokio::test]
    async fn second_read_is_served_from_cache() {
        let api = FixtureApi::seeded();
        let cache = ReadCache::new(Duration::from_secs(60));

        cache.resource(&api, ResourceKind::Beds).await.unwrap();
        cache.resource(&api, ResourceKind::Beds).await.unwrap();

        let fetches = api
            .calls()
            .iter()
            .filter(|c| c.as_str() == "resource_list")
            .count();
        assert_eq!(fetches, 1);
    }

    #[tokio::test]
    async fn invalidation_forces_a_refetch() {
        let api = FixtureApi::seeded();
        let cache = ReadCache::new(Duration::from_secs(60));

        cache.resource(&api, ResourceKind::Medicines).await.unwrap();
        cache.invalidate(ResourceKind::Medicines).await;
        cache.resource(&api, ResourceKind::Medicines).await.unwrap();

        let fetches = api
            .calls()
            .iter()
            .filter(|c| c.as_str() == "resource_list")
            .count();
        assert_eq!(fetches, 2);
    }
}
