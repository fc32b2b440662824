//! Asset store collaborator
//!
//! The capability handlers only ever talk to `dyn AssetStore`. The in-memory
//! implementation keeps two tiers:
//! - Cached tier: bounded LRU, consulted first by every lookup
//! - Canonical tier: unbounded map holding every stored asset

use std::num::NonZeroUsize;

use dashmap::DashMap;
use lru::LruCache;
use parking_lot::Mutex;
use uuid::Uuid;

use super::error::AssetError;
use super::model::Asset;

/// Default number of assets kept in the cached tier
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Content-addressed asset storage
pub trait AssetStore: Send + Sync {
    /// Fast lookup against the cached tier only
    fn get_cached(&self, id: &str) -> Option<Asset>;

    /// Full lookup, falling through to the canonical tier
    fn get(&self, id: &str) -> Option<Asset>;

    /// Lookup used by the mesh capability
    fn get_mesh(&self, id: &str) -> Option<Asset> {
        self.get(id)
    }

    /// Store an asset, overwriting any asset with the same id.
    /// Returns the id the asset is stored under.
    fn store(&self, asset: Asset) -> Result<String, AssetError>;
}

/// In-memory two-tier asset store
pub struct MemoryAssetStore {
    canonical: DashMap<String, Asset>,
    cache: Mutex<LruCache<String, Asset>>,
}

impl MemoryAssetStore {
    /// Create a store whose cached tier holds at most `cache_capacity` assets
    pub fn new(cache_capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(cache_capacity)
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            canonical: DashMap::new(),
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Insert into the canonical tier only, leaving the cached tier cold
    pub fn put_canonical(&self, asset: Asset) {
        self.canonical.insert(asset.id.clone(), asset);
    }

    /// Drop an asset from the cached tier
    pub fn evict_cached(&self, id: &str) -> bool {
        self.cache.lock().pop(id).is_some()
    }

    /// Number of assets in the canonical tier
    pub fn len(&self) -> usize {
        self.canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }

    /// Number of assets in the cached tier
    pub fn cached_len(&self) -> usize {
        self.cache.lock().len()
    }
}

impl Default for MemoryAssetStore {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl AssetStore for MemoryAssetStore {
    fn get_cached(&self, id: &str) -> Option<Asset> {
        self.cache.lock().get(id).cloned()
    }

    fn get(&self, id: &str) -> Option<Asset> {
        if let Some(asset) = self.get_cached(id) {
            return Some(asset);
        }

        let asset = self.canonical.get(id).map(|entry| entry.clone())?;
        self.cache.lock().put(asset.id.clone(), asset.clone());
        Some(asset)
    }

    fn store(&self, mut asset: Asset) -> Result<String, AssetError> {
        if asset.id.is_empty() {
            asset.id = Uuid::new_v4().to_string();
        }

        let id = asset.id.clone();
        tracing::debug!(
            "Storing asset {} ({:?}, {} bytes, created {})",
            id,
            asset.asset_type,
            asset.size(),
            asset.created_at.to_rfc3339()
        );

        // Whole-record replacement in both tiers, so concurrent writers of
        // the same id leave one complete asset behind.
        self.canonical.insert(id.clone(), asset.clone());
        self.cache.lock().put(id.clone(), asset);
        Ok(id)
    }
}
