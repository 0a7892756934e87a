//! Asset resolution seam.
//!
//! Maps an opaque asset identifier from the client request to a local
//! media path the decoder can open. The production store is a config-driven
//! catalog; fetching from remote object storage happens out of band.

use crate::error::{Result, SubwireError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;

/// Trait for resolving asset identifiers to local media paths.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Resolve an asset id, failing with `UnknownAsset` when it is not in
    /// the store.
    async fn resolve(&self, asset_id: &str) -> Result<PathBuf>;
}

/// Asset store backed by the `[assets]` table of the configuration file.
pub struct CatalogAssetStore {
    catalog: HashMap<String, PathBuf>,
}

impl CatalogAssetStore {
    pub fn new(catalog: HashMap<String, PathBuf>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl AssetStore for CatalogAssetStore {
    async fn resolve(&self, asset_id: &str) -> Result<PathBuf> {
        self.catalog
            .get(asset_id)
            .cloned()
            .ok_or(SubwireError::UnknownAsset)
    }
}
