use super::MetadataSource;
use autolens_common::{CanonicalKey, Catalog, MetadataRecord};
use std::sync::Arc;

/// 静的カタログを照合先にする
#[derive(Debug, Clone)]
pub struct StaticCatalogSource {
    catalog: Arc<Catalog>,
}

impl StaticCatalogSource {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }
}

impl MetadataSource for StaticCatalogSource {
    async fn lookup(&self, key: &CanonicalKey) -> autolens_common::Result<Option<MetadataRecord>> {
        Ok(self.catalog.lookup(key))
    }
}
