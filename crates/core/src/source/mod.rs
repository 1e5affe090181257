pub mod error;
pub mod mock;
pub mod shopee;
pub mod types;

use crate::config::{Settings, SourceMode};
use crate::domain::recommendation::RecommendationItem;
use anyhow::Result;
use std::sync::Arc;

#[async_trait::async_trait]
pub trait RecommendationSource: Send + Sync {
    /// Value reported in the response envelope's `source` field.
    fn source_name(&self) -> &'static str;

    async fn fetch_items(&self, keyword: &str, limit: usize) -> Result<Vec<RecommendationItem>>;
}

/// Picks the source once at startup.
pub fn build_source(settings: &Settings) -> Result<Arc<dyn RecommendationSource>> {
    match settings.source_mode() {
        SourceMode::Mock => Ok(Arc::new(mock::MockSource)),
        SourceMode::Live => Ok(Arc::new(shopee::ShopeeSource::from_settings(settings)?)),
    }
}
