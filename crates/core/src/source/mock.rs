use crate::domain::recommendation::RecommendationItem;
use crate::source::RecommendationSource;
use anyhow::Result;
use rand::seq::SliceRandom;
use rand::Rng;

pub const SOURCE_NAME: &str = "mock_server";

pub const MOCK_SHOP_URL: &str = "https://shopee.tw";

pub const MOCK_IMAGES: [&str; 5] = [
    "https://images.pexels.com/photos/1036623/pexels-photo-1036623.jpeg?auto=compress&cs=tinysrgb&w=600",
    "https://images.pexels.com/photos/157675/fashion-men-s-individuality-black-and-white-157675.jpeg?auto=compress&cs=tinysrgb&w=600",
    "https://images.pexels.com/photos/1639729/pexels-photo-1639729.jpeg?auto=compress&cs=tinysrgb&w=600",
    "https://images.pexels.com/photos/1454171/pexels-photo-1454171.jpeg?auto=compress&cs=tinysrgb&w=600",
    "https://images.pexels.com/photos/1031955/pexels-photo-1031955.jpeg?auto=compress&cs=tinysrgb&w=600",
];

const MIN_PRICE: u32 = 100;
const MAX_PRICE: u32 = 1099;

#[derive(Debug, Clone, Copy, Default)]
pub struct MockSource;

#[async_trait::async_trait]
impl RecommendationSource for MockSource {
    fn source_name(&self) -> &'static str {
        SOURCE_NAME
    }

    async fn fetch_items(&self, keyword: &str, limit: usize) -> Result<Vec<RecommendationItem>> {
        tracing::info!(%keyword, limit, "mock mode: returning synthetic items");
        Ok(generate_mock_items(limit))
    }
}

/// Builds `count` synthetic items. Ids combine the index with the generation
/// time, so they are unique within one call.
pub fn generate_mock_items(count: usize) -> Vec<RecommendationItem> {
    let generated_at = chrono::Utc::now().timestamp_millis();
    let mut rng = rand::thread_rng();

    (0..count)
        .map(|i| {
            let image_url = MOCK_IMAGES.choose(&mut rng).copied().unwrap_or(MOCK_IMAGES[0]);
            RecommendationItem {
                id: format!("mock_{i}_{generated_at}"),
                name: format!("[Server推薦] 2025 春季新款 #{} (熱銷中騙妳的)", i + 1),
                price: rng.gen_range(MIN_PRICE..=MAX_PRICE),
                image_url: image_url.to_string(),
                shop_url: MOCK_SHOP_URL.to_string(),
            }
        })
        .collect()
}
