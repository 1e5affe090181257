use serde::{Deserialize, Serialize};

/// One product recommendation as returned to clients.
///
/// Items are built per request and never stored; `id` is unique within a
/// single response only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationItem {
    pub id: String,
    pub name: String,
    pub price: u32,
    pub image_url: String,
    pub shop_url: String,
}
