use serde::Deserialize;

/// Search response envelope of the partner API.
#[derive(Debug, Clone, Deserialize)]
pub struct PartnerSearchResponse {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub response: Option<PartnerSearchBody>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartnerSearchBody {
    #[serde(default)]
    pub item: Vec<PartnerItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PartnerItem {
    pub item_id: u64,
    pub shop_id: u64,
    pub item_name: String,
    pub price: u32,
    pub image_url: String,
}
