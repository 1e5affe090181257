use crate::config::{Settings, SignaturePlacement};
use crate::domain::recommendation::RecommendationItem;
use crate::signing::{PartnerSigner, SignedParams};
use crate::source::error::FetchError;
use crate::source::types::{PartnerItem, PartnerSearchResponse};
use crate::source::RecommendationSource;
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue};
use std::time::Duration;

pub const SOURCE_NAME: &str = "shopee_api";

const PARAM_PARTNER_ID: &str = "partner_id";
const PARAM_TIMESTAMP: &str = "timestamp";
const PARAM_SIGN: &str = "sign";

// Upstream bodies end up in client-facing error messages.
const MAX_DETAIL_CHARS: usize = 512;

/// Live source backed by the partner marketplace search API.
#[derive(Debug, Clone)]
pub struct ShopeeSource {
    http: reqwest::Client,
    host: String,
    path: String,
    signer: PartnerSigner,
    placement: Option<SignaturePlacement>,
    shop_base_url: String,
    timeout: Duration,
}

impl ShopeeSource {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let (partner_id, partner_key) = settings.require_partner_credentials()?;

        let is_https = settings
            .host
            .get(..8)
            .is_some_and(|scheme| scheme.eq_ignore_ascii_case("https://"));
        if !is_https && !settings.allow_insecure_host {
            anyhow::bail!(
                "SHOPEE_HOST must be an https:// URL (got {}); signed requests are never sent in cleartext",
                settings.host
            );
        }

        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .https_only(!settings.allow_insecure_host)
            .build()
            .context("failed to build partner http client")?;

        let path = if settings.search_path.starts_with('/') {
            settings.search_path.clone()
        } else {
            format!("/{}", settings.search_path)
        };

        if settings.signature_placement.is_none() {
            tracing::warn!(
                %path,
                "SHOPEE_SIGNATURE_PLACEMENT is not set; live requests will be signed but not sent"
            );
        }

        Ok(Self {
            http,
            host: settings.host.trim_end_matches('/').to_string(),
            path,
            signer: PartnerSigner::new(partner_id, partner_key),
            placement: settings.signature_placement,
            shop_base_url: settings.shop_base_url.trim_end_matches('/').to_string(),
            timeout: settings.timeout,
        })
    }

    fn url(&self) -> String {
        format!("{}{}", self.host, self.path)
    }

    fn auth_headers(signed: &SignedParams) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            PARAM_PARTNER_ID,
            HeaderValue::from_str(&signed.partner_id).context("partner id is not a valid header value")?,
        );
        headers.insert(PARAM_TIMESTAMP, HeaderValue::from(signed.timestamp));
        headers.insert(PARAM_SIGN, HeaderValue::from_str(&signed.sign)?);
        Ok(headers)
    }

    async fn send(
        &self,
        signed: &SignedParams,
        placement: SignaturePlacement,
        keyword: &str,
        limit: usize,
    ) -> Result<Vec<RecommendationItem>> {
        let page_size = limit.to_string();
        let mut req = self
            .http
            .get(self.url())
            .query(&[("keyword", keyword), ("page_size", page_size.as_str())]);

        req = match placement {
            SignaturePlacement::Query => {
                let timestamp = signed.timestamp.to_string();
                req.query(&[
                    (PARAM_PARTNER_ID, signed.partner_id.as_str()),
                    (PARAM_TIMESTAMP, timestamp.as_str()),
                    (PARAM_SIGN, signed.sign.as_str()),
                ])
            }
            SignaturePlacement::Header => req.headers(Self::auth_headers(signed)?),
        };

        let res = req.send().await.map_err(|err| FetchError::Upstream {
            stage: if err.is_timeout() { "timeout" } else { "send" },
            status: None,
            detail: if err.is_timeout() {
                format!("no response within {:?}", self.timeout)
            } else {
                err.to_string()
            },
        })?;

        let status = res.status();
        let text = res.text().await.map_err(|err| FetchError::Upstream {
            stage: "read_body",
            status: Some(status.as_u16()),
            detail: truncate_detail(err.to_string()),
        })?;

        if !status.is_success() {
            return Err(FetchError::Upstream {
                stage: "status",
                status: Some(status.as_u16()),
                detail: truncate_detail(text),
            }
            .into());
        }

        let parsed = serde_json::from_str::<PartnerSearchResponse>(&text).map_err(|err| {
            FetchError::Upstream {
                stage: "decode",
                status: Some(status.as_u16()),
                detail: truncate_detail(format!("{err}: {text}")),
            }
        })?;

        if !parsed.error.trim().is_empty() {
            return Err(FetchError::Upstream {
                stage: "partner_error",
                status: Some(status.as_u16()),
                detail: truncate_detail(format!("{}: {}", parsed.error, parsed.message)),
            }
            .into());
        }

        let mut items: Vec<RecommendationItem> = parsed
            .response
            .unwrap_or_default()
            .item
            .into_iter()
            .map(|item| self.to_recommendation(item))
            .collect();
        items.truncate(limit);
        Ok(items)
    }

    fn to_recommendation(&self, item: PartnerItem) -> RecommendationItem {
        RecommendationItem {
            id: item.item_id.to_string(),
            name: item.item_name,
            price: item.price,
            image_url: item.image_url,
            shop_url: format!("{}/product/{}/{}", self.shop_base_url, item.shop_id, item.item_id),
        }
    }
}

fn truncate_detail(mut detail: String) -> String {
    if let Some((idx, _)) = detail.char_indices().nth(MAX_DETAIL_CHARS) {
        detail.truncate(idx);
        detail.push_str("...(truncated)");
    }
    detail
}

#[async_trait::async_trait]
impl RecommendationSource for ShopeeSource {
    fn source_name(&self) -> &'static str {
        SOURCE_NAME
    }

    async fn fetch_items(&self, keyword: &str, limit: usize) -> Result<Vec<RecommendationItem>> {
        let timestamp = chrono::Utc::now().timestamp();
        let signed = self.signer.sign(&self.path, timestamp);

        let Some(placement) = self.placement else {
            tracing::warn!(
                %keyword,
                limit,
                timestamp,
                path = %self.path,
                "partner request signed but not sent: transport contract unconfigured"
            );
            return Err(FetchError::Unsent {
                path: self.path.clone(),
                reason: "SHOPEE_SIGNATURE_PLACEMENT is not configured",
            }
            .into());
        };

        tracing::info!(%keyword, limit, timestamp, ?placement, "calling partner search API");
        let items = self.send(&signed, placement, keyword, limit).await?;
        tracing::info!(%keyword, items = items.len(), "partner search returned");
        Ok(items)
    }
}
