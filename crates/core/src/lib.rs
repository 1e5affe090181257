pub mod domain;
pub mod signing;
pub mod source;

pub mod config {
    use anyhow::Context;
    use std::time::Duration;

    pub const DEFAULT_HOST: &str = "https://partner.shopeemobile.com";
    pub const DEFAULT_SEARCH_PATH: &str = "/api/v2/item/search";
    pub const DEFAULT_SHOP_BASE_URL: &str = "https://shopee.tw";
    const DEFAULT_TIMEOUT_SECS: u64 = 10;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum SourceMode {
        Mock,
        Live,
    }

    /// Where the partner id, timestamp and signature go on the outbound request.
    ///
    /// The upstream contract has to be confirmed before this is set; while it is
    /// unset the live source signs but never sends.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum SignaturePlacement {
        Query,
        Header,
    }

    impl SignaturePlacement {
        fn parse(s: &str) -> Option<Self> {
            match s.trim().to_ascii_lowercase().as_str() {
                "query" => Some(Self::Query),
                "header" | "headers" => Some(Self::Header),
                _ => None,
            }
        }
    }

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub partner_id: Option<String>,
        pub partner_key: Option<String>,
        pub mock_mode: bool,
        pub host: String,
        pub search_path: String,
        pub signature_placement: Option<SignaturePlacement>,
        pub timeout: Duration,
        pub shop_base_url: String,
        /// Allows a non-HTTPS partner host. Only for local upstream stand-ins.
        pub allow_insecure_host: bool,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Self::from_lookup(|key| std::env::var(key).ok())
        }

        pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
        where
            F: Fn(&str) -> Option<String>,
        {
            let non_blank = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());

            let mock_mode = match non_blank("SHOPEE_MOCK_MODE") {
                Some(v) => parse_bool(&v)
                    .with_context(|| format!("SHOPEE_MOCK_MODE must be true or false (got {v})"))?,
                None => true,
            };

            let allow_insecure_host = match non_blank("SHOPEE_ALLOW_INSECURE_HOST") {
                Some(v) => parse_bool(&v).with_context(|| {
                    format!("SHOPEE_ALLOW_INSECURE_HOST must be true or false (got {v})")
                })?,
                None => false,
            };

            let signature_placement = match non_blank("SHOPEE_SIGNATURE_PLACEMENT") {
                Some(v) => Some(SignaturePlacement::parse(&v).with_context(|| {
                    format!("SHOPEE_SIGNATURE_PLACEMENT must be query or header (got {v})")
                })?),
                None => None,
            };

            let timeout_secs = non_blank("SHOPEE_TIMEOUT_SECS")
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS);

            Ok(Self {
                partner_id: non_blank("SHOPEE_PARTNER_ID"),
                partner_key: non_blank("SHOPEE_KEY"),
                mock_mode,
                host: non_blank("SHOPEE_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
                search_path: non_blank("SHOPEE_SEARCH_PATH")
                    .unwrap_or_else(|| DEFAULT_SEARCH_PATH.to_string()),
                signature_placement,
                timeout: Duration::from_secs(timeout_secs),
                shop_base_url: non_blank("SHOPEE_SHOP_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_SHOP_BASE_URL.to_string()),
                allow_insecure_host,
                sentry_dsn: non_blank("SENTRY_DSN"),
            })
        }

        pub fn source_mode(&self) -> SourceMode {
            if self.mock_mode {
                return SourceMode::Mock;
            }
            if self.partner_id.is_none() || self.partner_key.is_none() {
                tracing::warn!(
                    "SHOPEE_MOCK_MODE=false but partner credentials are missing; falling back to mock mode"
                );
                return SourceMode::Mock;
            }
            SourceMode::Live
        }

        pub fn require_partner_credentials(&self) -> anyhow::Result<(&str, &str)> {
            let partner_id = self
                .partner_id
                .as_deref()
                .context("SHOPEE_PARTNER_ID is required")?;
            let partner_key = self
                .partner_key
                .as_deref()
                .context("SHOPEE_KEY is required")?;
            Ok((partner_id, partner_key))
        }
    }

    fn parse_bool(s: &str) -> Option<bool> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        }
    }

}
