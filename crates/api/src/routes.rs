use axum::{
    extract::{Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use shoprec_core::domain::recommendation::RecommendationItem;
use shoprec_core::source::RecommendationSource;

pub const DEFAULT_KEYWORD: &str = "女裝";
pub const DEFAULT_LIMIT: usize = 20;
pub const MAX_LIMIT: usize = 100;

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn RecommendationSource>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/", get(get_recommendations).options(preflight))
        .route(
            "/getRecommendations",
            get(get_recommendations).options(preflight),
        )
        .with_state(state)
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

/// Raw query. Both fields stay strings so bad input falls back to defaults
/// instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct RecommendationQuery {
    keyword: Option<String>,
    limit: Option<String>,
}

impl RecommendationQuery {
    /// Defaults only when absent; a present keyword is passed on as sent.
    fn keyword(&self) -> &str {
        self.keyword.as_deref().unwrap_or(DEFAULT_KEYWORD)
    }

    fn limit(&self) -> usize {
        self.limit
            .as_deref()
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_LIMIT)
            .min(MAX_LIMIT)
    }
}

#[derive(Debug, Serialize)]
struct SuccessEnvelope {
    success: bool,
    data: Vec<RecommendationItem>,
    source: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    success: bool,
    error: String,
}

async fn get_recommendations(
    State(state): State<AppState>,
    query: Option<Query<RecommendationQuery>>,
) -> Response {
    let query = query.map(|Query(q)| q).unwrap_or_default();
    let keyword = query.keyword();
    let limit = query.limit();
    let source = state.source.source_name();

    match state.source.fetch_items(keyword, limit).await {
        Ok(items) => {
            tracing::info!(%keyword, limit, source, items = items.len(), "served recommendations");
            Json(SuccessEnvelope {
                success: true,
                data: items,
                source,
            })
            .into_response()
        }
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(%keyword, limit, source, error = %err, "recommendation fetch failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorEnvelope {
                    success: false,
                    error: format!("{err:#}"),
                }),
            )
                .into_response()
        }
    }
}

async fn preflight() -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [
            (header::ACCESS_CONTROL_ALLOW_METHODS, "GET"),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use serde_json::Value;
    use shoprec_core::source::error::FetchError;
    use shoprec_core::source::mock::MockSource;
    use tower::ServiceExt;

    struct FailingSource;

    #[async_trait::async_trait]
    impl RecommendationSource for FailingSource {
        fn source_name(&self) -> &'static str {
            "shopee_api"
        }

        async fn fetch_items(
            &self,
            _keyword: &str,
            _limit: usize,
        ) -> anyhow::Result<Vec<RecommendationItem>> {
            Err(FetchError::Upstream {
                stage: "send",
                status: None,
                detail: "connection refused".to_string(),
            }
            .into())
        }
    }

    /// Echoes what the handler asked for so defaulting can be checked.
    struct EchoSource;

    #[async_trait::async_trait]
    impl RecommendationSource for EchoSource {
        fn source_name(&self) -> &'static str {
            "echo"
        }

        async fn fetch_items(
            &self,
            keyword: &str,
            limit: usize,
        ) -> anyhow::Result<Vec<RecommendationItem>> {
            Ok(vec![RecommendationItem {
                id: limit.to_string(),
                name: keyword.to_string(),
                price: 0,
                image_url: String::new(),
                shop_url: String::new(),
            }])
        }
    }

    fn app(source: Arc<dyn RecommendationSource>) -> Router {
        router(AppState { source })
    }

    async fn send(app: Router, method: Method, uri: &str) -> (StatusCode, Response<Body>) {
        let res = app
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        (res.status(), res)
    }

    async fn json_body(res: Response<Body>) -> Value {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn mock_mode_returns_requested_number_of_items() {
        let (status, res) = send(
            app(Arc::new(MockSource)),
            Method::GET,
            "/getRecommendations?keyword=shoes&limit=5",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            res.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
        let body = json_body(res).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["source"], "mock_server");
        assert_eq!(body["data"].as_array().unwrap().len(), 5);
        assert!(body["data"][0]["imageUrl"].is_string());
    }

    #[tokio::test]
    async fn missing_params_use_defaults() {
        let (status, res) = send(app(Arc::new(EchoSource)), Method::GET, "/").await;
        assert_eq!(status, StatusCode::OK);
        let body = json_body(res).await;
        assert_eq!(body["data"][0]["name"], DEFAULT_KEYWORD);
        assert_eq!(body["data"][0]["id"], DEFAULT_LIMIT.to_string());
    }

    #[tokio::test]
    async fn malformed_limit_is_defaulted_and_large_limit_clamped() {
        let (status, res) = send(
            app(Arc::new(EchoSource)),
            Method::GET,
            "/getRecommendations?limit=abc&keyword=%20",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let body = json_body(res).await;
        assert_eq!(body["data"][0]["id"], "20");
        assert_eq!(body["data"][0]["name"], " ");

        let (_, res) = send(
            app(Arc::new(EchoSource)),
            Method::GET,
            "/getRecommendations?limit=100000",
        )
        .await;
        let body = json_body(res).await;
        assert_eq!(body["data"][0]["id"], MAX_LIMIT.to_string());
    }

    #[tokio::test]
    async fn present_keyword_is_not_trimmed_or_replaced() {
        let (_, res) = send(
            app(Arc::new(EchoSource)),
            Method::GET,
            "/getRecommendations?keyword=%20shoes%20",
        )
        .await;
        assert_eq!(json_body(res).await["data"][0]["name"], " shoes ");

        let (_, res) = send(
            app(Arc::new(EchoSource)),
            Method::GET,
            "/getRecommendations?keyword=",
        )
        .await;
        assert_eq!(json_body(res).await["data"][0]["name"], "");
    }

    #[tokio::test]
    async fn preflight_returns_no_content_with_cors_headers() {
        let (status, res) = send(
            app(Arc::new(MockSource)),
            Method::OPTIONS,
            "/getRecommendations",
        )
        .await;

        assert_eq!(status, StatusCode::NO_CONTENT);
        let headers = res.headers();
        assert_eq!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
        assert_eq!(headers.get(header::ACCESS_CONTROL_ALLOW_METHODS).unwrap(), "GET");
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_HEADERS).unwrap(),
            "Content-Type"
        );
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn upstream_failure_is_reported_as_500() {
        let (status, res) = send(
            app(Arc::new(FailingSource)),
            Method::GET,
            "/getRecommendations?keyword=x",
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            res.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
        let body = json_body(res).await;
        assert_eq!(body["success"], false);
        let error = body["error"].as_str().unwrap();
        assert!(error.contains("connection refused"), "{error}");
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn concurrent_requests_are_independent() {
        let app = app(Arc::new(MockSource));
        let calls = (1..=8).map(|n| {
            let app = app.clone();
            async move {
                let (_, res) = send(app, Method::GET, &format!("/?limit={n}")).await;
                json_body(res).await["data"].as_array().unwrap().len()
            }
        });
        let lens: Vec<usize> = spawn_all(calls).await;
        assert_eq!(lens, (1..=8).collect::<Vec<_>>());
    }

    async fn spawn_all<F, T>(futs: impl Iterator<Item = F>) -> Vec<T>
    where
        F: std::future::Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let handles: Vec<_> = futs.map(tokio::spawn).collect();
        let mut out = Vec::with_capacity(handles.len());
        for h in handles {
            out.push(h.await.unwrap());
        }
        out
    }

    #[tokio::test]
    async fn healthz_is_ok() {
        let (status, res) = send(app(Arc::new(MockSource)), Method::GET, "/healthz").await;
        assert_eq!(status, StatusCode::OK);
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"ok");
    }
}
