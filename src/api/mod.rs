//! Typed REST client for the Tekstil OS backend.
//!
//! Every response is decoded into an explicit type at this boundary, so a
//! malformed payload fails here as [`ApiError::Decode`] instead of somewhere
//! downstream. Authentication is pluggable through [`TokenSource`].
//!
//! ```ignore
//! use std::sync::Arc;
//! use tekstil::api::{ApiClient, StaticToken, Resource, models::Customer};
//!
//! let client = ApiClient::new("http://localhost:5000", Arc::new(StaticToken::new("jwt")))?;
//! let customers: Vec<Customer> = client.get_list(Resource::Customers.path(), &[]).await?;
//! ```

pub mod models;
pub mod resource;

pub use resource::Resource;

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::{ApiError, GENERIC_ERROR_MESSAGE};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// ── TokenSource ─────────────────────────────────────────────────────

/// Supplies the bearer token for each request. `Ok(None)` sends the
/// request anonymously.
#[async_trait::async_trait]
pub trait TokenSource: Send + Sync + 'static {
    async fn token(&self) -> Result<Option<String>, ApiError>;
}

pub struct NoAuth;

#[async_trait::async_trait]
impl TokenSource for NoAuth {
    async fn token(&self) -> Result<Option<String>, ApiError> {
        Ok(None)
    }
}

/// A token obtained elsewhere (config file, environment, `--token`).
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait::async_trait]
impl TokenSource for StaticToken {
    async fn token(&self) -> Result<Option<String>, ApiError> {
        // Must survive as an `Authorization` header value.
        reqwest::header::HeaderValue::from_str(&self.0).map_err(|_| {
            ApiError::Auth("token contains characters not allowed in a header".to_string())
        })?;
        Ok(Some(self.0.clone()))
    }
}

/// Token source for an optional configured token.
pub fn token_source(token: Option<&str>) -> Arc<dyn TokenSource> {
    match token.map(str::trim).filter(|t| !t.is_empty()) {
        Some(token) => Arc::new(StaticToken::new(token)),
        None => Arc::new(NoAuth),
    }
}

// ── List envelopes ──────────────────────────────────────────────────

/// Collection endpoints answer with a bare array, `{data: [...]}` or
/// `{items: [...], total}`.
#[derive(Debug, serde::Deserialize)]
#[serde(untagged)]
enum ListEnvelope<T> {
    Bare(Vec<T>),
    Data { data: Vec<T> },
    Items { items: Vec<T> },
}

impl<T> ListEnvelope<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::Bare(items) | Self::Data { data: items } | Self::Items { items } => items,
        }
    }
}

// ── ApiClient ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token_source: Arc<dyn TokenSource>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        token_source: Arc<dyn TokenSource>,
    ) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, token_source, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        token_source: Arc<dyn TokenSource>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ApiError::InvalidUrl(base_url));
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url,
            token_source,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path (`/api/...`).
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    async fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.url(path);
        tracing::debug!(%method, %url, "api request");
        let mut req = self
            .http
            .request(method, &url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(token) = self.token_source.token().await? {
            req = req.bearer_auth(token);
        }
        Ok(req)
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<T, ApiError> {
        let mut req = self.request(Method::GET, path).await?;
        if !params.is_empty() {
            req = req.query(params);
        }
        decode(check(req.send().await?).await?).await
    }

    /// GET a collection, accepting any of the list envelopes.
    pub async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<Vec<T>, ApiError> {
        let envelope: ListEnvelope<T> = self.get_json(path, params).await?;
        Ok(envelope.into_vec())
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(Method::POST, path, body).await
    }

    pub async fn patch_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(Method::PATCH, path, body).await
    }

    /// POST a JSON body and accept any 2xx reply, whatever its body.
    pub async fn post_ack<B>(&self, path: &str, body: &B) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        let req = self.request(Method::POST, path).await?.json(body);
        check(req.send().await?).await?;
        Ok(())
    }

    /// PATCH a JSON body and accept any 2xx reply, whatever its body.
    pub async fn patch_ack<B>(&self, path: &str, body: &B) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        let req = self.request(Method::PATCH, path).await?.json(body);
        check(req.send().await?).await?;
        Ok(())
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let req = self.request(Method::DELETE, path).await?;
        check(req.send().await?).await?;
        Ok(())
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let req = self.request(method, path).await?.json(body);
        decode(check(req.send().await?).await?).await
    }
}

/// Turn a non-2xx response into `ApiError::Server`.
async fn check(resp: Response) -> Result<Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let message = server_message(&body).unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string());
    tracing::debug!(status = status.as_u16(), %message, "api error response");
    Err(ApiError::Server {
        status: status.as_u16(),
        message,
    })
}

/// Pull a human-readable message out of an error body: `message`, then
/// `error`, then `error.message`.
pub fn server_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let candidates = [
        value.get("message"),
        value.get("error"),
        value.get("error").and_then(|e| e.get("message")),
    ];
    candidates
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Decode a success body. An empty body decodes as JSON `null`, so callers
/// may ask for `()`, `Option<T>` or `Value`.
async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    let bytes = resp.bytes().await?;
    let text: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
        b"null"
    } else {
        &bytes
    };
    serde_json::from_slice(text).map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::Customer;
    use axum::{
        Json, Router,
        http::{HeaderMap, StatusCode},
        routing::{delete, get, post},
    };
    use serde_json::json;
    use tokio::net::TcpListener;

    async fn serve(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client(base: &str) -> ApiClient {
        ApiClient::new(base, Arc::new(NoAuth)).unwrap()
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let err = ApiClient::new("ftp://erp", Arc::new(NoAuth)).unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }

    #[test]
    fn test_url_joins_paths() {
        let c = client("http://erp.local/");
        assert_eq!(c.base_url(), "http://erp.local");
        assert_eq!(c.url("/api/orders"), "http://erp.local/api/orders");
        assert_eq!(c.url("api/orders"), "http://erp.local/api/orders");
    }

    #[test]
    fn test_server_message_extraction_order() {
        assert_eq!(
            server_message(r#"{"message":"Sipariş bulunamadı","error":"x"}"#).as_deref(),
            Some("Sipariş bulunamadı")
        );
        assert_eq!(server_message(r#"{"error":"Yetkisiz"}"#).as_deref(), Some("Yetkisiz"));
        assert_eq!(
            server_message(r#"{"error":{"message":"İç hata"}}"#).as_deref(),
            Some("İç hata")
        );
        assert_eq!(server_message(r#"{"message":""}"#), None);
        assert_eq!(server_message("<html>502</html>"), None);
    }

    #[tokio::test]
    async fn test_get_list_accepts_all_envelopes() {
        let router = Router::new()
            .route(
                "/bare",
                get(|| async { Json(json!([{"id": 1, "name": "Akın Tekstil"}])) }),
            )
            .route(
                "/data",
                get(|| async { Json(json!({"data": [{"id": 2, "name": "Bursa Örme"}]})) }),
            )
            .route(
                "/items",
                get(|| async {
                    Json(json!({"items": [{"id": 3, "name": "Denizli Dokuma"}], "total": 1}))
                }),
            );
        let base = serve(router).await;
        let c = client(&base);
        for (path, id) in [("/bare", 1), ("/data", 2), ("/items", 3)] {
            let customers: Vec<Customer> = c.get_list(path, &[]).await.unwrap();
            assert_eq!(customers.len(), 1);
            assert_eq!(customers[0].id, id);
        }
    }

    #[tokio::test]
    async fn test_malformed_payload_is_decode_error() {
        let router = Router::new().route(
            "/api/customers",
            get(|| async { Json(json!([{"name": "id eksik"}])) }),
        );
        let base = serve(router).await;
        let err = client(&base)
            .get_list::<Customer>("/api/customers", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn test_error_status_uses_server_message_or_fallback() {
        let router = Router::new()
            .route(
                "/with-message",
                post(|| async {
                    (
                        StatusCode::CONFLICT,
                        Json(json!({"message": "Bu vergi numarası kayıtlı"})),
                    )
                }),
            )
            .route(
                "/without-message",
                delete(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
            );
        let base = serve(router).await;
        let c = client(&base);

        let err = c
            .post_json::<_, Value>("/with-message", &json!({}))
            .await
            .unwrap_err();
        match err {
            ApiError::Server { status, message } => {
                assert_eq!(status, 409);
                assert_eq!(message, "Bu vergi numarası kayıtlı");
            }
            other => panic!("Expected Server error, got {:?}", other),
        }

        let err = c.delete("/without-message").await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.user_message(), GENERIC_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_bearer_token_and_query_params_are_sent() {
        let router = Router::new().route(
            "/echo",
            get(
                |headers: HeaderMap,
                 axum::extract::RawQuery(query): axum::extract::RawQuery| async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    Json(json!({"auth": auth, "query": query.unwrap_or_default()}))
                },
            ),
        );
        let base = serve(router).await;
        let c = ApiClient::new(&base, token_source(Some("abc123"))).unwrap();
        let echo: Value = c
            .get_json("/echo", &[("page".to_string(), "2".to_string())])
            .await
            .unwrap();
        assert_eq!(echo["auth"], "Bearer abc123");
        assert_eq!(echo["query"], "page=2");
    }

    #[tokio::test]
    async fn test_empty_success_body_decodes_as_unit() {
        let router = Router::new().route("/api/labels/print", post(|| async { StatusCode::OK }));
        let base = serve(router).await;
        let result: Result<(), ApiError> = client(&base)
            .post_json("/api/labels/print", &json!({"x": 1}))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_ack_accepts_any_success_body() {
        let router = Router::new()
            .route("/api/labels/print", post(|| async { "OK" }))
            .route(
                "/api/notifications/read-all",
                axum::routing::patch(|| async { "queued" }),
            )
            .route(
                "/api/rejected",
                post(|| async { (StatusCode::BAD_REQUEST, "nope") }),
            );
        let base = serve(router).await;
        let c = client(&base);

        let decoded = c
            .post_json::<_, Value>("/api/labels/print", &json!({"x": 1}))
            .await;
        assert!(matches!(decoded, Err(ApiError::Decode(_))));

        c.post_ack("/api/labels/print", &json!({"x": 1})).await.unwrap();
        c.patch_ack("/api/notifications/read-all", &json!({}))
            .await
            .unwrap();

        let err = c.post_ack("/api/rejected", &json!({})).await.unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.user_message(), GENERIC_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_invalid_token_fails_before_sending() {
        let c = ApiClient::new("http://127.0.0.1:9", token_source(Some("abc\ndef"))).unwrap();
        let err = c.get_json::<Value>("/api/orders", &[]).await.unwrap_err();
        assert!(matches!(err, ApiError::Auth(_)));
        assert_eq!(err.user_message(), GENERIC_ERROR_MESSAGE);
    }

    #[test]
    fn test_token_source_ignores_blank_tokens() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        assert_eq!(rt.block_on(token_source(Some("  ")).token()).unwrap(), None);
        assert_eq!(
            rt.block_on(token_source(Some("t")).token()).unwrap().as_deref(),
            Some("t")
        );
    }
}
