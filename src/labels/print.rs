use serde::Serialize;

use super::barcode::BarcodeType;
use super::descriptor::LabelDescriptor;
use crate::api::ApiClient;
use crate::errors::ApiError;

pub const DEFAULT_PRINT_ENDPOINT: &str = "/api/labels/print";

/// Body of the server print request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintRequest<'a> {
    pub label_type_id: i64,
    pub entity_id: i64,
    pub entity_type: &'a str,
    pub barcode_type: BarcodeType,
    pub barcode_value: &'a str,
    pub print_data: &'a LabelDescriptor,
}

impl<'a> PrintRequest<'a> {
    pub fn new(
        label: &'a LabelDescriptor,
        label_type_id: i64,
        entity_id: i64,
        entity_type: &'a str,
    ) -> Self {
        Self {
            label_type_id,
            entity_id,
            entity_type,
            barcode_type: label.barcode_type,
            barcode_value: &label.barcode_value,
            print_data: label,
        }
    }
}

/// Hands composed labels to the server-side printer queue.
#[derive(Debug, Clone)]
pub struct LabelPrinter {
    client: ApiClient,
    endpoint: String,
}

impl LabelPrinter {
    pub fn new(client: ApiClient) -> Self {
        Self::with_endpoint(client, DEFAULT_PRINT_ENDPOINT)
    }

    pub fn with_endpoint(client: ApiClient, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Send one print request. Returns `false` on any failure so the caller
    /// can offer a retry; the error itself is only logged.
    pub async fn print(
        &self,
        label: &LabelDescriptor,
        label_type_id: i64,
        entity_id: i64,
        entity_type: &str,
    ) -> bool {
        let request = PrintRequest::new(label, label_type_id, entity_id, entity_type);
        match self.send(&request).await {
            Ok(()) => {
                tracing::info!(
                    barcode = %label.barcode_value,
                    entity_type,
                    entity_id,
                    "label sent to printer"
                );
                true
            }
            Err(e) => {
                tracing::warn!(
                    barcode = %label.barcode_value,
                    entity_type,
                    entity_id,
                    error = %e,
                    "label print failed"
                );
                false
            }
        }
    }

    async fn send(&self, request: &PrintRequest<'_>) -> Result<(), ApiError> {
        // The endpoint may answer with anything (or nothing) on success.
        self.client.post_ack(&self.endpoint, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::NoAuth;
    use axum::{Json, Router, http::StatusCode, routing::post};
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;

    fn label() -> LabelDescriptor {
        LabelDescriptor::new("Kumaş Topu Etiketi", "FAB-7-12345678-001", BarcodeType::Code128)
            .department("Dokuma", "#16a34a")
            .field("Renk", "Ekru")
    }

    async fn serve(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn printer(base: &str) -> LabelPrinter {
        LabelPrinter::new(ApiClient::new(base, Arc::new(NoAuth)).unwrap())
    }

    #[test]
    fn test_request_wire_shape() {
        let label = label();
        let body = serde_json::to_value(PrintRequest::new(&label, 3, 7, "fabric_roll")).unwrap();
        assert_eq!(body["labelTypeId"], 3);
        assert_eq!(body["entityId"], 7);
        assert_eq!(body["entityType"], "fabric_roll");
        assert_eq!(body["barcodeType"], "code128");
        assert_eq!(body["barcodeValue"], "FAB-7-12345678-001");
        assert_eq!(body["printData"]["title"], "Kumaş Topu Etiketi");
        assert_eq!(body["printData"]["fields"][0]["value"], "Ekru");
    }

    #[tokio::test]
    async fn test_success_returns_true_and_posts_payload() {
        let seen: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
        let sink = seen.clone();
        let router = Router::new().route(
            "/api/labels/print",
            post(move |Json(body): Json<Value>| {
                let sink = sink.clone();
                async move {
                    *sink.lock().unwrap() = Some(body);
                    Json(json!({"queued": true}))
                }
            }),
        );
        let base = serve(router).await;
        assert!(printer(&base).print(&label(), 1, 7, "fabric_roll").await);
        let body = seen.lock().unwrap().clone().unwrap();
        assert_eq!(body["entityId"], 7);
    }

    #[tokio::test]
    async fn test_empty_success_body_is_accepted() {
        let router = Router::new().route("/api/labels/print", post(|| async { StatusCode::NO_CONTENT }));
        let base = serve(router).await;
        assert!(printer(&base).print(&label(), 1, 7, "fabric_roll").await);
    }

    #[tokio::test]
    async fn test_plain_text_success_body_is_accepted() {
        let router = Router::new().route("/api/labels/print", post(|| async { "OK" }));
        let base = serve(router).await;
        assert!(printer(&base).print(&label(), 1, 7, "fabric_roll").await);
    }

    #[tokio::test]
    async fn test_server_error_returns_false() {
        let router = Router::new().route(
            "/api/labels/print",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "yazıcı çevrimdışı") }),
        );
        let base = serve(router).await;
        assert!(!printer(&base).print(&label(), 1, 7, "fabric_roll").await);
    }

    #[tokio::test]
    async fn test_network_failure_returns_false() {
        // Bind then drop to get a port nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let base = format!("http://{}", addr);
        assert!(!printer(&base).print(&label(), 1, 7, "fabric_roll").await);
    }

    #[tokio::test]
    async fn test_custom_endpoint() {
        let router = Router::new().route("/print/v2", post(|| async { StatusCode::OK }));
        let base = serve(router).await;
        let printer = LabelPrinter::with_endpoint(
            ApiClient::new(&base, Arc::new(NoAuth)).unwrap(),
            "/print/v2",
        );
        assert!(printer.print(&label(), 1, 7, "fabric_roll").await);
    }
}
