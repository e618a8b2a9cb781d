//! Axum server setup and router configuration.

use crate::api;
use crate::shutdown::shutdown_signal;
use crate::state::AppState;
use axum::{Json, Router, response::IntoResponse, routing::get};
use serde::Serialize;
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Build the main application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        .merge(api::payments::router())
        // Add state to all routes
        .with_state(state)
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Simple health check - returns OK if the server is running.
async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Run the server with graceful shutdown support.
pub async fn run_server(router: Router, addr: SocketAddr) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::runtime::{MerchantConfig, ProcessorConfig, ServerConfig, SharedConfig};
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use shoppay_core::events::reconciliation_channel;
    use sqlx::postgres::PgPoolOptions;
    use std::time::Duration;
    use tower::ServiceExt;
    use url::Url;

    /// State whose pool never connects; only routes that reject before
    /// touching the store can be exercised with it.
    fn offline_state() -> AppState {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://shoppay@localhost/shoppay")
            .unwrap();
        let url = Url::parse("http://127.0.0.1:9/unused").unwrap();
        let config = SharedConfig::new(
            ServerConfig {
                listen: "127.0.0.1:0".parse().unwrap(),
            },
            ProcessorConfig {
                token_url: url.clone(),
                public_key_url: url.clone(),
                payment_url: url,
                client_id: "test".to_string(),
                client_secret: "secret".to_string(),
                scope: "payment".to_string(),
                currency: "KZT".to_string(),
                request_timeout: Duration::from_secs(1),
                public_key_ttl: Duration::ZERO,
            },
            MerchantConfig {
                post_link: "http://127.0.0.1:9/callback".to_string(),
                failure_post_link: None,
                card_save: false,
                default_cardholder_name: "CARDHOLDER".to_string(),
                description_prefix: "Order".to_string(),
            },
        );
        let (tx, _rx) = reconciliation_channel();
        AppState::new(pool, config, reqwest::Client::new(), tx)
    }

    async fn send(method: Method, uri: &str, body: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap();
        let response = build_router(offline_state()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_health_check() {
        let (status, body) = send(Method::GET, "/health", "").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_create_payment_rejects_missing_fields() {
        let (status, body) = send(
            Method::POST,
            "/payments",
            r#"{"amount": 100.0, "order_id": 1, "user_id": 1, "hpan": "4003032704547597"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("expDate"));
    }

    #[tokio::test]
    async fn test_create_payment_rejects_malformed_json() {
        let (status, _) = send(Method::POST, "/payments", "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_non_numeric_payment_id_is_bad_request() {
        let (status, body) = send(Method::GET, "/payments/abc", "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "invalid payment ID");
    }

    #[tokio::test]
    async fn test_update_rejects_unknown_status() {
        let (status, body) = send(
            Method::PUT,
            "/payments/1",
            r#"{"user_id": 1, "order_id": 1, "amount": 100.0, "status": "pending"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("pending"));
    }

    #[tokio::test]
    async fn test_search_rejects_non_integer_user() {
        let (status, body) = send(Method::GET, "/search/payments?user=abc", "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "invalid user ID");
    }
}
