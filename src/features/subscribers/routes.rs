//! Subscriber routes

use std::sync::Arc;

use axum::{
    routing::{delete, post},
    Router,
};

use crate::features::subscribers::handlers;
use crate::features::subscribers::services::SubscriberService;

/// Create routes for the subscribers feature
///
/// Subscribe and unsubscribe are public (used by the marketing site);
/// listing and removal back the admin dashboard.
pub fn routes(service: Arc<SubscriberService>) -> Router {
    Router::new()
        .route(
            "/api/subscribers",
            post(handlers::subscribe).get(handlers::list_subscribers),
        )
        .route("/api/subscribers/unsubscribe", post(handlers::unsubscribe))
        .route("/api/subscribers/{id}", delete(handlers::remove_subscriber))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::lazy_test_pool;
    use axum_test::TestServer;
    use serde_json::json;

    fn test_server() -> TestServer {
        let service = Arc::new(SubscriberService::new(lazy_test_pool()));
        TestServer::new(routes(service)).unwrap()
    }

    #[tokio::test]
    async fn test_subscribe_rejects_invalid_email() {
        let server = test_server();

        for email in ["plainaddress", "@example.com", "a@", "a b@example.com"] {
            let response = server
                .post("/api/subscribers")
                .json(&json!({ "email": email }))
                .await;
            response.assert_status_bad_request();
        }
    }

    #[tokio::test]
    async fn test_subscribe_rejects_malformed_body() {
        let server = test_server();

        let response = server
            .post("/api/subscribers")
            .json(&json!({ "mail": "a@example.com" }))
            .await;
        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_unsubscribe_rejects_invalid_email() {
        let server = test_server();

        let response = server
            .post("/api/subscribers/unsubscribe")
            .json(&json!({ "email": "not-an-email" }))
            .await;
        response.assert_status_bad_request();
    }
}
