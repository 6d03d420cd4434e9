//! Newsletter routes

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::features::newsletters::handlers::{self, NewsletterState};

/// Create routes for the newsletters feature
///
/// `max_request_body_size` bounds the whole multipart request; individual
/// files are additionally capped by the state's `max_file_size`.
pub fn routes(state: NewsletterState, max_request_body_size: usize) -> Router {
    Router::new()
        .route(
            "/api/newsletters",
            post(handlers::create_newsletter).get(handlers::list_newsletters),
        )
        .route(
            "/api/newsletters/{id}",
            get(handlers::get_newsletter)
                .put(handlers::update_newsletter)
                .delete(handlers::delete_newsletter),
        )
        .route(
            "/api/newsletters/{id}/download",
            get(handlers::download_newsletter),
        )
        .route("/api/newsletters/{id}/send", post(handlers::send_newsletter))
        .layer(DefaultBodyLimit::max(max_request_body_size))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::Result;
    use crate::features::newsletters::services::NewsletterService;
    use crate::features::notifications::{Mailer, NotificationDispatcher};
    use crate::features::subscribers::services::SubscriberService;
    use crate::shared::test_helpers::{
        lazy_test_pool, multipart_body, temp_local_store, MultipartField,
    };
    use async_trait::async_trait;
    use axum_test::TestServer;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    struct NoopMailer;

    #[async_trait]
    impl Mailer for NoopMailer {
        async fn send(&self, _recipient: &str, _subject: &str, _html_body: &str) -> Result<()> {
            Ok(())
        }
    }

    fn test_state() -> (NewsletterState, PathBuf) {
        let pool = lazy_test_pool();
        let store = Arc::new(temp_local_store());
        let upload_root = store.root().to_path_buf();

        let state = NewsletterState {
            newsletters: Arc::new(NewsletterService::new(pool.clone(), Arc::clone(&store))),
            subscribers: Arc::new(SubscriberService::new(pool)),
            dispatcher: Arc::new(
                NotificationDispatcher::new(Arc::new(NoopMailer), "http://localhost:4000", 4)
                    .unwrap(),
            ),
            max_file_size: 1024 * 1024,
        };

        (state, upload_root)
    }

    fn test_server(state: NewsletterState) -> TestServer {
        TestServer::new(routes(state, 8 * 1024 * 1024)).unwrap()
    }

    fn count_files(dir: &Path) -> usize {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return 0;
        };
        entries
            .flatten()
            .map(|entry| {
                let path = entry.path();
                if path.is_dir() {
                    count_files(&path)
                } else {
                    1
                }
            })
            .sum()
    }

    const BOUNDARY: &str = "newsletter-test-boundary";

    fn content_type() -> String {
        format!("multipart/form-data; boundary={}", BOUNDARY)
    }

    #[tokio::test]
    async fn test_create_without_file_returns_400_and_writes_nothing() {
        let (state, upload_root) = test_state();
        let server = test_server(state);

        let body = multipart_body(BOUNDARY, &[MultipartField::text("title", "June Update")]);
        let response = server
            .post("/api/newsletters")
            .content_type(&content_type())
            .bytes(body.into())
            .await;

        response.assert_status_bad_request();
        assert_eq!(count_files(&upload_root), 0);
    }

    #[tokio::test]
    async fn test_create_rejects_non_pdf_document() {
        let (state, upload_root) = test_state();
        let server = test_server(state);

        let body = multipart_body(
            BOUNDARY,
            &[
                MultipartField::text("title", "June Update"),
                MultipartField::file("pdf", "notes.txt", "text/plain", b"hello".to_vec()),
            ],
        );
        let response = server
            .post("/api/newsletters")
            .content_type(&content_type())
            .bytes(body.into())
            .await;

        response.assert_status_bad_request();
        assert_eq!(count_files(&upload_root), 0);
    }

    #[tokio::test]
    async fn test_create_rejects_oversized_file() {
        let (state, upload_root) = test_state();
        let server = test_server(state);

        let body = multipart_body(
            BOUNDARY,
            &[
                MultipartField::text("title", "June Update"),
                MultipartField::file(
                    "pdf",
                    "big.pdf",
                    "application/pdf",
                    vec![0u8; 2 * 1024 * 1024],
                ),
            ],
        );
        let response = server
            .post("/api/newsletters")
            .content_type(&content_type())
            .bytes(body.into())
            .await;

        response.assert_status_bad_request();
        assert_eq!(count_files(&upload_root), 0);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_sections_json() {
        let (state, upload_root) = test_state();
        let server = test_server(state);

        let body = multipart_body(
            BOUNDARY,
            &[
                MultipartField::text("title", "June Update"),
                MultipartField::text("templateIndex", "0"),
                MultipartField::text("sections", "not json"),
            ],
        );
        let response = server
            .post("/api/newsletters")
            .content_type(&content_type())
            .bytes(body.into())
            .await;

        response.assert_status_bad_request();
        assert_eq!(count_files(&upload_root), 0);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_template_index() {
        let (state, _) = test_state();
        let server = test_server(state);

        let body = multipart_body(
            BOUNDARY,
            &[
                MultipartField::text("title", "June Update"),
                MultipartField::text("templateIndex", "first"),
            ],
        );
        let response = server
            .post("/api/newsletters")
            .content_type(&content_type())
            .bytes(body.into())
            .await;

        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_get_with_malformed_id_returns_400() {
        let (state, _) = test_state();
        let server = test_server(state);

        let response = server.get("/api/newsletters/not-a-uuid").await;
        response.assert_status_bad_request();
    }
}
