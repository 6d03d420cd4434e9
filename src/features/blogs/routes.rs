//! Blog post routes

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::features::blogs::handlers::{self, BlogState};

/// Create routes for the blogs feature
pub fn routes(state: BlogState, max_request_body_size: usize) -> Router {
    Router::new()
        .route(
            "/api/blogs",
            post(handlers::create_blog_post).get(handlers::list_blog_posts),
        )
        .route(
            "/api/blogs/{id}",
            get(handlers::get_blog_post)
                .put(handlers::update_blog_post)
                .delete(handlers::delete_blog_post),
        )
        .layer(DefaultBodyLimit::max(max_request_body_size))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::blogs::services::BlogService;
    use crate::shared::test_helpers::{
        lazy_test_pool, multipart_body, temp_local_store, MultipartField,
    };
    use axum_test::TestServer;
    use std::sync::Arc;

    const BOUNDARY: &str = "blog-test-boundary";

    fn test_server() -> TestServer {
        let state = BlogState {
            blogs: Arc::new(BlogService::new(lazy_test_pool(), Arc::new(temp_local_store()))),
            max_file_size: 1024 * 1024,
        };
        TestServer::new(routes(state, 8 * 1024 * 1024)).unwrap()
    }

    fn content_type() -> String {
        format!("multipart/form-data; boundary={}", BOUNDARY)
    }

    #[tokio::test]
    async fn test_create_without_title_returns_400() {
        let server = test_server();

        let body = multipart_body(BOUNDARY, &[MultipartField::text("content", "Body text")]);
        let response = server
            .post("/api/blogs")
            .content_type(&content_type())
            .bytes(body.into())
            .await;

        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_create_rejects_non_image_cover() {
        let server = test_server();

        let body = multipart_body(
            BOUNDARY,
            &[
                MultipartField::text("title", "Hello"),
                MultipartField::text("content", "Body text"),
                MultipartField::file("image", "cover.pdf", "application/pdf", b"%PDF".to_vec()),
            ],
        );
        let response = server
            .post("/api/blogs")
            .content_type(&content_type())
            .bytes(body.into())
            .await;

        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_get_with_malformed_id_returns_400() {
        let server = test_server();

        let response = server.get("/api/blogs/not-a-uuid").await;
        response.assert_status_bad_request();
    }
}
