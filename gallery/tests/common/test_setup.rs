use std::sync::Arc;

use axum::{body::Body, http::Request, response::Response, Router};
use gallery::{
    media_storage::{memory::InMemoryImageStore, ImageStore},
    server,
    types::Environment,
};
use like_storage::{memory::InMemoryLikeTable, ImageLikeService};
use tower::ServiceExt;

use super::utils::{form_request, multipart_body, MultipartPart};

/// Setup test environment variables with all the required configuration
pub fn setup_test_env() {
    // Load test environment variables
    dotenvy::from_path(".env.example").ok();

    // Initialize tracing for tests
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .ok();
}

/// Router wired to in-memory collaborators
pub struct TestSetup {
    pub router: Router,
    pub environment: Environment,
    pub image_store: Arc<InMemoryImageStore>,
    pub likes_table: Arc<InMemoryLikeTable>,
    pub like_service: Arc<ImageLikeService>,
}

impl TestSetup {
    pub fn new() -> Self {
        setup_test_env();

        let environment = Environment::Development {
            endpoint_override: None,
        };

        let image_store = Arc::new(InMemoryImageStore::new());
        let likes_table = Arc::new(InMemoryLikeTable::new());
        let like_service = Arc::new(ImageLikeService::new(likes_table.clone()));

        let router = server::app(
            &environment,
            image_store.clone() as Arc<dyn ImageStore>,
            like_service.clone(),
        );

        Self {
            router,
            environment,
            image_store,
            likes_table,
            like_service,
        }
    }

    /// Stores an image of `size` bytes and returns its public URI
    pub fn add_image(&self, key: &str, size: usize) -> String {
        self.image_store.insert(key, size, Some(chrono::Utc::now()));
        InMemoryImageStore::uri_for(key).to_string()
    }

    /// Likes an image `times` times through the like service
    pub async fn like(&self, image_id: &str, times: u64) {
        for _ in 0..times {
            self.like_service.add_like(image_id).await.unwrap();
        }
    }

    pub async fn send_request(
        &self,
        request: Request<Body>,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    pub async fn send_get_request(
        &self,
        route: &str,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method("GET")
            .body(Body::empty())?;
        self.send_request(request).await
    }

    pub async fn send_form_request(
        &self,
        route: &str,
        fields: &[(&str, &str)],
    ) -> Result<Response, Box<dyn std::error::Error>> {
        self.send_request(form_request(route, fields)?).await
    }

    pub async fn send_multipart_request(
        &self,
        route: &str,
        parts: &[MultipartPart<'_>],
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let (content_type, body) = multipart_body(parts);

        let request = Request::builder()
            .uri(route)
            .method("POST")
            .header("Content-Type", content_type)
            .body(Body::from(body))?;
        self.send_request(request).await
    }
}
