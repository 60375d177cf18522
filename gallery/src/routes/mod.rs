mod gallery;
mod health;
mod likes;
mod pages;
mod statistics;

use axum::{
    routing::{get, post},
    Router,
};

/// Creates the router with all handler routes
pub fn handler() -> Router {
    Router::new()
        .route("/", get(gallery::index))
        .route("/Home/Index", get(gallery::index))
        .route("/Home/UploadAsync", post(gallery::upload))
        .route("/Home/DeleteImage", post(gallery::delete_image))
        .route("/Home/DeleteAll", post(gallery::delete_all))
        .route("/Home/LikeImage", post(likes::like_image))
        .route("/Home/Statistics", get(statistics::handler))
        .route("/Home/Privacy", get(pages::privacy))
        .route("/Home/Error", get(pages::error))
        .route("/health", get(health::handler))
}
