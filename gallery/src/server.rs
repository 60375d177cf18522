use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, Extension, Router};
use like_storage::ImageLikeService;
use tokio::{net::TcpListener, signal};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::routes;
use crate::{media_storage::ImageStore, types::Environment};

/// Builds the application router with its collaborators and middleware
#[must_use]
pub fn app(
    environment: &Environment,
    image_store: Arc<dyn ImageStore>,
    like_service: Arc<ImageLikeService>,
) -> Router {
    routes::handler()
        .layer(Extension(image_store))
        .layer(Extension(like_service))
        .layer(DefaultBodyLimit::max(environment.max_upload_bytes()))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(environment.request_timeout()))
}

/// Starts the server with the given environment and dependencies
///
/// # Errors
///
/// Returns an error if the server fails to start or bind to the port
pub async fn start(
    environment: Environment,
    image_store: Arc<dyn ImageStore>,
    like_service: Arc<ImageLikeService>,
) -> anyhow::Result<()> {
    let router = app(&environment, image_store, like_service);

    let addr = std::net::SocketAddr::from((
        [0, 0, 0, 0],
        std::env::var("PORT").map_or(Ok(8001), |p| p.parse())?,
    ));

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🔄 Photo gallery started on http://{addr}");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(anyhow::Error::from)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("Signal received, shutting down gracefully");
}
