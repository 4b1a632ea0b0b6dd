mod config;
mod db;
mod error;
mod handlers;
mod metadata;
mod models;
mod services;
mod storage;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::handlers::grpc::FileStorageService;
use crate::services::{DownloadService, UploadService};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub uploads: UploadService,
    pub downloads: DownloadService,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "filestore=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting filestore...");

    // Load configuration
    let config = Arc::new(Config::load()?);
    tracing::info!("Configuration loaded");

    // Wire stores into the orchestrators
    let blobs = storage::from_config(&config.storage).await?;
    let metadata = metadata::from_config(&config).await?;
    tracing::info!("Blob storage initialized ({})", blobs.storage_type());

    let state = AppState {
        config: config.clone(),
        uploads: UploadService::new(blobs.clone(), metadata.clone()),
        downloads: DownloadService::new(blobs, metadata),
    };

    // gRPC front-end runs on its own port
    let grpc_addr: SocketAddr = format!("{}:{}", config.server.host, config.server.grpc_port).parse()?;
    let grpc = tonic::transport::Server::builder()
        .add_service(FileStorageService::new(&state).into_server(config.server.max_body_bytes))
        .serve(grpc_addr);
    tracing::info!("gRPC listening on {}", grpc_addr);

    // Build router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    tokio::try_join!(
        async { axum::serve(listener, app).await.map_err(anyhow::Error::from) },
        async { grpc.await.map_err(anyhow::Error::from) },
    )?;

    Ok(())
}

fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let file_routes = Router::new()
        .route("/files/upload", post(handlers::file::upload_file))
        .route("/files/:id", get(handlers::file::download_file));

    Router::new()
        .route("/", get(handlers::file::ping))
        .nest("/api", file_routes)
        .layer(DefaultBodyLimit::max(state.config.server.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
