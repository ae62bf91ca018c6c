//! Photoshare-rs server entry point.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{Router, middleware};
use photoshare_api::middleware::AppState;
use photoshare_api::{endpoints, router as api_router};
use photoshare_common::{Config, LocalStorage, SignedUrlIssuer, StorageService, TokenIssuer};
use photoshare_core::{
    CommentService, InteractionService, PhotoService, UserService, VisionService,
};
use photoshare_db::repositories::{
    CommentRepository, LikeRepository, PhotoRepository, RatingRepository, UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "photoshare=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting photoshare-rs server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database and run migrations
    let db = photoshare_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    photoshare_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let photo_repo = PhotoRepository::new(Arc::clone(&db));
    let like_repo = LikeRepository::new(Arc::clone(&db));
    let rating_repo = RatingRepository::new(Arc::clone(&db));
    let comment_repo = CommentRepository::new(Arc::clone(&db));

    // Token issuing and blob storage
    let tokens = TokenIssuer::new(&config.auth.jwt_secret, config.auth.token_ttl_secs);
    let storage: StorageService = Arc::new(LocalStorage::new(
        PathBuf::from(&config.storage.base_path),
        config.storage.base_url.clone(),
    ));
    let urls = SignedUrlIssuer::new(&config.storage.account_key, config.storage.url_ttl_secs);

    // Optional image analysis
    let vision = VisionService::from_settings(&config.vision);
    if vision.is_some() {
        info!("Image analysis enabled");
    }

    // Initialize services
    let user_service = UserService::new(user_repo.clone(), photo_repo.clone(), tokens.clone());
    let photo_service = PhotoService::new(
        photo_repo.clone(),
        like_repo.clone(),
        rating_repo.clone(),
        user_repo.clone(),
        Arc::clone(&storage),
        urls.clone(),
        vision,
    );
    let interaction_service = InteractionService::new(
        like_repo,
        rating_repo,
        photo_repo.clone(),
        user_repo,
    );
    let comment_service = CommentService::new(comment_repo, photo_repo);

    // Create app state
    let state = AppState {
        user_service,
        photo_service,
        interaction_service,
        comment_service,
        tokens,
        storage,
        urls,
    };

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .nest("/blobs", endpoints::blobs::router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            photoshare_api::middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
