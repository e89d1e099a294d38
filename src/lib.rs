pub mod animation;
pub mod api;
pub mod app_state;
pub mod config;
pub mod frame_store;
pub mod params;
pub mod upload;

use axum::Router;
use axum::extract::{DefaultBodyLimit, Extension};
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

//
// Re-export
//
pub use animation::{AnimationError, MIN_FRAMES, decode_frame, encode_gif};
pub use api::{ApiError, ApiResult, create_gif, index, log_request_errors};
pub use app_state::AppState;
pub use config::Config;
pub use frame_store::FrameStore;
pub use params::AnimationParams;
pub use upload::UploadItem;

/// Build the HTTP application for the given state.
pub fn router(state: AppState, body_limit: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/create_gif", post(create_gif))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum::middleware::from_fn(log_request_errors))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(Extension(state))
}

pub async fn run(config: Config) -> anyhow::Result<()> {
    let uploads_dir = config.uploads_dir();
    let state = AppState::new(&uploads_dir)?;
    let app = router(state, config.body_limit_bytes());

    let addr = format!("0.0.0.0:{}", config.listen_on_port);
    let listener = TcpListener::bind(&addr).await?;
    info!(
        %addr,
        max_upload_mb = config.max_upload_mb,
        "GIF creator listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
