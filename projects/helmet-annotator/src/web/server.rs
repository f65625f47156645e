use crate::cli::Args;
use crate::pipeline::model::ModelSlot;
use crate::storage::StorageLayout;
use crate::web::assets::index_handler;
use crate::web::upload::upload_handler;
use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};

/// State shared by every request
#[derive(Clone)]
pub struct AppState {
    pub layout: Arc<StorageLayout>,
    pub model: ModelSlot,
    pub max_frames: usize,
}

pub fn build_router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.layout.static_root);

    Router::new()
        .route("/", get(index_handler))
        .route("/upload", post(upload_handler))
        .nest_service("/static", static_files)
        // Videos routinely exceed the default 2 MB body limit
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(args: Args) -> Result<()> {
    let layout = StorageLayout::new(&args.uploads_dir, &args.static_root);
    layout.ensure_dirs()?;

    let model = ModelSlot::load(&args);
    let state = AppState {
        layout: Arc::new(layout),
        model,
        max_frames: args.max_frames,
    };

    let mut current_port = args.port;
    let listener = loop {
        let addr = SocketAddr::new(args.host, current_port);
        match TcpListener::bind(addr) {
            Ok(listener) => {
                // Set non-blocking before registering with Tokio
                listener.set_nonblocking(true)?;
                info!("Successfully bound to {}", addr);
                break listener;
            }
            Err(e) => {
                warn!("Failed to bind to {}: {}. Trying next port...", addr, e);
                current_port = current_port.wrapping_add(1);
                if current_port == 0 {
                    return Err(anyhow::anyhow!("No available ports found"));
                }
            }
        }
    };

    let app = build_router(state);

    let tokio_listener = tokio::net::TcpListener::from_std(listener)?;
    info!(
        "Helmet annotator started on http://{}",
        tokio_listener.local_addr()?
    );

    axum::serve(tokio_listener, app).await?;

    Ok(())
}
