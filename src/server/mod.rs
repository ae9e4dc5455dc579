pub mod api;
pub mod handlers;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::pipeline::Pipeline;
use crate::server::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/describe", post(handlers::describe))
        .route("/places", get(handlers::list_places))
        .route("/artifacts/{kind}", get(handlers::get_artifact))
        .with_state(state);

    Router::new().nest("/api", api_routes).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    )
}

pub async fn run_server(pipeline: Arc<Pipeline>, host: String, port: u16) -> anyhow::Result<()> {
    pipeline.artifacts().ensure_dir()?;

    let state = Arc::new(AppState::new(pipeline));
    let artifact_dir = state.artifacts().dir().display().to_string();
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;

    tracing::info!("Server listening on http://{}:{}", host, port);
    tracing::info!("Writing artifacts to: {}", artifact_dir);

    axum::serve(listener, app).await?;

    Ok(())
}
