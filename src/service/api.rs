use crate::application::app::Application;
use crate::domain::models::DashboardView;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use std::future::IntoFuture;
use std::sync::Arc;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;

pub async fn start_server<A>(
    shutdown: broadcast::Sender<()>,
    app: Arc<A>,
    listen_port: u16,
) -> anyhow::Result<()>
where
    A: Application + Send + Sync + 'static,
{
    let router = Router::new()
        .route("/dashboard", get(get_dashboard::<A>))
        .route("/refresh", post(post_refresh::<A>))
        .with_state(app)
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", listen_port)).await?;

    let server = axum::serve(listener, router).into_future();

    tracing::info!("API server started on port {}", listen_port);

    let mut shutdown_rx = shutdown.subscribe();

    tokio::select! {
        _ = shutdown_rx.recv() => {
            tracing::warn!("API server received shutdown signal");
        }
        _ = server => {
            tracing::warn!("API server stopped unexpectedly");
        }
    }

    Ok(())
}

async fn get_dashboard<A>(State(app): State<Arc<A>>) -> Json<DashboardView>
where
    A: Application + Send + Sync,
{
    Json(app.dashboard().await)
}

async fn post_refresh<A>(State(app): State<Arc<A>>) -> StatusCode
where
    A: Application + Send + Sync + 'static,
{
    // Fire-and-forget: callers poll /dashboard for the outcome, a failed
    // pass only reaches the log.
    tokio::spawn(async move {
        if let Err(e) = app.refresh().await {
            tracing::error!("Refresh error: {:?}", e);
        }
    });
    StatusCode::ACCEPTED
}
