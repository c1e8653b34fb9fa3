use axum::{
  extract::{State, WebSocketUpgrade},
  http::Method,
  response::IntoResponse,
  routing::get,
  Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

mod app;
mod game;
mod protocol;
mod shared;
mod transport;

use app::config::ServerConfig;
use game::room::Room;
use transport::ws_session::handle_socket;

#[derive(Clone)]
struct AppState {
  room: Arc<Room>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
  ok: bool,
  players: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let config = ServerConfig::from_env()?;
  tracing::info!(?config, "configuration loaded");

  let room = Arc::new(Room::new(config.game.clone()));
  let (shutdown_tx, shutdown_rx) = watch::channel(false);
  let ticker = tokio::spawn(Arc::clone(&room).run(shutdown_rx));

  let state = Arc::new(AppState { room });

  let cors = CorsLayer::new()
    .allow_origin(Any)
    .allow_methods([Method::GET])
    .allow_headers(Any);

  let app: Router = Router::new()
    .route("/api/health", get(health))
    .route("/ws", get(ws_handler))
    .layer(cors)
    .with_state(state);

  let address = format!("0.0.0.0:{}", config.port);
  tracing::info!("listening on {address}");

  let listener = tokio::net::TcpListener::bind(&address).await?;
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;

  let _ = shutdown_tx.send(true);
  ticker.await?;
  Ok(())
}

async fn shutdown_signal() {
  if let Err(error) = tokio::signal::ctrl_c().await {
    tracing::warn!(?error, "failed to listen for ctrl-c");
    std::future::pending::<()>().await;
  }
  tracing::info!("shutdown requested");
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthResponse {
    ok: true,
    players: state.room.player_count().await,
  })
}

async fn ws_handler(
  ws: WebSocketUpgrade,
  State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
  let room = Arc::clone(&state.room);
  ws.on_upgrade(move |socket| handle_socket(socket, room))
}
