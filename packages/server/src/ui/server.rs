//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::domain::RoomStore;

use super::{
    handler::{
        add_vote_result, commit_batch, create_room, get_participant, get_room, health_check,
        list_participants, list_rooms, list_vote_results, participants_websocket_handler,
        room_websocket_handler, set_participant, update_participant, update_room,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// Document store server
///
/// Hosts a `RoomStore` over HTTP (reads and writes) and WebSocket (snapshot
/// subscriptions).
///
/// # Example
///
/// ```ignore
/// let store = Arc::new(InMemoryRoomStore::new(Arc::new(SystemClock)));
/// let server = Server::new(store);
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    /// Store（データアクセス層の抽象化）
    store: Arc<dyn RoomStore>,
}

impl Server {
    /// Create a new Server instance
    pub fn new(store: Arc<dyn RoomStore>) -> Self {
        Self { store }
    }

    /// Build the router with every route attached
    pub fn router(&self) -> Router {
        let app_state = Arc::new(AppState {
            store: self.store.clone(),
        });

        Router::new()
            // WebSocket エンドポイント
            .route("/ws/rooms/{room_id}", get(room_websocket_handler))
            .route(
                "/ws/rooms/{room_id}/participants",
                get(participants_websocket_handler),
            )
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/rooms", get(list_rooms).post(create_room))
            .route("/api/rooms/{room_id}", get(get_room).patch(update_room))
            .route(
                "/api/rooms/{room_id}/participants",
                get(list_participants),
            )
            .route(
                "/api/rooms/{room_id}/participants/{participant_id}",
                get(get_participant)
                    .put(set_participant)
                    .patch(update_participant),
            )
            .route("/api/batch", post(commit_batch))
            .route(
                "/api/vote-results",
                get(list_vote_results).post(add_vote_result),
            )
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Serve on an already bound listener until the shutdown signal fires
    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        let app = self.router();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }

    /// Run the document store server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Yoriai server listening on {}", listener.local_addr()?);
        tracing::info!("Subscribe via: ws://{}/ws/rooms/{{room_id}}", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener).await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
