pub mod error;
pub mod handlers;
pub mod models;
pub mod state;

pub use state::AppState;

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

/// Assemble the API router with permissive CORS.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::root))
        .route("/chat", post(handlers::chat::chat))
        .route("/conversations", get(handlers::chat::list_conversations))
        .route("/new-conversation", post(handlers::chat::new_conversation))
        .route(
            "/conversations/{conversation_id}/messages",
            get(handlers::chat::conversation_messages),
        )
        .route(
            "/conversations/{conversation_id}",
            delete(handlers::chat::delete_conversation),
        )
        .route("/upload-url", post(handlers::documents::upload_url))
        .route("/upload-file", post(handlers::documents::upload_file))
        .layer(cors)
        .with_state(state)
}
