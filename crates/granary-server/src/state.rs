use granary_db::repository::{ConversationRepository, MessageRepository};
use granary_engine::Engine;
use granary_ingest::DocumentProcessor;

use std::sync::Arc;

/// Everything the handlers share.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub processor: Arc<DocumentProcessor>,
    pub conversations: Arc<ConversationRepository>,
    pub messages: Arc<MessageRepository>,
    pub http: reqwest::Client,
    pub llm_model: String,
    pub llm_temperature: f32,
}
