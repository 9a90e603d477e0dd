use super::truncate_with_ellipsis;
use crate::error::ApiError;
use crate::models::{
    ChatRequest, ChatResponse, ConversationListResponse, ConversationMessagesResponse,
    SimpleMessageResponse, UserQuery,
};
use crate::state::AppState;

use granary_db::records::{ConversationRecord, MessageKind, MessageMetadata, MessageRecord};

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use uuid::Uuid;

const TITLE_PREVIEW_CHARS: usize = 50;
const MESSAGE_PREVIEW_CHARS: usize = 100;

/// POST /chat - run one turn of the retrieval agent within a thread.
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let (response_text, thread_id) = state
        .engine
        .process_message(&request.message, request.thread_id.clone())
        .await
        .map_err(|e| ApiError::InternalError(format!("Error processing chat: {}", e)))?;

    // First turn of a fresh thread starts a conversation record
    if request.thread_id.is_none() {
        let title = truncate_with_ellipsis(&request.message, TITLE_PREVIEW_CHARS);
        let record = ConversationRecord::new(thread_id.clone(), request.user_id.clone(), title);
        state.conversations.create(&record).await?;
    }

    let user_message = MessageRecord {
        conversation_id: thread_id.clone(),
        message_id: Uuid::new_v4().to_string(),
        kind: MessageKind::User,
        content: request.message.clone(),
        timestamp: Utc::now(),
        metadata: MessageMetadata {
            user_id: Some(request.user_id.clone()),
            ..Default::default()
        },
    };
    state.messages.insert(&user_message).await?;

    let ai_message = MessageRecord {
        conversation_id: thread_id.clone(),
        message_id: Uuid::new_v4().to_string(),
        kind: MessageKind::Ai,
        content: response_text.clone(),
        timestamp: Utc::now(),
        metadata: MessageMetadata {
            model_used: Some(state.llm_model.clone()),
            temperature: Some(state.llm_temperature),
            ..Default::default()
        },
    };
    state.messages.insert(&ai_message).await?;

    let preview = truncate_with_ellipsis(&response_text, MESSAGE_PREVIEW_CHARS);
    state.conversations.touch(&thread_id, &preview, 2).await?;

    Ok(Json(ChatResponse {
        response: response_text,
        thread_id,
    }))
}

/// GET /conversations - recent conversations for a user.
pub async fn list_conversations(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<ConversationListResponse>, ApiError> {
    let conversations = state.conversations.list_for_user(&query.user_id).await?;

    Ok(Json(ConversationListResponse {
        conversations: conversations.into_iter().map(Into::into).collect(),
    }))
}

/// POST /new-conversation - start an empty thread.
pub async fn new_conversation(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<ChatResponse>, ApiError> {
    let conversation_id = Uuid::new_v4().to_string();

    let record = ConversationRecord::new(
        conversation_id.clone(),
        query.user_id,
        "New Conversation".to_string(),
    );
    state.conversations.create(&record).await?;

    Ok(Json(ChatResponse {
        response: "I'm ready to help you with questions about your documents!".to_string(),
        thread_id: conversation_id,
    }))
}

/// GET /conversations/{conversation_id}/messages
pub async fn conversation_messages(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
) -> Result<Json<ConversationMessagesResponse>, ApiError> {
    let conversation = state
        .conversations
        .find(&conversation_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Conversation not found".to_string()))?;

    let messages = state.messages.list_for_conversation(&conversation_id).await?;
    let total_messages = messages.len();

    Ok(Json(ConversationMessagesResponse {
        conversation: conversation.into(),
        messages: messages.into_iter().map(Into::into).collect(),
        total_messages,
    }))
}

/// DELETE /conversations/{conversation_id} - drop a conversation and its
/// messages; only the owner may delete.
pub async fn delete_conversation(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
    Query(query): Query<UserQuery>,
) -> Result<Json<SimpleMessageResponse>, ApiError> {
    state
        .conversations
        .find_for_user(&conversation_id, &query.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Conversation not found or unauthorized".to_string()))?;

    let deleted = state.messages.delete_for_conversation(&conversation_id).await?;
    state.conversations.delete(&conversation_id).await?;

    log::info!(
        "deleted conversation {} and {} messages",
        conversation_id,
        deleted
    );

    Ok(Json(SimpleMessageResponse {
        message: "Conversation deleted successfully".to_string(),
    }))
}
