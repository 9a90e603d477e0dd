//! Request and response bodies. Database records are mapped onto DTOs so
//! timestamps serialize as RFC 3339 strings rather than BSON dates.

use granary_db::records::{ConversationRecord, MessageKind, MessageRecord};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub thread_id: Option<String>,
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub thread_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UrlUploadRequest {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentUploadResponse {
    pub document_id: String,
    pub title: String,
    pub status: String,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserQuery {
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversationListResponse {
    pub conversations: Vec<ConversationDto>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversationMessagesResponse {
    pub conversation: ConversationDto,
    pub messages: Vec<MessageDto>,
    pub total_messages: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimpleMessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorDto {
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversationDto {
    pub conversation_id: String,
    pub user_id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub message_count: i64,
    pub last_message_preview: String,
}

impl From<ConversationRecord> for ConversationDto {
    fn from(record: ConversationRecord) -> Self {
        Self {
            conversation_id: record.conversation_id,
            user_id: record.user_id,
            title: record.title,
            created_at: record.created_at,
            updated_at: record.updated_at,
            message_count: record.message_count,
            last_message_preview: record.last_message_preview,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageDto {
    pub conversation_id: String,
    pub message_id: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl From<MessageRecord> for MessageDto {
    fn from(record: MessageRecord) -> Self {
        Self {
            conversation_id: record.conversation_id,
            message_id: record.message_id,
            kind: record.kind,
            content: record.content,
            timestamp: record.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn chat_request_accepts_missing_thread_id() {
        let request: ChatRequest =
            serde_json::from_str(r#"{"message": "hi", "user_id": "u1"}"#).unwrap();

        assert_eq!(request.message, "hi");
        assert_eq!(request.thread_id, None);
    }

    #[test]
    fn chat_response_field_names_match_the_api() {
        let response = ChatResponse {
            response: "hello".to_string(),
            thread_id: "t1".to_string(),
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["response"], "hello");
        assert_eq!(value["thread_id"], "t1");
    }

    #[test]
    fn message_dto_uses_type_field_and_rfc3339_timestamps() {
        let record = MessageRecord {
            conversation_id: "c1".to_string(),
            message_id: "m1".to_string(),
            kind: MessageKind::User,
            content: "hi".to_string(),
            timestamp: DateTime::from_timestamp(0, 0).unwrap(),
            metadata: Default::default(),
        };

        let value = serde_json::to_value(MessageDto::from(record)).unwrap();
        assert_eq!(value["type"], "user");
        assert_eq!(value["timestamp"], "1970-01-01T00:00:00Z");
    }
}
