use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use granary_traits::ai::rag::ChunkMetadata;
use serde::{Deserialize, Serialize};

/// One conversation thread, as stored in the `conversations` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub conversation_id: String,
    pub user_id: String,
    pub title: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
    pub message_count: i64,
    pub last_message_preview: String,
}

impl ConversationRecord {
    pub fn new(conversation_id: String, user_id: String, title: String) -> Self {
        let now = Utc::now();
        Self {
            conversation_id,
            user_id,
            title,
            created_at: now,
            updated_at: now,
            message_count: 0,
            last_message_preview: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    User,
    Ai,
}

/// One chat turn, as stored in the `messages` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub conversation_id: String,
    pub message_id: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub content: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub timestamp: DateTime<Utc>,
    pub metadata: MessageMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// A full source document, as stored in the `documents` collection. Chunk
/// vectors reference back through `parent_document_id` in their metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub content: String,
    pub metadata: ChunkMetadata,
    pub user_id: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub date_added: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn message_kind_uses_original_type_field() {
        let record = MessageRecord {
            conversation_id: "c1".to_string(),
            message_id: "m1".to_string(),
            kind: MessageKind::Ai,
            content: "hello".to_string(),
            timestamp: Utc::now(),
            metadata: MessageMetadata {
                model_used: Some("gpt-3.5-turbo".to_string()),
                temperature: Some(0.2),
                ..Default::default()
            },
        };

        let doc = bson::to_document(&record).unwrap();
        assert_eq!(doc.get_str("type").unwrap(), "ai");
        assert!(doc.get_document("metadata").unwrap().get("user_id").is_none());
    }

    #[test]
    fn new_conversation_starts_empty() {
        let record = ConversationRecord::new(
            "c1".to_string(),
            "u1".to_string(),
            "New Conversation".to_string(),
        );

        assert_eq!(record.message_count, 0);
        assert_eq!(record.last_message_preview, "");
        assert_eq!(record.created_at, record.updated_at);
    }
}
