use crate::records::{ConversationRecord, DocumentRecord, MessageRecord};

use bson::doc;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{Collection, Database};

const CONVERSATION_LIST_LIMIT: i64 = 50;

pub struct ConversationRepository {
    collection: Collection<ConversationRecord>,
}

impl ConversationRepository {
    pub fn new(db: &Database, collection: &str) -> Self {
        Self {
            collection: db.collection(collection),
        }
    }

    pub async fn create(&self, record: &ConversationRecord) -> mongodb::error::Result<()> {
        self.collection.insert_one(record).await?;
        Ok(())
    }

    /// Most recently updated conversations for a user.
    pub async fn list_for_user(
        &self,
        user_id: &str,
    ) -> mongodb::error::Result<Vec<ConversationRecord>> {
        let cursor = self
            .collection
            .find(doc! { "user_id": user_id })
            .sort(doc! { "updated_at": -1 })
            .limit(CONVERSATION_LIST_LIMIT)
            .await?;

        cursor.try_collect().await
    }

    pub async fn find(
        &self,
        conversation_id: &str,
    ) -> mongodb::error::Result<Option<ConversationRecord>> {
        self.collection
            .find_one(doc! { "conversation_id": conversation_id })
            .await
    }

    pub async fn find_for_user(
        &self,
        conversation_id: &str,
        user_id: &str,
    ) -> mongodb::error::Result<Option<ConversationRecord>> {
        self.collection
            .find_one(doc! { "conversation_id": conversation_id, "user_id": user_id })
            .await
    }

    /// Record chat activity: bump the timestamp, refresh the preview and count
    /// the new messages.
    pub async fn touch(
        &self,
        conversation_id: &str,
        preview: &str,
        messages_added: i64,
    ) -> mongodb::error::Result<()> {
        self.collection
            .update_one(
                doc! { "conversation_id": conversation_id },
                doc! {
                    "$set": {
                        "updated_at": bson::DateTime::from_chrono(Utc::now()),
                        "last_message_preview": preview,
                    },
                    "$inc": { "message_count": messages_added },
                },
            )
            .await?;

        Ok(())
    }

    pub async fn delete(&self, conversation_id: &str) -> mongodb::error::Result<()> {
        self.collection
            .delete_one(doc! { "conversation_id": conversation_id })
            .await?;

        Ok(())
    }
}

pub struct MessageRepository {
    collection: Collection<MessageRecord>,
}

impl MessageRepository {
    pub fn new(db: &Database, collection: &str) -> Self {
        Self {
            collection: db.collection(collection),
        }
    }

    pub async fn insert(&self, record: &MessageRecord) -> mongodb::error::Result<()> {
        self.collection.insert_one(record).await?;
        Ok(())
    }

    /// All messages of a conversation in chronological order.
    pub async fn list_for_conversation(
        &self,
        conversation_id: &str,
    ) -> mongodb::error::Result<Vec<MessageRecord>> {
        let cursor = self
            .collection
            .find(doc! { "conversation_id": conversation_id })
            .sort(doc! { "timestamp": 1 })
            .await?;

        cursor.try_collect().await
    }

    pub async fn delete_for_conversation(
        &self,
        conversation_id: &str,
    ) -> mongodb::error::Result<u64> {
        let result = self
            .collection
            .delete_many(doc! { "conversation_id": conversation_id })
            .await?;

        Ok(result.deleted_count)
    }
}

pub struct DocumentRepository {
    collection: Collection<DocumentRecord>,
}

impl DocumentRepository {
    pub fn new(db: &Database, collection: &str) -> Self {
        Self {
            collection: db.collection(collection),
        }
    }

    pub async fn insert(&self, record: &DocumentRecord) -> mongodb::error::Result<()> {
        self.collection.insert_one(record).await?;
        Ok(())
    }
}
