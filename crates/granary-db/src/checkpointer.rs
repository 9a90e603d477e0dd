use granary_traits::ai::context::{CheckpointerInner, ErrorCode};
use granary_traits::ai::model::Message;

use async_trait::async_trait;
use bson::doc;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{Collection, Database};
use serde::{Deserialize, Serialize};

/// Thread transcripts persisted to the `chat_history` collection, one
/// document per thread, replaced wholesale on save.
pub struct MongoCheckpointer {
    collection: Collection<ThreadStateRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ThreadStateRecord {
    thread_id: String,
    state: Vec<Message>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    updated_at: DateTime<Utc>,
}

impl MongoCheckpointer {
    pub fn new(db: &Database, collection: &str) -> Self {
        Self {
            collection: db.collection(collection),
        }
    }
}

#[async_trait]
impl CheckpointerInner for MongoCheckpointer {
    async fn get(&self, thread_id: &str) -> Result<Option<Vec<Message>>, ErrorCode> {
        let record = self
            .collection
            .find_one(doc! { "thread_id": thread_id })
            .await
            .map_err(|e| {
                log::warn!("failed to load thread {}: {}", thread_id, e);
                ErrorCode::LoadFailed
            })?;

        return Ok(record.map(|r| r.state));
    }

    async fn put(&self, thread_id: &str, messages: &[Message]) -> Result<(), ErrorCode> {
        let state = bson::to_bson(&messages).map_err(|e| {
            log::warn!("failed to encode thread {}: {}", thread_id, e);
            ErrorCode::SaveFailed
        })?;

        self.collection
            .update_one(
                doc! { "thread_id": thread_id },
                doc! {
                    "$set": {
                        "state": state,
                        "updated_at": bson::DateTime::from_chrono(Utc::now()),
                    },
                },
            )
            .upsert(true)
            .await
            .map_err(|e| {
                log::warn!("failed to save thread {}: {}", thread_id, e);
                ErrorCode::SaveFailed
            })?;

        return Ok(());
    }

    async fn list(&self) -> Result<Vec<String>, ErrorCode> {
        let cursor = self.collection.find(doc! {}).await.map_err(|e| {
            log::warn!("failed to list threads: {}", e);
            ErrorCode::LoadFailed
        })?;

        let records: Vec<ThreadStateRecord> = cursor.try_collect().await.map_err(|e| {
            log::warn!("failed to read thread listing: {}", e);
            ErrorCode::LoadFailed
        })?;

        return Ok(records.into_iter().map(|r| r.thread_id).collect());
    }
}
