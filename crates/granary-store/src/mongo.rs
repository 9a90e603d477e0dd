use crate::{cosine_similarity, parse_options};

use granary_traits::ai::embed::Embedder;
use granary_traits::ai::rag::{Chunk, ChunkMetadata, ErrorCode, SearchOption, VectorIndexInner};

use async_trait::async_trait;
use bson::doc;
use futures::TryStreamExt;
use mongodb::{Collection, Database};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Chunk vectors persisted to the `vectors` collection.
///
/// Candidates are fetched and ranked by cosine similarity in process; on
/// MongoDB Atlas a `$vectorSearch` aggregation would replace the scan.
pub struct MongoVectorIndex {
    collection: Collection<VectorRecord>,
    embedder: Arc<Embedder>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct VectorRecord {
    content: String,
    embedding: Vec<f32>,
    metadata: ChunkMetadata,
}

impl MongoVectorIndex {
    pub fn new(db: &Database, collection: &str, embedder: Arc<Embedder>) -> Self {
        Self {
            collection: db.collection(collection),
            embedder,
        }
    }
}

#[async_trait]
impl VectorIndexInner for MongoVectorIndex {
    async fn add(&self, chunks: Vec<Chunk>) -> Result<(), ErrorCode> {
        if chunks.is_empty() {
            log::debug!("no chunks to add");
            return Ok(());
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed(&texts).await.map_err(|e| {
            log::warn!("failed to embed {} chunks: {}", texts.len(), e);
            ErrorCode::EmbedFailed
        })?;

        let records: Vec<VectorRecord> = chunks
            .into_iter()
            .zip(embeddings.into_iter())
            .map(|(chunk, embedding)| VectorRecord {
                content: chunk.content,
                embedding,
                metadata: chunk.metadata,
            })
            .collect();

        let inserted = records.len();
        self.collection.insert_many(records).await.map_err(|e| {
            log::warn!("failed to insert vectors: {}", e);
            ErrorCode::InsertFailed
        })?;

        log::debug!("stored {} chunk vectors", inserted);

        return Ok(());
    }

    async fn search(
        &self,
        query: &str,
        options: Vec<SearchOption>,
    ) -> Result<Vec<Chunk>, ErrorCode> {
        let parsed = parse_options(&options);

        let query_embedding = self.embedder.embed_query(query).await.map_err(|e| {
            log::warn!("failed to embed query: {}", e);
            ErrorCode::EmbedFailed
        })?;

        // Build query filter
        let filter = match &parsed.user_id {
            Some(user_id) => doc! { "metadata.user_id": user_id },
            None => doc! {},
        };

        let cursor = self.collection.find(filter).await.map_err(|e| {
            log::warn!("vector query failed: {}", e);
            ErrorCode::QueryFailed
        })?;
        let records: Vec<VectorRecord> = cursor.try_collect().await.map_err(|e| {
            log::warn!("failed to read vector records: {}", e);
            ErrorCode::QueryFailed
        })?;

        let mut scored: Vec<(f32, Chunk)> = records
            .into_iter()
            .map(|record| {
                (
                    cosine_similarity(&query_embedding, &record.embedding),
                    Chunk {
                        content: record.content,
                        metadata: record.metadata,
                    },
                )
            })
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(parsed.limit);

        log::debug!("found {} similar chunks", scored.len());

        return Ok(scored.into_iter().map(|(_, chunk)| chunk).collect());
    }
}
