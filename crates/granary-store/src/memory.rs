use crate::{cosine_similarity, parse_options};

use granary_traits::ai::embed::Embedder;
use granary_traits::ai::rag::{Chunk, ErrorCode, SearchOption, VectorIndexInner};

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

const INDEX_FILE: &str = "index.json";

/// In-process flat index: every vector is scored against the query, which is
/// exact and fine at the corpus sizes a single service instance holds.
pub struct MemoryVectorIndex {
    embedder: Arc<Embedder>,
    chunks: DashMap<String, StoredChunk>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredChunk {
    chunk: Chunk,
    embedding: Vec<f32>,
}

impl MemoryVectorIndex {
    pub fn new(embedder: Arc<Embedder>) -> Self {
        Self {
            embedder,
            chunks: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Persist the index to `dir/index.json`.
    pub fn save(&self, dir: &Path) -> anyhow::Result<()> {
        std::fs::create_dir_all(dir)?;

        let stored: Vec<StoredChunk> = self.chunks.iter().map(|entry| entry.value().clone()).collect();
        let encoded = serde_json::to_vec(&stored)?;
        std::fs::write(dir.join(INDEX_FILE), encoded)?;

        log::info!("saved {} chunks to {}", stored.len(), dir.display());

        Ok(())
    }

    /// Load a previously saved index; an unreadable file leaves the index
    /// empty rather than failing startup.
    pub fn load(&self, dir: &Path) {
        let path = dir.join(INDEX_FILE);
        let stored: Vec<StoredChunk> = match std::fs::read(&path)
            .map_err(anyhow::Error::from)
            .and_then(|bytes| serde_json::from_slice(&bytes).map_err(anyhow::Error::from))
        {
            Ok(stored) => stored,
            Err(e) => {
                log::warn!("could not load index from {}: {}", path.display(), e);
                return;
            }
        };

        self.chunks.clear();
        for chunk in stored {
            self.chunks.insert(Uuid::new_v4().to_string(), chunk);
        }

        log::info!("loaded {} chunks from {}", self.chunks.len(), path.display());
    }
}

#[async_trait]
impl VectorIndexInner for MemoryVectorIndex {
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

        for (chunk, embedding) in chunks.into_iter().zip(embeddings.into_iter()) {
            self.chunks
                .insert(Uuid::new_v4().to_string(), StoredChunk { chunk, embedding });
        }

        log::debug!("index now contains {} chunks", self.chunks.len());

        return Ok(());
    }

    async fn search(
        &self,
        query: &str,
        options: Vec<SearchOption>,
    ) -> Result<Vec<Chunk>, ErrorCode> {
        let parsed = parse_options(&options);

        if self.chunks.is_empty() {
            log::debug!("index is empty, returning no results");
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed_query(query).await.map_err(|e| {
            log::warn!("failed to embed query: {}", e);
            ErrorCode::EmbedFailed
        })?;

        let mut scored: Vec<(f32, Chunk)> = self
            .chunks
            .iter()
            .filter(|entry| match &parsed.user_id {
                Some(user_id) => {
                    entry.value().chunk.metadata.user_id.as_deref() == Some(user_id.as_str())
                }
                None => true,
            })
            .map(|entry| {
                let stored = entry.value();
                (
                    cosine_similarity(&query_embedding, &stored.embedding),
                    stored.chunk.clone(),
                )
            })
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(parsed.limit);

        log::debug!("found {} similar chunks", scored.len());

        return Ok(scored.into_iter().map(|(_, chunk)| chunk).collect());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use granary_traits::ai::embed::{self, EmbedderInner};
    use granary_traits::ai::rag::{ChunkMetadata, DocumentKind};
    use pretty_assertions::assert_eq;

    /// Embeds known words onto fixed axes so rankings are hand-checkable.
    struct StubEmbedder;

    #[async_trait]
    impl EmbedderInner for StubEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, embed::ErrorCode> {
            Ok(texts.iter().map(|t| vector_for(t)).collect())
        }

        async fn embed_query(&self, text: &str) -> Result<Vec<f32>, embed::ErrorCode> {
            Ok(vector_for(text))
        }
    }

    fn vector_for(text: &str) -> Vec<f32> {
        match text {
            "wheat" => vec![1.0, 0.0, 0.0],
            "barley" => vec![0.8, 0.6, 0.0],
            "tractor" => vec![0.0, 0.0, 1.0],
            _ => vec![0.0, 1.0, 0.0],
        }
    }

    fn chunk(content: &str, user_id: Option<&str>) -> Chunk {
        Chunk {
            content: content.to_string(),
            metadata: ChunkMetadata {
                source: "test.txt".to_string(),
                title: "test".to_string(),
                kind: DocumentKind::Text,
                user_id: user_id.map(|u| u.to_string()),
                parent_document_id: None,
                page: None,
                date_added: Utc::now(),
            },
        }
    }

    fn index() -> MemoryVectorIndex {
        let embedder: Box<dyn EmbedderInner> = Box::new(StubEmbedder);
        MemoryVectorIndex::new(Arc::new(embedder.into()))
    }

    #[tokio::test]
    async fn empty_index_returns_no_results() {
        let index = index();
        let results = index.search("wheat", Vec::new()).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn ranks_exact_match_first() {
        let index = index();
        index
            .add(vec![chunk("tractor", None), chunk("wheat", None), chunk("barley", None)])
            .await
            .unwrap();

        let results = index.search("wheat", Vec::new()).await.unwrap();

        assert_eq!(results[0].content, "wheat");
        assert_eq!(results[1].content, "barley");
    }

    #[tokio::test]
    async fn limit_option_truncates() {
        let index = index();
        index
            .add(vec![chunk("wheat", None), chunk("barley", None), chunk("tractor", None)])
            .await
            .unwrap();

        let options = vec![SearchOption {
            name: "limit".to_string(),
            value: "1".to_string(),
        }];
        let results = index.search("wheat", options).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].content, "wheat");
    }

    #[tokio::test]
    async fn user_option_filters_foreign_chunks() {
        let index = index();
        index
            .add(vec![chunk("wheat", Some("alice")), chunk("barley", Some("bob"))])
            .await
            .unwrap();

        let options = vec![SearchOption {
            name: "user".to_string(),
            value: "bob".to_string(),
        }];
        let results = index.search("wheat", options).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].content, "barley");
    }

    #[tokio::test]
    async fn save_and_load_preserve_chunks() {
        let index = index();
        index.add(vec![chunk("wheat", None)]).await.unwrap();

        let dir = std::env::temp_dir().join(format!("granary-test-{}", Uuid::new_v4()));
        index.save(&dir).unwrap();

        let restored = self::index();
        restored.load(&dir);
        assert_eq!(restored.len(), 1);

        let results = restored.search("wheat", Vec::new()).await.unwrap();
        assert_eq!(results[0].content, "wheat");

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
