use crate::loaders::SourceDocument;
use crate::splitter::TextSplitter;
use crate::IngestError;

use granary_db::records::DocumentRecord;
use granary_db::repository::DocumentRepository;
use granary_traits::ai::rag::{Chunk, Index};

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Splits loaded documents, stores the originals and feeds the chunks to the
/// vector index.
pub struct DocumentProcessor {
    splitter: TextSplitter,
    documents: DocumentRepository,
    index: Arc<Index>,
}

impl DocumentProcessor {
    pub fn new(documents: DocumentRepository, index: Arc<Index>, splitter: TextSplitter) -> Self {
        Self {
            splitter,
            documents,
            index,
        }
    }

    /// Store each document and index its chunks; returns the new document ids
    /// in input order.
    pub async fn process_and_store(
        &self,
        documents: Vec<SourceDocument>,
        user_id: &str,
    ) -> Result<Vec<String>, IngestError> {
        let mut document_ids = Vec::with_capacity(documents.len());
        let mut chunks: Vec<Chunk> = Vec::new();

        for document in &documents {
            let document_id = Uuid::new_v4().to_string();

            let record = DocumentRecord {
                id: document_id.clone(),
                content: document.content.clone(),
                metadata: document.metadata.clone(),
                user_id: user_id.to_string(),
                date_added: Utc::now(),
            };
            self.documents
                .insert(&record)
                .await
                .map_err(|e| IngestError::Process(e.to_string()))?;

            for piece in self.splitter.split(&document.content) {
                let mut metadata = document.metadata.clone();
                metadata.parent_document_id = Some(document_id.clone());
                metadata.user_id = Some(user_id.to_string());

                chunks.push(Chunk {
                    content: piece,
                    metadata,
                });
            }

            document_ids.push(document_id);
        }

        log::debug!(
            "processed {} documents into {} chunks",
            document_ids.len(),
            chunks.len()
        );

        self.index
            .add(chunks)
            .await
            .map_err(|e| IngestError::Process(e.to_string()))?;

        return Ok(document_ids);
    }
}
