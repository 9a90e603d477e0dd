use super::errors::ErrorCode;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[async_trait]
pub trait VectorIndexInner: Send + Sync {
    /// Embed and store a batch of chunks.
    async fn add(&self, chunks: Vec<Chunk>) -> Result<(), ErrorCode>;

    /// Search the index with a natural-language query. Options are parsed by
    /// the backend; unknown names are logged and skipped.
    async fn search(
        &self,
        query: &str,
        options: Vec<SearchOption>,
    ) -> Result<Vec<Chunk>, ErrorCode>;
}

/// A backend-defined vector index.
pub struct Index(Box<dyn VectorIndexInner>);
impl From<Box<dyn VectorIndexInner>> for Index {
    fn from(value: Box<dyn VectorIndexInner>) -> Self {
        Self(value)
    }
}
impl std::ops::Deref for Index {
    type Target = dyn VectorIndexInner;
    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}
impl std::ops::DerefMut for Index {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.0.as_mut()
    }
}

/// A piece of source-document text, small enough to embed as one vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub content: String,
    pub metadata: ChunkMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub source: String,
    pub title: String,
    pub kind: DocumentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_document_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    pub date_added: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Url,
    Pdf,
    Text,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DocumentKind::Url => write!(f, "url"),
            DocumentKind::Pdf => write!(f, "pdf"),
            DocumentKind::Text => write!(f, "text"),
        }
    }
}

/// A search option.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOption {
    pub name: String,
    pub value: String,
}
