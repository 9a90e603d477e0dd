use super::errors::ErrorCode;
use super::rag::{Chunk, SearchOption, VectorIndexInner};

use async_trait::async_trait;

#[derive(Default)]
pub struct MockVectorIndexInner {}

#[async_trait]
impl VectorIndexInner for MockVectorIndexInner {
    async fn add(&self, _chunks: Vec<Chunk>) -> Result<(), ErrorCode> {
        return Err(ErrorCode::NotEnabled);
    }

    async fn search(
        &self,
        _query: &str,
        _options: Vec<SearchOption>,
    ) -> Result<Vec<Chunk>, ErrorCode> {
        return Err(ErrorCode::NotEnabled);
    }
}
