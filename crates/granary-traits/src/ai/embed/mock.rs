use super::embedder::EmbedderInner;
use super::errors::ErrorCode;

use async_trait::async_trait;

#[derive(Default)]
pub struct MockEmbedderInner {}

#[async_trait]
impl EmbedderInner for MockEmbedderInner {
    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, ErrorCode> {
        return Err(ErrorCode::NotEnabled);
    }

    async fn embed_query(&self, _text: &str) -> Result<Vec<f32>, ErrorCode> {
        return Err(ErrorCode::NotEnabled);
    }
}
