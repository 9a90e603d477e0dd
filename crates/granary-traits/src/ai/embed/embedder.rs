use super::errors::ErrorCode;

use async_trait::async_trait;

#[async_trait]
pub trait EmbedderInner: Send + Sync {
    /// Embed a batch of texts, one vector per input, in input order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ErrorCode>;

    /// Embed a single query string.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, ErrorCode>;
}

/// A backend-defined embedder.
pub struct Embedder(Box<dyn EmbedderInner>);
impl From<Box<dyn EmbedderInner>> for Embedder {
    fn from(value: Box<dyn EmbedderInner>) -> Self {
        Self(value)
    }
}
impl std::ops::Deref for Embedder {
    type Target = dyn EmbedderInner;
    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}
impl std::ops::DerefMut for Embedder {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.0.as_mut()
    }
}
