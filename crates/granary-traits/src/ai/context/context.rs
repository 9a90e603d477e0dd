use super::errors::ErrorCode;
use crate::ai::model::Message;

use async_trait::async_trait;

#[async_trait]
pub trait CheckpointerInner: Send + Sync {
    /// Load the transcript saved for a thread, if any.
    async fn get(&self, thread_id: &str) -> Result<Option<Vec<Message>>, ErrorCode>;

    /// Save the transcript for a thread, replacing any previous state.
    async fn put(&self, thread_id: &str, messages: &[Message]) -> Result<(), ErrorCode>;

    /// List all known thread ids.
    async fn list(&self) -> Result<Vec<String>, ErrorCode>;
}

/// A backend-defined checkpointer.
pub struct Checkpointer(Box<dyn CheckpointerInner>);
impl From<Box<dyn CheckpointerInner>> for Checkpointer {
    fn from(value: Box<dyn CheckpointerInner>) -> Self {
        Self(value)
    }
}
impl std::ops::Deref for Checkpointer {
    type Target = dyn CheckpointerInner;
    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}
impl std::ops::DerefMut for Checkpointer {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.0.as_mut()
    }
}
