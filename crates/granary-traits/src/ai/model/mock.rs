use super::errors::ErrorCode;
use super::model::{Message, ModelInner, ToolSpec};

use async_trait::async_trait;

#[derive(Default)]
pub struct MockModelInner {}

#[async_trait]
impl ModelInner for MockModelInner {
    async fn chat(&self, _messages: &[Message], _tools: &[ToolSpec]) -> Result<Message, ErrorCode> {
        return Err(ErrorCode::NotEnabled);
    }
}
