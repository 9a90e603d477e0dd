mod graph;

use granary_traits::ai::context::Checkpointer;
use granary_traits::ai::model::Model;
use granary_traits::ai::rag::Index;

use anyhow::Result;
use std::sync::Arc;
use uuid::Uuid;

pub const DEFAULT_RETRIEVAL_LIMIT: usize = 3;

const ASSISTANT_SYSTEM_PROMPT: &str = "You are an AI assistant that responds to questions based on stored documents. \
     Use the retrieval tool to find relevant information when needed. \
     If you don't know the answer, say so.";

const GROUNDED_SYSTEM_PROMPT: &str = "You are an AI assistant that helps users with information from their documents. \
     Use the following retrieved information to answer the question. \
     If you don't know the answer, say so clearly.";

pub struct EngineBuilder {
    model: Arc<Model>,
    index: Arc<Index>,
    checkpointer: Arc<Checkpointer>,
    retrieval_limit: usize,
    system_prompt: String,
    grounded_prompt: String,
}

impl EngineBuilder {
    pub fn new(model: Arc<Model>, index: Arc<Index>, checkpointer: Arc<Checkpointer>) -> Self {
        Self {
            model,
            index,
            checkpointer,
            retrieval_limit: DEFAULT_RETRIEVAL_LIMIT,
            system_prompt: ASSISTANT_SYSTEM_PROMPT.to_string(),
            grounded_prompt: GROUNDED_SYSTEM_PROMPT.to_string(),
        }
    }

    pub fn retrieval_limit(mut self, retrieval_limit: usize) -> Self {
        self.retrieval_limit = retrieval_limit;
        self
    }

    pub fn system_prompt(mut self, system_prompt: String) -> Self {
        self.system_prompt = system_prompt;
        self
    }

    pub fn grounded_prompt(mut self, grounded_prompt: String) -> Self {
        self.grounded_prompt = grounded_prompt;
        self
    }

    pub fn build(self) -> Engine {
        Engine {
            model: self.model,
            index: self.index,
            checkpointer: self.checkpointer,
            retrieval_limit: self.retrieval_limit,
            system_prompt: self.system_prompt,
            grounded_prompt: self.grounded_prompt,
        }
    }
}

/// The retrieval agent: one chat turn may answer directly or route through
/// the retrieve tool and a grounded second generation.
pub struct Engine {
    model: Arc<Model>,
    index: Arc<Index>,
    checkpointer: Arc<Checkpointer>,
    retrieval_limit: usize,
    system_prompt: String,
    grounded_prompt: String,
}

impl Engine {
    /// Process a user message within a thread, creating the thread when no id
    /// is given. Returns the assistant's answer and the thread id.
    pub async fn process_message(
        &self,
        message: &str,
        thread_id: Option<String>,
    ) -> Result<(String, String)> {
        let thread_id = thread_id.unwrap_or_else(|| Uuid::new_v4().to_string());

        let mut messages = self
            .checkpointer
            .get(&thread_id)
            .await
            .map_err(|e| anyhow::anyhow!("failed to restore thread {}: {}", thread_id, e))?
            .unwrap_or_default();

        let answer = graph::run(
            &*self.model,
            &*self.index,
            &mut messages,
            message,
            self.retrieval_limit,
            &self.system_prompt,
            &self.grounded_prompt,
        )
        .await?;

        self.checkpointer
            .put(&thread_id, &messages)
            .await
            .map_err(|e| anyhow::anyhow!("failed to save thread {}: {}", thread_id, e))?;

        return Ok((answer, thread_id));
    }
}
