use granary_traits::ai::model::{Message, Model, Role, ToolSpec};
use granary_traits::ai::rag::{Chunk, Index, SearchOption};

use anyhow::Result;

const RETRIEVE_TOOL: &str = "retrieve";

fn retrieve_tool_spec() -> ToolSpec {
    ToolSpec {
        name: RETRIEVE_TOOL.to_string(),
        description: "Retrieve information related to a query.".to_string(),
        parameters: serde_json::json!({
            "type": "object",
            "properties": {
                "query": { "type": "string" }
            },
            "required": ["query"],
        }),
    }
}

/// One turn of the agent graph: query-or-respond, then optionally the tool
/// node and a grounded generation. Appends everything it produces to
/// `messages` and returns the final answer.
pub(crate) async fn run(
    model: &Model,
    index: &Index,
    messages: &mut Vec<Message>,
    user_message: &str,
    retrieval_limit: usize,
    system_prompt: &str,
    grounded_prompt: &str,
) -> Result<String> {
    messages.push(Message::human(user_message));

    // query_or_respond: let the model answer directly or ask for retrieval
    if !messages.iter().any(|m| m.role == Role::System) {
        messages.insert(0, Message::system(system_prompt));
    }

    let tools = [retrieve_tool_spec()];
    let response = model
        .chat(messages, &tools)
        .await
        .map_err(|e| anyhow::anyhow!("chat model error: {}", e))?;
    messages.push(response.clone());

    if !response.has_tool_calls() {
        return Ok(response.content);
    }

    // tools: execute every requested retrieval
    for call in &response.tool_calls {
        let serialized = match parse_query(&call.arguments) {
            Some(query) => {
                let options = vec![SearchOption {
                    name: "limit".to_string(),
                    value: retrieval_limit.to_string(),
                }];
                let chunks = index
                    .search(&query, options)
                    .await
                    .map_err(|e| anyhow::anyhow!("retrieval error: {}", e))?;
                log::debug!("retrieved {} chunks for {:?}", chunks.len(), query);
                serialize_chunks(&chunks)
            }
            None => {
                log::warn!("unparseable retrieve arguments: {}", call.arguments);
                String::new()
            }
        };

        messages.push(Message::tool(serialized, call.id.clone()));
    }

    // generate: answer again, grounded in what the tool returned
    let prompt = grounded_messages(messages, grounded_prompt);
    let response = model
        .chat(&prompt, &[])
        .await
        .map_err(|e| anyhow::anyhow!("chat model error: {}", e))?;
    messages.push(response.clone());

    return Ok(response.content);
}

fn parse_query(arguments: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(arguments)
        .ok()?
        .get("query")?
        .as_str()
        .map(|s| s.to_string())
}

fn serialize_chunks(chunks: &[Chunk]) -> String {
    chunks
        .iter()
        .map(|chunk| {
            let metadata =
                serde_json::to_string(&chunk.metadata).unwrap_or_else(|_| "{}".to_string());
            format!("Source: {}\nContent: {}", metadata, chunk.content)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Prompt for the grounded pass: a system message embedding the retrieved
/// content, then the conversation without tool traffic.
fn grounded_messages(messages: &[Message], grounded_prompt: &str) -> Vec<Message> {
    // The tool results sit at the tail of the transcript
    let mut tool_messages: Vec<&Message> = messages
        .iter()
        .rev()
        .take_while(|m| m.role == Role::Tool)
        .collect();
    tool_messages.reverse();

    let docs_content = tool_messages
        .iter()
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    let system = Message::system(format!("{}\n\n{}", grounded_prompt, docs_content));

    let conversation = messages.iter().filter(|m| {
        matches!(m.role, Role::Human | Role::System)
            || (m.role == Role::Ai && !m.has_tool_calls())
    });

    std::iter::once(system)
        .chain(conversation.cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EngineBuilder;
    use granary_traits::ai::context::{self, CheckpointerInner};
    use granary_traits::ai::model::{ModelInner, ToolCall};
    use granary_traits::ai::rag::{self, ChunkMetadata, DocumentKind, VectorIndexInner};

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Pops canned replies and records every prompt it was given.
    struct ScriptedModel {
        replies: Mutex<Vec<Message>>,
        seen: Arc<Mutex<Vec<Vec<Message>>>>,
        seen_tools: Arc<Mutex<Vec<usize>>>,
    }

    #[async_trait]
    impl ModelInner for ScriptedModel {
        async fn chat(
            &self,
            messages: &[Message],
            tools: &[ToolSpec],
        ) -> Result<Message, granary_traits::ai::model::ErrorCode> {
            self.seen.lock().unwrap().push(messages.to_vec());
            self.seen_tools.lock().unwrap().push(tools.len());
            Ok(self.replies.lock().unwrap().remove(0))
        }
    }

    struct StaticIndex {
        chunks: Vec<Chunk>,
        queries: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl VectorIndexInner for StaticIndex {
        async fn add(&self, _chunks: Vec<Chunk>) -> Result<(), rag::ErrorCode> {
            Ok(())
        }

        async fn search(
            &self,
            query: &str,
            _options: Vec<SearchOption>,
        ) -> Result<Vec<Chunk>, rag::ErrorCode> {
            self.queries.lock().unwrap().push(query.to_string());
            Ok(self.chunks.clone())
        }
    }

    #[derive(Default)]
    struct MapCheckpointer {
        threads: Mutex<HashMap<String, Vec<Message>>>,
    }

    #[async_trait]
    impl CheckpointerInner for MapCheckpointer {
        async fn get(&self, thread_id: &str) -> Result<Option<Vec<Message>>, context::ErrorCode> {
            Ok(self.threads.lock().unwrap().get(thread_id).cloned())
        }

        async fn put(
            &self,
            thread_id: &str,
            messages: &[Message],
        ) -> Result<(), context::ErrorCode> {
            self.threads
                .lock()
                .unwrap()
                .insert(thread_id.to_string(), messages.to_vec());
            Ok(())
        }

        async fn list(&self) -> Result<Vec<String>, context::ErrorCode> {
            Ok(self.threads.lock().unwrap().keys().cloned().collect())
        }
    }

    fn chunk(content: &str) -> Chunk {
        Chunk {
            content: content.to_string(),
            metadata: ChunkMetadata {
                source: "notes.txt".to_string(),
                title: "notes".to_string(),
                kind: DocumentKind::Text,
                user_id: None,
                parent_document_id: None,
                page: None,
                date_added: chrono_epoch(),
            },
        }
    }

    fn chrono_epoch() -> chrono::DateTime<chrono::Utc> {
        chrono::DateTime::from_timestamp(0, 0).unwrap()
    }

    struct Harness {
        engine: crate::Engine,
        seen: Arc<Mutex<Vec<Vec<Message>>>>,
        seen_tools: Arc<Mutex<Vec<usize>>>,
        queries: Arc<Mutex<Vec<String>>>,
        checkpointer: Arc<granary_traits::ai::context::Checkpointer>,
    }

    fn harness(replies: Vec<Message>, chunks: Vec<Chunk>) -> Harness {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_tools = Arc::new(Mutex::new(Vec::new()));
        let queries = Arc::new(Mutex::new(Vec::new()));

        let model: Box<dyn ModelInner> = Box::new(ScriptedModel {
            replies: Mutex::new(replies),
            seen: seen.clone(),
            seen_tools: seen_tools.clone(),
        });
        let index: Box<dyn VectorIndexInner> = Box::new(StaticIndex {
            chunks,
            queries: queries.clone(),
        });
        let boxed: Box<dyn CheckpointerInner> = Box::new(MapCheckpointer::default());
        let checkpointer = Arc::new(granary_traits::ai::context::Checkpointer::from(boxed));

        let engine = EngineBuilder::new(
            Arc::new(Model::from(model)),
            Arc::new(Index::from(index)),
            checkpointer.clone(),
        )
        .build();

        Harness {
            engine,
            seen,
            seen_tools,
            queries,
            checkpointer,
        }
    }

    fn tool_call_reply(query: &str) -> Message {
        let mut reply = Message::ai("");
        reply.tool_calls = vec![ToolCall {
            id: "call_1".to_string(),
            name: "retrieve".to_string(),
            arguments: format!("{{\"query\":\"{}\"}}", query),
        }];
        reply
    }

    #[tokio::test]
    async fn direct_answer_short_circuits() {
        let h = harness(vec![Message::ai("hello there")], Vec::new());

        let (answer, thread_id) = h.engine.process_message("hi", None).await.unwrap();

        assert_eq!(answer, "hello there");
        assert_eq!(h.seen.lock().unwrap().len(), 1);
        assert!(h.queries.lock().unwrap().is_empty());

        // Transcript: injected system prompt, the human turn, the answer
        let saved = h.checkpointer.get(&thread_id).await.unwrap().unwrap();
        let roles: Vec<Role> = saved.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::Human, Role::Ai]);
    }

    #[tokio::test]
    async fn tool_call_routes_through_grounded_generation() {
        let h = harness(
            vec![tool_call_reply("silo moisture"), Message::ai("keep it below 14%")],
            vec![chunk("Grain keeps best below 14% moisture.")],
        );

        let (answer, _) = h
            .engine
            .process_message("how dry should grain be?", None)
            .await
            .unwrap();

        assert_eq!(answer, "keep it below 14%");
        assert_eq!(h.queries.lock().unwrap().as_slice(), ["silo moisture"]);

        // First call offers the retrieve tool, the grounded pass does not
        assert_eq!(h.seen_tools.lock().unwrap().as_slice(), [1, 0]);

        // The grounded prompt embeds the retrieved content and hides the
        // tool traffic from the conversation
        let seen = h.seen.lock().unwrap();
        let grounded = &seen[1];
        assert!(grounded[0].content.contains("Grain keeps best below 14% moisture."));
        assert!(grounded.iter().all(|m| m.role != Role::Tool));
        assert!(grounded.iter().all(|m| !m.has_tool_calls()));
    }

    #[tokio::test]
    async fn system_prompt_is_injected_once() {
        let h = harness(
            vec![Message::ai("first"), Message::ai("second")],
            Vec::new(),
        );

        let (_, thread_id) = h.engine.process_message("one", None).await.unwrap();
        h.engine
            .process_message("two", Some(thread_id.clone()))
            .await
            .unwrap();

        let second_prompt = &h.seen.lock().unwrap()[1];
        let system_count = second_prompt
            .iter()
            .filter(|m| m.role == Role::System)
            .count();
        assert_eq!(system_count, 1);

        // The restored thread carried the first exchange forward
        assert!(second_prompt.iter().any(|m| m.content == "one"));
        assert!(second_prompt.iter().any(|m| m.content == "first"));
    }

    #[tokio::test]
    async fn reused_thread_id_is_returned_unchanged() {
        let h = harness(vec![Message::ai("a"), Message::ai("b")], Vec::new());

        let (_, first) = h.engine.process_message("one", None).await.unwrap();
        let (_, second) = h
            .engine
            .process_message("two", Some(first.clone()))
            .await
            .unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn unparseable_tool_arguments_yield_empty_retrieval() {
        let mut bad_call = Message::ai("");
        bad_call.tool_calls = vec![ToolCall {
            id: "call_1".to_string(),
            name: "retrieve".to_string(),
            arguments: "not json".to_string(),
        }];

        let h = harness(
            vec![bad_call, Message::ai("best effort answer")],
            vec![chunk("never retrieved")],
        );

        let (answer, _) = h.engine.process_message("hm", None).await.unwrap();

        assert_eq!(answer, "best effort answer");
        // The index was never queried
        assert!(h.queries.lock().unwrap().is_empty());
    }
}
