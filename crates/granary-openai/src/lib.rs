use granary_traits::ai::embed::{self, EmbedderInner};
use granary_traits::ai::model::{self, Message, ModelInner, ToolSpec};

use async_trait::async_trait;

mod wire;
use wire::{
    ChatRequest, ChatResponse, EmbeddingsRequest, EmbeddingsResponse, WireMessage, WireTool,
};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

/// OpenAI-backed chat model and embedder, sharing one HTTP client.
#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    embedding_model: String,
}

impl OpenAiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            model: DEFAULT_CHAT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
        }
    }

    pub fn base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn embedding_model(mut self, embedding_model: String) -> Self {
        self.embedding_model = embedding_model;
        self
    }

    async fn post<Req: serde::Serialize, Resp: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        request: &Req,
    ) -> Result<Resp, reqwest::StatusCode> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                log::warn!("request to {} failed: {}", url, e);
                reqwest::StatusCode::INTERNAL_SERVER_ERROR
            })?;

        let status = response.status();
        if !status.is_success() {
            log::warn!("{} returned status {}", url, status);
            return Err(status);
        }

        response.json::<Resp>().await.map_err(|e| {
            log::warn!("failed to decode response from {}: {}", url, e);
            reqwest::StatusCode::INTERNAL_SERVER_ERROR
        })
    }
}

#[async_trait]
impl ModelInner for OpenAiClient {
    async fn chat(
        &self,
        messages: &[Message],
        tools: &[ToolSpec],
    ) -> Result<Message, model::ErrorCode> {
        let request = ChatRequest {
            model: self.model.clone(),
            temperature: self.temperature,
            messages: messages.iter().map(WireMessage::from).collect(),
            tools: if tools.is_empty() {
                None
            } else {
                Some(tools.iter().map(WireTool::from).collect())
            },
        };

        log::debug!(
            "chat completion: model={}, messages={}, tools={}",
            self.model,
            messages.len(),
            tools.len()
        );

        let response: ChatResponse =
            self.post("/chat/completions", &request)
                .await
                .map_err(|status| match status {
                    reqwest::StatusCode::UNAUTHORIZED => model::ErrorCode::Unauthorized,
                    _ => model::ErrorCode::RequestFailed,
                })?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or(model::ErrorCode::InvalidResponse)?;

        return Ok(choice.message.into());
    }
}

#[async_trait]
impl EmbedderInner for OpenAiClient {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, embed::ErrorCode> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbeddingsRequest {
            model: self.embedding_model.clone(),
            input: texts.to_vec(),
        };

        log::debug!(
            "embedding {} texts with {}",
            texts.len(),
            self.embedding_model
        );

        let response: EmbeddingsResponse = self
            .post("/embeddings", &request)
            .await
            .map_err(|_| embed::ErrorCode::RequestFailed)?;

        if response.data.len() != texts.len() {
            log::warn!(
                "embeddings response had {} entries for {} inputs",
                response.data.len(),
                texts.len()
            );
            return Err(embed::ErrorCode::InvalidResponse);
        }

        // The API is allowed to return entries out of order
        let mut entries = response.data;
        entries.sort_by_key(|entry| entry.index);

        return Ok(entries.into_iter().map(|entry| entry.embedding).collect());
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, embed::ErrorCode> {
        let mut vectors = self.embed(&[text.to_string()]).await?;
        vectors.pop().ok_or(embed::ErrorCode::InvalidResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use granary_traits::ai::model::{Role, ToolCall};
    use pretty_assertions::assert_eq;

    #[test]
    fn tool_spec_serializes_to_function_envelope() {
        let spec = ToolSpec {
            name: "retrieve".to_string(),
            description: "Retrieve information related to a query.".to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": { "query": { "type": "string" } },
                "required": ["query"],
            }),
        };

        let wire = WireTool::from(&spec);
        let value = serde_json::to_value(&wire).unwrap();

        assert_eq!(value["type"], "function");
        assert_eq!(value["function"]["name"], "retrieve");
        assert_eq!(value["function"]["parameters"]["required"][0], "query");
    }

    #[test]
    fn assistant_tool_calls_round_trip() {
        let mut message = Message::ai("");
        message.tool_calls = vec![ToolCall {
            id: "call_1".to_string(),
            name: "retrieve".to_string(),
            arguments: "{\"query\":\"chunk overlap\"}".to_string(),
        }];

        let wire = WireMessage::from(&message);
        assert_eq!(wire.role, "assistant");

        let back: Message = wire.into();
        assert_eq!(back.role, Role::Ai);
        assert_eq!(back.tool_calls, message.tool_calls);
    }

    #[test]
    fn chat_response_with_tool_calls_deserializes() {
        let body = r#"{
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_abc",
                        "type": "function",
                        "function": { "name": "retrieve", "arguments": "{\"query\":\"q\"}" }
                    }]
                }
            }]
        }"#;

        let response: ChatResponse = serde_json::from_str(body).unwrap();
        let message: Message = response.choices[0].message.clone().into();

        assert_eq!(message.content, "");
        assert_eq!(message.tool_calls.len(), 1);
        assert_eq!(message.tool_calls[0].name, "retrieve");
    }

    #[test]
    fn tool_result_message_carries_call_id() {
        let message = Message::tool("Source: {}\nContent: text", "call_abc");
        let wire = WireMessage::from(&message);

        assert_eq!(wire.role, "tool");
        assert_eq!(wire.tool_call_id.as_deref(), Some("call_abc"));
    }

    #[test]
    fn embeddings_entries_sort_by_index() {
        let body = r#"{
            "data": [
                { "index": 1, "embedding": [0.5] },
                { "index": 0, "embedding": [0.25] }
            ]
        }"#;

        let mut response: EmbeddingsResponse = serde_json::from_str(body).unwrap();
        response.data.sort_by_key(|entry| entry.index);

        assert_eq!(response.data[0].embedding, vec![0.25]);
        assert_eq!(response.data[1].embedding, vec![0.5]);
    }
}
