use anyhow::Result;
use async_openai::{
    Client,
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs, ResponseFormat,
    },
};
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use std::pin::Pin;
use tracing::debug;

/// Represents the events that can be yielded from a streaming text response.
#[derive(Debug, Clone)]
pub enum LLMStreamEvent {
    TextChunk(String),
}

/// A stream of text chunks from the LLM.
pub type LLMStream = Pin<Box<dyn Stream<Item = Result<LLMStreamEvent, OpenAIError>> + Send>>;

/// A single-turn request: one system instruction and one user instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Model name as the provider knows it (e.g. "llama-3.3-70b-versatile").
    pub model: String,
    pub system: String,
    pub user: String,
    pub temperature: f32,
    /// Ask the provider for a JSON object response.
    pub json_mode: bool,
}

/// A generic client for interacting with an LLM.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Makes a single, non-streaming call and returns the first choice's text.
    ///
    /// `Ok(None)` means the provider answered without any text, which is
    /// distinct from answering with an empty string.
    async fn complete(&self, request: CompletionRequest) -> Result<Option<String>>;

    /// Makes a streaming call, yielding text chunks as they arrive.
    async fn stream(&self, request: CompletionRequest) -> Result<LLMStream>;
}

/// An implementation of `LLMClient` for any OpenAI-compatible API.
pub struct OpenAICompatibleClient {
    client: Client<OpenAIConfig>,
}

impl OpenAICompatibleClient {
    /// Creates a new client for an OpenAI-compatible service.
    ///
    /// # Arguments
    ///
    /// * `config` - The configuration for the OpenAI client, including API key and base URL.
    pub fn new(config: OpenAIConfig) -> Self {
        Self {
            client: Client::with_config(config),
        }
    }

    fn build_request(
        request: CompletionRequest,
        stream: bool,
    ) -> Result<CreateChatCompletionRequest> {
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(request.model)
            .temperature(request.temperature)
            .stream(stream)
            .messages(vec![
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(request.system)
                    .build()?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(request.user)
                    .build()?
                    .into(),
            ]);
        if request.json_mode {
            args.response_format(ResponseFormat::JsonObject);
        }
        Ok(args.build()?)
    }
}

#[async_trait]
impl LLMClient for OpenAICompatibleClient {
    async fn complete(&self, request: CompletionRequest) -> Result<Option<String>> {
        debug!(model = %request.model, json_mode = request.json_mode, "Sending completion request");
        let request = Self::build_request(request, false)?;
        let response = self.client.chat().create(request).await?;

        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content))
    }

    async fn stream(&self, request: CompletionRequest) -> Result<LLMStream> {
        debug!(model = %request.model, "Opening completion stream");
        let request = Self::build_request(request, true)?;
        let stream = self.client.chat().create_stream(request).await?;

        Ok(Box::pin(stream.filter_map(|result| async move {
            match result {
                Ok(response) => response
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|choice| choice.delta.content)
                    .map(|content| Ok(LLMStreamEvent::TextChunk(content))),
                Err(e) => Some(Err(e)),
            }
        })))
    }
}
