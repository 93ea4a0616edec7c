use crate::provider::Provider;
use async_openai::error::OpenAIError;

/// Errors raised by the [`crate::tutor::Tutor`].
#[derive(Debug, thiserror::Error)]
pub enum TutorError {
    /// A provider that needs a credential has none configured.
    #[error("No API key for '{provider}'. Set {env_var} or run `groqmate configure`")]
    MissingApiKey {
        provider: Provider,
        env_var: &'static str,
    },
    /// The model answered without any content.
    #[error("Empty response from the model")]
    EmptyResponse,
    /// The model's lesson plan was not valid JSON of the expected shape.
    #[error("Malformed lesson plan: {0}")]
    MalformedPlan(#[from] serde_json::Error),
    /// The gateway call itself failed.
    #[error("Model request failed: {0}")]
    Gateway(#[from] anyhow::Error),
    /// A streamed response broke off.
    #[error("Model stream failed: {0}")]
    Stream(#[from] OpenAIError),
}
