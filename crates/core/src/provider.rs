//! Language-model providers and model resolution.
//!
//! Every supported provider exposes an OpenAI-compatible chat completions
//! endpoint, so the only per-provider knowledge needed is its base URL, its
//! default model and where its credential lives.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Defines the supported language-model providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Groq,
    Gemini,
    OpenAI,
    DeepSeek,
    OpenRouter,
    Ollama,
    Anthropic,
    Mistral,
}

/// Error returned when parsing an unknown provider name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown provider '{0}'. Expected one of: groq, gemini, openai, deepseek, openrouter, ollama, anthropic, mistral")]
pub struct ProviderParseError(pub String);

impl Provider {
    pub const ALL: [Provider; 8] = [
        Provider::Groq,
        Provider::Gemini,
        Provider::OpenAI,
        Provider::DeepSeek,
        Provider::OpenRouter,
        Provider::Ollama,
        Provider::Anthropic,
        Provider::Mistral,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Provider::Groq => "groq",
            Provider::Gemini => "gemini",
            Provider::OpenAI => "openai",
            Provider::DeepSeek => "deepseek",
            Provider::OpenRouter => "openrouter",
            Provider::Ollama => "ollama",
            Provider::Anthropic => "anthropic",
            Provider::Mistral => "mistral",
        }
    }

    /// The model used when neither the caller nor the settings name one.
    pub fn default_model(self) -> &'static str {
        match self {
            Provider::Groq => "llama-3.3-70b-versatile",
            Provider::Gemini => "gemini-2.0-flash",
            Provider::OpenAI => "gpt-4o-mini",
            Provider::DeepSeek => "deepseek-chat",
            Provider::OpenRouter => "openrouter/auto",
            Provider::Ollama => "llama3.2",
            Provider::Anthropic => "claude-3-5-haiku-20241022",
            Provider::Mistral => "mistral-small-latest",
        }
    }

    /// Environment variable holding the provider's API key. `None` for local providers.
    pub fn env_key(self) -> Option<&'static str> {
        match self {
            Provider::Groq => Some("GROQ_API_KEY"),
            Provider::Gemini => Some("GEMINI_API_KEY"),
            Provider::OpenAI => Some("OPENAI_API_KEY"),
            Provider::DeepSeek => Some("DEEPSEEK_API_KEY"),
            Provider::OpenRouter => Some("OPENROUTER_API_KEY"),
            Provider::Ollama => None,
            Provider::Anthropic => Some("ANTHROPIC_API_KEY"),
            Provider::Mistral => Some("MISTRAL_API_KEY"),
        }
    }

    /// Base URL of the provider's OpenAI-compatible API.
    pub fn api_base(self) -> &'static str {
        match self {
            Provider::Groq => "https://api.groq.com/openai/v1",
            Provider::Gemini => "https://generativelanguage.googleapis.com/v1beta/openai",
            Provider::OpenAI => "https://api.openai.com/v1",
            Provider::DeepSeek => "https://api.deepseek.com/v1",
            Provider::OpenRouter => "https://openrouter.ai/api/v1",
            Provider::Ollama => "http://localhost:11434/v1",
            Provider::Anthropic => "https://api.anthropic.com/v1",
            Provider::Mistral => "https://api.mistral.ai/v1",
        }
    }

    /// Local providers run on this machine and need no credential.
    pub fn is_local(self) -> bool {
        matches!(self, Provider::Ollama)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = ProviderParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Provider::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| ProviderParseError(s.to_string()))
    }
}

/// A provider plus an optional explicit model choice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderConfig {
    pub provider: Provider,
    pub model: Option<String>,
}

impl ProviderConfig {
    pub fn new(provider: Provider, model: Option<String>) -> Self {
        Self { provider, model }
    }

    /// Resolves the model, falling back to `fallback` and then the provider default.
    pub fn resolve_model(&self, fallback: Option<String>) -> ModelId {
        let name = self
            .model
            .clone()
            .or(fallback)
            .unwrap_or_else(|| self.provider.default_model().to_string());
        ModelId {
            provider: self.provider,
            name,
        }
    }
}

/// A fully resolved model: which provider, and the model name it knows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelId {
    pub provider: Provider,
    pub name: String,
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.provider, self.name)
    }
}
