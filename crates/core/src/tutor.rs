//! Lesson Orchestration Service
//!
//! The [`Tutor`] is the only component that talks to the language model. It
//! turns a topic into a [`LessonPlan`], the session's current step into a
//! streamed explanation (or re-explanation), a quiz answer into a
//! [`Verdict`], and a finished lesson into markdown notes.
//!
//! The tutor never mutates a [`Session`]; it only reads it.

use crate::{
    error::TutorError,
    grader::{self, Verdict},
    lesson::LessonPlan,
    llm_client::{CompletionRequest, LLMClient, LLMStreamEvent, OpenAICompatibleClient},
    prompts::Prompts,
    provider::{ModelId, ProviderConfig},
    session::Session,
    settings::SettingsStore,
};
use async_openai::config::OpenAIConfig;
use futures::{Stream, TryStreamExt, stream};
use std::{pin::Pin, sync::Arc};
use tracing::{debug, info, warn};

/// A lazily evaluated stream of explanation fragments.
///
/// Nothing is sent to the model until the stream is first polled, and the
/// stream cannot be restarted; asking the tutor again makes a new request.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, TutorError>> + Send>>;

pub const NO_ACTIVE_LESSON: &str = "No active lesson. Start with 'teach me <topic>'";
pub const NOTHING_TO_SUMMARIZE: &str = "No lesson to summarize.";
pub const SUMMARY_FAILED: &str = "# Error generating summary";

const PLAN_TEMPERATURE: f32 = 0.7;
const EXPLAIN_TEMPERATURE: f32 = 0.7;
const REPHRASE_TEMPERATURE: f32 = 0.9;
const SUMMARY_TEMPERATURE: f32 = 0.5;

/// Placeholder key sent to local providers, which ignore it.
const LOCAL_API_KEY: &str = "ollama";

pub struct Tutor {
    client: Arc<dyn LLMClient>,
    model: ModelId,
    prompts: Prompts,
}

impl Tutor {
    /// Creates a tutor backed by the configured provider's OpenAI-compatible API.
    ///
    /// Fails immediately with [`TutorError::MissingApiKey`] when the provider
    /// needs a credential and `settings` has none.
    pub fn new(config: &ProviderConfig, settings: &dyn SettingsStore) -> Result<Self, TutorError> {
        let provider = config.provider;
        let model = config.resolve_model(settings.model(provider));

        let api_key = if provider.is_local() {
            LOCAL_API_KEY.to_string()
        } else {
            settings.api_key(provider).ok_or(TutorError::MissingApiKey {
                provider,
                env_var: provider.env_key().unwrap_or_default(),
            })?
        };

        let openai_config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(provider.api_base());
        info!(%model, api_base = provider.api_base(), "Tutor configured");

        Ok(Self::with_client(
            model,
            Arc::new(OpenAICompatibleClient::new(openai_config)),
        ))
    }

    /// Creates a tutor that talks to `client`.
    pub fn with_client(model: ModelId, client: Arc<dyn LLMClient>) -> Self {
        Self {
            client,
            model,
            prompts: Prompts::default(),
        }
    }

    pub fn model(&self) -> &ModelId {
        &self.model
    }

    fn request(&self, user: String, temperature: f32, json_mode: bool) -> CompletionRequest {
        CompletionRequest {
            model: self.model.name.clone(),
            system: self.prompts.system.clone(),
            user,
            temperature,
            json_mode,
        }
    }

    /// Asks the model for a lesson plan on `topic`.
    ///
    /// The number of steps is requested but not enforced; only the shape is.
    pub async fn generate_plan(&self, topic: &str) -> Result<LessonPlan, TutorError> {
        info!(%topic, "Generating lesson plan");
        let request = self.request(self.prompts.plan(topic), PLAN_TEMPERATURE, true);
        let content = self
            .client
            .complete(request)
            .await?
            .filter(|content| !content.trim().is_empty())
            .ok_or(TutorError::EmptyResponse)?;

        let plan: LessonPlan = serde_json::from_str(strip_code_fence(&content))?;
        info!(topic = %plan.topic, steps = plan.total_steps(), "Lesson plan generated");
        Ok(plan)
    }

    /// Streams an explanation of the session's current step.
    pub fn explain_step(&self, session: &Session) -> TextStream {
        let (Some(plan), Some(step)) = (session.plan(), session.current_step()) else {
            return notice(NO_ACTIVE_LESSON);
        };
        debug!(step = step.index, title = %step.title, "Explaining step");
        let prompt = self.prompts.explain(&plan.topic, step);
        self.stream_fragments(self.request(prompt, EXPLAIN_TEMPERATURE, false))
    }

    /// Streams a differently-analogized explanation of the current step.
    pub fn rephrase_step(&self, session: &Session) -> TextStream {
        let (Some(plan), Some(step)) = (session.plan(), session.current_step()) else {
            return notice(NO_ACTIVE_LESSON);
        };
        debug!(step = step.index, title = %step.title, "Rephrasing step");
        let prompt = self.prompts.rephrase(&plan.topic, step);
        self.stream_fragments(self.request(prompt, REPHRASE_TEMPERATURE, false))
    }

    /// Grades `answer` against the current step's quiz. Never calls the model.
    pub fn check_answer(&self, answer: &str, session: &Session) -> Verdict {
        match session.current_step() {
            Some(step) => grader::check(&step.quiz_answer, answer),
            None => Verdict::no_active_lesson(),
        }
    }

    /// Produces markdown notes covering every step of the loaded plan.
    ///
    /// An empty model response degrades to [`SUMMARY_FAILED`] instead of an error.
    pub async fn generate_summary(&self, session: &Session) -> Result<String, TutorError> {
        let Some(plan) = session.plan() else {
            return Ok(NOTHING_TO_SUMMARIZE.to_string());
        };
        info!(topic = %plan.topic, "Generating lesson summary");
        let request = self.request(self.prompts.summary(plan), SUMMARY_TEMPERATURE, false);

        match self.client.complete(request).await? {
            Some(summary) if !summary.is_empty() => Ok(summary),
            _ => {
                warn!("Model returned no summary text");
                Ok(SUMMARY_FAILED.to_string())
            }
        }
    }

    fn stream_fragments(&self, request: CompletionRequest) -> TextStream {
        let client = Arc::clone(&self.client);
        let fragments = stream::once(async move { client.stream(request).await })
            .map_err(TutorError::Gateway)
            .map_ok(|events| {
                events.map_err(TutorError::from).try_filter_map(|event| async move {
                    let LLMStreamEvent::TextChunk(text) = event;
                    Ok((!text.is_empty()).then_some(text))
                })
            })
            .try_flatten();
        Box::pin(fragments)
    }
}

fn notice(text: &str) -> TextStream {
    Box::pin(stream::once(futures::future::ready(Ok::<_, TutorError>(
        text.to_string(),
    ))))
}

/// Drops a surrounding markdown code fence, which some models add even in JSON mode.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = body.strip_suffix("```").unwrap_or(body);
    match body.split_once('\n') {
        Some((_lang, rest)) => rest.trim(),
        None => body.trim(),
    }
}
