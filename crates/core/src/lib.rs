//! Core lesson logic for the Groqmate terminal coach.
//!
//! A [`session::Session`] tracks progress through a generated
//! [`lesson::LessonPlan`]; the [`tutor::Tutor`] turns session state into
//! model requests and normalizes the responses. Rendering and input handling
//! live in the CLI crate.

pub mod error;
pub mod grader;
pub mod lesson;
pub mod llm_client;
pub mod prompts;
pub mod provider;
pub mod session;
pub mod settings;
pub mod tutor;

pub use error::TutorError;
pub use lesson::{LessonPlan, LessonStep, SessionStatus};
pub use provider::{ModelId, Provider, ProviderConfig};
pub use session::Session;
pub use settings::SettingsStore;
pub use tutor::{TextStream, Tutor};
