//! The interaction loop's command dispatcher.
//!
//! [`App`] owns the [`Session`] and the [`Tutor`] for one run and turns each
//! line of learner input into session mutations and tutor calls. It holds no
//! lesson logic of its own: advancement rules live in the session, model
//! access lives in the tutor.
//!
//! Quiz timing follows one rule: the quiz opens only after a step's
//! explanation has streamed to the end without error, and `next` is refused
//! while it is open, so a new explanation is never generated in quiz mode.

use crate::command::Command;
use anyhow::Result;
use futures::StreamExt;
use groqmate_core::{
    ProviderConfig, Session, SessionStatus, TextStream, Tutor, TutorError,
    tutor::{NO_ACTIVE_LESSON, NOTHING_TO_SUMMARIZE},
};
use std::path::PathBuf;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

const LESSON_COMPLETE: &str = "Lesson complete! Type 'summary' to get your notes.";
const ANSWER_FIRST: &str = "Answer the quiz first to unlock the next step.";
const NOTHING_TO_REPHRASE: &str = "No active lesson to rephrase.";
const UNKNOWN_COMMAND: &str = "Unknown command. Type 'teach me <topic>' to start learning.";
const CLEAR_SCREEN: &str = "\x1B[2J\x1B[H";

const HELP: &str = "Commands:
  teach me <topic>  - Start a new lesson
  next              - Move to the next step
  wtf               - Explain the current step differently
  summary           - Save lesson notes as markdown
  clear             - Clear the screen
  reset             - Drop the current lesson
  quit              - Exit";

/// Whether the loop should keep reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App<W> {
    provider: ProviderConfig,
    tutor: Result<Tutor, TutorError>,
    session: Session,
    out: W,
    notes_dir: PathBuf,
}

impl<W: AsyncWrite + Unpin + Send> App<W> {
    /// Creates the dispatcher. A tutor that failed to construct is kept as
    /// its error and reported whenever a command needs the model.
    pub fn new(
        provider: ProviderConfig,
        tutor: Result<Tutor, TutorError>,
        out: W,
        notes_dir: PathBuf,
    ) -> Self {
        Self {
            provider,
            tutor,
            session: Session::new(),
            out,
            notes_dir,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub async fn welcome(&mut self) -> Result<()> {
        let text = match &self.tutor {
            Ok(tutor) => format!(
                "Welcome to Groqmate! Your learning coach.\n\
                 Provider: {} | Model: {}\n\
                 Type 'teach me <topic>' to start a lesson.\n\
                 Commands: next, wtf, summary, reset, quit (help for more)",
                tutor.model().provider.as_str().to_uppercase(),
                tutor.model().name,
            ),
            Err(e) => format!(
                "Welcome to Groqmate! Your learning coach.\n\
                 Error: {e}\n\
                 Run `groqmate configure --provider {} --api-key <key>` to set one up.",
                self.provider.provider,
            ),
        };
        self.system(&text).await
    }

    pub async fn prompt(&mut self) -> Result<()> {
        let progress = self.session.progress_text();
        let prompt = if progress.is_empty() {
            "> ".to_string()
        } else {
            format!("[{progress}] > ")
        };
        self.write(&prompt).await
    }

    /// Handles one line of input to completion, including any streaming.
    pub async fn handle_line(&mut self, line: &str) -> Result<Flow> {
        let Some(command) = Command::parse(line, self.session.is_in_quiz()) else {
            return Ok(Flow::Continue);
        };
        info!(?command, status = ?self.session.status(), "Handling command");

        match command {
            Command::Quit => {
                self.system("Bye!").await?;
                return Ok(Flow::Quit);
            }
            Command::Clear => {
                self.write(CLEAR_SCREEN).await?;
                self.welcome().await?;
            }
            Command::Reset => {
                self.session.reset();
                self.system("Lesson cleared.").await?;
                self.welcome().await?;
            }
            Command::Help => self.system(HELP).await?,
            Command::Rephrase => self.rephrase().await?,
            Command::Summary => self.summary().await?,
            Command::Next => self.next().await?,
            Command::Teach(topic) => self.start_lesson(&topic).await?,
            Command::Answer(answer) => self.answer(&answer).await?,
            Command::Unknown => self.system(UNKNOWN_COMMAND).await?,
        }
        Ok(Flow::Continue)
    }

    async fn start_lesson(&mut self, topic: &str) -> Result<()> {
        let tutor = match &self.tutor {
            Ok(tutor) => tutor,
            Err(e) => return report_setup_error(&mut self.out, e).await,
        };
        system(&mut self.out, &format!("Generating lesson plan for: {topic}...")).await?;

        let result = tutor.generate_plan(topic).await;
        match result {
            Ok(plan) => {
                let header = format!("Lesson: {} ({} steps)", plan.topic, plan.total_steps());
                self.session.load_plan(plan);
                self.system(&header).await?;
                self.progress().await?;
                self.explain_current_step().await
            }
            Err(e) => {
                warn!(error = %e, %topic, "Lesson plan generation failed");
                self.system(&format!("Error: {e}")).await
            }
        }
    }

    async fn explain_current_step(&mut self) -> Result<()> {
        let stream = match &self.tutor {
            Ok(tutor) => tutor.explain_step(&self.session),
            Err(e) => return report_setup_error(&mut self.out, e).await,
        };
        if self.print_stream(stream).await? && self.session.current_step().is_some() {
            self.session.enter_quiz();
        }
        Ok(())
    }

    async fn answer(&mut self, answer: &str) -> Result<()> {
        let verdict = match &self.tutor {
            Ok(tutor) => tutor.check_answer(answer, &self.session),
            Err(e) => return report_setup_error(&mut self.out, e).await,
        };
        info!(grade = ?verdict.grade, "Quiz answer graded");
        if verdict.is_correct() {
            self.session.exit_quiz();
        }
        self.coach(&verdict.feedback).await
    }

    async fn next(&mut self) -> Result<()> {
        if self.session.plan().is_none() {
            return self.system(NO_ACTIVE_LESSON).await;
        }
        match self.session.status() {
            SessionStatus::Quiz => self.system(ANSWER_FIRST).await,
            SessionStatus::Complete => self.coach(LESSON_COMPLETE).await,
            SessionStatus::Idle | SessionStatus::Planning | SessionStatus::Teaching => {
                if self.session.advance() {
                    self.progress().await?;
                    self.explain_current_step().await
                } else {
                    info!("Lesson complete");
                    self.coach(LESSON_COMPLETE).await
                }
            }
        }
    }

    async fn rephrase(&mut self) -> Result<()> {
        if self.session.plan().is_none() {
            return self.system(NOTHING_TO_REPHRASE).await;
        }
        let stream = match &self.tutor {
            Ok(tutor) => tutor.rephrase_step(&self.session),
            Err(e) => return report_setup_error(&mut self.out, e).await,
        };
        self.print_stream(stream).await?;
        Ok(())
    }

    async fn summary(&mut self) -> Result<()> {
        let Some(plan) = self.session.plan() else {
            return self.system(NOTHING_TO_SUMMARIZE).await;
        };
        let path = self.notes_dir.join(plan.notes_file_name());
        let tutor = match &self.tutor {
            Ok(tutor) => tutor,
            Err(e) => return report_setup_error(&mut self.out, e).await,
        };
        system(&mut self.out, "Generating summary...").await?;

        let result = tutor.generate_summary(&self.session).await;
        let summary = match result {
            Ok(summary) => summary,
            Err(e) => {
                warn!(error = %e, "Summary generation failed");
                return self.system(&format!("Error: {e}")).await;
            }
        };

        match tokio::fs::write(&path, &summary).await {
            Ok(()) => {
                info!(path = %path.display(), "Lesson notes saved");
                self.system(&format!("Summary saved to {}", path.display()))
                    .await?;
            }
            Err(e) => {
                warn!(error = %e, path = %path.display(), "Failed to save lesson notes");
                self.system(&format!("Error: could not write {}: {e}", path.display()))
                    .await?;
            }
        }
        self.coach(&summary).await
    }

    /// Writes fragments as they arrive. Returns `false` if the stream failed.
    async fn print_stream(&mut self, mut stream: TextStream) -> Result<bool> {
        while let Some(fragment) = stream.next().await {
            match fragment {
                Ok(text) => self.write(&text).await?,
                Err(e) => {
                    warn!(error = %e, "Explanation stream failed");
                    self.write(&format!("\nError: {e}\n")).await?;
                    return Ok(false);
                }
            }
        }
        self.write("\n").await?;
        Ok(true)
    }

    async fn progress(&mut self) -> Result<()> {
        let progress = self.session.progress_text();
        self.write(&format!("[{progress}]\n")).await
    }

    async fn system(&mut self, text: &str) -> Result<()> {
        system(&mut self.out, text).await
    }

    async fn coach(&mut self, text: &str) -> Result<()> {
        self.write(&format!("{text}\n")).await
    }

    async fn write(&mut self, text: &str) -> Result<()> {
        write(&mut self.out, text).await
    }
}

async fn report_setup_error<W: AsyncWrite + Unpin>(out: &mut W, error: &TutorError) -> Result<()> {
    system(out, &format!("Error: {error}")).await
}

/// A line from the coach itself, as opposed to model output.
async fn system<W: AsyncWrite + Unpin>(out: &mut W, text: &str) -> Result<()> {
    write(out, &format!("* {text}\n")).await
}

/// Writes and flushes, so partial output shows up immediately.
async fn write<W: AsyncWrite + Unpin>(out: &mut W, text: &str) -> Result<()> {
    out.write_all(text.as_bytes()).await?;
    out.flush().await?;
    Ok(())
}
