//! Lesson Session State Machine
//!
//! A [`Session`] is the single owner of mutable lesson progress: the loaded
//! plan, the cursor into it, the steps already passed and the current
//! [`SessionStatus`]. Everything else (the tutor, the interaction loop) only
//! reads it or drives it through the methods below.
//!
//! Status moves `Idle -> Teaching -> Quiz -> Teaching -> ... -> Complete`;
//! [`Session::reset`] returns to `Idle` from anywhere.

use crate::lesson::{LessonPlan, LessonStep, SessionStatus};
use serde::Serialize;
use tracing::debug;

/// The raw progress data owned by a [`Session`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionState {
    pub plan: Option<LessonPlan>,
    pub current_step: usize,
    /// Indices of steps already passed, in the order they were passed.
    pub completed: Vec<usize>,
    pub status: SessionStatus,
}

/// Tracks a learner's progress through one loaded [`LessonPlan`].
#[derive(Debug, Default)]
pub struct Session {
    state: SessionState,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn plan(&self) -> Option<&LessonPlan> {
        self.state.plan.as_ref()
    }

    pub fn status(&self) -> SessionStatus {
        self.state.status
    }

    /// Replaces the current plan and starts teaching it from the first step.
    ///
    /// The plan is not validated; a plan with no steps is accepted and simply
    /// has no current step.
    pub fn load_plan(&mut self, plan: LessonPlan) {
        debug!(topic = %plan.topic, steps = plan.total_steps(), "Loading lesson plan");
        self.state = SessionState {
            plan: Some(plan),
            current_step: 0,
            completed: Vec::new(),
            status: SessionStatus::Teaching,
        };
    }

    /// Moves the cursor to the next step.
    ///
    /// Returns `false` without touching the cursor when there is no plan, or
    /// when the cursor is already on the last step; in the latter case the
    /// session becomes [`SessionStatus::Complete`]. The status is otherwise
    /// left as it was, so leaving the quiz is the caller's job.
    pub fn advance(&mut self) -> bool {
        let Some(plan) = &self.state.plan else {
            return false;
        };
        if self.is_complete() || self.state.current_step + 1 >= plan.total_steps() {
            self.state.status = SessionStatus::Complete;
            return false;
        }
        self.state.completed.push(self.state.current_step);
        self.state.current_step += 1;
        true
    }

    /// The step under the cursor, if there is one.
    pub fn current_step(&self) -> Option<&LessonStep> {
        self.state.plan.as_ref()?.steps.get(self.state.current_step)
    }

    pub fn is_complete(&self) -> bool {
        self.state.status == SessionStatus::Complete
    }

    /// Caller contract: only call while a plan with a current step is loaded.
    pub fn enter_quiz(&mut self) {
        self.state.status = SessionStatus::Quiz;
    }

    /// Caller contract: only call while a plan is loaded.
    pub fn exit_quiz(&mut self) {
        self.state.status = SessionStatus::Teaching;
    }

    pub fn is_in_quiz(&self) -> bool {
        self.state.status == SessionStatus::Quiz
    }

    /// One-based progress for display, e.g. `Step 2/5`. Empty without a plan.
    pub fn progress_text(&self) -> String {
        match &self.state.plan {
            Some(plan) => format!(
                "Step {}/{}",
                self.state.current_step + 1,
                plan.total_steps()
            ),
            None => String::new(),
        }
    }

    /// Clears all lesson content, keeping the same session handle.
    pub fn reset(&mut self) {
        self.state = SessionState::default();
    }
}
