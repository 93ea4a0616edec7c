use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One teachable unit of a lesson, carrying its own quiz.
///
/// Steps are only ever produced by plan generation and are never mutated
/// afterwards. `index` is zero-based and matches the step's position in
/// [`LessonPlan::steps`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LessonStep {
    /// Zero-based position of this step within the plan.
    pub index: usize,
    /// A short title, two to four words.
    pub title: String,
    /// The explanation of the concept this step teaches.
    pub concept: String,
    /// A single question testing the concept.
    pub quiz_question: String,
    /// The expected (short) answer to `quiz_question`.
    pub quiz_answer: String,
}

/// An ordered curriculum for a single topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LessonPlan {
    /// The subject being taught.
    pub topic: String,
    /// Steps in teaching order. May be empty.
    #[serde(default)]
    pub steps: Vec<LessonStep>,
}

impl LessonPlan {
    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    /// File name used when saving the lesson's notes, e.g. `binary_search_notes.md`.
    ///
    /// Path separators become underscores, so the name never leaves the
    /// directory it is joined onto.
    pub fn notes_file_name(&self) -> String {
        let slug: String = self
            .topic
            .to_lowercase()
            .chars()
            .map(|c| match c {
                ' ' | '/' | '\\' => '_',
                c => c,
            })
            .collect();
        format!("{slug}_notes.md")
    }
}

/// Where a [`crate::session::Session`] is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// No plan loaded.
    #[default]
    Idle,
    /// A plan is being generated. Reserved; nothing in the core sets it yet.
    Planning,
    /// A step is being (or has been) explained.
    Teaching,
    /// Waiting for the answer to the current step's quiz.
    Quiz,
    /// The last step was passed and there is nothing left to teach.
    Complete,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_plan() -> LessonPlan {
        LessonPlan {
            topic: "Binary Search".to_string(),
            steps: vec![
                LessonStep {
                    index: 0,
                    title: "Sorted Input".to_string(),
                    concept: "Binary search needs a sorted sequence.".to_string(),
                    quiz_question: "What must be true of the input?".to_string(),
                    quiz_answer: "it is sorted".to_string(),
                },
                LessonStep {
                    index: 1,
                    title: "Halving".to_string(),
                    concept: "Each comparison discards half the range.".to_string(),
                    quiz_question: "What is the complexity?".to_string(),
                    quiz_answer: "O(log n)".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_plan_json_preserves_step_order_and_fields() {
        let plan = sample_plan();
        let json = serde_json::to_string(&plan).unwrap();
        let decoded: LessonPlan = serde_json::from_str(&json).unwrap();

        assert_eq!(decoded, plan);
        assert_eq!(decoded.steps[0].title, "Sorted Input");
        assert_eq!(decoded.steps[1].quiz_answer, "O(log n)");
    }

    #[test]
    fn test_plan_without_steps_field_is_empty() {
        let plan: LessonPlan = serde_json::from_str(r#"{"topic": "Rust"}"#).unwrap();
        assert_eq!(plan.total_steps(), 0);
    }

    #[test]
    fn test_step_missing_field_is_rejected() {
        let json = r#"{"topic": "Rust", "steps": [{"index": 0, "title": "Ownership"}]}"#;
        assert!(serde_json::from_str::<LessonPlan>(json).is_err());
    }

    #[test]
    fn test_notes_file_name_slugifies_topic() {
        assert_eq!(sample_plan().notes_file_name(), "binary_search_notes.md");
    }

    #[test]
    fn test_notes_file_name_has_no_path_separators() {
        for (topic, expected) in [
            ("TCP/IP", "tcp_ip_notes.md"),
            ("../x", ".._x_notes.md"),
            ("Rust\\Windows Paths", "rust_windows_paths_notes.md"),
        ] {
            let plan = LessonPlan {
                topic: topic.to_string(),
                steps: Vec::new(),
            };
            let name = plan.notes_file_name();
            assert_eq!(name, expected);
            assert_eq!(std::path::Path::new(&name).components().count(), 1);
        }
    }

    #[test]
    fn test_status_defaults_to_idle() {
        assert_eq!(SessionStatus::default(), SessionStatus::Idle);
        assert_eq!(
            serde_json::to_string(&SessionStatus::Complete).unwrap(),
            "\"complete\""
        );
    }
}
