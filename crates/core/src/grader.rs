//! Heuristic quiz grading.
//!
//! Answers are compared case-insensitively after trimming. Substring
//! containment in either direction counts as correct; otherwise enough
//! shared words make the answer "close".
//!
//! The "close" threshold is half the word count of the *expected* answer,
//! rounded down. For a one-word expected answer that threshold is zero, so
//! any answer that is not correct is reported as close.

use std::collections::HashSet;

/// Number of characters of the expected answer revealed as a hint.
const HINT_CHARS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grade {
    Correct,
    Close,
    Incorrect,
}

/// The outcome of grading one answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub grade: Grade,
    /// Feedback to show the learner.
    pub feedback: String,
}

impl Verdict {
    pub fn is_correct(&self) -> bool {
        self.grade == Grade::Correct
    }

    /// The verdict given when there is no quiz to grade against.
    pub fn no_active_lesson() -> Self {
        Self {
            grade: Grade::Incorrect,
            feedback: "No active lesson.".to_string(),
        }
    }
}

/// Grades `actual` against `expected`.
pub fn check(expected: &str, actual: &str) -> Verdict {
    let expected_norm = expected.trim().to_lowercase();
    let actual_norm = actual.trim().to_lowercase();

    if expected_norm.contains(&actual_norm) || actual_norm.contains(&expected_norm) {
        return Verdict {
            grade: Grade::Correct,
            feedback: "Correct! Type `next` to continue.".to_string(),
        };
    }

    let expected_words: HashSet<&str> = expected_norm.split_whitespace().collect();
    let actual_words: HashSet<&str> = actual_norm.split_whitespace().collect();
    let shared = expected_words.intersection(&actual_words).count();

    if shared >= expected_norm.split_whitespace().count() / 2 {
        Verdict {
            grade: Grade::Close,
            feedback: format!("Close! The answer is related to: {expected}"),
        }
    } else {
        let hint: String = expected.chars().take(HINT_CHARS).collect();
        Verdict {
            grade: Grade::Incorrect,
            feedback: format!("Not quite. Hint: Think about {hint}..."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_containing_expected_is_correct() {
        let verdict = check("base case", "the base case");
        assert_eq!(verdict.grade, Grade::Correct);
        assert!(verdict.is_correct());
        assert!(verdict.feedback.contains("next"));
    }

    #[test]
    fn test_answer_contained_in_expected_is_correct() {
        assert!(check("a stack overflow error", "stack overflow").is_correct());
    }

    #[test]
    fn test_comparison_ignores_case_and_whitespace() {
        assert!(check("  Base Case ", "BASE CASE\n").is_correct());
    }

    #[test]
    fn test_partial_word_overlap_is_close() {
        let verdict = check("base case", "base");
        // "base" is a substring of "base case", so containment wins.
        assert!(verdict.is_correct());

        let verdict = check("base case", "base scenario");
        assert_eq!(verdict.grade, Grade::Close);
        assert!(verdict.feedback.contains("base case"));
    }

    #[test]
    fn test_single_word_expected_is_always_close() {
        let verdict = check("stack", "completely unrelated words");
        assert_eq!(verdict.grade, Grade::Close);
    }

    #[test]
    fn test_no_overlap_gives_truncated_hint() {
        let verdict = check("the function calls itself", "a loop");
        assert_eq!(verdict.grade, Grade::Incorrect);
        assert_eq!(verdict.feedback, "Not quite. Hint: Think about the functi...");
    }

    #[test]
    fn test_hint_counts_characters_not_bytes() {
        let verdict = check("λx → f x applied twice", "no idea at all");
        assert_eq!(verdict.grade, Grade::Incorrect);
        assert!(verdict.feedback.contains("λx → f x a..."));
    }

    #[test]
    fn test_no_active_lesson_verdict() {
        let verdict = Verdict::no_active_lesson();
        assert!(!verdict.is_correct());
        assert_eq!(verdict.feedback, "No active lesson.");
    }
}
