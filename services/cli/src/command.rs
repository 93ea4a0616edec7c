//! Parsing of one line of learner input into a [`Command`].

const TEACH_PREFIX: &str = "teach me ";

/// Everything the learner can ask for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    /// Clear the screen, keeping the lesson.
    Clear,
    /// Drop the current lesson and start over.
    Reset,
    Help,
    /// Explain the current step again, differently.
    Rephrase,
    Summary,
    Next,
    /// Start a new lesson on the given topic.
    Teach(String),
    /// An answer to the current quiz.
    Answer(String),
    Unknown,
}

impl Command {
    /// Parses trimmed input. Returns `None` for blank lines.
    ///
    /// Keywords are matched case-insensitively. While a quiz is open, any
    /// input that is not a keyword is treated as the answer, including text
    /// starting with `teach me`.
    pub fn parse(input: &str, in_quiz: bool) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }
        let lower = input.to_lowercase();

        let command = match lower.as_str() {
            "quit" | "exit" | "q" => Command::Quit,
            "clear" | "cls" => Command::Clear,
            "reset" => Command::Reset,
            "help" | "?" | "commands" => Command::Help,
            "wtf" => Command::Rephrase,
            "summary" => Command::Summary,
            "next" => Command::Next,
            _ if in_quiz => Command::Answer(input.to_string()),
            _ => match strip_prefix_ignore_case(input, TEACH_PREFIX) {
                Some(topic) if !topic.trim().is_empty() => {
                    Command::Teach(topic.trim().to_string())
                }
                _ => Command::Unknown,
            },
        };
        Some(command)
    }
}

fn strip_prefix_ignore_case<'a>(input: &'a str, prefix: &str) -> Option<&'a str> {
    let head = input.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &input[prefix.len()..])
}
