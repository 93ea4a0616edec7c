//! Prompt templates sent to the model.
//!
//! Templates live as markdown files under `prompts/` and are compiled into
//! the binary. Placeholders are written `{name}` and substituted in a single
//! pass, so text coming from the learner or the model is never re-expanded.

use crate::lesson::{LessonPlan, LessonStep};

/// Number of steps requested for every generated plan.
pub const PLAN_STEP_COUNT: usize = 5;

/// The full set of templates used by the tutor.
#[derive(Debug, Clone)]
pub struct Prompts {
    pub system: String,
    pub plan: String,
    pub explain: String,
    pub rephrase: String,
    pub summary: String,
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            system: include_str!("../prompts/system.md").to_string(),
            plan: include_str!("../prompts/plan.md").to_string(),
            explain: include_str!("../prompts/explain.md").to_string(),
            rephrase: include_str!("../prompts/rephrase.md").to_string(),
            summary: include_str!("../prompts/summary.md").to_string(),
        }
    }
}

impl Prompts {
    pub fn plan(&self, topic: &str) -> String {
        let schema = schemars::schema_for!(LessonPlan);
        let schema = serde_json::to_string_pretty(&schema).unwrap_or_default();
        render(
            &self.plan,
            &[
                ("topic", topic),
                ("schema", &schema),
                ("step_count", &PLAN_STEP_COUNT.to_string()),
            ],
        )
    }

    pub fn explain(&self, topic: &str, step: &LessonStep) -> String {
        render(
            &self.explain,
            &[
                ("topic", topic),
                ("step_number", &(step.index + 1).to_string()),
                ("step_title", &step.title),
                ("concept", &step.concept),
                ("quiz_question", &step.quiz_question),
            ],
        )
    }

    pub fn rephrase(&self, topic: &str, step: &LessonStep) -> String {
        render(
            &self.rephrase,
            &[("topic", topic), ("concept", &step.concept)],
        )
    }

    /// Lists every step as `N. Title: concept` under the summary template.
    pub fn summary(&self, plan: &LessonPlan) -> String {
        let steps = plan
            .steps
            .iter()
            .enumerate()
            .map(|(i, step)| format!("{}. {}: {}", i + 1, step.title, step.concept))
            .collect::<Vec<_>>()
            .join("\n");
        render(&self.summary, &[("topic", &plan.topic), ("steps", &steps)])
    }
}

/// Substitutes `{name}` placeholders. Unknown placeholders are left as written.
fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let replacement = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });
        match replacement {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
