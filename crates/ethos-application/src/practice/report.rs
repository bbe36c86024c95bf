//! End-of-session feedback: the direct report and the assistant handoff prompt.

use ethos_core::error::{EthosError, Result};
use ethos_core::scenario::Scenario;
use ethos_core::scoring::tactic_type;
use ethos_core::session::{SessionSummary, Turn};
use minijinja::{Environment, context};
use serde::Serialize;

/// One scored choice in the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoiceBreakdown {
    pub step: u32,
    pub choice: String,
    pub category: String,
    pub tactic_type: String,
    pub evs: f64,
    pub message: String,
}

/// Feedback payload for direct display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackReport {
    pub scenario: Scenario,
    pub manager_description: String,
    pub headline: String,
    pub summary: SessionSummary,
    pub choices: Vec<ChoiceBreakdown>,
}

impl FeedbackReport {
    pub fn build(scenario: &Scenario, summary: &SessionSummary, conversation: &[Turn]) -> Self {
        let mut choices = Vec::new();
        for turn in conversation {
            let Turn::User { step, text, .. } = turn else {
                continue;
            };
            let scored = conversation.iter().find_map(|candidate| match candidate {
                Turn::Feedback {
                    step: fb_step,
                    evs,
                    category,
                    message,
                } if fb_step == step => Some((*evs, category, message)),
                _ => None,
            });
            if let Some((evs, category, message)) = scored {
                choices.push(ChoiceBreakdown {
                    step: *step,
                    choice: text.clone(),
                    category: category.clone(),
                    tactic_type: tactic_type(category).to_string(),
                    evs,
                    message: message.clone(),
                });
            }
        }

        FeedbackReport {
            scenario: scenario.clone(),
            manager_description: scenario.manager_type.description().to_string(),
            headline: summary.headline(),
            summary: summary.clone(),
            choices,
        }
    }
}

const HANDOFF_TEMPLATE: &str = r#"The user just finished an ethics practice scenario and would like feedback.

Scenario: {{ report.scenario.title }} ({{ report.scenario.issue }})
Manager persona: {{ report.scenario.managerType }} - {{ report.manager_description }}

Score: {{ report.headline }}
{{ report.summary.ratingDescription }}

Choices:
{% for choice in report.choices -%}
{{ choice.step }}. "{{ choice.choice }}" [{{ choice.category }}, {{ choice.tactic_type }}] EVS {{ choice.evs }}
{% endfor %}
{%- if report.summary.tacticCounts %}
Tactics used:
{% for tactic, count in report.summary.tacticCounts|items -%}
- {{ tactic }}: {{ count }}
{% endfor %}
{%- endif %}
Guidelines:
- Explain what the score means for how they handled the pressure
- Point out the strongest choice and the one with the most room to improve
- Suggest one concrete phrase they could use next time
- Keep it encouraging and under 200 words
"#;

/// Renders the prompt handed to the hosting assistant conversation.
pub fn render_handoff_prompt(report: &FeedbackReport) -> Result<String> {
    let mut env = Environment::new();
    env.add_template("handoff", HANDOFF_TEMPLATE)
        .map_err(|e| EthosError::internal(format!("Invalid handoff template: {}", e)))?;
    let template = env
        .get_template("handoff")
        .map_err(|e| EthosError::internal(e.to_string()))?;
    template
        .render(context! { report => report })
        .map_err(|e| EthosError::internal(format!("Failed to render handoff prompt: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethos_core::scenario::ManagerType;
    use ethos_core::scoring::classify;
    use ethos_core::session::FeedbackHistory;

    fn conversation() -> Vec<Turn> {
        vec![
            Turn::manager("Just drop the accessibility fixes.", Some("st-1".into())),
            Turn::User {
                step: 1,
                choice_index: 1,
                text: "The law requires them.".to_string(),
            },
            Turn::Feedback {
                step: 1,
                evs: 3.0,
                category: "Legal Reference".to_string(),
                message: classify(3.0, "Legal Reference"),
            },
            Turn::manager("Nobody will notice.", Some("st-2".into())),
            Turn::User {
                step: 2,
                choice_index: 0,
                text: "Maybe later then.".to_string(),
            },
            Turn::Feedback {
                step: 2,
                evs: -1.0,
                category: "Deflection".to_string(),
                message: classify(-1.0, "Deflection"),
            },
        ]
    }

    fn scenario() -> Scenario {
        Scenario {
            id: "a11y-01".to_string(),
            title: "The Deadline".to_string(),
            description: "A release is due.".to_string(),
            issue: "accessibility".to_string(),
            manager_type: ManagerType::Puppeteer,
        }
    }

    #[test]
    fn report_pairs_choices_with_feedback() {
        let conversation = conversation();
        let summary =
            SessionSummary::compute(&FeedbackHistory::from_conversation(&conversation), None);
        let report = FeedbackReport::build(&scenario(), &summary, &conversation);

        assert_eq!(report.choices.len(), 2);
        assert_eq!(report.choices[0].choice, "The law requires them.");
        assert_eq!(report.choices[1].evs, -1.0);
        assert_eq!(report.headline, summary.headline());
        assert_eq!(
            report.manager_description,
            ManagerType::Puppeteer.description()
        );
    }

    #[test]
    fn handoff_prompt_includes_score_and_choices() {
        let conversation = conversation();
        let summary =
            SessionSummary::compute(&FeedbackHistory::from_conversation(&conversation), None);
        let report = FeedbackReport::build(&scenario(), &summary, &conversation);

        let prompt = render_handoff_prompt(&report).unwrap();
        assert!(prompt.contains("The Deadline (accessibility)"));
        assert!(prompt.contains(&summary.headline()));
        assert!(prompt.contains("\"Maybe later then.\""));
        assert!(prompt.contains("- Deflection: 1"));
    }
}
