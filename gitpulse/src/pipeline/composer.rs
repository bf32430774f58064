//! Prompt assembly. Pure functions of their inputs.
//!
//! Section order is significant: the few-shot examples must precede the query
//! so the model can pattern-match, and the conversation history must
//! immediately precede the query so recency dominates relevance.

use serde_json::Value;

use crate::llm::prompts;
use crate::models::{ConversationTurn, QueryIntent, Role};

/// Assemble the full generation prompt. Sections, blank-line separated:
/// system instruction, retrieved context, few-shot examples, intent hints,
/// prior turns, then the literal user query.
pub fn compose_prompt(
    query: &str,
    intent: QueryIntent,
    records: &[Value],
    history: &[ConversationTurn],
) -> String {
    let mut sections = vec![prompts::system_prompt(), render_context(records)];

    sections.push(format!("Examples:\n{}", prompts::few_shot_examples()));

    if let Some(hint) = prompts::intent_hint(intent) {
        sections.push(hint.to_string());
    }
    if let Some(kpi) = prompts::kpi_context(intent) {
        sections.push(kpi.to_string());
    }

    if !history.is_empty() {
        sections.push(render_history(history));
    }

    sections.push(format!("User Query: {query}\nResponse:"));

    sections.join("\n\n")
}

fn render_context(records: &[Value]) -> String {
    let blocks = records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let body = serde_json::to_string_pretty(record).unwrap_or_else(|_| record.to_string());
            format!("Telemetry Context {}:\n{}", i + 1, body)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!("Telemetry Documentation Context:\n{blocks}")
}

/// Prior turns as `role: content` lines. The caller passes only already
/// answered turns; the current query is appended separately.
fn render_history(history: &[ConversationTurn]) -> String {
    let lines = history
        .iter()
        .map(|turn| {
            let role = match turn.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            };
            format!("{role}: {}", turn.content)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!("Previous conversation:\n{lines}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn turns() -> Vec<ConversationTurn> {
        vec![
            ConversationTurn::user("how active is react?"),
            ConversationTurn::assistant("React averaged 42 commits/day."),
        ]
    }

    #[test]
    fn sections_appear_in_fixed_order() {
        let records = vec![json!({"repo": "react"})];
        let prompt = compose_prompt(
            "Compare commits between React and Vue",
            QueryIntent::Compare,
            &records,
            &turns(),
        );

        let system = prompt.find("VALID JSON").expect("system prompt");
        let context = prompt.find("Telemetry Documentation Context").expect("context");
        let examples = prompt.find("Examples:").expect("examples");
        let hint = prompt.find("NOTE: Compare").expect("hint");
        let history = prompt.find("Previous conversation:").expect("history");
        let query = prompt.find("User Query:").expect("query");

        assert!(system < context);
        assert!(context < examples);
        assert!(examples < hint);
        assert!(hint < history);
        assert!(history < query);
    }

    #[test]
    fn compare_intent_adds_bar_chart_hint() {
        let prompt = compose_prompt(
            "Compare commits between React and Vue",
            QueryIntent::Compare,
            &[],
            &[],
        );
        assert!(prompt.contains("NOTE: Compare repositories or developers using bar charts"));
    }

    #[test]
    fn trend_intent_adds_line_chart_hint() {
        let prompt = compose_prompt("merge times over time", QueryIntent::Trend, &[], &[]);
        assert!(prompt.contains("NOTE: Show time trends with line charts"));
    }

    #[test]
    fn other_intents_get_no_hint() {
        let prompt = compose_prompt("how many commits total", QueryIntent::Stats, &[], &[]);
        assert!(!prompt.contains("NOTE:"));
    }

    #[test]
    fn kpi_context_is_included_for_scored_intents() {
        let prompt = compose_prompt(
            "is the release risky",
            QueryIntent::RiskAssessment,
            &[],
            &[],
        );
        assert!(prompt.contains("Risk indicators"));
    }

    #[test]
    fn history_renders_as_role_content_lines() {
        let prompt = compose_prompt("and vue?", QueryIntent::Unknown, &[], &turns());
        assert!(prompt.contains("user: how active is react?"));
        assert!(prompt.contains("assistant: React averaged 42 commits/day."));
    }

    #[test]
    fn empty_history_omits_the_section() {
        let prompt = compose_prompt("first question here", QueryIntent::Unknown, &[], &[]);
        assert!(!prompt.contains("Previous conversation:"));
    }

    #[test]
    fn query_is_the_final_section() {
        let prompt = compose_prompt("count the commits", QueryIntent::Stats, &[], &[]);
        assert!(prompt.ends_with("User Query: count the commits\nResponse:"));
    }

    #[test]
    fn records_are_numbered_in_order() {
        let records = vec![json!({"repo": "react"}), json!({"repo": "vue"})];
        let prompt = compose_prompt("compare them", QueryIntent::Compare, &records, &[]);
        let first = prompt.find("Telemetry Context 1:").expect("first record");
        let second = prompt.find("Telemetry Context 2:").expect("second record");
        assert!(first < second);
        assert!(prompt.contains("\"repo\": \"react\""));
    }

    #[test]
    fn composition_is_pure() {
        let records = vec![json!({"repo": "react"})];
        let a = compose_prompt("compare stuff", QueryIntent::Compare, &records, &turns());
        let b = compose_prompt("compare stuff", QueryIntent::Compare, &records, &turns());
        assert_eq!(a, b);
    }
}
