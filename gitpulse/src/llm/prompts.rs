//! Prompt templates for classification, answer generation, and recovery.
//!
//! Templates use `format!()` interpolation so missing variables fail at
//! compile time.

use crate::config::AVAILABLE_METRICS;
use crate::models::QueryIntent;

/// Fixed system instruction describing the required JSON response shape and
/// the domain rules the model must follow.
pub fn system_prompt() -> String {
    format!(
        r#"You are an expert in software-engineering telemetry analysis. Always answer with VALID JSON:
{{
  "chart": {{
    "type": "bar|pie|line|scatter|radar|area|multiline|polarArea",
    "title": "Concise technical title",
    "labels": ["Repo A", "Repo B"],
    "datasets": [{{
      "label": "Technical metric",
      "data": [values]
    }}]
  }},
  "analysis": "3-7 lines of technical observations"
}}

Technical rules:
1. Chart types:
   - bar: comparisons between repositories or developers
   - line: time trends (commits, issues, merge times)
   - scatter: correlations (e.g. review time vs PR size)
   - radar: multi-dimensional quality profiles
2. Strict structure:
   - No markdown inside the JSON
   - All property names in double quotes
3. Valid metrics:
   {metrics}
4. For non-visual answers:
   {{"analysis": "text"}}"#,
        metrics = AVAILABLE_METRICS.join(", ")
    )
}

/// Few-shot examples preceding the user query so the model can pattern-match
/// the expected output shape.
pub fn few_shot_examples() -> &'static str {
    r#"# Example 1: repository comparison
User: "Compare commits between React and Vue"
{
  "chart": {
    "type": "bar",
    "title": "Monthly commits (last 6 months)",
    "labels": ["React", "Vue"],
    "datasets": [
      {"label": "Average commits/day", "data": [42, 38]},
      {"label": "Active developers", "data": [15, 12]}
    ]
  },
  "analysis": "React shows 10% more activity than Vue. The React team has 3 additional developers."
}

# Example 2: trends
User: "How have merge times evolved?"
{
  "chart": {
    "type": "line",
    "title": "Average merge time (hours)",
    "labels": ["Jan", "Feb", "Mar", "Apr"],
    "datasets": [
      {"label": "Backend", "data": [8.2, 7.5, 6.9, 5.3]},
      {"label": "Frontend", "data": [5.1, 4.8, 6.2, 5.9]}
    ]
  },
  "analysis": "Steady improvement of backend merge time (-35%). Frontend is more variable."
}

# Example 3: textual answer
User: "Who contributed the most this month?"
{
  "analysis": "Top 3 contributors this month: 1. Alice (42 commits) 2. Bob (38 commits) 3. Charlie (29 commits)"
}"#
}

/// Follow-up instruction appended after a failed attempt. Embeds the detected
/// error and the original query and asks for a corrected structured response.
pub fn recovery_prompt(errors: &str, query: &str) -> String {
    format!(
        r#"TECHNICAL ERROR: the previous answer was not valid analytics JSON.
Correct it using this exact structure:

{{
  "chart": {{
    "type": "bar|pie|line|scatter|radar|area|multiline|polarArea",
    "title": "string",
    "labels": ["string"],
    "datasets": [{{
      "label": "string",
      "data": [numbers]
    }}]
  }},
  "analysis": "string"
}}

Detected errors:
{errors}

Technical hints:
1. For comparisons: type="bar"
2. For trends: type="line"
3. For correlations: type="scatter"
4. Avoid ```json fences
5. Only use the available telemetry metrics

Original query: {query}"#
    )
}

/// Constrained classification prompt. The model must answer with exactly one
/// intent token.
pub fn classifier_prompt(query: &str) -> String {
    let tokens = QueryIntent::ALL
        .iter()
        .map(|intent| format!("- {}", intent.as_token()))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Classify this engineering-telemetry question:
"{query}"

Context:
- Questions may concern commits, PRs, issues, reviews, CI/CD runs
- Metrics include merge time, reopen rate, coverage, build failures

Answer with EXACTLY ONE of these tokens and nothing else:
{tokens}"#
    )
}

/// Intent-specific chart hint, present only for comparison and trend queries.
pub fn intent_hint(intent: QueryIntent) -> Option<&'static str> {
    match intent {
        QueryIntent::Compare => {
            Some("NOTE: Compare repositories or developers using bar charts")
        }
        QueryIntent::Trend => Some("NOTE: Show time trends with line charts"),
        _ => None,
    }
}

/// Key-metric context injected for intents with well-known KPI thresholds.
pub fn kpi_context(intent: QueryIntent) -> Option<&'static str> {
    match intent {
        QueryIntent::TeamPerformance => Some(
            "KPI context:\nKey metrics: commit_count, pr_merge_time_avg, review_delay_avg\nThresholds: >50 commits/month (good), <20 commits/month (attention)",
        ),
        QueryIntent::RiskAssessment => Some(
            "KPI context:\nRisk indicators: reopened_issues, vulnerabilities, build failures\nCritical thresholds: >5 reopened issues, >10 critical vulnerabilities",
        ),
        QueryIntent::CodeHealth => Some(
            "KPI context:\nHealth metrics: coverage, bugs, code_smells, technical_debt\nTargets: >80% coverage, <1% bug density",
        ),
        _ => None,
    }
}
