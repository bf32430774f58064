//! Schema validation for json-shaped results and normalization of low-level
//! JSON parse errors into short, actionable descriptions.

use serde_json::Value;

use crate::models::{ChartType, ValidationOutcome};

/// Schema-check a parsed model reply. A reply holding only an `analysis`
/// field is a valid non-visual answer; anything else needs both `chart` and
/// `analysis`. All violations are collected, not short-circuited.
pub fn validate_json_response(response: &Value) -> ValidationOutcome {
    let Some(object) = response.as_object() else {
        return ValidationOutcome::from_errors(vec![
            "Response must be a JSON object".to_string()
        ]);
    };

    // Non-graphical response: a lone analysis field is enough.
    if object.len() == 1 && object.contains_key("analysis") {
        return ValidationOutcome::ok();
    }

    let mut errors = Vec::new();

    match object.get("chart") {
        None => errors.push("Missing required 'chart' field".to_string()),
        Some(chart) => errors.extend(validate_chart(chart)),
    }

    match object.get("analysis") {
        None => errors.push("Missing required 'analysis' field".to_string()),
        Some(analysis) => {
            let word_count = analysis
                .as_str()
                .map(|s| s.split_whitespace().count())
                .unwrap_or(0);
            if word_count < 3 {
                errors.push("Analysis must be at least 3 words of text".to_string());
            }
        }
    }

    ValidationOutcome::from_errors(errors)
}

fn validate_chart(chart: &Value) -> Vec<String> {
    let mut errors = Vec::new();

    let Some(chart) = chart.as_object() else {
        return vec!["Chart must be a JSON object".to_string()];
    };

    match chart.get("type") {
        None => errors.push("Chart missing 'type' field".to_string()),
        Some(kind) => {
            let known = kind
                .as_str()
                .is_some_and(|k| ChartType::ALL.iter().any(|t| t.as_str() == k));
            if !known {
                let valid = ChartType::ALL
                    .iter()
                    .map(|t| t.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                errors.push(format!("Invalid chart type. Must be one of: {valid}"));
            }
        }
    }

    match chart.get("title") {
        None => errors.push("Chart missing 'title' field".to_string()),
        Some(title) if !title.is_string() => {
            errors.push("Chart title must be a string".to_string())
        }
        Some(_) => {}
    }

    match chart.get("labels") {
        None => errors.push("Chart missing 'labels' field".to_string()),
        Some(labels) if !labels.is_array() => {
            errors.push("Chart labels must be a list".to_string())
        }
        Some(_) => {}
    }

    match chart.get("datasets") {
        None => errors.push("Chart missing 'datasets' field".to_string()),
        Some(datasets) if !datasets.is_array() => {
            errors.push("Chart datasets must be a list".to_string())
        }
        Some(_) => {}
    }

    errors
}

/// Canonical descriptions for the serde_json failures models actually
/// produce. Keeps recovery prompts short instead of echoing parser internals.
const JSON_ERROR_PATTERNS: &[(&str, &str)] = &[
    ("key must be a string", "Missing quotes around property names"),
    ("expected `:`", "Missing colon between property and value"),
    ("expected `,` or `}`", "Missing comma between object members"),
    ("expected `,` or `]`", "Missing comma between array items"),
    ("trailing comma", "Trailing comma before a closing bracket"),
    ("trailing characters", "Extra content after JSON structure"),
    ("EOF while parsing a string", "String value not properly closed"),
    ("EOF while parsing", "JSON structure not properly closed"),
    ("invalid escape", "Invalid escape sequence"),
    ("control character", "Contains invalid control characters"),
    ("expected value", "Invalid JSON value"),
];

pub fn normalize_json_error(error: &str) -> String {
    for (pattern, message) in JSON_ERROR_PATTERNS {
        if error.contains(pattern) {
            return (*message).to_string();
        }
    }
    "Invalid JSON format".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse_error(input: &str) -> String {
        serde_json::from_str::<Value>(input)
            .expect_err("should fail")
            .to_string()
    }

    #[test]
    fn analysis_only_response_is_valid() {
        let outcome = validate_json_response(&json!({"analysis": "Team velocity is stable."}));
        assert!(outcome.valid);
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn full_chart_response_is_valid() {
        let outcome = validate_json_response(&json!({
            "chart": {
                "type": "bar",
                "title": "Commits per repo",
                "labels": ["react", "vue"],
                "datasets": [{"label": "commits", "data": [42, 38]}]
            },
            "analysis": "React leads by ten percent."
        }));
        assert!(outcome.valid, "errors: {:?}", outcome.errors);
    }

    #[test]
    fn missing_chart_and_short_analysis_collects_both_errors() {
        let outcome = validate_json_response(&json!({
            "analysis": "ok",
            "sql": "SELECT 1"
        }));
        assert!(!outcome.valid);
        assert_eq!(outcome.errors.len(), 2);
        assert!(outcome.errors[0].contains("chart"));
        assert!(outcome.errors[1].contains("at least 3 words"));
    }

    #[test]
    fn invalid_chart_type_is_reported_with_valid_set() {
        let outcome = validate_json_response(&json!({
            "chart": {
                "type": "hologram",
                "title": "t",
                "labels": [],
                "datasets": []
            },
            "analysis": "three words here"
        }));
        assert!(!outcome.valid);
        assert!(outcome.errors[0].contains("polarArea"));
    }

    #[test]
    fn chart_field_shape_errors_are_all_collected() {
        let outcome = validate_json_response(&json!({
            "chart": {
                "type": "line",
                "title": 42,
                "labels": "not-a-list",
                "datasets": {}
            },
            "analysis": "long enough analysis"
        }));
        assert_eq!(outcome.errors.len(), 3);
    }

    #[test]
    fn non_object_response_is_invalid() {
        let outcome = validate_json_response(&json!([1, 2, 3]));
        assert!(!outcome.valid);
    }

    #[test]
    fn analysis_only_but_non_string_is_invalid() {
        let outcome = validate_json_response(&json!({"analysis": 42, "chart": {"type": "bar", "title": "t", "labels": [], "datasets": []}}));
        assert!(!outcome.valid);
    }

    #[test]
    fn normalizes_unquoted_key_error() {
        let error = parse_error("{analysis: \"x\"}");
        assert_eq!(
            normalize_json_error(&error),
            "Missing quotes around property names"
        );
    }

    #[test]
    fn normalizes_trailing_characters_error() {
        let error = parse_error("{\"a\": 1} extra");
        assert_eq!(
            normalize_json_error(&error),
            "Extra content after JSON structure"
        );
    }

    #[test]
    fn normalizes_unterminated_string_error() {
        let error = parse_error("{\"a\": \"unclosed");
        assert_eq!(
            normalize_json_error(&error),
            "String value not properly closed"
        );
    }

    #[test]
    fn unmatched_error_falls_back_to_generic_message() {
        assert_eq!(
            normalize_json_error("some exotic parser detail"),
            "Invalid JSON format"
        );
    }
}
