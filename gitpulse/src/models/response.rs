use serde::Serialize;
use serde_json::Value;

/// Closed set of chart kinds the model is allowed to answer with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartType {
    Bar,
    Pie,
    Line,
    Scatter,
    Radar,
    Area,
    Multiline,
    PolarArea,
}

impl ChartType {
    pub const ALL: &'static [ChartType] = &[
        ChartType::Bar,
        ChartType::Pie,
        ChartType::Line,
        ChartType::Scatter,
        ChartType::Radar,
        ChartType::Area,
        ChartType::Multiline,
        ChartType::PolarArea,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Bar => "bar",
            ChartType::Pie => "pie",
            ChartType::Line => "line",
            ChartType::Scatter => "scatter",
            ChartType::Radar => "radar",
            ChartType::Area => "area",
            ChartType::Multiline => "multiline",
            ChartType::PolarArea => "polarArea",
        }
    }
}

/// The parsed shape of a raw model reply: structured JSON, a bullet/numbered
/// list, or plain prose.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Json(Value),
    List(Vec<String>),
    Text(String),
}

impl ResponseBody {
    pub fn kind(&self) -> &'static str {
        match self {
            ResponseBody::Json(_) => "json",
            ResponseBody::List(_) => "list",
            ResponseBody::Text(_) => "text",
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            ResponseBody::Json(value) => value,
            ResponseBody::List(items) => Value::Array(items.into_iter().map(Value::String).collect()),
            ResponseBody::Text(text) => Value::String(text),
        }
    }

    /// Text rendition stored in conversation history (turn content is plain
    /// text regardless of the body shape).
    pub fn as_history_text(&self) -> String {
        match self {
            ResponseBody::Json(value) => value.to_string(),
            ResponseBody::List(items) => items.join("\n"),
            ResponseBody::Text(text) => text.clone(),
        }
    }
}

/// Outcome of the formatter cascade. `error` carries the normalized diagnostic
/// from a failed JSON parse when a later strategy produced the body.
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedResult {
    pub body: ResponseBody,
    pub success: bool,
    pub error: Option<String>,
}

/// Outcome of schema validation over a json-shaped result. Independent of
/// [`FormattedResult`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationOutcome {
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}
