//! Raw model text → [`FormattedResult`].
//!
//! An ordered cascade of named parser strategies, tried in a fixed sequence;
//! the first success wins. The final plain-text strategy cannot fail, so
//! `format_response` is total.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::{FormattedResult, ResponseBody};
use crate::pipeline::validator::normalize_json_error;

/// One stage of the fallback cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStrategy {
    /// Parse the full raw text as JSON.
    DirectJson,
    /// Extract a fenced or brace-delimited span, then parse that as JSON.
    EmbeddedJson,
    /// Bullet (`- `, `* `, `•`) or numbered (`1.`) lines.
    BulletList,
    /// Trimmed raw text. Always succeeds.
    PlainText,
}

pub const STRATEGY_ORDER: [ParseStrategy; 4] = [
    ParseStrategy::DirectJson,
    ParseStrategy::EmbeddedJson,
    ParseStrategy::BulletList,
    ParseStrategy::PlainText,
];

impl ParseStrategy {
    pub fn apply(&self, raw: &str) -> std::result::Result<ResponseBody, String> {
        match self {
            ParseStrategy::DirectJson => serde_json::from_str(raw)
                .map(ResponseBody::Json)
                .map_err(|e| e.to_string()),
            ParseStrategy::EmbeddedJson => {
                let span = extract_json_span(raw).ok_or_else(|| "No embedded JSON found".to_string())?;
                serde_json::from_str(span.trim())
                    .map(ResponseBody::Json)
                    .map_err(|e| e.to_string())
            }
            ParseStrategy::BulletList => {
                let items = parse_list_items(raw);
                if items.is_empty() {
                    Err("No list items found".to_string())
                } else {
                    Ok(ResponseBody::List(items))
                }
            }
            ParseStrategy::PlainText => Ok(ResponseBody::Text(raw.trim().to_string())),
        }
    }
}

/// Run the cascade. The `error` field carries the normalized diagnostic from
/// the direct JSON parse when a later strategy produced the body.
pub fn format_response(raw: &str) -> FormattedResult {
    let mut json_error = None;

    for strategy in STRATEGY_ORDER {
        match strategy.apply(raw) {
            Ok(body) => {
                return FormattedResult {
                    body,
                    success: true,
                    error: json_error,
                }
            }
            Err(e) => {
                if strategy == ParseStrategy::DirectJson {
                    json_error = Some(normalize_json_error(&e));
                }
            }
        }
    }

    // PlainText never fails, but keep the compiler satisfied.
    FormattedResult {
        body: ResponseBody::Text(raw.trim().to_string()),
        success: true,
        error: json_error,
    }
}

fn json_fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```json\s*\n(.*?)\n\s*```").expect("valid regex"))
}

fn generic_fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```(.*?)```").expect("valid regex"))
}

fn open_fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```(?:json)?\s*(.*)$").expect("valid regex"))
}

fn brace_span_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)(\{.*\})").expect("valid regex"))
}

/// First matching extraction pattern wins: ```json fence, generic fence,
/// unterminated fence, then the outermost brace-delimited span.
fn extract_json_span(text: &str) -> Option<&str> {
    for re in [
        json_fence_re(),
        generic_fence_re(),
        open_fence_re(),
        brace_span_re(),
    ] {
        if let Some(captures) = re.captures(text) {
            if let Some(span) = captures.get(1) {
                return Some(span.as_str());
            }
        }
    }
    None
}

fn numbered_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.\s*").expect("valid regex"))
}

/// Marker-prefixed lines become items; an unmarked line continues the
/// previous item (space-joined) or is discarded when no item exists yet.
fn parse_list_items(text: &str) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(stripped) = line
            .strip_prefix("- ")
            .or_else(|| line.strip_prefix("* "))
            .or_else(|| line.strip_prefix("\u{2022} "))
        {
            items.push(stripped.trim().to_string());
        } else if numbered_re().is_match(line) {
            items.push(numbered_re().replace(line, "").trim().to_string());
        } else if let Some(last) = items.last_mut() {
            last.push(' ');
            last.push_str(line);
        }
    }

    items
}
