use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A previously indexed piece of telemetry plus its descriptive metadata, as
/// returned by the similarity-search service. Read-only to the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedRecord {
    pub content: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl RetrievedRecord {
    /// Metadata "type" tag (e.g. `"developer"`, `"trend"`, `"kpi_status"`).
    pub fn doc_type(&self) -> Option<&str> {
        self.metadata.get("type").and_then(Value::as_str)
    }

    /// Normalize into one flat JSON object: content that parses as structured
    /// data is merged with the metadata; otherwise the raw text is kept under
    /// `raw_content` alongside it.
    pub fn flatten(&self) -> Value {
        let mut merged = match serde_json::from_str::<Value>(&self.content) {
            Ok(Value::Object(fields)) => fields,
            _ => {
                let mut fields = Map::new();
                fields.insert("raw_content".to_string(), Value::String(self.content.clone()));
                fields
            }
        };
        for (key, value) in &self.metadata {
            merged.insert(key.clone(), value.clone());
        }
        Value::Object(merged)
    }
}
