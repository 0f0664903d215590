//! The transient record handed to a sink for every emission.

use chrono::{DateTime, SecondsFormat, Utc};
use opentelemetry::{KeyValue, Value};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::level::Bucket;

/// One trace-correlated log line.
///
/// Records are built by [`TraceLogger`](crate::TraceLogger) and live only
/// for the duration of a single [`LogSink::submit`](crate::LogSink::submit)
/// call unless the sink clones them.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub bucket: Bucket,
    pub timestamp: DateTime<Utc>,
    pub sender: String,
    pub trace_id: String,
    pub span_id: String,
    pub attributes: Vec<KeyValue>,
    pub message: String,
}

impl LogRecord {
    /// Look up an attribute by key. The first match wins.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes
            .iter()
            .find(|kv| kv.key.as_str() == key)
            .map(|kv| &kv.value)
    }

    /// Attributes as a JSON object string, or `None` when there are none.
    pub fn attributes_json(&self) -> Option<String> {
        if self.attributes.is_empty() {
            return None;
        }
        let object: serde_json::Map<String, serde_json::Value> = self
            .attributes
            .iter()
            .map(|kv| (kv.key.as_str().to_string(), attribute_json(&kv.value)))
            .collect();
        Some(serde_json::Value::Object(object).to_string())
    }
}

fn attribute_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::I64(i) => serde_json::Value::from(*i),
        Value::F64(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or_else(|| serde_json::Value::String(f.to_string())),
        Value::String(s) => serde_json::Value::String(s.as_str().to_string()),
        other => serde_json::Value::String(other.to_string()),
    }
}

// Attributes are flattened next to the fixed keys, zerolog style.
impl Serialize for LogRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(6 + self.attributes.len()))?;
        map.serialize_entry("level", self.bucket.as_str())?;
        map.serialize_entry(
            "time",
            &self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        )?;
        map.serialize_entry("sender", &self.sender)?;
        map.serialize_entry("trace_id", &self.trace_id)?;
        map.serialize_entry("span_id", &self.span_id)?;
        for kv in &self.attributes {
            map.serialize_entry(kv.key.as_str(), &attribute_json(&kv.value))?;
        }
        map.serialize_entry("message", &self.message)?;
        map.end()
    }
}
