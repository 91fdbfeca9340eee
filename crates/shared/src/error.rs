use serde::{Deserialize, Serialize};

/// Error body returned by the backend on non-2xx responses, e.g. `{"detail": "..."}`.
///
/// `detail` is kept as raw JSON because validation failures carry a list instead of a string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ApiErrorBody {
    pub fn detail_text(&self) -> Option<String> {
        match self.detail.as_ref()? {
            serde_json::Value::String(text) => Some(text.clone()),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}
