use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, NaiveDateTime};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Server timestamp as displayed to the user.
///
/// The backend emits SQLite `CURRENT_TIMESTAMP` strings (`2024-05-01 08:30:00`),
/// Python `isoformat()` strings and occasionally RFC 3339 with an offset.
/// All of them are normalised to a naive wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(pub NaiveDateTime);

impl Timestamp {
    const NAIVE_FORMATS: [&'static str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
            return Some(Self(with_offset.naive_local()));
        }
        Self::NAIVE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
            .map(Self)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0.format("%Y-%m-%dT%H:%M:%S%.f"))
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Timestamp::parse(&raw)
            .ok_or_else(|| de::Error::custom(format!("unrecognised timestamp `{raw}`")))
    }
}

/// Sub-categories as the backend returns them: normally a list, but stored rows
/// may carry any JSON value and the tables render those verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubCategories {
    List(Vec<String>),
    Raw(serde_json::Value),
}

impl Default for SubCategories {
    fn default() -> Self {
        SubCategories::List(Vec::new())
    }
}

impl SubCategories {
    /// Joins a list with `separator`; any other value is shown as-is.
    pub fn joined(&self, separator: &str) -> String {
        match self {
            SubCategories::List(items) => items.join(separator),
            SubCategories::Raw(serde_json::Value::String(text)) => text.clone(),
            SubCategories::Raw(serde_json::Value::Null) => String::new(),
            SubCategories::Raw(other) => other.to_string(),
        }
    }

    /// Joins a list with `separator`; any other value is shown as its JSON encoding.
    pub fn joined_or_json(&self, separator: &str) -> String {
        match self {
            SubCategories::List(items) => items.join(separator),
            SubCategories::Raw(other) => other.to_string(),
        }
    }
}

impl fmt::Display for SubCategories {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined(", "))
    }
}

/// `{text}` body for `POST /classify` and `POST /ai-suggestion`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

/// Classification as returned by `POST /classify`. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_categories: Option<SubCategories>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyResponse {
    pub classification: ClassificationPayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<HistoryEntry>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub text: String,
    pub main_category: String,
    #[serde(default)]
    pub sub_categories: SubCategories,
    pub confidence: f64,
    pub timestamp: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotateRequest {
    pub text: String,
    pub main_category: String,
    pub sub_categories: Vec<String>,
}

/// `{status, message}` envelope shared by annotate, import and retrain responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StatusResponse {
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some("success")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub text: String,
    pub main_category: String,
    #[serde(default)]
    pub sub_categories: SubCategories,
    pub timestamp: Timestamp,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingStats {
    pub total: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingDataResponse {
    pub stats: TrainingStats,
    #[serde(default)]
    pub distribution: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetrainRequest {
    pub epochs: u32,
    pub batch_size: u32,
    pub learning_rate: f64,
    pub validation_split: f64,
}

impl RetrainRequest {
    /// Hyperparameters sent with every retrain; not user-configurable.
    pub const FIXED: RetrainRequest = RetrainRequest {
        epochs: 10,
        batch_size: 32,
        learning_rate: 0.001,
        validation_split: 0.2,
    };
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelPrediction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_categories: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiSuggestion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_categories: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_prediction: Option<ModelPrediction>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportResponse {
    #[serde(default)]
    pub data: Vec<serde_json::Value>,
}

/// Human annotation counts from `GET /annotation-stats`, keyed by day and by annotator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationStatsResponse {
    #[serde(default)]
    pub daily_stats: BTreeMap<String, u64>,
    #[serde(default)]
    pub annotator_stats: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRow {
    pub text: String,
    pub true_category: String,
    pub predicted_category: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResponse {
    #[serde(default)]
    pub evaluation_results: Vec<EvaluationRow>,
    pub accuracy: f64,
}
