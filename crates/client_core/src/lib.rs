use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    error::ApiErrorBody,
    protocol::{
        AiSuggestion, AnnotateRequest, Annotation, AnnotationStatsResponse, ClassifyResponse, EvaluationResponse,
        ExportResponse, HistoryEntry, RetrainRequest, StatusResponse, TextRequest,
        TrainingDataResponse,
    },
};
use tracing::debug;
use url::Url;

pub mod app;
pub mod config;
pub mod copy;
pub mod error;
pub mod markup;
pub mod notify;
pub mod tracker;
pub mod views;

pub use app::{Application, UserAction};
pub use config::{load_settings, ClientSettings};
pub use copy::{Locale, UiCopy};
pub use error::{FlowError, RequestError, ValidationError};
pub use views::{tabs::Tab, Region, ViewUpdate};

/// Backend operations consumed by the interaction flows.
///
/// Every response goes through a typed decode; a body that does not match
/// the contract is a [`RequestError::Decode`], never a partially filled value.
#[async_trait]
pub trait ClassifierApi: Send + Sync {
    async fn classify(&self, request: &TextRequest) -> Result<ClassifyResponse, RequestError>;
    async fn history(&self, limit: u32) -> Result<Vec<HistoryEntry>, RequestError>;
    async fn annotate(&self, request: &AnnotateRequest) -> Result<StatusResponse, RequestError>;
    async fn annotations(&self) -> Result<Vec<Annotation>, RequestError>;
    async fn annotation_stats(&self) -> Result<AnnotationStatsResponse, RequestError>;
    async fn training_data(&self) -> Result<TrainingDataResponse, RequestError>;
    async fn retrain(&self, request: &RetrainRequest) -> Result<StatusResponse, RequestError>;
    async fn ai_suggestion(&self, request: &TextRequest) -> Result<AiSuggestion, RequestError>;
    async fn import_annotations(
        &self,
        items: &[AnnotateRequest],
    ) -> Result<StatusResponse, RequestError>;
    async fn export_annotations(&self) -> Result<ExportResponse, RequestError>;
    async fn evaluate_model(&self) -> Result<EvaluationResponse, RequestError>;
}

/// JSON-over-HTTP implementation. No timeout and no retry: a request runs
/// until the transport resolves or fails.
pub struct HttpClassifierApi {
    http: Client,
    base_url: Url,
}

impl HttpClassifierApi {
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    pub fn from_settings(settings: &ClientSettings) -> anyhow::Result<Self> {
        Ok(Self::new(settings.base_url()?))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, RequestError> {
        self.base_url
            .join(path)
            .map_err(|e| RequestError::Transport(format!("invalid endpoint `{path}`: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, RequestError> {
        let url = self.endpoint(path)?;
        debug!(%url, "GET");
        let response = self.http.get(url).query(query).send().await?;
        read_json(response).await
    }

    async fn post_json<B, T>(&self, path: &str, body: Option<&B>) -> Result<T, RequestError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        debug!(%url, "POST");
        let mut request = self.http.post(url);
        if let Some(body) = body {
            request = request.json(body);
        }
        read_json(request.send().await?).await
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, RequestError> {
    let status = response.status();
    let bytes = response.bytes().await?;
    if !status.is_success() {
        let detail = serde_json::from_slice::<ApiErrorBody>(&bytes)
            .ok()
            .and_then(|body| body.detail_text());
        return Err(RequestError::Status {
            status: status.as_u16(),
            detail,
        });
    }
    Ok(serde_json::from_slice(&bytes)?)
}

#[async_trait]
impl ClassifierApi for HttpClassifierApi {
    async fn classify(&self, request: &TextRequest) -> Result<ClassifyResponse, RequestError> {
        self.post_json("classify", Some(request)).await
    }

    async fn history(&self, limit: u32) -> Result<Vec<HistoryEntry>, RequestError> {
        self.get_json("history", &[("limit", limit.to_string())])
            .await
    }

    async fn annotate(&self, request: &AnnotateRequest) -> Result<StatusResponse, RequestError> {
        self.post_json("annotate", Some(request)).await
    }

    async fn annotations(&self) -> Result<Vec<Annotation>, RequestError> {
        self.get_json("annotations", &[]).await
    }

    async fn annotation_stats(&self) -> Result<AnnotationStatsResponse, RequestError> {
        self.get_json("annotation-stats", &[]).await
    }

    async fn training_data(&self) -> Result<TrainingDataResponse, RequestError> {
        self.get_json("training-data", &[]).await
    }

    async fn retrain(&self, request: &RetrainRequest) -> Result<StatusResponse, RequestError> {
        self.post_json("retrain", Some(request)).await
    }

    async fn ai_suggestion(&self, request: &TextRequest) -> Result<AiSuggestion, RequestError> {
        self.post_json("ai-suggestion", Some(request)).await
    }

    async fn import_annotations(
        &self,
        items: &[AnnotateRequest],
    ) -> Result<StatusResponse, RequestError> {
        self.post_json("import-annotations", Some(items)).await
    }

    async fn export_annotations(&self) -> Result<ExportResponse, RequestError> {
        self.get_json("export-annotations", &[]).await
    }

    async fn evaluate_model(&self) -> Result<EvaluationResponse, RequestError> {
        self.post_json::<(), _>("evaluate-model", None).await
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
