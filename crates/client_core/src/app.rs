//! Application controller: one place that owns every region, registers every
//! user action, and runs each interaction flow.

use std::sync::Arc;

use shared::{
    domain::CategoryTaxonomy,
    protocol::{AnnotateRequest, RetrainRequest, TextRequest},
};
use tokio::{sync::broadcast, task::JoinHandle, time::Instant};
use tracing::{debug, error, info, warn};

use crate::{
    config::ClientSettings,
    copy::UiCopy,
    error::{FlowError, RequestError, ValidationError},
    notify::Notifier,
    tracker::{Flow, FlowTicket, FlowTracker},
    views::{
        annotation::{
            AnnotationFormEvent, AnnotationFormView, AnnotationTableEvent, AnnotationTableView,
        },
        annotation_stats::{AnnotationStatsEvent, AnnotationStatsView},
        classification::{ClassificationEvent, ClassificationView, DisplayedClassification},
        history::{HistoryEvent, HistoryView},
        notifications::NotificationsView,
        suggestion::{SuggestionEvent, SuggestionView},
        tabs::{Tab, TabsEvent, TabsView},
        training::{TrainingEvent, TrainingFailure, TrainingStatusView},
        Region, RegionStore, View, ViewUpdate,
    },
    ClassifierApi,
};

/// Minimum trimmed length accepted by the AI-suggestion flow.
pub const MIN_SUGGESTION_CHARS: usize = 5;

/// Every user-triggerable event. Each maps to exactly one flow.
#[derive(Debug, Clone, PartialEq)]
pub enum UserAction {
    Classify { text: String },
    SwitchTab(Tab),
    EditAnnotationText(String),
    SelectMainCategory(String),
    ToggleSubCategory { name: String, checked: bool },
    SubmitAnnotation,
    RequestAiSuggestion,
    Retrain,
    ReloadHistory,
    LoadAnnotationStats,
    LoadTrainingOverview,
    EvaluateModel,
    ImportAnnotations(Vec<AnnotateRequest>),
}

impl UserAction {
    pub fn name(&self) -> &'static str {
        match self {
            UserAction::Classify { .. } => "classify",
            UserAction::SwitchTab(_) => "switch_tab",
            UserAction::EditAnnotationText(_) => "edit_annotation_text",
            UserAction::SelectMainCategory(_) => "select_main_category",
            UserAction::ToggleSubCategory { .. } => "toggle_sub_category",
            UserAction::SubmitAnnotation => "submit_annotation",
            UserAction::RequestAiSuggestion => "request_ai_suggestion",
            UserAction::Retrain => "retrain",
            UserAction::ReloadHistory => "reload_history",
            UserAction::LoadAnnotationStats => "load_annotation_stats",
            UserAction::LoadTrainingOverview => "load_training_overview",
            UserAction::EvaluateModel => "evaluate_model",
            UserAction::ImportAnnotations(_) => "import_annotations",
        }
    }
}

/// All display regions. Each is written by one flow only.
pub struct Views {
    pub tabs: Arc<RegionStore<TabsView>>,
    pub classification: Arc<RegionStore<ClassificationView>>,
    pub history: Arc<RegionStore<HistoryView>>,
    pub annotation_form: Arc<RegionStore<AnnotationFormView>>,
    pub annotation_table: Arc<RegionStore<AnnotationTableView>>,
    pub annotation_stats: Arc<RegionStore<AnnotationStatsView>>,
    pub suggestion: Arc<RegionStore<SuggestionView>>,
    pub training: Arc<RegionStore<TrainingStatusView>>,
    pub notifications: Arc<RegionStore<NotificationsView>>,
}

impl Views {
    fn new(
        settings: &ClientSettings,
        taxonomy: CategoryTaxonomy,
        updates: &broadcast::Sender<ViewUpdate>,
    ) -> Self {
        fn store<V: View>(state: V, updates: &broadcast::Sender<ViewUpdate>) -> Arc<RegionStore<V>> {
            Arc::new(RegionStore::new(state, updates.clone()))
        }

        Self {
            tabs: store(TabsView::default(), updates),
            classification: store(ClassificationView::default(), updates),
            history: store(HistoryView::default(), updates),
            annotation_form: store(AnnotationFormView::new(taxonomy), updates),
            annotation_table: store(AnnotationTableView::default(), updates),
            annotation_stats: store(AnnotationStatsView::default(), updates),
            suggestion: store(SuggestionView::default(), updates),
            training: store(TrainingStatusView::default(), updates),
            notifications: store(
                NotificationsView::new(settings.notification_container.clone()),
                updates,
            ),
        }
    }
}

struct Trackers {
    classify: FlowTracker,
    history: FlowTracker,
    annotate: FlowTracker,
    annotations: FlowTracker,
    annotation_stats: FlowTracker,
    retrain: FlowTracker,
    suggestion: FlowTracker,
    training_overview: FlowTracker,
    import: FlowTracker,
    export: FlowTracker,
    evaluate: FlowTracker,
}

impl Trackers {
    fn new() -> Self {
        Self {
            classify: FlowTracker::new(Flow::Classify),
            history: FlowTracker::new(Flow::History),
            annotate: FlowTracker::new(Flow::Annotate),
            annotations: FlowTracker::new(Flow::Annotations),
            annotation_stats: FlowTracker::new(Flow::AnnotationStats),
            retrain: FlowTracker::new(Flow::Retrain),
            suggestion: FlowTracker::new(Flow::Suggestion),
            training_overview: FlowTracker::new(Flow::TrainingOverview),
            import: FlowTracker::new(Flow::Import),
            export: FlowTracker::new(Flow::Export),
            evaluate: FlowTracker::new(Flow::Evaluate),
        }
    }
}

pub struct Application {
    api: Arc<dyn ClassifierApi>,
    settings: ClientSettings,
    copy: &'static UiCopy,
    updates: broadcast::Sender<ViewUpdate>,
    views: Views,
    notifier: Notifier,
    trackers: Trackers,
}

impl Application {
    pub fn new(settings: ClientSettings, api: Arc<dyn ClassifierApi>) -> Arc<Self> {
        Self::with_taxonomy(settings, api, CategoryTaxonomy::default())
    }

    pub fn with_taxonomy(
        settings: ClientSettings,
        api: Arc<dyn ClassifierApi>,
        taxonomy: CategoryTaxonomy,
    ) -> Arc<Self> {
        let (updates, _) = broadcast::channel(1024);
        let views = Views::new(&settings, taxonomy, &updates);
        let notifier = Notifier::new(
            Arc::clone(&views.notifications),
            settings.notification_ttl(),
        );
        Arc::new(Self {
            api,
            copy: settings.locale.copy(),
            settings,
            updates,
            views,
            notifier,
            trackers: Trackers::new(),
        })
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    pub fn copy(&self) -> &'static UiCopy {
        self.copy
    }

    pub fn views(&self) -> &Views {
        &self.views
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ViewUpdate> {
        self.updates.subscribe()
    }

    pub fn render(&self, region: Region) -> String {
        let copy = self.copy;
        match region {
            Region::Tabs => self.views.tabs.render(copy),
            Region::Classification => self.views.classification.render(copy),
            Region::History => self.views.history.render(copy),
            Region::AnnotationForm => self.views.annotation_form.render(copy),
            Region::AnnotationTable => self.views.annotation_table.render(copy),
            Region::AnnotationStats => self.views.annotation_stats.render(copy),
            Region::Suggestion => self.views.suggestion.render(copy),
            Region::TrainingStatus => self.views.training.render(copy),
            Region::Notifications => self.views.notifications.render(copy),
        }
    }

    /// Page-load work: the initial history render.
    pub async fn start(&self) {
        info!(server_url = %self.settings.server_url, "classifier client starting");
        if let Err(error) = self.load_history().await {
            debug!(%error, "initial history load failed");
        }
    }

    /// Routes a user action to its flow. Synchronous form edits apply in place;
    /// anything that talks to the backend is spawned so flows interleave freely.
    pub fn dispatch(self: &Arc<Self>, action: UserAction) -> Option<JoinHandle<()>> {
        debug!(action = action.name(), "dispatching user action");
        match action {
            UserAction::EditAnnotationText(text) => {
                self.set_annotation_text(text);
                None
            }
            UserAction::SelectMainCategory(category) => {
                self.select_main_category(category);
                None
            }
            UserAction::ToggleSubCategory { name, checked } => {
                self.toggle_sub_category(name, checked);
                None
            }
            action => {
                let app = Arc::clone(self);
                Some(tokio::spawn(async move {
                    let name = action.name();
                    if let Err(error) = app.run_action(action).await {
                        debug!(action = name, %error, "flow aborted");
                    }
                }))
            }
        }
    }

    async fn run_action(&self, action: UserAction) -> Result<(), FlowError> {
        match action {
            UserAction::Classify { text } => self.classify(&text).await,
            UserAction::SwitchTab(tab) => self.switch_tab(tab).await,
            UserAction::SubmitAnnotation => self.submit_annotation().await,
            UserAction::RequestAiSuggestion => self.request_ai_suggestion().await,
            UserAction::Retrain => self.retrain().await,
            UserAction::ReloadHistory => self.load_history().await,
            UserAction::LoadAnnotationStats => self.load_annotation_stats().await,
            UserAction::LoadTrainingOverview => self.load_training_overview().await,
            UserAction::EvaluateModel => self.evaluate_model().await,
            UserAction::ImportAnnotations(items) => self.import_annotations(items).await,
            UserAction::EditAnnotationText(text) => {
                self.set_annotation_text(text);
                Ok(())
            }
            UserAction::SelectMainCategory(category) => {
                self.select_main_category(category);
                Ok(())
            }
            UserAction::ToggleSubCategory { name, checked } => {
                self.toggle_sub_category(name, checked);
                Ok(())
            }
        }
    }

    /// Stale responses are always logged; they are only dropped when configured to.
    fn should_render(&self, ticket: &FlowTicket<'_>) -> bool {
        if ticket.is_current() {
            return true;
        }
        warn!(
            flow = ticket.flow().name(),
            generation = ticket.generation(),
            superseded = self.settings.supersede_stale_responses,
            "response arrived after a newer request of the same flow"
        );
        !self.settings.supersede_stale_responses
    }

    fn report_request_error(&self, flow: Flow, error: &RequestError, notice: &str) {
        match error {
            RequestError::Status {
                status,
                detail: Some(detail),
            } => error!(flow = flow.name(), status, %detail, "request failed"),
            _ => error!(flow = flow.name(), %error, "request failed"),
        }
        self.notifier.error(notice);
    }

    fn reject(&self, error: ValidationError, notice: &str) -> FlowError {
        debug!(%error, "validation failed");
        self.notifier.warning(notice);
        FlowError::Validation(error)
    }

    pub async fn classify(&self, text: &str) -> Result<(), FlowError> {
        if text.is_empty() {
            return Err(self.reject(ValidationError::EmptyText, self.copy.classify_empty_text));
        }

        let ticket = self.trackers.classify.begin();
        self.views.classification.apply(ClassificationEvent::Started);

        let request = TextRequest {
            text: text.to_string(),
        };
        match self.api.classify(&request).await {
            Ok(response) => {
                if self.should_render(&ticket) {
                    self.views
                        .classification
                        .apply(ClassificationEvent::Completed(DisplayedClassification {
                            input_text: request.text,
                            result: response.classification.into(),
                        }));
                    if let Some(history) = response.history {
                        self.views
                            .history
                            .apply(HistoryEvent::Replaced(Some(history)));
                    }
                }
                self.notifier.success(self.copy.classify_done);
                Ok(())
            }
            Err(error) => {
                // A superseded failure leaves the loader to the newer request.
                if self.should_render(&ticket) {
                    self.views.classification.apply(ClassificationEvent::Settled);
                }
                self.report_request_error(Flow::Classify, &error, self.copy.classify_failed);
                Err(error.into())
            }
        }
    }

    pub async fn load_history(&self) -> Result<(), FlowError> {
        let ticket = self.trackers.history.begin();
        match self.api.history(self.settings.history_limit).await {
            Ok(entries) => {
                info!(count = entries.len(), "history loaded");
                if self.should_render(&ticket) {
                    self.views.history.apply(HistoryEvent::Replaced(Some(entries)));
                }
                Ok(())
            }
            Err(error) => {
                self.report_request_error(Flow::History, &error, self.copy.history_load_failed);
                Err(error.into())
            }
        }
    }

    pub async fn switch_tab(&self, tab: Tab) -> Result<(), FlowError> {
        self.views.tabs.apply(TabsEvent::Activated(tab));
        if tab == Tab::Annotate {
            self.load_annotations().await?;
        }
        Ok(())
    }

    pub fn set_annotation_text(&self, text: impl Into<String>) {
        self.views
            .annotation_form
            .apply(AnnotationFormEvent::TextChanged(text.into()));
    }

    pub fn select_main_category(&self, category: impl Into<String>) {
        self.views
            .annotation_form
            .apply(AnnotationFormEvent::MainCategorySelected(category.into()));
    }

    pub fn toggle_sub_category(&self, name: impl Into<String>, checked: bool) {
        self.views
            .annotation_form
            .apply(AnnotationFormEvent::SubCategoryToggled {
                name: name.into(),
                checked,
            });
    }

    /// Annotate, then reload the list, and only then clear the form, so the
    /// new row is visible before the inputs are wiped. Failures leave the form filled.
    pub async fn submit_annotation(&self) -> Result<(), FlowError> {
        let request = match self.views.annotation_form.read(AnnotationFormView::to_request) {
            Ok(request) => request,
            Err(error) => return Err(self.reject(error, self.copy.annotation_incomplete)),
        };

        let _ticket = self.trackers.annotate.begin();
        let outcome = match self.api.annotate(&request).await {
            Ok(response) if response.is_success() => Ok(()),
            Ok(response) => Err(RequestError::Rejected(
                response
                    .status
                    .unwrap_or_else(|| "missing status".to_string()),
            )),
            Err(error) => Err(error),
        };
        if let Err(error) = outcome {
            self.report_request_error(Flow::Annotate, &error, self.copy.annotation_failed);
            return Err(error.into());
        }

        // The submission itself landed; a failed reload is already reported.
        if let Err(error) = self.load_annotations().await {
            debug!(%error, "annotation reload after submit failed");
        }
        self.views.annotation_form.apply(AnnotationFormEvent::Cleared);
        self.notifier.success(self.copy.annotation_done);
        Ok(())
    }

    pub async fn load_annotations(&self) -> Result<(), FlowError> {
        let ticket = self.trackers.annotations.begin();
        match self.api.annotations().await {
            Ok(rows) => {
                if self.should_render(&ticket) {
                    self.views
                        .annotation_table
                        .apply(AnnotationTableEvent::Replaced(rows));
                }
                Ok(())
            }
            Err(error) => {
                self.report_request_error(
                    Flow::Annotations,
                    &error,
                    self.copy.annotations_load_failed,
                );
                Err(error.into())
            }
        }
    }

    pub async fn load_annotation_stats(&self) -> Result<(), FlowError> {
        let ticket = self.trackers.annotation_stats.begin();
        match self.api.annotation_stats().await {
            Ok(stats) => {
                info!(
                    days = stats.daily_stats.len(),
                    annotators = stats.annotator_stats.len(),
                    "annotation stats loaded"
                );
                if self.should_render(&ticket) {
                    self.views
                        .annotation_stats
                        .apply(AnnotationStatsEvent::Loaded(stats));
                }
                Ok(())
            }
            Err(error) => {
                self.report_request_error(
                    Flow::AnnotationStats,
                    &error,
                    self.copy.annotation_stats_failed,
                );
                Err(error.into())
            }
        }
    }

    pub async fn request_ai_suggestion(&self) -> Result<(), FlowError> {
        let text = self.views.annotation_form.read(|form| form.text.clone());
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(self.reject(
                ValidationError::SuggestionTextEmpty,
                self.copy.suggestion_empty_text,
            ));
        }
        if trimmed.chars().count() < MIN_SUGGESTION_CHARS {
            return Err(self.reject(
                ValidationError::SuggestionTextTooShort {
                    min: MIN_SUGGESTION_CHARS,
                },
                self.copy.suggestion_too_short,
            ));
        }

        let ticket = self.trackers.suggestion.begin();
        self.views.suggestion.apply(SuggestionEvent::Requested);
        match self.api.ai_suggestion(&TextRequest { text }).await {
            Ok(suggestion) => {
                if self.should_render(&ticket) {
                    self.views
                        .suggestion
                        .apply(SuggestionEvent::Received(suggestion));
                }
                self.notifier.success(self.copy.suggestion_done);
                Ok(())
            }
            Err(error) => {
                if self.should_render(&ticket) {
                    self.views
                        .suggestion
                        .apply(SuggestionEvent::Failed(error.to_string()));
                }
                self.report_request_error(Flow::Suggestion, &error, self.copy.suggestion_failed);
                Err(error.into())
            }
        }
    }

    /// Single-shot retrain with a three-phase status narrative. Overlapping
    /// invocations are not suppressed, and the hide timer is not coordinated
    /// with later runs.
    pub async fn retrain(&self) -> Result<(), FlowError> {
        let started = Instant::now();
        let ticket = self.trackers.retrain.begin();
        if self.trackers.retrain.in_flight() > 1 {
            warn!(
                generation = ticket.generation(),
                in_flight = self.trackers.retrain.in_flight(),
                "retrain started while another is still running"
            );
        }

        let outcome = self.run_retrain(started).await;
        let result = match outcome {
            Ok(message) => {
                info!(
                    generation = ticket.generation(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "retrain complete"
                );
                self.notifier.success(message);
                Ok(())
            }
            Err(error) => {
                let failure = if error.is_status() {
                    TrainingFailure::ServerResponse
                } else {
                    TrainingFailure::Other(error.to_string())
                };
                self.views.training.apply(TrainingEvent::Failed(failure));
                self.report_request_error(Flow::Retrain, &error, self.copy.training_failed_notice);
                Err(error.into())
            }
        };

        self.schedule_status_hide();
        result
    }

    async fn run_retrain(&self, started: Instant) -> Result<String, RequestError> {
        let training = &self.views.training;
        training.apply(TrainingEvent::Preparing);

        let stats = self.api.training_data().await?;
        training.apply(TrainingEvent::DataCounted(stats.stats.total));

        training.apply(TrainingEvent::InProgress);
        self.notifier.info(self.copy.training_started);

        let response = self.api.retrain(&RetrainRequest::FIXED).await?;
        training.apply(TrainingEvent::Completed {
            elapsed_seconds: started.elapsed().as_secs_f64(),
        });

        Ok(response
            .message
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| self.copy.training_default_success.to_string()))
    }

    fn schedule_status_hide(&self) {
        let training = Arc::clone(&self.views.training);
        let delay = self.settings.status_hide_delay();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            training.apply(TrainingEvent::Hidden);
        });
    }

    pub async fn load_training_overview(&self) -> Result<(), FlowError> {
        let ticket = self.trackers.training_overview.begin();
        match self.api.training_data().await {
            Ok(overview) => {
                if self.should_render(&ticket) {
                    self.views
                        .training
                        .apply(TrainingEvent::OverviewLoaded(overview));
                }
                Ok(())
            }
            Err(error) => {
                self.report_request_error(
                    Flow::TrainingOverview,
                    &error,
                    self.copy.training_overview_failed,
                );
                Err(error.into())
            }
        }
    }

    /// Bulk import. Every item must satisfy the same invariant as a single annotation.
    pub async fn import_annotations(&self, items: Vec<AnnotateRequest>) -> Result<(), FlowError> {
        if let Some(index) = items.iter().position(|item| {
            item.text.is_empty() || item.main_category.is_empty() || item.sub_categories.is_empty()
        }) {
            return Err(self.reject(
                ValidationError::IncompleteImportItem { index },
                self.copy.import_incomplete,
            ));
        }

        let _ticket = self.trackers.import.begin();
        let outcome = match self.api.import_annotations(&items).await {
            Ok(response) if response.is_success() => Ok(response.message),
            Ok(response) => Err(RequestError::Rejected(
                response
                    .status
                    .unwrap_or_else(|| "missing status".to_string()),
            )),
            Err(error) => Err(error),
        };

        match outcome {
            Ok(message) => {
                info!(count = items.len(), "annotations imported");
                self.notifier.success(
                    message
                        .filter(|m| !m.is_empty())
                        .unwrap_or_else(|| self.copy.import_default_success.to_string()),
                );
                if let Err(error) = self.load_annotations().await {
                    debug!(%error, "annotation reload after import failed");
                }
                Ok(())
            }
            Err(error) => {
                self.report_request_error(Flow::Import, &error, self.copy.import_failed);
                Err(error.into())
            }
        }
    }

    /// Raw exported rows for the caller to persist; no region is touched.
    pub async fn export_annotations(&self) -> Result<Vec<serde_json::Value>, FlowError> {
        let _ticket = self.trackers.export.begin();
        match self.api.export_annotations().await {
            Ok(export) => Ok(export.data),
            Err(error) => {
                self.report_request_error(Flow::Export, &error, self.copy.export_failed);
                Err(error.into())
            }
        }
    }

    pub async fn evaluate_model(&self) -> Result<(), FlowError> {
        let ticket = self.trackers.evaluate.begin();
        match self.api.evaluate_model().await {
            Ok(evaluation) => {
                info!(
                    accuracy = evaluation.accuracy,
                    rows = evaluation.evaluation_results.len(),
                    "model evaluated"
                );
                if self.should_render(&ticket) {
                    self.views
                        .training
                        .apply(TrainingEvent::Evaluated(evaluation));
                }
                self.notifier.success(self.copy.evaluate_done);
                Ok(())
            }
            Err(error) => {
                self.report_request_error(Flow::Evaluate, &error, self.copy.evaluate_failed);
                Err(error.into())
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/app_tests.rs"]
mod tests;
