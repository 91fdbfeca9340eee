use super::*;

use std::{
    collections::VecDeque,
    sync::Mutex,
    time::Duration,
};

use async_trait::async_trait;
use shared::{
    domain::Severity,
    protocol::{
        AiSuggestion, Annotation, AnnotationStatsResponse, ClassificationPayload, ClassifyResponse, EvaluationResponse,
        EvaluationRow, ExportResponse, HistoryEntry, ModelPrediction, StatusResponse,
        SubCategories, Timestamp, TrainingDataResponse, TrainingStats,
    },
};
use tokio::sync::{oneshot, Notify};

use crate::{
    copy::Locale,
    views::{suggestion::SuggestionView, training::TrainingPhase},
};

type Reply<T> = Result<T, RequestError>;

struct FakeApi {
    calls: Mutex<Vec<String>>,
    classify_delays: Mutex<VecDeque<Duration>>,
    classify_error: Mutex<Option<RequestError>>,
    classify_history: Mutex<Option<Vec<HistoryEntry>>>,
    history: Mutex<Reply<Vec<HistoryEntry>>>,
    annotate: Mutex<Reply<StatusResponse>>,
    annotations: Mutex<Reply<Vec<Annotation>>>,
    annotations_gate: Mutex<Option<oneshot::Receiver<()>>>,
    annotations_entered: Notify,
    annotation_stats: Mutex<Reply<AnnotationStatsResponse>>,
    training_data: Mutex<Reply<TrainingDataResponse>>,
    retrain: Mutex<Reply<StatusResponse>>,
    retrain_delay: Duration,
    suggestion: Mutex<Reply<AiSuggestion>>,
    import: Mutex<Reply<StatusResponse>>,
    evaluate: Mutex<Reply<EvaluationResponse>>,
}

impl Default for FakeApi {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            classify_delays: Mutex::new(VecDeque::new()),
            classify_error: Mutex::new(None),
            classify_history: Mutex::new(None),
            history: Mutex::new(Ok(Vec::new())),
            annotate: Mutex::new(Ok(success("标注成功"))),
            annotations: Mutex::new(Ok(Vec::new())),
            annotations_gate: Mutex::new(None),
            annotations_entered: Notify::new(),
            annotation_stats: Mutex::new(Ok(AnnotationStatsResponse::default())),
            training_data: Mutex::new(Ok(TrainingDataResponse {
                stats: TrainingStats {
                    total: 12,
                    categories: Some(3),
                },
                distribution: Default::default(),
            })),
            retrain: Mutex::new(Ok(success("模型重新训练完成"))),
            retrain_delay: Duration::ZERO,
            suggestion: Mutex::new(Ok(AiSuggestion::default())),
            import: Mutex::new(Ok(success("成功导入1条数据"))),
            evaluate: Mutex::new(Ok(EvaluationResponse {
                evaluation_results: Vec::new(),
                accuracy: 0.5,
            })),
        }
    }
}

impl FakeApi {
    fn record(&self, call: impl Into<String>) {
        self.calls.lock().expect("calls").push(call.into());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls").clone()
    }
}

fn success(message: &str) -> StatusResponse {
    StatusResponse {
        status: Some("success".into()),
        message: Some(message.into()),
    }
}

fn server_error() -> RequestError {
    RequestError::Status {
        status: 500,
        detail: None,
    }
}

fn timestamp() -> Timestamp {
    Timestamp::parse("2024-05-01 08:30:00").expect("timestamp")
}

fn history_entry(text: &str) -> HistoryEntry {
    HistoryEntry {
        text: text.into(),
        main_category: "中性".into(),
        sub_categories: SubCategories::List(vec!["日常交流".into()]),
        confidence: 0.7,
        timestamp: timestamp(),
    }
}

fn annotation(text: &str) -> Annotation {
    Annotation {
        text: text.into(),
        main_category: "正向价值观".into(),
        sub_categories: SubCategories::List(vec!["爱国".into()]),
        timestamp: timestamp(),
    }
}

#[async_trait]
impl ClassifierApi for FakeApi {
    async fn classify(&self, request: &TextRequest) -> Result<ClassifyResponse, RequestError> {
        self.record(format!("classify:{}", request.text));
        let delay = self.classify_delays.lock().expect("delays").pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = self.classify_error.lock().expect("error").clone() {
            return Err(error);
        }
        Ok(ClassifyResponse {
            classification: ClassificationPayload {
                category: Some(format!("cat-{}", request.text)),
                sub_categories: None,
                confidence: Some(0.9),
            },
            history: self.classify_history.lock().expect("history").clone(),
        })
    }

    async fn history(&self, limit: u32) -> Result<Vec<HistoryEntry>, RequestError> {
        self.record(format!("history:{limit}"));
        self.history.lock().expect("history").clone()
    }

    async fn annotate(&self, request: &AnnotateRequest) -> Result<StatusResponse, RequestError> {
        self.record(format!(
            "annotate:{}:{}:{}",
            request.text,
            request.main_category,
            request.sub_categories.join("+")
        ));
        self.annotate.lock().expect("annotate").clone()
    }

    async fn annotations(&self) -> Result<Vec<Annotation>, RequestError> {
        self.record("annotations");
        self.annotations_entered.notify_one();
        let gate = self.annotations_gate.lock().expect("gate").take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.annotations.lock().expect("annotations").clone()
    }

    async fn annotation_stats(&self) -> Result<AnnotationStatsResponse, RequestError> {
        self.record("annotation_stats");
        self.annotation_stats.lock().expect("stats").clone()
    }

    async fn training_data(&self) -> Result<TrainingDataResponse, RequestError> {
        self.record("training_data");
        self.training_data.lock().expect("training").clone()
    }

    async fn retrain(&self, request: &RetrainRequest) -> Result<StatusResponse, RequestError> {
        self.record(format!(
            "retrain:{}:{}:{}:{}",
            request.epochs, request.batch_size, request.learning_rate, request.validation_split
        ));
        tokio::time::sleep(self.retrain_delay).await;
        self.retrain.lock().expect("retrain").clone()
    }

    async fn ai_suggestion(&self, request: &TextRequest) -> Result<AiSuggestion, RequestError> {
        self.record(format!("suggestion:{}", request.text));
        self.suggestion.lock().expect("suggestion").clone()
    }

    async fn import_annotations(
        &self,
        items: &[AnnotateRequest],
    ) -> Result<StatusResponse, RequestError> {
        self.record(format!("import:{}", items.len()));
        self.import.lock().expect("import").clone()
    }

    async fn export_annotations(&self) -> Result<ExportResponse, RequestError> {
        self.record("export");
        Ok(ExportResponse {
            data: vec![serde_json::json!([1, "text", "中性"])],
        })
    }

    async fn evaluate_model(&self) -> Result<EvaluationResponse, RequestError> {
        self.record("evaluate");
        self.evaluate.lock().expect("evaluate").clone()
    }
}

fn settings(locale: Locale) -> ClientSettings {
    ClientSettings {
        locale,
        ..ClientSettings::default()
    }
}

fn app_with(api: FakeApi, settings: ClientSettings) -> (Arc<Application>, Arc<FakeApi>) {
    let api = Arc::new(api);
    let app = Application::new(settings, Arc::clone(&api) as Arc<dyn ClassifierApi>);
    (app, api)
}

fn notifications(app: &Application) -> Vec<(String, Severity)> {
    app.views()
        .notifications
        .read(|v| v.items.iter().map(|n| (n.message.clone(), n.severity)).collect())
}

fn fill_annotation_form(app: &Application) {
    app.set_annotation_text("我爱我的祖国");
    app.select_main_category("正向价值观");
    app.toggle_sub_category("爱国", true);
}

#[tokio::test]
async fn classify_rejects_empty_text_before_any_request() {
    let (app, api) = app_with(FakeApi::default(), settings(Locale::ZhCn));

    let err = app.classify("").await.expect_err("empty text");
    assert_eq!(err, FlowError::Validation(ValidationError::EmptyText));
    assert!(api.calls().is_empty());
    assert_eq!(
        notifications(&app),
        vec![("请输入文本".to_string(), Severity::Warning)]
    );
    assert!(!app.views().classification.read(|v| v.visible));
}

#[tokio::test]
async fn classify_renders_result_history_and_one_notification() {
    let api = FakeApi::default();
    *api.classify_history.lock().expect("history") =
        Some(vec![history_entry("a"), history_entry("b")]);
    let (app, api) = app_with(api, settings(Locale::ZhCn));

    app.classify("hello").await.expect("classify");

    assert_eq!(api.calls(), vec!["classify:hello".to_string()]);
    let view = app.views().classification.snapshot();
    assert!(view.visible);
    assert!(!view.loading);
    let displayed = view.displayed.expect("displayed");
    assert_eq!(displayed.input_text, "hello");
    assert_eq!(displayed.result.category.as_deref(), Some("cat-hello"));
    assert_eq!(
        app.views()
            .history
            .read(|v| v.entries.as_ref().map(Vec::len)),
        Some(2)
    );
    assert_eq!(
        notifications(&app),
        vec![("分类完成".to_string(), Severity::Success)]
    );
}

#[tokio::test]
async fn classify_without_history_payload_leaves_history_untouched() {
    let (app, _api) = app_with(FakeApi::default(), settings(Locale::ZhCn));
    app.views()
        .history
        .apply(HistoryEvent::Replaced(Some(vec![history_entry("kept")])));

    app.classify("hello").await.expect("classify");

    assert_eq!(
        app.views()
            .history
            .read(|v| v.entries.clone().unwrap_or_default()[0].text.clone()),
        "kept"
    );
}

#[tokio::test]
async fn classify_failure_clears_loader_and_keeps_previous_result() {
    let (app, api) = app_with(FakeApi::default(), settings(Locale::ZhCn));
    app.classify("first").await.expect("classify");

    *api.classify_error.lock().expect("error") = Some(RequestError::Decode("not json".into()));
    let err = app.classify("second").await.expect_err("failure");
    assert!(matches!(err, FlowError::Request(RequestError::Decode(_))));

    let view = app.views().classification.snapshot();
    assert!(!view.loading);
    assert_eq!(view.displayed.expect("displayed").input_text, "first");
    assert_eq!(
        notifications(&app).last(),
        Some(&("分类过程中发生错误".to_string(), Severity::Error))
    );
}

#[tokio::test(start_paused = true)]
async fn late_classify_response_wins_by_default() {
    let api = FakeApi::default();
    api.classify_delays
        .lock()
        .expect("delays")
        .extend([Duration::from_millis(500), Duration::from_millis(100)]);
    let (app, _api) = app_with(api, settings(Locale::ZhCn));

    let (slow, fast) = tokio::join!(app.classify("slow"), app.classify("fast"));
    slow.expect("slow");
    fast.expect("fast");

    let displayed = app
        .views()
        .classification
        .read(|v| v.displayed.clone())
        .expect("displayed");
    assert_eq!(displayed.input_text, "slow");
}

#[tokio::test(start_paused = true)]
async fn stale_classify_response_is_dropped_when_superseding() {
    let api = FakeApi::default();
    api.classify_delays
        .lock()
        .expect("delays")
        .extend([Duration::from_millis(500), Duration::from_millis(100)]);
    let (app, _api) = app_with(
        api,
        ClientSettings {
            supersede_stale_responses: true,
            ..ClientSettings::default()
        },
    );

    let (slow, fast) = tokio::join!(app.classify("slow"), app.classify("fast"));
    slow.expect("slow");
    fast.expect("fast");

    let view = app.views().classification.snapshot();
    assert!(!view.loading);
    assert_eq!(view.displayed.expect("displayed").input_text, "fast");
    assert_eq!(
        notifications(&app)
            .iter()
            .filter(|(_, severity)| *severity == Severity::Success)
            .count(),
        2
    );
}

#[tokio::test(start_paused = true)]
async fn superseded_classify_leaves_the_loader_to_the_newer_request() {
    let api = FakeApi::default();
    api.classify_delays
        .lock()
        .expect("delays")
        .extend([Duration::from_millis(100), Duration::from_millis(500)]);
    let (app, _api) = app_with(
        api,
        ClientSettings {
            supersede_stale_responses: true,
            ..ClientSettings::default()
        },
    );

    let (old, new, mid_flight) = tokio::join!(
        app.classify("old"),
        app.classify("new"),
        async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            app.views().classification.snapshot()
        }
    );
    old.expect("old");
    new.expect("new");

    assert!(mid_flight.loading);
    assert!(mid_flight.displayed.is_none());
    let view = app.views().classification.snapshot();
    assert!(!view.loading);
    assert_eq!(view.displayed.expect("displayed").input_text, "new");
}

#[tokio::test(start_paused = true)]
async fn superseded_classify_failure_keeps_the_loader() {
    let api = FakeApi::default();
    api.classify_delays
        .lock()
        .expect("delays")
        .extend([Duration::from_millis(100), Duration::from_millis(500)]);
    *api.classify_error.lock().expect("error") = Some(server_error());
    let (app, _api) = app_with(
        api,
        ClientSettings {
            supersede_stale_responses: true,
            ..ClientSettings::default()
        },
    );

    let (old, new, mid_flight_loading) = tokio::join!(
        app.classify("old"),
        app.classify("new"),
        async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            app.views().classification.read(|v| v.loading)
        }
    );
    old.expect_err("old");
    new.expect_err("new");

    assert!(mid_flight_loading);
    assert!(!app.views().classification.read(|v| v.loading));
    assert_eq!(
        notifications(&app)
            .iter()
            .filter(|(_, severity)| *severity == Severity::Error)
            .count(),
        2
    );
}

#[tokio::test]
async fn start_loads_history_with_configured_limit() {
    let api = FakeApi::default();
    *api.history.lock().expect("history") = Ok(vec![history_entry("x")]);
    let (app, api) = app_with(
        api,
        ClientSettings {
            history_limit: 7,
            ..ClientSettings::default()
        },
    );

    app.start().await;

    assert_eq!(api.calls(), vec!["history:7".to_string()]);
    assert!(!app.views().history.read(|v| v.is_empty()));
}

#[tokio::test]
async fn history_failure_notifies_and_keeps_placeholder() {
    let api = FakeApi::default();
    *api.history.lock().expect("history") = Err(server_error());
    let (app, _api) = app_with(api, settings(Locale::ZhCn));

    app.start().await;

    assert!(app.render(Region::History).contains("暂无历史记录"));
    assert_eq!(
        notifications(&app),
        vec![("加载历史记录失败".to_string(), Severity::Error)]
    );
}

#[tokio::test]
async fn annotation_without_sub_category_is_rejected_before_any_request() {
    let (app, api) = app_with(FakeApi::default(), settings(Locale::ZhCn));
    app.set_annotation_text("text");
    app.select_main_category("中性");

    let err = app.submit_annotation().await.expect_err("incomplete");
    assert_eq!(
        err,
        FlowError::Validation(ValidationError::IncompleteAnnotation)
    );
    assert!(api.calls().is_empty());
    assert_eq!(
        notifications(&app),
        vec![("请填写完整的标注信息".to_string(), Severity::Warning)]
    );
}

#[tokio::test]
async fn complete_annotation_issues_one_annotate_then_reloads() {
    let api = FakeApi::default();
    *api.annotations.lock().expect("annotations") = Ok(vec![annotation("我爱我的祖国")]);
    let (app, api) = app_with(api, settings(Locale::ZhCn));
    fill_annotation_form(&app);

    app.submit_annotation().await.expect("submit");

    assert_eq!(
        api.calls(),
        vec![
            "annotate:我爱我的祖国:正向价值观:爱国".to_string(),
            "annotations".to_string()
        ]
    );
    assert!(app.views().annotation_form.read(|f| f.is_pristine()));
    assert_eq!(app.views().annotation_table.read(|t| t.rows.len()), 1);
    assert_eq!(
        notifications(&app),
        vec![("标注成功".to_string(), Severity::Success)]
    );
}

#[tokio::test]
async fn form_stays_populated_until_annotation_reload_resolves() {
    let api = FakeApi::default();
    let (release, gate) = oneshot::channel();
    *api.annotations_gate.lock().expect("gate") = Some(gate);
    *api.annotations.lock().expect("annotations") = Ok(vec![annotation("我爱我的祖国")]);
    let (app, api) = app_with(api, settings(Locale::ZhCn));
    fill_annotation_form(&app);

    let submit = app
        .dispatch(UserAction::SubmitAnnotation)
        .expect("spawned");
    api.annotations_entered.notified().await;

    let form = app.views().annotation_form.snapshot();
    assert_eq!(form.text, "我爱我的祖国");
    assert_eq!(form.main_category, "正向价值观");
    assert_eq!(form.checked_sub_categories(), vec!["爱国".to_string()]);
    assert!(app.views().annotation_table.read(|t| t.rows.is_empty()));

    release.send(()).expect("release reload");
    submit.await.expect("join");

    assert_eq!(app.views().annotation_table.read(|t| t.rows.len()), 1);
    assert!(app.views().annotation_form.read(|f| f.is_pristine()));
}

#[tokio::test]
async fn failed_annotation_leaves_form_populated() {
    let api = FakeApi::default();
    *api.annotate.lock().expect("annotate") = Err(RequestError::Transport("refused".into()));
    let (app, api) = app_with(api, settings(Locale::ZhCn));
    fill_annotation_form(&app);

    app.submit_annotation().await.expect_err("failure");

    assert_eq!(api.calls().len(), 1);
    assert!(!app.views().annotation_form.read(|f| f.is_pristine()));
    assert_eq!(
        notifications(&app),
        vec![("标注失败，请重试".to_string(), Severity::Error)]
    );
}

#[tokio::test]
async fn non_success_annotation_status_is_a_request_error() {
    let api = FakeApi::default();
    *api.annotate.lock().expect("annotate") = Ok(StatusResponse {
        status: Some("duplicate".into()),
        message: None,
    });
    let (app, api) = app_with(api, settings(Locale::ZhCn));
    fill_annotation_form(&app);

    let err = app.submit_annotation().await.expect_err("rejected");
    assert_eq!(
        err,
        FlowError::Request(RequestError::Rejected("duplicate".into()))
    );
    assert!(!api.calls().contains(&"annotations".to_string()));
    assert!(!app.views().annotation_form.read(|f| f.is_pristine()));
}

#[tokio::test]
async fn failed_reload_still_clears_the_submitted_form() {
    let api = FakeApi::default();
    *api.annotations.lock().expect("annotations") = Err(server_error());
    let (app, _api) = app_with(api, settings(Locale::ZhCn));
    fill_annotation_form(&app);

    app.submit_annotation().await.expect("submit");

    assert!(app.views().annotation_form.read(|f| f.is_pristine()));
    assert_eq!(
        notifications(&app),
        vec![
            ("加载标注数据失败".to_string(), Severity::Error),
            ("标注成功".to_string(), Severity::Success)
        ]
    );
}

#[tokio::test]
async fn switching_to_annotate_tab_reloads_annotations() {
    let (app, api) = app_with(FakeApi::default(), settings(Locale::ZhCn));

    app.switch_tab(Tab::Training).await.expect("training tab");
    assert!(api.calls().is_empty());

    app.switch_tab(Tab::Annotate).await.expect("annotate tab");
    assert_eq!(api.calls(), vec!["annotations".to_string()]);
    assert_eq!(app.views().tabs.read(|t| t.active), Tab::Annotate);
}

#[tokio::test]
async fn form_edits_dispatch_synchronously() {
    let (app, api) = app_with(FakeApi::default(), settings(Locale::ZhCn));

    assert!(app
        .dispatch(UserAction::EditAnnotationText("abc".into()))
        .is_none());
    assert!(app
        .dispatch(UserAction::SelectMainCategory("中性".into()))
        .is_none());
    assert!(app
        .dispatch(UserAction::ToggleSubCategory {
            name: "日常交流".into(),
            checked: true,
        })
        .is_none());

    let form = app.views().annotation_form.snapshot();
    assert_eq!(form.text, "abc");
    assert_eq!(form.checked_sub_categories(), vec!["日常交流".to_string()]);
    assert!(api.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn retrain_server_error_reports_generic_reason_then_hides() {
    let api = FakeApi::default();
    *api.retrain.lock().expect("retrain") = Err(server_error());
    let (app, api) = app_with(api, settings(Locale::En));

    let err = app.retrain().await.expect_err("server error");
    assert!(matches!(
        err,
        FlowError::Request(RequestError::Status { status: 500, .. })
    ));
    assert_eq!(
        api.calls(),
        vec![
            "training_data".to_string(),
            "retrain:10:32:0.001:0.2".to_string()
        ]
    );

    let copy = app.copy();
    let status = app.views().training.snapshot();
    assert!(status.visible);
    assert_eq!(status.message(copy), "training failed: server response error");
    assert_eq!(status.run.data_count, Some(12));
    assert_eq!(
        notifications(&app),
        vec![
            ("model retraining started".to_string(), Severity::Info),
            (
                "model retraining failed, please retry".to_string(),
                Severity::Error
            )
        ]
    );

    tokio::time::sleep(Duration::from_millis(2999)).await;
    assert!(app.views().training.read(|v| v.visible));
    tokio::time::sleep(Duration::from_millis(2)).await;
    assert!(!app.views().training.read(|v| v.visible));
}

#[tokio::test(start_paused = true)]
async fn retrain_success_reports_elapsed_and_server_message() {
    let api = FakeApi {
        retrain_delay: Duration::from_millis(1500),
        ..FakeApi::default()
    };
    let (app, _api) = app_with(api, settings(Locale::ZhCn));

    app.retrain().await.expect("retrain");

    let status = app.views().training.snapshot();
    assert_eq!(status.run.phase, TrainingPhase::Complete);
    assert_eq!(status.elapsed_display().as_deref(), Some("1.5"));
    assert_eq!(status.message(app.copy()), "训练完成！");
    assert_eq!(
        notifications(&app).last(),
        Some(&("模型重新训练完成".to_string(), Severity::Success))
    );

    tokio::time::sleep(Duration::from_millis(3001)).await;
    assert!(!app.views().training.read(|v| v.visible));
}

#[tokio::test]
async fn retrain_without_server_message_uses_default() {
    let api = FakeApi::default();
    *api.retrain.lock().expect("retrain") = Ok(StatusResponse::default());
    let (app, _api) = app_with(api, settings(Locale::ZhCn));

    app.retrain().await.expect("retrain");

    assert_eq!(
        notifications(&app).last(),
        Some(&("模型重训练完成".to_string(), Severity::Success))
    );
}

#[tokio::test]
async fn retrain_stats_failure_lands_in_catch_all_path() {
    let api = FakeApi::default();
    *api.training_data.lock().expect("training") =
        Err(RequestError::Transport("connection refused".into()));
    let (app, api) = app_with(api, settings(Locale::En));

    app.retrain().await.expect_err("stats failure");

    assert_eq!(api.calls(), vec!["training_data".to_string()]);
    assert_eq!(
        app.views().training.read(|v| v.message(app.copy())),
        "training failed: transport failure: connection refused"
    );
    assert_eq!(
        notifications(&app),
        vec![(
            "model retraining failed, please retry".to_string(),
            Severity::Error
        )]
    );
}

#[tokio::test(start_paused = true)]
async fn failed_retrain_does_not_show_the_previous_run() {
    let api = FakeApi {
        retrain_delay: Duration::from_millis(1500),
        ..FakeApi::default()
    };
    let (app, api) = app_with(api, settings(Locale::En));
    app.retrain().await.expect("first retrain");
    assert_eq!(
        app.views().training.read(|v| v.elapsed_display()).as_deref(),
        Some("1.5")
    );

    *api.training_data.lock().expect("training") =
        Err(RequestError::Transport("connection refused".into()));
    app.retrain().await.expect_err("second retrain");

    let status = app.views().training.snapshot();
    assert_eq!(
        status.message(app.copy()),
        "training failed: transport failure: connection refused"
    );
    assert_eq!(status.run.elapsed_seconds, None);
    assert_eq!(status.run.data_count, None);
    assert!(!app.render(Region::TrainingStatus).contains("1.5s"));
}

#[tokio::test]
async fn annotation_stats_render_into_their_own_region() {
    let api = FakeApi::default();
    *api.annotation_stats.lock().expect("stats") = Ok(AnnotationStatsResponse {
        daily_stats: [("2024-05-01".to_string(), 2)].into_iter().collect(),
        annotator_stats: [("alice".to_string(), 2)].into_iter().collect(),
    });
    let (app, api) = app_with(api, settings(Locale::ZhCn));
    let mut updates = app.subscribe();

    app.dispatch(UserAction::LoadAnnotationStats)
        .expect("spawned")
        .await
        .expect("join");

    assert_eq!(api.calls(), vec!["annotation_stats".to_string()]);
    assert_eq!(
        updates.try_recv().ok().map(|u| u.region),
        Some(Region::AnnotationStats)
    );
    let html = app.render(Region::AnnotationStats);
    assert!(html.contains("<li>2024-05-01: 2</li>"));
    assert!(html.contains("<li>alice: 2</li>"));
    assert!(app.views().annotation_table.read(|t| t.rows.is_empty()));
}

#[tokio::test]
async fn annotation_stats_failure_keeps_placeholder_and_notifies() {
    let api = FakeApi::default();
    *api.annotation_stats.lock().expect("stats") = Err(server_error());
    let (app, _api) = app_with(api, settings(Locale::ZhCn));

    let err = app.load_annotation_stats().await.expect_err("failure");
    assert!(matches!(err, FlowError::Request(RequestError::Status { status: 500, .. })));

    assert!(app.render(Region::AnnotationStats).contains("暂无标注统计"));
    assert_eq!(
        notifications(&app),
        vec![("加载标注统计失败".to_string(), Severity::Error)]
    );
}

#[tokio::test]
async fn suggestion_validation_short_circuits_with_distinct_warnings() {
    let (app, api) = app_with(FakeApi::default(), settings(Locale::ZhCn));

    app.set_annotation_text("   ");
    assert_eq!(
        app.request_ai_suggestion().await,
        Err(FlowError::Validation(ValidationError::SuggestionTextEmpty))
    );

    app.set_annotation_text("  四个字符  ");
    assert_eq!(
        app.request_ai_suggestion().await,
        Err(FlowError::Validation(
            ValidationError::SuggestionTextTooShort { min: 5 }
        ))
    );

    assert!(api.calls().is_empty());
    assert_eq!(
        notifications(&app),
        vec![
            ("请先输入文本".to_string(), Severity::Warning),
            ("文本长度需要大于5个字符".to_string(), Severity::Warning)
        ]
    );
    assert_eq!(app.views().suggestion.snapshot(), SuggestionView::Idle);
}

#[tokio::test]
async fn suggestion_renders_partial_response_with_fallbacks() {
    let api = FakeApi::default();
    *api.suggestion.lock().expect("suggestion") = Ok(AiSuggestion {
        category: Some("正向价值观".into()),
        model_prediction: Some(ModelPrediction::default()),
        ..AiSuggestion::default()
    });
    let (app, api) = app_with(api, settings(Locale::ZhCn));
    app.set_annotation_text("我爱我的祖国和人民");

    app.request_ai_suggestion().await.expect("suggestion");

    assert_eq!(api.calls(), vec!["suggestion:我爱我的祖国和人民".to_string()]);
    let html = app.render(Region::Suggestion);
    assert!(html.contains("正向价值观"));
    assert!(html.contains("<p>置信度：0.00%</p>"));
    assert!(html.contains(r#"<div class="suggestion-value">无</div>"#));
    assert_eq!(
        notifications(&app),
        vec![("AI建议获取成功".to_string(), Severity::Success)]
    );
}

#[tokio::test]
async fn suggestion_failure_shows_error_panel() {
    let api = FakeApi::default();
    *api.suggestion.lock().expect("suggestion") = Err(server_error());
    let (app, _api) = app_with(api, settings(Locale::ZhCn));
    app.set_annotation_text("足够长的文本内容");

    app.request_ai_suggestion().await.expect_err("failure");

    assert!(matches!(
        app.views().suggestion.snapshot(),
        SuggestionView::Failed(_)
    ));
    assert_eq!(
        notifications(&app),
        vec![("获取AI建议失败".to_string(), Severity::Error)]
    );
}

#[tokio::test]
async fn import_validates_every_item_before_sending() {
    let (app, api) = app_with(FakeApi::default(), settings(Locale::ZhCn));
    let items = vec![
        AnnotateRequest {
            text: "a".into(),
            main_category: "中性".into(),
            sub_categories: vec!["日常交流".into()],
        },
        AnnotateRequest {
            text: "b".into(),
            main_category: "中性".into(),
            sub_categories: Vec::new(),
        },
    ];

    let err = app.import_annotations(items).await.expect_err("invalid");
    assert_eq!(
        err,
        FlowError::Validation(ValidationError::IncompleteImportItem { index: 1 })
    );
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn import_success_notifies_and_reloads_annotations() {
    let (app, api) = app_with(FakeApi::default(), settings(Locale::ZhCn));

    app.import_annotations(vec![AnnotateRequest {
        text: "a".into(),
        main_category: "中性".into(),
        sub_categories: vec!["日常交流".into()],
    }])
    .await
    .expect("import");

    assert_eq!(
        api.calls(),
        vec!["import:1".to_string(), "annotations".to_string()]
    );
    assert_eq!(
        notifications(&app),
        vec![("成功导入1条数据".to_string(), Severity::Success)]
    );
}

#[tokio::test]
async fn import_succeeds_even_when_the_reload_fails() {
    let api = FakeApi::default();
    *api.annotations.lock().expect("annotations") = Err(server_error());
    let (app, api) = app_with(api, settings(Locale::ZhCn));

    app.import_annotations(vec![AnnotateRequest {
        text: "a".into(),
        main_category: "中性".into(),
        sub_categories: vec!["日常交流".into()],
    }])
    .await
    .expect("import");

    assert_eq!(
        api.calls(),
        vec!["import:1".to_string(), "annotations".to_string()]
    );
    assert_eq!(
        notifications(&app),
        vec![
            ("成功导入1条数据".to_string(), Severity::Success),
            ("加载标注数据失败".to_string(), Severity::Error)
        ]
    );
}

#[tokio::test]
async fn export_returns_raw_rows() {
    let (app, _api) = app_with(FakeApi::default(), settings(Locale::ZhCn));
    let rows = app.export_annotations().await.expect("export");
    assert_eq!(rows.len(), 1);
    assert!(notifications(&app).is_empty());
}

#[tokio::test]
async fn evaluation_and_overview_render_into_training_region() {
    let api = FakeApi::default();
    *api.evaluate.lock().expect("evaluate") = Ok(EvaluationResponse {
        evaluation_results: vec![EvaluationRow {
            text: "t".into(),
            true_category: "中性".into(),
            predicted_category: "正向价值观".into(),
            confidence: 0.4,
        }],
        accuracy: 0.0,
    });
    let (app, _api) = app_with(api, settings(Locale::ZhCn));

    app.load_training_overview().await.expect("overview");
    app.evaluate_model().await.expect("evaluate");

    let status = app.views().training.snapshot();
    assert_eq!(status.run.data_count, Some(12));
    assert_eq!(status.evaluation.map(|e| e.evaluation_results.len()), Some(1));
    assert!(app.render(Region::TrainingStatus).contains("0.00%"));
}

#[tokio::test]
async fn region_updates_are_broadcast_to_subscribers() {
    let (app, _api) = app_with(FakeApi::default(), settings(Locale::ZhCn));
    let mut updates = app.subscribe();

    app.classify("hello").await.expect("classify");

    let mut regions = Vec::new();
    while let Ok(update) = updates.try_recv() {
        regions.push(update.region);
    }
    assert_eq!(
        regions,
        vec![
            Region::Classification,
            Region::Classification,
            Region::Notifications
        ]
    );
}

#[tokio::test]
async fn network_actions_dispatch_onto_spawned_tasks() {
    let (app, api) = app_with(FakeApi::default(), settings(Locale::ZhCn));

    let handle = app
        .dispatch(UserAction::Classify {
            text: "spawned".into(),
        })
        .expect("spawned");
    handle.await.expect("join");

    let empty = app
        .dispatch(UserAction::Classify {
            text: String::new(),
        })
        .expect("spawned");
    empty.await.expect("validation failure is not a panic");

    assert_eq!(api.calls(), vec!["classify:spawned".to_string()]);
    assert_eq!(
        notifications(&app),
        vec![
            ("分类完成".to_string(), Severity::Success),
            ("请输入文本".to_string(), Severity::Warning)
        ]
    );
}
