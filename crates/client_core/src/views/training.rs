use std::{collections::BTreeMap, fmt::Write as _};

use shared::protocol::{EvaluationResponse, TrainingDataResponse};

use super::{Region, View};
use crate::{
    copy::UiCopy,
    markup::{escape_html, labelled_row},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrainingFailure {
    /// Non-2xx retrain status; the body is not consulted.
    ServerResponse,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TrainingPhase {
    #[default]
    Idle,
    Preparing,
    InProgress,
    Complete,
    Failed(TrainingFailure),
}

/// One retrain invocation as displayed; never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingRun {
    pub phase: TrainingPhase,
    pub data_count: Option<u64>,
    pub elapsed_seconds: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingStatusView {
    pub visible: bool,
    pub run: TrainingRun,
    pub distribution: BTreeMap<String, u64>,
    pub evaluation: Option<EvaluationResponse>,
}

#[derive(Debug, Clone)]
pub enum TrainingEvent {
    Preparing,
    DataCounted(u64),
    InProgress,
    Completed { elapsed_seconds: f64 },
    Failed(TrainingFailure),
    Hidden,
    OverviewLoaded(TrainingDataResponse),
    Evaluated(EvaluationResponse),
}

impl TrainingStatusView {
    pub fn message(&self, copy: &UiCopy) -> String {
        match &self.run.phase {
            TrainingPhase::Idle => String::new(),
            TrainingPhase::Preparing => copy.training_preparing.to_string(),
            TrainingPhase::InProgress => copy.training_in_progress.to_string(),
            TrainingPhase::Complete => copy.training_complete.to_string(),
            TrainingPhase::Failed(TrainingFailure::ServerResponse) => {
                format!("{}{}", copy.training_failed_prefix, copy.server_response_error)
            }
            TrainingPhase::Failed(TrainingFailure::Other(reason)) => {
                format!("{}{}", copy.training_failed_prefix, reason)
            }
        }
    }

    /// Elapsed wall-clock seconds with one decimal place.
    pub fn elapsed_display(&self) -> Option<String> {
        self.run.elapsed_seconds.map(|secs| format!("{secs:.1}"))
    }
}

impl View for TrainingStatusView {
    type Event = TrainingEvent;

    const REGION: Region = Region::TrainingStatus;

    fn apply(&mut self, event: TrainingEvent) {
        match event {
            TrainingEvent::Preparing => {
                self.visible = true;
                self.run = TrainingRun {
                    phase: TrainingPhase::Preparing,
                    ..TrainingRun::default()
                };
            }
            TrainingEvent::DataCounted(total) => self.run.data_count = Some(total),
            TrainingEvent::InProgress => self.run.phase = TrainingPhase::InProgress,
            TrainingEvent::Completed { elapsed_seconds } => {
                self.run.phase = TrainingPhase::Complete;
                self.run.elapsed_seconds = Some(elapsed_seconds);
            }
            TrainingEvent::Failed(failure) => self.run.phase = TrainingPhase::Failed(failure),
            TrainingEvent::Hidden => self.visible = false,
            TrainingEvent::OverviewLoaded(overview) => {
                self.run.data_count = Some(overview.stats.total);
                self.distribution = overview.distribution;
            }
            TrainingEvent::Evaluated(evaluation) => self.evaluation = Some(evaluation),
        }
    }

    fn render(&self, copy: &UiCopy) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            r#"<div id="training-status"{}><div id="training-message">{}</div>"#,
            if self.visible { "" } else { r#" class="hidden""# },
            escape_html(&self.message(copy))
        );
        labelled_row(
            &mut out,
            "training",
            copy.training_data_count,
            &self.run.data_count.map(|n| n.to_string()).unwrap_or_default(),
        );
        labelled_row(
            &mut out,
            "training",
            copy.training_elapsed,
            &self
                .elapsed_display()
                .map(|secs| format!("{secs}{}", copy.training_seconds))
                .unwrap_or_default(),
        );
        out.push_str("</div>");

        if !self.distribution.is_empty() {
            let _ = write!(
                out,
                r#"<div class="training-distribution"><div class="training-label">{}</div><ul>"#,
                escape_html(copy.training_distribution)
            );
            for (category, count) in &self.distribution {
                let _ = write!(out, "<li>{}: {count}</li>", escape_html(category));
            }
            out.push_str("</ul></div>");
        }

        if let Some(evaluation) = &self.evaluation {
            render_evaluation(&mut out, evaluation, copy);
        }
        out
    }
}

fn render_evaluation(out: &mut String, evaluation: &EvaluationResponse, copy: &UiCopy) {
    out.push_str(r#"<div class="evaluation">"#);
    labelled_row(
        out,
        "evaluation",
        copy.evaluate_accuracy,
        &copy.format_percent(evaluation.accuracy),
    );
    let _ = write!(
        out,
        r#"<table class="evaluation-table"><thead><tr><th>{}</th><th>{}</th><th>{}</th><th>{}</th></tr></thead><tbody>"#,
        escape_html(copy.label_text),
        escape_html(copy.evaluate_true_category),
        escape_html(copy.evaluate_predicted_category),
        escape_html(copy.label_confidence),
    );
    for row in &evaluation.evaluation_results {
        let _ = write!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_html(&row.text),
            escape_html(&row.true_category),
            escape_html(&row.predicted_category),
            copy.format_percent(row.confidence),
        );
    }
    out.push_str("</tbody></table></div>");
}
