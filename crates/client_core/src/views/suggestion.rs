use std::fmt::Write as _;

use shared::protocol::AiSuggestion;

use super::{Region, View};
use crate::{
    copy::UiCopy,
    markup::{escape_html, labelled_row, or_placeholder},
};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SuggestionView {
    #[default]
    Idle,
    Loading,
    Ready(AiSuggestion),
    Failed(String),
}

#[derive(Debug, Clone)]
pub enum SuggestionEvent {
    Requested,
    Received(AiSuggestion),
    Failed(String),
}

impl View for SuggestionView {
    type Event = SuggestionEvent;

    const REGION: Region = Region::Suggestion;

    fn apply(&mut self, event: SuggestionEvent) {
        *self = match event {
            SuggestionEvent::Requested => SuggestionView::Loading,
            SuggestionEvent::Received(suggestion) => SuggestionView::Ready(suggestion),
            SuggestionEvent::Failed(reason) => SuggestionView::Failed(reason),
        };
    }

    fn render(&self, copy: &UiCopy) -> String {
        let mut out = String::from(r#"<div class="suggestion-content">"#);
        match self {
            SuggestionView::Idle => {}
            SuggestionView::Loading => {
                let _ = write!(
                    out,
                    r#"<div class="suggestion-loading"><span>{}</span></div>"#,
                    escape_html(copy.suggestion_loading)
                );
            }
            SuggestionView::Failed(reason) => {
                let _ = write!(
                    out,
                    r#"<div class="suggestion-error">{}: {}</div>"#,
                    escape_html(copy.suggestion_failed),
                    escape_html(reason)
                );
            }
            SuggestionView::Ready(suggestion) => render_suggestion(&mut out, suggestion, copy),
        }
        out.push_str("</div>");
        out
    }
}

/// Every field falls back independently; a missing prediction confidence shows as 0.00%.
fn render_suggestion(out: &mut String, suggestion: &AiSuggestion, copy: &UiCopy) {
    let prediction = suggestion.model_prediction.as_ref();

    labelled_row(
        out,
        "suggestion",
        copy.suggestion_category,
        or_placeholder(suggestion.category.as_deref(), copy.unknown),
    );
    labelled_row(
        out,
        "suggestion",
        copy.suggestion_sub_categories,
        &join_or_none(suggestion.sub_categories.as_deref(), copy),
    );
    labelled_row(
        out,
        "suggestion",
        copy.suggestion_explanation,
        or_placeholder(suggestion.explanation.as_deref(), copy.none),
    );

    let confidence = prediction.and_then(|p| p.confidence).unwrap_or(0.0);
    let _ = write!(
        out,
        r#"<div class="suggestion-item model-prediction"><div class="suggestion-label">{}</div><div class="suggestion-value"><p>{}{}</p><p>{}{}</p><p>{}{}</p></div></div>"#,
        escape_html(copy.suggestion_model_prediction),
        escape_html(copy.suggestion_prediction_category),
        escape_html(or_placeholder(
            prediction.and_then(|p| p.category.as_deref()),
            copy.unknown
        )),
        escape_html(copy.suggestion_prediction_sub_categories),
        escape_html(&join_or_none(
            prediction.and_then(|p| p.sub_categories.as_deref()),
            copy
        )),
        escape_html(copy.suggestion_prediction_confidence),
        copy.format_percent(confidence),
    );
}

fn join_or_none(items: Option<&[String]>, copy: &UiCopy) -> String {
    match items {
        Some(items) if !items.is_empty() => items.join(copy.suggestion_separator),
        _ => copy.none.to_string(),
    }
}
